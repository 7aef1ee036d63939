//! Traits and types for block-level random access to file-like objects
//!
//! [`FileStream`] is the editing primitive the rest of the crate is built on:
//! tag blocks grow and shrink through [`FileStream::insert`] and
//! [`FileStream::remove_block`], which shuffle only the affected tail of the
//! file instead of rewriting it whole.

use crate::bytevector::ByteVector;
use crate::error::{Result, TagsmithError};
use crate::macros::{err, try_vec};

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Provides a method to truncate an object to the specified length
///
/// This is one component of the [`FileLike`] trait. Take care when implementing
/// this for downstream types: the editor assumes the container has exactly the
/// new length afterwards, and files **will** become corrupted if that assumption
/// is broken.
pub trait Truncate {
	/// The error type of the truncation operation
	type Error: Into<TagsmithError>;

	/// Truncate a storage object to the specified length
	///
	/// # Errors
	///
	/// Errors depend on the object being truncated, which may not always be fallible.
	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error>;
}

impl Truncate for File {
	type Error = std::io::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.set_len(new_len)
	}
}

impl Truncate for Vec<u8> {
	type Error = std::convert::Infallible;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.truncate(new_len as usize);
		Ok(())
	}
}

impl Truncate for VecDeque<u8> {
	type Error = std::convert::Infallible;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.truncate(new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for Cursor<T>
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.get_mut().truncate(new_len)
	}
}

impl<T> Truncate for Box<T>
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.as_mut().truncate(new_len)
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		(**self).truncate(new_len)
	}
}

/// Provides a method to get the length of a storage object
///
/// This is one component of the [`FileLike`] trait.
pub trait Length {
	/// The error type of the length operation
	type Error: Into<TagsmithError>;

	/// Get the length of a storage object
	///
	/// # Errors
	///
	/// Errors depend on the object being read, which may not always be fallible.
	fn len(&self) -> std::result::Result<u64, Self::Error>;
}

impl Length for File {
	type Error = std::io::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		self.metadata().map(|m| m.len())
	}
}

impl Length for Vec<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl Length for VecDeque<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl<T> Length for Cursor<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.get_ref())
	}
}

impl<T> Length for Box<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.as_ref())
	}
}

impl<T> Length for &mut T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

/// Provides a set of methods to read and write to a file-like object
///
/// This is a combination of the [`Read`], [`Write`], [`Seek`], [`Truncate`], and
/// [`Length`] traits, and is what [`FileStream`] wraps. `std::fs::File`,
/// `Cursor<Vec<u8>>` and `Cursor<&mut Vec<u8>>` all qualify.
pub trait FileLike: Read + Write + Seek + Truncate + Length {}

impl<T> FileLike for T where T: Read + Write + Seek + Truncate + Length {}

/// The chunk size used for bounded searches and block shuffles
///
/// Patterns passed to [`FileStream::find`] and [`FileStream::rfind`] must fit
/// in one chunk.
pub const BUFFER_SIZE: usize = 1024;

/// A seekable stream with block-level editing primitives
///
/// The stream tracks whether it was opened writable; [`FileStream::insert`],
/// [`FileStream::remove_block`] and [`FileStream::write_block`] refuse to touch
/// a read-only stream.
///
/// No operation on a `FileStream` is safe to call concurrently; callers
/// serialize per path.
pub struct FileStream<F> {
	inner: F,
	read_only: bool,
}

impl FileStream<File> {
	/// Open the file at `path` for reading and writing
	///
	/// # Errors
	///
	/// * `path` does not exist or is not readable/writable
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let file = OpenOptions::new().read(true).write(true).open(path)?;
		Ok(Self::new(file))
	}

	/// Open the file at `path` for reading only
	///
	/// Any later save through this stream fails with
	/// [`ErrorKind::NotWritable`](crate::error::ErrorKind::NotWritable).
	///
	/// # Errors
	///
	/// * `path` does not exist or is not readable
	pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
		let file = OpenOptions::new().read(true).open(path)?;
		Ok(Self::new_read_only(file))
	}
}

impl<F: FileLike> FileStream<F> {
	/// Wrap an already opened writable stream
	pub fn new(inner: F) -> Self {
		Self {
			inner,
			read_only: false,
		}
	}

	/// Wrap an already opened stream, blocking writes through the editor
	pub fn new_read_only(inner: F) -> Self {
		Self {
			inner,
			read_only: true,
		}
	}

	/// Consume the stream, returning the wrapped object
	pub fn into_inner(self) -> F {
		self.inner
	}

	/// Whether the stream was opened read-only
	pub fn is_read_only(&self) -> bool {
		self.read_only
	}

	/// The current length of the stream in bytes
	///
	/// # Errors
	///
	/// * Failure to query the underlying object
	pub fn len(&self) -> Result<u64> {
		Length::len(&self.inner).map_err(Into::into)
	}

	/// Move the cursor
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
		Ok(self.inner.seek(pos)?)
	}

	/// The current cursor position
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	pub fn stream_position(&mut self) -> Result<u64> {
		Ok(self.inner.stream_position()?)
	}

	/// Read up to `len` bytes at the cursor
	///
	/// The returned block is only shorter than `len` when EOF is reached.
	///
	/// # Errors
	///
	/// * `len` exceeds the allocation limit
	/// * [`std::io::Error`]
	pub fn read_block(&mut self, len: usize) -> Result<ByteVector> {
		if len == 0 {
			return Ok(ByteVector::new());
		}

		let mut buf = try_vec![0; len];

		let mut filled = 0;
		loop {
			let n = self.inner.read(&mut buf[filled..])?;
			if n == 0 {
				break;
			}

			filled += n;
			if filled == buf.len() {
				break;
			}
		}

		buf.truncate(filled);
		Ok(ByteVector::from(buf))
	}

	/// Overwrite bytes at the cursor, extending the stream if needed
	///
	/// # Errors
	///
	/// * The stream is read-only
	/// * [`std::io::Error`]
	pub fn write_block(&mut self, data: &[u8]) -> Result<()> {
		if self.read_only {
			err!(NotWritable);
		}

		Ok(self.inner.write_all(data)?)
	}

	/// Search forward for `pattern` starting at `from`
	///
	/// The file is scanned in [`BUFFER_SIZE`] chunks, so arbitrarily large files
	/// are searched without loading them whole. When `before` is given, the
	/// search stops unsuccessfully if that pattern occurs first.
	///
	/// The cursor position is restored afterwards.
	///
	/// # Errors
	///
	/// * `pattern` is empty or longer than [`BUFFER_SIZE`]
	/// * [`std::io::Error`]
	pub fn find(
		&mut self,
		pattern: &[u8],
		from: u64,
		before: Option<&[u8]>,
	) -> Result<Option<u64>> {
		if pattern.is_empty() || pattern.len() > BUFFER_SIZE {
			err!(TooMuchData);
		}

		if let Some(before) = before {
			if before.is_empty() || before.len() > BUFFER_SIZE {
				err!(TooMuchData);
			}
		}

		let original_position = self.stream_position()?;
		self.seek(SeekFrom::Start(from))?;

		// A match may straddle a chunk boundary, so the tail of each window is
		// carried into the next
		let carry_len = before
			.map_or(pattern.len(), |b| b.len().max(pattern.len()))
			.saturating_sub(1);

		let mut window = ByteVector::new();
		let mut window_start = from;
		let mut result = None;

		loop {
			let block = self.read_block(BUFFER_SIZE)?;
			if block.is_empty() {
				break;
			}

			window.append(&block);

			let hit = window.find(pattern, 0);
			let stop = before.and_then(|b| window.find(b, 0));

			match (hit, stop) {
				(Some(h), Some(s)) if s < h => break,
				(Some(h), _) => {
					result = Some(window_start + h as u64);
					break;
				},
				(None, Some(s)) if s + carry_len < window.len() => break,
				_ => {},
			}

			let keep_from = window.len().saturating_sub(carry_len);
			window_start += keep_from as u64;
			window = window.mid(keep_from, carry_len);
		}

		self.seek(SeekFrom::Start(original_position))?;
		Ok(result)
	}

	/// Search backward for `pattern`, starting at `from` (or the end of the stream)
	///
	/// Returns the offset of the pattern's first byte. Like [`FileStream::find`],
	/// the scan is chunked and the cursor position is restored.
	///
	/// # Errors
	///
	/// * `pattern` is empty or longer than [`BUFFER_SIZE`]
	/// * [`std::io::Error`]
	pub fn rfind(&mut self, pattern: &[u8], from: Option<u64>) -> Result<Option<u64>> {
		if pattern.is_empty() || pattern.len() > BUFFER_SIZE {
			err!(TooMuchData);
		}

		let original_position = self.stream_position()?;
		let file_len = self.len()?;

		// A match starting at `from` may extend `pattern.len()` bytes past it
		let mut read_end = match from {
			Some(from) => file_len.min(from.saturating_add(pattern.len() as u64)),
			None => file_len,
		};

		let mut carry = ByteVector::new();
		let mut result = None;

		while read_end > 0 {
			let chunk = read_end.min(BUFFER_SIZE as u64);
			let read_start = read_end - chunk;

			self.seek(SeekFrom::Start(read_start))?;
			let mut window = self.read_block(chunk as usize)?;
			window.append(&carry);

			if let Some(pos) = window.rfind(pattern, None) {
				result = Some(read_start + pos as u64);
				break;
			}

			carry = window.mid(0, pattern.len() - 1);
			read_end = read_start;
		}

		self.seek(SeekFrom::Start(original_position))?;
		Ok(result)
	}

	/// Replace `replace` bytes at `start` with `data`, resizing the file as needed
	///
	/// Equal lengths degenerate to a plain overwrite. When `data` is shorter, the
	/// surplus is removed with [`FileStream::remove_block`]. When `data` is
	/// longer, the trailing region is first relocated toward the new end of the
	/// file in [`BUFFER_SIZE`] chunks, working backward from EOF so that no byte
	/// is overwritten before it has been moved.
	///
	/// # Errors
	///
	/// * The stream is read-only
	/// * `start + replace` is out of bounds
	/// * [`std::io::Error`]
	pub fn insert(&mut self, data: &[u8], start: u64, replace: u64) -> Result<()> {
		if self.read_only {
			err!(NotWritable);
		}

		let old_len = self.len()?;
		let Some(tail_len) = old_len.checked_sub(start + replace) else {
			err!(SizeMismatch);
		};

		let data_len = data.len() as u64;

		if data_len == replace {
			self.seek(SeekFrom::Start(start))?;
			return self.write_block(data);
		}

		if data_len < replace {
			self.seek(SeekFrom::Start(start))?;
			self.write_block(data)?;
			return self.remove_block(start + data_len, replace - data_len);
		}

		let shift = data_len - replace;

		let mut remaining = tail_len;
		while remaining > 0 {
			let chunk = remaining.min(BUFFER_SIZE as u64);
			let read_pos = start + replace + remaining - chunk;

			self.seek(SeekFrom::Start(read_pos))?;
			let block = self.read_block(chunk as usize)?;

			self.seek(SeekFrom::Start(read_pos + shift))?;
			self.write_block(&block)?;

			remaining -= chunk;
		}

		self.seek(SeekFrom::Start(start))?;
		self.write_block(data)
	}

	/// Remove `len` bytes at `start`, shifting the remainder of the file backward
	///
	/// The region past the removed range is pulled back through a fixed-size
	/// buffer, then the file is truncated.
	///
	/// # Errors
	///
	/// * The stream is read-only
	/// * [`std::io::Error`]
	pub fn remove_block(&mut self, start: u64, len: u64) -> Result<()> {
		if self.read_only {
			err!(NotWritable);
		}

		if len == 0 {
			return Ok(());
		}

		let mut read_pos = start + len;
		let mut write_pos = start;

		loop {
			self.seek(SeekFrom::Start(read_pos))?;
			let block = self.read_block(BUFFER_SIZE)?;
			if block.is_empty() {
				break;
			}

			read_pos += block.len() as u64;

			self.seek(SeekFrom::Start(write_pos))?;
			self.write_block(&block)?;
			write_pos += block.len() as u64;
		}

		self.inner.truncate(write_pos).map_err(Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::{BUFFER_SIZE, FileStream};

	use std::io::Cursor;

	fn stream_of(len: usize) -> FileStream<Cursor<Vec<u8>>> {
		let data = (0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>();
		FileStream::new(Cursor::new(data))
	}

	#[test_log::test]
	fn find_across_chunk_boundary() {
		let mut data = vec![0u8; BUFFER_SIZE * 2];
		// Straddle the first chunk boundary
		data[BUFFER_SIZE - 2] = b'T';
		data[BUFFER_SIZE - 1] = b'A';
		data[BUFFER_SIZE] = b'G';

		let mut stream = FileStream::new(Cursor::new(data));
		assert_eq!(
			stream.find(b"TAG", 0, None).unwrap(),
			Some((BUFFER_SIZE - 2) as u64)
		);
	}

	#[test_log::test]
	fn find_respects_before_pattern() {
		let mut data = vec![0u8; 64];
		data[10..14].copy_from_slice(b"SYNC");
		data[30..33].copy_from_slice(b"TAG");

		let mut stream = FileStream::new(Cursor::new(data));
		assert_eq!(stream.find(b"TAG", 0, Some(b"SYNC")).unwrap(), None);
		assert_eq!(stream.find(b"SYNC", 0, Some(b"TAG")).unwrap(), Some(10));
	}

	#[test_log::test]
	fn find_rejects_oversized_pattern() {
		let mut stream = stream_of(16);
		let pattern = vec![0u8; BUFFER_SIZE + 1];
		assert!(stream.find(&pattern, 0, None).is_err());
	}

	#[test_log::test]
	fn rfind_across_chunk_boundary() {
		let mut data = vec![0u8; BUFFER_SIZE * 2];
		data[BUFFER_SIZE - 1] = b'T';
		data[BUFFER_SIZE] = b'A';
		data[BUFFER_SIZE + 1] = b'G';

		let mut stream = FileStream::new(Cursor::new(data));
		assert_eq!(
			stream.rfind(b"TAG", None).unwrap(),
			Some((BUFFER_SIZE - 1) as u64)
		);
	}

	#[test_log::test]
	fn insert_equal_length() {
		let mut stream = stream_of(100);
		stream.insert(b"XXXX", 10, 4).unwrap();

		let out = stream.into_inner().into_inner();
		assert_eq!(out.len(), 100);
		assert_eq!(&out[10..14], b"XXXX");
		assert_eq!(out[9], 9);
		assert_eq!(out[14], 14 % 251);
	}

	#[test_log::test]
	fn insert_grows_file() {
		// Tail much larger than one shuffle chunk
		let len = BUFFER_SIZE * 3 + 17;
		let mut stream = stream_of(len);
		let original = stream_of(len).into_inner().into_inner();

		let data = vec![b'N'; 300];
		stream.insert(&data, 5, 10).unwrap();

		let out = stream.into_inner().into_inner();
		assert_eq!(out.len(), len + 290);
		assert_eq!(&out[..5], &original[..5]);
		assert_eq!(&out[5..305], &data[..]);
		assert_eq!(&out[305..], &original[15..]);
	}

	#[test_log::test]
	fn insert_shrinks_file() {
		let len = BUFFER_SIZE + 50;
		let mut stream = stream_of(len);
		let original = stream_of(len).into_inner().into_inner();

		stream.insert(b"ab", 20, 40).unwrap();

		let out = stream.into_inner().into_inner();
		assert_eq!(out.len(), len - 38);
		assert_eq!(&out[..20], &original[..20]);
		assert_eq!(&out[20..22], b"ab");
		assert_eq!(&out[22..], &original[60..]);
	}

	#[test_log::test]
	fn insert_out_of_bounds() {
		let mut stream = stream_of(10);
		assert!(stream.insert(b"x", 8, 4).is_err());
	}

	#[test_log::test]
	fn remove_block_shifts_and_truncates() {
		let len = BUFFER_SIZE * 2 + 9;
		let mut stream = stream_of(len);
		let original = stream_of(len).into_inner().into_inner();

		stream.remove_block(7, 100).unwrap();

		let out = stream.into_inner().into_inner();
		assert_eq!(out.len(), len - 100);
		assert_eq!(&out[..7], &original[..7]);
		assert_eq!(&out[7..], &original[107..]);
	}

	#[test_log::test]
	fn read_only_refuses_writes() {
		let mut stream = FileStream::new_read_only(Cursor::new(vec![0u8; 32]));
		assert!(stream.write_block(b"x").is_err());
		assert!(stream.insert(b"x", 0, 0).is_err());
		assert!(stream.remove_block(0, 4).is_err());
	}
}
