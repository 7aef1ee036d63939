//! Format detection and the entry point to reading files

use crate::ape::constants::{APE_ENVELOPE_SIZE, APE_PREAMBLE};
use crate::ape::header::ApeHeader;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{AudioFile, FileType};
use crate::io::{FileLike, FileStream};
use crate::macros::err;

use std::collections::HashMap;
use std::fs::File;
use std::io::SeekFrom;
use std::path::Path;

/// A callback inspecting leading file content for a format signature
pub type FileTypeResolver = fn(&[u8]) -> Option<FileType>;

// On-disk GUID of the ASF header object
const ASF_HEADER_GUID: [u8; 16] = [
	0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE,
	0x6C,
];

fn builtin_resolver(buf: &[u8]) -> Option<FileType> {
	if buf.starts_with(b"MAC ") {
		return Some(FileType::Ape);
	}
	if buf.starts_with(b"fLaC") {
		return Some(FileType::Flac);
	}
	if buf.starts_with(b"RIFF") {
		return Some(FileType::Wav);
	}
	if buf.starts_with(&ASF_HEADER_GUID) {
		return Some(FileType::Asf);
	}
	if buf.starts_with(&[0x00, 0x00, 0x01, 0xBA]) || buf.starts_with(&[0x00, 0x00, 0x01, 0xB3]) {
		return Some(FileType::MpegVideo);
	}

	// An ID3v2 block almost always fronts an MPEG audio stream
	if buf.starts_with(b"ID3") {
		return Some(FileType::Mpeg);
	}

	match buf {
		// An ADTS sync leaves the layer bits clear, a plain MPEG sync does not
		[0xFF, b, ..] if b & 0xF6 == 0xF0 => Some(FileType::Aac),
		[0xFF, b, ..] if b >> 5 == 0b111 => Some(FileType::Mpeg),
		_ => None,
	}
}

/// The format registry: extension mappings plus ordered content resolvers
///
/// This is a plain value with no hidden global state; every [`Probe`] owns
/// one. The default registry knows the built-in extensions and signatures;
/// registered resolvers are consulted in registration order, always before the
/// built-in signature check.
///
/// # Examples
///
/// ```rust
/// use tagsmith::file::FileType;
/// use tagsmith::probe::FormatRegistry;
///
/// let mut registry = FormatRegistry::default();
/// registry.register_extension("mp3a", FileType::Mpeg);
///
/// assert_eq!(registry.by_extension("mp3a"), Some(FileType::Mpeg));
/// ```
#[derive(Clone, Default)]
pub struct FormatRegistry {
	extensions: HashMap<String, FileType>,
	resolvers: Vec<(&'static str, FileTypeResolver)>,
}

impl FormatRegistry {
	/// Create a registry with only the built-in mappings
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Map an additional file extension (case-insensitive) to a file type
	pub fn register_extension(&mut self, ext: impl Into<String>, file_type: FileType) {
		self.extensions
			.insert(ext.into().to_ascii_lowercase(), file_type);
	}

	/// Append a content resolver, consulted before the built-in signature check
	pub fn register_resolver(&mut self, name: &'static str, resolver: FileTypeResolver) {
		self.resolvers.push((name, resolver));
	}

	/// Resolve a file type from an extension
	pub fn by_extension(&self, ext: &str) -> Option<FileType> {
		let lowered = ext.to_ascii_lowercase();

		self.extensions
			.get(&lowered)
			.copied()
			.or_else(|| FileType::from_ext(&lowered))
	}

	/// Resolve a file type from leading file content
	pub fn by_content(&self, buf: &[u8]) -> Option<FileType> {
		for (name, resolver) in &self.resolvers {
			if let Some(file_type) = resolver(buf) {
				log::debug!("Probe: Resolver \"{name}\" identified the content");
				return Some(file_type);
			}
		}

		builtin_resolver(buf)
	}
}

/// A format-aware opener
///
/// A `Probe` pairs a stream with a [`FormatRegistry`] and optional
/// [`FileType`] hint. The type is resolved from the hint, the path extension,
/// or the content, in that order of preference.
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> tagsmith::error::Result<()> {
/// use tagsmith::probe::Probe;
///
/// // The extension gives the type away
/// let file = Probe::open("music.mp3")?.read()?;
///
/// // ...but content-based guessing works on misnamed files too
/// let file = Probe::open("actually_flac.mp3")?.guess_file_type()?.read()?;
/// # Ok(())
/// # }
/// ```
pub struct Probe<F: FileLike> {
	stream: FileStream<F>,
	registry: FormatRegistry,
	options: ParseOptions,
	file_type: Option<FileType>,
}

impl Probe<File> {
	/// Open the file at `path` for reading and writing
	///
	/// The file type is initialized from the path's extension, if recognized.
	///
	/// # Errors
	///
	/// * `path` does not exist or is not readable/writable
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let stream = FileStream::open(path)?;

		Ok(Self::new(stream).with_file_type_from_path(path))
	}

	/// Open the file at `path` for reading only
	///
	/// # Errors
	///
	/// * `path` does not exist or is not readable
	pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let stream = FileStream::open_read_only(path)?;

		Ok(Self::new(stream).with_file_type_from_path(path))
	}
}

impl<F: FileLike> Probe<F> {
	/// Create a `Probe` over an already opened stream, with the default registry
	#[must_use]
	pub fn new(stream: FileStream<F>) -> Self {
		Self {
			stream,
			registry: FormatRegistry::default(),
			options: ParseOptions::default(),
			file_type: None,
		}
	}

	/// Replace the format registry
	#[must_use]
	pub fn with_registry(mut self, registry: FormatRegistry) -> Self {
		self.registry = registry;
		self
	}

	/// Set the parse options the eventual read uses
	#[must_use]
	pub fn with_options(mut self, options: ParseOptions) -> Self {
		self.options = options;
		self
	}

	/// Force a file type, overriding extension and content guesses
	#[must_use]
	pub fn with_file_type(mut self, file_type: FileType) -> Self {
		self.file_type = Some(file_type);
		self
	}

	fn with_file_type_from_path(mut self, path: &Path) -> Self {
		if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
			self.file_type = self.registry.by_extension(ext);
		}

		self
	}

	/// The currently resolved file type, if any
	pub fn file_type(&self) -> Option<FileType> {
		self.file_type
	}

	/// Guess the file type from the stream's content
	///
	/// Leading APE tags are skipped so the signature of the media itself is
	/// inspected. A failed guess leaves any previously resolved type in place.
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	pub fn guess_file_type(mut self) -> Result<Self> {
		let mut offset = 0u64;

		// Skip over tags at the head so the media signature is visible
		let guess = loop {
			self.stream.seek(SeekFrom::Start(offset))?;
			let block = self.stream.read_block(36)?;

			if block.starts_with(APE_PREAMBLE) {
				if let Ok(header) = ApeHeader::parse(&block.mid(0, APE_ENVELOPE_SIZE as usize)) {
					if header.flags.is_header() {
						offset += u64::from(APE_ENVELOPE_SIZE) + u64::from(header.size);
						continue;
					}
				}
			}

			break self.registry.by_content(&block);
		};

		if guess.is_some() {
			self.file_type = guess;
		}

		self.stream.seek(SeekFrom::Start(0))?;
		Ok(self)
	}

	/// Read the file, consuming the probe
	///
	/// # Errors
	///
	/// * No file type could be resolved ([`UnknownFormat`])
	/// * Reading the file fails
	///
	/// [`UnknownFormat`]: crate::error::ErrorKind::UnknownFormat
	pub fn read(mut self) -> Result<AudioFile<F>> {
		let Some(file_type) = self.file_type else {
			err!(UnknownFormat);
		};

		self.stream.seek(SeekFrom::Start(0))?;
		AudioFile::read(self.stream, file_type, self.options)
	}
}

/// Read a file from a path, guessing its type from the extension and content
///
/// # Errors
///
/// See [`Probe::open`] and [`Probe::read`]
pub fn read_from_path(path: impl AsRef<Path>) -> Result<AudioFile<File>> {
	Probe::open(path)?.guess_file_type()?.read()
}

/// Read a file from an already opened stream, guessing its type from the content
///
/// # Errors
///
/// See [`Probe::read`]
pub fn read_from<F: FileLike>(stream: F) -> Result<AudioFile<F>> {
	Probe::new(FileStream::new(stream)).guess_file_type()?.read()
}

#[cfg(test)]
mod tests {
	use super::{FormatRegistry, Probe, builtin_resolver};
	use crate::ape::ApeTag;
	use crate::config::WriteOptions;
	use crate::file::FileType;
	use crate::io::FileStream;
	use crate::tag::{Accessor, Tag};

	use std::io::Cursor;

	#[test_log::test]
	fn builtin_signatures() {
		assert_eq!(builtin_resolver(b"MAC \x98\x0F"), Some(FileType::Ape));
		assert_eq!(builtin_resolver(b"fLaC\x80"), Some(FileType::Flac));
		assert_eq!(builtin_resolver(b"RIFF\x04\x00\x00\x00WAVE"), Some(FileType::Wav));
		assert_eq!(builtin_resolver(&[0xFF, 0xFB, 0x90]), Some(FileType::Mpeg));
		assert_eq!(builtin_resolver(&[0xFF, 0xF1, 0x50]), Some(FileType::Aac));
		assert_eq!(builtin_resolver(&[0x00, 0x00, 0x01, 0xBA]), Some(FileType::MpegVideo));
		assert_eq!(builtin_resolver(b"ID3\x04\x00"), Some(FileType::Mpeg));
		assert_eq!(builtin_resolver(b"OggS"), None);
	}

	#[test_log::test]
	fn custom_resolver_wins() {
		fn resolver(buf: &[u8]) -> Option<FileType> {
			// Steal FLAC detection
			(buf.starts_with(b"fLaC")).then_some(FileType::Wav)
		}

		let mut registry = FormatRegistry::default();
		registry.register_resolver("thief", resolver);

		assert_eq!(registry.by_content(b"fLaC"), Some(FileType::Wav));
	}

	#[test_log::test]
	fn guess_skips_leading_ape_tag() {
		let mut tag = ApeTag::new();
		tag.set_title(String::from("In front of the media"));

		let mut data = tag.render(WriteOptions::new()).unwrap();
		data.extend_from_slice(b"fLaC\x80\x00\x00\x22");

		let probe = Probe::new(FileStream::new(Cursor::new(data)))
			.guess_file_type()
			.unwrap();

		assert_eq!(probe.file_type(), Some(FileType::Flac));
	}
}
