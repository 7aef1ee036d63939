//! File types and the `AudioFile` handle

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::err;
use crate::properties::Properties;
use crate::sandwich::Sandwich;
use crate::tag::{Tag, TagType, TagTypes};

use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

/// The type of file read
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum FileType {
	/// ADTS AAC
	Aac,
	/// Monkey's Audio
	Ape,
	/// Windows Media / Advanced Systems Format
	Asf,
	/// FLAC
	Flac,
	/// MPEG audio (MP1/MP2/MP3)
	Mpeg,
	/// MPEG video, raw or in a program stream
	MpegVideo,
	/// RIFF WAVE
	Wav,
}

impl FileType {
	/// The tag type a file of this type carries by preference
	///
	/// Every supported format sandwiches the same tag set, and APE tags are the
	/// richer of the two.
	#[must_use]
	pub fn primary_tag_type(&self) -> TagType {
		TagType::Ape
	}

	/// The tag types writable to a file of this type
	#[must_use]
	pub fn supported_tag_types(&self) -> TagTypes {
		TagTypes::ALL
	}

	/// Whether `tag_type` can be written to this file type
	#[must_use]
	pub fn supports_tag_type(&self, tag_type: TagType) -> bool {
		self.supported_tag_types().contains(tag_type)
	}

	/// Guess a `FileType` from a file extension
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsmith::file::FileType;
	///
	/// assert_eq!(FileType::from_ext("flac"), Some(FileType::Flac));
	/// assert_eq!(FileType::from_ext("docx"), None);
	/// ```
	pub fn from_ext<E>(ext: E) -> Option<Self>
	where
		E: AsRef<OsStr>,
	{
		let ext = ext.as_ref().to_str()?.to_ascii_lowercase();

		match ext.as_str() {
			"aac" => Some(Self::Aac),
			"ape" => Some(Self::Ape),
			"asf" | "wma" | "wmv" => Some(Self::Asf),
			"flac" => Some(Self::Flac),
			"mp1" | "mp2" | "mp3" => Some(Self::Mpeg),
			"mpg" | "mpeg" | "m2v" => Some(Self::MpegVideo),
			"wav" | "wave" => Some(Self::Wav),
			_ => None,
		}
	}

	/// Guess a `FileType` from a path's extension
	pub fn from_path<P>(path: P) -> Option<Self>
	where
		P: AsRef<Path>,
	{
		let ext = path.as_ref().extension()?;
		Self::from_ext(ext)
	}
}

/// An opened audio file: its tags, properties, and the stream they came from
///
/// This is the handle the open operation returns. The tag facade is the
/// [`Sandwich`], reachable through [`AudioFile::tag`]; mutations persist with
/// [`AudioFile::save`], which rewrites only the tag regions.
///
/// The handle owns the stream until [`AudioFile::into_inner`]; dropping the
/// handle closes it.
pub struct AudioFile<F: FileLike = File> {
	file_type: FileType,
	stream: FileStream<F>,
	sandwich: Sandwich,
	properties: Properties,
	write_options: WriteOptions,
}

impl AudioFile<File> {
	/// Open the file at `path` for reading and writing, inferring the format
	/// from the extension
	///
	/// Use [`Probe`](crate::probe::Probe) for format hints, content-based
	/// guessing, or custom parse options.
	///
	/// # Errors
	///
	/// * `path` does not exist or is not readable/writable
	/// * The format cannot be determined, or its mandatory headers are invalid
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		crate::probe::Probe::open(&path)?.read()
	}

	/// Like [`AudioFile::open`], but any later [`AudioFile::save`] fails
	///
	/// # Errors
	///
	/// See [`AudioFile::open`]
	pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
		crate::probe::Probe::open_read_only(&path)?.read()
	}
}

impl<F: FileLike> AudioFile<F> {
	pub(crate) fn read(
		mut stream: FileStream<F>,
		file_type: FileType,
		parse_options: ParseOptions,
	) -> Result<Self> {
		let sandwich = Sandwich::read(&mut stream, parse_options)?;

		let properties = if parse_options.read_properties {
			read_properties(
				&mut stream,
				file_type,
				sandwich.media_start(),
				sandwich.media_end(),
				parse_options,
			)?
		} else {
			Properties::default()
		};

		Ok(Self {
			file_type,
			stream,
			sandwich,
			properties,
			write_options: WriteOptions::default(),
		})
	}

	/// The type this file was read as
	pub fn file_type(&self) -> FileType {
		self.file_type
	}

	/// The combined tag facade
	pub fn tag(&self) -> &Sandwich {
		&self.sandwich
	}

	/// Mutable access to the combined tag facade
	pub fn tag_mut(&mut self) -> &mut Sandwich {
		&mut self.sandwich
	}

	/// The file's technical properties
	///
	/// Empty when the file was opened with
	/// [`ParseOptions::read_properties`] disabled.
	pub fn properties(&self) -> &Properties {
		&self.properties
	}

	/// Whether the file holds any tag
	pub fn contains_tag(&self) -> bool {
		self.sandwich.tag_count() > 0
	}

	/// Whether the file holds a tag of `tag_type`
	pub fn contains_tag_type(&self, tag_type: TagType) -> bool {
		self.sandwich.contains(tag_type)
	}

	/// The first held tag of `tag_type`, optionally creating it at its
	/// preferred placement
	///
	/// # Errors
	///
	/// * `tag_type` is not supported by the file type
	pub fn tag_of(
		&mut self,
		tag_type: TagType,
		create_if_absent: bool,
	) -> Result<Option<&mut (dyn Tag + 'static)>> {
		if !self.file_type.supports_tag_type(tag_type) {
			err!(UnsupportedTag);
		}

		Ok(self.sandwich.tag_of_mut(tag_type, create_if_absent))
	}

	/// Drop every held tag whose type is in `types`
	///
	/// The bytes leave the file on the next [`AudioFile::save`].
	pub fn remove_tags(&mut self, types: TagTypes) {
		self.sandwich.remove_tags(types);
	}

	/// The write options used by [`AudioFile::save`]
	pub fn set_write_options(&mut self, write_options: WriteOptions) {
		self.write_options = write_options;
	}

	/// Commit every tag mutation with minimal rewriting
	///
	/// # Errors
	///
	/// * The file was opened read-only
	/// * The file is flagged possibly corrupt
	/// * [`std::io::Error`]
	pub fn save(&mut self) -> Result<()> {
		let write_options = self.write_options;
		self.sandwich.save(&mut self.stream, write_options)
	}

	/// Consume the handle, returning the wrapped stream
	pub fn into_inner(self) -> F {
		self.stream.into_inner()
	}
}

fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	file_type: FileType,
	media_start: u64,
	media_end: u64,
	parse_options: ParseOptions,
) -> Result<Properties> {
	let properties = match file_type {
		FileType::Aac => Properties::new(crate::aac::read_properties(
			stream,
			media_start,
			media_end,
			parse_options,
		)?),
		FileType::Ape => Properties::new(crate::ape::properties::read_properties(
			stream,
			media_start,
			media_end,
			parse_options,
		)?),
		FileType::Asf => {
			crate::asf::read_properties(stream, media_start, media_end, parse_options)?
		},
		FileType::Flac => Properties::new(crate::flac::read_properties(
			stream,
			media_start,
			media_end,
			parse_options,
		)?),
		FileType::Mpeg => Properties::new(crate::mpeg::properties::read_properties(
			stream,
			media_start,
			media_end,
			parse_options,
		)?),
		FileType::MpegVideo => Properties::new(crate::mpeg::video::read_properties(
			stream,
			media_start,
			media_end,
			parse_options,
		)?),
		FileType::Wav => Properties::new(crate::riff::read_properties(
			stream,
			media_start,
			media_end,
			parse_options,
		)?),
	};

	Ok(properties)
}

#[cfg(test)]
mod tests {
	use super::FileType;

	#[test_log::test]
	fn extension_mapping() {
		assert_eq!(FileType::from_ext("MP3"), Some(FileType::Mpeg));
		assert_eq!(FileType::from_ext("ape"), Some(FileType::Ape));
		assert_eq!(FileType::from_ext("wma"), Some(FileType::Asf));
		assert_eq!(FileType::from_ext("mpg"), Some(FileType::MpegVideo));
		assert_eq!(FileType::from_ext("ogg"), None);

		assert_eq!(
			FileType::from_path("/music/some.album/track.flac"),
			Some(FileType::Flac)
		);
		assert_eq!(FileType::from_path("no_extension"), None);
	}
}
