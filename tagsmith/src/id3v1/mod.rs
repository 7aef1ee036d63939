//! ID3v1 specific items
//!
//! ID3v1 is a severely limited format, with each field being incredibly small
//! in size. All fields have been commented with their maximum sizes and any
//! other additional restrictions. Writing a field greater than its maximum
//! size will **not** error, it will just be shrunk on render.

mod constants;

pub use constants::GENRES;
pub(crate) use constants::ID3V1_TAG_MARKER;

use crate::bytevector::ByteVector;
use crate::config::{ParsingMode, WriteOptions};
use crate::error::Result;
use crate::macros::err;
use crate::picture::Picture;
use crate::tag::{Accessor, Tag, TagType};
use crate::util::text::{latin1_decode, latin1_encode};

use std::borrow::Cow;

macro_rules! impl_accessor {
	($($name:ident,)+) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					self.$name.as_deref().map(Cow::Borrowed)
				}

				fn [<set_ $name>](&mut self, value: String) {
					self.$name = Some(value)
				}

				fn [<remove_ $name>](&mut self) {
					self.$name = None
				}
			)+
		}
	}
}

/// An ID3v1 tag
///
/// The format occupies exactly the last 128 bytes of a file, and is always
/// written as ID3v1.1 (with a track number stealing the comment's last two
/// bytes).
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Id3v1Tag {
	/// Track title, 30 bytes max
	pub title: Option<String>,
	/// Track artist, 30 bytes max
	pub artist: Option<String>,
	/// Album title, 30 bytes max
	pub album: Option<String>,
	/// Release year (max 9999)
	pub year: Option<u16>,
	/// A short comment
	///
	/// A V1 tag may have been read, which limits this field to 30 bytes.
	/// A V1.1 tag, however, only has 28 bytes available.
	pub comment: Option<String>,
	/// The track number, 1 byte max
	///
	/// The track number **cannot** be 0; readers look for a null byte at the
	/// end of the comment to differentiate between V1 and V1.1.
	pub track_number: Option<u8>,
	/// The track's genre, an index into [`GENRES`]
	pub genre: Option<u8>,
}

impl Id3v1Tag {
	/// Create a new empty `Id3v1Tag`
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse a 128-byte ID3v1 tag block
	///
	/// # Errors
	///
	/// * `data` does not start with the `TAG` marker ([`FakeTag`])
	/// * In [`ParsingMode::Strict`], the year field is not 4 ASCII digits
	///
	/// [`FakeTag`]: crate::error::ErrorKind::FakeTag
	pub fn parse(data: &ByteVector, parse_mode: ParsingMode) -> Result<Self> {
		if data.len() < 128 || !data.starts_with(&ID3V1_TAG_MARKER) {
			err!(FakeTag);
		}

		let mut tag = Self::default();
		let data = &data[3..];

		tag.title = decode_text(&data[..30]);
		tag.artist = decode_text(&data[30..60]);
		tag.album = decode_text(&data[60..90]);

		tag.year = try_parse_year(&data[90..94], parse_mode)?;

		// Determine the range of the comment (30 bytes for ID3v1 and 28 for ID3v1.1)
		// We check for the null terminator 28 bytes in, and for a non-zero track number after it.
		// A track number of 0 is invalid.
		let range = if data[122] == 0 && data[123] != 0 {
			tag.track_number = Some(data[123]);

			94_usize..122
		} else {
			94..124
		};

		tag.comment = decode_text(&data[range]);

		if (data[124] as usize) < GENRES.len() {
			tag.genre = Some(data[124]);
		}

		Ok(tag)
	}

	/// The genre's name, if the stored index is valid
	pub fn genre_str(&self) -> Option<&'static str> {
		self.genre
			.and_then(|idx| GENRES.get(idx as usize).copied())
	}
}

fn decode_text(data: &[u8]) -> Option<String> {
	let mut first_null_pos = data.len();
	if let Some(null_pos) = data.iter().position(|&b| b == 0) {
		if null_pos == 0 {
			return None;
		}

		if data[null_pos..].iter().any(|b| *b != b'\0') {
			log::warn!("ID3v1 text field contains trailing junk, skipping");
		}

		first_null_pos = null_pos;
	}

	Some(latin1_decode(&data[..first_null_pos]))
}

fn try_parse_year(input: &[u8], parse_mode: ParsingMode) -> Result<Option<u16>> {
	let (num_digits, year) = input
		.iter()
		.take_while(|c| c.is_ascii_digit())
		.fold((0usize, 0u16), |(num_digits, year), c| {
			(num_digits + 1, year * 10 + u16::from(*c - b'0'))
		});

	if num_digits != 4 {
		// Most writers put "\0\0\0\0" in empty year fields rather than "0000",
		// so only a strict parse treats this as a failure
		if parse_mode == ParsingMode::Strict {
			err!(TextDecode("ID3v1 year field contains non-digit characters"));
		}

		return Ok(None);
	}

	Ok(Some(year))
}

fn encode(tag: &Id3v1Tag, write_options: WriteOptions) -> Result<Vec<u8>> {
	fn resize_field(value: Option<&str>, size: usize, write_options: WriteOptions) -> Result<Vec<u8>> {
		let mut out = vec![0; size];

		if let Some(value) = value {
			let encoded = latin1_encode(value, write_options.lossy_text_encoding)?;
			let take = encoded.len().min(size);
			out[..take].copy_from_slice(&encoded[..take]);
		}

		Ok(out)
	}

	let mut writer = Vec::with_capacity(128);

	writer.extend_from_slice(&ID3V1_TAG_MARKER);
	writer.extend_from_slice(&resize_field(tag.title.as_deref(), 30, write_options)?);
	writer.extend_from_slice(&resize_field(tag.artist.as_deref(), 30, write_options)?);
	writer.extend_from_slice(&resize_field(tag.album.as_deref(), 30, write_options)?);

	match tag.year {
		Some(year) if year <= 9999 => writer.extend_from_slice(format!("{year:04}").as_bytes()),
		_ => writer.extend_from_slice(&[0; 4]),
	}

	// Always written as V1.1: 28 comment bytes, a null, then the track number
	writer.extend_from_slice(&resize_field(tag.comment.as_deref(), 28, write_options)?);
	writer.push(0);
	writer.push(tag.track_number.unwrap_or(0));
	writer.push(tag.genre.unwrap_or(255));

	Ok(writer)
}

impl Accessor for Id3v1Tag {
	impl_accessor!(title, artist, album,);

	fn comment(&self) -> Option<Cow<'_, str>> {
		self.comment.as_deref().map(Cow::Borrowed)
	}

	fn set_comment(&mut self, value: String) {
		self.comment = Some(value);
	}

	fn remove_comment(&mut self) {
		self.comment = None;
	}

	fn year(&self) -> Option<u32> {
		self.year.map(u32::from)
	}

	fn set_year(&mut self, value: u32) {
		if value <= 9999 {
			self.year = Some(value as u16);
		}
	}

	fn remove_year(&mut self) {
		self.year = None;
	}

	fn track(&self) -> Option<u32> {
		self.track_number.map(u32::from)
	}

	fn set_track(&mut self, value: u32) {
		// 0 is not expressible in V1.1
		if (1..=255).contains(&value) {
			self.track_number = Some(value as u8);
		}
	}

	fn remove_track(&mut self) {
		self.track_number = None;
	}

	fn genre(&self) -> Option<Cow<'_, str>> {
		self.genre_str().map(Cow::Borrowed)
	}

	fn set_genre(&mut self, value: String) {
		// Either a known genre name, or a valid index given as a string
		let index = GENRES
			.iter()
			.position(|genre| genre.eq_ignore_ascii_case(&value))
			.map(|idx| idx as u8)
			.or_else(|| {
				value
					.parse::<u8>()
					.ok()
					.filter(|idx| (*idx as usize) < GENRES.len())
			});

		if let Some(index) = index {
			self.genre = Some(index);
		}
	}

	fn remove_genre(&mut self) {
		self.genre = None;
	}
}

impl Tag for Id3v1Tag {
	fn tag_type(&self) -> TagType {
		TagType::Id3v1
	}

	fn len(&self) -> usize {
		usize::from(self.title.is_some())
			+ usize::from(self.artist.is_some())
			+ usize::from(self.album.is_some())
			+ usize::from(self.year.is_some())
			+ usize::from(self.comment.is_some())
			+ usize::from(self.track_number.is_some())
			+ usize::from(self.genre.is_some())
	}

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn clear(&mut self) {
		*self = Self::default();
	}

	fn render(&self, write_options: WriteOptions) -> Result<Vec<u8>> {
		// An empty tag renders to nothing, removing it from the file on save
		if self.is_empty() {
			return Ok(Vec::new());
		}

		encode(self, write_options)
	}

	fn pictures(&self) -> Vec<Picture> {
		// Pictures aren't supported in this format
		Vec::new()
	}

	fn set_pictures(&mut self, _pictures: Vec<Picture>) {}

	fn remove_pictures(&mut self) {}

	fn as_id3v1(&self) -> Option<&Id3v1Tag> {
		Some(self)
	}

	fn as_id3v1_mut(&mut self) -> Option<&mut Id3v1Tag> {
		Some(self)
	}
}

#[cfg(test)]
mod tests {
	use super::Id3v1Tag;
	use crate::bytevector::ByteVector;
	use crate::config::{ParsingMode, WriteOptions};
	use crate::tag::{Accessor, Tag};

	fn sample_tag() -> Id3v1Tag {
		let mut tag = Id3v1Tag::new();
		tag.set_title(String::from("Foo title"));
		tag.set_artist(String::from("Bar artist"));
		tag.set_album(String::from("Baz album"));
		tag.set_year(1984);
		tag.set_comment(String::from("Qux comment"));
		tag.set_track(5);
		tag.set_genre(String::from("Darkwave"));
		tag
	}

	#[test_log::test]
	fn round_trip() {
		let tag = sample_tag();
		let rendered = tag.render(WriteOptions::new()).unwrap();
		assert_eq!(rendered.len(), 128);

		let reparsed =
			Id3v1Tag::parse(&ByteVector::from(rendered), ParsingMode::BestAttempt).unwrap();
		assert_eq!(reparsed, tag);
	}

	#[test_log::test]
	fn fields_shrink_on_render() {
		let mut tag = Id3v1Tag::new();
		tag.set_title("X".repeat(40));

		let rendered = tag.render(WriteOptions::new()).unwrap();
		let reparsed =
			Id3v1Tag::parse(&ByteVector::from(rendered), ParsingMode::BestAttempt).unwrap();

		assert_eq!(reparsed.title().as_deref(), Some(&*"X".repeat(30)));
	}

	#[test_log::test]
	fn v1_comment_without_track() {
		let mut tag = sample_tag();
		tag.track_number = None;
		tag.comment = Some("c".repeat(30));

		// A V1.1 render only has 28 comment bytes
		let rendered = tag.render(WriteOptions::new()).unwrap();
		let reparsed =
			Id3v1Tag::parse(&ByteVector::from(rendered), ParsingMode::BestAttempt).unwrap();

		assert_eq!(reparsed.comment().as_deref(), Some(&*"c".repeat(28)));
		assert_eq!(reparsed.track(), None);
	}

	#[test_log::test]
	fn marker_required() {
		let data = ByteVector::from(vec![0u8; 128]);
		assert!(Id3v1Tag::parse(&data, ParsingMode::BestAttempt).is_err());
	}

	#[test_log::test]
	fn strict_year_parsing() {
		let mut rendered = sample_tag().render(WriteOptions::new()).unwrap();
		// Corrupt the year field
		rendered[93] = b'x';

		let data = ByteVector::from(rendered);
		assert!(Id3v1Tag::parse(&data, ParsingMode::Strict).is_err());

		let relaxed = Id3v1Tag::parse(&data, ParsingMode::BestAttempt).unwrap();
		assert_eq!(relaxed.year(), None);
	}

	#[test_log::test]
	fn genre_by_name_and_index() {
		let mut tag = Id3v1Tag::new();
		tag.set_genre(String::from("metal"));
		assert_eq!(tag.genre().as_deref(), Some("Metal"));

		tag.set_genre(String::from("0"));
		assert_eq!(tag.genre().as_deref(), Some("Blues"));

		// Unknown genres leave the field untouched
		tag.set_genre(String::from("Not a genre"));
		assert_eq!(tag.genre().as_deref(), Some("Blues"));
	}
}
