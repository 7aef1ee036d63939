//! Embedded pictures

use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

/// The picture's MIME type, sniffed from the image data
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MimeType {
	/// PNG image
	Png,
	/// JPEG image
	Jpeg,
	/// TIFF image
	Tiff,
	/// BMP image
	Bmp,
	/// GIF image
	Gif,
	/// Some unknown MIME type
	Unknown(String),
}

impl MimeType {
	/// The MIME type's string representation, ex. "image/png"
	pub fn as_str(&self) -> &str {
		match self {
			MimeType::Jpeg => "image/jpeg",
			MimeType::Png => "image/png",
			MimeType::Tiff => "image/tiff",
			MimeType::Bmp => "image/bmp",
			MimeType::Gif => "image/gif",
			MimeType::Unknown(unknown) => unknown,
		}
	}

	/// Guess a MIME type from the first bytes of image data
	pub fn from_data(data: &[u8]) -> Self {
		match data {
			[0x89, b'P', b'N', b'G', ..] => MimeType::Png,
			[0xFF, 0xD8, 0xFF, ..] => MimeType::Jpeg,
			[b'G', b'I', b'F', b'8', ..] => MimeType::Gif,
			[b'B', b'M', ..] => MimeType::Bmp,
			[b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => MimeType::Tiff,
			_ => MimeType::Unknown(String::from("application/octet-stream")),
		}
	}
}

/// The role a picture plays within a tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PictureType {
	/// The front of the album
	CoverFront,
	/// The back of the album
	CoverBack,
	/// Some other picture
	Other,
}

/// Represents a picture embedded in a tag
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Picture {
	pub(crate) pic_type: PictureType,
	pub(crate) mime_type: MimeType,
	pub(crate) description: Option<Cow<'static, str>>,
	pub(crate) data: Cow<'static, [u8]>,
}

impl Debug for Picture {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Picture")
			.field("pic_type", &self.pic_type)
			.field("mime_type", &self.mime_type)
			.field("description", &self.description)
			.field("data", &format_args!("{} bytes", self.data.len()))
			.finish()
	}
}

impl Picture {
	/// Create a `Picture`, sniffing the MIME type from `data`
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsmith::picture::{MimeType, Picture, PictureType};
	///
	/// let picture = Picture::new(PictureType::CoverFront, None, vec![0x89, b'P', b'N', b'G']);
	/// assert_eq!(picture.mime_type(), &MimeType::Png);
	/// ```
	#[must_use]
	pub fn new(pic_type: PictureType, description: Option<String>, data: Vec<u8>) -> Self {
		let mime_type = MimeType::from_data(&data);

		Self {
			pic_type,
			mime_type,
			description: description.map(Cow::Owned),
			data: Cow::Owned(data),
		}
	}

	/// The picture's role
	pub fn pic_type(&self) -> PictureType {
		self.pic_type
	}

	/// The picture's MIME type
	pub fn mime_type(&self) -> &MimeType {
		&self.mime_type
	}

	/// The picture's description
	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// The raw image data
	pub fn data(&self) -> &[u8] {
		&self.data
	}
}
