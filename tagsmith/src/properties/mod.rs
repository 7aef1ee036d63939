//! Technical stream properties
//!
//! Each stream header parser produces one [`Codec`] describing an elementary
//! stream; [`Properties`] merges the codecs discovered in a file into a single
//! logical duration/bitrate/channel view.

use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::time::Duration;

/// The kinds of media a codec can carry, as a bit set
///
/// Codecs can flag more than one kind; a file's combined media types are the
/// bitwise OR over its codecs.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[repr(transparent)]
pub struct MediaTypes(pub(crate) u32);

impl MediaTypes {
	/// No media types
	pub const NONE: Self = Self(0);
	/// The stream carries audio
	pub const AUDIO: Self = Self(1 << 0);
	/// The stream carries video
	pub const VIDEO: Self = Self(1 << 1);
	/// The stream carries a still image
	pub const PHOTO: Self = Self(1 << 2);

	/// The bit mask
	#[must_use]
	pub const fn bits(self) -> u32 {
		self.0
	}

	/// Whether the audio bit is set
	#[must_use]
	pub const fn is_audio(self) -> bool {
		self.0 & Self::AUDIO.0 != 0
	}

	/// Whether the video bit is set
	#[must_use]
	pub const fn is_video(self) -> bool {
		self.0 & Self::VIDEO.0 != 0
	}

	/// Whether the photo bit is set
	#[must_use]
	pub const fn is_photo(self) -> bool {
		self.0 & Self::PHOTO.0 != 0
	}
}

impl BitOr for MediaTypes {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self::Output {
		Self(self.0 | rhs.0)
	}
}

impl BitOrAssign for MediaTypes {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

impl BitAnd for MediaTypes {
	type Output = Self;

	fn bitand(self, rhs: Self) -> Self::Output {
		Self(self.0 & rhs.0)
	}
}

/// An *immutable* description of one elementary stream
///
/// Produced once per successful header parse. Fields irrelevant to the codec's
/// media kind stay zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct Codec {
	pub(crate) media_types: MediaTypes,
	pub(crate) duration: Duration,
	pub(crate) description: String,
	pub(crate) audio_bitrate: u32,
	pub(crate) sample_rate: u32,
	pub(crate) channels: u8,
	pub(crate) bit_depth: u8,
	pub(crate) width: u32,
	pub(crate) height: u32,
	pub(crate) photo_quality: u32,
}

impl Codec {
	/// Create an audio codec description
	#[must_use]
	pub fn audio(
		description: String,
		duration: Duration,
		bitrate: u32,
		sample_rate: u32,
		channels: u8,
		bit_depth: u8,
	) -> Self {
		Self {
			media_types: MediaTypes::AUDIO,
			duration,
			description,
			audio_bitrate: bitrate,
			sample_rate,
			channels,
			bit_depth,
			..Self::default()
		}
	}

	/// Create a video codec description
	#[must_use]
	pub fn video(
		description: String,
		duration: Duration,
		bitrate: u32,
		width: u32,
		height: u32,
	) -> Self {
		Self {
			media_types: MediaTypes::VIDEO,
			duration,
			description,
			audio_bitrate: bitrate,
			width,
			height,
			..Self::default()
		}
	}

	/// Create a photo codec description
	#[must_use]
	pub fn photo(description: String, width: u32, height: u32, quality: u32) -> Self {
		Self {
			media_types: MediaTypes::PHOTO,
			description,
			width,
			height,
			photo_quality: quality,
			..Self::default()
		}
	}

	/// The media kinds this codec carries
	pub fn media_types(&self) -> MediaTypes {
		self.media_types
	}

	/// Duration of the stream
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// A short human-readable description, e.g. `"MPEG Version 1 Audio, Layer 3"`
	pub fn description(&self) -> &str {
		&self.description
	}
}

/// The combined technical properties of one file
///
/// Aggregates zero-or-more codec descriptions; computed once at open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct Properties {
	pub(crate) codecs: Vec<Codec>,
	pub(crate) duration_override: Option<Duration>,
}

impl Properties {
	/// Create `Properties` from a set of codec descriptions
	#[must_use]
	pub fn new(codecs: Vec<Codec>) -> Self {
		Self {
			codecs,
			duration_override: None,
		}
	}

	/// Create `Properties` with an explicit duration, overriding the codecs'
	#[must_use]
	pub fn with_duration(codecs: Vec<Codec>, duration: Duration) -> Self {
		Self {
			codecs,
			duration_override: Some(duration),
		}
	}

	/// The codec descriptions this view aggregates
	pub fn codecs(&self) -> &[Codec] {
		&self.codecs
	}

	/// Duration of the media
	///
	/// The explicit override if one was supplied, otherwise the maximum across
	/// all codecs.
	pub fn duration(&self) -> Duration {
		if let Some(duration) = self.duration_override {
			return duration;
		}

		self.codecs
			.iter()
			.map(Codec::duration)
			.max()
			.unwrap_or(Duration::ZERO)
	}

	/// Semicolon-joined descriptions of all codecs
	pub fn description(&self) -> String {
		self.codecs
			.iter()
			.map(Codec::description)
			.collect::<Vec<_>>()
			.join("; ")
	}

	/// The union of all codecs' media kinds
	pub fn media_types(&self) -> MediaTypes {
		self.codecs
			.iter()
			.fold(MediaTypes::NONE, |acc, c| acc | c.media_types)
	}

	fn first_of(&self, kind: MediaTypes) -> Option<&Codec> {
		self.codecs
			.iter()
			.find(|c| (c.media_types & kind).bits() != 0)
	}

	/// Audio bitrate (kbps) of the first audio codec, 0 if none
	pub fn audio_bitrate(&self) -> u32 {
		self.first_of(MediaTypes::AUDIO)
			.map_or(0, |c| c.audio_bitrate)
	}

	/// Sample rate (Hz) of the first audio codec, 0 if none
	pub fn audio_sample_rate(&self) -> u32 {
		self.first_of(MediaTypes::AUDIO).map_or(0, |c| c.sample_rate)
	}

	/// Channel count of the first audio codec, 0 if none
	pub fn audio_channels(&self) -> u8 {
		self.first_of(MediaTypes::AUDIO).map_or(0, |c| c.channels)
	}

	/// Bits per sample of the first audio codec, 0 if none
	pub fn bit_depth(&self) -> u8 {
		self.first_of(MediaTypes::AUDIO).map_or(0, |c| c.bit_depth)
	}

	/// Width in pixels of the first video codec, 0 if none
	pub fn video_width(&self) -> u32 {
		self.first_of(MediaTypes::VIDEO).map_or(0, |c| c.width)
	}

	/// Height in pixels of the first video codec, 0 if none
	pub fn video_height(&self) -> u32 {
		self.first_of(MediaTypes::VIDEO).map_or(0, |c| c.height)
	}

	/// Width in pixels of the first photo codec, 0 if none
	pub fn photo_width(&self) -> u32 {
		self.first_of(MediaTypes::PHOTO).map_or(0, |c| c.width)
	}

	/// Height in pixels of the first photo codec, 0 if none
	pub fn photo_height(&self) -> u32 {
		self.first_of(MediaTypes::PHOTO).map_or(0, |c| c.height)
	}

	/// Quality indicator of the first photo codec, 0 if none
	pub fn photo_quality(&self) -> u32 {
		self.first_of(MediaTypes::PHOTO)
			.map_or(0, |c| c.photo_quality)
	}
}
