//! FLAC specific items
//!
//! Only the metadata block walk and the STREAMINFO decode live here; FLAC's
//! own tagging (Vorbis comments) is not part of the supported tag set.

use crate::config::ParseOptions;
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::decode_err;
use crate::properties::Codec;

use std::io::SeekFrom;
use std::time::Duration;

const STREAMINFO_SIZE: usize = 34;

/// Parse the FLAC stream between `media_start` and `media_end`
///
/// The `fLaC` marker must open the media region; STREAMINFO is mandatory and
/// must be the first metadata block.
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	_parse_options: ParseOptions,
) -> Result<Vec<Codec>> {
	stream.seek(SeekFrom::Start(media_start))?;

	let marker = stream.read_block(4)?;
	if &*marker != b"fLaC" {
		decode_err!(@BAIL Flac, "File missing \"fLaC\" stream marker");
	}

	let mut stream_info = None;
	let mut last_block = false;

	// Walk the metadata blocks; the audio frames start after the last one
	while !last_block {
		let block_header = stream.read_block(4)?;
		if block_header.len() < 4 {
			decode_err!(@BAIL Flac, "File ends mid metadata block header");
		}

		last_block = block_header[0] & 0x80 != 0;
		let block_type = block_header[0] & 0x7F;
		let length = block_header.to_u32_be(0) & 0xFF_FFFF;

		if block_type == 0 {
			if length as usize != STREAMINFO_SIZE {
				decode_err!(@BAIL Flac, "STREAMINFO block has an invalid size");
			}

			let block = stream.read_block(STREAMINFO_SIZE)?;
			if block.len() < STREAMINFO_SIZE {
				decode_err!(@BAIL Flac, "File ends mid STREAMINFO block");
			}

			stream_info = Some(block);
			continue;
		}

		stream.seek(SeekFrom::Current(i64::from(length)))?;
	}

	let Some(info) = stream_info else {
		decode_err!(@BAIL Flac, "File has no STREAMINFO block");
	};

	// Minimum/maximum block size (4) and frame size (6) are skipped.
	// Then: 20 bits sample rate, 3 bits channels - 1, 5 bits bits-per-sample - 1,
	// 36 bits total samples
	let packed = info.to_u32_be(10);
	let sample_rate = packed >> 12;
	let channels = ((packed >> 9) & 0b111) + 1;
	let bits_per_sample = ((packed >> 4) & 0b11111) + 1;

	let total_samples = u64::from(info.to_u32_be(14)) | (u64::from(packed & 0xF) << 32);

	if sample_rate == 0 {
		decode_err!(@BAIL Flac, "File has a sample rate of 0");
	}

	let audio_start = stream.stream_position()?;
	let stream_len = media_end.saturating_sub(audio_start);

	// duration = total_samples / sample_rate * 1000, floored
	let length_ms = total_samples * 1000 / u64::from(sample_rate);
	let duration = Duration::from_millis(length_ms);

	let mut bitrate = 0;
	if length_ms > 0 {
		bitrate = ((stream_len * 8) / length_ms) as u32;
	}

	Ok(vec![Codec::audio(
		String::from("FLAC"),
		duration,
		bitrate,
		sample_rate,
		channels as u8,
		bits_per_sample as u8,
	)])
}
