//! ADTS AAC specific items
//!
//! Raw AAC framing as used outside a container. Each frame starts with a
//! 12-bit syncword; the fixed header carries the MPEG-4 sampling-frequency
//! index and channel configuration.

use crate::bytevector::ByteVector;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::io::{BUFFER_SIZE, FileLike, FileStream};
use crate::macros::decode_err;
use crate::mpeg::MpegVersion;
use crate::properties::Codec;

use std::io::SeekFrom;
use std::time::Duration;

// MPEG-4 sampling frequencies by index; 13 and 14 are reserved, 15 is forbidden
const SAMPLE_RATES: [u32; 13] = [
	96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

fn verify_adts_sync(bytes: [u8; 2]) -> bool {
	// 12 set bits, then version (any), layer == 0b00
	bytes[0] == 0xFF && (bytes[1] & 0xF6) == 0xF0
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct AdtsHeader {
	pub(crate) version: MpegVersion,
	pub(crate) sample_rate: u32,
	pub(crate) channels: u8,
	pub(crate) len: u32,
	pub(crate) frames_per_adts_frame: u8,
}

impl AdtsHeader {
	/// Decode the 7 fixed header bytes
	///
	/// Returns `None` on reserved field values; the scan continues past them,
	/// since false syncs are common inside compressed payloads.
	fn read(header: &ByteVector, offset: usize) -> Option<Self> {
		if header.len() < offset + 7 {
			return None;
		}

		let byte2 = header[offset + 1];
		let byte3 = header[offset + 2];
		let byte4 = header[offset + 3];
		let byte5 = header[offset + 4];
		let byte6 = header[offset + 5];
		let byte7 = header[offset + 6];

		let version = match (byte2 >> 3) & 0b1 {
			0 => MpegVersion::V4,
			_ => MpegVersion::V2,
		};

		let sample_rate_index = (byte3 >> 2) & 0b1111;
		let Some(&sample_rate) = SAMPLE_RATES.get(sample_rate_index as usize) else {
			log::debug!("AAC: Frame header uses a reserved sample frequency index");
			return None;
		};

		let channels = ((byte3 & 0b1) << 2) | ((byte4 >> 6) & 0b11);

		let len = (u32::from(byte4 & 0b11) << 11)
			| (u32::from(byte5) << 3)
			| (u32::from(byte6) >> 5);
		if len < 7 {
			return None;
		}

		let frames_per_adts_frame = (byte7 & 0b11) + 1;

		Some(Self {
			version,
			sample_rate,
			channels,
			len,
			frames_per_adts_frame,
		})
	}

	fn cmp(self, other: &Self) -> bool {
		self.version == other.version
			&& self.sample_rate == other.sample_rate
			&& self.channels == other.channels
	}
}

fn find_adts_header<F: FileLike>(
	stream: &mut FileStream<F>,
	start: u64,
	max_search_length: u64,
) -> Result<Option<(u64, AdtsHeader)>> {
	let file_len = stream.len()?;
	let search_end = file_len.min(start.saturating_add(max_search_length));

	let mut window_start = start;

	while window_start + 1 < search_end {
		stream.seek(SeekFrom::Start(window_start))?;
		let window = stream.read_block(BUFFER_SIZE)?;
		if window.len() < 2 {
			break;
		}

		for i in 0..window.len() - 1 {
			let candidate = window_start + i as u64;
			if candidate >= search_end {
				return Ok(None);
			}

			if !verify_adts_sync([window[i], window[i + 1]]) {
				continue;
			}

			let header = if i + 7 <= window.len() {
				AdtsHeader::read(&window, i)
			} else {
				stream.seek(SeekFrom::Start(candidate))?;
				let bytes = stream.read_block(7)?;
				AdtsHeader::read(&bytes, 0)
			};

			let Some(header) = header else { continue };

			// Cross-check against the next frame; a stream that ends before one
			// is still accepted
			stream.seek(SeekFrom::Start(candidate + u64::from(header.len)))?;
			let next = stream.read_block(7)?;
			if next.len() == 7 {
				match AdtsHeader::read(&next, 0) {
					Some(next_header) if header.cmp(&next_header) => {},
					_ => continue,
				}
			}

			return Ok(Some((candidate, header)));
		}

		window_start += (window.len() - 1) as u64;
	}

	Ok(None)
}

/// Parse the ADTS stream between `media_start` and `media_end`
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	parse_options: ParseOptions,
) -> Result<Vec<Codec>> {
	let Some((frame_offset, header)) =
		find_adts_header(stream, media_start, parse_options.max_junk_bytes as u64)?
	else {
		decode_err!(@BAIL Aac, "File contains no ADTS frame");
	};

	let stream_len = media_end.saturating_sub(frame_offset);

	// bitrate = frame_len * 8 * sample_rate / (frames_per_adts_frame * 1024) / 1000
	let bitrate = (u64::from(header.len) * 8 * u64::from(header.sample_rate)
		/ (u64::from(header.frames_per_adts_frame) * 1024)
		/ 1000) as u32;

	let mut duration = Duration::ZERO;
	if bitrate > 0 {
		// duration = stream_len * 8 / bitrate, floored at the millisecond
		duration = Duration::from_millis(stream_len * 8 / u64::from(bitrate));
	}

	let version = match header.version {
		MpegVersion::V4 => "MPEG-4",
		_ => "MPEG-2",
	};

	Ok(vec![Codec::audio(
		format!("{version} ADTS AAC"),
		duration,
		bitrate,
		header.sample_rate,
		header.channels,
		0,
	)])
}

#[cfg(test)]
mod tests {
	use super::{AdtsHeader, read_properties, verify_adts_sync};
	use crate::bytevector::ByteVector;
	use crate::config::ParseOptions;
	use crate::io::FileStream;

	use std::io::Cursor;
	use std::time::Duration;

	// MPEG-4, 44.1 kHz (index 4), 2 channels, frame length 416, one RDB
	fn adts_frame(len: u16) -> Vec<u8> {
		let mut frame = vec![0u8; len as usize];
		frame[0] = 0xFF;
		frame[1] = 0xF1; // MPEG-4, layer 0, no CRC
		frame[2] = 0b0101_0000; // profile LC, sample rate index 4
		frame[3] = (0b10 << 6) | ((len >> 11) as u8 & 0b11); // channel config 2
		frame[4] = (len >> 3) as u8;
		frame[5] = ((len as u8 & 0b111) << 5) | 0x1F;
		frame[6] = 0xFC; // buffer fullness low bits + one RDB
		frame
	}

	#[test_log::test]
	fn sync_verification() {
		assert!(verify_adts_sync([0xFF, 0xF1]));
		assert!(verify_adts_sync([0xFF, 0xF9]));
		// Layer bits must be zero
		assert!(!verify_adts_sync([0xFF, 0xF3]));
		assert!(!verify_adts_sync([0xFB, 0xF1]));
	}

	#[test_log::test]
	fn decode_header() {
		let frame = ByteVector::from(adts_frame(416));
		let header = AdtsHeader::read(&frame, 0).unwrap();

		assert_eq!(header.sample_rate, 44100);
		assert_eq!(header.channels, 2);
		assert_eq!(header.len, 416);
		assert_eq!(header.frames_per_adts_frame, 1);
	}

	#[test_log::test]
	fn reserved_sample_rate_index_rejected() {
		let mut frame = adts_frame(416);
		frame[2] = (frame[2] & 0b1100_0011) | (15 << 2);

		assert!(AdtsHeader::read(&ByteVector::from(frame), 0).is_none());
	}

	#[test_log::test]
	fn properties_follow_the_formulas() {
		let mut data = adts_frame(416);
		data.extend_from_slice(&adts_frame(416));

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();
		let codec = &codecs[0];

		let expected_bitrate = (416u64 * 8 * 44100 / 1024 / 1000) as u32;
		let properties = crate::properties::Properties::new(codecs.clone());
		assert_eq!(properties.audio_bitrate(), expected_bitrate);

		let expected_duration = len * 8 / u64::from(expected_bitrate);
		assert_eq!(codec.duration(), Duration::from_millis(expected_duration));
	}

	#[test_log::test]
	fn missing_frame_fails() {
		let data = vec![0u8; 512];
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}
}
