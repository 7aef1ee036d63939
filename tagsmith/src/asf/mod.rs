//! ASF specific items
//!
//! ASF files are a sequence of GUID-identified objects. The header object
//! wraps a File Properties object (play duration) and one Stream Properties
//! object per elementary stream.

use crate::bytevector::ByteVector;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::decode_err;
use crate::properties::{Codec, Properties};

use std::io::SeekFrom;
use std::time::Duration;

// GUIDs in their on-disk byte order
const HEADER_OBJECT: [u8; 16] = [
	0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE,
	0x6C,
];
const FILE_PROPERTIES_OBJECT: [u8; 16] = [
	0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53,
	0x65,
];
const STREAM_PROPERTIES_OBJECT: [u8; 16] = [
	0x91, 0x07, 0xDC, 0xB7, 0xB7, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53,
	0x65,
];
const AUDIO_MEDIA: [u8; 16] = [
	0x40, 0x9E, 0x69, 0xF8, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44,
	0x2B,
];
const VIDEO_MEDIA: [u8; 16] = [
	0xC0, 0xEF, 0x19, 0xBC, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44,
	0x2B,
];

/// Parse the ASF header object at `media_start`
///
/// The file-level play duration overrides the per-codec durations, which ASF
/// does not carry.
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	_parse_options: ParseOptions,
) -> Result<Properties> {
	stream.seek(SeekFrom::Start(media_start))?;

	// Header object: GUID (16), size (8), object count (4), reserved (2)
	let header = stream.read_block(30)?;
	if header.len() < 30 || !header.starts_with(&HEADER_OBJECT) {
		decode_err!(@BAIL Asf, "File missing ASF header object");
	}

	let object_count = header.to_u32_le(24);

	let mut codecs = Vec::new();
	let mut duration = None;

	for _ in 0..object_count {
		let position = stream.stream_position()?;
		if position + 24 > media_end {
			decode_err!(@BAIL Asf, "File ends mid ASF object");
		}

		let object_header = stream.read_block(24)?;
		if object_header.len() < 24 {
			decode_err!(@BAIL Asf, "File ends mid ASF object");
		}

		let object_size = object_header.to_u64_le(16);
		if object_size < 24 {
			decode_err!(@BAIL Asf, "ASF object has an invalid size (< 24)");
		}

		let payload_size = (object_size - 24) as usize;

		match object_header.mid(0, 16).as_ref() {
			guid if guid == FILE_PROPERTIES_OBJECT => {
				let payload = stream.read_block(payload_size)?;
				if payload.len() < 80 {
					decode_err!(@BAIL Asf, "File properties object is truncated");
				}

				// Play duration is in 100 ns units and includes the preroll,
				// which is already in milliseconds
				let play_duration = payload.to_u64_le(40);
				let preroll = payload.to_u64_le(56);

				duration = Some(Duration::from_millis(
					(play_duration / 10_000).saturating_sub(preroll),
				));
			},
			guid if guid == STREAM_PROPERTIES_OBJECT => {
				let payload = stream.read_block(payload_size)?;
				if payload.len() < 54 {
					decode_err!(@BAIL Asf, "Stream properties object is truncated");
				}

				if let Some(codec) = parse_stream_properties(&payload) {
					codecs.push(codec);
				}
			},
			_ => {
				stream.seek(SeekFrom::Current(payload_size as i64))?;
			},
		}
	}

	if codecs.is_empty() {
		decode_err!(@BAIL Asf, "File has no stream properties objects");
	}

	Ok(match duration {
		Some(duration) => Properties::with_duration(codecs, duration),
		None => Properties::new(codecs),
	})
}

/// Decode one stream properties payload into a codec description
///
/// Layout: stream type GUID (16), error correction GUID (16), time offset (8),
/// type-specific length (4), error-correction length (4), flags (2),
/// reserved (4), then the type-specific data.
fn parse_stream_properties(payload: &ByteVector) -> Option<Codec> {
	let type_specific_len = payload.to_u32_le(40) as usize;
	let type_specific = payload.mid(54, type_specific_len);

	match payload.mid(0, 16).as_ref() {
		guid if guid == AUDIO_MEDIA => {
			// WAVEFORMATEX
			if type_specific.len() < 16 {
				log::warn!("ASF: Audio stream properties are truncated, skipping");
				return None;
			}

			let codec_id = type_specific.to_u16_le(0);
			let channels = type_specific.to_u16_le(2) as u8;
			let sample_rate = type_specific.to_u32_le(4);
			let avg_bytes_per_sec = type_specific.to_u32_le(8);
			let bits_per_sample = type_specific.to_u16_le(14) as u8;

			Some(Codec::audio(
				format!("ASF Audio (codec {codec_id:#06X})"),
				Duration::ZERO,
				avg_bytes_per_sec * 8 / 1000,
				sample_rate,
				channels,
				bits_per_sample,
			))
		},
		guid if guid == VIDEO_MEDIA => {
			if type_specific.len() < 8 {
				log::warn!("ASF: Video stream properties are truncated, skipping");
				return None;
			}

			let width = type_specific.to_u32_le(0);
			let height = type_specific.to_u32_le(4);

			Some(Codec::video(
				String::from("ASF Video"),
				Duration::ZERO,
				0,
				width,
				height,
			))
		},
		_ => {
			log::debug!("ASF: Skipping stream of unknown media type");
			None
		},
	}
}

#[cfg(test)]
mod tests {
	use super::{
		AUDIO_MEDIA, FILE_PROPERTIES_OBJECT, HEADER_OBJECT, STREAM_PROPERTIES_OBJECT,
		read_properties,
	};
	use crate::config::ParseOptions;
	use crate::io::FileStream;

	use std::io::Cursor;
	use std::time::Duration;

	fn file_properties_object(play_duration_100ns: u64, preroll_ms: u64) -> Vec<u8> {
		let mut payload = vec![0u8; 80];
		payload[40..48].copy_from_slice(&play_duration_100ns.to_le_bytes());
		payload[56..64].copy_from_slice(&preroll_ms.to_le_bytes());

		let mut out = Vec::new();
		out.extend_from_slice(&FILE_PROPERTIES_OBJECT);
		out.extend_from_slice(&(24 + payload.len() as u64).to_le_bytes());
		out.extend_from_slice(&payload);
		out
	}

	fn audio_stream_object() -> Vec<u8> {
		let mut wave_format = Vec::new();
		wave_format.extend_from_slice(&0x0161u16.to_le_bytes()); // WMA2
		wave_format.extend_from_slice(&2u16.to_le_bytes());
		wave_format.extend_from_slice(&44100u32.to_le_bytes());
		wave_format.extend_from_slice(&16000u32.to_le_bytes()); // avg bytes/sec
		wave_format.extend_from_slice(&0u16.to_le_bytes());
		wave_format.extend_from_slice(&16u16.to_le_bytes());

		let mut payload = vec![0u8; 54];
		payload[..16].copy_from_slice(&AUDIO_MEDIA);
		payload[40..44].copy_from_slice(&(wave_format.len() as u32).to_le_bytes());
		payload.extend_from_slice(&wave_format);

		let mut out = Vec::new();
		out.extend_from_slice(&STREAM_PROPERTIES_OBJECT);
		out.extend_from_slice(&(24 + payload.len() as u64).to_le_bytes());
		out.extend_from_slice(&payload);
		out
	}

	fn asf_file() -> Vec<u8> {
		let file_props = file_properties_object(30 * 10_000_000 + 3000 * 10_000, 3000);
		let stream_props = audio_stream_object();

		let mut out = Vec::new();
		out.extend_from_slice(&HEADER_OBJECT);
		let total = 30 + file_props.len() + stream_props.len();
		out.extend_from_slice(&(total as u64).to_le_bytes());
		out.extend_from_slice(&2u32.to_le_bytes());
		out.extend_from_slice(&[0x01, 0x02]); // reserved
		out.extend_from_slice(&file_props);
		out.extend_from_slice(&stream_props);
		out
	}

	#[test_log::test]
	fn parse_asf() {
		let data = asf_file();
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let properties = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();

		// 30 s of play duration after the 3 s preroll is subtracted
		assert_eq!(properties.duration(), Duration::from_millis(30_000));
		assert_eq!(properties.audio_sample_rate(), 44100);
		assert_eq!(properties.audio_channels(), 2);
		assert_eq!(properties.audio_bitrate(), 128);
		assert_eq!(properties.bit_depth(), 16);
	}

	#[test_log::test]
	fn missing_header_object_fails() {
		let data = vec![0u8; 64];
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}

	#[test_log::test]
	fn no_streams_fails() {
		let file_props = file_properties_object(10_000_000, 0);

		let mut data = Vec::new();
		data.extend_from_slice(&HEADER_OBJECT);
		data.extend_from_slice(&((30 + file_props.len()) as u64).to_le_bytes());
		data.extend_from_slice(&1u32.to_le_bytes());
		data.extend_from_slice(&[0x01, 0x02]);
		data.extend_from_slice(&file_props);

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}
}
