//! RIFF WAVE specific items

use crate::config::ParseOptions;
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::decode_err;
use crate::properties::Codec;

use std::io::SeekFrom;
use std::time::Duration;

const PCM: u16 = 0x0001;
const IEEE_FLOAT: u16 = 0x0003;
const EXTENSIBLE: u16 = 0xFFFE;

/// Parse the RIFF WAVE stream between `media_start` and `media_end`
///
/// The `fmt ` chunk supplies the wave format parameters; the `data` chunk's
/// length drives the duration.
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	_parse_options: ParseOptions,
) -> Result<Vec<Codec>> {
	stream.seek(SeekFrom::Start(media_start))?;

	let envelope = stream.read_block(12)?;
	if envelope.len() < 12 || !envelope.starts_with(b"RIFF") || &envelope[8..12] != b"WAVE" {
		decode_err!(@BAIL Wav, "File missing RIFF/WAVE envelope");
	}

	let mut fmt = None;
	let mut data_len = None;

	// Chunks are word-aligned; an odd length is followed by a pad byte
	while stream.stream_position()? + 8 <= media_end {
		let chunk_header = stream.read_block(8)?;
		if chunk_header.len() < 8 {
			break;
		}

		let length = chunk_header.to_u32_le(4);

		match &chunk_header[..4] {
			b"fmt " => {
				if length < 16 {
					decode_err!(@BAIL Wav, "File has an invalid \"fmt \" chunk size (< 16)");
				}

				let block = stream.read_block(16)?;
				if block.len() < 16 {
					decode_err!(@BAIL Wav, "File ends mid \"fmt \" chunk");
				}

				fmt = Some(block);
				stream.seek(SeekFrom::Current(i64::from(length - 16)))?;
			},
			b"data" => {
				data_len = Some(u64::from(length));
				stream.seek(SeekFrom::Current(i64::from(length)))?;
			},
			_ => {
				stream.seek(SeekFrom::Current(i64::from(length)))?;
			},
		}

		if length % 2 != 0 {
			stream.seek(SeekFrom::Current(1))?;
		}
	}

	let Some(fmt) = fmt else {
		decode_err!(@BAIL Wav, "File has no \"fmt \" chunk");
	};

	let Some(data_len) = data_len else {
		decode_err!(@BAIL Wav, "File has no \"data\" chunk");
	};

	let format_tag = fmt.to_u16_le(0);
	let channels = fmt.to_u16_le(2) as u8;
	let sample_rate = fmt.to_u32_le(4);
	let avg_bytes_per_sec = fmt.to_u32_le(8);
	let bits_per_sample = fmt.to_u16_le(14) as u8;

	if sample_rate == 0 {
		decode_err!(@BAIL Wav, "File has a sample rate of 0");
	}

	if avg_bytes_per_sec == 0 {
		decode_err!(@BAIL Wav, "File has an average byte rate of 0");
	}

	// duration = data_len * 1000 / avg_bytes_per_sec, floored
	let duration = Duration::from_millis(data_len * 1000 / u64::from(avg_bytes_per_sec));
	let bitrate = avg_bytes_per_sec * 8 / 1000;

	let description = match format_tag {
		PCM => String::from("PCM WAV"),
		IEEE_FLOAT => String::from("IEEE Float WAV"),
		EXTENSIBLE => String::from("Extensible WAV"),
		other => format!("WAV (format {other})"),
	};

	Ok(vec![Codec::audio(
		description,
		duration,
		bitrate,
		sample_rate,
		channels,
		bits_per_sample,
	)])
}

#[cfg(test)]
mod tests {
	use super::read_properties;
	use crate::config::ParseOptions;
	use crate::io::FileStream;

	use std::io::Cursor;
	use std::time::Duration;

	fn wav_file(data_len: u32) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(b"RIFF");
		out.extend_from_slice(&(36 + data_len).to_le_bytes());
		out.extend_from_slice(b"WAVE");

		out.extend_from_slice(b"fmt ");
		out.extend_from_slice(&16u32.to_le_bytes());
		out.extend_from_slice(&1u16.to_le_bytes()); // PCM
		out.extend_from_slice(&2u16.to_le_bytes()); // channels
		out.extend_from_slice(&44100u32.to_le_bytes()); // sample rate
		out.extend_from_slice(&176_400u32.to_le_bytes()); // avg bytes/sec
		out.extend_from_slice(&4u16.to_le_bytes()); // block align
		out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

		out.extend_from_slice(b"data");
		out.extend_from_slice(&data_len.to_le_bytes());
		out.extend_from_slice(&vec![0u8; data_len as usize]);
		out
	}

	#[test_log::test]
	fn parse_wav() {
		let data = wav_file(176_400);
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();
		let codec = &codecs[0];

		assert_eq!(codec.description(), "PCM WAV");
		// One second of data
		assert_eq!(codec.duration(), Duration::from_millis(1000));

		let properties = crate::properties::Properties::new(codecs.clone());
		assert_eq!(properties.audio_bitrate(), 1411);
		assert_eq!(properties.audio_sample_rate(), 44100);
		assert_eq!(properties.audio_channels(), 2);
		assert_eq!(properties.bit_depth(), 16);
	}

	#[test_log::test]
	fn missing_data_chunk_fails() {
		let mut data = wav_file(0);
		// Rename the data chunk
		let pos = data.len() - 8;
		data[pos..pos + 4].copy_from_slice(b"junk");

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}

	#[test_log::test]
	fn zero_sample_rate_is_corrupt() {
		let mut data = wav_file(64);
		data[24..28].copy_from_slice(&0u32.to_le_bytes());

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}
}
