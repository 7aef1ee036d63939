use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::decode_err;
use crate::properties::Codec;

use std::io::SeekFrom;
use std::time::Duration;

/// Parse the Monkey's Audio stream header at `media_start`
///
/// The stream region is `media_start..media_end`; everything outside it is tag
/// data already accounted for.
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	parse_options: ParseOptions,
) -> Result<Vec<Codec>> {
	stream.seek(SeekFrom::Start(media_start))?;

	let magic = stream.read_block(4)?;
	if &*magic != b"MAC " {
		decode_err!(@BAIL Ape, "Invalid magic found in APE header");
	}

	let version_block = stream.read_block(2)?;
	if version_block.len() < 2 {
		decode_err!(@BAIL Ape, "Unable to read APE stream version");
	}

	let version = u32::from(version_block.to_u16_le(0));

	let stream_len = media_end - media_start;

	// Property layout differs between versions
	let codec = if version >= 3980 {
		properties_gt_3980(stream, version, stream_len, parse_options)?
	} else {
		properties_lt_3980(stream, version, stream_len, parse_options)?
	};

	Ok(vec![codec])
}

fn properties_gt_3980<F: FileLike>(
	stream: &mut FileStream<F>,
	version: u32,
	stream_len: u64,
	parse_options: ParseOptions,
) -> Result<Codec> {
	// The descriptor continues with padding (2) and its own length (4)
	let descriptor = stream.read_block(46)?;
	if descriptor.len() < 46 {
		decode_err!(@BAIL Ape, "Not enough data left in stream to finish file descriptor");
	}

	// The only piece of information we need from the file descriptor
	let descriptor_len = descriptor.to_u32_le(2);

	// The descriptor should be 52 bytes long (including 'MAC ' and the version);
	// anything extra is unknown, and just gets skipped
	if descriptor_len > 52 {
		stream.seek(SeekFrom::Current(i64::from(descriptor_len - 52)))?;
	}

	let header = stream.read_block(24)?;
	if header.len() < 24 {
		decode_err!(@BAIL Ape, "Not enough data left in stream to finish MAC header");
	}

	// Compression type (2) and format flags (2) are skipped
	let blocks_per_frame = header.to_u32_le(4);
	let final_frame_blocks = header.to_u32_le(8);
	let total_frames = header.to_u32_le(12);
	let bit_depth = header.to_u16_le(16) as u8;
	let channels = header.to_u16_le(18) as u8;
	let sample_rate = header.to_u32_le(20);

	build_codec(
		version,
		sample_rate,
		bit_depth,
		channels,
		total_frames,
		final_frame_blocks,
		blocks_per_frame,
		stream_len,
		parse_options,
	)
}

fn properties_lt_3980<F: FileLike>(
	stream: &mut FileStream<F>,
	version: u32,
	stream_len: u64,
	parse_options: ParseOptions,
) -> Result<Codec> {
	// Versions < 3980 don't have a descriptor
	let header = stream.read_block(26)?;
	if header.len() < 26 {
		decode_err!(@BAIL Ape, "Not enough data left in stream to finish MAC header");
	}

	let compression_level = u32::from(header.to_u16_le(0));
	let format_flags = header.to_u16_le(2);

	let bit_depth = if (format_flags & 0b1) == 1 {
		8
	} else if (format_flags & 0b1000) == 8 {
		24
	} else {
		16
	};

	let blocks_per_frame = match version {
		_ if version >= 3950 => 73728 * 4,
		_ if version >= 3900 || (version >= 3800 && compression_level >= 4000) => 73728,
		_ => 9216,
	};

	let channels = header.to_u16_le(4) as u8;
	let sample_rate = header.to_u32_le(6);

	// WAV header length (4) and WAV tail length (4) are skipped
	let total_frames = header.to_u32_le(18);
	let final_frame_blocks = header.to_u32_le(22);

	build_codec(
		version,
		sample_rate,
		bit_depth,
		channels,
		total_frames,
		final_frame_blocks,
		blocks_per_frame,
		stream_len,
		parse_options,
	)
}

#[allow(clippy::too_many_arguments)]
fn build_codec(
	version: u32,
	sample_rate: u32,
	bit_depth: u8,
	channels: u8,
	total_frames: u32,
	final_frame_blocks: u32,
	blocks_per_frame: u32,
	stream_len: u64,
	parse_options: ParseOptions,
) -> Result<Codec> {
	if sample_rate == 0 {
		decode_err!(@BAIL Ape, "File has a sample rate of 0");
	}

	match verify(total_frames, channels) {
		Err(e) if parse_options.parsing_mode == ParsingMode::Strict => return Err(e),
		Err(_) => {
			return Ok(Codec::audio(
				description(version),
				Duration::ZERO,
				0,
				sample_rate,
				channels,
				bit_depth,
			));
		},
		_ => {},
	}

	let mut total_samples = u64::from(final_frame_blocks);
	if total_frames > 1 {
		total_samples += u64::from(blocks_per_frame) * u64::from(total_frames - 1);
	}

	// Durations round half up at the millisecond for this format
	let length = (total_samples as f64 * 1000.0) / f64::from(sample_rate);
	let duration = Duration::from_millis((length + 0.5) as u64);

	let mut bitrate = 0;
	if length > 0.0 {
		bitrate = ((stream_len as f64) * 8.0 / length + 0.5) as u32;
	}

	Ok(Codec::audio(
		description(version),
		duration,
		bitrate,
		sample_rate,
		channels,
		bit_depth,
	))
}

fn description(version: u32) -> String {
	format!("Monkey's Audio v{:.2}", f64::from(version) / 1000.0)
}

/// Verifies the channel count falls within the bounds of the spec, and we have
/// some audio frames to work with.
fn verify(total_frames: u32, channels: u8) -> Result<()> {
	if !(1..=32).contains(&channels) {
		decode_err!(@BAIL Ape, "File has an invalid channel count (must be between 1 and 32 inclusive)");
	}

	if total_frames == 0 {
		decode_err!(@BAIL Ape, "File contains no frames");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::read_properties;
	use crate::config::ParseOptions;
	use crate::io::FileStream;

	use std::io::Cursor;
	use std::time::Duration;

	fn mac_header_3990() -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(b"MAC ");
		out.extend_from_slice(&3990u16.to_le_bytes()); // version
		// Descriptor: padding (2), descriptor length (4) = 52, rest zero
		out.extend_from_slice(&0u16.to_le_bytes());
		out.extend_from_slice(&52u32.to_le_bytes());
		out.extend_from_slice(&[0u8; 40]);
		// Header: compression (2), format flags (2)
		out.extend_from_slice(&2000u16.to_le_bytes());
		out.extend_from_slice(&0u16.to_le_bytes());
		out.extend_from_slice(&73728u32.to_le_bytes()); // blocks per frame
		out.extend_from_slice(&22050u32.to_le_bytes()); // final frame blocks
		out.extend_from_slice(&3u32.to_le_bytes()); // total frames
		out.extend_from_slice(&16u16.to_le_bytes()); // bit depth
		out.extend_from_slice(&2u16.to_le_bytes()); // channels
		out.extend_from_slice(&44100u32.to_le_bytes()); // sample rate
		out
	}

	#[test_log::test]
	fn parse_mac_header() {
		let data = mac_header_3990();
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();
		assert_eq!(codecs.len(), 1);

		let codec = &codecs[0];
		assert_eq!(codec.description(), "Monkey's Audio v3.99");

		// ((3 - 1) * 73728 + 22050) / 44100 * 1000 ms, rounded half up
		let total_samples = 2u64 * 73728 + 22050;
		let expected = (total_samples as f64 * 1000.0 / 44100.0 + 0.5) as u64;
		assert_eq!(codec.duration(), Duration::from_millis(expected));
	}

	#[test_log::test]
	fn reject_bad_magic() {
		let mut data = mac_header_3990();
		data[0] = b'X';
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}

	#[test_log::test]
	fn reject_zero_sample_rate() {
		let mut data = mac_header_3990();
		let sr_offset = data.len() - 4;
		data[sr_offset..].copy_from_slice(&0u32.to_le_bytes());
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}
}
