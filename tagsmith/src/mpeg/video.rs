use crate::config::ParseOptions;
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::decode_err;
use crate::properties::Codec;

use std::io::SeekFrom;
use std::time::Duration;

/// The start code of an MPEG video sequence header
const SEQUENCE_HEADER_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xB3];

/// Parse the MPEG video sequence header between `media_start` and `media_end`
///
/// Program streams wrap the sequence header in pack/system headers, so it is
/// searched for within the junk window rather than expected at offset 0.
/// Duration stays zero: deriving it needs the container timestamps, and a
/// missing duration is preferred over a wrong one.
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	parse_options: ParseOptions,
) -> Result<Vec<Codec>> {
	let search_end = media_end.min(media_start + parse_options.max_junk_bytes as u64);

	let offset = match stream.find(&SEQUENCE_HEADER_CODE, media_start, None)? {
		Some(offset) if offset < search_end => offset,
		_ => decode_err!(@BAIL MpegVideo, "File contains no sequence header"),
	};

	stream.seek(SeekFrom::Start(offset + 4))?;
	let data = stream.read_block(8)?;
	if data.len() < 8 {
		decode_err!(@BAIL MpegVideo, "Sequence header is truncated");
	}

	// 12 bits width, 12 bits height, 4 bits aspect ratio, 4 bits frame rate
	// code, 18 bits bitrate in 400 bps units
	let width = (u32::from(data[0]) << 4) | (u32::from(data[1]) >> 4);
	let height = ((u32::from(data[1]) & 0xF) << 8) | u32::from(data[2]);

	let bitrate_units =
		(u32::from(data[4]) << 10) | (u32::from(data[5]) << 2) | (u32::from(data[6]) >> 6);
	let bitrate = bitrate_units * 400 / 1000;

	if width == 0 || height == 0 {
		decode_err!(@BAIL MpegVideo, "Sequence header has a zero dimension");
	}

	Ok(vec![Codec::video(
		String::from("MPEG Video"),
		Duration::ZERO,
		bitrate,
		width,
		height,
	)])
}

#[cfg(test)]
mod tests {
	use super::read_properties;
	use crate::config::ParseOptions;
	use crate::io::FileStream;

	use std::io::Cursor;

	fn sequence_header(width: u32, height: u32, bitrate_units: u32) -> Vec<u8> {
		let mut out = vec![0x00, 0x00, 0x01, 0xB3];
		out.push((width >> 4) as u8);
		out.push((((width & 0xF) << 4) | (height >> 8)) as u8);
		out.push((height & 0xFF) as u8);
		out.push(0x14); // aspect ratio + frame rate code
		out.push((bitrate_units >> 10) as u8);
		out.push((bitrate_units >> 2) as u8);
		out.push((((bitrate_units & 0b11) << 6) | 0x20) as u8);
		out.push(0);
		out
	}

	#[test_log::test]
	fn parse_sequence_header() {
		// Pack header bytes precede the sequence header
		let mut data = vec![0x00, 0x00, 0x01, 0xBA, 0x44, 0x00, 0x04, 0x00, 0x04, 0x01];
		data.extend_from_slice(&sequence_header(352, 288, 2875));

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();
		let codec = &codecs[0];

		assert_eq!(codec.description(), "MPEG Video");
		assert!(codec.media_types().is_video());

		// 2875 * 400 bps = 1150 kbps
		let properties = crate::properties::Properties::new(codecs.clone());
		assert_eq!(properties.video_width(), 352);
		assert_eq!(properties.video_height(), 288);
	}

	#[test_log::test]
	fn missing_sequence_header_fails() {
		let data = vec![0u8; 256];
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}
}
