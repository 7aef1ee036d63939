use super::header::{
	ChannelMode, Header, Layer, MpegVersion, VbrHeader, VbrHeaderType, find_frame_header,
};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::io::{FileLike, FileStream};
use crate::macros::decode_err;
use crate::properties::Codec;
use crate::util::math::RoundedDivision;

use std::io::SeekFrom;
use std::time::Duration;

/// Parse the MPEG audio stream between `media_start` and `media_end`
///
/// The first frame header is searched within the junk window; failing to find
/// one fails the whole parse, since the primary header is mandatory.
pub(crate) fn read_properties<F: FileLike>(
	stream: &mut FileStream<F>,
	media_start: u64,
	media_end: u64,
	parse_options: ParseOptions,
) -> Result<Vec<Codec>> {
	let max_search = parse_options.max_junk_bytes as u64;

	let Some((frame_offset, header)) =
		find_frame_header(stream, media_start, Some(max_search))?
	else {
		decode_err!(@BAIL Mpeg, "File contains an invalid frame");
	};

	if header.sample_rate == 0 {
		decode_err!(@BAIL Mpeg, "Sample rate is 0");
	}

	// Try to read a Xing/Info/VBRI header at its version- and channel-mode-
	// dependent offset within the first frame
	stream.seek(SeekFrom::Start(frame_offset + u64::from(header.data_start)))?;
	let vbr_block = stream.read_block(32)?;
	let vbr_header = VbrHeader::parse(&vbr_block);

	let stream_len = media_end.saturating_sub(frame_offset);
	let codec = build_codec(&header, vbr_header, stream_len);

	Ok(vec![codec])
}

/// Compute duration and bitrate for a located stream
///
/// With a valid VBR descriptor the frame count is exact:
/// `duration = (samples_per_frame / sample_rate) * total_frames`.
/// Otherwise the constant-bitrate formula applies:
/// `frames = ceil(stream_len / frame_len)`,
/// `duration = frame_len * frames / (bitrate * 125)`.
pub(crate) fn build_codec(header: &Header, vbr_header: Option<VbrHeader>, stream_len: u64) -> Codec {
	let channels = if header.channel_mode == ChannelMode::SingleChannel {
		1
	} else {
		2
	};

	let mut duration = Duration::ZERO;
	let mut bitrate = header.bitrate;

	match vbr_header {
		Some(vbr) if vbr.is_valid() => {
			let ty = match vbr.ty {
				VbrHeaderType::Xing => "Xing",
				VbrHeaderType::Info => "Info",
				VbrHeaderType::Vbri => "VBRI",
			};
			log::debug!("MPEG: Valid {ty} header; using it to calculate duration");

			let samples_per_frame = u64::from(header.samples);
			let total_frames = u64::from(vbr.frames);

			let length_ms =
				(samples_per_frame * 1000 * total_frames).div_round(u64::from(header.sample_rate));

			if length_ms > 0 {
				duration = Duration::from_millis(length_ms);
				bitrate = ((u64::from(vbr.size) * 8) / length_ms) as u32;
			}
		},
		_ => {
			if stream_len > 0 {
				let frame_len = u64::from(header.len);
				let frames = stream_len.div_ceil(frame_len);

				let length_ms =
					(frame_len * frames * 1000).div_round(u64::from(header.bitrate) * 125);
				duration = Duration::from_millis(length_ms);
			}
		},
	}

	Codec::audio(
		description(header),
		duration,
		bitrate,
		header.sample_rate,
		channels,
		0,
	)
}

fn description(header: &Header) -> String {
	let version = match header.version {
		MpegVersion::V1 => "1",
		MpegVersion::V2 => "2",
		MpegVersion::V2_5 => "2.5",
		MpegVersion::V4 => "4",
	};

	let layer = match header.layer {
		Layer::Layer1 => 1,
		Layer::Layer2 => 2,
		Layer::Layer3 => 3,
	};

	format!("MPEG Version {version} Audio, Layer {layer}")
}

#[cfg(test)]
mod tests {
	use super::read_properties;
	use crate::config::ParseOptions;
	use crate::io::FileStream;

	use std::io::Cursor;
	use std::time::Duration;

	// 128 kbps, 44.1 kHz, stereo, layer 3, version 1; frame length 417
	const CBR_HEADER: u32 = 0xFFFB_9000;
	const FRAME_LEN: usize = 417;

	fn cbr_frame() -> Vec<u8> {
		let mut frame = vec![0u8; FRAME_LEN];
		frame[..4].copy_from_slice(&CBR_HEADER.to_be_bytes());
		frame
	}

	#[test_log::test]
	fn cbr_stream_with_leading_junk() {
		// A valid sync buried at offset 17
		let mut data = vec![0u8; 17];
		data.extend_from_slice(&cbr_frame());
		data.extend_from_slice(&cbr_frame());

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();
		let codec = &codecs[0];

		assert_eq!(codec.description(), "MPEG Version 1 Audio, Layer 3");

		// stream length 834 -> 2 whole frames -> 417 * 2 * 1000 / (128 * 125) ms
		let expected = (417u64 * 2 * 1000 + (128 * 125) / 2) / (128 * 125);
		assert_eq!(codec.duration(), Duration::from_millis(expected));
	}

	#[test_log::test]
	fn cbr_partial_trailing_frame_counts() {
		let mut data = cbr_frame();
		data.extend_from_slice(&cbr_frame()[..100]);

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();

		// 517 bytes -> ceil(517 / 417) = 2 frames
		let expected = (417u64 * 2 * 1000 + (128 * 125) / 2) / (128 * 125);
		assert_eq!(codecs[0].duration(), Duration::from_millis(expected));
	}

	#[test_log::test]
	fn xing_header_overrides_cbr_math() {
		let mut first_frame = cbr_frame();

		// The Xing block sits at data_start (36) within the first frame
		let mut xing = Vec::new();
		xing.extend_from_slice(b"Xing");
		xing.extend_from_slice(&3u32.to_be_bytes());
		xing.extend_from_slice(&1000u32.to_be_bytes()); // frames
		xing.extend_from_slice(&500_000u32.to_be_bytes()); // bytes
		first_frame[36..36 + xing.len()].copy_from_slice(&xing);

		let mut data = first_frame;
		data.extend_from_slice(&cbr_frame());

		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		let codecs = read_properties(&mut stream, 0, len, ParseOptions::new()).unwrap();
		let codec = &codecs[0];

		// 1152 samples * 1000 * 1000 frames / 44100 Hz, rounded
		let expected = (1152u64 * 1000 * 1000 + 44100 / 2) / 44100;
		assert_eq!(codec.duration(), Duration::from_millis(expected));
	}

	#[test_log::test]
	fn missing_primary_header_fails() {
		let data = vec![0u8; 2048];
		let len = data.len() as u64;
		let mut stream = FileStream::new(Cursor::new(data));

		assert!(read_properties(&mut stream, 0, len, ParseOptions::new()).is_err());
	}
}
