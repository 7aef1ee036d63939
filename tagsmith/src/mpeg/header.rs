use super::constants::{BITRATES, PADDING_SIZES, SAMPLE_RATES, SAMPLES, SIDE_INFORMATION_SIZES};
use crate::bytevector::ByteVector;
use crate::error::Result;
use crate::io::{BUFFER_SIZE, FileLike, FileStream};

use std::io::SeekFrom;

/// MPEG Audio version
#[derive(Default, PartialEq, Eq, Copy, Clone, Debug)]
#[allow(missing_docs)]
pub enum MpegVersion {
	#[default]
	V1,
	V2,
	V2_5,
	/// Exclusive to AAC
	V4,
}

/// MPEG layer
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Layer {
	Layer1 = 1,
	Layer2 = 2,
	#[default]
	Layer3 = 3,
}

/// Channel mode
#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum ChannelMode {
	#[default]
	Stereo = 0,
	JointStereo = 1,
	/// Two independent mono channels
	DualChannel = 2,
	SingleChannel = 3,
}

pub(crate) fn verify_frame_sync(frame_sync: [u8; 2]) -> bool {
	frame_sync[0] == 0xFF && frame_sync[1] >> 5 == 0b111
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Header {
	pub(crate) sample_rate: u32,
	pub(crate) len: u32,
	pub(crate) data_start: u32,
	pub(crate) samples: u16,
	pub(crate) bitrate: u32,
	pub(crate) version: MpegVersion,
	pub(crate) layer: Layer,
	pub(crate) channel_mode: ChannelMode,
}

impl Header {
	/// Decode a 4-byte frame header
	///
	/// Returns `None` on any reserved index; compressed audio is full of false
	/// sync matches, so a failed decode just means the scan continues.
	pub(crate) fn read(data: u32) -> Option<Self> {
		let version = match (data >> 19) & 0b11 {
			0b00 => MpegVersion::V2_5,
			0b10 => MpegVersion::V2,
			0b11 => MpegVersion::V1,
			_ => return None,
		};

		let version_index = if version == MpegVersion::V1 { 0 } else { 1 };

		let layer = match (data >> 17) & 0b11 {
			0b01 => Layer::Layer3,
			0b10 => Layer::Layer2,
			0b11 => Layer::Layer1,
			_ => {
				log::debug!("MPEG: Frame header uses a reserved layer");
				return None;
			},
		};

		let layer_index = (layer as usize).saturating_sub(1);

		let bitrate_index = (data >> 12) & 0xF;
		let bitrate = BITRATES[version_index][layer_index][bitrate_index as usize];
		if bitrate == 0 {
			return None;
		}

		// This is invalid, not a different rate
		let sample_rate_index = (data >> 10) & 0b11;
		if sample_rate_index == 0b11 {
			return None;
		}

		let sample_rate = SAMPLE_RATES[version as usize][sample_rate_index as usize];

		let has_padding = ((data >> 9) & 1) == 1;
		let mut padding = 0;

		if has_padding {
			padding = u32::from(PADDING_SIZES[layer_index]);
		}

		// The remaining bits (mode extension, copyright, original, emphasis)
		// carry no technical parameters and are left undecoded
		let channel_mode = match (data >> 6) & 0b11 {
			0b00 => ChannelMode::Stereo,
			0b01 => ChannelMode::JointStereo,
			0b10 => ChannelMode::DualChannel,
			0b11 => ChannelMode::SingleChannel,
			_ => unreachable!(),
		};

		let samples = SAMPLES[layer_index][version_index];
		let len = (u32::from(samples) * bitrate * 125 / sample_rate) + padding;
		let data_start = SIDE_INFORMATION_SIZES[version_index][channel_mode as usize] + 4;

		Some(Self {
			sample_rate,
			len,
			data_start,
			samples,
			bitrate,
			version,
			layer,
			channel_mode,
		})
	}

	/// Whether two headers could belong to the same stream
	pub(crate) fn cmp(self, other: &Self) -> bool {
		self.version == other.version
			&& self.layer == other.layer
			&& self.sample_rate == other.sample_rate
	}
}

/// Search for the first believable frame header at or after `start`
///
/// The scan walks chunk windows looking for 11 set bits, decodes each
/// candidate, and cross-checks it against the header one frame length ahead.
/// A candidate whose successor cannot be read (the stream ends first) is
/// accepted; one whose successor disagrees is treated as a false sync.
///
/// `max_search_length` bounds the distance between `start` and the sync
/// pattern; `None` searches to EOF.
pub(crate) fn find_frame_header<F: FileLike>(
	stream: &mut FileStream<F>,
	start: u64,
	max_search_length: Option<u64>,
) -> Result<Option<(u64, Header)>> {
	let file_len = stream.len()?;

	let search_end = match max_search_length {
		Some(max) => file_len.min(start.saturating_add(max)),
		None => file_len,
	};

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

			if !verify_frame_sync([window[i], window[i + 1]]) {
				continue;
			}

			let header_data = read_header_data(stream, &window, i, candidate)?;
			let Some(header) = Header::read(header_data) else {
				continue;
			};

			match cross_check(stream, candidate, &header)? {
				HeaderCmpResult::NotEqual => continue,
				_ => return Ok(Some((candidate, header))),
			}
		}

		// Keep one byte of overlap so a sync straddling the boundary is seen
		window_start += (window.len() - 1) as u64;
	}

	Ok(None)
}

enum HeaderCmpResult {
	Equal,
	Undetermined,
	NotEqual,
}

fn read_header_data<F: FileLike>(
	stream: &mut FileStream<F>,
	window: &ByteVector,
	index: usize,
	absolute: u64,
) -> Result<u32> {
	if index + 4 <= window.len() {
		return Ok(window.to_u32_be(index));
	}

	stream.seek(SeekFrom::Start(absolute))?;
	Ok(stream.read_block(4)?.to_u32_be(0))
}

fn cross_check<F: FileLike>(
	stream: &mut FileStream<F>,
	candidate: u64,
	header: &Header,
) -> Result<HeaderCmpResult> {
	stream.seek(SeekFrom::Start(candidate + u64::from(header.len)))?;

	let next = stream.read_block(4)?;
	if next.len() < 4 {
		return Ok(HeaderCmpResult::Undetermined);
	}

	match Header::read(next.to_u32_be(0)) {
		Some(next_header) if header.cmp(&next_header) => Ok(HeaderCmpResult::Equal),
		_ => Ok(HeaderCmpResult::NotEqual),
	}
}

#[derive(Copy, Clone)]
pub(crate) enum VbrHeaderType {
	Xing,
	Info,
	Vbri,
}

/// A secondary Xing/Info/VBRI header found in the first frame of a VBR stream
#[derive(Copy, Clone)]
pub(crate) struct VbrHeader {
	pub(crate) ty: VbrHeaderType,
	pub(crate) frames: u32,
	pub(crate) size: u32,
}

impl VbrHeader {
	/// Parse a VBR descriptor from the block at its expected offset
	pub(crate) fn parse(data: &ByteVector) -> Option<Self> {
		match data.mid(0, 4).as_ref() {
			b"Xing" | b"Info" => {
				if data.len() < 16 {
					log::debug!("MPEG: Xing header has an invalid size (< 16)");
					return None;
				}

				let flags = data.to_u32_be(4);
				if flags & 0x03 != 0x03 {
					log::debug!(
						"MPEG: Xing header doesn't have required flags set (0x0001 and 0x0002)"
					);
					return None;
				}

				let frames = data.to_u32_be(8);
				let size = data.to_u32_be(12);

				let ty = if data.starts_with(b"Xing") {
					VbrHeaderType::Xing
				} else {
					VbrHeaderType::Info
				};

				Some(Self { ty, frames, size })
			},
			b"VBRI" => {
				if data.len() < 32 {
					log::debug!("MPEG: VBRI header has an invalid size (< 32)");
					return None;
				}

				// Version ID (2), delay (2), and quality (2) are skipped
				let size = data.to_u32_be(10);
				let frames = data.to_u32_be(14);

				Some(Self {
					ty: VbrHeaderType::Vbri,
					frames,
					size,
				})
			},
			_ => None,
		}
	}

	pub(crate) fn is_valid(&self) -> bool {
		self.frames > 0 && self.size > 0
	}
}

#[cfg(test)]
mod tests {
	use super::{Header, VbrHeader, find_frame_header};
	use crate::io::FileStream;

	use std::io::Cursor;

	// 128 kbps, 44.1 kHz, stereo, layer 3, version 1
	const CBR_HEADER: u32 = 0xFFFB_9000;

	#[test_log::test]
	fn decode_cbr_header() {
		let header = Header::read(CBR_HEADER).unwrap();

		assert_eq!(header.bitrate, 128);
		assert_eq!(header.sample_rate, 44100);
		assert_eq!(header.len, 417);
		assert_eq!(header.samples, 1152);
		assert_eq!(header.data_start, 36);
	}

	#[test_log::test]
	fn reject_reserved_fields() {
		// All-zero and all-one words aren't headers
		assert!(Header::read(0).is_none());
		assert!(Header::read(u32::MAX).is_none());

		// Reserved bitrate index (0b1111)
		assert!(Header::read(0xFFFB_F000).is_none());
		// Reserved sample rate index (0b11)
		assert!(Header::read(0xFFFB_9C00).is_none());
		// Reserved layer (0b00)
		assert!(Header::read(0xFFF9_9000).is_none());
	}

	#[test_log::test]
	fn find_header_after_junk() {
		let header = Header::read(CBR_HEADER).unwrap();

		let mut data = vec![0u8; 17];
		for _ in 0..2 {
			let mut frame = vec![0u8; header.len as usize];
			frame[..4].copy_from_slice(&CBR_HEADER.to_be_bytes());
			data.extend_from_slice(&frame);
		}

		let mut stream = FileStream::new(Cursor::new(data));
		let (offset, found) = find_frame_header(&mut stream, 0, None).unwrap().unwrap();

		assert_eq!(offset, 17);
		assert_eq!(found.bitrate, 128);
		assert_eq!(found.sample_rate, 44100);
	}

	#[test_log::test]
	fn search_length_bounds_the_scan() {
		let header = Header::read(CBR_HEADER).unwrap();

		let mut data = vec![0u8; 64];
		let mut frame = vec![0u8; header.len as usize];
		frame[..4].copy_from_slice(&CBR_HEADER.to_be_bytes());
		data.extend_from_slice(&frame);

		let mut stream = FileStream::new(Cursor::new(data));
		assert!(
			find_frame_header(&mut stream, 0, Some(16))
				.unwrap()
				.is_none()
		);
	}

	#[test_log::test]
	fn parse_xing() {
		let mut data = Vec::new();
		data.extend_from_slice(b"Xing");
		data.extend_from_slice(&3u32.to_be_bytes()); // frames + bytes flags
		data.extend_from_slice(&1000u32.to_be_bytes()); // frames
		data.extend_from_slice(&500_000u32.to_be_bytes()); // bytes

		let header = VbrHeader::parse(&data.into()).unwrap();
		assert!(header.is_valid());
		assert_eq!(header.frames, 1000);
		assert_eq!(header.size, 500_000);
	}

	#[test_log::test]
	fn parse_vbri() {
		let mut data = Vec::new();
		data.extend_from_slice(b"VBRI");
		data.extend_from_slice(&1u16.to_be_bytes()); // version
		data.extend_from_slice(&0u16.to_be_bytes()); // delay
		data.extend_from_slice(&80u16.to_be_bytes()); // quality
		data.extend_from_slice(&500_000u32.to_be_bytes()); // bytes
		data.extend_from_slice(&1000u32.to_be_bytes()); // frames
		data.extend_from_slice(&[0u8; 14]); // TOC fields

		let header = VbrHeader::parse(&data.into()).unwrap();
		assert!(header.is_valid());
		assert_eq!(header.frames, 1000);
		assert_eq!(header.size, 500_000);
	}

	#[test_log::test]
	fn xing_without_flags_rejected() {
		let mut data = Vec::new();
		data.extend_from_slice(b"Xing");
		data.extend_from_slice(&0u32.to_be_bytes());
		data.extend_from_slice(&1000u32.to_be_bytes());
		data.extend_from_slice(&500_000u32.to_be_bytes());

		assert!(VbrHeader::parse(&data.into()).is_none());
	}
}
