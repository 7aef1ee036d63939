use super::ApeTag;
use crate::ape::constants::{APE_ENVELOPE_SIZE, APE_PREAMBLE, APE_VERSION};
use crate::ape::header::ApeTagFlags;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::err;

use byteorder::{LittleEndian, WriteBytesExt};

/// Render a full APE tag: items plus envelope
///
/// An empty tag renders to nothing, which the save path treats as "remove the
/// tag region". Items whose value is empty are dropped. The envelope is
/// doubled (header mirror before the items) when the tag carries one.
pub(crate) fn render(tag: &ApeTag, _write_options: WriteOptions) -> Result<Vec<u8>> {
	let mut items = Vec::new();
	let mut item_count = 0u32;

	for item in &tag.items {
		if item.value().is_empty() {
			continue;
		}

		items.extend_from_slice(&item.render());
		item_count += 1;
	}

	if item_count == 0 {
		return Ok(Vec::new());
	}

	let size = items.len() as u64 + u64::from(APE_ENVELOPE_SIZE);
	if size > u64::from(u32::MAX) {
		err!(TooMuchData);
	}

	let mut footer_flags = ApeTagFlags::default();
	footer_flags.set_has_footer(true);
	footer_flags.set_has_header(tag.has_header);
	footer_flags.set_read_only(tag.read_only);

	let mut out = Vec::with_capacity(items.len() + 2 * APE_ENVELOPE_SIZE as usize);

	if tag.has_header {
		let mut header_flags = footer_flags;
		header_flags.set_is_header(true);
		write_envelope(&mut out, size as u32, item_count, header_flags);
	}

	out.extend_from_slice(&items);
	write_envelope(&mut out, size as u32, item_count, footer_flags);

	Ok(out)
}

fn write_envelope(out: &mut Vec<u8>, size: u32, item_count: u32, flags: ApeTagFlags) {
	out.extend_from_slice(APE_PREAMBLE);

	// Writing into a Vec is infallible
	let _ = out.write_u32::<LittleEndian>(APE_VERSION);
	let _ = out.write_u32::<LittleEndian>(size);
	let _ = out.write_u32::<LittleEndian>(item_count);
	let _ = out.write_u32::<LittleEndian>(flags.bits());
	let _ = out.write_u64::<LittleEndian>(0);
}
