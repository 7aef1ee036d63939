use super::ApeTag;
use super::item::{ApeItem, ItemValue};
use crate::ape::constants::APE_PICTURE_TYPES;
use crate::ape::header::ApeHeader;
use crate::bytevector::ByteVector;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::decode_err;
use crate::util::text::utf8_decode;

/// Parse the item region of an APE tag
///
/// `data` holds exactly the items (the envelope has already been consumed).
/// The stored item count may promise more bytes than `data` holds; a truncated
/// trailing item stops the loop rather than failing the parse, so every intact
/// item before it is still returned.
pub(crate) fn parse_items(
	data: &ByteVector,
	header: &ApeHeader,
	parse_options: ParseOptions,
) -> Result<ApeTag> {
	log::debug!("APE: Reading a v{} tag with {} items", header.version, header.item_count);

	let mut tag = ApeTag {
		read_only: header.flags.read_only(),
		has_header: header.flags.has_header(),
		..ApeTag::default()
	};

	let mut offset = 0usize;

	for _ in 0..header.item_count {
		// [size:4][flags:4][key (>= 2)][0x00]
		if data.len().saturating_sub(offset) < 11 {
			log::warn!("APE: Stored item count exceeds the available bytes, stopping");
			break;
		}

		let value_size = data.to_u32_le(offset) as usize;
		let flags = data.to_u32_le(offset + 4);

		let Some(key_end) = data.find(&[0], offset + 8) else {
			log::warn!("APE: Encountered an unterminated item key, stopping");
			break;
		};

		let key_bytes = data.mid(offset + 8, key_end - (offset + 8));
		let value_offset = key_end + 1;

		if value_size > data.len() - value_offset.min(data.len()) {
			log::warn!("APE: Encountered a truncated trailing item, stopping");
			break;
		}

		offset = value_offset + value_size;

		let Ok(key) = utf8_decode(key_bytes.into_vec()) else {
			if parse_options.parsing_mode == ParsingMode::Strict {
				decode_err!(@BAIL Ape, "APE tag item contains a non UTF-8 key");
			}

			log::warn!("APE: Skipping item with a non UTF-8 key");
			continue;
		};

		if APE_PICTURE_TYPES
			.iter()
			.any(|ty| ty.eq_ignore_ascii_case(&key))
			&& !parse_options.read_cover_art
		{
			continue;
		}

		let value = data.mid(value_offset, value_size).into_vec();

		let parsed_value = match (flags >> 1) & 3 {
			0 => match utf8_decode(value) {
				Ok(text) => ItemValue::Text(
					text.split('\0').map(str::to_owned).collect::<Vec<_>>(),
				),
				Err(_) => {
					if parse_options.parsing_mode == ParsingMode::Strict {
						decode_err!(@BAIL Ape, "Failed to convert text item into a UTF-8 string");
					}

					log::warn!("APE: Skipping text item with invalid UTF-8");
					continue;
				},
			},
			1 => ItemValue::Binary(value),
			2 => match utf8_decode(value) {
				Ok(locator) => ItemValue::Locator(locator),
				Err(_) => {
					if parse_options.parsing_mode == ParsingMode::Strict {
						decode_err!(@BAIL Ape, "Failed to convert locator item into a UTF-8 string");
					}

					log::warn!("APE: Skipping locator item with invalid UTF-8");
					continue;
				},
			},
			_ => {
				if parse_options.parsing_mode == ParsingMode::Strict {
					decode_err!(@BAIL Ape, "APE tag item contains an invalid item type");
				}

				log::warn!("APE: Skipping item with a reserved item type");
				continue;
			},
		};

		let Ok(mut item) = ApeItem::new(key, parsed_value) else {
			if parse_options.parsing_mode == ParsingMode::Strict {
				decode_err!(@BAIL Ape, "APE tag item contains an illegal key");
			}

			log::warn!("APE: Skipping item with an illegal key");
			continue;
		};

		if (flags & 1) == 1 {
			item.read_only = true;
		}

		tag.insert(item);
	}

	Ok(tag)
}
