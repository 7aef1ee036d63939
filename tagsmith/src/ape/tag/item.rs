use crate::ape::constants::INVALID_KEYS;
use crate::error::Result;
use crate::macros::decode_err;

use byteorder::{LittleEndian, WriteBytesExt};

/// The value of an [`ApeItem`]
///
/// The three kinds are mutually exclusive; an item's kind can only change by
/// replacing the item wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemValue {
	/// A list of UTF-8 strings, stored NUL-separated on disk
	Text(Vec<String>),
	/// An arbitrary binary blob
	Binary(Vec<u8>),
	/// A UTF-8 locator of external information (a URL)
	Locator(String),
}

impl ItemValue {
	/// The 2-bit type code stored in the item flags
	pub(crate) fn type_code(&self) -> u32 {
		match self {
			ItemValue::Text(_) => 0,
			ItemValue::Binary(_) => 1,
			ItemValue::Locator(_) => 2,
		}
	}

	/// The exact on-disk byte representation of the value
	pub(crate) fn render(&self) -> Vec<u8> {
		match self {
			ItemValue::Text(values) => values.join("\0").into_bytes(),
			ItemValue::Binary(bytes) => bytes.clone(),
			ItemValue::Locator(locator) => locator.clone().into_bytes(),
		}
	}

	/// Whether the value holds nothing worth writing
	pub(crate) fn is_empty(&self) -> bool {
		match self {
			ItemValue::Text(values) => values.iter().all(String::is_empty),
			ItemValue::Binary(bytes) => bytes.is_empty(),
			ItemValue::Locator(locator) => locator.is_empty(),
		}
	}
}

/// A single key/value entry of an [`ApeTag`](crate::ape::ApeTag)
///
/// Keys are matched case-insensitively, must be 2 to 255 printable ASCII
/// characters, and may not collide with other formats' markers (`ID3`, `TAG`,
/// `OggS`, `MP+`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApeItem {
	pub(crate) key: String,
	pub(crate) value: ItemValue,
	pub(crate) read_only: bool,
}

impl ApeItem {
	/// Create an `ApeItem`
	///
	/// # Errors
	///
	/// * `key` is outside 2..=255 characters, contains non-printable ASCII, or
	///   is one of the reserved keys
	pub fn new(key: String, value: ItemValue) -> Result<Self> {
		if key.len() < 2 || key.len() > 255 {
			decode_err!(@BAIL Ape, "APE tag item key has an invalid length (must be 2..=255)");
		}

		if key.bytes().any(|b| !(0x20..=0x7E).contains(&b)) {
			decode_err!(@BAIL Ape, "APE tag item key contains non-printable characters");
		}

		if INVALID_KEYS.contains(&&*key.to_uppercase()) {
			decode_err!(@BAIL Ape, "APE tag item contains an illegal key");
		}

		Ok(Self {
			key,
			value,
			read_only: false,
		})
	}

	/// Create a text item from a single value
	///
	/// # Errors
	///
	/// See [`ApeItem::new`]
	pub fn text(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
		Self::new(key.into(), ItemValue::Text(vec![value.into()]))
	}

	/// The item's key
	pub fn key(&self) -> &str {
		&self.key
	}

	/// The item's value
	pub fn value(&self) -> &ItemValue {
		&self.value
	}

	/// Whether the item is flagged read-only
	pub fn read_only(&self) -> bool {
		self.read_only
	}

	/// Flag the item read-only
	pub fn set_read_only(&mut self, read_only: bool) {
		self.read_only = read_only;
	}

	/// The first text value, if this is a text item
	pub fn first_text(&self) -> Option<&str> {
		match &self.value {
			ItemValue::Text(values) => values.first().map(String::as_str),
			_ => None,
		}
	}

	/// The number of bytes the item occupies on disk
	pub fn size_on_disk(&self) -> u64 {
		// [size:4][flags:4][key][0x00][value]
		(8 + self.key.len() + 1 + self.value.render().len()) as u64
	}

	/// Render the item to its exact on-disk layout
	pub(crate) fn render(&self) -> Vec<u8> {
		let value = self.value.render();

		let mut flags = self.value.type_code() << 1;
		if self.read_only {
			flags |= 1;
		}

		let mut out = Vec::with_capacity(self.size_on_disk() as usize);

		// The layout is infallible to write into a Vec
		let _ = out.write_u32::<LittleEndian>(value.len() as u32);
		let _ = out.write_u32::<LittleEndian>(flags);
		out.extend_from_slice(self.key.as_bytes());
		out.push(0);
		out.extend_from_slice(&value);

		out
	}
}

#[cfg(test)]
mod tests {
	use super::{ApeItem, ItemValue};

	#[test_log::test]
	fn render_layout() {
		let mut item = ApeItem::text("Album", "Test").unwrap();
		item.set_read_only(true);

		let rendered = item.render();
		assert_eq!(
			rendered,
			[
				4, 0, 0, 0, // value size
				1, 0, 0, 0, // flags: read-only, text
				b'A', b'l', b'b', b'u', b'm', 0, // key + terminator
				b'T', b'e', b's', b't', // value
			]
		);
		assert_eq!(item.size_on_disk(), rendered.len() as u64);
	}

	#[test_log::test]
	fn text_list_renders_nul_separated() {
		let item = ApeItem::new(
			String::from("Artist"),
			ItemValue::Text(vec![String::from("A"), String::from("B")]),
		)
		.unwrap();

		assert_eq!(item.value().render(), b"A\0B");
	}

	#[test_log::test]
	fn invalid_keys_rejected() {
		assert!(ApeItem::text("A", "too short").is_err());
		assert!(ApeItem::text("ID3", "reserved").is_err());
		assert!(ApeItem::text("tag", "reserved, any case").is_err());
		assert!(ApeItem::text("Key\u{7f}", "non-printable").is_err());
	}
}
