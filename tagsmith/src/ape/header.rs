use super::constants::{APE_ENVELOPE_SIZE, APE_PREAMBLE};
use crate::bytevector::ByteVector;
use crate::error::Result;
use crate::macros::{decode_err, err};

/// The flag field of an APE tag header/footer
///
/// The same 32-bit field appears in both halves of the envelope; only the
/// is-header bit differs between them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct ApeTagFlags(pub(crate) u32);

impl ApeTagFlags {
	const READ_ONLY: u32 = 1;
	const IS_HEADER: u32 = 1 << 29;
	const HAS_FOOTER: u32 = 1 << 30;
	const HAS_HEADER: u32 = 1 << 31;

	/// The raw bit field
	#[must_use]
	pub const fn bits(self) -> u32 {
		self.0
	}

	/// Whether the tag is marked read-only
	#[must_use]
	pub const fn read_only(self) -> bool {
		self.0 & Self::READ_ONLY != 0
	}

	/// Whether this envelope half is the header (as opposed to the footer)
	#[must_use]
	pub const fn is_header(self) -> bool {
		self.0 & Self::IS_HEADER != 0
	}

	/// Whether the tag carries a footer
	#[must_use]
	pub const fn has_footer(self) -> bool {
		self.0 & Self::HAS_FOOTER != 0
	}

	/// Whether the tag carries a header mirror before the items
	#[must_use]
	pub const fn has_header(self) -> bool {
		self.0 & Self::HAS_HEADER != 0
	}

	pub(crate) fn set_read_only(&mut self, read_only: bool) {
		if read_only {
			self.0 |= Self::READ_ONLY;
		} else {
			self.0 &= !Self::READ_ONLY;
		}
	}

	pub(crate) fn set_is_header(&mut self, is_header: bool) {
		if is_header {
			self.0 |= Self::IS_HEADER;
		} else {
			self.0 &= !Self::IS_HEADER;
		}
	}

	pub(crate) fn set_has_footer(&mut self, has_footer: bool) {
		if has_footer {
			self.0 |= Self::HAS_FOOTER;
		} else {
			self.0 &= !Self::HAS_FOOTER;
		}
	}

	pub(crate) fn set_has_header(&mut self, has_header: bool) {
		if has_header {
			self.0 |= Self::HAS_HEADER;
		} else {
			self.0 &= !Self::HAS_HEADER;
		}
	}
}

/// A decoded APE tag header or footer
///
/// `size` covers the items plus the footer, but never the header mirror; the
/// layout doubles the envelope when a header is present.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ApeHeader {
	pub(crate) version: u32,
	pub(crate) size: u32,
	pub(crate) item_count: u32,
	pub(crate) flags: ApeTagFlags,
}

impl ApeHeader {
	/// The number of bytes the tag occupies on disk, envelope included
	pub(crate) fn size_on_disk(&self) -> u64 {
		let mut size = u64::from(self.size);

		// The size field does not include the header mirror
		if self.flags.has_header() {
			size += u64::from(APE_ENVELOPE_SIZE);
		}

		size
	}

	/// Decode a 32-byte envelope half
	///
	/// `data` must start with the preamble; anything else is a [`FakeTag`]
	/// error (the candidate was not actually an APE tag).
	///
	/// [`FakeTag`]: crate::error::ErrorKind::FakeTag
	pub(crate) fn parse(data: &ByteVector) -> Result<Self> {
		if data.len() < APE_ENVELOPE_SIZE as usize || !data.starts_with(APE_PREAMBLE) {
			err!(FakeTag);
		}

		let version = data.to_u32_le(8);
		let size = data.to_u32_le(12);
		let item_count = data.to_u32_le(16);
		let flags = ApeTagFlags(data.to_u32_le(20));

		if size < APE_ENVELOPE_SIZE {
			decode_err!(@BAIL Ape, "APE tag has an invalid size (< 32)");
		}

		Ok(Self {
			version,
			size,
			item_count,
			flags,
		})
	}
}
