use crate::error::Result;
use crate::macros::err;

/// Decode a UTF-8 string
pub(crate) fn utf8_decode(bytes: Vec<u8>) -> Result<String> {
	String::from_utf8(bytes).map_err(Into::into)
}

/// Decode a Latin-1 (ISO-8859-1) buffer
///
/// Every byte maps directly to the code point of the same value.
pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| b as char).collect()
}

/// Encode a string as Latin-1, substituting '?' for anything outside the range
///
/// ID3v1 fields are Latin-1 only. Errors when `lossy` is `false` and the text
/// does not fit the encoding.
pub(crate) fn latin1_encode(text: &str, lossy: bool) -> Result<Vec<u8>> {
	let mut out = Vec::with_capacity(text.len());
	for ch in text.chars() {
		let code = ch as u32;
		if code <= 255 {
			out.push(code as u8);
		} else if lossy {
			out.push(b'?');
		} else {
			err!(TextDecode("Text contains characters outside of Latin-1"));
		}
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test_log::test]
	fn latin1_round_trip() {
		let text = "Caf\u{e9}";
		let encoded = latin1_encode(text, false).unwrap();
		assert_eq!(encoded, [b'C', b'a', b'f', 0xE9]);
		assert_eq!(latin1_decode(&encoded), text);
	}

	#[test_log::test]
	fn latin1_lossy() {
		assert!(latin1_encode("\u{4e16}\u{754c}", false).is_err());
		assert_eq!(latin1_encode("\u{4e16}", true).unwrap(), [b'?']);
	}
}
