pub(crate) const APE_PREAMBLE: &[u8; 8] = b"APETAGEX";

/// The APE tag version written by this crate
pub(crate) const APE_VERSION: u32 = 2000;

/// The size of an APE header/footer
pub(crate) const APE_ENVELOPE_SIZE: u32 = 32;

/// Keys that conflict with other formats' markers and may not be used for items
pub(crate) const INVALID_KEYS: [&str; 4] = ["ID3", "TAG", "OGGS", "MP+"];

/// The item keys carrying embedded cover art
pub(crate) const APE_PICTURE_TYPES: [&str; 3] = [
	"Cover Art (Front)",
	"Cover Art (Back)",
	"Cover Art (Other)",
];
