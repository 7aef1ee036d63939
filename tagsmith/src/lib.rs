//! Parse and rewrite audio file metadata without decoding a single sample.
//!
//! tagsmith locates tag blocks sandwiched around a media payload (APE and
//! ID3v1), exposes them behind one combined accessor surface, derives
//! technical properties (bitrate, sample rate, channels, duration) straight
//! from the compressed bitstream, and saves mutations back by rewriting only
//! the tag regions.
//!
//! # Examples
//!
//! ## Reading from a path
//!
//! ```rust,no_run
//! # fn main() -> tagsmith::error::Result<()> {
//! use tagsmith::prelude::*;
//! use tagsmith::read_from_path;
//!
//! // The format is guessed from the extension, then from the content
//! let file = read_from_path("trouble.mp3")?;
//!
//! println!("album:    {:?}", file.tag().album());
//! println!("duration: {:?}", file.properties().duration());
//! # Ok(())
//! # }
//! ```
//!
//! ## Mutating tags and saving
//!
//! ```rust,no_run
//! # fn main() -> tagsmith::error::Result<()> {
//! use tagsmith::file::AudioFile;
//! use tagsmith::prelude::*;
//!
//! let mut file = AudioFile::open("trouble.mp3")?;
//!
//! file.tag_mut().set_album(String::from("New Album"));
//! // Only the tag regions are rewritten; the media payload is left alone
//! file.save()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using an existing reader
//!
//! ```rust,no_run
//! # fn main() -> tagsmith::error::Result<()> {
//! use std::io::Cursor;
//! use tagsmith::read_from;
//!
//! let data: Vec<u8> = std::fs::read("trouble.mp3")?;
//! let file = read_from(Cursor::new(data))?;
//! # Ok(())
//! # }
//! ```

pub mod bytevector;
pub mod config;
pub mod error;
pub mod file;
pub mod io;
pub(crate) mod macros;
pub mod picture;
pub mod probe;
pub mod properties;
pub mod sandwich;
pub mod tag;
mod util;

pub mod aac;
pub mod ape;
pub mod asf;
pub mod flac;
pub mod id3v1;
pub mod mpeg;
pub mod riff;

pub use crate::probe::{read_from, read_from_path};

pub mod prelude {
	//! A prelude for commonly used items in the library.
	//!
	//! This module is intended to be wildcard imported.
	//!
	//! ```rust
	//! use tagsmith::prelude::*;
	//! ```

	pub use crate::tag::{Accessor, Tag, TagType, TagTypes};
}
