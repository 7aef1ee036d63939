//! APE specific items
//!
//! ## File notes
//!
//! It is possible for an `APE` file to contain an ID3v1 tag in addition to its
//! APE tag. The APE tag itself can appear at either end of the file, though a
//! tag at the start is against the spec and is rewritten to the end on save.

pub(crate) mod constants;
pub(crate) mod header;
pub(crate) mod properties;
pub mod tag;

pub use header::ApeTagFlags;
pub use tag::ApeTag;
pub use tag::item::{ApeItem, ItemValue};
