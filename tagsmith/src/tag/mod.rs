//! The tag capability surface and the combined-tag overlay
//!
//! Concrete tag formats ([`ApeTag`](crate::ape::ApeTag),
//! [`Id3v1Tag`](crate::id3v1::Id3v1Tag)) implement the object-safe [`Tag`]
//! trait. [`CombinedTag`] composes an ordered list of them behind one
//! property surface: getters resolve to the first tag holding a value, setters
//! follow a write-through policy.

mod accessor;

pub use accessor::Accessor;

use crate::ape::ApeTag;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::id3v1::Id3v1Tag;
use crate::picture::Picture;

use std::fmt::Debug;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// The tag's format
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagType {
	/// This covers both APEv1 and APEv2 as it doesn't matter much
	Ape,
	/// Represents an ID3v1 tag
	Id3v1,
}

/// A set of tag formats, used when removing tags from a file
///
/// # Examples
///
/// ```rust
/// use tagsmith::tag::TagTypes;
///
/// let types = TagTypes::APE | TagTypes::ID3V1;
/// assert_eq!(types, TagTypes::ALL);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct TagTypes(pub(crate) u32);

impl TagTypes {
	/// No tag formats
	pub const NONE: Self = Self(0);
	/// APE tags
	pub const APE: Self = Self(1 << 0);
	/// ID3v1 tags
	pub const ID3V1: Self = Self(1 << 1);
	/// Every supported tag format
	pub const ALL: Self = Self(Self::APE.0 | Self::ID3V1.0);

	/// The bit mask
	#[must_use]
	pub const fn bits(self) -> u32 {
		self.0
	}

	/// Whether `tag_type`'s bit is set
	#[must_use]
	pub const fn contains(self, tag_type: TagType) -> bool {
		let bit = match tag_type {
			TagType::Ape => Self::APE.0,
			TagType::Id3v1 => Self::ID3V1.0,
		};

		self.0 & bit != 0
	}
}

impl BitOr for TagTypes {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self::Output {
		Self(self.0 | rhs.0)
	}
}

impl BitOrAssign for TagTypes {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

impl BitAnd for TagTypes {
	type Output = Self;

	fn bitand(self, rhs: Self) -> Self::Output {
		Self(self.0 & rhs.0)
	}
}

impl From<TagType> for TagTypes {
	fn from(tag_type: TagType) -> Self {
		match tag_type {
			TagType::Ape => Self::APE,
			TagType::Id3v1 => Self::ID3V1,
		}
	}
}

/// The capability interface every concrete tag format implements
///
/// This is the seam [`CombinedTag`] composes over. All methods are object-safe.
pub trait Tag: Accessor + Debug {
	/// The tag's format
	fn tag_type(&self) -> TagType;

	/// The number of items the tag holds
	fn len(&self) -> usize;

	/// Whether the tag holds no items
	fn is_empty(&self) -> bool;

	/// Remove every item from the tag
	fn clear(&mut self);

	/// Render the tag to its exact on-disk byte layout
	///
	/// # Errors
	///
	/// * The tag's contents cannot be represented in the format
	fn render(&self, write_options: WriteOptions) -> Result<Vec<u8>>;

	/// The pictures the tag holds
	fn pictures(&self) -> Vec<Picture>;

	/// Replace the tag's pictures
	fn set_pictures(&mut self, pictures: Vec<Picture>);

	/// Remove every picture from the tag
	fn remove_pictures(&mut self);

	/// Access the concrete [`ApeTag`], if this is one
	fn as_ape(&self) -> Option<&ApeTag> {
		None
	}

	/// Mutable access to the concrete [`ApeTag`], if this is one
	fn as_ape_mut(&mut self) -> Option<&mut ApeTag> {
		None
	}

	/// Access the concrete [`Id3v1Tag`], if this is one
	fn as_id3v1(&self) -> Option<&Id3v1Tag> {
		None
	}

	/// Mutable access to the concrete [`Id3v1Tag`], if this is one
	fn as_id3v1_mut(&mut self) -> Option<&mut Id3v1Tag> {
		None
	}
}

/// How [`CombinedTag`] setters distribute a value across the held tags
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WritePolicy {
	/// Overwrite the field on the first tag already holding it, falling back to
	/// the first tag
	#[default]
	FirstNonEmpty,
	/// Write the value through to every held tag
	All,
}

/// An ordered overlay over several concrete tags
///
/// Getters return the first value found in registration order; setters follow
/// the configured [`WritePolicy`]; removals always apply to every tag.
#[derive(Debug, Default)]
pub struct CombinedTag {
	tags: Vec<Box<dyn Tag>>,
	policy: WritePolicy,
}

impl CombinedTag {
	/// Create an empty `CombinedTag` with the given write policy
	#[must_use]
	pub fn new(policy: WritePolicy) -> Self {
		Self {
			tags: Vec::new(),
			policy,
		}
	}

	/// Create a `CombinedTag` over an existing list of tags
	///
	/// The list order is the getters' resolution order.
	#[must_use]
	pub fn with_tags(tags: Vec<Box<dyn Tag>>, policy: WritePolicy) -> Self {
		Self { tags, policy }
	}

	/// The configured write policy
	pub fn policy(&self) -> WritePolicy {
		self.policy
	}

	/// The held tags, in resolution order
	pub fn tags(&self) -> &[Box<dyn Tag>] {
		&self.tags
	}

	/// Mutable access to the held tags
	pub fn tags_mut(&mut self) -> &mut Vec<Box<dyn Tag>> {
		&mut self.tags
	}

	/// Append a tag, giving it the lowest resolution priority
	pub fn push(&mut self, tag: Box<dyn Tag>) {
		self.tags.push(tag);
	}

	/// The number of held tags
	pub fn tag_count(&self) -> usize {
		self.tags.len()
	}

	/// Whether every held tag is empty
	pub fn is_empty(&self) -> bool {
		self.tags.iter().all(|tag| tag.is_empty())
	}

	/// The first held tag of `tag_type`
	pub fn tag_of(&self, tag_type: TagType) -> Option<&dyn Tag> {
		self.tags
			.iter()
			.find(|tag| tag.tag_type() == tag_type)
			.map(Box::as_ref)
	}

	/// Mutable access to the first held tag of `tag_type`
	pub fn tag_of_mut(&mut self, tag_type: TagType) -> Option<&mut (dyn Tag + 'static)> {
		self.tags
			.iter_mut()
			.find(|tag| tag.tag_type() == tag_type)
			.map(Box::as_mut)
	}

	/// Whether a tag of `tag_type` is held
	pub fn contains(&self, tag_type: TagType) -> bool {
		self.tag_of(tag_type).is_some()
	}

	/// Drop every held tag whose type is in `types`
	pub fn remove_types(&mut self, types: TagTypes) {
		self.tags.retain(|tag| !types.contains(tag.tag_type()));
	}

	/// Apply a setter according to `policy`, overriding the configured one
	///
	/// `holds` decides whether a tag currently stores the field being written.
	pub fn set_with<H, S>(&mut self, policy: WritePolicy, holds: H, mut set: S)
	where
		H: Fn(&dyn Tag) -> bool,
		S: FnMut(&mut dyn Tag),
	{
		match policy {
			WritePolicy::All => {
				for tag in &mut self.tags {
					set(tag.as_mut());
				}
			},
			WritePolicy::FirstNonEmpty => {
				if !self.set_on_holder(&holds, &mut set) {
					self.set_on_first(&mut set);
				}
			},
		}
	}

	/// Apply `set` to the first tag satisfying `holds`; reports whether one was found
	pub(crate) fn set_on_holder<H, S>(&mut self, holds: H, mut set: S) -> bool
	where
		H: Fn(&dyn Tag) -> bool,
		S: FnMut(&mut dyn Tag),
	{
		if let Some(idx) = self.tags.iter().position(|tag| holds(tag.as_ref())) {
			set(self.tags[idx].as_mut());
			return true;
		}

		false
	}

	/// Apply `set` to the first held tag; reports whether one exists
	pub(crate) fn set_on_first<S>(&mut self, mut set: S) -> bool
	where
		S: FnMut(&mut dyn Tag),
	{
		if let Some(first) = self.tags.first_mut() {
			set(first.as_mut());
			return true;
		}

		false
	}

	/// Apply `set` to every held tag
	pub(crate) fn set_on_all<S>(&mut self, mut set: S)
	where
		S: FnMut(&mut dyn Tag),
	{
		for tag in &mut self.tags {
			set(tag.as_mut());
		}
	}

	/// The pictures of the first tag holding any
	pub fn pictures(&self) -> Vec<Picture> {
		self.tags
			.iter()
			.map(|tag| tag.pictures())
			.find(|pictures| !pictures.is_empty())
			.unwrap_or_default()
	}

	/// Replace pictures following the configured write policy
	pub fn set_pictures(&mut self, pictures: Vec<Picture>) {
		let policy = self.policy;
		self.set_with(
			policy,
			|tag| !tag.pictures().is_empty(),
			move |tag| tag.set_pictures(pictures.clone()),
		);
	}

	/// Remove pictures from every held tag
	pub fn remove_pictures(&mut self) {
		for tag in &mut self.tags {
			tag.remove_pictures();
		}
	}
}

// One entry per `Accessor` field: getter, setter, remover, getter return type,
// setter value type.
macro_rules! combined_accessors {
	($(($get:ident, $set:ident, $remove:ident, $ret_ty:ty, $owned_ty:ty)),+ $(,)?) => {
		impl Accessor for CombinedTag {
			$(
				fn $get(&self) -> Option<$ret_ty> {
					self.tags.iter().find_map(|tag| tag.$get())
				}

				fn $set(&mut self, value: $owned_ty) {
					let policy = self.policy;
					self.set_with(
						policy,
						|tag| tag.$get().is_some(),
						move |tag| tag.$set(value.clone()),
					);
				}

				fn $remove(&mut self) {
					for tag in &mut self.tags {
						tag.$remove();
					}
				}
			)+
		}
	};
}

combined_accessors! {
	(title, set_title, remove_title, std::borrow::Cow<'_, str>, String),
	(artist, set_artist, remove_artist, std::borrow::Cow<'_, str>, String),
	(album, set_album, remove_album, std::borrow::Cow<'_, str>, String),
	(album_artist, set_album_artist, remove_album_artist, std::borrow::Cow<'_, str>, String),
	(genre, set_genre, remove_genre, std::borrow::Cow<'_, str>, String),
	(comment, set_comment, remove_comment, std::borrow::Cow<'_, str>, String),
	(lyrics, set_lyrics, remove_lyrics, std::borrow::Cow<'_, str>, String),
	(track, set_track, remove_track, u32, u32),
	(track_total, set_track_total, remove_track_total, u32, u32),
	(disk, set_disk, remove_disk, u32, u32),
	(disk_total, set_disk_total, remove_disk_total, u32, u32),
	(year, set_year, remove_year, u32, u32),
	(replaygain_track_gain, set_replaygain_track_gain, remove_replaygain_track_gain, f64, f64),
	(replaygain_track_peak, set_replaygain_track_peak, remove_replaygain_track_peak, f64, f64),
	(replaygain_album_gain, set_replaygain_album_gain, remove_replaygain_album_gain, f64, f64),
	(replaygain_album_peak, set_replaygain_album_peak, remove_replaygain_album_peak, f64, f64),
	(musicbrainz_track_id, set_musicbrainz_track_id, remove_musicbrainz_track_id, std::borrow::Cow<'_, str>, String),
	(musicbrainz_release_id, set_musicbrainz_release_id, remove_musicbrainz_release_id, std::borrow::Cow<'_, str>, String),
}

#[cfg(test)]
mod tests {
	use super::{Accessor, CombinedTag, TagType, TagTypes, WritePolicy};
	use crate::ape::ApeTag;
	use crate::id3v1::Id3v1Tag;

	fn two_tags() -> CombinedTag {
		let ape = ApeTag::default();
		let mut id3v1 = Id3v1Tag::default();
		id3v1.album = Some(String::from("Only here"));

		CombinedTag::with_tags(
			vec![Box::new(ape), Box::new(id3v1)],
			WritePolicy::FirstNonEmpty,
		)
	}

	#[test_log::test]
	fn getter_returns_first_non_empty() {
		let combined = two_tags();
		assert_eq!(combined.album().as_deref(), Some("Only here"));
	}

	#[test_log::test]
	fn setter_overwrites_current_holder() {
		let mut combined = two_tags();
		combined.set_album(String::from("Replaced"));

		// The ID3v1 tag held the album, so it gets the new value; the APE tag is untouched
		assert!(combined.tag_of(TagType::Ape).unwrap().album().is_none());
		assert_eq!(
			combined.tag_of(TagType::Id3v1).unwrap().album().as_deref(),
			Some("Replaced")
		);
	}

	#[test_log::test]
	fn setter_falls_back_to_first_tag() {
		let mut combined = two_tags();
		combined.set_title(String::from("New title"));

		assert_eq!(
			combined.tag_of(TagType::Ape).unwrap().title().as_deref(),
			Some("New title")
		);
		assert!(combined.tag_of(TagType::Id3v1).unwrap().title().is_none());
	}

	#[test_log::test]
	fn write_through_updates_all_targets() {
		let ape = ApeTag::default();
		let id3v1 = Id3v1Tag::default();
		let mut combined =
			CombinedTag::with_tags(vec![Box::new(ape), Box::new(id3v1)], WritePolicy::All);

		combined.set_artist(String::from("Everyone"));

		for tag in combined.tags() {
			assert_eq!(tag.artist().as_deref(), Some("Everyone"));
		}
	}

	#[test_log::test]
	fn remove_types_drops_tags() {
		let mut combined = two_tags();
		combined.remove_types(TagTypes::ID3V1);

		assert_eq!(combined.tag_count(), 1);
		assert!(combined.album().is_none());
	}
}
