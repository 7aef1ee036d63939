//! The APE tag item store

pub(crate) mod item;
pub(crate) mod read;
pub(crate) mod write;

use item::{ApeItem, ItemValue};

use crate::ape::constants::APE_PICTURE_TYPES;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::picture::{Picture, PictureType};
use crate::tag::{Accessor, Tag, TagType};

use std::borrow::Cow;

/// An APE tag
///
/// Items are stored in insertion order and addressed by case-insensitive key.
/// Numbers with a total ("track 3 of 12") are fraction-encoded in a single
/// text item as `"3/12"`.
///
/// # Examples
///
/// ```rust
/// use tagsmith::ape::ApeTag;
/// use tagsmith::tag::Accessor;
///
/// let mut tag = ApeTag::default();
/// tag.set_title(String::from("Title"));
///
/// // Keys are case-insensitive
/// assert!(tag.get("TITLE").is_some());
/// ```
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct ApeTag {
	pub(crate) items: Vec<ApeItem>,
	pub(crate) read_only: bool,
	pub(crate) has_header: bool,
}

impl ApeTag {
	/// Create a new empty `ApeTag`, with a header mirror enabled
	#[must_use]
	pub fn new() -> Self {
		Self {
			items: Vec::new(),
			read_only: false,
			has_header: true,
		}
	}

	/// Whether the tag is marked read-only
	pub fn is_read_only(&self) -> bool {
		self.read_only
	}

	/// Mark the whole tag read-only
	pub fn set_read_only(&mut self, read_only: bool) {
		self.read_only = read_only;
	}

	/// Whether the rendered tag carries a header mirror before the items
	pub fn has_header(&self) -> bool {
		self.has_header
	}

	/// Toggle the header mirror
	pub fn set_has_header(&mut self, has_header: bool) {
		self.has_header = has_header;
	}

	/// Get an item by its key, case-insensitively
	pub fn get(&self, key: &str) -> Option<&ApeItem> {
		self.items
			.iter()
			.find(|item| item.key.eq_ignore_ascii_case(key))
	}

	/// Get the first text value of an item, skipping empty values
	pub fn get_text(&self, key: &str) -> Option<Cow<'_, str>> {
		self.get(key)
			.and_then(ApeItem::first_text)
			.filter(|text| !text.is_empty())
			.map(Cow::Borrowed)
	}

	/// Insert an item, replacing any existing item with the same key
	pub fn insert(&mut self, item: ApeItem) {
		self.remove(&item.key);
		self.items.push(item);
	}

	/// Replace the item under `key` with a single text value
	///
	/// Empty values remove the item instead.
	pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
		let value = value.into();
		if value.is_empty() {
			self.remove(key);
			return;
		}

		if let Ok(item) = ApeItem::new(key.to_owned(), ItemValue::Text(vec![value])) {
			self.insert(item);
		}
	}

	/// Merge `values` into the text item under `key`
	///
	/// Existing text values are kept; empty entries in `values` are dropped. A
	/// non-text item under `key` is replaced wholesale.
	pub fn append_text(&mut self, key: &str, values: impl IntoIterator<Item = String>) {
		let mut merged = match self.remove(key) {
			Some(ApeItem {
				value: ItemValue::Text(existing),
				..
			}) => existing,
			_ => Vec::new(),
		};

		merged.extend(values.into_iter().filter(|value| !value.is_empty()));
		merged.retain(|value| !value.is_empty());

		if merged.is_empty() {
			return;
		}

		if let Ok(item) = ApeItem::new(key.to_owned(), ItemValue::Text(merged)) {
			self.insert(item);
		}
	}

	/// Remove and return the item under `key`
	pub fn remove(&mut self, key: &str) -> Option<ApeItem> {
		self.items
			.iter()
			.position(|item| item.key.eq_ignore_ascii_case(key))
			.map(|pos| self.items.remove(pos))
	}

	/// The held items, in insertion order
	pub fn items(&self) -> &[ApeItem] {
		&self.items
	}

	/// The number of bytes the rendered tag occupies, envelope included
	///
	/// Zero when the tag holds no renderable items.
	pub fn size_on_disk(&self) -> u64 {
		let item_bytes: u64 = self
			.items
			.iter()
			.filter(|item| !item.value().is_empty())
			.map(ApeItem::size_on_disk)
			.sum();

		if item_bytes == 0 {
			return 0;
		}

		let envelopes = if self.has_header { 2 } else { 1 };
		item_bytes + envelopes * 32
	}

	/// Parse the fraction-encoded number under `key` ("3" or "3/12")
	fn fraction(&self, key: &str) -> (Option<u32>, Option<u32>) {
		let Some(text) = self.get_text(key) else {
			return (None, None);
		};

		let mut split = text.splitn(2, '/');
		let number = split.next().and_then(|n| n.trim().parse::<u32>().ok());
		let total = split.next().and_then(|t| t.trim().parse::<u32>().ok());

		(number, total)
	}

	fn set_fraction(&mut self, key: &str, number: Option<u32>, total: Option<u32>) {
		match (number, total) {
			(None, None) => {
				self.remove(key);
			},
			(number, Some(total)) => {
				self.set_text(key, format!("{}/{}", number.unwrap_or(0), total));
			},
			(Some(number), None) => {
				self.set_text(key, number.to_string());
			},
		}
	}

	fn decibel_value(&self, key: &str) -> Option<f64> {
		let text = self.get_text(key)?;
		let numeric = text
			.trim()
			.trim_end_matches("dB")
			.trim_end_matches("db")
			.trim();

		numeric.parse::<f64>().ok()
	}
}

macro_rules! impl_text_accessor {
	($($name:ident => $key:literal),+ $(,)?) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					self.get_text($key)
				}

				fn [<set_ $name>](&mut self, value: String) {
					self.set_text($key, value)
				}

				fn [<remove_ $name>](&mut self) {
					self.remove($key);
				}
			)+
		}
	}
}

impl Accessor for ApeTag {
	impl_text_accessor! {
		title => "Title",
		artist => "Artist",
		album => "Album",
		album_artist => "Album Artist",
		genre => "Genre",
		comment => "Comment",
		lyrics => "Lyrics",
		musicbrainz_track_id => "MUSICBRAINZ_TRACKID",
		musicbrainz_release_id => "MUSICBRAINZ_ALBUMID",
	}

	fn track(&self) -> Option<u32> {
		self.fraction("Track").0
	}

	fn set_track(&mut self, value: u32) {
		let (_, total) = self.fraction("Track");
		self.set_fraction("Track", Some(value), total);
	}

	fn remove_track(&mut self) {
		self.remove("Track");
	}

	fn track_total(&self) -> Option<u32> {
		self.fraction("Track").1
	}

	fn set_track_total(&mut self, value: u32) {
		let (number, _) = self.fraction("Track");
		self.set_fraction("Track", number, Some(value));
	}

	fn remove_track_total(&mut self) {
		let (number, _) = self.fraction("Track");
		self.set_fraction("Track", number, None);
	}

	fn disk(&self) -> Option<u32> {
		self.fraction("Disc").0
	}

	fn set_disk(&mut self, value: u32) {
		let (_, total) = self.fraction("Disc");
		self.set_fraction("Disc", Some(value), total);
	}

	fn remove_disk(&mut self) {
		self.remove("Disc");
	}

	fn disk_total(&self) -> Option<u32> {
		self.fraction("Disc").1
	}

	fn set_disk_total(&mut self, value: u32) {
		let (number, _) = self.fraction("Disc");
		self.set_fraction("Disc", number, Some(value));
	}

	fn remove_disk_total(&mut self) {
		let (number, _) = self.fraction("Disc");
		self.set_fraction("Disc", number, None);
	}

	fn year(&self) -> Option<u32> {
		let text = self.get_text("Year")?;
		let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
		digits.parse::<u32>().ok()
	}

	fn set_year(&mut self, value: u32) {
		self.set_text("Year", value.to_string());
	}

	fn remove_year(&mut self) {
		self.remove("Year");
	}

	fn replaygain_track_gain(&self) -> Option<f64> {
		self.decibel_value("REPLAYGAIN_TRACK_GAIN")
	}

	fn set_replaygain_track_gain(&mut self, value: f64) {
		self.set_text("REPLAYGAIN_TRACK_GAIN", format!("{value:.2} dB"));
	}

	fn remove_replaygain_track_gain(&mut self) {
		self.remove("REPLAYGAIN_TRACK_GAIN");
	}

	fn replaygain_track_peak(&self) -> Option<f64> {
		self.decibel_value("REPLAYGAIN_TRACK_PEAK")
	}

	fn set_replaygain_track_peak(&mut self, value: f64) {
		self.set_text("REPLAYGAIN_TRACK_PEAK", format!("{value:.6}"));
	}

	fn remove_replaygain_track_peak(&mut self) {
		self.remove("REPLAYGAIN_TRACK_PEAK");
	}

	fn replaygain_album_gain(&self) -> Option<f64> {
		self.decibel_value("REPLAYGAIN_ALBUM_GAIN")
	}

	fn set_replaygain_album_gain(&mut self, value: f64) {
		self.set_text("REPLAYGAIN_ALBUM_GAIN", format!("{value:.2} dB"));
	}

	fn remove_replaygain_album_gain(&mut self) {
		self.remove("REPLAYGAIN_ALBUM_GAIN");
	}

	fn replaygain_album_peak(&self) -> Option<f64> {
		self.decibel_value("REPLAYGAIN_ALBUM_PEAK")
	}

	fn set_replaygain_album_peak(&mut self, value: f64) {
		self.set_text("REPLAYGAIN_ALBUM_PEAK", format!("{value:.6}"));
	}

	fn remove_replaygain_album_peak(&mut self) {
		self.remove("REPLAYGAIN_ALBUM_PEAK");
	}
}

fn picture_key(pic_type: PictureType) -> &'static str {
	match pic_type {
		PictureType::CoverFront => "Cover Art (Front)",
		PictureType::CoverBack => "Cover Art (Back)",
		PictureType::Other => "Cover Art (Other)",
	}
}

fn picture_type_for_key(key: &str) -> PictureType {
	if key.eq_ignore_ascii_case("Cover Art (Front)") {
		PictureType::CoverFront
	} else if key.eq_ignore_ascii_case("Cover Art (Back)") {
		PictureType::CoverBack
	} else {
		PictureType::Other
	}
}

impl Tag for ApeTag {
	fn tag_type(&self) -> TagType {
		TagType::Ape
	}

	fn len(&self) -> usize {
		self.items.len()
	}

	fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	fn clear(&mut self) {
		// Metadata flagged read-only survives destructive clears
		self.items.retain(|item| item.read_only);
	}

	fn render(&self, write_options: WriteOptions) -> Result<Vec<u8>> {
		write::render(self, write_options)
	}

	fn pictures(&self) -> Vec<Picture> {
		let mut pictures = Vec::new();

		for key in APE_PICTURE_TYPES {
			let Some(item) = self.get(key) else { continue };
			let ItemValue::Binary(binary) = item.value() else {
				continue;
			};

			// The binary value is `description 0x00 image-data`
			let (description, data) = match binary.iter().position(|&b| b == 0) {
				Some(null_pos) => (
					String::from_utf8_lossy(&binary[..null_pos]).into_owned(),
					binary[null_pos + 1..].to_vec(),
				),
				None => (String::new(), binary.clone()),
			};

			let description = (!description.is_empty()).then_some(description);
			pictures.push(Picture::new(picture_type_for_key(key), description, data));
		}

		pictures
	}

	fn set_pictures(&mut self, pictures: Vec<Picture>) {
		self.remove_pictures();

		for picture in pictures {
			let key = picture_key(picture.pic_type());

			let mut binary =
				Vec::with_capacity(picture.data().len() + picture.description().map_or(0, str::len) + 1);
			if let Some(description) = picture.description() {
				binary.extend_from_slice(description.as_bytes());
			}
			binary.push(0);
			binary.extend_from_slice(picture.data());

			if let Ok(item) = ApeItem::new(key.to_owned(), ItemValue::Binary(binary)) {
				self.insert(item);
			}
		}
	}

	fn remove_pictures(&mut self) {
		for key in APE_PICTURE_TYPES {
			self.remove(key);
		}
	}

	fn as_ape(&self) -> Option<&ApeTag> {
		Some(self)
	}

	fn as_ape_mut(&mut self) -> Option<&mut ApeTag> {
		Some(self)
	}
}
