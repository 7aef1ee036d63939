//! The head/tail tag sandwich
//!
//! Tag data in the supported raw formats sits before ([`StartTag`]) and/or
//! after ([`EndTag`]) the media payload. [`Sandwich`] ties the two probes,
//! the media boundaries, and the minimal-rewrite save together, and is the
//! mutable tag facade a file handle exposes.

use crate::ape::ApeTag;
use crate::ape::constants::{APE_ENVELOPE_SIZE, APE_PREAMBLE};
use crate::ape::header::ApeHeader;
use crate::ape::tag::read as ape_read;
use crate::config::{ParseOptions, ParsingMode, WriteOptions};
use crate::error::Result;
use crate::id3v1::{ID3V1_TAG_MARKER, Id3v1Tag};
use crate::io::{FileLike, FileStream};
use crate::macros::err;
use crate::picture::Picture;
use crate::tag::{Accessor, CombinedTag, Tag, TagType, TagTypes, WritePolicy};

use std::borrow::Cow;
use std::io::SeekFrom;

/// The outcome of probing one tag candidate
enum Candidate {
	/// A tag was read; the probe advances past `size` bytes
	Found(Box<dyn Tag>, u64),
	/// No signature matched; the media payload was reached
	Absent,
	/// A signature matched but the bytes were structurally invalid
	Corrupt,
}

/// The tag collection before the media payload
///
/// Only APE tags with a header mirror are recognized here; everything else
/// belongs at the file's end.
#[derive(Debug, Default)]
pub struct StartTag {
	tags: CombinedTag,
	size_on_disk: u64,
}

impl StartTag {
	/// The held tags, as an ordered overlay
	pub fn tags(&self) -> &CombinedTag {
		&self.tags
	}

	/// Mutable access to the held tags
	pub fn tags_mut(&mut self) -> &mut CombinedTag {
		&mut self.tags
	}

	/// The bytes this region occupied when it was last read or saved
	pub fn size_on_disk(&self) -> u64 {
		self.size_on_disk
	}
}

/// The tag collection after the media payload
#[derive(Debug, Default)]
pub struct EndTag {
	tags: CombinedTag,
	size_on_disk: u64,
}

impl EndTag {
	/// The held tags, as an ordered overlay
	pub fn tags(&self) -> &CombinedTag {
		&self.tags
	}

	/// Mutable access to the held tags
	pub fn tags_mut(&mut self) -> &mut CombinedTag {
		&mut self.tags
	}

	/// The bytes this region occupied when it was last read or saved
	pub fn size_on_disk(&self) -> u64 {
		self.size_on_disk
	}
}

/// Head and tail tags around a media payload, plus the boundaries between them
///
/// Until a save recomputes them, `media_start` equals the start tag's size on
/// disk and `media_end` equals the file length minus the end tag's size on
/// disk.
///
/// The type doubles as the combined tag facade: its [`Accessor`] getters
/// resolve across every held tag (start tags first), and setters follow the
/// configured [`WritePolicy`].
#[derive(Debug, Default)]
pub struct Sandwich {
	start: StartTag,
	end: EndTag,
	media_start: u64,
	media_end: u64,
	possibly_corrupt: bool,
	policy: WritePolicy,
}

impl Sandwich {
	/// Probe both ends of `stream` for tags and fix the media boundaries
	///
	/// A structurally invalid candidate aborts only its own probe: the tag is
	/// treated as absent and, outside [`ParsingMode::Relaxed`], the file is
	/// flagged possibly corrupt (blocking saves). [`ParsingMode::Strict`]
	/// propagates the failure instead.
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * In strict mode, a corrupt tag candidate
	pub(crate) fn read<F: FileLike>(
		stream: &mut FileStream<F>,
		parse_options: ParseOptions,
	) -> Result<Self> {
		let mut sandwich = Self::default();

		sandwich.probe_start(stream, parse_options)?;
		sandwich.probe_end(stream, parse_options)?;

		let file_len = stream.len()?;
		sandwich.media_start = sandwich.start.size_on_disk;
		sandwich.media_end = file_len - sandwich.end.size_on_disk;

		Ok(sandwich)
	}

	/// The start tag collection
	pub fn start_tag(&self) -> &StartTag {
		&self.start
	}

	/// The end tag collection
	pub fn end_tag(&self) -> &EndTag {
		&self.end
	}

	/// The offset of the first media byte
	pub fn media_start(&self) -> u64 {
		self.media_start
	}

	/// The offset one past the last media byte
	pub fn media_end(&self) -> u64 {
		self.media_end
	}

	/// Whether a probe hit structurally invalid tag data
	///
	/// A possibly corrupt file refuses to save.
	pub fn is_possibly_corrupt(&self) -> bool {
		self.possibly_corrupt
	}

	/// The write policy the facade setters follow
	pub fn set_policy(&mut self, policy: WritePolicy) {
		self.policy = policy;
	}

	/// Whether any held tag has the given type
	pub fn contains(&self, tag_type: TagType) -> bool {
		self.start.tags.contains(tag_type) || self.end.tags.contains(tag_type)
	}

	/// The total number of held tags
	pub fn tag_count(&self) -> usize {
		self.start.tags.tag_count() + self.end.tags.tag_count()
	}

	/// The first held tag of `tag_type`
	pub fn tag_of(&self, tag_type: TagType) -> Option<&dyn Tag> {
		self.start
			.tags
			.tag_of(tag_type)
			.or_else(|| self.end.tags.tag_of(tag_type))
	}

	/// Mutable access to the first held tag of `tag_type`, optionally creating it
	///
	/// Creation follows the placement policy: both supported types belong at
	/// the file's end, with ID3v1 always rendered last since readers expect it
	/// in the final 128 bytes.
	pub fn tag_of_mut(
		&mut self,
		tag_type: TagType,
		create_if_absent: bool,
	) -> Option<&mut (dyn Tag + 'static)> {
		if self.start.tags.contains(tag_type) {
			return self.start.tags.tag_of_mut(tag_type);
		}

		if !self.end.tags.contains(tag_type) {
			if !create_if_absent {
				return None;
			}

			let tag: Box<dyn Tag> = match tag_type {
				TagType::Ape => Box::new(ApeTag::new()),
				TagType::Id3v1 => Box::new(Id3v1Tag::new()),
			};

			let end_tags = self.end.tags.tags_mut();
			let position = match tag_type {
				// APE tags go before any ID3v1 tag
				TagType::Ape => end_tags
					.iter()
					.position(|t| t.tag_type() == TagType::Id3v1)
					.unwrap_or(end_tags.len()),
				TagType::Id3v1 => end_tags.len(),
			};

			end_tags.insert(position, tag);
		}

		self.end.tags.tag_of_mut(tag_type)
	}

	/// Drop every held tag whose type is in `types`
	///
	/// The bytes leave the file on the next save.
	pub fn remove_tags(&mut self, types: TagTypes) {
		self.start.tags.remove_types(types);
		self.end.tags.remove_types(types);
	}

	/// Re-render every held tag and write both regions back with minimal rewriting
	///
	/// The tail region is replaced first (its offsets are still valid), then
	/// the head; the boundaries are recomputed from the freshly rendered sizes.
	///
	/// # Errors
	///
	/// * The file is flagged possibly corrupt
	/// * The stream was opened read-only
	/// * [`std::io::Error`]
	pub(crate) fn save<F: FileLike>(
		&mut self,
		stream: &mut FileStream<F>,
		write_options: WriteOptions,
	) -> Result<()> {
		if self.possibly_corrupt {
			err!(PossiblyCorrupt);
		}

		if stream.is_read_only() {
			err!(NotWritable);
		}

		let mut end_render = Vec::new();
		for tag in self.end.tags.tags() {
			end_render.extend_from_slice(&tag.render(write_options)?);
		}

		let mut start_render = Vec::new();
		for tag in self.start.tags.tags() {
			start_render.extend_from_slice(&tag.render(write_options)?);
		}

		stream.insert(&end_render, self.media_end, self.end.size_on_disk)?;
		stream.insert(&start_render, 0, self.start.size_on_disk)?;

		self.start.size_on_disk = start_render.len() as u64;
		self.end.size_on_disk = end_render.len() as u64;

		let file_len = stream.len()?;
		self.media_start = self.start.size_on_disk;
		self.media_end = file_len - self.end.size_on_disk;

		Ok(())
	}

	fn probe_start<F: FileLike>(
		&mut self,
		stream: &mut FileStream<F>,
		parse_options: ParseOptions,
	) -> Result<()> {
		let mut offset = 0u64;

		loop {
			match probe_start_candidate(stream, offset, parse_options)? {
				Candidate::Found(tag, size) => {
					self.start.tags.push(tag);
					offset += size;
				},
				Candidate::Absent => break,
				Candidate::Corrupt => {
					log::warn!("Encountered a corrupt start tag candidate, treating as absent");
					if parse_options.parsing_mode != ParsingMode::Relaxed {
						self.possibly_corrupt = true;
					}
					break;
				},
			}
		}

		self.start.size_on_disk = offset;
		Ok(())
	}

	fn probe_end<F: FileLike>(
		&mut self,
		stream: &mut FileStream<F>,
		parse_options: ParseOptions,
	) -> Result<()> {
		let file_len = stream.len()?;
		let lower_bound = self.start.size_on_disk;

		let mut end_offset = file_len;
		let mut reversed: Vec<Box<dyn Tag>> = Vec::new();

		loop {
			match probe_end_candidate(stream, end_offset, lower_bound, parse_options)? {
				Candidate::Found(tag, size) => {
					reversed.push(tag);
					end_offset -= size;
				},
				Candidate::Absent => break,
				Candidate::Corrupt => {
					log::warn!("Encountered a corrupt end tag candidate, treating as absent");
					if parse_options.parsing_mode != ParsingMode::Relaxed {
						self.possibly_corrupt = true;
					}
					break;
				},
			}
		}

		// Reverse into file order, so rendering reproduces the original layout
		reversed.reverse();
		for tag in reversed {
			self.end.tags.push(tag);
		}

		self.end.size_on_disk = file_len - end_offset;
		Ok(())
	}

	fn pictures_facade(&self) -> Vec<Picture> {
		let pictures = self.start.tags.pictures();
		if !pictures.is_empty() {
			return pictures;
		}

		self.end.tags.pictures()
	}

	/// The pictures of the first tag holding any
	pub fn pictures(&self) -> Vec<Picture> {
		self.pictures_facade()
	}

	/// Replace pictures following the configured write policy
	pub fn set_pictures(&mut self, pictures: Vec<Picture>) {
		match self.policy {
			WritePolicy::All => {
				self.start
					.tags
					.set_on_all(|tag| tag.set_pictures(pictures.clone()));
				self.end
					.tags
					.set_on_all(|tag| tag.set_pictures(pictures.clone()));
			},
			WritePolicy::FirstNonEmpty => {
				let holds = |tag: &dyn Tag| !tag.pictures().is_empty();

				if self
					.start
					.tags
					.set_on_holder(holds, |tag| tag.set_pictures(pictures.clone()))
				{
					return;
				}
				if self
					.end
					.tags
					.set_on_holder(holds, |tag| tag.set_pictures(pictures.clone()))
				{
					return;
				}
				if self
					.start
					.tags
					.set_on_first(|tag| tag.set_pictures(pictures.clone()))
				{
					return;
				}
				let _ = self
					.end
					.tags
					.set_on_first(|tag| tag.set_pictures(pictures.clone()));
			},
		}
	}

	/// Remove pictures from every held tag
	pub fn remove_pictures(&mut self) {
		self.start.tags.remove_pictures();
		self.end.tags.remove_pictures();
	}
}

fn probe_start_candidate<F: FileLike>(
	stream: &mut FileStream<F>,
	offset: u64,
	parse_options: ParseOptions,
) -> Result<Candidate> {
	stream.seek(SeekFrom::Start(offset))?;
	let block = stream.read_block(APE_ENVELOPE_SIZE as usize)?;

	if block.len() < APE_ENVELOPE_SIZE as usize || !block.starts_with(APE_PREAMBLE) {
		return Ok(Candidate::Absent);
	}

	let header = match ApeHeader::parse(&block) {
		Ok(header) => header,
		Err(e) => {
			if parse_options.parsing_mode == ParsingMode::Strict {
				return Err(e);
			}

			return Ok(Candidate::Corrupt);
		},
	};

	// Only the header half of the envelope marks a tag at the file's start
	if !header.flags.is_header() {
		return Ok(Candidate::Absent);
	}

	if u64::from(header.size) + u64::from(APE_ENVELOPE_SIZE) > stream.len()? {
		if parse_options.parsing_mode == ParsingMode::Strict {
			err!(SizeMismatch);
		}

		return Ok(Candidate::Corrupt);
	}

	let items_len = (header.size - APE_ENVELOPE_SIZE) as usize;
	let items = stream.read_block(items_len)?;
	if items.len() < items_len {
		if parse_options.parsing_mode == ParsingMode::Strict {
			err!(SizeMismatch);
		}

		return Ok(Candidate::Corrupt);
	}

	let tag = ape_read::parse_items(&items, &header, parse_options)?;

	// The region covers this header, the items, and the footer
	Ok(Candidate::Found(
		Box::new(tag),
		u64::from(APE_ENVELOPE_SIZE) + u64::from(header.size),
	))
}

fn probe_end_candidate<F: FileLike>(
	stream: &mut FileStream<F>,
	end_offset: u64,
	lower_bound: u64,
	parse_options: ParseOptions,
) -> Result<Candidate> {
	// ID3v1 occupies the final 128 bytes
	if end_offset >= lower_bound + 128 {
		stream.seek(SeekFrom::Start(end_offset - 128))?;
		let block = stream.read_block(128)?;

		if block.starts_with(&ID3V1_TAG_MARKER) {
			return match Id3v1Tag::parse(&block, parse_options.parsing_mode) {
				Ok(tag) => Ok(Candidate::Found(Box::new(tag), 128)),
				Err(e) => {
					if parse_options.parsing_mode == ParsingMode::Strict {
						return Err(e);
					}

					Ok(Candidate::Corrupt)
				},
			};
		}
	}

	// An APE tag ends with the footer half of its envelope
	if end_offset >= lower_bound + u64::from(APE_ENVELOPE_SIZE) {
		stream.seek(SeekFrom::Start(end_offset - u64::from(APE_ENVELOPE_SIZE)))?;
		let block = stream.read_block(APE_ENVELOPE_SIZE as usize)?;

		if block.starts_with(APE_PREAMBLE) {
			let header = match ApeHeader::parse(&block) {
				Ok(header) if !header.flags.is_header() => header,
				Ok(_) => return Ok(Candidate::Absent),
				Err(e) => {
					if parse_options.parsing_mode == ParsingMode::Strict {
						return Err(e);
					}

					return Ok(Candidate::Corrupt);
				},
			};

			let total = header.size_on_disk();
			if end_offset < lower_bound + total {
				if parse_options.parsing_mode == ParsingMode::Strict {
					err!(SizeMismatch);
				}

				return Ok(Candidate::Corrupt);
			}

			let items_len = (header.size - APE_ENVELOPE_SIZE) as usize;
			let items_start = end_offset - u64::from(APE_ENVELOPE_SIZE) - items_len as u64;

			stream.seek(SeekFrom::Start(items_start))?;
			let items = stream.read_block(items_len)?;

			let tag = ape_read::parse_items(&items, &header, parse_options)?;
			return Ok(Candidate::Found(Box::new(tag), total));
		}
	}

	Ok(Candidate::Absent)
}

// One entry per `Accessor` field, resolving across the start tags first and
// then the end tags.
macro_rules! sandwich_accessors {
	($(($get:ident, $set:ident, $remove:ident, $ret_ty:ty, $owned_ty:ty)),+ $(,)?) => {
		impl Accessor for Sandwich {
			$(
				fn $get(&self) -> Option<$ret_ty> {
					self.start.tags.$get().or_else(|| self.end.tags.$get())
				}

				fn $set(&mut self, value: $owned_ty) {
					match self.policy {
						WritePolicy::All => {
							self.start.tags.set_on_all(|tag| tag.$set(value.clone()));
							self.end.tags.set_on_all(|tag| tag.$set(value.clone()));
						},
						WritePolicy::FirstNonEmpty => {
							let holds = |tag: &dyn Tag| tag.$get().is_some();

							if self.start.tags.set_on_holder(holds, |tag| tag.$set(value.clone())) {
								return;
							}
							if self.end.tags.set_on_holder(holds, |tag| tag.$set(value.clone())) {
								return;
							}
							if self.start.tags.set_on_first(|tag| tag.$set(value.clone())) {
								return;
							}
							let _ = self.end.tags.set_on_first(|tag| tag.$set(value.clone()));
						},
					}
				}

				fn $remove(&mut self) {
					self.start.tags.$remove();
					self.end.tags.$remove();
				}
			)+
		}
	};
}

sandwich_accessors! {
	(title, set_title, remove_title, Cow<'_, str>, String),
	(artist, set_artist, remove_artist, Cow<'_, str>, String),
	(album, set_album, remove_album, Cow<'_, str>, String),
	(album_artist, set_album_artist, remove_album_artist, Cow<'_, str>, String),
	(genre, set_genre, remove_genre, Cow<'_, str>, String),
	(comment, set_comment, remove_comment, Cow<'_, str>, String),
	(lyrics, set_lyrics, remove_lyrics, Cow<'_, str>, String),
	(track, set_track, remove_track, u32, u32),
	(track_total, set_track_total, remove_track_total, u32, u32),
	(disk, set_disk, remove_disk, u32, u32),
	(disk_total, set_disk_total, remove_disk_total, u32, u32),
	(year, set_year, remove_year, u32, u32),
	(replaygain_track_gain, set_replaygain_track_gain, remove_replaygain_track_gain, f64, f64),
	(replaygain_track_peak, set_replaygain_track_peak, remove_replaygain_track_peak, f64, f64),
	(replaygain_album_gain, set_replaygain_album_gain, remove_replaygain_album_gain, f64, f64),
	(replaygain_album_peak, set_replaygain_album_peak, remove_replaygain_album_peak, f64, f64),
	(musicbrainz_track_id, set_musicbrainz_track_id, remove_musicbrainz_track_id, Cow<'_, str>, String),
	(musicbrainz_release_id, set_musicbrainz_release_id, remove_musicbrainz_release_id, Cow<'_, str>, String),
}

#[cfg(test)]
mod tests {
	use super::Sandwich;
	use crate::ape::ApeTag;
	use crate::config::{ParseOptions, ParsingMode, WriteOptions};
	use crate::io::FileStream;
	use crate::tag::{Accessor, Tag, TagType, TagTypes};

	use std::io::Cursor;

	const MEDIA: &[u8] = b"media payload bytes, definitely not a tag";

	fn ape_tag_bytes(album: &str) -> Vec<u8> {
		let mut tag = ApeTag::new();
		tag.set_album(String::from(album));
		tag.render(WriteOptions::new()).unwrap()
	}

	fn id3v1_bytes(album: &str) -> Vec<u8> {
		let mut tag = crate::id3v1::Id3v1Tag::new();
		tag.set_album(String::from(album));
		tag.render(WriteOptions::new()).unwrap()
	}

	fn read(data: Vec<u8>) -> (Sandwich, FileStream<Cursor<Vec<u8>>>) {
		let mut stream = FileStream::new(Cursor::new(data));
		let sandwich = Sandwich::read(&mut stream, ParseOptions::new()).unwrap();
		(sandwich, stream)
	}

	#[test_log::test]
	fn probe_tail_tags() {
		let mut data = MEDIA.to_vec();
		let ape = ape_tag_bytes("Ape album");
		let id3v1 = id3v1_bytes("Id3 album");
		data.extend_from_slice(&ape);
		data.extend_from_slice(&id3v1);

		let (sandwich, _) = read(data);

		assert_eq!(sandwich.media_start(), 0);
		assert_eq!(sandwich.media_end(), MEDIA.len() as u64);
		assert_eq!(
			sandwich.end_tag().size_on_disk(),
			(ape.len() + id3v1.len()) as u64
		);

		// File order: APE first, then ID3v1; the getter resolves to the APE value
		assert_eq!(sandwich.tag_count(), 2);
		assert_eq!(sandwich.album().as_deref(), Some("Ape album"));
		assert!(sandwich.contains(TagType::Id3v1));
	}

	#[test_log::test]
	fn probe_head_tag() {
		let mut ape = ApeTag::new();
		ape.set_title(String::from("Front"));
		let rendered = ape.render(WriteOptions::new()).unwrap();

		let mut data = rendered.clone();
		data.extend_from_slice(MEDIA);

		let (sandwich, _) = read(data);

		assert_eq!(sandwich.media_start(), rendered.len() as u64);
		assert_eq!(sandwich.start_tag().size_on_disk(), rendered.len() as u64);
		assert_eq!(sandwich.title().as_deref(), Some("Front"));
	}

	#[test_log::test]
	fn untagged_file() {
		let (sandwich, _) = read(MEDIA.to_vec());

		assert_eq!(sandwich.tag_count(), 0);
		assert_eq!(sandwich.media_start(), 0);
		assert_eq!(sandwich.media_end(), MEDIA.len() as u64);
	}

	#[test_log::test]
	fn save_rewrites_only_the_tag_regions() {
		let mut data = MEDIA.to_vec();
		data.extend_from_slice(&ape_tag_bytes("Before"));

		let (mut sandwich, mut stream) = read(data);
		sandwich.set_album(String::from("After, much longer than before"));
		sandwich.save(&mut stream, WriteOptions::new()).unwrap();

		let out = stream.into_inner().into_inner();
		assert_eq!(&out[..MEDIA.len()], MEDIA);

		// Boundaries reflect the fresh render
		assert_eq!(sandwich.media_end(), MEDIA.len() as u64);
		assert_eq!(
			out.len() as u64,
			sandwich.media_end() + sandwich.end_tag().size_on_disk()
		);

		// Reopen and check
		let mut stream = FileStream::new(Cursor::new(out));
		let reread = Sandwich::read(&mut stream, ParseOptions::new()).unwrap();
		assert_eq!(
			reread.album().as_deref(),
			Some("After, much longer than before")
		);
	}

	#[test_log::test]
	fn created_tags_keep_id3v1_last() {
		let mut data = MEDIA.to_vec();
		data.extend_from_slice(&id3v1_bytes("Id3 album"));

		let (mut sandwich, mut stream) = read(data);

		// Creating an APE tag places it before the existing ID3v1
		let ape = sandwich.tag_of_mut(TagType::Ape, true).unwrap();
		ape.set_album(String::from("Ape album"));

		sandwich.save(&mut stream, WriteOptions::new()).unwrap();

		let out = stream.into_inner().into_inner();
		// The last 128 bytes must still be the ID3v1 tag
		assert_eq!(&out[out.len() - 128..out.len() - 125], b"TAG");

		let mut stream = FileStream::new(Cursor::new(out));
		let reread = Sandwich::read(&mut stream, ParseOptions::new()).unwrap();
		assert_eq!(reread.tag_count(), 2);
		assert_eq!(reread.album().as_deref(), Some("Ape album"));
	}

	#[test_log::test]
	fn remove_tags_strips_bytes_on_save() {
		let mut data = MEDIA.to_vec();
		data.extend_from_slice(&ape_tag_bytes("Album"));
		data.extend_from_slice(&id3v1_bytes("Album"));

		let (mut sandwich, mut stream) = read(data);
		sandwich.remove_tags(TagTypes::ALL);
		sandwich.save(&mut stream, WriteOptions::new()).unwrap();

		let out = stream.into_inner().into_inner();
		assert_eq!(out, MEDIA);
	}

	#[test_log::test]
	fn corrupt_candidate_blocks_save() {
		let mut data = MEDIA.to_vec();
		let mut ape = ape_tag_bytes("Album");
		// Lie about the tag size in the footer
		let size_offset = ape.len() - 20;
		ape[size_offset..size_offset + 4].copy_from_slice(&0xFFFF_FF00u32.to_le_bytes());
		data.extend_from_slice(&ape);

		let (mut sandwich, mut stream) = read(data);
		assert!(sandwich.is_possibly_corrupt());
		assert_eq!(sandwich.tag_count(), 0);

		assert!(sandwich.save(&mut stream, WriteOptions::new()).is_err());
	}

	#[test_log::test]
	fn relaxed_mode_does_not_block_save() {
		let mut data = MEDIA.to_vec();
		let mut ape = ape_tag_bytes("Album");
		let size_offset = ape.len() - 20;
		ape[size_offset..size_offset + 4].copy_from_slice(&0xFFFF_FF00u32.to_le_bytes());
		data.extend_from_slice(&ape);

		let mut stream = FileStream::new(Cursor::new(data));
		let mut sandwich = Sandwich::read(
			&mut stream,
			ParseOptions::new().parsing_mode(ParsingMode::Relaxed),
		)
		.unwrap();

		assert!(!sandwich.is_possibly_corrupt());
		assert!(sandwich.save(&mut stream, WriteOptions::new()).is_ok());
	}
}
