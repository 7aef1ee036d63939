#![allow(missing_docs)]

use tagsmith::config::ParseOptions;
use tagsmith::file::{AudioFile, FileType};
use tagsmith::io::FileStream;
use tagsmith::prelude::*;
use tagsmith::probe::Probe;
use tagsmith::{read_from, read_from_path};

use std::io::{Cursor, Seek, SeekFrom, Write};

// 128 kbps, 44.1 kHz, stereo, layer 3, version 1; frame length 417
const MPEG_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];

fn mpeg_payload(frames: usize) -> Vec<u8> {
	let mut out = Vec::new();
	for _ in 0..frames {
		let mut frame = vec![0u8; 417];
		frame[..4].copy_from_slice(&MPEG_HEADER);
		out.extend_from_slice(&frame);
	}
	out
}

fn ape_tag_bytes(album: &str) -> Vec<u8> {
	let mut tag = tagsmith::ape::ApeTag::new();
	tag.set_album(String::from(album));
	tag.render(tagsmith::config::WriteOptions::new()).unwrap()
}

#[test_log::test]
fn read_mutate_save_reopen() {
	let media = mpeg_payload(8);
	let mut data = media.clone();
	data.extend_from_slice(&ape_tag_bytes("Test"));

	let mut file = read_from(Cursor::new(data)).unwrap();

	assert_eq!(file.file_type(), FileType::Mpeg);
	assert_eq!(file.tag().album().as_deref(), Some("Test"));
	assert_eq!(file.properties().audio_bitrate(), 128);
	assert_eq!(file.properties().audio_sample_rate(), 44100);
	assert_eq!(file.properties().audio_channels(), 2);
	assert!(file.properties().duration().as_millis() > 0);

	file.tag_mut().set_album(String::from("New"));
	file.save().unwrap();

	let out = file.into_inner().into_inner();

	// The media is untouched and the length accounts for the new render exactly
	assert_eq!(&out[..media.len()], &media[..]);
	assert_eq!(out.len(), media.len() + ape_tag_bytes("New").len());

	let reopened = read_from(Cursor::new(out)).unwrap();
	assert_eq!(reopened.tag().album().as_deref(), Some("New"));
}

#[test_log::test]
fn save_is_idempotent() {
	let mut data = mpeg_payload(4);
	data.extend_from_slice(&ape_tag_bytes("Stable"));

	let mut file = read_from(Cursor::new(data)).unwrap();
	file.save().unwrap();
	let first = file.into_inner().into_inner();

	let mut file = read_from(Cursor::new(first.clone())).unwrap();
	file.save().unwrap();
	let second = file.into_inner().into_inner();

	assert_eq!(first, second);
}

#[test_log::test]
fn remove_tags_and_save() {
	let media = mpeg_payload(4);
	let mut data = media.clone();
	data.extend_from_slice(&ape_tag_bytes("Going away"));

	let mut file = read_from(Cursor::new(data)).unwrap();
	file.remove_tags(TagTypes::ALL);
	file.save().unwrap();

	assert_eq!(file.into_inner().into_inner(), media);
}

#[test_log::test]
fn create_tags_on_untagged_file() {
	let media = mpeg_payload(4);

	let mut file = read_from(Cursor::new(media.clone())).unwrap();
	assert!(!file.contains_tag());

	{
		let ape = file.tag_of(TagType::Ape, true).unwrap().unwrap();
		ape.set_title(String::from("Fresh"));
		ape.set_track(3);
	}
	{
		let id3v1 = file.tag_of(TagType::Id3v1, true).unwrap().unwrap();
		id3v1.set_title(String::from("Fresh"));
	}

	file.save().unwrap();
	let out = file.into_inner().into_inner();

	// Media, then the APE tag, then ID3v1 in the final 128 bytes
	assert_eq!(&out[..media.len()], &media[..]);
	assert_eq!(&out[out.len() - 128..out.len() - 125], b"TAG");

	let reopened = read_from(Cursor::new(out)).unwrap();
	assert!(reopened.contains_tag_type(TagType::Ape));
	assert!(reopened.contains_tag_type(TagType::Id3v1));
	assert_eq!(reopened.tag().title().as_deref(), Some("Fresh"));
	assert_eq!(reopened.tag().track(), Some(3));
}

#[test_log::test]
fn open_save_through_a_path() {
	let mut temp = tempfile::Builder::new()
		.suffix(".mp3")
		.tempfile()
		.unwrap();

	let mut data = mpeg_payload(4);
	data.extend_from_slice(&ape_tag_bytes("On disk"));
	temp.write_all(&data).unwrap();
	temp.seek(SeekFrom::Start(0)).unwrap();

	{
		let mut file = AudioFile::open(temp.path()).unwrap();
		assert_eq!(file.file_type(), FileType::Mpeg);
		assert_eq!(file.tag().album().as_deref(), Some("On disk"));

		file.tag_mut().set_artist(String::from("Somebody"));
		file.save().unwrap();
	}

	let reopened = read_from_path(temp.path()).unwrap();
	assert_eq!(reopened.tag().album().as_deref(), Some("On disk"));
	assert_eq!(reopened.tag().artist().as_deref(), Some("Somebody"));
}

#[test_log::test]
fn read_only_refuses_save() {
	let mut temp = tempfile::Builder::new()
		.suffix(".mp3")
		.tempfile()
		.unwrap();
	temp.write_all(&mpeg_payload(4)).unwrap();

	let mut file = AudioFile::open_read_only(temp.path()).unwrap();
	file.tag_mut().set_album(String::from("Never lands"));

	assert!(file.save().is_err());
}

#[test_log::test]
fn properties_can_be_skipped() {
	let data = mpeg_payload(4);

	let file = Probe::new(FileStream::new(Cursor::new(data)))
		.with_options(ParseOptions::new().read_properties(false))
		.guess_file_type()
		.unwrap()
		.read()
		.unwrap();

	assert_eq!(file.properties().audio_bitrate(), 0);
	assert_eq!(file.properties().duration().as_millis(), 0);
}

#[test_log::test]
fn unknown_format_is_an_error() {
	// No signature, no extension hint
	let data = vec![0x42u8; 512];
	assert!(read_from(Cursor::new(data)).is_err());
}
