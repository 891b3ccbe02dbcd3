use assert_matches::assert_matches;
use libmysound_catalog::{ArtistRecord, TrackRecord};
use pretty_assertions::assert_eq;

use super::*;
use crate::dto::queue_item::UNKNOWN_ARTIST;

fn record(id: &str, image_url: Option<&str>, artists: &[&str]) -> TrackRecord {
    TrackRecord {
        id: id.to_owned(),
        title: format!("Track {id}"),
        album: String::new(),
        file_name: String::new(),
        image_url: image_url.map(|u| u.to_owned()),
        artists: artists
            .iter()
            .enumerate()
            .map(|(i, name)| ArtistRecord {
                id: i as i64,
                name: (*name).to_owned(),
                image_url: None,
            })
            .collect(),
        genres: vec![],
    }
}

#[test]
fn test_build_queue_item() {
    let item = build_queue_item(
        &record("12", Some("/images/12.jpg"), &["A", "B"]),
        "http://host:8080/",
    )
    .unwrap();

    assert_eq!("12", item.id());
    assert_eq!("Track 12", item.title());
    assert_eq!("A, B", item.artist());
    assert_eq!(Some("http://host:8080/images/12.jpg"), item.artwork_url());
    assert_eq!("http://host:8080/api/stream/12", item.stream_url());
}

#[test]
fn test_absolute_artwork_kept() {
    let item = build_queue_item(
        &record("1", Some("https://cdn.example.com/1.png"), &[]),
        "http://host:8080",
    )
    .unwrap();

    assert_eq!(Some("https://cdn.example.com/1.png"), item.artwork_url());
}

#[test]
fn test_missing_artists_left_empty() {
    let item = build_queue_item(&record("1", None, &[]), "http://host").unwrap();

    assert_eq!("", item.artist());
    assert_eq!(UNKNOWN_ARTIST, item.artist_or_unknown());
    assert_eq!(None, item.artwork_url());
}

#[test]
fn test_invalid_id() {
    assert_matches!(
        build_queue_item(&record("abc", None, &[]), "http://host"),
        Err(DescriptorError::InvalidTrackIdentifier(id)) if id == "abc"
    );
}

#[test]
fn test_build_queue_items_drops_invalid() {
    let items = build_queue_items(
        &[
            record("1", None, &[]),
            record("oops", None, &[]),
            record("3", None, &[]),
        ],
        "http://host",
    );

    assert_eq!(
        vec!["1", "3"],
        items.iter().map(|i| i.id()).collect::<Vec<_>>()
    );
}
