use super::scan::{is_audio_file, make_name};
use super::*;
use crate::config::LibrarySettings;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn make_name_prefers_artist_dash_title() {
    assert_eq!(make_name("Song", Some("Artist")), "Artist - Song");
    assert_eq!(make_name("Song", Some("  Artist  ")), "Artist - Song");
    assert_eq!(make_name("Song", None), "Song");
    assert_eq!(make_name("Song", Some("   ")), "Song");
}

#[test]
fn is_audio_file_matches_configured_extensions_case_insensitive() {
    let settings = LibrarySettings::default();
    assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a"), &settings));

    let dotted = LibrarySettings {
        extensions: vec![".Opus".into()],
        ..LibrarySettings::default()
    };
    assert!(is_audio_file(Path::new("/tmp/a.opus"), &dotted));
    assert!(!is_audio_file(Path::new("/tmp/a.mp3"), &dotted));
}

#[test]
fn scan_filters_non_audio_and_sorts_by_name_case_insensitive() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let tracks = scan(dir.path(), &LibrarySettings::default());
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "A");
    assert_eq!(tracks[1].name, "b");
    // Untagged garbage has no known length until the engine opens it.
    assert_eq!(tracks[0].duration, Duration::ZERO);
}

#[test]
fn scan_respects_include_hidden_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "visible");
}

#[test]
fn scan_respects_recursive_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        recursive: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "root");
}

#[test]
fn playlist_from_dir_is_named_after_the_directory() {
    let dir = tempdir().unwrap();
    let album = dir.path().join("album");
    fs::create_dir_all(&album).unwrap();
    fs::write(album.join("one.flac"), b"not real").unwrap();
    fs::write(album.join("two.flac"), b"not real").unwrap();

    let playlist = Playlist::from_dir(&album, &LibrarySettings::default());
    assert_eq!(playlist.name, "album");
    assert_eq!(playlist.len(), 2);
    assert_eq!(playlist.tracks()[0].path, album.join("one.flac"));
}
