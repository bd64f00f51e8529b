use ttstore::{NewScrobble, ScrobbleStore};

fn scrobble(artist: &str, track: &str, album: Option<&str>, played_at: i64) -> NewScrobble {
    NewScrobble {
        artist: artist.to_string(),
        track: track.to_string(),
        album: album.map(str::to_string),
        played_at,
    }
}

#[test]
fn duplicate_insert_is_a_no_op() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    let event = scrobble("Caribou", "Odessa", Some("Swim"), 1_700_000_000);

    assert!(store.insert_event(&event).unwrap());
    assert!(!store.insert_event(&event).unwrap());
    assert_eq!(store.event_count().unwrap(), 1);
}

#[test]
fn duplicate_insert_without_album_is_a_no_op() {
    // NULL albums must not slip past the identity index.
    let store = ScrobbleStore::open_in_memory().unwrap();
    let event = scrobble("Caribou", "Odessa", None, 1_700_000_000);

    assert!(store.insert_event(&event).unwrap());
    assert!(!store.insert_event(&event).unwrap());
    assert_eq!(store.event_count().unwrap(), 1);
}

#[test]
fn same_track_at_different_times_is_two_events() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    assert!(store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
        .unwrap());
    assert!(store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 2))
        .unwrap());
    assert_eq!(store.event_count().unwrap(), 2);
}

#[test]
fn identity_matching_is_case_insensitive() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    assert!(store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
        .unwrap());
    assert!(!store
        .insert_event(&scrobble("CARIBOU", "odessa", Some("SWIM"), 1))
        .unwrap());
}

#[test]
fn enrichment_columns_round_trip() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
        .unwrap();
    store
        .insert_event(&scrobble("Caribou", "Sun", Some("Swim"), 2))
        .unwrap();

    assert_eq!(store.album_image("Caribou", "Swim").unwrap(), None);
    let updated = store
        .set_album_image("Caribou", "Swim", "https://img.example/swim.jpg")
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(
        store.album_image("caribou", "swim").unwrap().as_deref(),
        Some("https://img.example/swim.jpg")
    );

    assert_eq!(store.track_duration("Caribou", "Odessa").unwrap(), None);
    store.set_track_duration("Caribou", "Odessa", 318).unwrap();
    assert_eq!(store.track_duration("CARIBOU", "ODESSA").unwrap(), Some(318));

    assert_eq!(store.artist_image("Caribou").unwrap(), None);
    store
        .set_artist_image("Caribou", "https://img.example/caribou.jpg")
        .unwrap();
    assert_eq!(
        store.artist_image("caribou").unwrap().as_deref(),
        Some("https://img.example/caribou.jpg")
    );
    // Artist images never clobber album covers.
    assert_eq!(
        store.album_image("Caribou", "Swim").unwrap().as_deref(),
        Some("https://img.example/swim.jpg")
    );
}

#[test]
fn track_album_image_reads_the_cover_off_matching_rows() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
        .unwrap();
    store
        .insert_event(&scrobble("Caribou", "Bowls", Some("Swim"), 2))
        .unwrap();

    assert_eq!(store.track_album_image("Caribou", "Odessa").unwrap(), None);
    store
        .set_album_image("Caribou", "Swim", "https://img.example/swim.jpg")
        .unwrap();
    assert_eq!(
        store.track_album_image("caribou", "odessa").unwrap().as_deref(),
        Some("https://img.example/swim.jpg")
    );

    // The negative marker is not a displayable image.
    store.set_album_image("Caribou", "Swim", "").unwrap();
    assert_eq!(store.track_album_image("Caribou", "Odessa").unwrap(), None);
}

#[test]
fn play_counts_match_case_insensitively() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
        .unwrap();
    store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 2))
        .unwrap();
    store
        .insert_event(&scrobble("Four Tet", "Baby", Some("Sixteen Oceans"), 3))
        .unwrap();

    assert_eq!(store.artist_play_count("caribou").unwrap(), 2);
    assert_eq!(store.album_play_count("caribou", "swim").unwrap(), 2);
    assert_eq!(store.track_play_count("CARIBOU", "odessa").unwrap(), 2);
    assert_eq!(store.artist_play_count("unknown").unwrap(), 0);
    assert_eq!(store.distinct_artist_count().unwrap(), 2);
    assert_eq!(store.distinct_album_count().unwrap(), 2);
}

#[test]
fn recent_events_are_newest_first() {
    let store = ScrobbleStore::open_in_memory().unwrap();
    for ts in [10, 30, 20] {
        store
            .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), ts))
            .unwrap();
    }
    let events = store.recent_events(2).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].played_at, 30);
    assert_eq!(events[1].played_at, 20);
}

#[test]
fn store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scrobbles.db");

    {
        let store = ScrobbleStore::open(&path).unwrap();
        store
            .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
            .unwrap();
    }

    let store = ScrobbleStore::open(&path).unwrap();
    assert_eq!(store.event_count().unwrap(), 1);
    assert!(!store
        .insert_event(&scrobble("Caribou", "Odessa", Some("Swim"), 1))
        .unwrap());
}
