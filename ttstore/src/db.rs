//! SQLite-backed scrobble store
//!
//! The connection sits behind a `Mutex` and every operation is a single
//! statement, so concurrent writers (sync engine inserting rows, metadata
//! cache filling enrichment columns) interleave safely: all writes are
//! either idempotent (`INSERT OR IGNORE`) or monotonic (null to value).

use crate::error::Result;
use crate::models::{NewScrobble, ScrobbleEvent};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Durable store of play events, keyed to prevent duplicate insertion.
///
/// # Example
///
/// ```no_run
/// use ttstore::{NewScrobble, ScrobbleStore};
///
/// let store = ScrobbleStore::open("tunetrail.db")?;
/// store.insert_event(&NewScrobble {
///     artist: "Caribou".to_string(),
///     track: "Odessa".to_string(),
///     album: Some("Swim".to_string()),
///     played_at: 1_700_000_000,
/// })?;
/// # Ok::<(), ttstore::Error>(())
/// ```
#[derive(Debug)]
pub struct ScrobbleStore {
    conn: Mutex<Connection>,
}

impl ScrobbleStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(db = %path.display(), "Opened scrobble database");
        Self::init(conn)
    }

    /// Open an in-memory store. The data is lost when the store is dropped;
    /// intended for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS scrobbles (
                 id             INTEGER PRIMARY KEY,
                 artist         TEXT NOT NULL COLLATE NOCASE,
                 track          TEXT NOT NULL COLLATE NOCASE,
                 album          TEXT COLLATE NOCASE,
                 played_at      INTEGER NOT NULL,
                 album_image    TEXT,
                 artist_image   TEXT,
                 track_duration INTEGER
             );

             -- Event identity. A plain UNIQUE constraint would treat two NULL
             -- albums as distinct rows, so the album column is folded to ''
             -- inside the index expression.
             CREATE UNIQUE INDEX IF NOT EXISTS idx_scrobbles_identity
                 ON scrobbles (artist, track, IFNULL(album, '') COLLATE NOCASE, played_at);

             -- Metadata cache lookup paths.
             CREATE INDEX IF NOT EXISTS idx_scrobbles_album
                 ON scrobbles (artist, album);
             CREATE INDEX IF NOT EXISTS idx_scrobbles_track
                 ON scrobbles (artist, track);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a play event if it is not already stored.
    ///
    /// Returns `true` when a row was actually inserted, `false` when the
    /// event was already present (a no-op, not an error).
    pub fn insert_event(&self, event: &NewScrobble) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO scrobbles (artist, track, album, played_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![event.artist, event.track, event.album, event.played_at],
        )?;
        Ok(inserted > 0)
    }

    /// Total number of stored events.
    pub fn event_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM scrobbles", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Most recently played events, newest first.
    pub fn recent_events(&self, limit: u32) -> Result<Vec<ScrobbleEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, artist, track, album, played_at, album_image, artist_image, track_duration
             FROM scrobbles ORDER BY played_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(ScrobbleEvent {
                id: row.get(0)?,
                artist: row.get(1)?,
                track: row.get(2)?,
                album: row.get(3)?,
                played_at: row.get(4)?,
                album_image: row.get(5)?,
                artist_image: row.get(6)?,
                track_duration: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ========================================================================
    // Metadata cache columns
    // ========================================================================

    /// First stored album cover for `(artist, album)`, if any row has one.
    pub fn album_image(&self, artist: &str, album: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let image = conn
            .query_row(
                "SELECT album_image FROM scrobbles
                 WHERE artist = ?1 AND album = ?2 AND album_image IS NOT NULL
                 LIMIT 1",
                params![artist, album],
                |row| row.get(0),
            )
            .optional()?;
        Ok(image)
    }

    /// Store an album cover on every row sharing the `(artist, album)` key.
    pub fn set_album_image(&self, artist: &str, album: &str, image: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE scrobbles SET album_image = ?3 WHERE artist = ?1 AND album = ?2",
            params![artist, album, image],
        )?;
        Ok(updated)
    }

    /// First stored artist image for `artist`, if any row has one.
    pub fn artist_image(&self, artist: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let image = conn
            .query_row(
                "SELECT artist_image FROM scrobbles
                 WHERE artist = ?1 AND artist_image IS NOT NULL
                 LIMIT 1",
                params![artist],
                |row| row.get(0),
            )
            .optional()?;
        Ok(image)
    }

    /// Store an artist image on every row by `artist`.
    pub fn set_artist_image(&self, artist: &str, image: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE scrobbles SET artist_image = ?2 WHERE artist = ?1",
            params![artist, image],
        )?;
        Ok(updated)
    }

    /// First stored album cover on a row matching `(artist, track)`.
    ///
    /// Track charts carry no album name, so this is how a track gets the
    /// cover already resolved for the album it was scrobbled from. The
    /// negative marker (empty string) is skipped.
    pub fn track_album_image(&self, artist: &str, track: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let image = conn
            .query_row(
                "SELECT album_image FROM scrobbles
                 WHERE artist = ?1 AND track = ?2
                   AND album_image IS NOT NULL AND album_image != ''
                 LIMIT 1",
                params![artist, track],
                |row| row.get(0),
            )
            .optional()?;
        Ok(image)
    }

    /// First stored duration for `(artist, track)`, if any row has one.
    pub fn track_duration(&self, artist: &str, track: &str) -> Result<Option<u32>> {
        let conn = self.conn.lock().unwrap();
        let duration = conn
            .query_row(
                "SELECT track_duration FROM scrobbles
                 WHERE artist = ?1 AND track = ?2 AND track_duration IS NOT NULL
                 LIMIT 1",
                params![artist, track],
                |row| row.get(0),
            )
            .optional()?;
        Ok(duration)
    }

    /// Store a duration on every row sharing the `(artist, track)` key.
    pub fn set_track_duration(&self, artist: &str, track: &str, seconds: u32) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE scrobbles SET track_duration = ?3 WHERE artist = ?1 AND track = ?2",
            params![artist, track, seconds],
        )?;
        Ok(updated)
    }

    // ========================================================================
    // Play counts (consumed by the friend-comparison feature)
    // ========================================================================

    /// Number of plays of any track by `artist`.
    pub fn artist_play_count(&self, artist: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM scrobbles WHERE artist = ?1",
            params![artist],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of plays of `(artist, album)`.
    pub fn album_play_count(&self, artist: &str, album: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM scrobbles WHERE artist = ?1 AND album = ?2",
            params![artist, album],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of plays of `(artist, track)`.
    pub fn track_play_count(&self, artist: &str, track: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM scrobbles WHERE artist = ?1 AND track = ?2",
            params![artist, track],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of distinct artists in the store.
    pub fn distinct_artist_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(DISTINCT artist) FROM scrobbles",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of distinct named albums in the store.
    pub fn distinct_album_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(DISTINCT album) FROM scrobbles WHERE album IS NOT NULL AND album != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
