use std::fmt;

/// Identity of one cacheable piece of metadata.
///
/// Names are trimmed at construction; matching is case-insensitive
/// everywhere (the store collates names case-insensitively, and the
/// in-memory layer hashes a lowercased form).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// Artist portrait.
    Artist { artist: String },
    /// Album cover.
    Album { artist: String, album: String },
    /// Track duration.
    Track { artist: String, track: String },
}

impl MetadataKey {
    pub fn artist(artist: &str) -> Self {
        Self::Artist {
            artist: artist.trim().to_string(),
        }
    }

    pub fn album(artist: &str, album: &str) -> Self {
        Self::Album {
            artist: artist.trim().to_string(),
            album: album.trim().to_string(),
        }
    }

    pub fn track(artist: &str, track: &str) -> Self {
        Self::Track {
            artist: artist.trim().to_string(),
            track: track.trim().to_string(),
        }
    }

    /// Case-folded identity used by the in-memory layer, so "Caribou" and
    /// "CARIBOU" coalesce onto one entry.
    pub(crate) fn memory_key(&self) -> String {
        match self {
            Self::Artist { artist } => format!("artist\u{1f}{}", artist.to_lowercase()),
            Self::Album { artist, album } => {
                format!("album\u{1f}{}\u{1f}{}", artist.to_lowercase(), album.to_lowercase())
            }
            Self::Track { artist, track } => {
                format!("track\u{1f}{}\u{1f}{}", artist.to_lowercase(), track.to_lowercase())
            }
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artist { artist } => write!(f, "artist:{artist}"),
            Self::Album { artist, album } => write!(f, "album:{artist}/{album}"),
            Self::Track { artist, track } => write!(f, "track:{artist}/{track}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(
            MetadataKey::album(" Caribou ", "Swim "),
            MetadataKey::album("Caribou", "Swim")
        );
    }

    #[test]
    fn memory_key_is_case_insensitive() {
        assert_eq!(
            MetadataKey::track("CARIBOU", "Odessa").memory_key(),
            MetadataKey::track("caribou", "odessa").memory_key()
        );
    }

    #[test]
    fn memory_key_separates_kinds() {
        assert_ne!(
            MetadataKey::artist("x").memory_key(),
            MetadataKey::album("x", "").memory_key()
        );
    }
}
