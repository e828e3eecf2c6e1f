use super::constants::DEFAULT_SONG_ID;
use super::error::EngineError;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongEntry {
    /// Audio path as authored in the registry (not yet URI-encoded).
    pub audio: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSong {
    pub id: String,
    pub audio: String,
}

/// Song id to track mapping published by the page.
#[derive(Clone, Debug, Default)]
pub struct SongRegistry {
    songs: BTreeMap<String, SongEntry>,
}

impl SongRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, audio: impl Into<String>) {
        self.songs.insert(
            id.into(),
            SongEntry {
                audio: audio.into(),
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&SongEntry> {
        self.songs.get(id)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Look up the requested id; a missing or empty request means the
    /// default song.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ResolvedSong, EngineError> {
        let id = requested
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SONG_ID);
        self.get(id)
            .map(|entry| ResolvedSong {
                id: id.to_string(),
                audio: entry.audio.clone(),
            })
            .ok_or_else(|| EngineError::SongNotFound(id.to_string()))
    }
}
