//! The canonical round list and its derived rendering order.

use super::item::{ArtifactDir, RoundBreak, RoundItem, Song};

/// Default length of the break inserted between two songs, in seconds.
pub const DEFAULT_SONG_BREAK: u32 = 10;

/// Songs and breaks in the order the sources file declares them.
///
/// Items are only ever appended. Each append takes the next index, so
/// artifact names derived from indices never collide.
#[derive(Debug, Clone)]
pub struct RoundList {
    items: Vec<RoundItem>,
    artifacts: ArtifactDir,
    song_break: u32,
}

impl Default for RoundList {
    fn default() -> Self {
        Self::new(ArtifactDir::default(), DEFAULT_SONG_BREAK)
    }
}

impl RoundList {
    /// Create an empty list.
    ///
    /// `song_break` is the duration of breaks inserted between consecutive
    /// songs that have no explicit break between them.
    pub fn new(artifacts: ArtifactDir, song_break: u32) -> Self {
        Self {
            items: Vec::new(),
            artifacts,
            song_break,
        }
    }

    pub fn artifacts(&self) -> &ArtifactDir {
        &self.artifacts
    }

    pub fn song_break(&self) -> u32 {
        self.song_break
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items exactly as declared, explicit breaks only.
    pub fn items(&self) -> &[RoundItem] {
        &self.items
    }

    /// Append a song. Returns its index.
    pub fn append_song(&mut self, link: impl Into<String>) -> usize {
        let index = self.items.len();
        self.items.push(RoundItem::Song(Song::new(index, link)));
        index
    }

    /// Append an explicit break of `duration` seconds. Returns its index.
    pub fn append_break(&mut self, duration: u32) -> usize {
        let index = self.items.len();
        self.items.push(RoundItem::Break(RoundBreak::new(index, duration)));
        index
    }

    /// Items in playback order, with a break after every song that is
    /// followed by another song.
    ///
    /// Only the following item is checked, so a song preceded by a break
    /// still gets a break after it when the next item is a song. Nothing is
    /// inserted after the last item.
    pub fn rendering_order(&self) -> Vec<RoundItem> {
        let mut order = Vec::with_capacity(self.items.len() * 2);
        let mut iter = self.items.iter().peekable();

        while let Some(item) = iter.next() {
            order.push(item.clone());
            if let (RoundItem::Song(_), Some(RoundItem::Song(_))) = (item, iter.peek()) {
                order.push(RoundItem::Break(RoundBreak::synthetic(self.song_break)));
            }
        }

        order
    }

    /// Songs in rendering order.
    pub fn songs(&self) -> Vec<Song> {
        self.rendering_order()
            .into_iter()
            .filter_map(|item| match item {
                RoundItem::Song(song) => Some(song),
                RoundItem::Break(_) => None,
            })
            .collect()
    }

    /// Distinct break durations in rendering order, first occurrence wins.
    pub fn break_durations(&self) -> Vec<u32> {
        let mut durations = Vec::new();
        for item in self.rendering_order() {
            if let RoundItem::Break(brk) = item
                && !durations.contains(&brk.duration())
            {
                durations.push(brk.duration());
            }
        }
        durations
    }

    /// Total length of all breaks in seconds.
    pub fn total_break_secs(&self) -> u64 {
        self.rendering_order()
            .iter()
            .filter_map(RoundItem::as_break)
            .map(|brk| u64::from(brk.duration()))
            .sum()
    }
}
