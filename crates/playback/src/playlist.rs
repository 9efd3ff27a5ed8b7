//! Track list and transport position.

use fat16::DirectoryEntry;

/// Which way a track change moves through the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Following track, wrapping to the first after the last.
    Next,
    /// Preceding track, wrapping to the last before the first.
    Previous,
}

/// Tracks collected at startup, the current index and the playing flag.
///
/// Never empty: [`Playlist::new`] refuses an empty list.
#[derive(Debug, Clone)]
pub struct Playlist<const P: usize> {
    tracks: heapless::Vec<DirectoryEntry, P>,
    current: usize,
    playing: bool,
}

impl<const P: usize> Playlist<P> {
    /// Start at the first track, playing. `None` if `tracks` is empty.
    pub fn new(tracks: heapless::Vec<DirectoryEntry, P>) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }
        Some(Self {
            tracks,
            current: 0,
            playing: true,
        })
    }

    /// The track under the cursor.
    pub fn current(&self) -> Option<&DirectoryEntry> {
        self.tracks.get(self.current)
    }

    /// Index of the current track.
    pub fn index(&self) -> usize {
        self.current
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All tracks in directory order.
    pub fn tracks(&self) -> &[DirectoryEntry] {
        &self.tracks
    }

    /// Move one track in `direction`, wrapping at either end, and return
    /// the new index.
    pub fn advance(&mut self, direction: Direction) -> usize {
        let len = self.tracks.len().max(1);
        self.current = match direction {
            Direction::Next => (self.current + 1) % len,
            Direction::Previous => (self.current + len - 1) % len,
        };
        self.current
    }

    /// Whether output is meant to be audible.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set the playing flag.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fat16::{EntryKind, ShortName};

    fn entry(n: &str) -> DirectoryEntry {
        DirectoryEntry {
            name: ShortName::new(n, "WAV").unwrap(),
            kind: EntryKind::Regular,
            attributes: 0x20,
            start_cluster: 2,
            size: 1000,
        }
    }

    fn three() -> Playlist<4> {
        let mut v = heapless::Vec::new();
        for n in ["A", "B", "C"] {
            v.push(entry(n)).unwrap();
        }
        Playlist::new(v).unwrap()
    }

    #[test]
    fn empty_list_is_refused() {
        assert!(Playlist::<4>::new(heapless::Vec::new()).is_none());
    }

    #[test]
    fn next_wraps_to_first() {
        let mut p = three();
        assert_eq!(p.advance(Direction::Next), 1);
        assert_eq!(p.advance(Direction::Next), 2);
        assert_eq!(p.advance(Direction::Next), 0);
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut p = three();
        assert_eq!(p.advance(Direction::Previous), 2);
        assert_eq!(p.current().unwrap().name, ShortName::new("C", "WAV").unwrap());
    }

    #[test]
    fn single_track_stays_put() {
        let mut v = heapless::Vec::<_, 1>::new();
        v.push(entry("ONLY")).unwrap();
        let mut p = Playlist::new(v).unwrap();
        assert_eq!(p.advance(Direction::Next), 0);
        assert_eq!(p.advance(Direction::Previous), 0);
    }

    #[test]
    fn starts_playing() {
        let mut p = three();
        assert!(p.is_playing());
        p.set_playing(false);
        assert!(!p.is_playing());
    }
}
