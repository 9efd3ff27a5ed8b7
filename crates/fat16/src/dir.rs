//! Root directory records.
//!
//! ```text
//! [0..8]   name, space padded
//! [8..11]  extension, space padded
//! [11]     attributes
//! [12..22] reserved
//! [22..24] time
//! [24..26] date
//! [26..28] start cluster  u16 le
//! [28..32] size in bytes  u32 le
//! ```

/// Size of one directory record.
pub const ENTRY_SIZE: usize = 32;

/// Classification by the first name byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryKind {
    /// `0x00`: never used.
    Unused,
    /// `0xE5`: deleted.
    Deleted,
    /// `0x05`: live entry whose real first byte is `0xE5`.
    Escaped,
    /// `0x2E`: `.` / `..` directory link.
    Directory,
    /// Anything else.
    Regular,
}

impl EntryKind {
    /// Classify a record from its first byte.
    #[must_use]
    pub fn classify(first: u8) -> Self {
        match first {
            0x00 => Self::Unused,
            0xE5 => Self::Deleted,
            0x05 => Self::Escaped,
            0x2E => Self::Directory,
            _ => Self::Regular,
        }
    }
}

/// An 8.3 name as stored on disk: upper case, space padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShortName {
    /// Base name.
    pub name: [u8; 8],
    /// Extension.
    pub ext: [u8; 3],
}

impl ShortName {
    /// Build from a base name and extension.
    ///
    /// Returns `None` if either part is too long for 8.3 or contains a
    /// non-ASCII byte.
    pub fn new(name: &str, ext: &str) -> Option<Self> {
        Some(Self {
            name: pad(name)?,
            ext: pad(ext)?,
        })
    }

    /// Base name with trailing padding removed.
    pub fn base(&self) -> &[u8] {
        trim(&self.name)
    }

    /// Extension with trailing padding removed.
    pub fn extension(&self) -> &[u8] {
        trim(&self.ext)
    }
}

fn pad<const N: usize>(part: &str) -> Option<[u8; N]> {
    if part.len() > N || !part.is_ascii() {
        return None;
    }
    let mut out = [b' '; N];
    for (dst, src) in out.iter_mut().zip(part.bytes()) {
        *dst = src.to_ascii_uppercase();
    }
    Some(out)
}

fn trim(field: &[u8]) -> &[u8] {
    let len = field.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    field.get(..len).unwrap_or_default()
}

/// A decoded root directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirectoryEntry {
    /// 8.3 name exactly as stored.
    pub name: ShortName,
    /// Classification from the first name byte.
    pub kind: EntryKind,
    /// Attribute byte.
    pub attributes: u8,
    /// First cluster of the file's chain.
    pub start_cluster: u16,
    /// File length in bytes.
    pub size: u32,
}

impl DirectoryEntry {
    /// Decode one 32-byte record.
    #[must_use]
    pub fn parse(raw: &[u8; ENTRY_SIZE]) -> Self {
        let mut name = ShortName {
            name: [0; 8],
            ext: [0; 3],
        };
        let (base, rest) = raw.split_at(8);
        let (ext, _) = rest.split_at(3);
        name.name.copy_from_slice(base);
        name.ext.copy_from_slice(ext);

        let [.., c0, c1, s0, s1, s2, s3] = *raw;
        Self {
            name,
            kind: EntryKind::classify(name.name[0]),
            attributes: raw[11],
            start_cluster: u16::from_le_bytes([c0, c1]),
            size: u32::from_le_bytes([s0, s1, s2, s3]),
        }
    }

    /// Whether this is a live regular file with extension `ext`.
    #[must_use]
    pub fn is_regular_with_extension(&self, ext: &[u8; 3]) -> bool {
        self.kind == EntryKind::Regular && self.name.ext.eq_ignore_ascii_case(ext)
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(name: &[u8; 11], cluster: u16, size: u32) -> [u8; ENTRY_SIZE] {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[..11].copy_from_slice(name);
        raw[11] = 0x20;
        raw[26..28].copy_from_slice(&cluster.to_le_bytes());
        raw[28..32].copy_from_slice(&size.to_le_bytes());
        raw
    }

    #[test]
    fn classifies_first_byte() {
        assert_eq!(EntryKind::classify(0x00), EntryKind::Unused);
        assert_eq!(EntryKind::classify(0xE5), EntryKind::Deleted);
        assert_eq!(EntryKind::classify(0x05), EntryKind::Escaped);
        assert_eq!(EntryKind::classify(0x2E), EntryKind::Directory);
        assert_eq!(EntryKind::classify(b'S'), EntryKind::Regular);
    }

    #[test]
    fn parses_record_fields() {
        let entry = DirectoryEntry::parse(&record(b"SONG01  WAV", 7, 88_244));
        assert_eq!(entry.name, ShortName::new("song01", "wav").unwrap());
        assert_eq!(entry.kind, EntryKind::Regular);
        assert_eq!(entry.start_cluster, 7);
        assert_eq!(entry.size, 88_244);
        assert!(entry.is_regular_with_extension(b"WAV"));
        assert!(!entry.is_regular_with_extension(b"MP3"));
    }

    #[test]
    fn deleted_entry_never_matches_extension() {
        let entry = DirectoryEntry::parse(&record(b"\xE5ONG01  WAV", 7, 10));
        assert!(!entry.is_regular_with_extension(b"WAV"));
    }

    #[test]
    fn short_name_pads_and_uppercases() {
        let n = ShortName::new("a", "wv").unwrap();
        assert_eq!(&n.name, b"A       ");
        assert_eq!(&n.ext, b"WV ");
        assert_eq!(n.base(), b"A");
        assert_eq!(n.extension(), b"WV");
    }

    #[test]
    fn short_name_rejects_long_parts() {
        assert!(ShortName::new("TOOLONGNAME", "WAV").is_none());
        assert!(ShortName::new("OK", "WAVE").is_none());
    }
}
