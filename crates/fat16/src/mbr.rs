//! Master boot record partition table.
//!
//! Four 16-byte entries start at byte `0x1BE` of sector 0:
//!
//! ```text
//! [0]      status
//! [1..4]   CHS start
//! [4]      partition type
//! [5..8]   CHS end
//! [8..12]  start sector  u32 le
//! [12..16] sector count  u32 le
//! ```

use platform::Block;

/// Byte offset of the first partition entry in sector 0.
pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

/// Size of one partition entry.
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Number of primary partition entries.
pub const PARTITION_ENTRIES: usize = 4;

/// Type codes of the FAT16 family: <32M, >=32M and LBA-addressed.
pub const FAT16_TYPES: [u8; 3] = [0x04, 0x06, 0x0E];

/// A selected primary partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartitionDescriptor {
    /// Partition type byte.
    pub kind: u8,
    /// First sector of the partition.
    pub start_sector: u32,
    /// Length in sectors.
    pub sector_count: u32,
}

impl PartitionDescriptor {
    /// Decode one 16-byte entry.
    #[must_use]
    pub fn parse(entry: &[u8; PARTITION_ENTRY_SIZE]) -> Self {
        let [_, _, _, _, kind, _, _, _, s0, s1, s2, s3, c0, c1, c2, c3] = *entry;
        Self {
            kind,
            start_sector: u32::from_le_bytes([s0, s1, s2, s3]),
            sector_count: u32::from_le_bytes([c0, c1, c2, c3]),
        }
    }

    /// Whether the type code belongs to the FAT16 family.
    #[must_use]
    pub fn is_fat16(&self) -> bool {
        FAT16_TYPES.contains(&self.kind)
    }
}

/// First FAT16-family entry of the partition table in `sector0`, if any.
pub fn find_fat16_partition(sector0: &Block) -> Option<PartitionDescriptor> {
    let table = sector0.get(PARTITION_TABLE_OFFSET..)?;
    table
        .chunks_exact(PARTITION_ENTRY_SIZE)
        .take(PARTITION_ENTRIES)
        .filter_map(|raw| <&[u8; PARTITION_ENTRY_SIZE]>::try_from(raw).ok())
        .map(PartitionDescriptor::parse)
        .find(PartitionDescriptor::is_fat16)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn mbr_with(entries: &[(usize, u8, u32)]) -> Block {
        let mut sector = [0u8; 512];
        for &(slot, kind, start) in entries {
            let base = PARTITION_TABLE_OFFSET + slot * PARTITION_ENTRY_SIZE;
            sector[base + 4] = kind;
            sector[base + 8..base + 12].copy_from_slice(&start.to_le_bytes());
        }
        sector
    }

    #[test]
    fn picks_first_fat16_family_entry() {
        let sector = mbr_with(&[(0, 0x0B, 63), (1, 0x83, 2048), (2, 0x06, 4096), (3, 0x04, 9999)]);
        let part = find_fat16_partition(&sector);
        assert_eq!(part.map(|p| (p.kind, p.start_sector)), Some((0x06, 4096)));
    }

    #[test]
    fn accepts_all_three_type_codes() {
        for kind in FAT16_TYPES {
            let sector = mbr_with(&[(3, kind, 1)]);
            assert_eq!(find_fat16_partition(&sector).map(|p| p.kind), Some(kind));
        }
    }

    #[test]
    fn empty_table_has_no_partition() {
        assert_eq!(find_fat16_partition(&[0u8; 512]), None);
    }
}
