//! FAT16 boot sector (BIOS parameter block) and derived volume layout.
//!
//! Fields read, all little-endian:
//!
//! ```text
//! [11..13]  bytes per sector
//! [13]      sectors per cluster
//! [14..16]  reserved sectors
//! [16]      number of FATs
//! [17..19]  root entry count
//! [19..21]  total sectors (16-bit, 0 if the 32-bit field is used)
//! [22..24]  sectors per FAT
//! [32..36]  total sectors (32-bit)
//! [510..512] signature 0x55 0xAA
//! ```

use platform::{Block, BLOCK_SIZE};

/// Size of one root directory entry.
pub const DIR_ENTRY_SIZE: u64 = 32;

/// Parsed BPB fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootSector {
    /// Bytes per sector.
    pub bytes_per_sector: u16,
    /// Sectors per cluster.
    pub sectors_per_cluster: u8,
    /// Sectors before the first FAT.
    pub reserved_sectors: u16,
    /// Number of FAT copies.
    pub num_fats: u8,
    /// Root directory capacity in entries.
    pub root_entry_count: u16,
    /// Total sectors in the volume.
    pub total_sectors: u32,
    /// Sectors occupied by one FAT.
    pub sectors_per_fat: u16,
}

impl BootSector {
    /// Parse a boot sector, rejecting a missing signature or zero geometry.
    ///
    /// All offsets are constants inside the 512-byte block.
    #[allow(clippy::indexing_slicing)]
    pub fn parse(sector: &Block) -> Option<Self> {
        if sector[510] != 0x55 || sector[511] != 0xAA {
            return None;
        }
        let le16 = |at: usize| u16::from_le_bytes([sector[at], sector[at + 1]]);
        let le32 = |at: usize| {
            u32::from_le_bytes([sector[at], sector[at + 1], sector[at + 2], sector[at + 3]])
        };

        let total16 = le16(19);
        let bpb = Self {
            bytes_per_sector: le16(11),
            sectors_per_cluster: sector[13],
            reserved_sectors: le16(14),
            num_fats: sector[16],
            root_entry_count: le16(17),
            total_sectors: if total16 == 0 { le32(32) } else { u32::from(total16) },
            sectors_per_fat: le16(22),
        };

        let geometry_ok = bpb.bytes_per_sector != 0
            && bpb.sectors_per_cluster != 0
            && bpb.num_fats != 0
            && bpb.root_entry_count != 0
            && bpb.sectors_per_fat != 0;
        geometry_ok.then_some(bpb)
    }
}

/// Byte offsets of the volume's regions, fixed at mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VolumeLayout {
    /// Bytes per sector.
    pub bytes_per_sector: u16,
    /// Sectors per cluster.
    pub sectors_per_cluster: u8,
    /// `sectors_per_cluster * bytes_per_sector`.
    pub cluster_size: u32,
    /// Absolute byte offset of the first FAT.
    pub fat_table_offset: u64,
    /// Absolute byte offset of the root directory.
    pub root_dir_offset: u64,
    /// Absolute byte offset of cluster 2.
    pub data_region_offset: u64,
    /// Root directory capacity in entries.
    pub root_entry_count: u16,
}

impl VolumeLayout {
    /// Derive the layout of a partition starting at `partition_start`.
    #[must_use]
    pub fn new(partition_start: u32, bpb: &BootSector) -> Self {
        let bps = u64::from(bpb.bytes_per_sector);
        let fat_table_offset = u64::from(partition_start) * BLOCK_SIZE as u64
            + u64::from(bpb.reserved_sectors) * bps;
        let root_dir_offset =
            fat_table_offset + bps * u64::from(bpb.sectors_per_fat) * u64::from(bpb.num_fats);
        let data_region_offset =
            root_dir_offset + u64::from(bpb.root_entry_count) * DIR_ENTRY_SIZE;
        Self {
            bytes_per_sector: bpb.bytes_per_sector,
            sectors_per_cluster: bpb.sectors_per_cluster,
            cluster_size: u32::from(bpb.sectors_per_cluster) * u32::from(bpb.bytes_per_sector),
            fat_table_offset,
            root_dir_offset,
            data_region_offset,
            root_entry_count: bpb.root_entry_count,
        }
    }

    /// Absolute byte offset of `cluster` in the data region.
    ///
    /// Callers must have rejected clusters below 2.
    #[must_use]
    pub fn cluster_offset(&self, cluster: u16) -> u64 {
        self.data_region_offset
            + u64::from(cluster.saturating_sub(2)) * u64::from(self.cluster_size)
    }

    /// Absolute byte offset of `cluster`'s FAT entry.
    #[must_use]
    pub fn fat_entry_offset(&self, cluster: u16) -> u64 {
        self.fat_table_offset + u64::from(cluster) * 2
    }
}
