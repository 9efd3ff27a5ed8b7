//! Synthetic FAT16 disk images for host tests.
//!
//! Produces an MBR-partitioned image with one FAT16 partition, two FAT
//! copies and a root directory, with files laid out on explicit or
//! sequential cluster chains.

#![cfg(any(test, feature = "std"))]

use std::vec::Vec;

use platform::BLOCK_SIZE;

use crate::dir::ENTRY_SIZE;
use crate::mbr::PARTITION_TABLE_OFFSET;

const RESERVED_SECTORS: u16 = 1;
const NUM_FATS: u8 = 2;

struct PendingFile {
    record: [u8; ENTRY_SIZE],
    data: Vec<u8>,
    clusters: Vec<u16>,
}

/// Builder for a one-partition FAT16 image.
pub struct ImageBuilder {
    partition_start: u32,
    partition_type: u8,
    sectors_per_cluster: u8,
    root_entries: u16,
    data_clusters: u16,
    next_free: u16,
    files: Vec<PendingFile>,
}

#[allow(clippy::indexing_slicing)]
impl ImageBuilder {
    /// 1-sector clusters, 32 root entries, 64 data clusters, partition at
    /// sector 8 with type 0x06.
    pub fn new() -> Self {
        Self {
            partition_start: 8,
            partition_type: 0x06,
            sectors_per_cluster: 1,
            root_entries: 32,
            data_clusters: 64,
            next_free: 2,
            files: Vec::new(),
        }
    }

    /// Sectors per cluster.
    #[must_use]
    pub fn sectors_per_cluster(mut self, spc: u8) -> Self {
        self.sectors_per_cluster = spc;
        self
    }

    /// Root directory capacity.
    #[must_use]
    pub fn root_entries(mut self, entries: u16) -> Self {
        self.root_entries = entries;
        self
    }

    /// Number of clusters in the data region.
    #[must_use]
    pub fn data_clusters(mut self, clusters: u16) -> Self {
        self.data_clusters = clusters;
        self
    }

    /// MBR type code of the partition.
    #[must_use]
    pub fn partition_type(mut self, kind: u8) -> Self {
        self.partition_type = kind;
        self
    }

    /// Partition start sector.
    #[must_use]
    pub fn partition_start(mut self, sector: u32) -> Self {
        self.partition_start = sector;
        self
    }

    /// Bytes per cluster.
    pub fn cluster_size(&self) -> usize {
        usize::from(self.sectors_per_cluster) * BLOCK_SIZE
    }

    /// Add a file on the next free clusters in ascending order.
    /// Returns the clusters used.
    pub fn file(&mut self, name: &[u8; 11], data: &[u8]) -> Vec<u16> {
        let needed = data.len().div_ceil(self.cluster_size()).max(1);
        let clusters: Vec<u16> = (0..needed)
            .map(|i| self.next_free + u16::try_from(i).unwrap_or(u16::MAX))
            .collect();
        self.next_free += u16::try_from(needed).unwrap_or(u16::MAX);
        self.file_on(name, data, &clusters);
        clusters
    }

    /// Add a file on an explicit cluster chain.
    pub fn file_on(&mut self, name: &[u8; 11], data: &[u8], clusters: &[u16]) {
        let mut record = [0u8; ENTRY_SIZE];
        record[..11].copy_from_slice(name);
        record[11] = 0x20;
        let start = if data.is_empty() { 0 } else { clusters[0] };
        record[26..28].copy_from_slice(&start.to_le_bytes());
        record[28..32].copy_from_slice(&u32::try_from(data.len()).unwrap_or(u32::MAX).to_le_bytes());
        self.files.push(PendingFile {
            record,
            data: data.to_vec(),
            clusters: if data.is_empty() { Vec::new() } else { clusters.to_vec() },
        });
    }

    /// Add a raw directory record with no data.
    pub fn raw_entry(&mut self, record: [u8; ENTRY_SIZE]) {
        self.files.push(PendingFile {
            record,
            data: Vec::new(),
            clusters: Vec::new(),
        });
    }

    /// Sectors occupied by one FAT.
    fn sectors_per_fat(&self) -> u16 {
        let entries = usize::from(self.data_clusters) + 2;
        u16::try_from((entries * 2).div_ceil(BLOCK_SIZE)).unwrap_or(u16::MAX)
    }

    /// Absolute byte offset of the first FAT.
    pub fn fat_offset(&self) -> usize {
        (self.partition_start as usize + usize::from(RESERVED_SECTORS)) * BLOCK_SIZE
    }

    /// Absolute byte offset of the root directory.
    pub fn root_offset(&self) -> usize {
        self.fat_offset() + usize::from(self.sectors_per_fat()) * usize::from(NUM_FATS) * BLOCK_SIZE
    }

    /// Absolute byte offset of cluster 2.
    pub fn data_offset(&self) -> usize {
        self.root_offset() + usize::from(self.root_entries) * ENTRY_SIZE
    }

    /// Render the image.
    pub fn build(&self) -> Vec<u8> {
        let cs = self.cluster_size();
        let total = self.data_offset() + usize::from(self.data_clusters) * cs;
        let mut img = std::vec![0u8; total.next_multiple_of(BLOCK_SIZE)];

        // MBR
        let entry = PARTITION_TABLE_OFFSET;
        img[entry + 4] = self.partition_type;
        img[entry + 8..entry + 12].copy_from_slice(&self.partition_start.to_le_bytes());
        let part_sectors = u32::try_from(total / BLOCK_SIZE).unwrap_or(u32::MAX) - self.partition_start;
        img[entry + 12..entry + 16].copy_from_slice(&part_sectors.to_le_bytes());
        img[510] = 0x55;
        img[511] = 0xAA;

        // Boot sector
        let bs = self.partition_start as usize * BLOCK_SIZE;
        img[bs + 11..bs + 13].copy_from_slice(&512u16.to_le_bytes());
        img[bs + 13] = self.sectors_per_cluster;
        img[bs + 14..bs + 16].copy_from_slice(&RESERVED_SECTORS.to_le_bytes());
        img[bs + 16] = NUM_FATS;
        img[bs + 17..bs + 19].copy_from_slice(&self.root_entries.to_le_bytes());
        img[bs + 22..bs + 24].copy_from_slice(&self.sectors_per_fat().to_le_bytes());
        img[bs + 32..bs + 36].copy_from_slice(&part_sectors.to_le_bytes());
        img[bs + 510] = 0x55;
        img[bs + 511] = 0xAA;

        // FATs
        let fat_bytes = usize::from(self.sectors_per_fat()) * BLOCK_SIZE;
        let set = |img: &mut [u8], cluster: u16, value: u16| {
            for copy in 0..usize::from(NUM_FATS) {
                let at = self.fat_offset() + copy * fat_bytes + usize::from(cluster) * 2;
                img[at..at + 2].copy_from_slice(&value.to_le_bytes());
            }
        };
        set(&mut img, 0, 0xFFF8);
        set(&mut img, 1, 0xFFFF);

        for (slot, file) in self.files.iter().enumerate() {
            let at = self.root_offset() + slot * ENTRY_SIZE;
            img[at..at + ENTRY_SIZE].copy_from_slice(&file.record);

            for (i, &cluster) in file.clusters.iter().enumerate() {
                let next = file.clusters.get(i + 1).copied().unwrap_or(0xFFFF);
                set(&mut img, cluster, next);
                let chunk = file.data.chunks(cs).nth(i).unwrap_or(&[]);
                let dst = self.data_offset() + usize::from(cluster - 2) * cs;
                img[dst..dst + chunk.len()].copy_from_slice(chunk);
            }
        }
        img
    }
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `len` bytes of a repeating, position-dependent pattern.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| {
            #[allow(clippy::cast_possible_truncation)]
            let b = (i % 251) as u8;
            b.wrapping_add(seed)
        })
        .collect()
}
