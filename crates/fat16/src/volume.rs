//! Mounted FAT16 volume.
//!
//! All reads go through a [`ByteWindow`]: directory scans pull up to one
//! block of records per device call, FAT lookups read the two bytes of one
//! entry, file reads copy at most to the end of the current cluster per
//! step. There is no directory or chain cache; every lookup rescans and
//! every seek walks the chain from the first cluster.

use core::ops::ControlFlow;

use platform::{BlockDevice, ByteWindow, BLOCK_SIZE};

use crate::boot_sector::{BootSector, VolumeLayout};
use crate::dir::{DirectoryEntry, ShortName, ENTRY_SIZE};
use crate::error::Fat16Error;
use crate::file::{FileCursor, SeekFrom};
use crate::mbr::{self, PartitionDescriptor};

/// Decoded FAT16 table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatEntry {
    /// `0x0000`: unallocated.
    Free,
    /// Next cluster in the chain.
    Next(u16),
    /// `0xFFF7`: bad cluster.
    Bad,
    /// `0xFFF8..=0xFFFF`: last cluster of the chain.
    EndOfChain,
}

impl FatEntry {
    /// Decode a raw table value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x0000 => Self::Free,
            0xFFF7 => Self::Bad,
            0xFFF8..=0xFFFF => Self::EndOfChain,
            next => Self::Next(next),
        }
    }
}

/// A mounted read-only FAT16 volume.
pub struct Fat16Volume<D> {
    window: ByteWindow<D>,
    partition: PartitionDescriptor,
    layout: VolumeLayout,
}

impl<D: BlockDevice> Fat16Volume<D> {
    /// Locate the first FAT16 partition on `device` and derive its layout.
    pub fn mount(device: D) -> Result<Self, Fat16Error<D::Error>> {
        let mut window = ByteWindow::new(device);
        let mut sector = [0u8; BLOCK_SIZE];

        window
            .read_exact_at(0, &mut sector)
            .map_err(Fat16Error::Device)?;
        let partition = mbr::find_fat16_partition(&sector).ok_or(Fat16Error::NoFat16Partition)?;

        window
            .read_exact_at(u64::from(partition.start_sector) * BLOCK_SIZE as u64, &mut sector)
            .map_err(Fat16Error::Device)?;
        let bpb = BootSector::parse(&sector).ok_or(Fat16Error::InvalidBootSector)?;
        let layout = VolumeLayout::new(partition.start_sector, &bpb);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "fat16: type {=u8:#x} at sector {=u32}, cluster {=u32} B, {=u16} root entries",
            partition.kind,
            partition.start_sector,
            layout.cluster_size,
            layout.root_entry_count
        );
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "fat16: fat @ {=u64}, root @ {=u64}, data @ {=u64}",
            layout.fat_table_offset,
            layout.root_dir_offset,
            layout.data_region_offset
        );

        Ok(Self {
            window,
            partition,
            layout,
        })
    }

    /// Region offsets fixed at mount.
    pub fn layout(&self) -> &VolumeLayout {
        &self.layout
    }

    /// The partition that was mounted.
    pub fn partition(&self) -> &PartitionDescriptor {
        &self.partition
    }

    /// Borrow the block device.
    pub fn device(&mut self) -> &mut D {
        self.window.device()
    }

    /// Unmount and give the device back.
    pub fn into_inner(self) -> D {
        self.window.into_inner()
    }

    // ── Directory ───────────────────────────────────────────────────────────

    /// Collect up to `max` (and at most `M`) regular root entries whose
    /// extension is `ext`, in directory order.
    pub fn list_by_extension<const M: usize>(
        &mut self,
        ext: &[u8; 3],
        max: usize,
    ) -> Result<heapless::Vec<DirectoryEntry, M>, Fat16Error<D::Error>> {
        let limit = max.min(M);
        let mut found = heapless::Vec::new();
        if limit == 0 {
            return Ok(found);
        }
        self.scan(|entry| {
            if entry.is_regular_with_extension(ext) && found.push(*entry).is_err() {
                return ControlFlow::Break(());
            }
            if found.len() >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(found)
    }

    /// Find the regular root entry named exactly `name`.
    pub fn find(&mut self, name: &ShortName) -> Result<DirectoryEntry, Fat16Error<D::Error>> {
        let mut hit = None;
        self.scan(|entry| {
            if entry.kind == crate::EntryKind::Regular && entry.name == *name {
                hit = Some(*entry);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        hit.ok_or(Fat16Error::NotFound)
    }

    /// Open the regular root entry named exactly `name`.
    pub fn open_by_name(&mut self, name: &ShortName) -> Result<FileCursor, Fat16Error<D::Error>> {
        let entry = self.find(name)?;
        self.open(&entry)
    }

    /// Cursor at byte 0 of an already located entry.
    pub fn open(&self, entry: &DirectoryEntry) -> Result<FileCursor, Fat16Error<D::Error>> {
        if entry.size > 0 && entry.start_cluster < 2 {
            return Err(Fat16Error::InvalidCluster(entry.start_cluster));
        }
        Ok(FileCursor::new(
            entry.start_cluster,
            entry.size,
            self.layout.cluster_size,
        ))
    }

    /// Visit every root directory record in order until `visit` breaks.
    fn scan(
        &mut self,
        mut visit: impl FnMut(&DirectoryEntry) -> ControlFlow<()>,
    ) -> Result<(), Fat16Error<D::Error>> {
        const PER_BLOCK: usize = BLOCK_SIZE / ENTRY_SIZE;
        let total = usize::from(self.layout.root_entry_count);
        let mut chunk = [0u8; BLOCK_SIZE];
        let mut index = 0;

        while index < total {
            let count = PER_BLOCK.min(total - index);
            let Some(bytes) = chunk.get_mut(..count * ENTRY_SIZE) else {
                break;
            };
            let offset = self.layout.root_dir_offset + (index * ENTRY_SIZE) as u64;
            self.window
                .read_exact_at(offset, bytes)
                .map_err(Fat16Error::Device)?;

            for raw in bytes.chunks_exact(ENTRY_SIZE) {
                let Ok(raw) = <&[u8; ENTRY_SIZE]>::try_from(raw) else {
                    continue;
                };
                if visit(&DirectoryEntry::parse(raw)).is_break() {
                    return Ok(());
                }
            }
            index += count;
        }
        Ok(())
    }

    // ── FAT ─────────────────────────────────────────────────────────────────

    /// Table entry for `cluster`.
    pub fn fat_entry(&mut self, cluster: u16) -> Result<FatEntry, Fat16Error<D::Error>> {
        let mut raw = [0u8; 2];
        self.window
            .read_exact_at(self.layout.fat_entry_offset(cluster), &mut raw)
            .map_err(Fat16Error::Device)?;
        Ok(FatEntry::from_raw(u16::from_le_bytes(raw)))
    }

    /// The cluster after `cluster`, which must exist.
    fn follow(&mut self, cluster: u16) -> Result<u16, Fat16Error<D::Error>> {
        if cluster < 2 {
            return Err(Fat16Error::InvalidCluster(cluster));
        }
        match self.fat_entry(cluster)? {
            FatEntry::Next(next) if next >= 2 => {
                #[cfg(feature = "defmt")]
                defmt::trace!("fat16: cluster {=u16} -> {=u16}", cluster, next);
                Ok(next)
            }
            FatEntry::Next(next) => Err(Fat16Error::InvalidCluster(next)),
            FatEntry::Free | FatEntry::Bad | FatEntry::EndOfChain => {
                #[cfg(feature = "defmt")]
                defmt::warn!("fat16: chain ends early after cluster {=u16}", cluster);
                Err(Fat16Error::BrokenChain(cluster))
            }
        }
    }

    // ── File I/O ────────────────────────────────────────────────────────────

    /// Copy the next bytes of the file into `buf`.
    ///
    /// Returns the number of bytes copied. Anything short of `buf.len()`
    /// means the file is exhausted; that is the only end-of-file signal.
    pub fn read(
        &mut self,
        cursor: &mut FileCursor,
        buf: &mut [u8],
    ) -> Result<usize, Fat16Error<D::Error>> {
        let mut done = 0;
        while done < buf.len() {
            let file_left = cursor.bytes_remaining();
            if file_left == 0 {
                break;
            }
            if cursor.current_cluster < 2 {
                return Err(Fat16Error::InvalidCluster(cursor.current_cluster));
            }
            let wanted = u32::try_from(buf.len() - done).unwrap_or(u32::MAX);
            let step = wanted.min(file_left).min(cursor.left_in_cluster());
            let Some(dst) = buf.get_mut(done..done + step as usize) else {
                break;
            };

            let at = self.layout.cluster_offset(cursor.current_cluster)
                + u64::from(cursor.offset_in_cluster);
            self.window
                .read_exact_at(at, dst)
                .map_err(Fat16Error::Device)?;
            done += step as usize;

            if cursor.advance_within_cluster(step) && cursor.bytes_remaining() > 0 {
                cursor.current_cluster = self.follow(cursor.current_cluster)?;
            }
        }
        Ok(done)
    }

    /// Reposition `cursor`; targets outside the file clamp to `0..=size`.
    ///
    /// Walks the chain from the first cluster, so the cost is linear in the
    /// target's cluster index. On error the cursor is left unchanged.
    /// Returns the new absolute position.
    pub fn seek(
        &mut self,
        cursor: &mut FileCursor,
        pos: SeekFrom,
    ) -> Result<u32, Fat16Error<D::Error>> {
        let target = match pos {
            SeekFrom::Start(n) => n.min(cursor.size),
            SeekFrom::Current(delta) => {
                let t = i64::from(cursor.bytes_consumed()).saturating_add(delta);
                u32::try_from(t.clamp(0, i64::from(cursor.size))).unwrap_or(cursor.size)
            }
        };
        let clusters = target / cursor.cluster_size;
        let offset = target % cursor.cluster_size;
        // A target at end of file on a cluster boundary sits past the last
        // cluster, which has no successor.
        let links = if offset == 0 && clusters > 0 && target == cursor.size {
            clusters - 1
        } else {
            clusters
        };

        let mut cluster = cursor.start_cluster;
        for _ in 0..links {
            cluster = self.follow(cluster)?;
        }

        cursor.current_cluster = cluster;
        cursor.clusters_advanced = clusters;
        cursor.offset_in_cluster = offset;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fat_entry_sentinels() {
        assert_eq!(FatEntry::from_raw(0), FatEntry::Free);
        assert_eq!(FatEntry::from_raw(0xFFF7), FatEntry::Bad);
        assert_eq!(FatEntry::from_raw(0xFFF8), FatEntry::EndOfChain);
        assert_eq!(FatEntry::from_raw(0xFFFF), FatEntry::EndOfChain);
        assert_eq!(FatEntry::from_raw(3), FatEntry::Next(3));
    }
}
