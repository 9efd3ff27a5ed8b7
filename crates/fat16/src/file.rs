//! Open-file position.

/// Seek origin for [`crate::Fat16Volume::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekFrom {
    /// Absolute byte position from the start of the file.
    Start(u32),
    /// Signed displacement from the current position.
    Current(i64),
}

/// Position inside one file's cluster chain.
///
/// Invariants: `offset_in_cluster < cluster_size` and
/// `bytes_consumed() <= size`. When the file ends exactly on a cluster
/// boundary the offset rolls to 0 and `clusters_advanced` counts the
/// finished cluster, but the chain is not followed, so `current_cluster`
/// still names the last cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FileCursor {
    pub(crate) start_cluster: u16,
    pub(crate) current_cluster: u16,
    pub(crate) clusters_advanced: u32,
    pub(crate) offset_in_cluster: u32,
    pub(crate) size: u32,
    pub(crate) cluster_size: u32,
}

impl FileCursor {
    pub(crate) fn new(start_cluster: u16, size: u32, cluster_size: u32) -> Self {
        Self {
            start_cluster,
            current_cluster: start_cluster,
            clusters_advanced: 0,
            offset_in_cluster: 0,
            size,
            cluster_size,
        }
    }

    /// Back to byte 0 without touching the device.
    pub fn rewind(&mut self) {
        self.current_cluster = self.start_cluster;
        self.clusters_advanced = 0;
        self.offset_in_cluster = 0;
    }

    /// Bytes already read or skipped.
    pub fn bytes_consumed(&self) -> u32 {
        // Bounded by `size` by construction.
        #[allow(clippy::cast_possible_truncation)]
        let consumed = (u64::from(self.clusters_advanced) * u64::from(self.cluster_size)
            + u64::from(self.offset_in_cluster)) as u32;
        consumed
    }

    /// Bytes left before end of file.
    pub fn bytes_remaining(&self) -> u32 {
        self.size.saturating_sub(self.bytes_consumed())
    }

    /// File length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// First cluster of the chain.
    pub fn start_cluster(&self) -> u16 {
        self.start_cluster
    }

    /// Cluster holding the next byte to read.
    pub fn current_cluster(&self) -> u16 {
        self.current_cluster
    }

    /// Whole clusters passed since the start of the file.
    pub fn clusters_advanced(&self) -> u32 {
        self.clusters_advanced
    }

    /// Byte position inside the current cluster.
    pub fn offset_in_cluster(&self) -> u32 {
        self.offset_in_cluster
    }

    /// Move forward `n` bytes within the current cluster, rolling over to
    /// the next cluster index when the cluster is used up. Returns `true`
    /// on rollover.
    pub(crate) fn advance_within_cluster(&mut self, n: u32) -> bool {
        self.offset_in_cluster += n;
        if self.offset_in_cluster >= self.cluster_size {
            self.offset_in_cluster = 0;
            self.clusters_advanced += 1;
            true
        } else {
            false
        }
    }

    /// Bytes readable from the current cluster before crossing into the next.
    pub(crate) fn left_in_cluster(&self) -> u32 {
        self.cluster_size - self.offset_in_cluster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumed_and_remaining_track_position() {
        let mut c = FileCursor::new(5, 5000, 2048);
        assert!(!c.advance_within_cluster(1000));
        assert_eq!(c.bytes_consumed(), 1000);
        assert!(c.advance_within_cluster(1048));
        assert_eq!((c.clusters_advanced(), c.offset_in_cluster()), (1, 0));
        assert_eq!(c.bytes_remaining(), 5000 - 2048);
    }

    #[test]
    fn rewind_returns_to_start() {
        let mut c = FileCursor::new(9, 4096, 2048);
        c.advance_within_cluster(2048);
        c.current_cluster = 10;
        c.rewind();
        assert_eq!(c, FileCursor::new(9, 4096, 2048));
    }
}
