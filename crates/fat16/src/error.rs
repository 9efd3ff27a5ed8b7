//! Filesystem error type.

use thiserror_no_std::Error;

/// Error from [`crate::Fat16Volume`] operations, generic over the block
/// device's error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fat16Error<E: core::fmt::Debug> {
    /// The underlying block device failed.
    #[error("block device error: {0:?}")]
    Device(E),
    /// None of the four MBR entries carries a FAT16 type code (4, 6, 14).
    #[error("no FAT16 partition in the MBR")]
    NoFat16Partition,
    /// Boot sector signature missing or geometry fields zero.
    #[error("invalid FAT16 boot sector")]
    InvalidBootSector,
    /// A read needed the cluster after this one but the FAT marks it free,
    /// bad or end-of-chain.
    #[error("cluster chain broken after cluster {0}")]
    BrokenChain(u16),
    /// A cluster number below 2 was about to be dereferenced.
    #[error("invalid cluster number {0}")]
    InvalidCluster(u16),
    /// No regular root directory entry with the requested 8.3 name.
    #[error("file not found")]
    NotFound,
}
