//! Block storage abstraction
//!
//! Everything above the card driver reads storage through [`BlockDevice`]:
//! fixed 512-byte blocks addressed by [`BlockIdx`]. Filesystem code that needs
//! byte-granular access (an MBR entry, a 32-byte directory record, a 2-byte
//! FAT link) goes through [`ByteWindow`], which bridges arbitrary offsets onto
//! whole-block reads using a two-block scratch area.

/// Size of one block (sector) in bytes: the atomic I/O granularity.
pub const BLOCK_SIZE: usize = 512;

/// Number of blocks held by the [`ByteWindow`] scratch area.
pub const SCRATCH_BLOCKS: usize = 2;

/// Largest span a single [`ByteWindow::read_bytes`] call will copy.
pub const MAX_WINDOW_READ: usize = (SCRATCH_BLOCKS - 1) * BLOCK_SIZE;

/// One 512-byte block.
pub type Block = [u8; BLOCK_SIZE];

/// Sector index on the device (block address, not byte address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockIdx(pub u32);

impl BlockIdx {
    /// Index of the block containing byte `offset`.
    ///
    /// Returns `None` when the offset lies beyond the 32-bit block space.
    pub fn containing(offset: u64) -> Option<Self> {
        u32::try_from(offset / BLOCK_SIZE as u64).ok().map(Self)
    }

    /// The block immediately after this one.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

/// Sector-level storage device.
///
/// Reads are synchronous: the only caller is the cooperative main loop, and
/// the buffer engine performs refills with interrupts masked, so the driver
/// must never yield.
pub trait BlockDevice {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read one block.
    fn read_block(&mut self, index: BlockIdx, block: &mut Block) -> Result<(), Self::Error>;

    /// Read `blocks.len()` consecutive blocks starting at `start`.
    fn read_blocks(&mut self, start: BlockIdx, blocks: &mut [Block]) -> Result<(), Self::Error>;
}

impl<T: BlockDevice + ?Sized> BlockDevice for &mut T {
    type Error = T::Error;

    fn read_block(&mut self, index: BlockIdx, block: &mut Block) -> Result<(), Self::Error> {
        (**self).read_block(index, block)
    }

    fn read_blocks(&mut self, start: BlockIdx, blocks: &mut [Block]) -> Result<(), Self::Error> {
        (**self).read_blocks(start, blocks)
    }
}

/// Byte-addressed reader over a [`BlockDevice`].
///
/// Owns the device plus a two-block scratch window. A read that fits inside
/// one block costs one single-block read; a read that crosses into the next
/// block costs one two-block multi-read.
pub struct ByteWindow<D> {
    device: D,
    scratch: [Block; SCRATCH_BLOCKS],
}

impl<D: BlockDevice> ByteWindow<D> {
    /// Wrap `device`.
    pub fn new(device: D) -> Self {
        Self {
            device,
            scratch: [[0; BLOCK_SIZE]; SCRATCH_BLOCKS],
        }
    }

    /// Copy bytes starting at absolute byte `offset` into `buf`.
    ///
    /// At most [`MAX_WINDOW_READ`] bytes are copied per call; the return
    /// value is the number of bytes actually written to `buf`. Callers that
    /// need more loop on the returned count.
    pub fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, D::Error> {
        let size = buf.len().min(MAX_WINDOW_READ);
        if size == 0 {
            return Ok(0);
        }
        let Some(first) = BlockIdx::containing(offset) else {
            return Ok(0);
        };
        // Bounded by BLOCK_SIZE, so the cast is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let within = (offset % BLOCK_SIZE as u64) as usize;
        let end = within + size;

        if end <= BLOCK_SIZE {
            let [head, _] = &mut self.scratch;
            self.device.read_block(first, head)?;
        } else {
            self.device.read_blocks(first, &mut self.scratch)?;
        }

        let [head, tail] = &self.scratch;
        let from_head = end.min(BLOCK_SIZE) - within;
        if let (Some(dst), Some(src)) = (buf.get_mut(..from_head), head.get(within..within + from_head)) {
            dst.copy_from_slice(src);
        }
        if let (Some(dst), Some(src)) = (buf.get_mut(from_head..size), tail.get(..size - from_head)) {
            dst.copy_from_slice(src);
        }
        Ok(size)
    }

    /// Read exactly `buf.len()` bytes, looping over the window cap.
    ///
    /// Returns the number of bytes copied, which is always `buf.len()` unless
    /// the offset runs past the 32-bit block space.
    pub fn read_exact_at(&mut self, mut offset: u64, buf: &mut [u8]) -> Result<usize, D::Error> {
        let mut done = 0;
        while let Some(rest) = buf.get_mut(done..) {
            if rest.is_empty() {
                break;
            }
            let n = self.read_bytes(offset, rest)?;
            if n == 0 {
                break;
            }
            done += n;
            offset += n as u64;
        }
        Ok(done)
    }

    /// Borrow the underlying device.
    pub fn device(&mut self) -> &mut D {
        &mut self.device
    }

    /// Give the device back.
    pub fn into_inner(self) -> D {
        self.device
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mocks::MemoryBlockDevice;

    fn patterned(blocks: usize) -> MemoryBlockDevice {
        let image: Vec<u8> = (0..blocks * BLOCK_SIZE).map(|i| (i % 251) as u8).collect();
        MemoryBlockDevice::from_image(image)
    }

    #[test]
    fn read_within_one_block_uses_single_read() {
        let mut window = ByteWindow::new(patterned(4));
        let mut buf = [0u8; 32];
        assert_eq!(window.read_bytes(520, &mut buf).unwrap(), 32);
        assert_eq!(buf[0], (520 % 251) as u8);
        assert_eq!(window.device().single_reads(), 1);
        assert_eq!(window.device().multi_reads(), 0);
    }

    #[test]
    fn straddling_read_uses_one_multi_read() {
        let mut window = ByteWindow::new(patterned(4));
        let mut buf = [0u8; 16];
        assert_eq!(window.read_bytes(1020, &mut buf).unwrap(), 16);
        let expected: Vec<u8> = (1020..1036).map(|i| (i % 251) as u8).collect();
        assert_eq!(&buf[..], &expected[..]);
        assert_eq!(window.device().multi_reads(), 1);
    }

    #[test]
    fn oversize_request_is_capped_to_one_block() {
        let mut window = ByteWindow::new(patterned(4));
        let mut buf = [0u8; 700];
        assert_eq!(window.read_bytes(100, &mut buf).unwrap(), MAX_WINDOW_READ);
    }

    #[test]
    fn read_exact_loops_past_the_cap() {
        let mut window = ByteWindow::new(patterned(4));
        let mut buf = [0u8; 1300];
        assert_eq!(window.read_exact_at(3, &mut buf).unwrap(), 1300);
        assert_eq!(buf[1299], ((3 + 1299) % 251) as u8);
    }

    proptest::proptest! {
        /// A read crossing block k → k+1 equals the two blocks concatenated
        /// and sliced at `offset % BLOCK_SIZE`.
        #[test]
        fn straddling_read_matches_concatenated_blocks(
            k in 0u32..3,
            within in 1usize..BLOCK_SIZE,
            extra in 1usize..BLOCK_SIZE,
        ) {
            let len = (BLOCK_SIZE - within + extra).min(MAX_WINDOW_READ);
            let mut dev = patterned(4);
            let mut joined = vec![0u8; 2 * BLOCK_SIZE];
            let (a, b) = joined.split_at_mut(BLOCK_SIZE);
            dev.read_block(BlockIdx(k), a.try_into().unwrap()).unwrap();
            dev.read_block(BlockIdx(k + 1), b.try_into().unwrap()).unwrap();

            let mut window = ByteWindow::new(dev);
            let offset = u64::from(k) * BLOCK_SIZE as u64 + within as u64;
            let mut buf = vec![0u8; len];
            proptest::prop_assert_eq!(window.read_bytes(offset, &mut buf).unwrap(), len);
            proptest::prop_assert_eq!(&buf[..], &joined[within..within + len]);
        }
    }

    #[test]
    fn empty_request_touches_nothing() {
        let mut window = ByteWindow::new(patterned(1));
        assert_eq!(window.read_bytes(0, &mut []).unwrap(), 0);
        assert_eq!(window.device().single_reads(), 0);
    }
}
