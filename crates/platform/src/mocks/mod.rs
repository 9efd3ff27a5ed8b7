//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use std::vec::Vec;

use crate::*;

/// Error raised by [`MemoryBlockDevice`] for reads past the end of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds(pub BlockIdx);

/// Block device backed by an in-memory disk image.
pub struct MemoryBlockDevice {
    image: Vec<u8>,
    single_reads: usize,
    multi_reads: usize,
}

impl MemoryBlockDevice {
    /// Wrap a disk image; it is zero-padded up to a whole number of blocks.
    pub fn from_image(mut image: Vec<u8>) -> Self {
        let rem = image.len() % BLOCK_SIZE;
        if rem != 0 {
            image.resize(image.len() + BLOCK_SIZE - rem, 0);
        }
        Self {
            image,
            single_reads: 0,
            multi_reads: 0,
        }
    }

    /// Blank image of `blocks` zeroed blocks.
    pub fn zeroed(blocks: usize) -> Self {
        Self::from_image(std::vec![0; blocks * BLOCK_SIZE])
    }

    /// Number of `read_block` calls served.
    pub fn single_reads(&self) -> usize {
        self.single_reads
    }

    /// Number of `read_blocks` calls served.
    pub fn multi_reads(&self) -> usize {
        self.multi_reads
    }

    fn copy_block(&self, index: BlockIdx, block: &mut Block) -> Result<(), OutOfBounds> {
        let start = index.0 as usize * BLOCK_SIZE;
        let src = self
            .image
            .get(start..start + BLOCK_SIZE)
            .ok_or(OutOfBounds(index))?;
        block.copy_from_slice(src);
        Ok(())
    }
}

impl BlockDevice for MemoryBlockDevice {
    type Error = OutOfBounds;

    fn read_block(&mut self, index: BlockIdx, block: &mut Block) -> Result<(), Self::Error> {
        self.single_reads += 1;
        self.copy_block(index, block)
    }

    fn read_blocks(&mut self, start: BlockIdx, blocks: &mut [Block]) -> Result<(), Self::Error> {
        self.multi_reads += 1;
        let mut index = start;
        for block in blocks.iter_mut() {
            self.copy_block(index, block)?;
            index = index.next().ok_or(OutOfBounds(index))?;
        }
        Ok(())
    }
}

/// Mock input device
pub struct MockInput {
    events: heapless::Deque<InputEvent, 16>,
}

impl MockInput {
    /// Create new mock input
    pub fn new() -> Self {
        Self {
            events: heapless::Deque::new(),
        }
    }

    /// Add event to queue
    pub fn add_event(&mut self, event: InputEvent) -> Result<(), InputEvent> {
        self.events.push_back(event)
    }
}

impl Default for MockInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDevice for MockInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

/// Mock audio codec: records every control write.
pub struct MockCodec {
    volume: HeadphoneVolume,
    muted: bool,
    mute_writes: usize,
    unmute_writes: usize,
    config: Option<AudioConfig>,
}

impl MockCodec {
    /// Create new mock codec
    pub fn new() -> Self {
        Self {
            volume: HeadphoneVolume::new(config::DEFAULT_VOLUME),
            muted: false,
            mute_writes: 0,
            unmute_writes: 0,
            config: None,
        }
    }

    /// Current volume
    pub fn volume(&self) -> HeadphoneVolume {
        self.volume
    }

    /// Whether the digital path is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Number of `set_mute(true)` calls
    pub fn mute_writes(&self) -> usize {
        self.mute_writes
    }

    /// Number of `set_mute(false)` calls
    pub fn unmute_writes(&self) -> usize {
        self.unmute_writes
    }

    /// Configuration passed to the last `init`
    pub fn config(&self) -> Option<AudioConfig> {
        self.config
    }
}

impl Default for MockCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCodec for MockCodec {
    type Error = core::convert::Infallible;

    async fn init(&mut self, config: AudioConfig) -> Result<(), Self::Error> {
        self.volume = config.volume;
        self.config = Some(config);
        Ok(())
    }

    async fn set_volume(&mut self, volume: HeadphoneVolume) -> Result<(), Self::Error> {
        self.volume = volume;
        Ok(())
    }

    async fn set_mute(&mut self, muted: bool) -> Result<(), Self::Error> {
        if muted {
            self.mute_writes += 1;
        } else {
            self.unmute_writes += 1;
        }
        self.muted = muted;
        Ok(())
    }
}

/// Mock hardware stream: only tracks whether it was armed.
#[derive(Default)]
pub struct MockStream {
    running: bool,
}

impl MockStream {
    /// Create an idle stream
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioStream for MockStream {
    type Error = core::convert::Infallible;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_device_reads_blocks() {
        let mut image = vec![0u8; 3 * BLOCK_SIZE];
        image[BLOCK_SIZE] = 0xAB;
        let mut dev = MemoryBlockDevice::from_image(image);
        let mut block = [0u8; BLOCK_SIZE];
        dev.read_block(BlockIdx(1), &mut block).unwrap();
        assert_eq!(block[0], 0xAB);
        assert_eq!(dev.read_block(BlockIdx(3), &mut block), Err(OutOfBounds(BlockIdx(3))));
    }

    #[test]
    fn test_memory_device_pads_partial_block() {
        let mut dev = MemoryBlockDevice::from_image(vec![1u8; 10]);
        let mut block = [0xFFu8; BLOCK_SIZE];
        dev.read_block(BlockIdx(0), &mut block).unwrap();
        assert_eq!(block[9], 1);
        assert_eq!(block[10], 0);
    }

    #[test]
    fn test_mock_input() {
        let mut input = MockInput::new();

        input.add_event(InputEvent::ShortPress(Button::Play)).unwrap();
        input.add_event(InputEvent::Hold(Button::VolumeUp)).unwrap();

        assert_eq!(input.poll_event(), Some(InputEvent::ShortPress(Button::Play)));
        assert_eq!(input.poll_event(), Some(InputEvent::Hold(Button::VolumeUp)));
        assert_eq!(input.poll_event(), None);
    }

    #[tokio::test]
    async fn test_mock_codec() {
        let mut codec = MockCodec::new();

        codec.init(AudioConfig::default()).await.unwrap();
        codec.set_volume(HeadphoneVolume::new(75)).await.unwrap();
        assert_eq!(codec.volume().get(), 75);

        codec.set_mute(true).await.unwrap();
        assert!(codec.is_muted());
        codec.set_mute(false).await.unwrap();
        assert!(!codec.is_muted());
        assert_eq!((codec.mute_writes(), codec.unmute_writes()), (1, 1));
    }
}
