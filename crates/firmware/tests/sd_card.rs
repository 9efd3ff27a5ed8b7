//! SD driver integration tests: the real command framing against the
//! scripted card in `firmware::sd::sim`.
// Integration test file: unwrap/indexing are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
)]

use fat16::image::pattern;
use firmware::sd::command::{
    APP_CMD, GO_IDLE_STATE, READ_MULTIPLE_BLOCK, READ_OCR, READ_SINGLE_BLOCK, SD_SEND_OP_COND,
    SEND_IF_COND, SET_BLOCKLEN, STOP_TRANSMISSION,
};
use firmware::sd::sim::{SimChipSelect, SimKind, SimulatedCard, DATA_ERROR_TOKEN};
use firmware::{CardType, SdCard, SdError};
use platform::config::{SD_INIT_HZ, SD_OPERATING_HZ};
use platform::{Block, BlockDevice, BlockIdx, ByteWindow, BLOCK_SIZE};

type Card = SdCard<SimulatedCard, SimChipSelect>;

fn card(sim: SimulatedCard) -> Card {
    let cs = sim.chip_select();
    SdCard::new(sim, cs)
}

fn image() -> Vec<u8> {
    pattern(16 * BLOCK_SIZE, 9)
}

fn ready(kind: SimKind) -> Card {
    let mut c = card(SimulatedCard::new(kind, image()));
    c.initialize().unwrap();
    c
}

// ── Bring-up ─────────────────────────────────────────────────────────────────

#[test]
fn version1_card_is_byte_addressed_and_gets_set_blocklen() {
    let mut c = card(SimulatedCard::new(SimKind::V1, image()));
    assert_eq!(c.initialize().unwrap(), CardType::Sd1);

    let (sim, cs) = c.into_inner();
    let order: Vec<u8> = sim.commands().iter().map(|(i, _)| *i).collect();
    assert_eq!(
        order,
        [GO_IDLE_STATE, SEND_IF_COND, APP_CMD, SD_SEND_OP_COND, SET_BLOCKLEN]
    );
    assert_eq!(sim.commands()[3].1, 0, "no HCS for a version 1 card");
    assert_eq!(sim.commands()[4].1, BLOCK_SIZE as u32);
    assert!(!cs.is_selected());
}

#[test]
fn version2_standard_capacity_reads_ocr_and_sets_blocklen() {
    let mut c = card(SimulatedCard::new(SimKind::V2, image()));
    assert_eq!(c.initialize().unwrap(), CardType::Sd2);

    let (sim, _) = c.into_inner();
    assert_eq!(sim.count(READ_OCR), 1);
    assert_eq!(sim.count(SET_BLOCKLEN), 1);
    let acmd41 = sim.commands().iter().find(|(i, _)| *i == SD_SEND_OP_COND).unwrap();
    assert_eq!(acmd41.1, 1 << 30);
}

#[test]
fn sdhc_card_skips_set_blocklen() {
    let mut c = card(SimulatedCard::new(SimKind::Sdhc, image()));
    assert_eq!(c.initialize().unwrap(), CardType::Sdhc);
    assert_eq!(c.card_type(), Some(CardType::Sdhc));
    assert_eq!(c.into_inner().0.count(SET_BLOCKLEN), 0);
}

#[test]
fn clock_moves_from_bring_up_to_operating_rate() {
    let c = ready(SimKind::Sdhc);
    assert_eq!(c.into_inner().0.frequencies(), [SD_INIT_HZ, SD_OPERATING_HZ]);
}

#[test]
fn busy_card_is_polled_until_ready() {
    let mut c = card(SimulatedCard::new(SimKind::V2, image()).with_busy_polls(5));
    c.initialize().unwrap();
    let (sim, _) = c.into_inner();
    assert_eq!(sim.count(SD_SEND_OP_COND), 6);
    assert_eq!(sim.count(APP_CMD), 6);
}

#[test]
fn empty_slot_is_not_idle() {
    let mut c = card(SimulatedCard::new(SimKind::Absent, Vec::new()));
    assert_eq!(c.initialize(), Err(SdError::NotIdle(0xFF)));
    assert_eq!(c.card_type(), None);
    let (sim, cs) = c.into_inner();
    assert_eq!(sim.commands().len(), 1);
    assert!(!cs.is_selected());
}

#[test]
fn wrong_check_pattern_is_rejected() {
    let mut c = card(SimulatedCard::new(SimKind::Sdhc, image()).with_check_echo(0x5A));
    assert_eq!(c.initialize(), Err(SdError::CheckPatternMismatch(0x5A)));
}

#[test]
fn reads_before_initialize_fail() {
    let mut c = card(SimulatedCard::new(SimKind::Sdhc, image()));
    let mut block: Block = [0; BLOCK_SIZE];
    assert_eq!(
        c.read_block(BlockIdx(0), &mut block),
        Err(SdError::NotInitialized)
    );
}

// ── Reads ────────────────────────────────────────────────────────────────────

#[test]
fn single_block_reads_return_the_image() {
    let img = image();
    for kind in [SimKind::V1, SimKind::V2, SimKind::Sdhc] {
        let mut c = ready(kind);
        let mut block: Block = [0; BLOCK_SIZE];
        c.read_block(BlockIdx(3), &mut block).unwrap();
        assert_eq!(block[..], img[3 * BLOCK_SIZE..4 * BLOCK_SIZE], "{kind:?}");
    }
}

#[test]
fn byte_addressed_cards_get_byte_offsets() {
    let mut c = ready(SimKind::V2);
    let mut block: Block = [0; BLOCK_SIZE];
    c.read_block(BlockIdx(5), &mut block).unwrap();
    let (sim, _) = c.into_inner();
    let read = sim.commands().iter().find(|(i, _)| *i == READ_SINGLE_BLOCK).unwrap();
    assert_eq!(read.1, 5 * BLOCK_SIZE as u32);
}

#[test]
fn multi_block_read_matches_single_reads_and_stops() {
    let mut multi = [[0u8; BLOCK_SIZE]; 3];
    let mut c = ready(SimKind::Sdhc);
    c.read_blocks(BlockIdx(6), &mut multi).unwrap();

    let mut single = ready(SimKind::Sdhc);
    for (k, expected) in multi.iter().enumerate() {
        let mut block: Block = [0; BLOCK_SIZE];
        single.read_block(BlockIdx(6 + k as u32), &mut block).unwrap();
        assert_eq!(&block, expected, "block {k}");
    }

    let (sim, cs) = c.into_inner();
    assert_eq!(sim.count(READ_MULTIPLE_BLOCK), 1);
    assert_eq!(sim.count(STOP_TRANSMISSION), 1);
    assert!(!cs.is_selected());
}

#[test]
fn card_stays_usable_after_a_multi_block_read() {
    let img = image();
    let mut c = ready(SimKind::V1);
    let mut pair = [[0u8; BLOCK_SIZE]; 2];
    c.read_blocks(BlockIdx(1), &mut pair).unwrap();
    let mut block: Block = [0; BLOCK_SIZE];
    c.read_block(BlockIdx(9), &mut block).unwrap();
    assert_eq!(block[..], img[9 * BLOCK_SIZE..10 * BLOCK_SIZE]);
}

#[test]
fn data_error_mid_stream_still_stops_the_transfer() {
    let img = image();
    let mut c = card(SimulatedCard::new(SimKind::Sdhc, img.clone()).with_data_error_at(7));
    c.initialize().unwrap();

    let mut blocks = [[0u8; BLOCK_SIZE]; 4];
    assert_eq!(
        c.read_blocks(BlockIdx(6), &mut blocks),
        Err(SdError::DataError(DATA_ERROR_TOKEN))
    );
    assert_eq!(blocks[0][..], img[6 * BLOCK_SIZE..7 * BLOCK_SIZE]);

    // The card left streaming mode, so the next command gets a real answer.
    let mut block: Block = [0; BLOCK_SIZE];
    c.read_block(BlockIdx(2), &mut block).unwrap();
    assert_eq!(block[..], img[2 * BLOCK_SIZE..3 * BLOCK_SIZE]);

    let (sim, cs) = c.into_inner();
    assert_eq!(sim.count(STOP_TRANSMISSION), 1);
    assert!(!cs.is_selected());
}

#[test]
fn one_block_read_blocks_uses_the_single_command() {
    let mut c = ready(SimKind::Sdhc);
    let mut one = [[0u8; BLOCK_SIZE]; 1];
    c.read_blocks(BlockIdx(2), &mut one).unwrap();
    let (sim, _) = c.into_inner();
    assert_eq!(sim.count(READ_SINGLE_BLOCK), 1);
    assert_eq!(sim.count(READ_MULTIPLE_BLOCK), 0);
}

#[test]
fn late_acceptance_is_tolerated() {
    let img = image();
    let mut c = card(SimulatedCard::new(SimKind::Sdhc, img.clone()).with_accept_delay(12));
    c.initialize().unwrap();
    let mut block: Block = [0; BLOCK_SIZE];
    c.read_block(BlockIdx(4), &mut block).unwrap();
    assert_eq!(block[..], img[4 * BLOCK_SIZE..5 * BLOCK_SIZE]);
}

#[test]
fn byte_window_straddles_blocks_on_the_card() {
    let img = image();
    let mut window = ByteWindow::new(ready(SimKind::V2));
    let offset = 2 * BLOCK_SIZE as u64 - 7;
    let mut buf = [0u8; 20];
    assert_eq!(window.read_bytes(offset, &mut buf).unwrap(), 20);
    assert_eq!(buf[..], img[offset as usize..offset as usize + 20]);
}
