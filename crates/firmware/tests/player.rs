//! Whole-pipeline tests: scripted SD card → FAT16 → buffer engine → SAI
//! pump, with the transport driven through the player's input queue.
// Integration test file: unwrap/indexing are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
)]

use fat16::image::{pattern, ImageBuilder};
use firmware::audio::{pump_once, SampleSink, StreamHandle, StreamSignal};
use firmware::sd::sim::{SimChipSelect, SimKind, SimulatedCard};
use firmware::{mount_library, Player, SdCard, TransportAction};
use platform::config::{DEFAULT_VOLUME, MAX_TRACKS, VOLUME_STEP};
use platform::mocks::{MockCodec, MockInput};
use platform::{Button, HeadphoneVolume, InputEvent};
use playback::{Direction, PlaybackBufferEngine, PollOutcome, StreamBuffers};

const N: usize = 512;

type Card = SdCard<SimulatedCard, SimChipSelect>;
type TestPlayer<'a> = Player<'a, Card, MockCodec, MockInput, N, MAX_TRACKS>;

#[derive(Default)]
struct Recorder {
    words: Vec<u16>,
}

impl SampleSink for Recorder {
    type Error = core::convert::Infallible;

    async fn write(&mut self, samples: &[u16]) -> Result<(), Self::Error> {
        self.words.extend_from_slice(samples);
        Ok(())
    }
}

fn wav(samples: &[u8]) -> Vec<u8> {
    let mut h = Vec::with_capacity(44 + samples.len());
    h.extend_from_slice(b"RIFF");
    h.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
    h.extend_from_slice(b"WAVEfmt ");
    h.extend_from_slice(&16u32.to_le_bytes());
    h.extend_from_slice(&1u16.to_le_bytes());
    h.extend_from_slice(&2u16.to_le_bytes());
    h.extend_from_slice(&44_100u32.to_le_bytes());
    h.extend_from_slice(&176_400u32.to_le_bytes());
    h.extend_from_slice(&4u16.to_le_bytes());
    h.extend_from_slice(&16u16.to_le_bytes());
    h.extend_from_slice(b"data");
    h.extend_from_slice(&(samples.len() as u32).to_le_bytes());
    h.extend_from_slice(samples);
    h
}

fn words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|p| u16::from_le_bytes([p[0], p[1]]))
        .collect()
}

fn player<'a>(buffers: &'a StreamBuffers<N>, files: &[(&[u8; 11], Vec<u8>)]) -> TestPlayer<'a> {
    let mut b = ImageBuilder::new().sectors_per_cluster(2).data_clusters(128);
    for (name, data) in files {
        b.file(name, data);
    }
    let sim = SimulatedCard::new(SimKind::Sdhc, b.build());
    let cs = sim.chip_select();
    let library = mount_library(SdCard::new(sim, cs)).unwrap();
    let engine = PlaybackBufferEngine::new(library.volume, buffers, library.playlist).unwrap();
    Player::new(
        engine,
        MockCodec::new(),
        MockInput::new(),
        HeadphoneVolume::new(DEFAULT_VOLUME),
    )
}

#[tokio::test]
async fn streams_a_track_to_the_end_and_moves_on() {
    let a = pattern(3 * N + 100, 1);
    let b = pattern(4 * N, 2);
    let buffers = StreamBuffers::<N>::new();
    let mut player = player(
        &buffers,
        &[(b"FIRST   WAV", wav(&a)), (b"SECOND  WAV", wav(&b))],
    );

    let armed = StreamSignal::new();
    player.start(&mut StreamHandle::new(&armed)).unwrap();
    assert!(armed.signaled());

    let mut sink = Recorder::default();
    let mut scratch = [0u16; N / 2];

    pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();
    assert_eq!(player.run_once().await.unwrap().outcome, PollOutcome::Refilled);

    pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();
    assert_eq!(player.run_once().await.unwrap().outcome, PollOutcome::TrackChanged);
    assert_eq!(player.engine().playlist().index(), 1);
    assert_eq!(player.engine().transitions(), 1);
    assert_eq!(
        (player.codec().mute_writes(), player.codec().unmute_writes()),
        (1, 1)
    );

    // Two buffers out: the first two blocks of the first track, in order.
    assert_eq!(sink.words, words(&a[..2 * N]));

    // Front is in flight again after two flips and was re-primed first.
    pump_once(&mut sink, &buffers, &mut scratch).await.unwrap();
    assert_eq!(sink.words[N..], words(&b[..N])[..]);
}

#[tokio::test]
async fn buttons_drive_volume_pause_and_skips() {
    let files = [
        (b"A       WAV", wav(&pattern(4 * N, 3))),
        (b"B       WAV", wav(&pattern(4 * N, 4))),
        (b"C       WAV", wav(&pattern(4 * N, 5))),
    ];
    let buffers = StreamBuffers::<N>::new();
    let mut player = player(&buffers, &files);
    player.start(&mut StreamHandle::new(&StreamSignal::new())).unwrap();

    player
        .input_mut()
        .add_event(InputEvent::ShortPress(Button::VolumeUp))
        .unwrap();
    let step = player.run_once().await.unwrap();
    let louder = HeadphoneVolume::new(DEFAULT_VOLUME + VOLUME_STEP);
    assert_eq!(step.outcome, PollOutcome::Idle);
    assert_eq!(step.last_action, Some(TransportAction::Volume(louder)));
    assert_eq!(player.codec().volume(), louder);
    assert_eq!(player.volume(), louder);

    player
        .input_mut()
        .add_event(InputEvent::Hold(Button::VolumeDown))
        .unwrap();
    let step = player.run_once().await.unwrap();
    assert_eq!(
        step.last_action,
        Some(TransportAction::Skipped(Direction::Previous))
    );
    assert_eq!(player.engine().playlist().index(), 2);

    let input = player.input_mut();
    input.add_event(InputEvent::ShortPress(Button::Play)).unwrap();
    input.add_event(InputEvent::Hold(Button::VolumeUp)).unwrap();
    let step = player.run_once().await.unwrap();
    assert_eq!(step.events, 2);
    assert_eq!(
        step.last_action,
        Some(TransportAction::Skipped(Direction::Next))
    );
    assert_eq!(player.engine().playlist().index(), 0);
    // Paused before the skip: the new track stays muted.
    assert!(player.codec().is_muted());
}

#[tokio::test]
async fn volume_clamps_at_the_top_of_the_range() {
    let buffers = StreamBuffers::<N>::new();
    let mut player = player(&buffers, &[(b"ONLY    WAV", wav(&pattern(2 * N, 6)))]);
    player.start(&mut StreamHandle::new(&StreamSignal::new())).unwrap();

    for _ in 0..16 {
        player
            .input_mut()
            .add_event(InputEvent::ShortPress(Button::VolumeUp))
            .unwrap();
    }
    let step = player.run_once().await.unwrap();
    assert_eq!(step.events, 16);
    assert_eq!(player.codec().volume().get(), 79);
}
