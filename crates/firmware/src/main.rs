//! NoiseBLASTER firmware - Main Entry Point
//!
//! Hardware-only entry point for STM32H743ZI.
//!
//! # Pin assignments
//!
//! | Function            | Pins                          |
//! |---------------------|-------------------------------|
//! | SD card (SPI1)      | PA5 SCK, PA7 MOSI, PA6 MISO, PB10 CS |
//! | Codec control (I2C1)| PB8 SCL, PB9 SDA              |
//! | Codec audio (SAI1_A)| PE5 SCK, PE6 SD, PE4 FS, PE2 MCLK |
//! | Buttons             | PC0 play, PC1 vol+, PC2 vol-  |
//! | Liveness LED        | PB0                           |
//! | Fault LED           | PB14                          |

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::sai::{self, Sai};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_time::Delay;
use static_cell::StaticCell;

use firmware::audio::sai_task::{sai_task, STREAM_ARMED, STREAM_WORDS};
use firmware::input::hardware::debounce_task;
use firmware::input::{ButtonEvents, BUTTON_EVENTS};
use firmware::sd::bus::ClockedSpi;
use firmware::{fault, mount_library, FatalFault, Library, Player, SdCard, StreamHandle, Tlv320Dac23};
use platform::config::{APP_NAME, APP_VERSION, SD_INIT_HZ, STREAM_BUFFER_BYTES};
use platform::{AudioCodec, AudioConfig};
use playback::{PlaybackBufferEngine, StreamBuffers};

// Logging transport + panic handler
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    I2C1_EV => i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

/// Front/back sample buffers shared by the main loop and the SAI task.
static STREAM_BUFFERS: StreamBuffers<STREAM_BUFFER_BYTES> = StreamBuffers::new();

/// SAI DMA ring: room for two stream buffers.
static SAI_RING: StaticCell<[u16; 2 * STREAM_WORDS]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);
    let p = embassy_stm32::init(firmware::boot::build_embassy_config());

    let fault_led = Output::new(p.PB14, Level::Low, Speed::Low);

    // ── Codec control ───────────────────────────────────────────────────────
    let i2c = I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        p.DMA1_CH4,
        p.DMA1_CH5,
        Hertz(100_000),
        i2c::Config::default(),
    );
    let mut codec = Tlv320Dac23::new(i2c);
    let audio = AudioConfig::default();
    if let Err(e) = codec.init(audio).await {
        defmt::error!("codec init failed: {}", defmt::Debug2Format(&e));
        fault::halt(fault_led, Delay, FatalFault::Codec);
    }

    // ── Card + volume ───────────────────────────────────────────────────────
    // SPI1 starts at the bring-up clock; the card driver raises it after init.
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(SD_INIT_HZ);
    let spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config);
    let cs = Output::new(p.PB10, Level::High, Speed::VeryHigh);
    let card = SdCard::new(ClockedSpi::new(spi, spi_config), cs);

    let Library {
        volume,
        playlist,
        card_type,
    } = match mount_library(card) {
        Ok(library) => library,
        Err(fault) => fault::halt(fault_led, Delay, fault),
    };
    defmt::info!("library ready on {} card", card_type);

    let engine = match PlaybackBufferEngine::new(volume, &STREAM_BUFFERS, playlist) {
        Ok(engine) => engine,
        Err(e) => {
            defmt::error!("first track unreadable: {}", defmt::Debug2Format(&e));
            fault::halt(fault_led, Delay, FatalFault::Storage)
        }
    };

    // ── Audio stream ────────────────────────────────────────────────────────
    let (sub_block_a, _) = sai::split_subblocks(p.SAI1);
    let mut sai_config = sai::Config::default();
    sai_config.mode = sai::Mode::Master;
    sai_config.tx_rx = sai::TxRx::Transmitter;
    sai_config.data_size = sai::DataSize::Data16;
    sai_config.stereo_mono = sai::StereoMono::Stereo;
    let sai = Sai::new_asynchronous_with_mclk(
        sub_block_a,
        p.PE5,
        p.PE6,
        p.PE4,
        p.PE2,
        p.DMA1_CH0,
        SAI_RING.init([0; 2 * STREAM_WORDS]),
        sai_config,
    );
    spawner.must_spawn(sai_task(sai, &STREAM_BUFFERS));

    // ── Buttons ─────────────────────────────────────────────────────────────
    let play = Input::new(p.PC0, Pull::Up).degrade();
    let volume_up = Input::new(p.PC1, Pull::Up).degrade();
    let volume_down = Input::new(p.PC2, Pull::Up).degrade();
    let led = Output::new(p.PB0, Level::Low, Speed::Low).degrade();
    spawner.must_spawn(debounce_task(play, volume_up, volume_down, led));

    // ── Main loop ───────────────────────────────────────────────────────────
    let mut player = Player::new(
        engine,
        codec,
        ButtonEvents::new(&BUTTON_EVENTS),
        audio.volume,
    );
    if let Err(e) = player.start(&mut StreamHandle::new(&STREAM_ARMED)) {
        defmt::error!("stream start failed: {}", defmt::Debug2Format(&e));
        fault::halt(fault_led, Delay, FatalFault::Storage);
    }

    defmt::info!("Entering main loop");
    loop {
        // A failed read or codec write costs one buffer of audio at most;
        // the next iteration retries from the same cursor.
        if let Err(e) = player.run_once().await {
            defmt::warn!("main loop: {}", defmt::Debug2Format(&e));
        }
        embassy_futures::yield_now().await;
    }
}
