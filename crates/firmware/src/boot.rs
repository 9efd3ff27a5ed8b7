//! Storage bring-up and clock configuration.
//!
//! Boot order (each step depends on the one before):
//!   1. RCC: PLL1 system clock, PLL3 audio kernel clock ([`build_embassy_config`])
//!   2. Codec: I²C register init, headphone gain at the default volume
//!   3. Card: SPI-mode bring-up at 250 kHz, then 20 MHz
//!   4. Volume: MBR + boot sector, root directory scan for tracks
//!   5. Engine: prime both buffers, arm the SAI
//!
//! Steps 3 and 4 are [`mount_library`]. Every failure there is fatal and is
//! mapped onto a [`FatalFault`] for the caller to [`halt`](crate::fault::halt) on.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use fat16::{DirectoryEntry, Fat16Error, Fat16Volume};
use platform::config::{MAX_TRACKS, TRACK_EXTENSION};
use platform::BusSpeed;
use playback::Playlist;

use crate::fault::FatalFault;
use crate::sd::{CardType, SdCard, SdError};

/// A mounted card and the tracks found on it.
pub struct Library<D> {
    /// The mounted volume, ready to hand to the buffer engine.
    pub volume: Fat16Volume<D>,
    /// Every `.WAV` in the root directory, in directory order.
    pub playlist: Playlist<MAX_TRACKS>,
    /// Addressing mode the card reported.
    pub card_type: CardType,
}

/// Bring the card up, mount its FAT16 partition and collect the tracks.
///
/// | Failure                          | Fault                              |
/// |----------------------------------|------------------------------------|
/// | `GO_IDLE_STATE` not answered idle | [`FatalFault::CardNotIdle`]        |
/// | no FAT16 entry in the MBR         | [`FatalFault::NoFat16Partition`]   |
/// | no `.WAV` in the root directory   | [`FatalFault::NoTracks`]           |
/// | anything else                     | [`FatalFault::Storage`]            |
pub fn mount_library<SPI, CS>(
    mut card: SdCard<SPI, CS>,
) -> Result<Library<SdCard<SPI, CS>>, FatalFault>
where
    SPI: SpiBus<u8> + BusSpeed,
    CS: OutputPin,
{
    let card_type = card.initialize().map_err(|e| {
        #[cfg(feature = "defmt")]
        defmt::error!("boot: card bring-up failed: {}", defmt::Debug2Format(&e));
        match e {
            SdError::NotIdle(_) => FatalFault::CardNotIdle,
            _ => FatalFault::Storage,
        }
    })?;

    let mut volume = Fat16Volume::mount(card).map_err(|e| {
        #[cfg(feature = "defmt")]
        defmt::error!("boot: mount failed: {}", defmt::Debug2Format(&e));
        match e {
            Fat16Error::NoFat16Partition => FatalFault::NoFat16Partition,
            _ => FatalFault::Storage,
        }
    })?;

    let tracks: heapless::Vec<DirectoryEntry, MAX_TRACKS> = volume
        .list_by_extension(&TRACK_EXTENSION, MAX_TRACKS)
        .map_err(|_| FatalFault::Storage)?;
    let playlist = Playlist::new(tracks).ok_or(FatalFault::NoTracks)?;

    #[cfg(feature = "defmt")]
    defmt::info!("boot: {} card, {=usize} tracks", card_type, playlist.len());

    Ok(Library {
        volume,
        playlist,
        card_type,
    })
}

// ── RCC clock configuration ───────────────────────────────────────────────────

/// Build the `embassy_stm32::Config` with the RCC settings the player needs.
///
/// # Clock Tree (HSI → 400 MHz core)
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB1/2/3/4:    DIV2 → 100 MHz (SPI1 kernel clock via PLL1Q = 200 MHz)
/// PLL3: source=HSI, prediv=4, mul=48 → VCO=768 MHz
///   PLL3P: DIV68 → 11.294 MHz ≈ 256 × 44.1 kHz (SAI1 kernel clock, MCLK)
///
/// # DO NOT call `embassy_stm32::init(Default::default())`
///
/// The default config leaves PLL3 off and SAI1 on PLL1Q, which cannot
/// produce a 44.1 kHz frame clock.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // ── Oscillators ─────────────────────────────────────────────────────────
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;

    // ── PLL1: system clock + SPI kernel clock ────────────────────────────────
    // HSI (64 MHz) / prediv(4) = 16 MHz → × mul(50) = 800 MHz VCO
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2), // 400 MHz: system clock
        divq: Some(PllDiv::DIV4), // 200 MHz: SPI1 kernel clock
        divr: None,
    });

    // ── PLL3: SAI1 master clock ──────────────────────────────────────────────
    // HSI (64 MHz) / prediv(4) = 16 MHz → × mul(48) = 768 MHz VCO
    // PLL3_P = VCO / divp(68) = 11.294 MHz, 0.04 % above 256 × 44.1 kHz
    config.rcc.pll3 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL48,
        divp: Some(PllDiv::DIV68),
        divq: None,
        divr: None,
    });
    config.rcc.mux.sai1sel = mux::Saisel::PLL3_P;

    // ── System clock + bus prescalers ────────────────────────────────────────
    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}
