//! TLV320DAC23 hardware driver
//!
//! Control plane only, over `embedded_hal_async::i2c::I2c`. Samples reach
//! the chip as I²S from the SAI peripheral and never pass through here.

use embedded_hal_async::i2c::I2c;
use platform::config::DEFAULT_VOLUME;
use platform::{AudioCodec, AudioConfig, HeadphoneVolume, SampleRateHz};

use super::registers::*;

/// TLV320DAC23 stereo DAC with headphone amplifier
pub struct Tlv320Dac23<I> {
    i2c: I,
    volume: HeadphoneVolume,
    muted: bool,
}

impl<I: I2c> Tlv320Dac23<I> {
    /// Create a driver for the chip on `i2c`. Nothing is written until
    /// [`AudioCodec::init`].
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            volume: HeadphoneVolume::new(DEFAULT_VOLUME),
            muted: false,
        }
    }

    /// Write one control word.
    async fn write_reg(&mut self, reg: u8, value: u16) -> Result<(), I::Error> {
        self.i2c.write(I2C_ADDR, &encode(reg, value)).await
    }

    /// Last volume written.
    pub fn volume(&self) -> HeadphoneVolume {
        self.volume
    }

    /// Whether the digital path is soft-muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Release the bus.
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: I2c> AudioCodec for Tlv320Dac23<I> {
    type Error = I::Error;

    /// Reset and configure for 16-bit I²S slave input at 44.1 kHz with the
    /// DAC routed to the headphone output.
    async fn init(&mut self, config: AudioConfig) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::info!("Initialising TLV320DAC23");

        if config.sample_rate != SampleRateHz::CD {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "TLV320DAC23: {=u32} Hz requested, clocking for 44100 Hz",
                config.sample_rate.get()
            );
        }

        self.write_reg(REG_RESET, RESET_VALUE).await?;
        self.write_reg(REG_LEFT_LINE_IN, LINE_IN_LRS | LINE_IN_MUTE)
            .await?;
        self.set_volume(config.volume).await?;
        self.write_reg(REG_ANALOG_PATH, ANALOG_DAC_SELECT | ANALOG_BYPASS)
            .await?;
        self.set_mute(false).await?;
        // Oscillator and line input powered down; everything else on.
        self.write_reg(REG_POWER_DOWN, PWR_OSC | PWR_LINE).await?;
        self.write_reg(REG_INTERFACE_FORMAT, FORMAT_I2S_16BIT)
            .await?;
        self.write_reg(REG_SAMPLE_RATE, RATE_NORMAL_44K1).await?;
        self.write_reg(REG_ACTIVATION, ACTIVATE).await?;

        #[cfg(feature = "defmt")]
        defmt::info!("TLV320DAC23 initialisation complete");
        Ok(())
    }

    async fn set_volume(&mut self, volume: HeadphoneVolume) -> Result<(), Self::Error> {
        self.write_reg(REG_RIGHT_HEADPHONE, headphone_volume(volume.get()))
            .await?;
        self.volume = volume;
        Ok(())
    }

    async fn set_mute(&mut self, muted: bool) -> Result<(), Self::Error> {
        self.write_reg(REG_DIGITAL_PATH, digital_path(muted)).await?;
        self.muted = muted;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    fn w(bytes: [u8; 2]) -> Transaction {
        Transaction::write(I2C_ADDR, bytes.to_vec())
    }

    #[tokio::test]
    async fn init_writes_the_register_sequence_in_order() {
        let expected = [
            w([0x14, 0xFF]), // reset
            w([0x01, 0x80]), // line in muted
            w([0x07, 0xC4]), // volume 20
            w([0x08, 0x18]), // DAC select + bypass
            w([0x0A, 0x04]), // unmuted, 44.1 kHz de-emphasis
            w([0x0C, 0x21]), // oscillator + line in off
            w([0x0E, 0x02]), // I2S 16-bit slave
            w([0x10, 0x22]), // 44.1 kHz normal mode
            w([0x12, 0x01]), // active
        ];
        let mut dac = Tlv320Dac23::new(I2cMock::new(&expected));
        dac.init(AudioConfig::default()).await.unwrap();
        assert_eq!(dac.volume().get(), 20);
        assert!(!dac.is_muted());
        dac.into_inner().done();
    }

    #[tokio::test]
    async fn volume_request_of_85_is_written_as_79() {
        let mut dac = Tlv320Dac23::new(I2cMock::new(&[w([0x07, 0xFF])]));
        dac.set_volume(HeadphoneVolume::new(85)).await.unwrap();
        assert_eq!(dac.volume().get(), 79);
        dac.into_inner().done();
    }

    #[tokio::test]
    async fn mute_toggles_only_the_soft_mute_bit() {
        let mut dac = Tlv320Dac23::new(I2cMock::new(&[w([0x0A, 0x0C]), w([0x0A, 0x04])]));
        dac.set_mute(true).await.unwrap();
        assert!(dac.is_muted());
        dac.set_mute(false).await.unwrap();
        assert!(!dac.is_muted());
        dac.into_inner().done();
    }
}
