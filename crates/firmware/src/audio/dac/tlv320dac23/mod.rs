//! Texas Instruments TLV320DAC23 driver (I²C control port)

mod driver;
pub mod registers;

pub use driver::Tlv320Dac23;
