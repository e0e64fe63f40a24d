//! Driver error type

/// Errors returned by [`crate::Dac6050x`].
///
/// `E` is the bus error of the underlying `embedded_hal::i2c::I2c`.
/// Parameter errors are raised before any bus traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A bus transaction failed.
    Bus(E),
    /// [`crate::Dac6050x::setup`] has not completed successfully.
    NotInitialized,
    /// Channel index not present on this part.
    InvalidChannel {
        /// Requested channel (zero-based).
        channel: u8,
        /// Channels reported by DEVICE_ID.
        available: u8,
    },
    /// Code larger than the device resolution allows.
    ValueOutOfRange {
        /// Requested code.
        value: u16,
        /// Largest valid code.
        max: u16,
    },
    /// Voltage at or above the channel's full-scale span.
    VoltageOutOfRange {
        /// Requested voltage.
        millivolts: u32,
        /// Full-scale span of the channel.
        full_scale_mv: u32,
    },
    /// DEVICE_ID does not describe a DACx0508-family part.
    UnsupportedDevice(u16),
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "I2C bus error: {e:?}"),
            Self::NotInitialized => write!(f, "DAC not initialised, call setup() first"),
            Self::InvalidChannel { channel, available } => {
                write!(f, "channel {channel} out of range ({available} available)")
            }
            Self::ValueOutOfRange { value, max } => {
                write!(f, "code {value} exceeds maximum {max}")
            }
            Self::VoltageOutOfRange {
                millivolts,
                full_scale_mv,
            } => write!(f, "{millivolts} mV outside 0..{full_scale_mv} mV span"),
            Self::UnsupportedDevice(id) => write!(f, "unsupported device id {id:#06x}"),
        }
    }
}
