//! Device domain types.
//!
//! - `Resolution`: decoded from DEVICE_ID, owns the code range and alignment
//! - `Gain`: output buffer gain
//! - `AddressPin`: A0 strapping → 7-bit I²C address
//! - `DeviceId`: raw DEVICE_ID word with field accessors

use crate::registers::{
    DEVICE_ID_NUM_CHANNELS_MASK, DEVICE_ID_NUM_CHANNELS_SHIFT, DEVICE_ID_RESOLUTION_MASK,
    DEVICE_ID_RESOLUTION_SHIFT, DEVICE_ID_RSTSEL_MASK, I2C_ADDR_AGND, I2C_ADDR_SCL, I2C_ADDR_SDA,
    I2C_ADDR_VIO, MAX_CHANNELS, RESOLUTION_12_BIT, RESOLUTION_14_BIT, RESOLUTION_16_BIT,
};

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Converter resolution as reported by DEVICE_ID\[14:12\].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// DAC60508: codes 0–4095.
    Bits12,
    /// DAC70508: codes 0–16383.
    Bits14,
    /// DAC80508: codes 0–65535.
    Bits16,
}

#[allow(clippy::arithmetic_side_effects)] // shifts by at most 4
impl Resolution {
    /// Decode the 3-bit DEVICE_ID resolution field.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            RESOLUTION_12_BIT => Some(Self::Bits12),
            RESOLUTION_14_BIT => Some(Self::Bits14),
            RESOLUTION_16_BIT => Some(Self::Bits16),
            _ => None,
        }
    }

    /// Number of significant bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits12 => 12,
            Self::Bits14 => 14,
            Self::Bits16 => 16,
        }
    }

    /// Left shift that aligns a code to the MSB of the 16-bit data word.
    #[must_use]
    pub const fn shift(self) -> u8 {
        match self {
            Self::Bits12 => 4,
            Self::Bits14 => 2,
            Self::Bits16 => 0,
        }
    }

    /// Largest valid code.
    #[must_use]
    pub const fn max_code(self) -> u16 {
        u16::MAX >> self.shift()
    }

    /// Mid-scale code (0x7FF for 12 bits).
    #[must_use]
    pub const fn midscale(self) -> u16 {
        self.max_code() >> 1
    }

    /// Align `code` into the 16-bit data register word.
    ///
    /// Bits above the resolution are discarded; callers validate against
    /// [`Resolution::max_code`] first.
    #[must_use]
    pub const fn to_data_word(self, code: u16) -> u16 {
        (code & self.max_code()) << self.shift()
    }

    /// Recover the code from a data register word.
    #[must_use]
    pub const fn from_data_word(self, word: u16) -> u16 {
        word >> self.shift()
    }
}

// ── Gain ─────────────────────────────────────────────────────────────────────

/// Output buffer gain (GAIN register BUFFn-GAIN bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// ×1
    One,
    /// ×2
    #[default]
    Two,
}

impl Gain {
    /// Numeric multiplier.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

// ── AddressPin ───────────────────────────────────────────────────────────────

/// Where the A0 pin is strapped.
///
/// | A0   | Address |
/// |------|---------|
/// | AGND | `0x48`  |
/// | VIO  | `0x49`  |
/// | SDA  | `0x4A`  |
/// | SCL  | `0x4B`  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressPin {
    /// A0 to AGND.
    #[default]
    Agnd,
    /// A0 to VIO.
    Vio,
    /// A0 to SDA.
    Sda,
    /// A0 to SCL.
    Scl,
}

impl AddressPin {
    /// 7-bit I²C address for this strapping.
    #[must_use]
    pub const fn address(self) -> u8 {
        match self {
            Self::Agnd => I2C_ADDR_AGND,
            Self::Vio => I2C_ADDR_VIO,
            Self::Sda => I2C_ADDR_SDA,
            Self::Scl => I2C_ADDR_SCL,
        }
    }
}

// ── DeviceId ─────────────────────────────────────────────────────────────────

/// Raw DEVICE_ID register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct DeviceId(u16);

impl DeviceId {
    /// Wrap a raw DEVICE_ID word.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// The raw register word.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Decoded resolution, `None` for a reserved code.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // 3-bit field
    pub const fn resolution(self) -> Option<Resolution> {
        let code = (self.0 & DEVICE_ID_RESOLUTION_MASK) >> DEVICE_ID_RESOLUTION_SHIFT;
        Resolution::from_code(code as u8)
    }

    /// Channel count field (0–15; only 1–8 are valid parts).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // 4-bit field
    pub const fn channel_count(self) -> u8 {
        ((self.0 & DEVICE_ID_NUM_CHANNELS_MASK) >> DEVICE_ID_NUM_CHANNELS_SHIFT) as u8
    }

    /// RSTSEL: outputs power up at mid-scale rather than zero-scale.
    #[must_use]
    pub const fn resets_to_midscale(self) -> bool {
        self.0 & DEVICE_ID_RSTSEL_MASK != 0
    }

    /// True when the word describes a part this driver can run.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        let channels = self.channel_count();
        self.resolution().is_some() && channels > 0 && channels <= MAX_CHANNELS
    }
}

impl From<u16> for DeviceId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dac60508_id_decodes_as_8ch_12bit() {
        // RESOLUTION=010, NUM_CHANNELS=1000, RSTSEL=0
        let id = DeviceId::new(0x2800);
        assert_eq!(id.resolution(), Some(Resolution::Bits12));
        assert_eq!(id.channel_count(), 8);
        assert!(!id.resets_to_midscale());
        assert!(id.is_supported());
    }
    #[test]
    fn dac80508_midscale_variant_decodes() {
        let id = DeviceId::new(0x0880);
        assert_eq!(id.resolution(), Some(Resolution::Bits16));
        assert_eq!(id.channel_count(), 8);
        assert!(id.resets_to_midscale());
    }
    #[test]
    fn dac70504_decodes_as_4ch_14bit() {
        let id = DeviceId::new(0x1400);
        assert_eq!(id.resolution(), Some(Resolution::Bits14));
        assert_eq!(id.channel_count(), 4);
    }
    #[test]
    fn floating_bus_id_is_unsupported() {
        // An absent device reads back all ones.
        let id = DeviceId::new(0xFFFF);
        assert_eq!(id.resolution(), None);
        assert!(!id.is_supported());
    }
    #[test]
    fn zero_channels_is_unsupported() {
        assert!(!DeviceId::new(0x2000).is_supported());
    }
    #[test]
    fn nine_channels_is_unsupported() {
        assert!(!DeviceId::new(0x2900).is_supported());
    }
    #[test]
    fn twelve_bit_code_is_left_aligned() {
        assert_eq!(Resolution::Bits12.to_data_word(0x0FFF), 0xFFF0);
        assert_eq!(Resolution::Bits12.to_data_word(0x07FF), 0x7FF0);
        assert_eq!(Resolution::Bits14.to_data_word(0x3FFF), 0xFFFC);
        assert_eq!(Resolution::Bits16.to_data_word(0x1234), 0x1234);
    }
    #[test]
    fn max_codes_match_bit_widths() {
        assert_eq!(Resolution::Bits12.max_code(), 4095);
        assert_eq!(Resolution::Bits14.max_code(), 16383);
        assert_eq!(Resolution::Bits16.max_code(), 65535);
        for r in [Resolution::Bits12, Resolution::Bits14, Resolution::Bits16] {
            assert_eq!(r.bits() + r.shift(), 16);
        }
    }
    #[test]
    fn midscale_matches_default_output_word() {
        assert_eq!(Resolution::Bits12.to_data_word(Resolution::Bits12.midscale()), 0x7FF0);
    }
    #[test]
    fn address_pins_map_to_datasheet_addresses() {
        assert_eq!(AddressPin::default().address(), 0x48);
        assert_eq!(AddressPin::Vio.address(), 0x49);
        assert_eq!(AddressPin::Sda.address(), 0x4A);
        assert_eq!(AddressPin::Scl.address(), 0x4B);
    }
    #[test]
    fn gain_defaults_to_two() {
        assert_eq!(Gain::default(), Gain::Two);
        assert_eq!(Gain::Two.factor(), 2);
        assert_eq!(Gain::One.factor(), 1);
    }
}
