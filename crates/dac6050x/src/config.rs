//! Driver configuration
//!
//! Defaults describe the common board wiring: A0 to AGND, a 400 kHz bus,
//! an external 2.5 V reference divided by two and a ×2 output buffer, which
//! gives a 0–2.5 V span without needing VDD headroom above the reference.

use crate::registers::{CONFIG_REF_PWDWN, GAIN_BUFF_GAIN_MASK, GAIN_REF_DIV2, I2C_ADDR_AGND};
use crate::types::{AddressPin, Gain, OutOfRangeError};

/// Default bus speed (I²C Fast-mode).
pub const DEFAULT_BUS_SPEED_HZ: u32 = 400_000;
/// Fastest bus speed the device accepts (I²C Fast-mode Plus).
pub const MAX_BUS_SPEED_HZ: u32 = 1_000_000;
/// Nominal reference voltage (internal reference, or the usual external one).
pub const DEFAULT_REFERENCE_MV: u32 = 2_500;

/// Static configuration applied by [`crate::Dac6050x::setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DacConfig {
    address: u8,
    bus_speed_hz: u32,
    gain: Gain,
    reference_divide_by_2: bool,
    internal_reference: bool,
    reference_mv: u32,
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            address: I2C_ADDR_AGND,
            bus_speed_hz: DEFAULT_BUS_SPEED_HZ,
            gain: Gain::Two,
            reference_divide_by_2: true,
            internal_reference: false,
            reference_mv: DEFAULT_REFERENCE_MV,
        }
    }
}

impl DacConfig {
    /// Select the address from the A0 strapping.
    #[must_use]
    pub const fn with_address_pin(mut self, pin: AddressPin) -> Self {
        self.address = pin.address();
        self
    }

    /// Use a raw 7-bit address (for boards behind an address translator).
    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Record the bus speed the caller's HAL runs at.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] for 0 Hz or anything above 1 MHz.
    pub const fn with_bus_speed_hz(mut self, hz: u32) -> Result<Self, OutOfRangeError> {
        if hz == 0 || hz > MAX_BUS_SPEED_HZ {
            return Err(OutOfRangeError {
                value: hz,
                min: 1,
                max: MAX_BUS_SPEED_HZ,
            });
        }
        self.bus_speed_hz = hz;
        Ok(self)
    }

    /// Output buffer gain applied to every channel at setup.
    #[must_use]
    pub const fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    /// Enable or disable the REF-DIV2 reference divider.
    #[must_use]
    pub const fn with_reference_divider(mut self, divide_by_2: bool) -> Self {
        self.reference_divide_by_2 = divide_by_2;
        self
    }

    /// Use the internal 2.5 V reference instead of an external one.
    #[must_use]
    pub const fn with_internal_reference(mut self, enabled: bool) -> Self {
        self.internal_reference = enabled;
        self
    }

    /// Reference voltage in millivolts, used for voltage conversions only.
    #[must_use]
    pub const fn with_reference_mv(mut self, millivolts: u32) -> Self {
        self.reference_mv = millivolts;
        self
    }

    /// 7-bit I²C address.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Bus speed in Hz.
    #[must_use]
    pub const fn bus_speed_hz(&self) -> u32 {
        self.bus_speed_hz
    }

    /// Configured output buffer gain.
    #[must_use]
    pub const fn gain(&self) -> Gain {
        self.gain
    }

    /// Whether REF-DIV2 is set.
    #[must_use]
    pub const fn reference_divide_by_2(&self) -> bool {
        self.reference_divide_by_2
    }

    /// Whether the internal reference stays powered.
    #[must_use]
    pub const fn internal_reference(&self) -> bool {
        self.internal_reference
    }

    /// Reference voltage in millivolts.
    #[must_use]
    pub const fn reference_mv(&self) -> u32 {
        self.reference_mv
    }

    /// CONFIG value written at setup: every channel powered up.
    #[must_use]
    pub const fn config_register(&self) -> u16 {
        if self.internal_reference {
            0
        } else {
            CONFIG_REF_PWDWN
        }
    }

    /// GAIN value written at setup: the configured gain on every channel.
    #[must_use]
    pub const fn gain_register(&self) -> u16 {
        let div = if self.reference_divide_by_2 { GAIN_REF_DIV2 } else { 0 };
        let buff = match self.gain {
            Gain::One => 0,
            Gain::Two => GAIN_BUFF_GAIN_MASK,
        };
        div | buff
    }

    /// Output voltage at code 2^N for a ×`gain` channel, in millivolts.
    #[must_use]
    pub const fn full_scale_mv_for(&self, gain: Gain) -> u32 {
        let reference = if self.reference_divide_by_2 {
            self.reference_mv / 2
        } else {
            self.reference_mv
        };
        reference.saturating_mul(gain.factor())
    }

    /// Full-scale span with the configured gain.
    #[must_use]
    pub const fn full_scale_mv(&self) -> u32 {
        self.full_scale_mv_for(self.gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_common_wiring() {
        let cfg = DacConfig::default();
        assert_eq!(cfg.address(), 0x48);
        assert_eq!(cfg.bus_speed_hz(), 400_000);
        assert_eq!(cfg.gain(), Gain::Two);
        assert!(cfg.reference_divide_by_2());
        assert!(!cfg.internal_reference());
    }
    #[test]
    fn default_registers_power_down_reference_and_double_every_buffer() {
        let cfg = DacConfig::default();
        assert_eq!(cfg.config_register(), 0x0100);
        assert_eq!(cfg.gain_register(), 0x01FF);
    }
    #[test]
    fn unity_gain_without_divider_clears_gain_register() {
        let cfg = DacConfig::default()
            .with_gain(Gain::One)
            .with_reference_divider(false);
        assert_eq!(cfg.gain_register(), 0x0000);
    }
    #[test]
    fn internal_reference_keeps_config_clear() {
        let cfg = DacConfig::default().with_internal_reference(true);
        assert_eq!(cfg.config_register(), 0x0000);
    }
    #[test]
    fn bus_speed_rejects_zero_and_above_fast_mode_plus() {
        assert!(DacConfig::default().with_bus_speed_hz(0).is_err());
        let err = DacConfig::default().with_bus_speed_hz(3_400_000);
        assert_eq!(
            err,
            Err(OutOfRangeError { value: 3_400_000, min: 1, max: 1_000_000 })
        );
        assert!(DacConfig::default().with_bus_speed_hz(100_000).is_ok());
        assert!(DacConfig::default().with_bus_speed_hz(1_000_000).is_ok());
    }
    #[test]
    fn address_pin_overrides_default_address() {
        let cfg = DacConfig::default().with_address_pin(AddressPin::Scl);
        assert_eq!(cfg.address(), 0x4B);
    }
    #[test]
    fn full_scale_is_reference_when_halved_and_doubled() {
        assert_eq!(DacConfig::default().full_scale_mv(), 2_500);
        let cfg = DacConfig::default().with_reference_divider(false);
        assert_eq!(cfg.full_scale_mv(), 5_000);
        assert_eq!(cfg.full_scale_mv_for(Gain::One), 2_500);
    }
}
