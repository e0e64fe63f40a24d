//! DACx0508 I²C driver
//!
//! Blocking driver over `embedded_hal::i2c::I2c`. The handle owns the bus
//! for its whole lifetime; [`Dac6050x::release`] hands it back.
//!
//! # Lifecycle
//!
//! 1. [`Dac6050x::new`]: no bus traffic.
//! 2. [`Dac6050x::setup`]: CONFIG, GAIN, DEVICE_ID read, mid-scale on
//!    channels 0 and 1.
//! 3. [`Dac6050x::set_output`] per channel.
//!
//! A [`Dac6050x::soft_reset`] returns the handle to step 2.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::DacConfig;
use crate::error::Error;
use crate::registers::{
    channel_bit, dac_data_command, CMD_BROADCAST, CMD_CONFIG, CMD_DEVICE_ID, CMD_GAIN, CMD_STATUS,
    CMD_SYNC, CMD_TRIGGER, SOFT_RESET_DELAY_US, STATUS_REF_ALARM, SYNC_BROADCAST_EN_SHIFT,
    SYNC_RESET_VALUE, TRIGGER_LDAC, TRIGGER_SOFT_RESET,
};
use crate::types::{DeviceId, Gain, Resolution};

/// Channels that receive a mid-scale code at the end of setup.
const DEFAULT_OUTPUT_CHANNELS: u8 = 2;

/// What setup learned from DEVICE_ID.
#[derive(Debug, Clone, Copy)]
struct Identity {
    id: DeviceId,
    channels: u8,
    resolution: Resolution,
}

/// DAC60508 / DAC70508 / DAC80508 driver.
pub struct Dac6050x<I> {
    i2c: I,
    config: DacConfig,
    identity: Option<Identity>,
    config_reg: u16,
    gain_reg: u16,
    sync_reg: u16,
}

impl<I: I2c> Dac6050x<I> {
    /// Create a driver for the device described by `config`.
    ///
    /// `i2c` must already run at [`DacConfig::bus_speed_hz`].
    pub fn new(i2c: I, config: DacConfig) -> Self {
        Self {
            i2c,
            config_reg: config.config_register(),
            gain_reg: config.gain_register(),
            sync_reg: SYNC_RESET_VALUE,
            config,
            identity: None,
        }
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Read a 16-bit register: pointer byte out, two bytes back, MSB first.
    pub fn read_register(&mut self, command: u8) -> Result<u16, Error<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.config.address(), &[command], &mut buf)
            .map_err(Error::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Write a 16-bit register: pointer byte, then MSB, then LSB.
    pub fn write_register(&mut self, command: u8, value: u16) -> Result<(), Error<I::Error>> {
        let [msb, lsb] = value.to_be_bytes();
        #[cfg(feature = "defmt")]
        defmt::debug!("DAC6050x reg {=u8:#x} <- {=u16:#x}", command, value);
        self.i2c
            .write(self.config.address(), &[command, msb, lsb])
            .map_err(Error::Bus)
    }

    /// Configure the device and identify it.
    ///
    /// Writes CONFIG and GAIN from the configuration, reads DEVICE_ID,
    /// then drives channel 0 (and channel 1 when present) to mid-scale.
    /// The first failing step aborts the sequence; the handle only counts
    /// as initialised when every step succeeded.
    ///
    /// # Errors
    ///
    /// [`Error::Bus`] on any failed transaction, [`Error::UnsupportedDevice`]
    /// when DEVICE_ID reports no channels, more than eight, or a reserved
    /// resolution code.
    pub fn setup(&mut self) -> Result<DeviceId, Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!("Initialising DAC6050x at {=u8:#x}", self.config.address());

        self.identity = None;

        let config_reg = self.config.config_register();
        self.write_register(CMD_CONFIG, config_reg)?;
        self.config_reg = config_reg;

        let gain_reg = self.config.gain_register();
        self.write_register(CMD_GAIN, gain_reg)?;
        self.gain_reg = gain_reg;

        let id = DeviceId::new(self.read_register(CMD_DEVICE_ID)?);
        let resolution = match id.resolution() {
            Some(resolution) if id.is_supported() => resolution,
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("DAC6050x rejected device id {=u16:#x}", id.raw());
                return Err(Error::UnsupportedDevice(id.raw()));
            }
        };
        let identity = Identity {
            id,
            channels: id.channel_count(),
            resolution,
        };

        let midscale = resolution.to_data_word(resolution.midscale());
        for channel in 0..identity.channels.min(DEFAULT_OUTPUT_CHANNELS) {
            self.write_register(dac_data_command(channel), midscale)?;
        }

        self.identity = Some(identity);
        #[cfg(feature = "defmt")]
        defmt::info!(
            "DAC6050x ready: {=u8} channels, {=u8}-bit",
            identity.channels,
            resolution.bits()
        );
        Ok(id)
    }

    /// Set the output code of `channel` (zero-based).
    ///
    /// `code` is in device counts, 0 to [`Resolution::max_code`]; it is
    /// left-aligned into the 16-bit data word before transmission.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before setup, [`Error::InvalidChannel`],
    /// [`Error::ValueOutOfRange`], or [`Error::Bus`].
    pub fn set_output(&mut self, channel: u8, code: u16) -> Result<(), Error<I::Error>> {
        let identity = self.identity()?;
        Self::check_channel(identity, channel)?;
        let word = Self::encode(identity, code)?;
        self.write_register(dac_data_command(channel), word)
    }

    /// Set `channel` to the code nearest below `millivolts`.
    ///
    /// The span is derived from the reference, REF-DIV2 and the channel's
    /// current buffer gain.
    ///
    /// # Errors
    ///
    /// [`Error::VoltageOutOfRange`] when `millivolts` is at or above the
    /// channel's full scale, otherwise as [`Dac6050x::set_output`].
    pub fn set_output_millivolts(
        &mut self,
        channel: u8,
        millivolts: u32,
    ) -> Result<(), Error<I::Error>> {
        let identity = self.identity()?;
        Self::check_channel(identity, channel)?;
        let full_scale_mv = self.config.full_scale_mv_for(self.shadow_gain(channel));
        let Some(code) = millivolts_to_code(identity.resolution, millivolts, full_scale_mv) else {
            return Err(Error::VoltageOutOfRange {
                millivolts,
                full_scale_mv,
            });
        };
        self.write_register(
            dac_data_command(channel),
            identity.resolution.to_data_word(code),
        )
    }

    /// Write `code` to every broadcast-enabled channel at once.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`], [`Error::ValueOutOfRange`] or [`Error::Bus`].
    pub fn broadcast(&mut self, code: u16) -> Result<(), Error<I::Error>> {
        let identity = self.identity()?;
        let word = Self::encode(identity, code)?;
        self.write_register(CMD_BROADCAST, word)
    }

    /// Pulse LDAC: latch every channel in synchronous mode.
    pub fn trigger_ldac(&mut self) -> Result<(), Error<I::Error>> {
        self.write_register(CMD_TRIGGER, TRIGGER_LDAC)
    }

    /// Hold `channel` updates until [`Dac6050x::trigger_ldac`] (`true`) or
    /// apply them immediately (`false`).
    pub fn set_synchronous(
        &mut self,
        channel: u8,
        synchronous: bool,
    ) -> Result<(), Error<I::Error>> {
        Self::check_channel(self.identity()?, channel)?;
        let value = with_bit(self.sync_reg, channel_bit(channel), synchronous);
        self.write_register(CMD_SYNC, value)?;
        self.sync_reg = value;
        Ok(())
    }

    /// Let `channel` follow [`Dac6050x::broadcast`] writes.
    pub fn set_broadcast_enabled(
        &mut self,
        channel: u8,
        enabled: bool,
    ) -> Result<(), Error<I::Error>> {
        Self::check_channel(self.identity()?, channel)?;
        let bit = channel_bit(channel).wrapping_shl(u32::from(SYNC_BROADCAST_EN_SHIFT));
        let value = with_bit(self.sync_reg, bit, enabled);
        self.write_register(CMD_SYNC, value)?;
        self.sync_reg = value;
        Ok(())
    }

    /// Power `channel` up or down (CONFIG DACn-PWDWN).
    pub fn set_channel_power(&mut self, channel: u8, powered: bool) -> Result<(), Error<I::Error>> {
        Self::check_channel(self.identity()?, channel)?;
        let value = with_bit(self.config_reg, channel_bit(channel), !powered);
        self.write_register(CMD_CONFIG, value)?;
        self.config_reg = value;
        Ok(())
    }

    /// Override the output buffer gain of one channel.
    pub fn set_channel_gain(&mut self, channel: u8, gain: Gain) -> Result<(), Error<I::Error>> {
        Self::check_channel(self.identity()?, channel)?;
        let value = with_bit(self.gain_reg, channel_bit(channel), gain == Gain::Two);
        self.write_register(CMD_GAIN, value)?;
        self.gain_reg = value;
        Ok(())
    }

    /// Current buffer gain of `channel` as last written.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before setup, [`Error::InvalidChannel`]
    /// for a channel the part does not have.
    pub fn channel_gain(&self, channel: u8) -> Result<Gain, Error<I::Error>> {
        Self::check_channel(self.identity()?, channel)?;
        Ok(self.shadow_gain(channel))
    }

    /// BUFFn-GAIN bit of a channel already checked against the identity.
    fn shadow_gain(&self, channel: u8) -> Gain {
        if self.gain_reg & channel_bit(channel) == 0 {
            Gain::One
        } else {
            Gain::Two
        }
    }

    /// STATUS REF-ALARM: the reference lacks headroom and outputs are
    /// held at zero.
    pub fn reference_alarm(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.read_register(CMD_STATUS)? & STATUS_REF_ALARM != 0)
    }

    /// Soft-reset the device and wait for it to settle.
    ///
    /// Every register returns to its power-on value, so the handle forgets
    /// the device id; call [`Dac6050x::setup`] again before writing outputs.
    pub fn soft_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.write_register(CMD_TRIGGER, TRIGGER_SOFT_RESET)?;
        delay.delay_us(SOFT_RESET_DELAY_US);
        self.identity = None;
        self.config_reg = self.config.config_register();
        self.gain_reg = self.config.gain_register();
        self.sync_reg = SYNC_RESET_VALUE;
        #[cfg(feature = "defmt")]
        defmt::info!("DAC6050x soft reset complete");
        Ok(())
    }

    /// DEVICE_ID read by the last successful setup.
    pub fn device_id(&self) -> Option<DeviceId> {
        self.identity.map(|i| i.id)
    }

    /// Channel count reported by DEVICE_ID.
    pub fn channel_count(&self) -> Option<u8> {
        self.identity.map(|i| i.channels)
    }

    /// Resolution reported by DEVICE_ID.
    pub fn resolution(&self) -> Option<Resolution> {
        self.identity.map(|i| i.resolution)
    }

    /// Configuration the handle was created with.
    pub fn config(&self) -> &DacConfig {
        &self.config
    }

    /// 7-bit I²C address.
    pub fn address(&self) -> u8 {
        self.config.address()
    }

    /// Bus speed the caller's HAL was configured for.
    pub fn bus_speed_hz(&self) -> u32 {
        self.config.bus_speed_hz()
    }

    fn identity(&self) -> Result<Identity, Error<I::Error>> {
        self.identity.ok_or(Error::NotInitialized)
    }

    fn check_channel(identity: Identity, channel: u8) -> Result<(), Error<I::Error>> {
        if channel < identity.channels {
            Ok(())
        } else {
            Err(Error::InvalidChannel {
                channel,
                available: identity.channels,
            })
        }
    }

    fn encode(identity: Identity, code: u16) -> Result<u16, Error<I::Error>> {
        let max = identity.resolution.max_code();
        if code > max {
            return Err(Error::ValueOutOfRange { value: code, max });
        }
        Ok(identity.resolution.to_data_word(code))
    }
}

fn with_bit(reg: u16, bit: u16, set: bool) -> u16 {
    if set {
        reg | bit
    } else {
        reg & !bit
    }
}

/// Code for `millivolts` on a span of `full_scale_mv`, rounding down.
///
/// `None` when the voltage is at or above full scale.
#[must_use]
pub fn millivolts_to_code(
    resolution: Resolution,
    millivolts: u32,
    full_scale_mv: u32,
) -> Option<u16> {
    if millivolts >= full_scale_mv {
        return None;
    }
    let scaled = u64::from(millivolts).checked_shl(u32::from(resolution.bits()))?;
    let code = scaled.checked_div(u64::from(full_scale_mv))?;
    u16::try_from(code).ok()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::registers::{CMD_DAC0_DATA, I2C_ADDR_AGND};
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Records writes and answers reads from a small register file.
    #[derive(Default)]
    struct RegisterMock {
        writes: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
        regs: [u16; 16],
        fail_on_write: Option<usize>,
    }
    impl RegisterMock {
        fn with_id(id: u16) -> Self {
            let mut m = Self::default();
            m.regs[usize::from(CMD_DEVICE_ID)] = id;
            m
        }
    }
    impl ErrorType for RegisterMock {
        type Error = ErrorKind;
    }
    impl I2c for RegisterMock {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut pointer = 0usize;
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(data) => {
                        if self.fail_on_write == Some(self.writes.len()) {
                            return Err(ErrorKind::Other);
                        }
                        pointer = usize::from(data[0]);
                        self.writes.push((address, data.to_vec()));
                    }
                    Operation::Read(buf) => {
                        buf.copy_from_slice(&self.regs[pointer].to_be_bytes());
                    }
                }
            }
            Ok(())
        }
    }

    struct CountingDelay {
        us: u32,
    }
    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.us += ns / 1_000;
        }
    }

    fn ready(id: u16) -> Dac6050x<RegisterMock> {
        let mut dac = Dac6050x::new(RegisterMock::with_id(id), DacConfig::default());
        dac.setup().unwrap();
        dac
    }

    #[test]
    fn setup_writes_config_then_gain_then_two_midscale_outputs() {
        let dac = ready(0x2800);
        let writes = dac.release().writes;
        // CONFIG, GAIN, DEVICE_ID pointer, DAC0, DAC1
        assert_eq!(writes.len(), 5);
        assert_eq!(writes[0].1, [CMD_CONFIG, 0x01, 0x00]);
        assert_eq!(writes[1].1, [CMD_GAIN, 0x01, 0xFF]);
        assert_eq!(writes[2].1, [CMD_DEVICE_ID]);
        assert_eq!(writes[3].1, [CMD_DAC0_DATA, 0x7F, 0xF0]);
        assert_eq!(writes[4].1, [CMD_DAC0_DATA + 1, 0x7F, 0xF0]);
        for (addr, _) in &writes {
            assert_eq!(*addr, I2C_ADDR_AGND);
        }
    }
    #[test]
    fn setup_records_identity() {
        let dac = ready(0x2800);
        assert_eq!(dac.device_id(), Some(DeviceId::new(0x2800)));
        assert_eq!(dac.channel_count(), Some(8));
        assert_eq!(dac.resolution(), Some(Resolution::Bits12));
    }
    #[test]
    fn single_channel_part_gets_one_default_output() {
        let dac = ready(0x2100);
        let writes = dac.release().writes;
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[3].1, [CMD_DAC0_DATA, 0x7F, 0xF0]);
    }
    #[test]
    fn setup_rejects_absent_device() {
        let mut dac = Dac6050x::new(RegisterMock::with_id(0xFFFF), DacConfig::default());
        assert_eq!(dac.setup(), Err(Error::UnsupportedDevice(0xFFFF)));
        assert_eq!(dac.device_id(), None);
        // No default outputs after a failed identification.
        assert_eq!(dac.release().writes.len(), 3);
    }
    #[test]
    fn setup_stops_at_first_bus_failure() {
        let mut mock = RegisterMock::with_id(0x2800);
        mock.fail_on_write = Some(1);
        let mut dac = Dac6050x::new(mock, DacConfig::default());
        assert_eq!(dac.setup(), Err(Error::Bus(ErrorKind::Other)));
        assert_eq!(dac.device_id(), None);
        assert_eq!(dac.release().writes.len(), 1);
    }
    #[test]
    fn output_before_setup_is_not_initialised() {
        let mut dac = Dac6050x::new(RegisterMock::with_id(0x2800), DacConfig::default());
        assert_eq!(dac.set_output(0, 100), Err(Error::NotInitialized));
        assert!(dac.release().writes.is_empty());
    }
    #[test]
    fn twelve_bit_output_is_shifted_into_msbs() {
        let mut dac = ready(0x2800);
        dac.set_output(3, 0x0ABC).unwrap();
        let writes = dac.release().writes;
        assert_eq!(writes.last().unwrap().1, [CMD_DAC0_DATA + 3, 0xAB, 0xC0]);
    }
    #[test]
    fn sixteen_bit_output_is_sent_verbatim() {
        let mut dac = ready(0x0800);
        dac.set_output(7, 0xBEEF).unwrap();
        let writes = dac.release().writes;
        assert_eq!(writes.last().unwrap().1, [CMD_DAC0_DATA + 7, 0xBE, 0xEF]);
    }
    #[test]
    fn rejected_parameters_cause_no_bus_traffic() {
        let mut dac = ready(0x2400);
        assert_eq!(
            dac.set_output(4, 0),
            Err(Error::InvalidChannel { channel: 4, available: 4 })
        );
        assert_eq!(
            dac.set_output(0, 4096),
            Err(Error::ValueOutOfRange { value: 4096, max: 4095 })
        );
        assert_eq!(dac.release().writes.len(), 5);
    }
    #[test]
    fn millivolts_use_channel_gain() {
        // Default: 2.5 V / 2 × 2 = 2500 mV span, 1250 mV is mid-scale.
        let mut dac = ready(0x2800);
        dac.set_output_millivolts(0, 1_250).unwrap();
        dac.set_channel_gain(1, Gain::One).unwrap();
        // ×1 halves the span, so 1000 mV is 1000/1250 of full scale.
        dac.set_output_millivolts(1, 1_000).unwrap();
        let writes = dac.release().writes;
        let n = writes.len();
        assert_eq!(writes[n - 3].1, [CMD_DAC0_DATA, 0x80, 0x00]);
        assert_eq!(writes[n - 2].1, [CMD_GAIN, 0x01, 0xFD]);
        assert_eq!(writes[n - 1].1, [CMD_DAC0_DATA + 1, 0xCC, 0xC0]);
    }
    #[test]
    fn channel_gain_rejects_channels_the_part_lacks() {
        let config = DacConfig::default().with_gain(Gain::One);
        let mut dac = Dac6050x::new(RegisterMock::with_id(0x2400), config);
        assert_eq!(dac.channel_gain(0), Err(Error::NotInitialized));
        dac.setup().unwrap();
        assert_eq!(dac.channel_gain(3), Ok(Gain::One));
        // Channel 4 is on the register map but not on a 4-channel part.
        assert_eq!(
            dac.channel_gain(4),
            Err(Error::InvalidChannel { channel: 4, available: 4 })
        );
        // Bit 8 of GAIN is REF-DIV2, not a buffer gain.
        assert_eq!(
            dac.channel_gain(8),
            Err(Error::InvalidChannel { channel: 8, available: 4 })
        );
        assert_eq!(
            dac.channel_gain(16),
            Err(Error::InvalidChannel { channel: 16, available: 4 })
        );
    }
    #[test]
    fn millivolts_at_full_scale_are_rejected() {
        let mut dac = ready(0x2800);
        assert_eq!(
            dac.set_output_millivolts(0, 2_500),
            Err(Error::VoltageOutOfRange { millivolts: 2_500, full_scale_mv: 2_500 })
        );
    }
    #[test]
    fn sync_and_broadcast_bits_share_one_register() {
        let mut dac = ready(0x2800);
        dac.set_synchronous(2, true).unwrap();
        dac.set_broadcast_enabled(0, false).unwrap();
        dac.broadcast(0x0100).unwrap();
        dac.trigger_ldac().unwrap();
        let writes = dac.release().writes;
        let n = writes.len();
        assert_eq!(writes[n - 4].1, [CMD_SYNC, 0xFF, 0x04]);
        assert_eq!(writes[n - 3].1, [CMD_SYNC, 0xFE, 0x04]);
        assert_eq!(writes[n - 2].1, [CMD_BROADCAST, 0x10, 0x00]);
        assert_eq!(writes[n - 1].1, [CMD_TRIGGER, 0x00, 0x10]);
    }
    #[test]
    fn channel_power_down_keeps_reference_bit() {
        let mut dac = ready(0x2800);
        dac.set_channel_power(5, false).unwrap();
        dac.set_channel_power(5, true).unwrap();
        let writes = dac.release().writes;
        let n = writes.len();
        assert_eq!(writes[n - 2].1, [CMD_CONFIG, 0x01, 0x20]);
        assert_eq!(writes[n - 1].1, [CMD_CONFIG, 0x01, 0x00]);
    }
    #[test]
    fn reference_alarm_reads_status_bit() {
        let mut mock = RegisterMock::with_id(0x2800);
        mock.regs[usize::from(CMD_STATUS)] = 0x0001;
        let mut dac = Dac6050x::new(mock, DacConfig::default());
        assert!(dac.reference_alarm().unwrap());
    }
    #[test]
    fn soft_reset_waits_and_forgets_identity() {
        let mut dac = ready(0x2800);
        let mut delay = CountingDelay { us: 0 };
        dac.soft_reset(&mut delay).unwrap();
        assert_eq!(delay.us, SOFT_RESET_DELAY_US);
        assert_eq!(dac.device_id(), None);
        assert_eq!(dac.set_output(0, 1), Err(Error::NotInitialized));
        let writes = dac.release().writes;
        assert_eq!(writes.last().unwrap().1, [CMD_TRIGGER, 0x00, 0x0A]);
    }
    #[test]
    fn millivolt_conversion_rounds_down() {
        assert_eq!(millivolts_to_code(Resolution::Bits12, 0, 2_500), Some(0));
        assert_eq!(millivolts_to_code(Resolution::Bits12, 2_499, 2_500), Some(4094));
        assert_eq!(millivolts_to_code(Resolution::Bits16, 1_250, 2_500), Some(0x8000));
        assert_eq!(millivolts_to_code(Resolution::Bits12, 1, 0), None);
    }
}
