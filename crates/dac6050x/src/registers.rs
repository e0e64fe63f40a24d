//! DACx0508 register map
//!
//! Reference: Texas Instruments DACx0508 datasheet (SLASEL8), Section 8.6
//! (Register Map) and Section 8.5.2 (I²C Serial Interface).
//!
//! # Framing
//!
//! Every transaction starts with a 1-byte command that doubles as the
//! register pointer. Writes follow it with the 16-bit register value,
//! MSB first. Reads send the pointer alone, then clock back two bytes,
//! MSB first.
//!
//! # Data alignment
//!
//! The DACn data registers are always 16 bits wide. A 12-bit device
//! (DAC60508) reads its code from bits \[15:4\], a 14-bit device (DAC70508)
//! from bits \[15:2\]; the low bits are don't-care.

// ---------------------------------------------------------------------------
// I²C addresses
// ---------------------------------------------------------------------------

/// 7-bit I²C address with A0 tied to AGND.
pub const I2C_ADDR_AGND: u8 = 0x48;
/// 7-bit I²C address with A0 tied to VIO.
pub const I2C_ADDR_VIO: u8 = 0x49;
/// 7-bit I²C address with A0 tied to SDA.
pub const I2C_ADDR_SDA: u8 = 0x4A;
/// 7-bit I²C address with A0 tied to SCL.
pub const I2C_ADDR_SCL: u8 = 0x4B;

// ---------------------------------------------------------------------------
// Command / register pointer bytes
// ---------------------------------------------------------------------------

/// No operation.
pub const CMD_NOOP: u8 = 0x00;
/// Device identification (read-only).
pub const CMD_DEVICE_ID: u8 = 0x01;
/// Synchronous update and broadcast enables.
pub const CMD_SYNC: u8 = 0x02;
/// Reference and per-channel power-down.
pub const CMD_CONFIG: u8 = 0x03;
/// Reference divider and per-channel output buffer gain.
pub const CMD_GAIN: u8 = 0x04;
/// Soft reset and LDAC trigger (write-only).
pub const CMD_TRIGGER: u8 = 0x05;
/// Broadcast data, applied to every channel with BRDCAST-EN set.
pub const CMD_BROADCAST: u8 = 0x06;
/// Reference alarm status (read-only).
pub const CMD_STATUS: u8 = 0x07;
/// DAC0 data. DACn data lives at `CMD_DAC0_DATA + n`.
pub const CMD_DAC0_DATA: u8 = 0x08;

/// Highest channel count in the family (DACx0508).
pub const MAX_CHANNELS: u8 = 8;

// ---------------------------------------------------------------------------
// DEVICE_ID fields
// ---------------------------------------------------------------------------

/// DEVICE_ID\[14:12\]: resolution code.
pub const DEVICE_ID_RESOLUTION_MASK: u16 = 0x7000;
/// Shift for [`DEVICE_ID_RESOLUTION_MASK`].
pub const DEVICE_ID_RESOLUTION_SHIFT: u16 = 12;
/// DEVICE_ID\[11:8\]: number of channels.
pub const DEVICE_ID_NUM_CHANNELS_MASK: u16 = 0x0F00;
/// Shift for [`DEVICE_ID_NUM_CHANNELS_MASK`].
pub const DEVICE_ID_NUM_CHANNELS_SHIFT: u16 = 8;
/// DEVICE_ID\[7\]: RSTSEL, 1 = outputs reset to mid-scale, 0 = zero-scale.
pub const DEVICE_ID_RSTSEL_MASK: u16 = 0x0080;
/// Shift for [`DEVICE_ID_RSTSEL_MASK`].
pub const DEVICE_ID_RSTSEL_SHIFT: u16 = 7;

/// Resolution code for a 16-bit device (DAC80508).
pub const RESOLUTION_16_BIT: u8 = 0b000;
/// Resolution code for a 14-bit device (DAC70508).
pub const RESOLUTION_14_BIT: u8 = 0b001;
/// Resolution code for a 12-bit device (DAC60508).
pub const RESOLUTION_12_BIT: u8 = 0b010;

// ---------------------------------------------------------------------------
// SYNC fields
// ---------------------------------------------------------------------------

/// SYNC reset value: every channel listens to broadcast, none is synchronous.
pub const SYNC_RESET_VALUE: u16 = 0xFF00;
/// Shift of the BRDCAST-EN byte; channel n is bit `n + 8`.
pub const SYNC_BROADCAST_EN_SHIFT: u8 = 8;

// ---------------------------------------------------------------------------
// CONFIG fields
// ---------------------------------------------------------------------------

/// CONFIG\[8\]: power down the internal 2.5 V reference.
pub const CONFIG_REF_PWDWN: u16 = 0x0100;
/// CONFIG\[7:0\]: DACn-PWDWN bits, channel n is bit n.
pub const CONFIG_DAC_PWDWN_MASK: u16 = 0x00FF;

// ---------------------------------------------------------------------------
// GAIN fields
// ---------------------------------------------------------------------------

/// GAIN\[8\]: divide the reference by two.
pub const GAIN_REF_DIV2: u16 = 0x0100;
/// GAIN\[7:0\]: BUFFn-GAIN bits, channel n is bit n (0 = ×1, 1 = ×2).
pub const GAIN_BUFF_GAIN_MASK: u16 = 0x00FF;

// ---------------------------------------------------------------------------
// TRIGGER / STATUS fields
// ---------------------------------------------------------------------------

/// TRIGGER\[4\]: latch every synchronous channel.
pub const TRIGGER_LDAC: u16 = 0x0010;
/// TRIGGER\[3:0\]: soft-reset key.
pub const TRIGGER_SOFT_RESET: u16 = 0x000A;
/// STATUS\[0\]: REF-ALARM, set while the reference headroom is insufficient.
pub const STATUS_REF_ALARM: u16 = 0x0001;

/// Settling time after a soft reset before the device accepts commands.
pub const SOFT_RESET_DELAY_US: u32 = 250;

/// Pointer byte of the data register for `channel`.
///
/// Callers bound `channel` by [`MAX_CHANNELS`] first; the result is then
/// at most `0x0F`.
#[inline]
#[must_use]
pub const fn dac_data_command(channel: u8) -> u8 {
    CMD_DAC0_DATA.wrapping_add(channel)
}

/// Bit for `channel` in an 8-bit per-channel field (CONFIG, GAIN, SYNC-EN).
#[inline]
#[must_use]
pub const fn channel_bit(channel: u8) -> u16 {
    1u16.wrapping_shl(channel as u32)
}
