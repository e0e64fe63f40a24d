//! Driver for the Texas Instruments DACx0508 family over I²C
//!
//! Covers the DAC60508 (12-bit), DAC70508 (14-bit) and DAC80508 (16-bit),
//! and their four-channel DACx0504 siblings. The channel count and
//! resolution are read from the DEVICE_ID register at setup, so one
//! driver serves every part.
//!
//! # Architecture
//!
//! ```text
//! Application / firmware
//!         ↓
//! Dac6050x<I>        (driver: setup, output writes, per-channel control)
//!         ↓
//! embedded_hal::i2c::I2c  (any HAL's blocking I²C bus)
//! ```
//!
//! # Features
//!
//! - `std`: implement `std::error::Error` for [`Error`]
//! - `defmt`: `defmt::Format` derives and setup/reset log strings
//!
//! # Example
//!
//! ```no_run
//! use dac6050x::{Dac6050x, DacConfig, Gain};
//!
//! fn example<I: embedded_hal::i2c::I2c>(i2c: I) -> Result<(), dac6050x::Error<I::Error>> {
//!     let mut dac = Dac6050x::new(i2c, DacConfig::default().with_gain(Gain::Two));
//!     dac.setup()?;
//!     dac.set_output(0, 2048)?;
//!     Ok(())
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this driver crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod driver;
pub mod error;
pub mod registers;
pub mod types;

pub use config::DacConfig;
pub use driver::{millivolts_to_code, Dac6050x};
pub use error::Error;
pub use types::{AddressPin, DeviceId, Gain, OutOfRangeError, Resolution};
