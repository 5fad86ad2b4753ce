//! Firmware-API layer for the Caravel management SoC
//!
//! This crate expresses the management core's firmware APIs (logic-analyzer
//! access, user-pad configuration, the management GPIO, housekeeping SPI
//! control and fixed delays) as traits, so that test firmware can be written
//! against a hardware handle and exercised without hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Test firmware (fpu-firmware crate)
//!         ↓
//! Firmware-API traits (this crate)
//!         ↓
//! Backends: mmio::Caravel (volatile registers) | mocks::RecordingApis (host)
//! ```
//!
//! # Traits
//!
//! - [`LogicAnalyzer`] - 4 × 32-bit LA data channels and direction masks
//! - [`UserGpios`] - user pad modes and input sampling
//! - [`ManagementGpio`] - the single harness-visible handshake line
//! - [`Housekeeping`] - housekeeping SPI enable
//! - [`DummyDelay`] - opaque fixed-duration waits
//! - [`FirmwareApis`] - all of the above, one error type
//!
//! # Features
//!
//! - `std`: recording mock for host test suites
//! - `defmt`: `defmt::Format` derives on all public types
//!
//! # Example
//!
//! ```no_run
//! use platform::{FirmwareApis, LaChannel};
//!
//! fn pulse<H: FirmwareApis>(hw: &mut H) -> Result<(), H::Error> {
//!     hw.write(LaChannel::COMMAND, 0x101)?;
//!     hw.dummy_delay(1);
//!     hw.write(LaChannel::COMMAND, 0x000)
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod delay;
pub mod gpio;
pub mod la;
pub mod management;
pub mod mmio;
pub mod mocks;
pub mod types;

pub use delay::{DummyDelay, HalDelay, SpinDelay};
pub use gpio::{GpioMode, UserGpios};
pub use la::LogicAnalyzer;
pub use management::{Housekeeping, ManagementGpio, PinManagementGpio};
pub use mmio::{Caravel, MmioError, RegisterBus, RegisterMap, UartTx, VolatileBus};
pub use types::{GpioPin, LaChannel, LaGroup, OutOfRangeError};

/// Error type shared by a firmware-API implementation.
pub trait ErrorType {
    /// Error type
    type Error: core::fmt::Debug;
}

/// Complete hardware handle: every firmware API behind one error type.
///
/// Blanket-implemented; any type implementing the individual traits is a
/// `FirmwareApis`.
pub trait FirmwareApis:
    LogicAnalyzer + UserGpios + ManagementGpio + Housekeeping + DummyDelay
{
}

impl<T> FirmwareApis for T where
    T: LogicAnalyzer + UserGpios + ManagementGpio + Housekeeping + DummyDelay
{
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

impl<T: LogicAnalyzer + ?Sized> LogicAnalyzer for &mut T {
    fn write(&mut self, channel: LaChannel, value: u32) -> Result<(), Self::Error> {
        T::write(self, channel, value)
    }

    fn read(&mut self, channel: LaChannel) -> Result<u32, Self::Error> {
        T::read(self, channel)
    }

    fn output_enable(&mut self, group: LaGroup, mask: u32) -> Result<(), Self::Error> {
        T::output_enable(self, group, mask)
    }
}

impl<T: UserGpios + ?Sized> UserGpios for &mut T {
    fn configure_all(&mut self, mode: GpioMode) -> Result<(), Self::Error> {
        T::configure_all(self, mode)
    }

    fn configure(&mut self, pin: GpioPin, mode: GpioMode) -> Result<(), Self::Error> {
        T::configure(self, pin, mode)
    }

    fn load_configs(&mut self) -> Result<(), Self::Error> {
        T::load_configs(self)
    }

    fn read_inputs(&mut self) -> Result<u64, Self::Error> {
        T::read_inputs(self)
    }
}

impl<T: ManagementGpio + ?Sized> ManagementGpio for &mut T {
    fn enable_output(&mut self) -> Result<(), Self::Error> {
        T::enable_output(self)
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        T::set_level(self, high)
    }
}

impl<T: Housekeeping + ?Sized> Housekeeping for &mut T {
    fn enable_hk_spi(&mut self, enable: bool) -> Result<(), Self::Error> {
        T::enable_hk_spi(self, enable)
    }
}

impl<T: DummyDelay + ?Sized> DummyDelay for &mut T {
    fn dummy_delay(&mut self, units: u32) {
        T::dummy_delay(self, units);
    }
}
