//! Caravel FPU test firmware
//!
//! Drives the user-project FPU through the management SoC's logic analyzer:
//! operands on LA channels 0 and 1, a setup/strobe command on channel 2, the
//! result read back from channel 3. A handshake bit on the management GPIO
//! paces the external test bench, which checks the results. In pad-driven
//! mode ([`run_gpio_mode`]) the bench feeds the FPU through the user pads and
//! the firmware only paces it, five handshake writes per vector.
//!
//! # Architecture
//!
//! ```text
//! main.rs (hardware entry)
//!         ↓
//! driver (typestate: configure → prime | start_pads → run → finish)
//!         ↓
//! protocol (register-level sequences)
//!         ↓
//! platform::FirmwareApis (Caravel MMIO | recording mock)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build the management-core binary (riscv32imc, defmt over UART)
//! - `gpio-mode` - Binary paces the pad-driven bench instead of driving the LA
//! - `tracing` - Route driver logging through `tracing` on host builds
//! - `std` - Enable standard library (host testing)
//!
//! # Example
//!
//! ```no_run
//! use fpu_firmware::{run, DriverConfig, VectorTable};
//! use platform::mocks::RecordingApis;
//!
//! let mut hw = RecordingApis::new();
//! let report = run(&mut hw, DriverConfig::default(), &VectorTable::reference())?;
//! assert_eq!(report.records.len(), 9);
//! # Ok::<(), fpu_firmware::FpuError<platform::mocks::MockFault>>(())
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod config;
pub mod driver;
pub mod error;
pub mod handshake;
pub mod opcode;
pub mod protocol;
pub mod report;
pub mod vector;

pub use config::{
    CompletionMode, DelayConfig, DriverConfig, GpioModeConfig, GpioPhase, OpcodePolicy, PadSelect,
    PinConfig,
};
pub use driver::{
    run, run_gpio_mode, Configured, FpuTestDriver, Idle, PadDriven, Running, Unconfigured,
};
pub use error::{CapacityError, FpuError, UnknownOpcode};
pub use handshake::Handshake;
pub use opcode::{CommandCodes, FpuOp};
pub use report::{OperationRecord, RunReport};
pub use vector::{TestVector, VectorTable, MAX_VECTORS, REFERENCE_VECTORS};

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Host builds only; safe to call more than once.
#[cfg(feature = "tracing")]
pub fn init_host_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
