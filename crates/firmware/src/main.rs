//! Caravel FPU test firmware - management-core entry point
//!
//! Runs the reference vectors once, reports over the UART with defmt, then
//! parks the core. The external bench watches the handshake GPIO. With the
//! `gpio-mode` feature the harness drives the FPU through the pads and the
//! firmware only paces it.

#![no_std]
#![no_main]

mod uart_logger;

#[cfg(not(feature = "gpio-mode"))]
use fpu_firmware::run;
#[cfg(feature = "gpio-mode")]
use fpu_firmware::run_gpio_mode as run;
use fpu_firmware::{DriverConfig, VectorTable};
use platform::{Caravel, RegisterMap, VolatileBus};
use riscv_rt::entry;

use panic_halt as _;

/// Busy-loop iterations per firmware delay unit.
const SPINS_PER_UNIT: u32 = 8;

#[entry]
fn main() -> ! {
    // SAFETY: this is the only code touching the management-SoC registers,
    // and every address in `RegisterMap::CARAVEL` is a valid word register.
    let bus = unsafe { VolatileBus::new() };
    let mut hw = Caravel::new(bus, RegisterMap::CARAVEL).with_spin_delay(SPINS_PER_UNIT);
    hw.enable_uart();

    defmt::info!("Caravel FPU test v{=str}", env!("CARGO_PKG_VERSION"));

    match run(&mut hw, DriverConfig::default(), &VectorTable::reference()) {
        Ok(report) if report.passed() => {
            defmt::info!("PASS: {=usize}/{=usize} checked", report.checked(), report.records.len());
        }
        Ok(report) => {
            for record in report.mismatches() {
                defmt::error!("mismatch: {}", record);
            }
            defmt::error!("FAIL: {=usize} mismatches", report.mismatches().count());
        }
        Err(err) => defmt::error!("run aborted: {}", err),
    }

    loop {
        continue;
    }
}
