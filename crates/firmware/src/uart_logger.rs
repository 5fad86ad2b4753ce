//! defmt transport over the management-SoC UART.

use core::cell::UnsafeCell;
use core::sync::atomic::{compiler_fence, AtomicBool, Ordering};

use platform::{RegisterMap, UartTx, VolatileBus};

#[defmt::global_logger]
struct UartLogger;

struct EncoderCell(UnsafeCell<defmt::Encoder>);

// SAFETY: the management core is single-hart and the firmware enables no
// interrupts, so `acquire`/`release` are never re-entered.
unsafe impl Sync for EncoderCell {}

static TAKEN: AtomicBool = AtomicBool::new(false);
static ENCODER: EncoderCell = EncoderCell(UnsafeCell::new(defmt::Encoder::new()));

fn write_bytes(bytes: &[u8]) {
    // SAFETY: the UART registers of `RegisterMap::CARAVEL` are valid word
    // registers, and only the logger writes them.
    let bus = unsafe { VolatileBus::new() };
    // A stuck transmitter drops the rest of the chunk; there is nowhere to
    // report it.
    UartTx::new(bus, &RegisterMap::CARAVEL).write_bytes(bytes).ok();
}

/// Park the hart, as `panic-halt` does.
fn halt() -> ! {
    loop {
        compiler_fence(Ordering::SeqCst);
    }
}

// SAFETY: frames are strictly acquire → write* → release on one hart.
unsafe impl defmt::Logger for UartLogger {
    fn acquire() {
        // riscv32imc has no CAS; load/store is enough without interrupts.
        if TAKEN.load(Ordering::Acquire) {
            // Nested log call: the frame in progress would be corrupted.
            halt();
        }
        TAKEN.store(true, Ordering::Release);
        // SAFETY: guarded by TAKEN.
        unsafe { (*ENCODER.0.get()).start_frame(write_bytes) }
    }

    unsafe fn flush() {}

    unsafe fn release() {
        // SAFETY: caller holds the logger.
        unsafe { (*ENCODER.0.get()).end_frame(write_bytes) }
        TAKEN.store(false, Ordering::Release);
    }

    unsafe fn write(bytes: &[u8]) {
        // SAFETY: caller holds the logger.
        unsafe { (*ENCODER.0.get()).write(bytes, write_bytes) }
    }
}
