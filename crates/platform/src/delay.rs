//! Fixed-duration waits
//!
//! The firmware only ever waits a fixed number of "dummy" units. What a unit
//! is worth depends on the target: on the management SoC it is one pass of
//! a calibrated busy loop, in simulation it is whatever the testbench clock
//! makes of that loop.

use embedded_hal::delay::DelayNs;

/// Opaque fixed-duration wait.
pub trait DummyDelay {
    /// Block for `units` dummy-delay units.
    fn dummy_delay(&mut self, units: u32);
}

/// [`DummyDelay`] over an embedded-hal delay provider.
pub struct HalDelay<D> {
    delay: D,
    ns_per_unit: u32,
}

impl<D: DelayNs> HalDelay<D> {
    /// One unit lasts `ns_per_unit` nanoseconds.
    pub fn new(delay: D, ns_per_unit: u32) -> Self {
        Self { delay, ns_per_unit }
    }

    /// Total wait for `units`, saturating at `u32::MAX` ns.
    #[must_use]
    pub fn units_to_ns(&self, units: u32) -> u32 {
        units.saturating_mul(self.ns_per_unit)
    }
}

impl<D: DelayNs> DummyDelay for HalDelay<D> {
    fn dummy_delay(&mut self, units: u32) {
        let ns = self.units_to_ns(units);
        self.delay.delay_ns(ns);
    }
}

/// Busy-loop delay for the management core: one unit is `spins_per_unit`
/// iterations of a loop the optimiser cannot remove.
pub struct SpinDelay {
    spins_per_unit: u32,
}

impl SpinDelay {
    /// Create a spin delay.
    pub const fn new(spins_per_unit: u32) -> Self {
        Self { spins_per_unit }
    }
}

impl DummyDelay for SpinDelay {
    fn dummy_delay(&mut self, units: u32) {
        for _ in 0..units {
            for spin in 0..self.spins_per_unit {
                core::hint::black_box(spin);
            }
        }
    }
}
