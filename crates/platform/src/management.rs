//! Management GPIO and housekeeping control
//!
//! The management GPIO is a single pad owned by the management SoC and
//! watched by the verification harness. It is the only driver-to-harness
//! signalling path.

use embedded_hal::digital::OutputPin;

use crate::ErrorType;

/// Single management output line.
pub trait ManagementGpio: ErrorType {
    /// Turn the management pad into an output.
    fn enable_output(&mut self) -> Result<(), Self::Error>;

    /// Drive the management pad.
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// Housekeeping SPI controller.
pub trait Housekeeping: ErrorType {
    /// Enable or disable the housekeeping SPI. Disabling it frees its pads
    /// (`mprj_io[4:1]`) for user use.
    fn enable_hk_spi(&mut self, enable: bool) -> Result<(), Self::Error>;
}

/// [`ManagementGpio`] over any embedded-hal output pin.
///
/// The pin is assumed to already be an output, so `enable_output` is a no-op.
pub struct PinManagementGpio<P> {
    pin: P,
}

impl<P: OutputPin> PinManagementGpio<P> {
    /// Wrap a configured output pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Return the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ErrorType for PinManagementGpio<P> {
    type Error = P::Error;
}

impl<P: OutputPin> ManagementGpio for PinManagementGpio<P> {
    fn enable_output(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        self.pin.set_state(high.into())
    }
}
