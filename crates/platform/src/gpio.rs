//! User I/O pad configuration
//!
//! Caravel's 38 user pads are configured through a per-pad control word
//! that is shifted into the pad ring by a serial transfer. Writing the
//! control registers has no effect until [`UserGpios::load_configs`] runs.

use crate::{ErrorType, GpioPin};

/// Pad mode, encoded as the Caravel `mprj_io` control word.
///
/// `Mgmt*` modes hand the pad to the management SoC, `User*` modes to the
/// user project (the FPU wrapper).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioMode {
    /// Management input, no pull resistor
    MgmtStdInputNoPull,
    /// Management input with pull-down
    MgmtStdInputPullDown,
    /// Management input with pull-up
    MgmtStdInputPullUp,
    /// Management push-pull output
    MgmtStdOutput,
    /// Management bidirectional
    MgmtStdBidirectional,
    /// Management analog
    MgmtStdAnalog,
    /// User input, no pull resistor
    UserStdInputNoPull,
    /// User input with pull-down
    UserStdInputPullDown,
    /// User input with pull-up
    UserStdInputPullUp,
    /// User push-pull output
    UserStdOutput,
    /// User bidirectional
    UserStdBidirectional,
    /// User output, also visible to the management input register
    UserStdOutMonitored,
    /// User analog
    UserStdAnalog,
}

impl GpioMode {
    /// Control-word encoding written to the pad's configuration register.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::MgmtStdInputNoPull => 0x0403,
            Self::MgmtStdInputPullDown => 0x0c01,
            Self::MgmtStdInputPullUp => 0x0801,
            Self::MgmtStdOutput => 0x1809,
            Self::MgmtStdBidirectional => 0x1801,
            Self::MgmtStdAnalog => 0x000b,
            Self::UserStdInputNoPull => 0x0402,
            Self::UserStdInputPullDown => 0x0c00,
            Self::UserStdInputPullUp => 0x0800,
            Self::UserStdOutput => 0x1808,
            Self::UserStdBidirectional => 0x1800,
            Self::UserStdOutMonitored => 0x1802,
            Self::UserStdAnalog => 0x000a,
        }
    }

    /// `true` if the pad is owned by the user project in this mode.
    #[must_use]
    pub const fn is_user(self) -> bool {
        // Bit 0 is the management-enable bit of the control word.
        self.bits() & 0x1 == 0
    }
}

/// User pad configuration and input sampling.
pub trait UserGpios: ErrorType {
    /// Stage `mode` for every user pad.
    fn configure_all(&mut self, mode: GpioMode) -> Result<(), Self::Error>;

    /// Stage `mode` for a single pad.
    fn configure(&mut self, pin: GpioPin, mode: GpioMode) -> Result<(), Self::Error>;

    /// Shift the staged configuration into the pad ring.
    fn load_configs(&mut self) -> Result<(), Self::Error>;

    /// Sample all pad inputs; bit `n` is pad `n` (bits 0–37).
    fn read_inputs(&mut self) -> Result<u64, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_modes_clear_management_bit() {
        assert!(GpioMode::UserStdBidirectional.is_user());
        assert!(GpioMode::UserStdInputPullUp.is_user());
        assert!(GpioMode::UserStdInputPullDown.is_user());
        assert!(!GpioMode::MgmtStdOutput.is_user());
        assert!(!GpioMode::MgmtStdInputPullUp.is_user());
    }

    #[test]
    fn fpu_pad_modes_have_expected_encoding() {
        assert_eq!(GpioMode::UserStdBidirectional.bits(), 0x1800);
        assert_eq!(GpioMode::UserStdInputPullUp.bits(), 0x0800);
        assert_eq!(GpioMode::UserStdInputPullDown.bits(), 0x0c00);
    }
}
