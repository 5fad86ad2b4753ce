//! Logic-analyzer register access
//!
//! On Caravel the 128-bit logic-analyzer bus is a plain bank of registers
//! shared between the management SoC and the user project. The FPU wrapper
//! uses it as a command/data bus, not for passive capture.

use crate::{ErrorType, LaChannel, LaGroup};

/// Logic-analyzer data and direction registers.
pub trait LogicAnalyzer: ErrorType {
    /// Drive `value` onto a 32-bit channel.
    fn write(&mut self, channel: LaChannel, value: u32) -> Result<(), Self::Error>;

    /// Sample a 32-bit channel.
    fn read(&mut self, channel: LaChannel) -> Result<u32, Self::Error>;

    /// Set the output-enable mask of a 32-bit group.
    ///
    /// A set bit makes that LA line driven by the management SoC.
    fn output_enable(&mut self, group: LaGroup, mask: u32) -> Result<(), Self::Error>;
}
