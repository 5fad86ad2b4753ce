//! FPU opcodes and their command-channel encoding
//!
//! Every operation is a two-phase command on LA channel 2: a *setup* code
//! written before the operands are latched and a *strobe* code written after.
//!
//! | Op | Symbol | Setup | Strobe |
//! |----|--------|-------|--------|
//! | Add | `+` | `0x100` | `0x101` |
//! | Multiply | `*` | `0x110` | `0x111` |
//! | Divide | `/` | `0x120` | `0x121` |
//! | SquareRoot | `r` | `0x130` | `0x131` |
//! | Compare | `c` | `0x140` | `0x141` |
//!
//! Bit 8 is the FPU-enable bit, bits 6:4 select the unit, bit 0 is the strobe.

use crate::error::UnknownOpcode;

/// Command word with only the FPU-enable bit set.
const COMMAND_ENABLE: u32 = 0x100;

/// Strobe bit of a command word.
const STROBE_BIT: u32 = 0x001;

/// Setup/strobe command pair for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandCodes {
    /// Written to the command channel before the operands.
    pub setup: u32,
    /// Written to the command channel after the operands; starts the operation.
    pub strobe: u32,
}

impl CommandCodes {
    const fn for_unit(unit: u32) -> Self {
        let setup = COMMAND_ENABLE | unit.wrapping_shl(4);
        Self {
            setup,
            strobe: setup | STROBE_BIT,
        }
    }
}

/// Operations implemented by the FPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FpuOp {
    /// Single-precision addition
    Add,
    /// Single-precision multiplication
    Multiply,
    /// Single-precision division
    Divide,
    /// Square root of operand 1 (operand 2 ignored)
    SquareRoot,
    /// Comparison
    Compare,
}

impl FpuOp {
    /// Every opcode, in unit order.
    pub const ALL: [Self; 5] = [
        Self::Add,
        Self::Multiply,
        Self::Divide,
        Self::SquareRoot,
        Self::Compare,
    ];

    /// Command codes written to the command channel for this opcode.
    #[must_use]
    pub const fn codes(self) -> CommandCodes {
        match self {
            Self::Add => CommandCodes::for_unit(0),
            Self::Multiply => CommandCodes::for_unit(1),
            Self::Divide => CommandCodes::for_unit(2),
            Self::SquareRoot => CommandCodes::for_unit(3),
            Self::Compare => CommandCodes::for_unit(4),
        }
    }

    /// 3-bit opcode the harness drives on pads 31:29 in pad-driven mode.
    #[must_use]
    pub const fn pad_opcode(self) -> u32 {
        match self {
            Self::Add => 0b000,
            Self::Multiply => 0b001,
            Self::Divide => 0b010,
            Self::SquareRoot => 0b011,
            Self::Compare => 0b100,
        }
    }

    /// One-character mnemonic used by the test tables.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::SquareRoot => 'r',
            Self::Compare => 'c',
        }
    }

    /// Short lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::SquareRoot => "sqrt",
            Self::Compare => "cmp",
        }
    }
}

impl TryFrom<char> for FpuOp {
    type Error = UnknownOpcode;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or(UnknownOpcode(symbol))
    }
}

impl core::fmt::Display for FpuOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
