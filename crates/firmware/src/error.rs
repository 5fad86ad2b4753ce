//! Driver error types.

/// A command-table symbol with no matching opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("unknown FPU opcode {0:?}")]
pub struct UnknownOpcode(pub char);

/// A bounded collection is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("vector table holds at most {capacity} vectors")]
pub struct CapacityError {
    /// Maximum number of entries.
    pub capacity: usize,
}

/// Errors reported by the FPU test driver.
///
/// `E` is the hardware handle's own error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FpuError<E> {
    /// A firmware-API call failed.
    #[error("firmware API call failed: {0:?}")]
    Hardware(E),
    /// The opcode symbol is not in the command table.
    #[error("unknown FPU opcode {0:?}")]
    UnknownOpcode(char),
    /// The done bit never went high within the poll budget.
    #[error("done mask {mask:#x} not raised after {polls} polls")]
    DoneTimeout {
        /// Pad mask that was waited on.
        mask: u64,
        /// Number of input samples taken.
        polls: u32,
    },
    /// More vectors than the table can hold.
    #[error("vector table holds at most {capacity} vectors")]
    TableFull {
        /// Table capacity.
        capacity: usize,
    },
    /// The run needs at least one vector to prime the FPU.
    #[error("vector table is empty")]
    EmptyTable,
}

impl<E> FpuError<E> {
    /// Short static description, for logs that cannot format `E`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hardware(_) => "firmware API call failed",
            Self::UnknownOpcode(_) => "unknown FPU opcode",
            Self::DoneTimeout { .. } => "done bit timeout",
            Self::TableFull { .. } => "vector table full",
            Self::EmptyTable => "vector table empty",
        }
    }
}

impl<E> From<UnknownOpcode> for FpuError<E> {
    fn from(err: UnknownOpcode) -> Self {
        Self::UnknownOpcode(err.0)
    }
}

impl<E> From<CapacityError> for FpuError<E> {
    fn from(err: CapacityError) -> Self {
        Self::TableFull {
            capacity: err.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_payload() {
        let err: FpuError<()> = UnknownOpcode('x').into();
        assert_eq!(err, FpuError::UnknownOpcode('x'));
        let err: FpuError<()> = CapacityError { capacity: 32 }.into();
        assert_eq!(err, FpuError::TableFull { capacity: 32 });
    }

    #[test]
    fn test_display_messages() {
        let err: FpuError<()> = FpuError::DoneTimeout {
            mask: 0b1,
            polls: 10,
        };
        assert_eq!(err.to_string(), "done mask 0x1 not raised after 10 polls");
        assert_eq!(UnknownOpcode('x').to_string(), "unknown FPU opcode 'x'");
    }

    #[test]
    fn test_static_descriptions_ignore_payload() {
        let hw: FpuError<u8> = FpuError::Hardware(7);
        assert_eq!(hw.as_str(), "firmware API call failed");
        let full: FpuError<u8> = FpuError::TableFull { capacity: 16 };
        assert_eq!(full.as_str(), "vector table full");
        assert_eq!(FpuError::<u8>::EmptyTable.as_str(), "vector table empty");
        assert_eq!(
            FpuError::<u8>::DoneTimeout { mask: 1, polls: 0 }.as_str(),
            "done bit timeout"
        );
    }
}
