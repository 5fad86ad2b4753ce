//! Run results.

use heapless::Vec;

use crate::handshake::Handshake;
use crate::vector::{TestVector, MAX_VECTORS};

/// One main-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperationRecord {
    /// Position in the vector table
    pub index: usize,
    /// Vector driven
    pub vector: TestVector,
    /// Word read from the result channel, or from pads 31:0 in pad-driven mode
    pub result: u32,
    /// Handshake level written after the operation (first phase in pad-driven mode)
    pub handshake: Handshake,
}

impl OperationRecord {
    /// `Some(true)` if the result matches the vector's reference value.
    #[must_use]
    pub fn matches_expected(&self) -> Option<bool> {
        self.vector.check(self.result)
    }
}

/// Everything observed during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Result of the priming operation (vector 0); `None` in pad-driven mode
    pub priming_result: Option<u32>,
    /// Main-loop iterations, in order
    pub records: Vec<OperationRecord, MAX_VECTORS>,
    /// Level written after the final hold
    pub final_handshake: Handshake,
}

impl RunReport {
    /// Records whose result differs from the reference value.
    pub fn mismatches(&self) -> impl Iterator<Item = &OperationRecord> {
        self.records
            .iter()
            .filter(|record| record.matches_expected() == Some(false))
    }

    /// `true` if no record contradicts its reference value.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches().next().is_none()
    }

    /// Number of records that carried a reference value.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.matches_expected().is_some())
            .count()
    }
}
