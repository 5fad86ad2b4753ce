//! Test vectors
//!
//! A [`TestVector`] is one opcode plus two raw IEEE-754 single-precision
//! operands. Vectors are kept in a single bounded [`VectorTable`], so the
//! opcode and operand columns can never disagree in length.

use heapless::Vec;

use crate::error::{CapacityError, UnknownOpcode};
use crate::opcode::FpuOp;

/// Maximum number of vectors in a [`VectorTable`].
pub const MAX_VECTORS: usize = 16;

/// One FPU operation to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestVector {
    /// Operation
    pub op: FpuOp,
    /// Operand 1 (f32 bit pattern), written to LA channel 0
    pub operand1: u32,
    /// Operand 2 (f32 bit pattern), written to LA channel 1
    pub operand2: u32,
    /// Reference-model result, if known
    pub expected: Option<u32>,
}

impl TestVector {
    /// Vector without a reference result.
    #[must_use]
    pub const fn new(op: FpuOp, operand1: u32, operand2: u32) -> Self {
        Self {
            op,
            operand1,
            operand2,
            expected: None,
        }
    }

    /// Attach the reference-model result.
    #[must_use]
    pub const fn with_expected(mut self, expected: u32) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Build from a table symbol (`'+'`, `'*'`, `'/'`, `'r'`, `'c'`).
    pub fn from_raw(symbol: char, operand1: u32, operand2: u32) -> Result<Self, UnknownOpcode> {
        Ok(Self::new(FpuOp::try_from(symbol)?, operand1, operand2))
    }

    /// `Some(true)` if `result` equals the reference, `None` without one.
    #[must_use]
    pub fn check(&self, result: u32) -> Option<bool> {
        self.expected.map(|expected| expected == result)
    }
}

/// Reference vectors: two adds, two multiplies, two divides, three square roots.
///
/// Expected values are the reference model's f32 results; the last square
/// root has a negative operand and yields the canonical quiet NaN.
pub const REFERENCE_VECTORS: [TestVector; 9] = [
    TestVector::new(FpuOp::Add, 0x4318_7d07, 0x439a_f94e).with_expected(0x43e7_37d2),
    TestVector::new(FpuOp::Add, 0xc41b_a642, 0x4312_92e9).with_expected(0xc3ee_0310),
    TestVector::new(FpuOp::Multiply, 0x4376_5d11, 0xc442_5485).with_expected(0xc83b_03dd),
    TestVector::new(FpuOp::Multiply, 0xc301_0b01, 0xc326_b2ff).with_expected(0x46a8_0eba),
    TestVector::new(FpuOp::Divide, 0xc38d_c2c6, 0xc398_3be4).with_expected(0x3f6e_6360),
    TestVector::new(FpuOp::Divide, 0xc441_751b, 0x4366_11ec).with_expected(0xc057_42d2),
    TestVector::new(FpuOp::SquareRoot, 0x4363_dfa8, 0x0000_0000).with_expected(0x4171_871b),
    TestVector::new(FpuOp::SquareRoot, 0x4331_1bc1, 0x0000_0000).with_expected(0x4154_ee6c),
    TestVector::new(FpuOp::SquareRoot, 0xc3fb_5d7a, 0x0000_0000).with_expected(0x7fc0_0000),
];

const _: () = assert!(REFERENCE_VECTORS.len() <= MAX_VECTORS);

/// Ordered, bounded table of test vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorTable {
    vectors: Vec<TestVector, MAX_VECTORS>,
}

impl VectorTable {
    /// Empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { vectors: Vec::new() }
    }

    /// The nine [`REFERENCE_VECTORS`].
    #[must_use]
    pub fn reference() -> Self {
        // Fits: checked at compile time above.
        Self {
            vectors: Vec::from_slice(&REFERENCE_VECTORS).unwrap_or_default(),
        }
    }

    /// Copy `vectors` into a new table.
    pub fn from_slice(vectors: &[TestVector]) -> Result<Self, CapacityError> {
        let mut table = Self::new();
        for vector in vectors {
            table.push(*vector)?;
        }
        Ok(table)
    }

    /// Append a vector.
    pub fn push(&mut self, vector: TestVector) -> Result<(), CapacityError> {
        self.vectors.push(vector).map_err(|_| CapacityError {
            capacity: MAX_VECTORS,
        })
    }

    /// Number of vectors; this is the main-loop bound.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// `true` if the table holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TestVector> {
        self.vectors.get(index)
    }

    /// First vector, used to prime the FPU.
    #[must_use]
    pub fn first(&self) -> Option<&TestVector> {
        self.vectors.first()
    }

    /// Iterate in table order.
    pub fn iter(&self) -> core::slice::Iter<'_, TestVector> {
        self.vectors.iter()
    }

    /// All vectors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[TestVector] {
        &self.vectors
    }
}

impl<'a> IntoIterator for &'a VectorTable {
    type Item = &'a TestVector;
    type IntoIter = core::slice::Iter<'a, TestVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table_layout() {
        let table = VectorTable::reference();
        assert_eq!(table.len(), 9);
        let ops: std::vec::Vec<char> = table.iter().map(|v| v.op.symbol()).collect();
        assert_eq!(ops, ['+', '+', '*', '*', '/', '/', 'r', 'r', 'r']);
        assert!(table.iter().all(|v| v.expected.is_some()));
        assert_eq!(table.first(), Some(&REFERENCE_VECTORS[0]));
        assert_eq!(table.get(8), Some(&REFERENCE_VECTORS[8]));
        assert_eq!(table.get(9), None);
        assert_eq!(table.as_slice(), &REFERENCE_VECTORS[..]);
    }

    #[test]
    fn test_square_root_vectors_ignore_operand2() {
        assert!(VectorTable::reference()
            .iter()
            .filter(|v| v.op == FpuOp::SquareRoot)
            .all(|v| v.operand2 == 0));
    }

    #[test]
    fn test_push_past_capacity_fails() {
        let mut table = VectorTable::new();
        for _ in 0..MAX_VECTORS {
            table.push(REFERENCE_VECTORS[0]).unwrap();
        }
        assert_eq!(
            table.push(REFERENCE_VECTORS[0]),
            Err(CapacityError {
                capacity: MAX_VECTORS
            })
        );
        assert_eq!(table.len(), MAX_VECTORS);
    }

    #[test]
    fn test_from_raw_symbol() {
        let vector = TestVector::from_raw('*', 1, 2).unwrap();
        assert_eq!(vector.op, FpuOp::Multiply);
        assert_eq!(TestVector::from_raw('x', 1, 2), Err(UnknownOpcode('x')));
    }

    #[test]
    fn test_check_against_reference() {
        let vector = REFERENCE_VECTORS[0];
        assert_eq!(vector.check(0x43e7_37d2), Some(true));
        assert_eq!(vector.check(0), Some(false));
        assert_eq!(TestVector::new(FpuOp::Add, 0, 0).check(0), None);
    }
}
