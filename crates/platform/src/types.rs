//! Register-space newtypes for compile-time safety.
//!
//! These zero-cost wrappers keep out-of-range indices away from the
//! memory-mapped register blocks:
//! - `LaChannel`: one of the four 32-bit logic-analyzer data words
//! - `LaGroup`: one of the four 32-bit output-enable groups
//! - `GpioPin`: a Caravel user I/O pad, 0–37

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} is outside {}..={}", self.value, self.min, self.max)
    }
}

// ── LaChannel ────────────────────────────────────────────────────────────────

/// Logic-analyzer data channel (32-bit word index into the 128-bit LA bus).
///
/// The FPU wrapper assigns the channels as follows:
///
/// | Channel | Direction | Use |
/// |---------|-----------|-----|
/// | 0 | mgmt → FPU | operand 1 |
/// | 1 | mgmt → FPU | operand 2 |
/// | 2 | mgmt → FPU | command (setup / strobe codes) |
/// | 3 | FPU → mgmt | result |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct LaChannel(u8);

impl LaChannel {
    /// Number of 32-bit channels on the LA bus.
    pub const COUNT: u8 = 4;

    /// Operand 1 bus.
    pub const OPERAND1: Self = Self(0);
    /// Operand 2 bus.
    pub const OPERAND2: Self = Self(1);
    /// Command / opcode-strobe bus.
    pub const COMMAND: Self = Self(2);
    /// Result bus.
    pub const RESULT: Self = Self(3);

    /// Create a channel index, clamping values above 3 to 3.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        if index > 3 {
            Self(3)
        } else {
            Self(index)
        }
    }

    /// Create a channel index, returning an error if `index > 3`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `index` is not a valid channel.
    pub fn try_new(index: u8) -> Result<Self, OutOfRangeError> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(OutOfRangeError {
                value: u32::from(index),
                min: 0,
                max: 3,
            })
        }
    }

    /// Return the raw channel index (0–3).
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }
}

// ── LaGroup ──────────────────────────────────────────────────────────────────

/// Logic-analyzer output-enable group.
///
/// Each group covers 32 bits of the 128-bit LA space (group 0 = bits 31:0,
/// group 3 = bits 127:96) and carries its own direction mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct LaGroup(u8);

impl LaGroup {
    /// Number of output-enable groups.
    pub const COUNT: u8 = 4;

    /// Create a group index, clamping values above 3 to 3.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        if index > 3 {
            Self(3)
        } else {
            Self(index)
        }
    }

    /// Create a group index, returning an error if `index > 3`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `index` is not a valid group.
    pub fn try_new(index: u8) -> Result<Self, OutOfRangeError> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(OutOfRangeError {
                value: u32::from(index),
                min: 0,
                max: 3,
            })
        }
    }

    /// All four groups in ascending order.
    #[must_use]
    pub fn all() -> [Self; 4] {
        [Self(0), Self(1), Self(2), Self(3)]
    }

    /// Return the raw group index (0–3).
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }
}

// ── GpioPin ──────────────────────────────────────────────────────────────────

/// Caravel user I/O pad (`mprj_io[0..=37]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct GpioPin(u8);

impl GpioPin {
    /// Number of user I/O pads.
    pub const COUNT: u8 = 38;

    /// Create a pad index, clamping values above 37 to 37.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        if index > 37 {
            Self(37)
        } else {
            Self(index)
        }
    }

    /// Create a pad index, returning an error if `index > 37`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `index` is not a valid pad.
    pub fn try_new(index: u8) -> Result<Self, OutOfRangeError> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(OutOfRangeError {
                value: u32::from(index),
                min: 0,
                max: 37,
            })
        }
    }

    /// Iterate over every user pad, 0 through 37.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Self)
    }

    /// Return the raw pad index (0–37).
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Bit mask of this pad within the 38-bit input word.
    #[must_use]
    pub fn mask(self) -> u64 {
        1u64.checked_shl(u32::from(self.0)).unwrap_or(0)
    }
}
