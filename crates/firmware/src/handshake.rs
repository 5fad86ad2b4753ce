//! Handshake bit on the management GPIO.

/// Level driven on the management GPIO to pace the external harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handshake(bool);

impl Handshake {
    /// Low level
    pub const LOW: Self = Self(false);
    /// High level
    pub const HIGH: Self = Self(true);

    /// Handshake at `level`.
    #[must_use]
    pub const fn new(level: bool) -> Self {
        Self(level)
    }

    /// Flip the level.
    pub fn toggle(&mut self) {
        self.0 = !self.0;
    }

    /// Level as written to the GPIO.
    #[must_use]
    pub const fn is_high(self) -> bool {
        self.0
    }
}

impl From<Handshake> for bool {
    fn from(handshake: Handshake) -> Self {
        handshake.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips() {
        let mut hs = Handshake::default();
        assert_eq!(hs, Handshake::LOW);
        hs.toggle();
        assert!(hs.is_high());
        hs.toggle();
        assert!(!bool::from(hs));
    }
}
