//! Driver configuration
//!
//! [`DriverConfig::default`] reproduces the bench's fixed constants. Every
//! field is public so a board or a test can override individual values.

use platform::{GpioMode, GpioPin, LaChannel, LaGroup};

use crate::opcode::FpuOp;

// ─── Delays ──────────────────────────────────────────────────────────────────

/// Dummy-delay lengths, in opaque firmware delay units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayConfig {
    /// After each reset-sequence word
    pub reset_pulse: u32,
    /// After pad/LA configuration, before the first operation
    pub post_config: u32,
    /// After the priming operation, before the handshake goes high
    pub post_priming: u32,
    /// After the main loop, before the final handshake write
    pub final_hold: u32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            reset_pulse: 1,
            post_config: 100,
            post_priming: 100,
            final_hold: 100_000,
        }
    }
}

// ─── Completion ──────────────────────────────────────────────────────────────

/// Pad carrying the FPU's done bit.
pub const DONE_MASK: u64 = 0b00_0001;

/// Default poll budget for [`CompletionMode::WaitDone`].
pub const DEFAULT_DONE_POLLS: u32 = 10_000;

/// How an operation's result is collected after the strobe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompletionMode {
    /// Read the result channel right after the strobe.
    #[default]
    Immediate,
    /// Poll the pad inputs until every bit of `mask` is high, then read.
    WaitDone {
        /// Pads that must all read high
        mask: u64,
        /// Maximum number of input samples before giving up
        max_polls: u32,
    },
}

impl CompletionMode {
    /// Wait on [`DONE_MASK`] with the default poll budget.
    #[must_use]
    pub const fn wait_done() -> Self {
        Self::WaitDone {
            mask: DONE_MASK,
            max_polls: DEFAULT_DONE_POLLS,
        }
    }
}

/// Handling of command-table symbols with no opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpcodePolicy {
    /// Fail with `UnknownOpcode` before touching any channel.
    #[default]
    Reject,
    /// Write operands and read the result, but no setup or strobe code.
    LegacyPassthrough,
}

// ─── Pads and LA ─────────────────────────────────────────────────────────────

/// User pad layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    /// Mode applied to every user pad first
    pub base: GpioMode,
    /// Per-pad modes applied after `base`, in order
    pub overrides: &'static [(GpioPin, GpioMode)],
}

/// Pad 31 pulled up, pads 32..=37 pulled down, everything else bidirectional.
pub const FPU_PIN_OVERRIDES: [(GpioPin, GpioMode); 7] = [
    (GpioPin::new(31), GpioMode::UserStdInputPullUp),
    (GpioPin::new(32), GpioMode::UserStdInputPullDown),
    (GpioPin::new(33), GpioMode::UserStdInputPullDown),
    (GpioPin::new(34), GpioMode::UserStdInputPullDown),
    (GpioPin::new(35), GpioMode::UserStdInputPullDown),
    (GpioPin::new(36), GpioMode::UserStdInputPullDown),
    (GpioPin::new(37), GpioMode::UserStdInputPullDown),
];

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            base: GpioMode::UserStdBidirectional,
            overrides: &FPU_PIN_OVERRIDES,
        }
    }
}

// ─── Pad-driven (GPIO) mode ──────────────────────────────────────────────────

/// Source selected by the harness on pads 37:35.
///
/// `LogicAnalyzer` leaves the FPU on the LA bus. The other values make the
/// wrapper latch operand 1, operand 2 or the control word from pads 31:0, or
/// drive the result onto them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadSelect {
    /// `0b000`: LA-driven operation
    LogicAnalyzer,
    /// `0b010`: pads 31:0 carry operand 1
    In1,
    /// `0b110`: pads 31:0 carry operand 2
    In2,
    /// `0b100`: pads carry opcode, round mode and start
    Control,
    /// `0b101`: the FPU drives the result on pads 31:0
    Out,
}

/// Pads 37:35 in the 38-bit input word.
pub const PAD_SELECT_MASK: u64 = 0x38_0000_0000;
/// Bit position of pad 35.
pub const PAD_SELECT_SHIFT: u32 = 35;
/// Opcode field, pads 31:29.
pub const PAD_OPCODE_SHIFT: u32 = 29;
/// Round-mode field, pads 27:25.
pub const PAD_ROUND_SHIFT: u32 = 25;
/// Opcode and round-mode fields of the low pad word.
pub const PAD_CONTROL_MASK: u32 = 0xEE00_0000;
/// Pad 32 marks the control word valid.
pub const PAD_START: GpioPin = GpioPin::new(32);
/// Round mode driven during the control phase.
pub const DEFAULT_ROUND_MODE: u32 = 0b001;

impl PadSelect {
    /// Value on pads 37:35.
    #[must_use]
    pub const fn bits(self) -> u64 {
        match self {
            Self::LogicAnalyzer => 0b000,
            Self::In1 => 0b010,
            Self::In2 => 0b110,
            Self::Control => 0b100,
            Self::Out => 0b101,
        }
    }

    /// Decode pads 37:35 of a sampled input word.
    #[must_use]
    pub fn from_inputs(inputs: u64) -> Option<Self> {
        match (inputs & PAD_SELECT_MASK).wrapping_shr(PAD_SELECT_SHIFT) {
            0b000 => Some(Self::LogicAnalyzer),
            0b010 => Some(Self::In1),
            0b110 => Some(Self::In2),
            0b100 => Some(Self::Control),
            0b101 => Some(Self::Out),
            _ => None,
        }
    }
}

/// One handshake-paced phase of a pad-driven operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioPhase {
    /// Harness drives operand 1
    In1,
    /// Harness drives operand 2
    In2,
    /// Harness drives opcode, round mode and start
    Control,
    /// FPU drives the result
    Out,
    /// Harness has checked the result
    Checked,
}

impl GpioPhase {
    /// Phases of one operation, in handshake order.
    pub const ALL: [Self; 5] = [
        Self::In1,
        Self::In2,
        Self::Control,
        Self::Out,
        Self::Checked,
    ];

    /// Pad select the harness drives during this phase.
    #[must_use]
    pub const fn select(self) -> PadSelect {
        match self {
            Self::In1 => PadSelect::In1,
            Self::In2 => PadSelect::In2,
            Self::Control => PadSelect::Control,
            Self::Out | Self::Checked => PadSelect::Out,
        }
    }
}

/// Control word the harness drives on pads 31:0 for `op`.
#[must_use]
pub const fn pad_control_word(op: FpuOp, round_mode: u32) -> u32 {
    (op.pad_opcode() & 0b111).wrapping_shl(PAD_OPCODE_SHIFT)
        | (round_mode & 0b111).wrapping_shl(PAD_ROUND_SHIFT)
}

/// Pad-driven mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioModeConfig {
    /// Delay before each phase's handshake write, for the harness to drive pads
    pub phase_hold: u32,
    /// Round mode expected in the control word
    pub round_mode: u32,
}

impl Default for GpioModeConfig {
    fn default() -> Self {
        Self {
            phase_hold: 100,
            round_mode: DEFAULT_ROUND_MODE,
        }
    }
}

/// LA output-enable masks for groups 0..=3.
///
/// Groups 0 and 1 carry the operands, group 2 the command word in its low
/// 20 bits, group 3 the result.
pub const LA_OUTPUT_ENABLE: [u32; 4] = [0x0000_0000, 0x0000_0000, 0xFFF0_0000, 0xFFFF_FFFF];

/// Reset pulse written to the command channel.
pub const RESET_SEQUENCE: [u32; 3] = [0x101, 0x000, 0x101];

// ─── Top level ───────────────────────────────────────────────────────────────

/// Complete driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Delay lengths
    pub delays: DelayConfig,
    /// Result collection
    pub completion: CompletionMode,
    /// Unknown-symbol handling for raw operations
    pub unknown_opcode: OpcodePolicy,
    /// User pad layout
    pub pins: PinConfig,
    /// Output-enable mask per LA group
    pub la_output_enable: [u32; 4],
    /// Words written to the command channel as the reset pulse
    pub reset_sequence: &'static [u32],
    /// Channel receiving the reset pulse
    pub reset_channel: LaChannel,
    /// Pad-driven mode settings
    pub gpio_mode: GpioModeConfig,
}

impl DriverConfig {
    /// Output-enable mask per group, paired with the group.
    pub fn la_groups(&self) -> impl Iterator<Item = (LaGroup, u32)> + '_ {
        LaGroup::all().into_iter().zip(self.la_output_enable)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            delays: DelayConfig::default(),
            completion: CompletionMode::default(),
            unknown_opcode: OpcodePolicy::default(),
            pins: PinConfig::default(),
            la_output_enable: LA_OUTPUT_ENABLE,
            reset_sequence: &RESET_SEQUENCE,
            reset_channel: LaChannel::COMMAND,
            gpio_mode: GpioModeConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bench_constants() {
        let config = DriverConfig::default();
        assert_eq!(config.delays.reset_pulse, 1);
        assert_eq!(config.delays.post_config, 100);
        assert_eq!(config.delays.post_priming, 100);
        assert_eq!(config.delays.final_hold, 100_000);
        assert_eq!(config.completion, CompletionMode::Immediate);
        assert_eq!(config.unknown_opcode, OpcodePolicy::Reject);
        assert_eq!(config.reset_sequence, &[0x101, 0x000, 0x101]);
    }

    #[test]
    fn test_pin_overrides_cover_upper_pads() {
        let pins = PinConfig::default();
        let indices: std::vec::Vec<u8> = pins.overrides.iter().map(|(pin, _)| pin.index()).collect();
        assert_eq!(indices, [31, 32, 33, 34, 35, 36, 37]);
        assert!(pins.overrides.iter().all(|(_, mode)| mode.is_user()));
    }

    #[test]
    fn test_la_groups_in_order() {
        let config = DriverConfig::default();
        let masks: std::vec::Vec<(u8, u32)> =
            config.la_groups().map(|(g, m)| (g.index(), m)).collect();
        assert_eq!(
            masks,
            [(0, 0), (1, 0), (2, 0xFFF0_0000), (3, 0xFFFF_FFFF)]
        );
    }

    #[test]
    fn test_pad_select_decodes_upper_pads() {
        for select in [
            PadSelect::LogicAnalyzer,
            PadSelect::In1,
            PadSelect::In2,
            PadSelect::Control,
            PadSelect::Out,
        ] {
            let inputs = (select.bits() << PAD_SELECT_SHIFT) | 0xdead_beef;
            assert_eq!(PadSelect::from_inputs(inputs), Some(select));
        }
        assert_eq!(PadSelect::from_inputs(0b111 << PAD_SELECT_SHIFT), None);
        assert_eq!(PAD_SELECT_MASK, 0b111 << 35);
    }

    #[test]
    fn test_phases_end_on_output_select() {
        let selects: std::vec::Vec<PadSelect> = GpioPhase::ALL.iter().map(|p| p.select()).collect();
        assert_eq!(
            selects,
            [
                PadSelect::In1,
                PadSelect::In2,
                PadSelect::Control,
                PadSelect::Out,
                PadSelect::Out
            ]
        );
    }

    #[test]
    fn test_control_word_fields() {
        assert_eq!(pad_control_word(FpuOp::Add, 0b001), 0x0200_0000);
        assert_eq!(pad_control_word(FpuOp::Multiply, 0b001), 0x2200_0000);
        assert_eq!(pad_control_word(FpuOp::SquareRoot, 0b001), 0x6200_0000);
        for op in FpuOp::ALL {
            assert_eq!(pad_control_word(op, 0b111) & !PAD_CONTROL_MASK, 0);
        }
        assert_eq!(PAD_START.index(), 32);
    }

    #[test]
    fn test_wait_done_uses_bit_zero() {
        assert_eq!(
            CompletionMode::wait_done(),
            CompletionMode::WaitDone {
                mask: 0b1,
                max_polls: DEFAULT_DONE_POLLS
            }
        );
    }
}
