//! Register-level protocol
//!
//! Free functions over a [`FirmwareApis`] handle. [`crate::driver`] sequences
//! them; they are public so board bring-up code can drive single steps.
//!
//! One FPU operation is:
//!
//! ```text
//! ch2 <- setup   ch0 <- operand1   ch1 <- operand2   ch2 <- strobe   [wait done]   read ch3
//! ```
//!
//! The setup code is on the command channel before the operands are latched,
//! and the strobe (setup + 1) starts the operation.

use platform::{FirmwareApis, LaChannel};

use crate::config::{CompletionMode, DriverConfig, OpcodePolicy, PinConfig};
use crate::error::FpuError;
use crate::opcode::FpuOp;

type Result<T, E> = core::result::Result<T, FpuError<E>>;

/// Drive the management GPIO low as an output and disable housekeeping SPI.
pub fn setup_management<H: FirmwareApis>(hw: &mut H) -> Result<(), H::Error> {
    hw.enable_output().map_err(FpuError::Hardware)?;
    hw.set_level(false).map_err(FpuError::Hardware)?;
    hw.enable_hk_spi(false).map_err(FpuError::Hardware)
}

/// Stage the pad layout and shift it into the pad ring.
pub fn configure_pads<H: FirmwareApis>(hw: &mut H, pins: &PinConfig) -> Result<(), H::Error> {
    hw.configure_all(pins.base).map_err(FpuError::Hardware)?;
    for &(pin, mode) in pins.overrides {
        hw.configure(pin, mode).map_err(FpuError::Hardware)?;
    }
    hw.load_configs().map_err(FpuError::Hardware)
}

/// Program the output-enable mask of every LA group.
pub fn configure_la<H: FirmwareApis>(hw: &mut H, config: &DriverConfig) -> Result<(), H::Error> {
    for (group, mask) in config.la_groups() {
        hw.output_enable(group, mask).map_err(FpuError::Hardware)?;
    }
    Ok(())
}

/// Write each reset word to the reset channel, each followed by a delay.
pub fn reset_pulse<H: FirmwareApis>(hw: &mut H, config: &DriverConfig) -> Result<(), H::Error> {
    for &word in config.reset_sequence {
        hw.write(config.reset_channel, word)
            .map_err(FpuError::Hardware)?;
        hw.dummy_delay(config.delays.reset_pulse);
    }
    Ok(())
}

/// Pads, LA direction and reset pulse, in that order.
pub fn config_fpu<H: FirmwareApis>(hw: &mut H, config: &DriverConfig) -> Result<(), H::Error> {
    configure_pads(hw, &config.pins)?;
    configure_la(hw, config)?;
    reset_pulse(hw, config)
}

/// Write setup code, both operands and strobe code.
pub fn issue<H: FirmwareApis>(
    hw: &mut H,
    op: FpuOp,
    operand1: u32,
    operand2: u32,
) -> Result<(), H::Error> {
    let codes = op.codes();
    hw.write(LaChannel::COMMAND, codes.setup)
        .map_err(FpuError::Hardware)?;
    write_operands(hw, operand1, operand2)?;
    hw.write(LaChannel::COMMAND, codes.strobe)
        .map_err(FpuError::Hardware)
}

fn write_operands<H: FirmwareApis>(
    hw: &mut H,
    operand1: u32,
    operand2: u32,
) -> Result<(), H::Error> {
    hw.write(LaChannel::OPERAND1, operand1)
        .map_err(FpuError::Hardware)?;
    hw.write(LaChannel::OPERAND2, operand2)
        .map_err(FpuError::Hardware)
}

fn read_result<H: FirmwareApis>(hw: &mut H) -> Result<u32, H::Error> {
    hw.read(LaChannel::RESULT).map_err(FpuError::Hardware)
}

/// Poll the pad inputs until every bit of `mask` is high.
///
/// Samples at most `max_polls` times with a one-unit delay after each miss.
/// Returns the number of samples taken.
pub fn wait_done<H: FirmwareApis>(hw: &mut H, mask: u64, max_polls: u32) -> Result<u32, H::Error> {
    for poll in 1..=max_polls {
        let inputs = hw.read_inputs().map_err(FpuError::Hardware)?;
        if inputs & mask == mask {
            return Ok(poll);
        }
        hw.dummy_delay(1);
    }
    Err(FpuError::DoneTimeout {
        mask,
        polls: max_polls,
    })
}

/// One complete operation; returns the result word.
pub fn fpu_op<H: FirmwareApis>(
    hw: &mut H,
    op: FpuOp,
    operand1: u32,
    operand2: u32,
    completion: CompletionMode,
) -> Result<u32, H::Error> {
    issue(hw, op, operand1, operand2)?;
    complete(hw, completion, op.symbol())?;
    read_result(hw)
}

fn complete<H: FirmwareApis>(
    hw: &mut H,
    completion: CompletionMode,
    symbol: char,
) -> Result<(), H::Error> {
    if let CompletionMode::WaitDone { mask, max_polls } = completion {
        let polls = wait_done(hw, mask, max_polls)?;
        debug!("{} done after {} polls", symbol, polls);
    }
    Ok(())
}

/// [`fpu_op`] with a bounded wait on `mask` before the result is read.
pub fn fpu_op_and_wait<H: FirmwareApis>(
    hw: &mut H,
    op: FpuOp,
    operand1: u32,
    operand2: u32,
    mask: u64,
    max_polls: u32,
) -> Result<u32, H::Error> {
    fpu_op(hw, op, operand1, operand2, CompletionMode::WaitDone { mask, max_polls })
}

/// One operation named by its table symbol.
///
/// Unknown symbols follow `policy`: rejected before any write, or (legacy)
/// operands written and result read with no command code.
pub fn fpu_op_raw<H: FirmwareApis>(
    hw: &mut H,
    symbol: char,
    operand1: u32,
    operand2: u32,
    completion: CompletionMode,
    policy: OpcodePolicy,
) -> Result<u32, H::Error> {
    match FpuOp::try_from(symbol) {
        Ok(op) => fpu_op(hw, op, operand1, operand2, completion),
        Err(err) => match policy {
            OpcodePolicy::Reject => Err(err.into()),
            OpcodePolicy::LegacyPassthrough => {
                warn!("opcode {} unknown, no command written", symbol);
                write_operands(hw, operand1, operand2)?;
                complete(hw, completion, symbol)?;
                read_result(hw)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use platform::mocks::{ApiCall, MockFault, RecordingApis};

    use super::*;

    fn la(channel: u8, value: u32) -> ApiCall {
        ApiCall::LaWrite { channel, value }
    }

    #[test]
    fn test_add_scenario_order() {
        let mut hw = RecordingApis::new();
        hw.script_la(LaChannel::RESULT, &[0x43e7_37d2]);
        let result = fpu_op(
            &mut hw,
            FpuOp::Add,
            0x4318_7d07,
            0x439a_f94e,
            CompletionMode::Immediate,
        )
        .unwrap();
        assert_eq!(result, 0x43e7_37d2);
        assert_eq!(
            hw.calls(),
            &[
                la(2, 0x100),
                la(0, 0x4318_7d07),
                la(1, 0x439a_f94e),
                la(2, 0x101),
                ApiCall::LaRead { channel: 3 },
            ]
        );
    }

    #[test]
    fn test_unknown_symbol_rejected_without_writes() {
        let mut hw = RecordingApis::new();
        let err = fpu_op_raw(
            &mut hw,
            'x',
            1,
            2,
            CompletionMode::Immediate,
            OpcodePolicy::Reject,
        )
        .unwrap_err();
        assert_eq!(err, FpuError::UnknownOpcode('x'));
        assert!(hw.calls().is_empty());
    }

    #[test]
    fn test_legacy_passthrough_skips_command() {
        let mut hw = RecordingApis::new();
        fpu_op_raw(
            &mut hw,
            'x',
            1,
            2,
            CompletionMode::Immediate,
            OpcodePolicy::LegacyPassthrough,
        )
        .unwrap();
        assert_eq!(
            hw.calls(),
            &[la(0, 1), la(1, 2), ApiCall::LaRead { channel: 3 }]
        );
    }

    #[test]
    fn test_legacy_passthrough_honours_wait_done() {
        let wait = CompletionMode::WaitDone {
            mask: 0b1,
            max_polls: 3,
        };
        let mut hw = RecordingApis::new();
        hw.inputs_high_after(1, 0b1);
        fpu_op_raw(&mut hw, 'x', 1, 2, wait, OpcodePolicy::LegacyPassthrough).unwrap();
        assert_eq!(
            hw.calls(),
            &[
                la(0, 1),
                la(1, 2),
                ApiCall::ReadInputs,
                ApiCall::Delay(1),
                ApiCall::ReadInputs,
                ApiCall::LaRead { channel: 3 },
            ]
        );

        let mut hw = RecordingApis::new();
        assert_eq!(
            fpu_op_raw(&mut hw, 'x', 1, 2, wait, OpcodePolicy::LegacyPassthrough),
            Err(FpuError::DoneTimeout { mask: 0b1, polls: 3 })
        );
        assert_eq!(hw.result_reads(), 0);
    }

    #[test]
    fn test_wait_done_counts_polls() {
        let mut hw = RecordingApis::new();
        hw.inputs_high_after(2, 0b1);
        assert_eq!(wait_done(&mut hw, 0b1, 5), Ok(3));
        let delays = hw
            .calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Delay(1)))
            .count();
        assert_eq!(delays, 2);
    }

    #[test]
    fn test_wait_done_times_out() {
        let mut hw = RecordingApis::new();
        assert_eq!(
            wait_done(&mut hw, 0b1, 4),
            Err(FpuError::DoneTimeout { mask: 0b1, polls: 4 })
        );
        assert_eq!(
            wait_done(&mut hw, 0b1, 0),
            Err(FpuError::DoneTimeout { mask: 0b1, polls: 0 })
        );
    }

    #[test]
    fn test_divide_waits_then_reads_result_channel() {
        let mut hw = RecordingApis::new();
        hw.inputs_high_after(0, 0b1);
        fpu_op_and_wait(&mut hw, FpuOp::Divide, 3, 4, 0b1, 10).unwrap();
        assert_eq!(
            hw.calls(),
            &[
                la(2, 0x120),
                la(0, 3),
                la(1, 4),
                la(2, 0x121),
                ApiCall::ReadInputs,
                ApiCall::LaRead { channel: 3 },
            ]
        );
    }

    #[test]
    fn test_reset_pulse_interleaves_delays() {
        let mut hw = RecordingApis::new();
        reset_pulse(&mut hw, &DriverConfig::default()).unwrap();
        assert_eq!(
            hw.calls(),
            &[
                la(2, 0x101),
                ApiCall::Delay(1),
                la(2, 0x000),
                ApiCall::Delay(1),
                la(2, 0x101),
                ApiCall::Delay(1),
            ]
        );
    }

    #[test]
    fn test_hardware_fault_stops_protocol() {
        let mut hw = RecordingApis::new();
        hw.fail_on(2);
        let err = issue(&mut hw, FpuOp::Multiply, 1, 2).unwrap_err();
        assert_eq!(err, FpuError::Hardware(MockFault));
        assert_eq!(hw.calls(), &[la(2, 0x110), la(0, 1)]);
    }
}
