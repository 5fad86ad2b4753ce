//! FPU test driver typestate
//!
//! ```text
//! [Unconfigured] --configure()--> [Configured] --prime()--> [Running]
//!     --run_vectors()--> [Running] --finish()--> [Idle] --release()--> H
//!
//! [Configured] --start_pads()--> [PadDriven] --run_pad_vectors()--> [PadDriven]
//!     --finish()--> [Idle]
//! ```
//!
//! `configure` sets up the management GPIO, the pads, the LA direction masks
//! and the reset pulse. `prime` drives the first vector once and raises the
//! handshake. Each main-loop step drives one vector and writes the current
//! handshake level, then flips it. `finish` holds, then writes the final
//! level.
//!
//! In pad-driven mode the harness feeds the FPU through the user pads and the
//! firmware only paces it: every vector takes five handshake writes, one per
//! [`GpioPhase`]. The control word and the result are sampled from the pads
//! on their phases.
//!
//! Calling an operation before the pads are configured, or priming twice,
//! does not compile.

use core::marker::PhantomData;

use heapless::Vec;
use platform::FirmwareApis;

use crate::config::{
    pad_control_word, DriverConfig, GpioPhase, PadSelect, PAD_CONTROL_MASK, PAD_START,
};
use crate::error::FpuError;
use crate::handshake::Handshake;
use crate::opcode::FpuOp;
use crate::protocol;
use crate::report::{OperationRecord, RunReport};
use crate::vector::{TestVector, VectorTable, MAX_VECTORS};

// ── State types (zero-sized) ──────────────────────────────────────────────────

/// Hardware handle owned, nothing written yet.
pub struct Unconfigured;

/// Pads, LA and reset pulse done; operations allowed.
pub struct Configured;

/// Priming done, handshake raised; main loop in progress.
pub struct Running;

/// Handshake raised; the harness drives the FPU through the pads.
pub struct PadDriven;

/// Final handshake written.
pub struct Idle;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Configured {}
    impl Sealed for super::Running {}
    impl Sealed for super::PadDriven {}
}

/// States in which FPU operations may be issued.
pub trait Operational: sealed::Sealed {}
impl Operational for Configured {}
impl Operational for Running {}

/// States in which the main loop paces the harness.
pub trait Paced: sealed::Sealed {}
impl Paced for Running {}
impl Paced for PadDriven {}

// ── Driver ───────────────────────────────────────────────────────────────────

/// FPU test driver over a hardware handle `H`.
pub struct FpuTestDriver<H, State> {
    hw: H,
    config: DriverConfig,
    handshake: Handshake,
    records: Vec<OperationRecord, MAX_VECTORS>,
    _state: PhantomData<State>,
}

impl<H, State> FpuTestDriver<H, State> {
    fn into_state<Next>(self) -> FpuTestDriver<H, Next> {
        FpuTestDriver {
            hw: self.hw,
            config: self.config,
            handshake: self.handshake,
            records: self.records,
            _state: PhantomData,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Level the next handshake write will use.
    pub fn handshake(&self) -> Handshake {
        self.handshake
    }
}

impl<H: FirmwareApis> FpuTestDriver<H, Unconfigured> {
    /// Take ownership of `hw`. Nothing is written until [`Self::configure`].
    pub fn new(hw: H, config: DriverConfig) -> Self {
        Self {
            hw,
            config,
            handshake: Handshake::LOW,
            records: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Management GPIO, pads, LA direction, reset pulse, settle delay.
    pub fn configure(mut self) -> Result<FpuTestDriver<H, Configured>, FpuError<H::Error>> {
        protocol::setup_management(&mut self.hw)?;
        protocol::config_fpu(&mut self.hw, &self.config)?;
        self.hw.dummy_delay(self.config.delays.post_config);
        info!("FPU configured");
        Ok(self.into_state())
    }
}

impl<H: FirmwareApis, State: Operational> FpuTestDriver<H, State> {
    /// Drive one operation with the configured completion mode.
    pub fn execute(
        &mut self,
        op: FpuOp,
        operand1: u32,
        operand2: u32,
    ) -> Result<u32, FpuError<H::Error>> {
        protocol::fpu_op(&mut self.hw, op, operand1, operand2, self.config.completion)
    }

    /// Drive one operation named by its table symbol.
    pub fn execute_raw(
        &mut self,
        symbol: char,
        operand1: u32,
        operand2: u32,
    ) -> Result<u32, FpuError<H::Error>> {
        protocol::fpu_op_raw(
            &mut self.hw,
            symbol,
            operand1,
            operand2,
            self.config.completion,
            self.config.unknown_opcode,
        )
    }

    /// Drive `vector`.
    pub fn execute_vector(&mut self, vector: &TestVector) -> Result<u32, FpuError<H::Error>> {
        self.execute(vector.op, vector.operand1, vector.operand2)
    }

    /// Drive one operation and wait for `mask` before reading the result,
    /// whatever the configured completion mode.
    pub fn execute_and_wait(
        &mut self,
        op: FpuOp,
        operand1: u32,
        operand2: u32,
        mask: u64,
        max_polls: u32,
    ) -> Result<u32, FpuError<H::Error>> {
        protocol::fpu_op_and_wait(&mut self.hw, op, operand1, operand2, mask, max_polls)
    }
}

impl<H: FirmwareApis> FpuTestDriver<H, Configured> {
    /// Drive `vector` once, wait, raise the handshake.
    ///
    /// Returns the running driver and the priming result. The main loop
    /// starts from a low handshake.
    pub fn prime(
        mut self,
        vector: &TestVector,
    ) -> Result<(FpuTestDriver<H, Running>, u32), FpuError<H::Error>> {
        let result = self.execute_vector(vector)?;
        self.hw.dummy_delay(self.config.delays.post_priming);
        self.hw
            .set_level(Handshake::HIGH.is_high())
            .map_err(FpuError::Hardware)?;
        self.handshake = Handshake::LOW;
        debug!("primed, result {:#x}", result);
        Ok((self.into_state(), result))
    }

    /// Hand the FPU to the pads: wait, raise the handshake.
    ///
    /// The main loop starts from a low handshake.
    pub fn start_pads(mut self) -> Result<FpuTestDriver<H, PadDriven>, FpuError<H::Error>> {
        self.hw.dummy_delay(self.config.delays.post_priming);
        self.hw
            .set_level(Handshake::HIGH.is_high())
            .map_err(FpuError::Hardware)?;
        self.handshake = Handshake::LOW;
        debug!("pad-driven mode, phase hold {}", self.config.gpio_mode.phase_hold);
        Ok(self.into_state())
    }
}

impl<H: FirmwareApis> FpuTestDriver<H, Running> {
    /// One main-loop iteration: drive `vector`, write the handshake, flip it.
    pub fn step(
        &mut self,
        index: usize,
        vector: &TestVector,
    ) -> Result<OperationRecord, FpuError<H::Error>> {
        self.ensure_capacity()?;
        let result = self.execute_vector(vector)?;
        let handshake = self.handshake;
        self.write_handshake()?;
        Ok(self.push_record(index, vector, result, handshake))
    }

    /// Drive every vector of `table` in order, index 0 included.
    pub fn run_vectors(&mut self, table: &VectorTable) -> Result<(), FpuError<H::Error>> {
        for (index, vector) in table.iter().enumerate() {
            let record = self.step(index, vector)?;
            log_record(&record);
        }
        Ok(())
    }
}

impl<H: FirmwareApis> FpuTestDriver<H, PadDriven> {
    /// One pad-driven operation: five phases, one handshake write each.
    ///
    /// The record's handshake is the level written on the first phase, its
    /// result the word sampled from pads 31:0 on the output phase.
    pub fn step_pads(
        &mut self,
        index: usize,
        vector: &TestVector,
    ) -> Result<OperationRecord, FpuError<H::Error>> {
        self.ensure_capacity()?;
        let handshake = self.handshake;
        let mut result = 0;
        for phase in GpioPhase::ALL {
            self.hw.dummy_delay(self.config.gpio_mode.phase_hold);
            match phase {
                GpioPhase::Control => self.check_control(vector)?,
                GpioPhase::Out => result = self.sample_output()?,
                GpioPhase::In1 | GpioPhase::In2 | GpioPhase::Checked => {}
            }
            self.write_handshake()?;
        }
        Ok(self.push_record(index, vector, result, handshake))
    }

    /// Pace every vector of `table` in order.
    pub fn run_pad_vectors(&mut self, table: &VectorTable) -> Result<(), FpuError<H::Error>> {
        for (index, vector) in table.iter().enumerate() {
            let record = self.step_pads(index, vector)?;
            log_record(&record);
        }
        Ok(())
    }

    fn check_control(&mut self, vector: &TestVector) -> Result<(), FpuError<H::Error>> {
        let inputs = self.hw.read_inputs().map_err(FpuError::Hardware)?;
        let expected = pad_control_word(vector.op, self.config.gpio_mode.round_mode);
        let fields = low_word(inputs) & PAD_CONTROL_MASK;
        if PadSelect::from_inputs(inputs) != Some(PadSelect::Control)
            || fields != expected
            || inputs & PAD_START.mask() == 0
        {
            warn!("control pads {:#x}, want {:#x} with start", fields, expected);
        }
        Ok(())
    }

    fn sample_output(&mut self) -> Result<u32, FpuError<H::Error>> {
        let inputs = self.hw.read_inputs().map_err(FpuError::Hardware)?;
        if PadSelect::from_inputs(inputs) != Some(PadSelect::Out) {
            warn!("output sampled without output select");
        }
        Ok(low_word(inputs))
    }
}

impl<H: FirmwareApis, State: Paced> FpuTestDriver<H, State> {
    /// Records of the iterations so far.
    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// Final hold delay, then the final handshake write.
    pub fn finish(mut self) -> Result<FpuTestDriver<H, Idle>, FpuError<H::Error>> {
        self.hw.dummy_delay(self.config.delays.final_hold);
        self.hw
            .set_level(self.handshake.is_high())
            .map_err(FpuError::Hardware)?;
        Ok(self.into_state())
    }

    fn ensure_capacity(&self) -> Result<(), FpuError<H::Error>> {
        if self.records.is_full() {
            return Err(FpuError::TableFull {
                capacity: MAX_VECTORS,
            });
        }
        Ok(())
    }

    fn write_handshake(&mut self) -> Result<(), FpuError<H::Error>> {
        self.hw
            .set_level(self.handshake.is_high())
            .map_err(FpuError::Hardware)?;
        self.handshake.toggle();
        Ok(())
    }

    fn push_record(
        &mut self,
        index: usize,
        vector: &TestVector,
        result: u32,
        handshake: Handshake,
    ) -> OperationRecord {
        let record = OperationRecord {
            index,
            vector: *vector,
            result,
            handshake,
        };
        // Capacity checked before any hardware access.
        self.records.push(record).ok();
        record
    }
}

/// Pads 31:0 of a sampled input word.
fn low_word(inputs: u64) -> u32 {
    u32::try_from(inputs & u64::from(u32::MAX)).unwrap_or(u32::MAX)
}

fn log_record(record: &OperationRecord) {
    let name = record.vector.op.name();
    match record.matches_expected() {
        Some(true) => info!("[{}] {} PASS {:#x}", record.index, name, record.result),
        Some(false) => error!(
            "[{}] {} FAIL got {:#x} want {:#x}",
            record.index,
            name,
            record.result,
            record.vector.expected.unwrap_or_default()
        ),
        None => info!("[{}] {} -> {:#x}", record.index, name, record.result),
    }
}

impl<H> FpuTestDriver<H, Idle> {
    /// Level written by [`FpuTestDriver::finish`].
    pub fn final_handshake(&self) -> Handshake {
        self.handshake
    }

    /// Give the hardware handle back.
    pub fn release(self) -> H {
        self.hw
    }

    fn into_report(self, priming_result: Option<u32>) -> RunReport {
        RunReport {
            priming_result,
            records: self.records,
            final_handshake: self.handshake,
        }
    }
}

/// Configure, prime with the first vector, run every vector, finish.
pub fn run<H: FirmwareApis>(
    hw: &mut H,
    config: DriverConfig,
    table: &VectorTable,
) -> Result<RunReport, FpuError<H::Error>> {
    let first = *table.first().ok_or(FpuError::EmptyTable)?;
    let driver = FpuTestDriver::new(hw, config).configure()?;
    let (mut driver, priming_result) = driver.prime(&first)?;
    driver.run_vectors(table)?;
    let report = driver.finish()?.into_report(Some(priming_result));
    log_summary(&report);
    Ok(report)
}

/// Configure, then pace the harness through every vector over the pads.
///
/// No LA operation is issued; results are sampled from pads 31:0.
pub fn run_gpio_mode<H: FirmwareApis>(
    hw: &mut H,
    config: DriverConfig,
    table: &VectorTable,
) -> Result<RunReport, FpuError<H::Error>> {
    if table.is_empty() {
        return Err(FpuError::EmptyTable);
    }
    let mut driver = FpuTestDriver::new(hw, config).configure()?.start_pads()?;
    driver.run_pad_vectors(table)?;
    let report = driver.finish()?.into_report(None);
    log_summary(&report);
    Ok(report)
}

fn log_summary(report: &RunReport) {
    info!(
        "run complete: {} vectors, {} checked, {} mismatches",
        report.records.len(),
        report.checked(),
        report.mismatches().count()
    );
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use platform::mocks::{ApiCall, RecordingApis};
    use platform::LaChannel;

    use super::*;

    #[test]
    fn test_run_reference_table_handshake() {
        let mut hw = RecordingApis::new();
        let report = run(&mut hw, DriverConfig::default(), &VectorTable::reference()).unwrap();
        assert_eq!(report.records.len(), 9);
        // config low, priming high, 9 alternating, final
        let levels = hw.mgmt_writes();
        assert_eq!(
            levels,
            [false, true, false, true, false, true, false, true, false, true, false, true]
        );
        assert_eq!(report.final_handshake, Handshake::HIGH);
        assert_eq!(hw.result_reads(), 10);
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let mut hw = RecordingApis::new();
        let err = run(&mut hw, DriverConfig::default(), &VectorTable::new()).unwrap_err();
        assert_eq!(err, FpuError::EmptyTable);
        assert!(hw.calls().is_empty());
    }

    #[test]
    fn test_operations_allowed_once_configured() {
        let mut hw = RecordingApis::new();
        let mut driver = FpuTestDriver::new(&mut hw, DriverConfig::default())
            .configure()
            .unwrap();
        driver.execute(FpuOp::Compare, 1, 2).unwrap();
        drop(driver);
        let writes = hw.la_writes(LaChannel::COMMAND);
        assert_eq!(writes.get(writes.len() - 2..), Some(&[0x140, 0x141][..]));
    }

    #[test]
    fn test_full_table_rejects_step_before_touching_hardware() {
        let vector = VectorTable::reference().first().copied().unwrap();
        let driver = FpuTestDriver::new(RecordingApis::new(), DriverConfig::default())
            .configure()
            .unwrap();
        let (mut driver, _) = driver.prime(&vector).unwrap();
        for index in 0..MAX_VECTORS {
            driver.step(index, &vector).unwrap();
        }
        assert_eq!(driver.records().len(), MAX_VECTORS);
        let before = driver.handshake();
        assert_eq!(
            driver.step(MAX_VECTORS, &vector),
            Err(FpuError::TableFull {
                capacity: MAX_VECTORS
            })
        );
        assert_eq!(driver.handshake(), before);

        let idle = driver.finish().unwrap();
        assert_eq!(idle.final_handshake(), before);
        let hw = idle.release();
        // priming plus one read per accepted step
        assert_eq!(hw.result_reads(), MAX_VECTORS + 1);
        // config, priming, one per step, final
        assert_eq!(hw.mgmt_writes().len(), MAX_VECTORS + 3);
    }

    #[test]
    fn test_pad_mode_five_handshakes_per_vector() {
        let table = VectorTable::reference();
        let mut hw = RecordingApis::new();
        let report = run_gpio_mode(&mut hw, DriverConfig::default(), &table).unwrap();
        assert_eq!(report.records.len(), table.len());
        assert_eq!(report.priming_result, None);

        let levels = hw.mgmt_writes();
        assert_eq!(levels.len(), 1 + 1 + GpioPhase::ALL.len() * table.len() + 1);
        assert_eq!(levels.get(..2), Some(&[false, true][..]));
        for (i, level) in levels[2..levels.len() - 1].iter().enumerate() {
            assert_eq!(*level, i % 2 == 1);
        }
        // 45 toggles from low
        assert_eq!(report.final_handshake, Handshake::HIGH);
        assert_eq!(levels.last(), Some(&true));
        // No LA operation in pad mode.
        assert_eq!(hw.result_reads(), 0);
        assert!(hw.la_writes(LaChannel::OPERAND1).is_empty());
    }

    #[test]
    fn test_pad_step_samples_output_phase() {
        let vector = VectorTable::reference().first().copied().unwrap();
        let control = (PadSelect::Control.bits() << 35)
            | PAD_START.mask()
            | u64::from(pad_control_word(vector.op, 0b001));
        let out = (PadSelect::Out.bits() << 35) | 0x43e7_37d2;
        let mut hw = RecordingApis::new();
        hw.script_inputs(&[control, out]);
        let mut driver = FpuTestDriver::new(&mut hw, DriverConfig::default())
            .configure()
            .unwrap()
            .start_pads()
            .unwrap();
        let record = driver.step_pads(0, &vector).unwrap();
        assert_eq!(record.result, 0x43e7_37d2);
        assert_eq!(record.matches_expected(), Some(true));
        assert_eq!(record.handshake, Handshake::LOW);
        // odd number of phases leaves the next vector starting high
        assert_eq!(driver.handshake(), Handshake::HIGH);
        drop(driver);

        let phases: std::vec::Vec<ApiCall> = hw
            .calls()
            .iter()
            .rev()
            .take(12)
            .rev()
            .copied()
            .collect();
        assert_eq!(
            phases,
            [
                ApiCall::Delay(100),
                ApiCall::MgmtWrite(false),
                ApiCall::Delay(100),
                ApiCall::MgmtWrite(true),
                ApiCall::Delay(100),
                ApiCall::ReadInputs,
                ApiCall::MgmtWrite(false),
                ApiCall::Delay(100),
                ApiCall::ReadInputs,
                ApiCall::MgmtWrite(true),
                ApiCall::Delay(100),
                ApiCall::MgmtWrite(false),
            ]
        );
    }

    #[test]
    fn test_pad_mode_empty_table_writes_nothing() {
        let mut hw = RecordingApis::new();
        let err = run_gpio_mode(&mut hw, DriverConfig::default(), &VectorTable::new()).unwrap_err();
        assert_eq!(err, FpuError::EmptyTable);
        assert!(hw.calls().is_empty());
    }

    #[test]
    fn test_finish_holds_before_final_write() {
        let mut hw = RecordingApis::new();
        run(&mut hw, DriverConfig::default(), &VectorTable::reference()).unwrap();
        let tail = &hw.calls()[hw.calls().len() - 2..];
        assert_eq!(tail, &[ApiCall::Delay(100_000), ApiCall::MgmtWrite(true)]);
    }
}
