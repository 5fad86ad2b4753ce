//! Mock implementations for testing
//!
//! [`RecordingApis`] implements every firmware-API trait without hardware.
//! Each call is appended to an ordered [`ApiCall`] log so tests can assert
//! the exact register protocol a driver produced.

#![cfg(any(test, feature = "std"))]

use std::collections::VecDeque;
use std::vec::Vec;

use crate::delay::DummyDelay;
use crate::gpio::{GpioMode, UserGpios};
use crate::la::LogicAnalyzer;
use crate::management::{Housekeeping, ManagementGpio};
use crate::{ErrorType, GpioPin, LaChannel, LaGroup};

/// One recorded firmware-API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCall {
    /// `LogicAnalyzer::write`
    LaWrite {
        /// Channel written
        channel: u8,
        /// Value written
        value: u32,
    },
    /// `LogicAnalyzer::read`
    LaRead {
        /// Channel read
        channel: u8,
    },
    /// `LogicAnalyzer::output_enable`
    LaOutputEnable {
        /// Group configured
        group: u8,
        /// Output-enable mask
        mask: u32,
    },
    /// `UserGpios::configure_all`
    ConfigureAll(GpioMode),
    /// `UserGpios::configure`
    Configure {
        /// Pad index
        pin: u8,
        /// Mode staged for the pad
        mode: GpioMode,
    },
    /// `UserGpios::load_configs`
    LoadConfigs,
    /// `UserGpios::read_inputs`
    ReadInputs,
    /// `ManagementGpio::enable_output`
    MgmtOutputEnable,
    /// `ManagementGpio::set_level`
    MgmtWrite(bool),
    /// `Housekeeping::enable_hk_spi`
    HkSpi(bool),
    /// `DummyDelay::dummy_delay`
    Delay(u32),
}

/// Error injected by [`RecordingApis::fail_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault;

/// Recording firmware-API mock.
#[derive(Debug, Default)]
pub struct RecordingApis {
    calls: Vec<ApiCall>,
    la_values: [VecDeque<u32>; 4],
    input_words: VecDeque<u64>,
    inputs_high_after: Option<usize>,
    input_polls: usize,
    input_mask: u64,
    fail_at: Option<usize>,
}

impl RecordingApis {
    /// Create a mock with no scripted values; reads return 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `values` to be returned by successive reads of `channel`.
    /// Once the queue drains, reads return 0.
    pub fn script_la(&mut self, channel: LaChannel, values: &[u32]) {
        if let Some(queue) = self.la_values.get_mut(usize::from(channel.index())) {
            queue.extend(values.iter().copied());
        }
    }

    /// Queue pad input words returned by the next reads, ahead of any
    /// [`Self::inputs_high_after`] level.
    pub fn script_inputs(&mut self, words: &[u64]) {
        self.input_words.extend(words.iter().copied());
    }

    /// Report `mask` on the pad inputs from poll number `polls` onwards
    /// (0 = already high on the first poll). Earlier polls read all-low.
    pub fn inputs_high_after(&mut self, polls: usize, mask: u64) {
        self.inputs_high_after = Some(polls);
        self.input_mask = mask;
        self.input_polls = 0;
    }

    /// Make the first fallible call issued once `call` calls have been
    /// recorded fail with [`MockFault`]. The failed call is not recorded.
    pub fn fail_on(&mut self, call: usize) {
        self.fail_at = Some(call);
    }

    /// Every recorded call in order.
    pub fn calls(&self) -> &[ApiCall] {
        &self.calls
    }

    /// Forget recorded calls (scripted values are kept).
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Values written to `channel`, in order.
    pub fn la_writes(&self, channel: LaChannel) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                ApiCall::LaWrite { channel: ch, value } if ch == channel.index() => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Levels written to the management GPIO, in order.
    pub fn mgmt_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                ApiCall::MgmtWrite(level) => Some(level),
                _ => None,
            })
            .collect()
    }

    /// Number of result-channel reads.
    pub fn result_reads(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| {
                **call
                    == ApiCall::LaRead {
                        channel: LaChannel::RESULT.index(),
                    }
            })
            .count()
    }

    fn record(&mut self, call: ApiCall) -> Result<(), MockFault> {
        if self.fail_at == Some(self.calls.len()) {
            self.fail_at = None;
            return Err(MockFault);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl ErrorType for RecordingApis {
    type Error = MockFault;
}

impl LogicAnalyzer for RecordingApis {
    fn write(&mut self, channel: LaChannel, value: u32) -> Result<(), Self::Error> {
        self.record(ApiCall::LaWrite {
            channel: channel.index(),
            value,
        })
    }

    fn read(&mut self, channel: LaChannel) -> Result<u32, Self::Error> {
        self.record(ApiCall::LaRead {
            channel: channel.index(),
        })?;
        Ok(self
            .la_values
            .get_mut(usize::from(channel.index()))
            .and_then(VecDeque::pop_front)
            .unwrap_or(0))
    }

    fn output_enable(&mut self, group: LaGroup, mask: u32) -> Result<(), Self::Error> {
        self.record(ApiCall::LaOutputEnable {
            group: group.index(),
            mask,
        })
    }
}

impl UserGpios for RecordingApis {
    fn configure_all(&mut self, mode: GpioMode) -> Result<(), Self::Error> {
        self.record(ApiCall::ConfigureAll(mode))
    }

    fn configure(&mut self, pin: GpioPin, mode: GpioMode) -> Result<(), Self::Error> {
        self.record(ApiCall::Configure {
            pin: pin.index(),
            mode,
        })
    }

    fn load_configs(&mut self) -> Result<(), Self::Error> {
        self.record(ApiCall::LoadConfigs)
    }

    fn read_inputs(&mut self) -> Result<u64, Self::Error> {
        self.record(ApiCall::ReadInputs)?;
        if let Some(word) = self.input_words.pop_front() {
            return Ok(word);
        }
        let poll = self.input_polls;
        self.input_polls = self.input_polls.saturating_add(1);
        match self.inputs_high_after {
            Some(after) if poll >= after => Ok(self.input_mask),
            _ => Ok(0),
        }
    }
}

impl ManagementGpio for RecordingApis {
    fn enable_output(&mut self) -> Result<(), Self::Error> {
        self.record(ApiCall::MgmtOutputEnable)
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        self.record(ApiCall::MgmtWrite(high))
    }
}

impl Housekeeping for RecordingApis {
    fn enable_hk_spi(&mut self, enable: bool) -> Result<(), Self::Error> {
        self.record(ApiCall::HkSpi(enable))
    }
}

impl DummyDelay for RecordingApis {
    fn dummy_delay(&mut self, units: u32) {
        self.calls.push(ApiCall::Delay(units));
    }
}
