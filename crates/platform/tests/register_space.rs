//! Property-based tests for register-space newtypes and the Caravel backend.
//! Verifies indices stay inside their register blocks for ALL inputs.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeMap;

use platform::{
    Caravel, GpioMode, GpioPin, LaChannel, LaGroup, LogicAnalyzer, RegisterBus, RegisterMap,
    UserGpios,
};

#[derive(Default)]
struct MapBus {
    regs: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
}

impl RegisterBus for MapBus {
    fn read(&mut self, addr: u32) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.regs.insert(addr, value);
        self.writes.push((addr, value));
    }
}

proptest::proptest! {
    /// LaChannel::new never leaves 0..=3 and agrees with try_new in range.
    #[test]
    fn la_channel_clamps(index in 0u8..=255u8) {
        let channel = LaChannel::new(index);
        assert!(channel.index() <= 3);
        match LaChannel::try_new(index) {
            Ok(exact) => assert_eq!(exact, channel),
            Err(err) => {
                assert!(index > 3);
                assert_eq!(err.value, u32::from(index));
            }
        }
    }

    /// LaGroup::try_new accepts exactly 0..=3.
    #[test]
    fn la_group_range(index in 0u8..=255u8) {
        assert_eq!(LaGroup::try_new(index).is_ok(), index <= 3);
    }

    /// GpioPin::new never leaves 0..=37 and its mask is a single input bit.
    #[test]
    fn gpio_pin_clamps(index in 0u8..=255u8) {
        let pin = GpioPin::new(index);
        assert!(pin.index() <= 37);
        assert_eq!(pin.mask().count_ones(), 1);
        assert!(pin.mask() < 1u64 << 38);
        assert_eq!(GpioPin::try_new(index).is_ok(), index <= 37);
    }

    /// Pad control writes land inside the mprj_io block.
    #[test]
    fn pad_writes_stay_in_block(index in 0u8..=37u8) {
        let mut hw = Caravel::new(MapBus::default(), RegisterMap::CARAVEL);
        hw.configure(GpioPin::new(index), GpioMode::UserStdInputPullDown).unwrap();
        let bus = hw.into_bus();
        let (addr, value) = bus.writes[0];
        let base = RegisterMap::CARAVEL.mprj_io;
        assert!(addr >= base && addr < base + 38 * 4);
        assert_eq!(addr % 4, 0);
        assert_eq!(value, 0x0c00);
    }

    /// LA writes store the value verbatim in the channel's data word.
    #[test]
    fn la_write_then_read(channel in 0u8..=3u8, value in proptest::num::u32::ANY) {
        let mut hw = Caravel::new(MapBus::default(), RegisterMap::CARAVEL);
        let channel = LaChannel::new(channel);
        hw.write(channel, value).unwrap();
        assert_eq!(hw.read(channel).unwrap(), value);
    }

    /// Sampled inputs never carry bits above pad 37.
    #[test]
    fn inputs_fit_38_pads(low in proptest::num::u32::ANY, high in proptest::num::u32::ANY) {
        let mut bus = MapBus::default();
        bus.regs.insert(RegisterMap::CARAVEL.mprj_datal, low);
        bus.regs.insert(RegisterMap::CARAVEL.mprj_datah, high);
        let mut hw = Caravel::new(bus, RegisterMap::CARAVEL);
        let inputs = hw.read_inputs().unwrap();
        assert!(inputs < 1u64 << 38);
        assert_eq!(inputs as u32, low);
    }
}

#[test]
fn caravel_is_a_complete_handle() {
    fn assert_handle<H: platform::FirmwareApis>(_: &H) {}
    let hw = Caravel::new(MapBus::default(), RegisterMap::CARAVEL);
    assert_handle(&hw);
}

#[test]
fn every_group_has_distinct_enable_words() {
    let mut hw = Caravel::new(MapBus::default(), RegisterMap::CARAVEL);
    for group in LaGroup::all() {
        hw.output_enable(group, u32::from(group.index()) + 1).unwrap();
    }
    let bus = hw.into_bus();
    assert_eq!(bus.writes.len(), 8);
    assert_eq!(bus.regs.len(), 8);
}
