//! Memory-mapped Caravel management-SoC backend
//!
//! [`Caravel`] implements every firmware-API trait on top of a
//! [`RegisterBus`]. On the management core the bus is [`VolatileBus`]; in
//! host tests it is any recorder that implements the trait.
//!
//! # Register layout
//!
//! | Block | Base | Stride | Words |
//! |-------|------|--------|-------|
//! | LA data | `la_data` | 4 | 4 |
//! | LA output enable (`oenb`) | `la_oenb` | 4 | 4 |
//! | LA input enable (`iena`) | `la_iena` | 4 | 4 |
//! | Pad control (`mprj_io`) | `mprj_io` | 4 | 38 |
//!
//! The remaining registers are single words, see [`RegisterMap`].
//!
//! [`UartTx`] is the byte sink for log output. It polls the transmit-full
//! status, when the SoC has one, before every data write.

use crate::delay::DummyDelay;
use crate::gpio::{GpioMode, UserGpios};
use crate::la::LogicAnalyzer;
use crate::management::{Housekeeping, ManagementGpio};
use crate::{ErrorType, GpioPin, LaChannel, LaGroup};

/// Backend errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MmioError {
    /// The pad-ring serial transfer never reported idle.
    #[error("pad configuration transfer still busy after {polls} polls")]
    TransferTimeout {
        /// Number of status polls performed.
        polls: u32,
    },
    /// The UART transmitter stayed full.
    #[error("UART transmitter still full after {polls} polls")]
    UartTimeout {
        /// Number of status polls performed.
        polls: u32,
    },
}

/// 32-bit register access.
pub trait RegisterBus {
    /// Read the word at `addr`.
    fn read(&mut self, addr: u32) -> u32;

    /// Write `value` to the word at `addr`.
    fn write(&mut self, addr: u32, value: u32);
}

/// Volatile pointer access to the physical register space.
pub struct VolatileBus {
    _private: (),
}

impl VolatileBus {
    /// Create the bus.
    ///
    /// # Safety
    ///
    /// Every address later passed to [`RegisterBus::read`] or
    /// [`RegisterBus::write`] must be a valid, aligned, memory-mapped
    /// register on the running target, and no other code may access those
    /// registers concurrently.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for VolatileBus {
    fn read(&mut self, addr: u32) -> u32 {
        let ptr = addr as usize as *const u32;
        // SAFETY: `VolatileBus::new` requires every address to be a valid,
        // aligned register owned exclusively by this bus.
        unsafe { ptr.read_volatile() }
    }

    fn write(&mut self, addr: u32, value: u32) {
        let ptr = addr as usize as *mut u32;
        // SAFETY: see `read`.
        unsafe { ptr.write_volatile(value) }
    }
}

/// Register addresses of the management SoC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    /// First LA data word (`reg_la0_data`).
    pub la_data: u32,
    /// First LA output-enable word (`reg_la0_oenb`).
    pub la_oenb: u32,
    /// First LA input-enable word (`reg_la0_iena`).
    pub la_iena: u32,
    /// Pad-ring transfer control/status (`reg_mprj_xfer`).
    pub mprj_xfer: u32,
    /// Pad inputs 31:0 (`reg_mprj_datal`).
    pub mprj_datal: u32,
    /// Pad inputs 37:32 (`reg_mprj_datah`).
    pub mprj_datah: u32,
    /// First pad control word (`reg_mprj_io_0`).
    pub mprj_io: u32,
    /// Management GPIO data (`reg_gpio_data`).
    pub gpio_data: u32,
    /// Management GPIO output enable (`reg_gpio_ena`).
    pub gpio_oe: u32,
    /// Housekeeping SPI disable (`reg_hkspi_disable`).
    pub hkspi_disable: u32,
    /// UART transmit data (`reg_uart_data`).
    pub uart_data: u32,
    /// UART enable (`reg_uart_enable`).
    pub uart_enable: u32,
    /// UART transmit-full status, bit 0 set while a byte is pending.
    /// `None` when the data write itself stalls until the byte is taken.
    pub uart_txfull: Option<u32>,
}

impl RegisterMap {
    /// Caravel management SoC register map, picorv32 `mgmt_soc` (`defs.h`).
    ///
    /// Its `simpleuart` holds the bus on a data write until the previous
    /// byte has left the shifter, so there is no transmit-full register.
    pub const CARAVEL: Self = Self {
        la_data: 0x2500_0000,
        la_oenb: 0x2500_0010,
        la_iena: 0x2500_0020,
        mprj_xfer: 0x2600_0000,
        mprj_datal: 0x2600_000c,
        mprj_datah: 0x2600_0010,
        mprj_io: 0x2600_0024,
        gpio_data: 0x2100_0000,
        gpio_oe: 0x2100_0004,
        hkspi_disable: 0x2610_0010,
        uart_data: 0x2000_0004,
        uart_enable: 0x2000_0008,
        uart_txfull: None,
    };

    /// Address of word `index` in a block starting at `base`.
    #[must_use]
    pub const fn word(base: u32, index: u8) -> u32 {
        base.wrapping_add((index as u32).wrapping_mul(4))
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::CARAVEL
    }
}

/// Pad inputs 37:32 live in the low six bits of `mprj_datah`.
const DATAH_MASK: u32 = 0x3f;

/// Memory-mapped firmware-API backend.
pub struct Caravel<B> {
    bus: B,
    map: RegisterMap,
    xfer_poll_limit: u32,
    delay: Option<crate::delay::SpinDelay>,
}

impl<B: RegisterBus> Caravel<B> {
    /// Default bound on pad-ring transfer polls.
    pub const DEFAULT_XFER_POLL_LIMIT: u32 = 100_000;

    /// Create a backend over `bus` using `map`.
    pub fn new(bus: B, map: RegisterMap) -> Self {
        Self {
            bus,
            map,
            xfer_poll_limit: Self::DEFAULT_XFER_POLL_LIMIT,
            delay: None,
        }
    }

    /// Bound the pad-ring transfer wait to `polls` status reads.
    pub fn with_xfer_poll_limit(mut self, polls: u32) -> Self {
        self.xfer_poll_limit = polls;
        self
    }

    /// Implement [`DummyDelay`] with a busy loop of `spins_per_unit`
    /// iterations per unit. Without this, delays return immediately.
    pub fn with_spin_delay(mut self, spins_per_unit: u32) -> Self {
        self.delay = Some(crate::delay::SpinDelay::new(spins_per_unit));
        self
    }

    /// Turn on the UART transmitter.
    pub fn enable_uart(&mut self) {
        self.bus.write(self.map.uart_enable, 1);
    }

    /// The register map in use.
    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    /// Return the underlying bus.
    pub fn into_bus(self) -> B {
        self.bus
    }
}

/// UART transmitter with bounded backpressure.
pub struct UartTx<B> {
    bus: B,
    data: u32,
    txfull: Option<u32>,
    poll_limit: u32,
}

impl<B: RegisterBus> UartTx<B> {
    /// Default bound on transmit-full polls per byte.
    pub const DEFAULT_POLL_LIMIT: u32 = 10_000;

    /// Transmitter at the UART registers of `map`.
    pub fn new(bus: B, map: &RegisterMap) -> Self {
        Self {
            bus,
            data: map.uart_data,
            txfull: map.uart_txfull,
            poll_limit: Self::DEFAULT_POLL_LIMIT,
        }
    }

    /// Bound the wait for room to `polls` status reads per byte.
    pub fn with_poll_limit(mut self, polls: u32) -> Self {
        self.poll_limit = polls;
        self
    }

    /// Write `bytes` in order. Stops at the first byte that finds the
    /// transmitter still full after the poll limit.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), MmioError> {
        for &byte in bytes {
            self.wait_ready()?;
            self.bus.write(self.data, u32::from(byte));
        }
        Ok(())
    }

    /// Return the underlying bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    fn wait_ready(&mut self) -> Result<(), MmioError> {
        let Some(txfull) = self.txfull else {
            return Ok(());
        };
        for _ in 0..self.poll_limit {
            if self.bus.read(txfull) & 1 == 0 {
                return Ok(());
            }
        }
        Err(MmioError::UartTimeout {
            polls: self.poll_limit,
        })
    }
}

impl<B> ErrorType for Caravel<B> {
    type Error = MmioError;
}

impl<B: RegisterBus> LogicAnalyzer for Caravel<B> {
    fn write(&mut self, channel: LaChannel, value: u32) -> Result<(), Self::Error> {
        let addr = RegisterMap::word(self.map.la_data, channel.index());
        self.bus.write(addr, value);
        Ok(())
    }

    fn read(&mut self, channel: LaChannel) -> Result<u32, Self::Error> {
        let addr = RegisterMap::word(self.map.la_data, channel.index());
        Ok(self.bus.read(addr))
    }

    fn output_enable(&mut self, group: LaGroup, mask: u32) -> Result<(), Self::Error> {
        // Driven lines must also have their input path enabled so the
        // management side can read back what it drives.
        self.bus
            .write(RegisterMap::word(self.map.la_oenb, group.index()), mask);
        self.bus
            .write(RegisterMap::word(self.map.la_iena, group.index()), mask);
        Ok(())
    }
}

impl<B: RegisterBus> UserGpios for Caravel<B> {
    fn configure_all(&mut self, mode: GpioMode) -> Result<(), Self::Error> {
        for pin in GpioPin::all() {
            self.configure(pin, mode)?;
        }
        Ok(())
    }

    fn configure(&mut self, pin: GpioPin, mode: GpioMode) -> Result<(), Self::Error> {
        let addr = RegisterMap::word(self.map.mprj_io, pin.index());
        self.bus.write(addr, mode.bits());
        Ok(())
    }

    fn load_configs(&mut self) -> Result<(), Self::Error> {
        self.bus.write(self.map.mprj_xfer, 1);
        for _ in 0..self.xfer_poll_limit {
            if self.bus.read(self.map.mprj_xfer) & 1 == 0 {
                return Ok(());
            }
        }
        Err(MmioError::TransferTimeout {
            polls: self.xfer_poll_limit,
        })
    }

    fn read_inputs(&mut self) -> Result<u64, Self::Error> {
        let low = u64::from(self.bus.read(self.map.mprj_datal));
        let high = u64::from(self.bus.read(self.map.mprj_datah) & DATAH_MASK);
        Ok(low | high.wrapping_shl(32))
    }
}

impl<B: RegisterBus> ManagementGpio for Caravel<B> {
    fn enable_output(&mut self) -> Result<(), Self::Error> {
        self.bus.write(self.map.gpio_oe, 1);
        Ok(())
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        self.bus.write(self.map.gpio_data, u32::from(high));
        Ok(())
    }
}

impl<B: RegisterBus> Housekeeping for Caravel<B> {
    fn enable_hk_spi(&mut self, enable: bool) -> Result<(), Self::Error> {
        self.bus.write(self.map.hkspi_disable, u32::from(!enable));
        Ok(())
    }
}

impl<B> DummyDelay for Caravel<B> {
    fn dummy_delay(&mut self, units: u32) {
        if let Some(delay) = self.delay.as_mut() {
            delay.dummy_delay(units);
        }
    }
}
