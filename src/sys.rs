//! SYS System Manager
//!
//! The System Manager owns reset sequencing, the brown-out detector, the core
//! power level and main voltage regulator selection as well as SRAM power
//! modes.
//!
//! Most SYS registers are write-protected. The protection has to be disabled
//! (see `REGLCTL`) before calling any of the mutating methods here, this
//! driver never touches the lock itself, it can only report its state through
//! [`Sys::is_register_locked`].
//!
//! Operations that depend on the hardware finishing a previous write poll the
//! corresponding busy flag. The number of polls is bounded by
//! [`Config::poll_budget`], running out of polls is reported as
//! [`Error::Timeout`].

mod bod;
mod pl;
mod rst;
mod sram;

pub use bod::{BodLevel, BodMode, BodctlR};
pub use pl::{PlctlR, PlstsR, PowerLevel, Regulated, Regulator};
pub use rst::{Module, ResetLine};
pub use sram::{PeripheralSram, SramPowerMode, SystemSram};

use crate::poll::{self, Expired};
use crate::regs::{iprst0, reglctl, rststs, vrefctl, Mmio, Reg, RegisterBus};
use crate::time::Hertz;
use core::sync::atomic::{AtomicBool, Ordering};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Busy flag that was still set when the poll budget ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Busy {
    /// `BODCTL.WRBUSY`
    BodWrite,
    /// `PLCTL.WRBUSY` before a power level write
    PowerLevelWrite,
    /// `PLSTS.PLCBUSY`
    PowerLevelChange,
    /// `PLCTL.WRBUSY` before a regulator write
    RegulatorWrite,
    /// `PLSTS.MVRCBUSY`
    RegulatorChange,
    /// `SRAMPC0.PCBUSY`
    SramPowerControl0,
    /// `SRAMPC1.PCBUSY`
    SramPowerControl1,
}

/// Return value of a timed out C-style call
pub const SYS_ERR_TIMEOUT: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A busy flag didn't clear within the poll budget
    Timeout(Busy),
    /// Module index whose byte offset doesn't select IPRST0..IPRST2 or whose
    /// bit position is out of range
    InvalidModuleIndex(u32),
}

impl Error {
    /// C-style return value
    ///
    /// Timeouts map to `SYS_ERR_TIMEOUT` (-1). An invalid module index has
    /// no C counterpart and reports the same generic failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::Timeout(_) => SYS_ERR_TIMEOUT,
            Self::InvalidModuleIndex(_) => SYS_ERR_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    poll_budget: u32,
}

impl Config {
    /// Polls per wait after reset, the core runs from the 12 MHz HIRC
    pub const DEFAULT_POLL_BUDGET: u32 = 12_000_000;

    /// One poll per core clock cycle of a second, like `SYS_TIMEOUT`
    pub fn from_core_clock(hclk: Hertz) -> Self {
        Self {
            poll_budget: hclk.raw(),
        }
    }

    pub fn poll_budget(mut self, polls: u32) -> Self {
        self.poll_budget = polls;
        self
    }

    pub fn polls(&self) -> u32 {
        self.poll_budget
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_budget: Self::DEFAULT_POLL_BUDGET,
        }
    }
}

pub trait SysExt: RegisterBus + Sized {
    fn constrain(self) -> Sys<Self>;
}

impl<B: RegisterBus> SysExt for B {
    fn constrain(self) -> Sys<Self> {
        Sys::new(self, Config::default())
    }
}

/// Exclusive handle to the SYS block
pub struct Sys<B> {
    bus: B,
    config: Config,
}

impl Sys<Mmio> {
    /// Hands out the hardware SYS block, only the first call returns `Some`
    pub fn take(config: Config) -> Option<Self> {
        static TAKEN: AtomicBool = AtomicBool::new(false);

        cortex_m::interrupt::free(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                return None;
            }
            TAKEN.store(true, Ordering::Relaxed);

            // SAFETY: Guarded by `TAKEN`, this is the only `Mmio`
            Some(Sys::new(unsafe { Mmio::steal() }, config))
        })
    }
}

impl<B: RegisterBus> Sys<B> {
    pub fn new(bus: B, config: Config) -> Self {
        Self { bus, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn free(self) -> B {
        self.bus
    }

    /// Clear the reset sources set in `mask` (write-1-to-clear)
    pub fn clear_reset_source(&mut self, mask: u32) {
        trace!("clear reset source {=u32:#x}", mask);
        self.bus.write(Reg::RSTSTS, mask);
    }

    /// Clear reset sources selected through the builder
    pub fn clear_reset_flags<F>(&mut self, op: F)
    where
        F: for<'w> FnOnce(&'w mut RstClr) -> &'w mut RstClr,
    {
        let mut c = RstClr::new();

        op(&mut c);

        self.clear_reset_source(c.bits());
    }

    /// Latched reset causes as raw `RSTSTS` value
    pub fn reset_source(&self) -> u32 {
        self.bus.read(Reg::RSTSTS)
    }

    pub fn reset_flags(&self) -> RststsR {
        RststsR::read_from(&self.bus)
    }

    /// `true` when the supply is below the configured brown-out level
    pub fn brownout_status(&self) -> bool {
        BodctlR::read_from(&self.bus).bodout()
    }

    /// `REGLCTL` reads 1 while the protected registers are unlocked
    pub fn is_register_locked(&self) -> bool {
        self.bus.read(Reg::REGLCTL) & reglctl::REGLCTL == 0
    }

    pub fn product_id(&self) -> u32 {
        self.bus.read(Reg::PDID)
    }

    /// Reset the whole chip including all peripherals
    ///
    /// The reset is asynchronous, execution may or may not continue past
    /// this call for a few cycles.
    pub fn reset_chip(&mut self) {
        trace!("reset chip");
        self.bus.modify(Reg::IPRST0, |bits| bits | iprst0::CHIPRST);
    }

    /// Reset the CPU only, peripherals keep their state
    pub fn reset_cpu(&mut self) {
        trace!("reset CPU");
        self.bus.modify(Reg::IPRST0, |bits| bits | iprst0::CPURST);
    }

    /// Select the internal reference voltage source
    pub fn set_vref(&mut self, vref: Vref) {
        trace!("set VREF {}", vref);
        let code = u32::from(u8::from(vref));
        self.bus
            .modify(Reg::VREFCTL, |bits| (bits & !vrefctl::VREFCTL) | code);
    }

    /// Poll until `mask` in `reg` reads 0
    fn wait_clear(&self, reg: Reg, mask: u32, busy: Busy) -> Result<(), Error> {
        poll::wait_while(self.config.poll_budget, || self.bus.is_set(reg, mask)).map_err(
            |Expired| {
                warn!("{} still busy after {=u32} polls", busy, self.config.poll_budget);
                Error::Timeout(busy)
            },
        )
    }
}

config_reg_u32! {
    RststsR, Reg::RSTSTS, [
        porf => (bool, bool, [0:0], "Power-on reset"),
        pinrf => (bool, bool, [1:1], "nRESET pin reset"),
        wdtrf => (bool, bool, [2:2], "Watchdog timer or window watchdog reset"),
        lvrf => (bool, bool, [3:3], "Low voltage reset"),
        bodrf => (bool, bool, [4:4], "Brown-out detector reset"),
        sysrf => (bool, bool, [5:5], "System reset requested through `AIRCR.SYSRESETREQ`"),
        cpurf => (bool, bool, [7:7], "CPU reset through `IPRST0.CPURST`"),
        cpulkrf => (bool, bool, [8:8], "CPU lockup reset"),
    ]
}

clear_status_reg_u32! {
    RstClr, [
        porf => (0, "Clear power-on reset flag"),
        pinrf => (1, "Clear nRESET pin reset flag"),
        wdtrf => (2, "Clear watchdog reset flag"),
        lvrf => (3, "Clear low voltage reset flag"),
        bodrf => (4, "Clear brown-out reset flag"),
        sysrf => (5, "Clear system reset flag"),
        cpurf => (7, "Clear CPU reset flag"),
        cpulkrf => (8, "Clear CPU lockup reset flag"),
    ]
}

/// Every reset source flag
pub const ALL_RESET_SOURCES: u32 = rststs::PORF
    | rststs::PINRF
    | rststs::WDTRF
    | rststs::LVRF
    | rststs::BODRF
    | rststs::SYSRF
    | rststs::CPURF
    | rststs::CPULKRF;

/// Internal reference voltage, `VREFCTL[4:0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Vref {
    /// External VREF pin
    Pin = 0x00,
    V1_6 = 0x03,
    V2_0 = 0x07,
    V2_5 = 0x0B,
    V3_0 = 0x0F,
}
