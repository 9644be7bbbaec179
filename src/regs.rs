//! SYS register map
//!
//! Registers are addressed by their byte offset inside the SYS block. All
//! access goes through [`RegisterBus`], which is implemented by [`Mmio`] for
//! the real peripheral.

use core::marker::PhantomData;
use core::ptr;

/// See M2354 TRM, SYS base address (secure / non-secure alias)
pub const SYS_BASE: usize = s_ns!(0x4000_0000, 0x5000_0000);

/// A 32-bit register, identified by its byte offset from [`SYS_BASE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reg(usize);

impl Reg {
    /// Part Device Identification Number Register
    pub const PDID: Self = Self(0x000);
    /// System Reset Status Register
    pub const RSTSTS: Self = Self(0x004);
    /// Peripheral Reset Control Register 0
    pub const IPRST0: Self = Self(0x008);
    /// Peripheral Reset Control Register 1
    pub const IPRST1: Self = Self(0x00C);
    /// Peripheral Reset Control Register 2
    pub const IPRST2: Self = Self(0x010);
    /// Brown-out Detector Control Register
    pub const BODCTL: Self = Self(0x018);
    /// Power-on Reset Controller Register 0
    pub const PORCTL0: Self = Self(0x024);
    /// VREF Control Register
    pub const VREFCTL: Self = Self(0x028);
    /// Register Lock Control Register
    pub const REGLCTL: Self = Self(0x100);
    /// System SRAM Power Mode Control Register 0
    pub const SRAMPC0: Self = Self(0x1D0);
    /// System SRAM Power Mode Control Register 1
    pub const SRAMPC1: Self = Self(0x1D4);
    /// Power Level Control Register
    pub const PLCTL: Self = Self(0x1F8);
    /// Power Level Status Register
    pub const PLSTS: Self = Self(0x1FC);

    pub const fn offset(self) -> usize {
        self.0
    }

    /// Register located `bytes` after this one
    pub const fn offset_by(self, bytes: usize) -> Self {
        Self(self.0 + bytes)
    }
}

/// Word-wide access to the SYS block
///
/// `read` takes `&self` because reading a status register has no
/// software-visible side effects.
pub trait RegisterBus {
    fn read(&self, reg: Reg) -> u32;

    fn write(&mut self, reg: Reg, bits: u32);

    /// Read-modify-write
    fn modify<F>(&mut self, reg: Reg, op: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let bits = self.read(reg);
        self.write(reg, op(bits));
    }

    fn is_set(&self, reg: Reg, mask: u32) -> bool {
        self.read(reg) & mask != 0
    }
}

/// The memory-mapped SYS peripheral
pub struct Mmio {
    _marker: PhantomData<*const ()>,
}

impl Mmio {
    /// # SAFETY
    ///
    /// No other `Mmio` may be alive, otherwise register sequences of
    /// different owners could interleave. Prefer [`crate::sys::Sys::take`].
    pub const unsafe fn steal() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn ptr(reg: Reg) -> *mut u32 {
        (SYS_BASE + reg.offset()) as *mut u32
    }
}

impl RegisterBus for Mmio {
    fn read(&self, reg: Reg) -> u32 {
        // SAFETY: Every `Reg` is a word aligned offset inside the SYS block
        unsafe { ptr::read_volatile(Self::ptr(reg)) }
    }

    fn write(&mut self, reg: Reg, bits: u32) {
        // SAFETY: See `read`
        unsafe { ptr::write_volatile(Self::ptr(reg), bits) }
    }
}

pub mod rststs {
    pub const PORF: u32 = msk_u32!([0:0]);
    pub const PINRF: u32 = msk_u32!([1:1]);
    pub const WDTRF: u32 = msk_u32!([2:2]);
    pub const LVRF: u32 = msk_u32!([3:3]);
    pub const BODRF: u32 = msk_u32!([4:4]);
    pub const SYSRF: u32 = msk_u32!([5:5]);
    pub const CPURF: u32 = msk_u32!([7:7]);
    pub const CPULKRF: u32 = msk_u32!([8:8]);
}

pub mod iprst0 {
    pub const CHIPRST: u32 = msk_u32!([0:0]);
    pub const CPURST: u32 = msk_u32!([1:1]);
}

pub mod bodctl {
    pub const BODEN: u32 = msk_u32!([0:0]);
    pub const BODRSTEN: u32 = msk_u32!([3:3]);
    pub const BODIF: u32 = msk_u32!([4:4]);
    pub const BODOUT: u32 = msk_u32!([6:6]);
    pub const BODVL: u32 = msk_u32!([18:16]);
    pub const WRBUSY: u32 = msk_u32!([31:31]);
}

pub mod vrefctl {
    pub const VREFCTL: u32 = msk_u32!([4:0]);
}

pub mod reglctl {
    pub const REGLCTL: u32 = msk_u32!([0:0]);
}

pub mod srampc {
    /// Same position in SRAMPC0 and SRAMPC1
    pub const PCBUSY: u32 = msk_u32!([31:31]);
    /// Set in a power mode word to target SRAMPC1 instead of SRAMPC0
    pub const SELECT_PC1: u32 = msk_u32!([31:31]);
}

pub mod plctl {
    pub const PLSEL: u32 = msk_u32!([1:0]);
    pub const MVRS: u32 = msk_u32!([8:8]);
    pub const WRBUSY: u32 = msk_u32!([31:31]);
}

pub mod plsts {
    pub const PLCBUSY: u32 = msk_u32!([0:0]);
    pub const MVRCBUSY: u32 = msk_u32!([1:1]);
    pub const PLSTATUS: u32 = msk_u32!([9:8]);
    pub const CURMVR: u32 = msk_u32!([12:12]);
    pub const MVRCERR: u32 = msk_u32!([13:13]);
}
