//! Peripheral reset
//!
//! Each module has a reset line in one of IPRST0, IPRST1 or IPRST2. A module
//! index packs the byte offset of that register from IPRST0 into bits 31:24
//! and the bit position of the line into bits 23:0.

use super::{Error, Sys};
use crate::regs::{Reg, RegisterBus};
use num_enum::{IntoPrimitive, TryFromPrimitive};

macro_rules! modules {
    ($($name:ident => ($offset:literal, $bit:literal)),* $(,)?) => {
        /// Resettable module, the discriminant is the module index
        #[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u32)]
        pub enum Module {
            $($name = ($offset << 24) | $bit,)*
        }

        impl Module {
            pub const ALL: &'static [Module] = &[$(Module::$name),*];
        }
    };
}

modules! {
    // IPRST0
    Pdma0 => (0x0, 2),
    Ebi => (0x0, 3),
    Usbh => (0x0, 4),
    Sdh0 => (0x0, 6),
    Crc => (0x0, 7),
    Crpt => (0x0, 12),
    Ks => (0x0, 13),
    Pdma1 => (0x0, 14),
    // IPRST1
    Gpio => (0x4, 1),
    Tmr0 => (0x4, 2),
    Tmr1 => (0x4, 3),
    Tmr2 => (0x4, 4),
    Tmr3 => (0x4, 5),
    Acmp01 => (0x4, 7),
    I2c0 => (0x4, 8),
    I2c1 => (0x4, 9),
    I2c2 => (0x4, 10),
    Qspi0 => (0x4, 12),
    Spi0 => (0x4, 13),
    Spi1 => (0x4, 14),
    Spi2 => (0x4, 15),
    Uart0 => (0x4, 16),
    Uart1 => (0x4, 17),
    Uart2 => (0x4, 18),
    Uart3 => (0x4, 19),
    Uart4 => (0x4, 20),
    Uart5 => (0x4, 21),
    Can0 => (0x4, 24),
    Otg => (0x4, 26),
    Usbd => (0x4, 27),
    Eadc => (0x4, 28),
    I2s0 => (0x4, 29),
    Lcd => (0x4, 30),
    Trng => (0x4, 31),
    // IPRST2
    Sc0 => (0x8, 0),
    Sc1 => (0x8, 1),
    Sc2 => (0x8, 2),
    Spi3 => (0x8, 6),
    Usci0 => (0x8, 8),
    Usci1 => (0x8, 9),
    Dac => (0x8, 12),
    Epwm0 => (0x8, 16),
    Epwm1 => (0x8, 17),
    Bpwm0 => (0x8, 18),
    Bpwm1 => (0x8, 19),
    Qei0 => (0x8, 22),
    Qei1 => (0x8, 23),
    Ecap0 => (0x8, 26),
    Ecap1 => (0x8, 27),
    Tmr4 => (0x8, 28),
    Tmr5 => (0x8, 29),
}

impl Module {
    pub fn index(self) -> u32 {
        self.into()
    }

    pub fn reset_line(self) -> ResetLine {
        ResetLine::split(self.index())
    }
}

/// Location of a single reset line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetLine {
    reg: Reg,
    mask: u32,
}

impl ResetLine {
    /// Byte offsets from IPRST0 that hold reset lines
    const OFFSETS: [usize; 3] = [0x0, 0x4, 0x8];

    const fn split(index: u32) -> Self {
        Self {
            reg: Reg::IPRST0.offset_by((index >> 24) as usize),
            mask: 1 << (index & 0x00FF_FFFF),
        }
    }

    /// Resolve a raw module index, `None` if it doesn't name a reset line
    pub fn decode(index: u32) -> Option<Self> {
        let offset = (index >> 24) as usize;
        let bit = index & 0x00FF_FFFF;

        if bit >= u32::BITS || !Self::OFFSETS.contains(&offset) {
            return None;
        }

        Some(Self::split(index))
    }

    pub fn reg(&self) -> Reg {
        self.reg
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }
}

impl<B: RegisterBus> Sys<B> {
    /// Pulse the reset line of `module`: assert, then release
    pub fn reset_module(&mut self, module: Module) {
        trace!("reset {}", module);
        self.pulse(module.reset_line());
    }

    /// [`Sys::reset_module`] for a raw module index
    pub fn reset_module_index(&mut self, index: u32) -> Result<(), Error> {
        let line = ResetLine::decode(index).ok_or(Error::InvalidModuleIndex(index))?;
        trace!("reset line {} mask {=u32:#x}", line.reg, line.mask);

        self.pulse(line);

        Ok(())
    }

    fn pulse(&mut self, line: ResetLine) {
        self.bus.modify(line.reg, |bits| bits | line.mask);
        self.bus.modify(line.reg, |bits| bits & !line.mask);
    }
}
