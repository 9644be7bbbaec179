//! Brown-out Detector
//!
//! `BODCTL` only accepts writes while `WRBUSY` is clear. Both methods check
//! the flag once, after polling, and leave the register untouched when it is
//! still set.

use super::{Busy, Error, Sys};
use crate::regs::{bodctl, Reg, RegisterBus};
use num_enum::{FromPrimitive, IntoPrimitive};

/// What a brown-out event does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BodMode {
    /// Generate a system reset
    Reset,
    /// Raise the BOD interrupt
    Interrupt,
}

impl BodMode {
    fn bits(self) -> u32 {
        match self {
            Self::Reset => bodctl::BODRSTEN,
            Self::Interrupt => 0,
        }
    }
}

impl From<bool> for BodMode {
    fn from(rsten: bool) -> Self {
        if rsten {
            Self::Reset
        } else {
            Self::Interrupt
        }
    }
}

/// Brown-out threshold voltage, `BODCTL.BODVL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BodLevel {
    #[default]
    V1_6 = 0b000,
    V1_8 = 0b001,
    V2_0 = 0b010,
    V2_2 = 0b011,
    V2_4 = 0b100,
    V2_6 = 0b101,
    V2_8 = 0b110,
    V3_0 = 0b111,
}

impl BodLevel {
    fn bits(self) -> u32 {
        mask_u32!(MASK, OFFSET, [18:16]);

        let mut bits = 0;
        set_u32!(bits, u32::from(u8::from(self)), MASK, OFFSET);
        bits
    }
}

config_reg_u32! {
    BodctlR, Reg::BODCTL, [
        boden => (bool, bool, [0:0], "Brown-out detector enabled"),
        bodrsten => (BodMode, bool, [3:3], "Brown-out reset or interrupt mode"),
        bodif => (bool, bool, [4:4], "Brown-out interrupt flag"),
        bodout => (bool, bool, [6:6], "Detector output, `true` while VDD is below the threshold"),
        bodvl => (BodLevel, u8, [18:16], "Threshold voltage"),
        wrbusy => (bool, bool, [31:31], "Previous write still in progress"),
    ]
}

impl<B: RegisterBus> Sys<B> {
    /// Enable the brown-out detector with the given mode and threshold
    ///
    /// All `BODCTL` bits other than the mode and level fields are kept.
    pub fn enable_bod(&mut self, mode: BodMode, level: BodLevel) -> Result<(), Error> {
        trace!("enable BOD {} {}", mode, level);
        self.wait_bod_idle()?;

        self.bus.modify(Reg::BODCTL, |bits| {
            let bits = bits & !(bodctl::BODRSTEN | bodctl::BODVL);

            bits | mode.bits() | level.bits() | bodctl::BODEN
        });

        Ok(())
    }

    /// Disable the brown-out detector, mode and level are kept
    pub fn disable_bod(&mut self) -> Result<(), Error> {
        trace!("disable BOD");
        self.wait_bod_idle()?;

        self.bus.modify(Reg::BODCTL, |bits| bits & !bodctl::BODEN);

        Ok(())
    }

    pub fn bod_config(&self) -> BodctlR {
        BodctlR::read_from(&self.bus)
    }

    fn wait_bod_idle(&self) -> Result<(), Error> {
        // A failed wait falls through to the single check below
        let _ = self.wait_clear(Reg::BODCTL, bodctl::WRBUSY, Busy::BodWrite);

        if self.bus.is_set(Reg::BODCTL, bodctl::WRBUSY) {
            return Err(Error::Timeout(Busy::BodWrite));
        }

        Ok(())
    }
}
