//! SRAM power modes
//!
//! Every SRAM bank and peripheral SRAM has a 2-bit power mode field in
//! `SRAMPC0` or `SRAMPC1`. A region is selected by its field mask, the field
//! position is the lowest set bit of that mask.

use super::{Busy, Error, Sys};
use crate::regs::{srampc, Reg, RegisterBus};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Scanning for the field position stops here. A selector without any set
/// bit below it resolves to this position.
const FIELD_SCAN_END: u32 = 30;

/// First peripheral SRAM field in `SRAMPC1`
const PERIPHERAL_FIELD_START: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SramPowerMode {
    Normal = 0b00,
    /// Content kept, no access
    Retention = 0b01,
    /// Content lost
    PowerShutDown = 0b10,
}

/// System SRAM bank, see the address ranges per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SystemSram {
    /// 0x2000_0000 - 0x2000_0FFF
    Sram0Pm0,
    /// 0x2000_1000 - 0x2000_1FFF
    Sram0Pm1,
    /// 0x2000_2000 - 0x2000_3FFF
    Sram0Pm2,
    /// 0x2000_4000 - 0x2000_5FFF
    Sram0Pm3,
    /// 0x2000_6000 - 0x2000_7FFF
    Sram0Pm4,
    /// 0x2000_8000 - 0x2000_BFFF
    Sram1Pm0,
    /// 0x2000_C000 - 0x2000_FFFF
    Sram1Pm1,
    /// 0x2001_0000 - 0x2001_3FFF
    Sram1Pm2,
    /// 0x2001_4000 - 0x2001_7FFF
    Sram1Pm3,
    /// 0x2001_8000 - 0x2001_BFFF
    Sram1Pm4,
    /// 0x2001_C000 - 0x2001_FFFF
    Sram1Pm5,
    /// 0x2002_0000 - 0x2002_3FFF
    Sram1Pm6,
    /// 0x2002_4000 - 0x2002_7FFF
    Sram1Pm7,
    /// 0x2002_8000 - 0x2002_BFFF
    Sram2Pm0,
    /// 0x2002_C000 - 0x2002_FFFF
    Sram2Pm1,
    /// 0x2003_0000 - 0x2003_3FFF
    Sram2Pm2,
    /// 0x2003_4000 - 0x2003_7FFF
    Sram2Pm3,
    /// 0x2003_8000 - 0x2003_BFFF
    Sram2Pm4,
    /// 0x2003_C000 - 0x2003_FFFF
    Sram2Pm5,
}

impl SystemSram {
    /// Number of bank fields in `SRAMPC0`
    const PC0_FIELDS: u8 = 15;

    /// Banks from `Sram2Pm2` on are controlled through `SRAMPC1`
    pub fn in_pc1(self) -> bool {
        u8::from(self) >= Self::PC0_FIELDS
    }

    /// Field mask in its power control register
    pub fn mask(self) -> u32 {
        let idx = u8::from(self) % Self::PC0_FIELDS;

        0b11 << (2 * u32::from(idx))
    }

    /// Power mode word as taken by [`Sys::set_ssram_power_mode_bits`]
    pub fn mode_bits(self, mode: SramPowerMode) -> u32 {
        let bits = u32::from(u8::from(mode));

        if self.in_pc1() {
            bits | srampc::SELECT_PC1
        } else {
            bits
        }
    }
}

/// Peripheral SRAM, all fields are in `SRAMPC1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PeripheralSram {
    Can = 16,
    Usbd = 18,
    Pdma0 = 20,
    Pdma1 = 22,
    FmcCache = 24,
    Rsa = 26,
    Ks = 28,
}

impl PeripheralSram {
    pub fn mask(self) -> u32 {
        0b11 << u32::from(u8::from(self))
    }
}

/// Position of the lowest set bit of `sel` in `start..30`, 30 if none
fn field_position(sel: u32, start: u32) -> u32 {
    (start..FIELD_SCAN_END)
        .find(|&pos| sel & (1u32 << pos) != 0)
        .unwrap_or(FIELD_SCAN_END)
}

impl<B: RegisterBus> Sys<B> {
    /// Set the power mode of a system SRAM bank
    pub fn set_ssram_power_mode(
        &mut self,
        region: SystemSram,
        mode: SramPowerMode,
    ) -> Result<(), Error> {
        self.set_ssram_power_mode_bits(region.mask(), region.mode_bits(mode))
    }

    /// Set system SRAM power mode from raw selector and mode words
    ///
    /// Bit 31 of `mode` selects `SRAMPC1`, otherwise `SRAMPC0` is written.
    /// The mode is shifted in at the lowest set bit of `sel`.
    pub fn set_ssram_power_mode_bits(&mut self, sel: u32, mode: u32) -> Result<(), Error> {
        let pos = field_position(sel, 0);

        if mode & srampc::SELECT_PC1 != 0 {
            self.program_sram(Reg::SRAMPC1, Busy::SramPowerControl1, sel, mode, pos)
        } else {
            self.program_sram(Reg::SRAMPC0, Busy::SramPowerControl0, sel, mode, pos)
        }
    }

    /// Set the power mode of a peripheral SRAM
    pub fn set_psram_power_mode(
        &mut self,
        region: PeripheralSram,
        mode: SramPowerMode,
    ) -> Result<(), Error> {
        self.set_psram_power_mode_bits(region.mask(), u32::from(u8::from(mode)))
    }

    /// Set peripheral SRAM power mode from raw selector and mode words
    ///
    /// Always writes `SRAMPC1`, the field position is searched from bit 16.
    pub fn set_psram_power_mode_bits(&mut self, sel: u32, mode: u32) -> Result<(), Error> {
        let pos = field_position(sel, PERIPHERAL_FIELD_START);

        self.program_sram(Reg::SRAMPC1, Busy::SramPowerControl1, sel, mode, pos)
    }

    fn program_sram(
        &mut self,
        reg: Reg,
        busy: Busy,
        sel: u32,
        mode: u32,
        pos: u32,
    ) -> Result<(), Error> {
        trace!("SRAM power {} sel {=u32:#x} mode {=u32:#x} at {=u32}", reg, sel, mode, pos);
        self.wait_clear(reg, srampc::PCBUSY, busy)?;

        self.bus.modify(reg, |bits| (bits & !sel) | (mode << pos));

        Ok(())
    }
}
