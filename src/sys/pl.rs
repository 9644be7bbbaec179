//! Power Level and Main Voltage Regulator
//!
//! Both settings live in `PLCTL`, which is only writable while
//! `PLCTL.WRBUSY` is clear. Completion of a change is reported separately in
//! `PLSTS`.

use super::{Busy, Error, Sys};
use crate::regs::{plctl, plsts, Reg, RegisterBus};
use num_enum::{FromPrimitive, IntoPrimitive};

/// Core voltage power level, bounds the usable system clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerLevel {
    /// Up to 96 MHz
    #[default]
    Pl0 = 0b00,
    /// Up to 84 MHz
    Pl1 = 0b01,
    /// Up to 48 MHz
    Pl2 = 0b10,
    /// Up to 4 MHz
    Pl3 = 0b11,
}

/// Main voltage regulator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Regulator {
    Ldo,
    /// Needs an inductor on the DCDC pin, otherwise the switch never finishes
    Dcdc,
}

impl From<bool> for Regulator {
    fn from(dcdc: bool) -> Self {
        if dcdc {
            Self::Dcdc
        } else {
            Self::Ldo
        }
    }
}

/// Outcome of [`Sys::set_power_regulator`] when no busy flag timed out
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Regulated {
    /// The regulator now reports the requested type
    Finished,
    /// The switch was requested, but the regulator doesn't report the
    /// requested type or the change error flag was set
    NotFinished,
    /// No switch was requested because DCDC was already active
    Unchanged,
}

impl Regulated {
    /// C-style return value: 1 when finished, 0 otherwise
    pub fn code(&self) -> i32 {
        match self {
            Self::Finished => 1,
            Self::NotFinished | Self::Unchanged => 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        *self == Self::Finished
    }
}

config_reg_u32! {
    PlctlR, Reg::PLCTL, [
        plsel => (PowerLevel, u8, [1:0], "Requested power level"),
        mvrs => (Regulator, bool, [8:8], "Requested main voltage regulator"),
        wrbusy => (bool, bool, [31:31], "`PLCTL` write in progress"),
    ]
}

config_reg_u32! {
    PlstsR, Reg::PLSTS, [
        plcbusy => (bool, bool, [0:0], "Power level change in progress"),
        mvrcbusy => (bool, bool, [1:1], "Regulator change in progress"),
        plstatus => (PowerLevel, u8, [9:8], "Active power level"),
        curmvr => (Regulator, bool, [12:12], "Active main voltage regulator"),
        mvrcerr => (bool, bool, [13:13], "Regulator change error, write 1 to clear"),
    ]
}

impl<B: RegisterBus> Sys<B> {
    /// Request a new power level and wait until it is effective
    ///
    /// A timeout on the second wait means `PLCTL` has already been written,
    /// the level change is still in flight.
    pub fn set_power_level(&mut self, level: PowerLevel) -> Result<(), Error> {
        trace!("set power level {}", level);
        self.wait_clear(Reg::PLCTL, plctl::WRBUSY, Busy::PowerLevelWrite)?;

        let sel = u32::from(u8::from(level));
        self.bus
            .modify(Reg::PLCTL, |bits| (bits & !plctl::PLSEL) | sel);

        self.wait_clear(Reg::PLSTS, plsts::PLCBUSY, Busy::PowerLevelChange)
    }

    /// Active power level
    pub fn power_level(&self) -> PowerLevel {
        PlstsR::read_from(&self.bus).plstatus()
    }

    /// Switch the main voltage regulator
    ///
    /// DCDC is only requested while LDO is active, LDO is always requested.
    /// A pending change error flag is cleared in every case, including when
    /// no switch was requested, and turns the outcome into
    /// [`Regulated::NotFinished`].
    pub fn set_power_regulator(&mut self, target: Regulator) -> Result<Regulated, Error> {
        let current = self.current_regulator();
        trace!("set regulator {} -> {}", current, target);

        let mut outcome = match (target, current) {
            (Regulator::Dcdc, Regulator::Ldo) | (Regulator::Ldo, _) => {
                self.switch_regulator(target)?
            }
            (Regulator::Dcdc, Regulator::Dcdc) => Regulated::Unchanged,
        };

        if self.bus.is_set(Reg::PLSTS, plsts::MVRCERR) {
            warn!("regulator change error");
            self.bus.write(Reg::PLSTS, plsts::MVRCERR);
            outcome = Regulated::NotFinished;
        }

        Ok(outcome)
    }

    /// Active main voltage regulator
    pub fn current_regulator(&self) -> Regulator {
        PlstsR::read_from(&self.bus).curmvr()
    }

    fn switch_regulator(&mut self, target: Regulator) -> Result<Regulated, Error> {
        self.wait_clear(Reg::PLCTL, plctl::WRBUSY, Busy::RegulatorWrite)?;

        self.bus.modify(Reg::PLCTL, |bits| match target {
            Regulator::Dcdc => bits | plctl::MVRS,
            Regulator::Ldo => bits & !plctl::MVRS,
        });

        self.wait_clear(Reg::PLSTS, plsts::MVRCBUSY, Busy::RegulatorChange)?;

        if self.current_regulator() != target {
            warn!("regulator still not {}", target);
            return Ok(Regulated::NotFinished);
        }

        Ok(Regulated::Finished)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{SimBus, STUCK};
    use crate::sys::Config;

    fn sys(sim: SimBus) -> Sys<SimBus> {
        Sys::new(sim, Config::default().poll_budget(10))
    }

    #[test]
    fn power_level_write_and_confirm() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLCTL, plctl::MVRS | 0b01);
        sim.busy_for(Reg::PLCTL, plctl::WRBUSY, 3);
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::PLCBUSY, 4, 0b10 << 8, 0);
        let mut sys = sys(sim);

        sys.set_power_level(PowerLevel::Pl2).unwrap();

        assert_eq!(sys.power_level(), PowerLevel::Pl2);
        let sim = sys.free();
        assert_eq!(sim.writes_to(Reg::PLCTL), [plctl::MVRS | 0b10]);
    }

    #[test]
    fn power_level_write_busy_stuck() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLCTL, 0b11);
        sim.busy_for(Reg::PLCTL, plctl::WRBUSY, STUCK);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_level(PowerLevel::Pl0),
            Err(Error::Timeout(Busy::PowerLevelWrite))
        );

        let sim = sys.free();
        assert!(sim.writes().is_empty());
        assert_eq!(sim.peek(Reg::PLCTL), 0b11);
    }

    #[test]
    fn power_level_change_busy_stuck_after_write() {
        let mut sim = SimBus::new();
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::PLCBUSY, STUCK, 0, 0);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_level(PowerLevel::Pl1),
            Err(Error::Timeout(Busy::PowerLevelChange))
        );
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [0b01]);
    }

    #[test]
    fn dcdc_from_ldo_confirmed() {
        let mut sim = SimBus::new();
        sim.busy_after_write(
            Reg::PLCTL,
            Reg::PLSTS,
            plsts::MVRCBUSY,
            3,
            plsts::CURMVR,
            0,
        );
        let mut sys = sys(sim);

        let outcome = sys.set_power_regulator(Regulator::Dcdc).unwrap();

        assert_eq!(outcome, Regulated::Finished);
        assert_eq!(outcome.code(), 1);
        assert_eq!(sys.current_regulator(), Regulator::Dcdc);
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [plctl::MVRS]);
    }

    #[test]
    fn dcdc_from_ldo_not_finished() {
        // No inductor: the status never leaves LDO
        let mut sim = SimBus::new();
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::MVRCBUSY, 3, 0, 0);
        let mut sys = sys(sim);

        let outcome = sys.set_power_regulator(Regulator::Dcdc).unwrap();

        assert_eq!(outcome, Regulated::NotFinished);
        assert_eq!(outcome.code(), 0);
    }

    #[test]
    fn ldo_from_dcdc_confirmed() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLCTL, plctl::MVRS | 0b01);
        sim.set(Reg::PLSTS, plsts::CURMVR);
        sim.busy_after_write(
            Reg::PLCTL,
            Reg::PLSTS,
            plsts::MVRCBUSY,
            2,
            0,
            plsts::CURMVR,
        );
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_regulator(Regulator::Ldo).unwrap(),
            Regulated::Finished
        );
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [0b01]);
    }

    #[test]
    fn ldo_from_dcdc_not_finished() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLCTL, plctl::MVRS);
        sim.set(Reg::PLSTS, plsts::CURMVR);
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::MVRCBUSY, 2, 0, 0);
        let mut sys = sys(sim);

        let outcome = sys.set_power_regulator(Regulator::Ldo).unwrap();

        assert_eq!(outcome, Regulated::NotFinished);
        assert_eq!(sys.current_regulator(), Regulator::Dcdc);
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [0]);
    }

    #[test]
    fn ldo_change_busy_timeout() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLCTL, plctl::MVRS);
        sim.set(Reg::PLSTS, plsts::CURMVR);
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::MVRCBUSY, STUCK, 0, 0);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_regulator(Regulator::Ldo),
            Err(Error::Timeout(Busy::RegulatorChange))
        );
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [0]);
    }

    #[test]
    fn ldo_is_requested_even_when_active() {
        let mut sys = sys(SimBus::new());

        assert_eq!(
            sys.set_power_regulator(Regulator::Ldo).unwrap(),
            Regulated::Finished
        );
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [0]);
    }

    #[test]
    fn dcdc_when_dcdc_active_is_unchanged() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLSTS, plsts::CURMVR);
        let mut sys = sys(sim);

        let outcome = sys.set_power_regulator(Regulator::Dcdc).unwrap();

        assert_eq!(outcome, Regulated::Unchanged);
        assert_eq!(outcome.code(), 0);
        assert!(sys.free().writes().is_empty());
    }

    #[test]
    fn stale_error_flag_cleared_without_switch() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLSTS, plsts::CURMVR | plsts::MVRCERR);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_regulator(Regulator::Dcdc).unwrap(),
            Regulated::NotFinished
        );

        let sim = sys.free();
        assert_eq!(sim.writes(), &[(Reg::PLSTS, plsts::MVRCERR)]);
        assert_eq!(sim.peek(Reg::PLSTS), plsts::CURMVR);
    }

    #[test]
    fn error_flag_overrides_confirmed_switch() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLSTS, plsts::MVRCERR);
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::MVRCBUSY, 1, plsts::CURMVR, 0);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_regulator(Regulator::Dcdc).unwrap(),
            Regulated::NotFinished
        );
        assert_eq!(sys.free().peek(Reg::PLSTS), plsts::CURMVR);
    }

    #[test]
    fn regulator_write_busy_timeout() {
        let mut sim = SimBus::new();
        sim.set(Reg::PLSTS, plsts::MVRCERR);
        sim.busy_for(Reg::PLCTL, plctl::WRBUSY, STUCK);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_regulator(Regulator::Dcdc),
            Err(Error::Timeout(Busy::RegulatorWrite))
        );

        // Short-circuits before the error flag is looked at
        let sim = sys.free();
        assert!(sim.writes().is_empty());
        assert_eq!(sim.peek(Reg::PLSTS), plsts::MVRCERR);
    }

    #[test]
    fn regulator_change_busy_timeout() {
        let mut sim = SimBus::new();
        sim.busy_after_write(Reg::PLCTL, Reg::PLSTS, plsts::MVRCBUSY, STUCK, 0, 0);
        let mut sys = sys(sim);

        assert_eq!(
            sys.set_power_regulator(Regulator::Dcdc),
            Err(Error::Timeout(Busy::RegulatorChange))
        );
        assert_eq!(sys.free().writes_to(Reg::PLCTL), [plctl::MVRS]);
    }
}
