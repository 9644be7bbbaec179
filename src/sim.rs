//! Simulated SYS block for host tests

use crate::regs::{Reg, RegisterBus};
use std::cell::RefCell;
use std::collections::HashMap;

/// Polls value meaning "never clears"
pub const STUCK: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Pending {
    mask: u32,
    polls: u32,
    then_set: u32,
    then_clear: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Kind {
    w1c: u32,
    ro: u32,
}

#[derive(Debug, Clone, Copy)]
struct Trigger {
    on: Reg,
    target: Reg,
    pending: Pending,
}

#[derive(Default)]
pub struct SimBus {
    words: RefCell<HashMap<Reg, u32>>,
    pending: RefCell<HashMap<Reg, Pending>>,
    kinds: HashMap<Reg, Kind>,
    triggers: Vec<Trigger>,
    writes: Vec<(Reg, u32)>,
}

impl SimBus {
    pub fn new() -> Self {
        let mut sim = Self::default();
        sim.kinds.insert(
            Reg::RSTSTS,
            Kind {
                w1c: 0xFFFF_FFFF,
                ro: 0,
            },
        );
        sim.kinds.insert(
            Reg::PLSTS,
            Kind {
                w1c: crate::regs::plsts::MVRCERR,
                ro: !crate::regs::plsts::MVRCERR,
            },
        );
        sim
    }

    /// Preload a register without logging a write
    pub fn set(&mut self, reg: Reg, bits: u32) {
        self.words.borrow_mut().insert(reg, bits);
    }

    /// Stored value, without busy bits and without consuming a poll
    pub fn peek(&self, reg: Reg) -> u32 {
        self.words.borrow().get(&reg).copied().unwrap_or(0)
    }

    /// Report `mask` as set for the next `polls` reads of `reg`
    pub fn busy_for(&mut self, reg: Reg, mask: u32, polls: u32) {
        self.pending.borrow_mut().insert(
            reg,
            Pending {
                mask,
                polls,
                then_set: 0,
                then_clear: 0,
            },
        );
    }

    /// After each write to `on`, `target` reports `mask` busy for `polls`
    /// reads, then has `then_set` set and `then_clear` cleared
    pub fn busy_after_write(
        &mut self,
        on: Reg,
        target: Reg,
        mask: u32,
        polls: u32,
        then_set: u32,
        then_clear: u32,
    ) {
        self.triggers.push(Trigger {
            on,
            target,
            pending: Pending {
                mask,
                polls,
                then_set,
                then_clear,
            },
        });
    }

    pub fn writes(&self) -> &[(Reg, u32)] {
        &self.writes
    }

    pub fn writes_to(&self, reg: Reg) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, bits)| *bits)
            .collect()
    }
}

impl RegisterBus for SimBus {
    fn read(&self, reg: Reg) -> u32 {
        let mut pending = self.pending.borrow_mut();
        let mut words = self.words.borrow_mut();
        let word = words.entry(reg).or_insert(0);

        match pending.get(&reg).copied() {
            Some(p) if p.polls == 0 => {
                *word = (*word & !p.then_clear) | p.then_set;
                pending.remove(&reg);
                *word
            }
            Some(p) => {
                if p.polls != STUCK {
                    pending.insert(
                        reg,
                        Pending {
                            polls: p.polls - 1,
                            ..p
                        },
                    );
                }
                *word | p.mask
            }
            None => *word,
        }
    }

    fn write(&mut self, reg: Reg, bits: u32) {
        self.writes.push((reg, bits));

        let kind = self.kinds.get(&reg).copied().unwrap_or_default();
        {
            let mut words = self.words.borrow_mut();
            let word = words.entry(reg).or_insert(0);
            *word = (*word & kind.ro)
                | (*word & kind.w1c & !bits)
                | (bits & !kind.ro & !kind.w1c);
        }

        for t in self.triggers.iter().filter(|t| t.on == reg) {
            self.pending.borrow_mut().insert(t.target, t.pending);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn busy_clears_after_polls() {
        let mut sim = SimBus::new();
        sim.busy_for(Reg::BODCTL, 0x8000_0000, 2);

        assert_eq!(sim.read(Reg::BODCTL), 0x8000_0000);
        assert_eq!(sim.read(Reg::BODCTL), 0x8000_0000);
        assert_eq!(sim.read(Reg::BODCTL), 0);
    }

    #[test]
    fn write_one_to_clear() {
        let mut sim = SimBus::new();
        sim.set(Reg::RSTSTS, 0b1011);
        sim.write(Reg::RSTSTS, 0b0010);

        assert_eq!(sim.peek(Reg::RSTSTS), 0b1001);
    }
}
