//! Base-running rules shared by flip-cup and at-bat outcomes.

use crate::state::game::{BaseRunners, ParticipantId};

/// Home plate counts as base 0; anything past this scores.
const THIRD_BASE: u8 = 3;

impl BaseRunners {
    /// Runner standing on `base` (1 = first, 2 = second, 3 = third).
    pub fn on(&self, base: u8) -> Option<&ParticipantId> {
        match base {
            1 => self.first.as_ref(),
            2 => self.second.as_ref(),
            3 => self.third.as_ref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, base: u8) -> Option<&mut Option<ParticipantId>> {
        match base {
            1 => Some(&mut self.first),
            2 => Some(&mut self.second),
            3 => Some(&mut self.third),
            _ => None,
        }
    }

    /// Number of occupied bases.
    pub fn occupied(&self) -> usize {
        [&self.first, &self.second, &self.third]
            .into_iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// True when nobody is on base.
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Move every runner and the batter `bases` bases ahead.
    ///
    /// Returns the new runners and the number of runs scored. A batter who was
    /// already on base is simply placed again at their new base.
    pub fn advance(&self, batter: &ParticipantId, bases: u8) -> (BaseRunners, u32) {
        let mut next = BaseRunners::default();
        let mut runs = 0;

        for base in (1..=THIRD_BASE).rev() {
            let Some(runner) = self.on(base) else {
                continue;
            };
            match next.slot_mut(base + bases) {
                Some(slot) => *slot = Some(runner.clone()),
                None => runs += 1,
            }
        }

        match next.slot_mut(bases) {
            Some(slot) => *slot = Some(batter.clone()),
            None => runs += 1,
        }

        (next, runs)
    }

    /// Award first base to the batter, pushing ahead only the runners who are forced.
    pub fn force_walk(&self, batter: &ParticipantId) -> (BaseRunners, u32) {
        let mut next = self.clone();
        let mut runs = 0;

        if self.first.is_some() {
            if self.second.is_some() {
                if self.third.is_some() {
                    runs += 1;
                }
                next.third = self.second.clone();
            }
            next.second = self.first.clone();
        }
        next.first = Some(batter.clone());

        (next, runs)
    }
}
