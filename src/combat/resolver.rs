//! The seam between the ranking core and whatever plays out an encounter.

use std::collections::BTreeMap;

use crate::combat::contestant::{CombatState, Contestant};

/// Move id -> number of uses during one encounter.
pub type MoveUsage = BTreeMap<String, u32>;

/// One side of a configured encounter.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub contestant: &'a Contestant,
    pub state: CombatState,
}

/// Two fully configured sides. Built fresh for every encounter.
#[derive(Debug, Clone, Copy)]
pub struct BattleSetup<'a> {
    pub sides: [Side<'a>; 2],
}

impl<'a> BattleSetup<'a> {
    /// Prime both contestants for an encounter with the given shields and energy-turns per side.
    pub fn configure(
        first: &'a Contestant,
        second: &'a Contestant,
        shields: [u8; 2],
        energy_turns: [u32; 2],
    ) -> Self {
        Self {
            sides: [
                Side {
                    contestant: first,
                    state: first.primed(shields[0], energy_turns[0]),
                },
                Side {
                    contestant: second,
                    state: second.primed(shields[1], energy_turns[1]),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleOutcome {
    pub final_hp: [u32; 2],
    pub shields_remaining: [u8; 2],
    pub move_usage: [MoveUsage; 2],
}

/// Plays out one encounter. Implementations must be deterministic for identical
/// setups; the ranking core relies on that for symmetric reuse.
pub trait BattleResolver: Sync {
    fn resolve(&self, setup: &BattleSetup<'_>) -> BattleOutcome;
}

impl<F> BattleResolver for F
where
    F: Fn(&BattleSetup<'_>) -> BattleOutcome + Sync,
{
    fn resolve(&self, setup: &BattleSetup<'_>) -> BattleOutcome {
        self(setup)
    }
}
