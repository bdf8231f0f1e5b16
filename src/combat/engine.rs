//! Reference turn-based resolver.
//!
//! A deliberately small model: 500 ms turns, fast moves land when their
//! duration elapses, charged moves fire as soon as one is affordable, shields
//! absorb charged moves down to 1 damage. Type effectiveness is not modelled.

use crate::combat::contestant::{Contestant, MAX_ENERGY};
use crate::combat::resolver::{BattleOutcome, BattleResolver, BattleSetup, MoveUsage, Side};
use crate::data::gamemaster::MoveRecord;

pub const EPSILON: f64 = 1e-9;
/// Four minutes of 500 ms turns.
pub const DEFAULT_TURN_LIMIT: u32 = 480;
pub const DAMAGE_BONUS_MULTIPLIER: f64 = 1.3;
pub const SHIELDED_DAMAGE: u32 = 1;

/// `floor(0.5 × power × STAB × atk/def × 1.3) + 1`.
pub fn move_damage(attacker: &Contestant, defender: &Contestant, move_record: &MoveRecord) -> u32 {
    let ratio = attacker.stats.attack / defender.stats.defense.max(EPSILON);
    let raw = 0.5 * move_record.power * attacker.stab(move_record) * ratio * DAMAGE_BONUS_MULTIPLIER;
    raw.floor() as u32 + 1
}

#[derive(Debug, Clone, Copy)]
pub struct DuelSimulator {
    pub turn_limit: u32,
}

impl Default for DuelSimulator {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
        }
    }
}

struct Fighter<'a> {
    contestant: &'a Contestant,
    hp: u32,
    energy: u32,
    shields: u8,
    /// Turns until the fast move in progress lands; 0 when idle.
    busy_turns: u32,
    usage: MoveUsage,
}

impl<'a> Fighter<'a> {
    fn new(side: Side<'a>) -> Self {
        Self {
            contestant: side.contestant,
            hp: side.state.hp,
            energy: side.state.energy.min(MAX_ENERGY),
            shields: side.state.shields,
            busy_turns: 0,
            usage: MoveUsage::new(),
        }
    }

    fn record(&mut self, move_id: &str) {
        *self.usage.entry(move_id.to_string()).or_insert(0) += 1;
    }

    /// Most damaging affordable charged move; ties go to the cheaper one.
    fn pick_charged_move(&self, opponent: &Fighter<'_>) -> Option<&'a MoveRecord> {
        self.contestant
            .charged_moves
            .iter()
            .filter(|m| m.energy <= self.energy)
            .max_by(|a, b| {
                move_damage(self.contestant, opponent.contestant, a)
                    .cmp(&move_damage(self.contestant, opponent.contestant, b))
                    .then_with(|| b.energy.cmp(&a.energy))
            })
    }
}

impl DuelSimulator {
    fn land_fast_moves(fighters: &mut [Fighter<'_>; 2]) {
        let mut incoming = [0u32; 2];
        for i in 0..2 {
            if fighters[i].busy_turns == 0 {
                continue;
            }
            fighters[i].busy_turns -= 1;
            if fighters[i].busy_turns == 0 {
                let attacker = fighters[i].contestant;
                let fast = &attacker.fast_move;
                incoming[1 - i] = move_damage(attacker, fighters[1 - i].contestant, fast);
                fighters[i].energy = (fighters[i].energy + fast.energy_gain).min(MAX_ENERGY);
            }
        }
        for i in 0..2 {
            fighters[i].hp = fighters[i].hp.saturating_sub(incoming[i]);
        }
    }

    fn act(fighters: &mut [Fighter<'_>; 2], actor: usize) {
        let target = 1 - actor;
        if fighters[actor].busy_turns > 0 || fighters[actor].hp == 0 || fighters[target].hp == 0 {
            return;
        }
        match fighters[actor].pick_charged_move(&fighters[target]) {
            Some(charged) => {
                fighters[actor].energy -= charged.energy;
                fighters[actor].record(&charged.move_id);
                let damage = if fighters[target].shields > 0 {
                    fighters[target].shields -= 1;
                    SHIELDED_DAMAGE
                } else {
                    move_damage(fighters[actor].contestant, fighters[target].contestant, charged)
                };
                fighters[target].hp = fighters[target].hp.saturating_sub(damage);
            }
            None => {
                let contestant = fighters[actor].contestant;
                let fast = &contestant.fast_move;
                fighters[actor].busy_turns = fast.turns();
                fighters[actor].record(&fast.move_id);
            }
        }
    }
}

impl BattleResolver for DuelSimulator {
    fn resolve(&self, setup: &BattleSetup<'_>) -> BattleOutcome {
        let mut fighters = [Fighter::new(setup.sides[0]), Fighter::new(setup.sides[1])];

        // Charged-move priority: higher attack first, ties to the first side.
        let order = if fighters[1].contestant.stats.attack > fighters[0].contestant.stats.attack {
            [1, 0]
        } else {
            [0, 1]
        };

        for _ in 0..self.turn_limit {
            if fighters[0].hp == 0 || fighters[1].hp == 0 {
                break;
            }
            Self::land_fast_moves(&mut fighters);
            for actor in order {
                Self::act(&mut fighters, actor);
            }
        }

        let [first, second] = fighters;
        BattleOutcome {
            final_hp: [first.hp, second.hp],
            shields_remaining: [first.shields, second.shields],
            move_usage: [first.usage, second.usage],
        }
    }
}
