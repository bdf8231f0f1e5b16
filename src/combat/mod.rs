pub mod contestant;
pub mod engine;
pub mod resolver;
pub mod stats;

pub use contestant::{CombatState, Contestant, MAX_CHARGED_MOVES, MAX_ENERGY, STAB_MULTIPLIER, TURN_MS};
pub use engine::{move_damage, DuelSimulator, DEFAULT_TURN_LIMIT, EPSILON};
pub use resolver::{BattleOutcome, BattleResolver, BattleSetup, MoveUsage, Side};
pub use stats::{combat_power, cp_multiplier, BracketStats, DEFAULT_MAX_LEVEL};
