//! Run configuration and the scoring policy constants.
//!
//! Layering: built-in defaults, then an optional YAML file, then `METARANK_*`
//! environment variables, then CLI flags (applied by [crate::cli]).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combat::stats::DEFAULT_MAX_LEVEL;
use crate::data::gamemaster::DEFAULT_GAMEMASTER_PATH;
use crate::error::{MetarankError, Result};

/// Base fraction of the best score below which targets stop counting.
pub const RANK_CUTOFF_BASE: f64 = 0.1;
/// Growth of the cutoff fraction per solver pass.
pub const RANK_CUTOFF_INCREASE: f64 = 0.06;
pub const RANK_WEIGHT_EXPONENT: f64 = 1.65;
pub const CUSTOM_ITERATIONS: usize = 7;
pub const OFFICIAL_ITERATIONS: usize = 1;
pub const SOFT_CAP_THRESHOLD: f64 = 700.0;
pub const HARSH_CURVE_THRESHOLD: f64 = 300.0;
pub const SWITCH_PENALTY_DIVISOR: f64 = 20000.0;
/// Battle rating of an even encounter.
pub const MIDPOINT_RATING: f64 = 500.0;
pub const SHIELD_RATING_BONUS: u32 = 100;
pub const MATCHUP_COUNT: usize = 5;
/// Floor applied to each scenario score before the geometric mean.
pub const GEOMETRIC_MEAN_FLOOR: f64 = 0.1;
pub const CONSISTENCY_DEVIATION_PENALTY: f64 = 0.5;

pub const CHARGERS_REFERENCE_DPT: f64 = 4.0;
pub const CHARGERS_DPT_EXPONENT: f64 = 0.25;
pub const CHARGERS_ENERGY_GAP_PENALTY: f64 = 0.002;
pub const CHARGERS_MIN_FACTOR: f64 = 0.5;
pub const CHARGERS_MAX_FACTOR: f64 = 1.5;

/// Stat-product floor per bracket; unknown caps use the top tier's floor.
pub fn min_stat_product(cap: u32) -> f64 {
    match cap {
        500 => 0.0,
        1500 => 1370.0,
        2500 => 2800.0,
        _ => 4900.0,
    }
}

/// Caps below this tier apply the ban list.
pub const BAN_LIST_CAP_LIMIT: u32 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub rank_cutoff_base: f64,
    pub rank_cutoff_increase: f64,
    pub rank_weight_exponent: f64,
    pub custom_iterations: usize,
    pub official_iterations: usize,
    pub soft_cap_threshold: f64,
    pub harsh_curve_threshold: f64,
    pub switch_penalty_divisor: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            rank_cutoff_base: RANK_CUTOFF_BASE,
            rank_cutoff_increase: RANK_CUTOFF_INCREASE,
            rank_weight_exponent: RANK_WEIGHT_EXPONENT,
            custom_iterations: CUSTOM_ITERATIONS,
            official_iterations: OFFICIAL_ITERATIONS,
            soft_cap_threshold: SOFT_CAP_THRESHOLD,
            harsh_curve_threshold: HARSH_CURVE_THRESHOLD,
            switch_penalty_divisor: SWITCH_PENALTY_DIVISOR,
        }
    }
}

impl ScoringPolicy {
    pub fn iterations(&self, custom_roster: bool) -> usize {
        if custom_roster {
            self.custom_iterations
        } else {
            self.official_iterations
        }
    }

    /// Fraction of the best score a target needs to count in pass `pass`.
    pub fn cutoff(&self, pass: usize) -> f64 {
        self.rank_cutoff_base + self.rank_cutoff_increase * pass as f64
    }

    /// Soft cap above the high threshold, harsh curve below the low one.
    pub fn shape_rating(&self, rating: f64) -> f64 {
        if rating > self.soft_cap_threshold {
            self.soft_cap_threshold + (rating - self.soft_cap_threshold).sqrt()
        } else if rating < self.harsh_curve_threshold {
            self.harsh_curve_threshold
                .powf((self.harsh_curve_threshold + rating) / (2.0 * self.harsh_curve_threshold))
        } else {
            rating
        }
    }

    /// Extra weight on hard losses for safe-switch scoring.
    pub fn switch_penalty(&self, adjusted_rating: f64) -> f64 {
        if adjusted_rating < MIDPOINT_RATING {
            1.0 + (MIDPOINT_RATING - adjusted_rating).powi(2) / self.switch_penalty_divisor
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub gamemaster_path: PathBuf,
    /// Prior rankings used for moveset seeding and authoritative composites.
    pub rankings_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Worker threads for scenario execution; 0 uses every core.
    pub workers: usize,
    pub export_csv: bool,
    pub max_level: f64,
    pub scoring: ScoringPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            gamemaster_path: PathBuf::from(DEFAULT_GAMEMASTER_PATH),
            rankings_dir: None,
            output_dir: PathBuf::from("out/rankings"),
            workers: 0,
            export_csv: false,
            max_level: DEFAULT_MAX_LEVEL,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| MetarankError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| MetarankError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults or the YAML file, with environment overrides applied and validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = env::var("METARANK_GAMEMASTER") {
            self.gamemaster_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("METARANK_RANKINGS_DIR") {
            self.rankings_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = env::var("METARANK_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var("METARANK_WORKERS") {
            match raw.trim().parse::<usize>() {
                Ok(workers) => self.workers = workers,
                Err(_) => warn!(value = %raw, "invalid METARANK_WORKERS, keeping {}", self.workers),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1.0..=51.0).contains(&self.max_level) {
            return Err(MetarankError::InvalidConfig(format!(
                "max_level must be within 1..=51, got {}",
                self.max_level
            )));
        }
        let scoring = &self.scoring;
        if scoring.custom_iterations == 0 || scoring.official_iterations == 0 {
            return Err(MetarankError::InvalidConfig(
                "solver iterations must be at least 1".to_string(),
            ));
        }
        if scoring.rank_weight_exponent <= 0.0 || scoring.switch_penalty_divisor <= 0.0 {
            return Err(MetarankError::InvalidConfig(
                "weight exponent and switch penalty divisor must be positive".to_string(),
            ));
        }
        if scoring.harsh_curve_threshold <= 0.0
            || scoring.soft_cap_threshold < scoring.harsh_curve_threshold
        {
            return Err(MetarankError::InvalidConfig(
                "rating curve thresholds must satisfy 0 < low <= high".to_string(),
            ));
        }
        Ok(())
    }
}
