use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tactical condition a scenario ranking is computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Leads,
    Closers,
    Switches,
    Chargers,
    Attackers,
}

impl Scenario {
    /// Canonical order; also the fallback order for picking a base scenario.
    pub const ALL: [Scenario; 5] = [
        Scenario::Leads,
        Scenario::Closers,
        Scenario::Switches,
        Scenario::Chargers,
        Scenario::Attackers,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Closers => "closers",
            Self::Switches => "switches",
            Self::Chargers => "chargers",
            Self::Attackers => "attackers",
        }
    }

    /// Starting shields `[candidate, target]`.
    pub const fn shields(self) -> [u8; 2] {
        match self {
            Self::Leads => [1, 1],
            Self::Closers => [0, 0],
            Self::Switches => [1, 1],
            Self::Chargers => [1, 1],
            Self::Attackers => [0, 1],
        }
    }

    /// Starting energy-turns `[candidate, target]`.
    pub const fn energy_turns(self) -> [u32; 2] {
        match self {
            Self::Leads => [0, 0],
            Self::Closers => [0, 0],
            Self::Switches => [4, 0],
            Self::Chargers => [6, 0],
            Self::Attackers => [0, 0],
        }
    }

    /// Both sides start with identical resources.
    pub fn is_balanced(self) -> bool {
        let shields = self.shields();
        let energy = self.energy_turns();
        shields[0] == shields[1] && energy[0] == energy[1]
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown scenario '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_leads_and_closers_are_balanced() {
        let balanced: Vec<_> = Scenario::ALL
            .into_iter()
            .filter(|s| s.is_balanced())
            .collect();
        assert_eq!(balanced, vec![Scenario::Leads, Scenario::Closers]);
    }

    #[test]
    fn slugs_round_trip_through_from_str() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.slug().parse::<Scenario>(), Ok(scenario));
        }
        assert!("overall".parse::<Scenario>().is_err());
    }
}
