//! Cup eligibility: include/exclude rule evaluation for one species at one bracket.

use crate::data::gamemaster::{CupFilter, CupRecord, FilterKind, SpeciesRecord, SHADOW_SUFFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    pub included: bool,
    /// Admitted by an `id` include rule; non-`id` exclude rules cannot remove it.
    pub identity_exempt: bool,
}

fn id_matches(filter: &CupFilter, species: &SpeciesRecord) -> bool {
    let id = if filter.include_shadows {
        species
            .species_id
            .strip_suffix(SHADOW_SUFFIX)
            .unwrap_or(&species.species_id)
    } else {
        species.species_id.as_str()
    };
    filter.values.iter().filter_map(|v| v.as_text()).any(|v| v == id)
}

pub fn filter_matches(filter: &CupFilter, species: &SpeciesRecord) -> bool {
    let mut texts = filter.values.iter().filter_map(|v| v.as_text());
    match filter.filter_type {
        FilterKind::Type => texts.any(|t| species.has_type(t)),
        FilterKind::Tag => texts.any(|t| species.has_tag(t)),
        FilterKind::Move => texts.any(|m| species.knows_move(m)),
        FilterKind::Id => id_matches(filter, species),
        FilterKind::Dex => {
            let bounds: Vec<u32> = filter.values.iter().filter_map(|v| v.as_number()).collect();
            match bounds.as_slice() {
                [min, max, ..] => (*min..=*max).contains(&species.dex),
                [only] => species.dex == *only,
                [] => false,
            }
        }
    }
}

/// `matched >= required`, where out-of-bracket rules leave both counts and
/// `id` rules in a multi-rule list are an extra door rather than a requirement.
pub fn evaluate_include(rules: &[CupFilter], species: &SpeciesRecord, cap: u32) -> Eligibility {
    let mut required = rules.len();
    let mut matched = 0usize;
    let mut identity_exempt = false;

    for rule in rules {
        if !rule.applies_to(cap) {
            required -= 1;
            continue;
        }
        if rule.filter_type == FilterKind::Id {
            if rules.len() > 1 {
                required -= 1;
            }
            if id_matches(rule, species) {
                matched += rules.len();
                identity_exempt = true;
            }
            continue;
        }
        if filter_matches(rule, species) {
            matched += 1;
        }
    }

    Eligibility {
        included: matched >= required,
        identity_exempt,
    }
}

pub fn is_excluded(
    rules: &[CupFilter],
    species: &SpeciesRecord,
    cap: u32,
    identity_exempt: bool,
) -> bool {
    rules
        .iter()
        .filter(|rule| rule.applies_to(cap))
        .filter(|rule| !identity_exempt || rule.filter_type == FilterKind::Id)
        .any(|rule| filter_matches(rule, species))
}

/// Full include-then-exclude decision for a cup.
pub fn is_eligible(cup: &CupRecord, species: &SpeciesRecord, cap: u32) -> bool {
    let eligibility = evaluate_include(&cup.include, species, cap);
    eligibility.included && !is_excluded(&cup.exclude, species, cap, eligibility.identity_exempt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::contestant::fixtures::species;
    use crate::data::gamemaster::FilterValue;

    fn rule(kind: FilterKind, values: &[&str]) -> CupFilter {
        CupFilter {
            filter_type: kind,
            values: values
                .iter()
                .map(|v| FilterValue::Text(v.to_string()))
                .collect(),
            leagues: None,
            include_shadows: false,
        }
    }

    fn dex(min: u32, max: u32) -> CupFilter {
        CupFilter {
            filter_type: FilterKind::Dex,
            values: vec![FilterValue::Number(min), FilterValue::Number(max)],
            leagues: None,
            include_shadows: false,
        }
    }

    #[test]
    fn empty_include_list_admits_everything() {
        let s = species("pidgey", &["normal", "flying"]);
        assert!(evaluate_include(&[], &s, 1500).included);
    }

    #[test]
    fn every_non_id_rule_must_match() {
        let mut s = species("marill", &["water", "fairy"]);
        s.dex = 183;
        let rules = vec![rule(FilterKind::Type, &["water"]), dex(152, 251)];
        assert!(evaluate_include(&rules, &s, 1500).included);
        s.dex = 1;
        assert!(!evaluate_include(&rules, &s, 1500).included);
    }

    #[test]
    fn out_of_bracket_rules_are_dropped() {
        let s = species("pidgey", &["normal", "flying"]);
        let mut water_only = rule(FilterKind::Type, &["water"]);
        water_only.leagues = Some(vec![2500]);
        assert!(evaluate_include(&[water_only.clone()], &s, 1500).included);
        assert!(!evaluate_include(&[water_only], &s, 2500).included);
    }

    #[test]
    fn id_rule_short_circuits_a_multi_rule_list() {
        let s = species("skarmory", &["steel", "flying"]);
        let rules = vec![
            rule(FilterKind::Type, &["water"]),
            rule(FilterKind::Tag, &["starter"]),
            rule(FilterKind::Id, &["skarmory"]),
        ];
        let result = evaluate_include(&rules, &s, 1500);
        assert!(result.included);
        assert!(result.identity_exempt);

        let other = species("bastiodon", &["rock", "steel"]);
        assert!(!evaluate_include(&rules, &other, 1500).included);
    }

    #[test]
    fn shadow_forms_normalize_when_requested() {
        let s = species("machamp_shadow", &["fighting"]);
        let mut by_id = rule(FilterKind::Id, &["machamp"]);
        assert!(!evaluate_include(&[by_id.clone()], &s, 1500).included);
        by_id.include_shadows = true;
        assert!(evaluate_include(&[by_id], &s, 1500).included);
    }

    #[test]
    fn identity_inclusion_survives_non_id_excludes_only() {
        let mut s = species("registeel", &["steel"]);
        s.tags.push("legendary".to_string());
        let cup = CupRecord {
            name: "test".to_string(),
            title: None,
            include: vec![
                rule(FilterKind::Type, &["water"]),
                rule(FilterKind::Id, &["registeel"]),
            ],
            exclude: vec![rule(FilterKind::Tag, &["legendary"])],
            include_low_stat_product: false,
            meta_targets_only: false,
            custom: false,
        };
        assert!(is_eligible(&cup, &s, 1500));

        let mut banned = cup.clone();
        banned.exclude.push(rule(FilterKind::Id, &["registeel"]));
        assert!(!is_eligible(&banned, &s, 1500));
    }

    #[test]
    fn exclude_rules_remove_regular_inclusions() {
        let mut s = species("lugia", &["psychic", "flying"]);
        s.tags.push("legendary".to_string());
        let cup = CupRecord {
            name: "test".to_string(),
            title: None,
            include: vec![rule(FilterKind::Type, &["flying"])],
            exclude: vec![rule(FilterKind::Tag, &["legendary"])],
            include_low_stat_product: false,
            meta_targets_only: false,
            custom: false,
        };
        assert!(!is_eligible(&cup, &s, 1500));
    }

    #[test]
    fn move_rule_checks_the_movepool() {
        let mut s = species("medicham", &["fighting", "psychic"]);
        s.fast_moves.push("COUNTER".to_string());
        assert!(filter_matches(&rule(FilterKind::Move, &["COUNTER"]), &s));
        assert!(!filter_matches(&rule(FilterKind::Move, &["PSYCHO_CUT"]), &s));
    }
}
