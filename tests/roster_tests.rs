use std::collections::BTreeMap;

use metarank::combat::DuelSimulator;
use metarank::config::RunConfig;
use metarank::data::gamemaster::{
    BaseStats, CupFilter, CupRecord, FilterKind, FilterValue, GameMasterFile, MoveRecord,
    MovesetOverride, OverrideGroup, SpeciesRecord,
};
use metarank::data::rankings_io::write_rankings;
use metarank::data::DataRegistry;
use metarank::ranking::{
    MoveUsageTable, RankingCategory, RankingEntry, RankingPipeline, RankingRequest, RosterBuilder,
};
use metarank::MetarankError;

fn species(id: &str, types: &[&str], base: u16) -> SpeciesRecord {
    SpeciesRecord {
        species_id: id.to_string(),
        species_name: id.to_string(),
        dex: 1,
        types: types.iter().map(|t| t.to_string()).collect(),
        base_stats: BaseStats {
            atk: base,
            def: base,
            hp: base,
        },
        tags: Vec::new(),
        released: true,
        fast_moves: vec!["TACKLE".to_string(), "WATER_GUN".to_string()],
        charged_moves: vec!["BODY_SLAM".to_string(), "HYDRO_PUMP".to_string()],
        default_ivs: BTreeMap::new(),
    }
}

fn fast(id: &str, move_type: &str) -> MoveRecord {
    MoveRecord {
        move_id: id.to_string(),
        name: id.to_string(),
        move_type: move_type.to_string(),
        power: 4.0,
        energy: 0,
        energy_gain: 4,
        cooldown: 500,
    }
}

fn charged(id: &str, move_type: &str, power: f64, energy: u32) -> MoveRecord {
    MoveRecord {
        move_id: id.to_string(),
        name: id.to_string(),
        move_type: move_type.to_string(),
        power,
        energy,
        energy_gain: 0,
        cooldown: 0,
    }
}

fn cup(name: &str) -> CupRecord {
    CupRecord {
        name: name.to_string(),
        title: None,
        include: Vec::new(),
        exclude: Vec::new(),
        include_low_stat_product: false,
        meta_targets_only: false,
        custom: false,
    }
}

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

fn game_master(species: Vec<SpeciesRecord>, cups: Vec<CupRecord>) -> GameMasterFile {
    GameMasterFile {
        species,
        moves: vec![
            fast("TACKLE", "normal"),
            fast("WATER_GUN", "water"),
            charged("BODY_SLAM", "normal", 60.0, 35),
            charged("HYDRO_PUMP", "water", 130.0, 75),
        ],
        cups,
        overrides: Vec::new(),
        ban_list: None,
    }
}

fn ids(registry: &DataRegistry, cup: &str, cap: u32) -> Vec<String> {
    RosterBuilder::new(registry, cup, cap)
        .expect("cup exists")
        .build()
        .expect("roster builds")
        .candidates
        .into_iter()
        .map(|c| c.species_id)
        .collect()
}

#[test]
fn stat_product_floor_excludes_even_when_every_rule_matches() {
    let mut tagged = species("tiny_tagged", &["water"], 50);
    tagged.tags.push("include1500".to_string());
    let mut water_cup = cup("water");
    water_cup.include.push(rule(FilterKind::Type, &["water"]));
    let registry = DataRegistry::from_game_master(game_master(
        vec![species("tiny", &["water"], 50), tagged, species("sturdy", &["water"], 200)],
        vec![water_cup],
    ));

    assert_eq!(ids(&registry, "water", 1500), vec!["tiny_tagged", "sturdy"]);
    // no floor at the lowest bracket
    assert_eq!(ids(&registry, "water", 500), vec!["tiny", "tiny_tagged", "sturdy"]);
}

#[test]
fn id_rule_admits_a_contestant_matching_no_other_rule() {
    let mut mixed = cup("mixed");
    mixed.include_low_stat_product = true;
    mixed.include.push(rule(FilterKind::Type, &["water"]));
    mixed.include.push(rule(FilterKind::Id, &["snorlax"]));
    let registry = DataRegistry::from_game_master(game_master(
        vec![
            species("squirtle", &["water"], 100),
            species("snorlax", &["normal"], 100),
            species("rattata", &["normal"], 100),
        ],
        vec![mixed],
    ));
    assert_eq!(ids(&registry, "mixed", 1500), vec!["squirtle", "snorlax"]);
}

#[test]
fn ban_list_only_applies_below_the_third_tier() {
    let mut open = cup("open");
    open.include_low_stat_product = true;
    let registry = DataRegistry::from_game_master(game_master(
        vec![species("mewtwo", &["psychic"], 100), species("abra", &["psychic"], 100)],
        vec![open],
    ));
    assert_eq!(ids(&registry, "open", 1500), vec!["abra"]);
    assert_eq!(ids(&registry, "open", 2500), vec!["mewtwo", "abra"]);
}

#[test]
fn unreleased_species_are_skipped() {
    let mut hidden = species("hidden", &["normal"], 100);
    hidden.released = false;
    let mut open = cup("open");
    open.include_low_stat_product = true;
    let registry = DataRegistry::from_game_master(game_master(
        vec![hidden, species("shown", &["normal"], 100)],
        vec![open],
    ));
    assert_eq!(ids(&registry, "open", 1500), vec!["shown"]);
}

#[test]
fn overrides_force_moves_and_meta_targets_follow_weights() {
    let mut meta = cup("meta");
    meta.include_low_stat_product = true;
    meta.meta_targets_only = true;
    let mut file = game_master(
        vec![species("squirtle", &["water"], 100), species("snorlax", &["normal"], 100)],
        vec![meta],
    );
    file.overrides.push(OverrideGroup {
        cup: "meta".to_string(),
        league: 1500,
        pokemon: vec![MovesetOverride {
            species_id: "snorlax".to_string(),
            fast_move: Some("WATER_GUN".to_string()),
            charged_moves: Some(vec!["HYDRO_PUMP".to_string()]),
            weight: Some(3.0),
        }],
    });
    let registry = DataRegistry::from_game_master(file);

    let roster = RosterBuilder::new(&registry, "meta", 1500)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(roster.candidates.len(), 2);
    let snorlax = &roster.candidates[1];
    assert_eq!(snorlax.moveset(), vec!["WATER_GUN", "HYDRO_PUMP"]);
    assert_eq!(snorlax.weight_modifier, 3.0);

    // default moveset: STAB fast move and best damage per energy
    assert_eq!(roster.candidates[0].moveset(), vec!["WATER_GUN", "HYDRO_PUMP", "BODY_SLAM"]);

    let targets: Vec<_> = roster.targets.iter().map(|t| t.species_id.as_str()).collect();
    assert_eq!(targets, vec!["snorlax"]);
    assert!(!roster.is_square());
}

#[test]
fn override_with_unknown_move_is_an_error() {
    let mut open = cup("open");
    open.include_low_stat_product = true;
    let mut file = game_master(vec![species("snorlax", &["normal"], 100)], vec![open]);
    file.overrides.push(OverrideGroup {
        cup: "open".to_string(),
        league: 1500,
        pokemon: vec![MovesetOverride {
            species_id: "snorlax".to_string(),
            fast_move: Some("LICK".to_string()),
            charged_moves: None,
            weight: None,
        }],
    });
    let registry = DataRegistry::from_game_master(file);
    let err = RosterBuilder::new(&registry, "open", 1500)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, MetarankError::UnknownMove(id) if id == "LICK"));
}

#[test]
fn unknown_cup_is_reported() {
    let registry = DataRegistry::from_game_master(game_master(Vec::new(), Vec::new()));
    assert!(matches!(
        RosterBuilder::new(&registry, "nope", 1500),
        Err(MetarankError::UnknownCup(_))
    ));
}

#[test]
fn prior_rankings_seed_movesets_and_weights() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut open = cup("open");
    open.include_low_stat_product = true;
    let registry = DataRegistry::from_game_master(game_master(
        vec![species("squirtle", &["water"], 100), species("snorlax", &["normal"], 100)],
        vec![open],
    ));

    let prior = RankingEntry {
        species_id: "snorlax".to_string(),
        species_name: "snorlax".to_string(),
        score: 87.5,
        moveset: Vec::new(),
        matchups: Vec::new(),
        counters: Vec::new(),
        moves: MoveUsageTable {
            fast_moves: vec![metarank::ranking::entry::MoveUse {
                move_id: "TACKLE".to_string(),
                uses: 40,
            }],
            charged_moves: vec![metarank::ranking::entry::MoveUse {
                move_id: "BODY_SLAM".to_string(),
                uses: 9,
            }],
        },
        scores: Vec::new(),
    };
    write_rankings(dir.path(), "open", RankingCategory::Overall, 1500, &[prior]).unwrap();

    let config = RunConfig {
        rankings_dir: Some(dir.path().to_path_buf()),
        ..RunConfig::default()
    };
    let resolver = DuelSimulator::default();
    let roster = RankingPipeline::new(&registry, &resolver, &config)
        .build_roster(&RankingRequest::new("open", 1500))
        .unwrap();

    let snorlax = roster
        .candidates
        .iter()
        .find(|c| c.species_id == "snorlax")
        .unwrap();
    assert_eq!(snorlax.moveset(), vec!["TACKLE", "BODY_SLAM"]);
    assert!((snorlax.weight_modifier - 0.875).abs() < 1e-12);

    let squirtle = roster
        .candidates
        .iter()
        .find(|c| c.species_id == "squirtle")
        .unwrap();
    assert_eq!(squirtle.weight_modifier, 1.0);
}
