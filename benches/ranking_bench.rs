//! Ranking throughput: one full scenario (battles, solver, finalizer) over a
//! synthetic roster with the reference resolver.
//!
//! Run with: `cargo bench`

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use metarank::combat::{BracketStats, Contestant, DuelSimulator};
use metarank::config::ScoringPolicy;
use metarank::data::gamemaster::{BaseStats, IvSpread, MoveRecord, SpeciesRecord};
use metarank::parallel::Progress;
use metarank::ranking::{rank_scenario, Roster, Scenario};

const TYPES: [&str; 6] = ["normal", "water", "fire", "grass", "steel", "fairy"];

fn move_record(id: String, move_type: &str, power: f64, energy: u32, gain: u32, cooldown: u32) -> MoveRecord {
    MoveRecord {
        name: id.clone(),
        move_id: id,
        move_type: move_type.to_string(),
        power,
        energy,
        energy_gain: gain,
        cooldown,
    }
}

/// Deterministic spread of stats and movesets so pairings are not all mirrors.
fn synthetic_roster(size: usize) -> Roster {
    let pool: Vec<Contestant> = (0..size)
        .map(|i| {
            let move_type = TYPES[i % TYPES.len()];
            let species = SpeciesRecord {
                species_id: format!("synthetic_{i}"),
                species_name: format!("Synthetic {i}"),
                dex: i as u32 + 1,
                types: vec![move_type.to_string()],
                base_stats: BaseStats {
                    atk: 120 + (i % 7) as u16 * 10,
                    def: 120 + (i % 5) as u16 * 12,
                    hp: 140 + (i % 3) as u16 * 15,
                },
                tags: Vec::new(),
                released: true,
                fast_moves: Vec::new(),
                charged_moves: Vec::new(),
                default_ivs: BTreeMap::new(),
            };
            let stats = BracketStats::fit_to_cap(species.base_stats, IvSpread::default(), 1500, 50.0);
            let fast = move_record(
                format!("FAST_{i}"),
                move_type,
                3.0 + (i % 4) as f64,
                0,
                3 + (i % 5) as u32,
                500 * (1 + (i % 3) as u32),
            );
            let charged = vec![
                move_record(format!("CHARGE_A_{i}"), move_type, 60.0 + (i % 6) as f64 * 10.0, 40, 0, 0),
                move_record(format!("CHARGE_B_{i}"), "normal", 110.0, 65 + (i % 3) as u32 * 5, 0, 0),
            ];
            Contestant::new(&species, IvSpread::default(), stats, fast, charged)
        })
        .collect();
    Roster {
        candidates: pool.clone(),
        targets: pool,
    }
}

fn bench_ranking(c: &mut Criterion) {
    let resolver = DuelSimulator::default();
    let policy = ScoringPolicy::default();
    let progress = Progress::disabled();

    let mut group = c.benchmark_group("ranking");
    group.sample_size(20);

    for size in [16usize, 48] {
        let roster = synthetic_roster(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        // Balanced scenario: mirrored pairings are reused
        group.bench_with_input(BenchmarkId::new("leads", size), &roster, |b, roster| {
            b.iter(|| {
                black_box(rank_scenario(&resolver, roster, Scenario::Leads, &policy, false, &progress))
            });
        });

        // Unbalanced scenario with the custom solver schedule
        group.bench_with_input(BenchmarkId::new("switches_custom", size), &roster, |b, roster| {
            b.iter(|| {
                black_box(rank_scenario(&resolver, roster, Scenario::Switches, &policy, true, &progress))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ranking);
criterion_main!(benches);
