//! Ranking list persistence: `<dir>/<cup>/<category>/rankings-<cap>.json`,
//! optional CSV summaries beside them, and a per-run manifest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MetarankError, Result};
use crate::ranking::entry::{RankingCategory, RankingEntry};
use crate::ranking::pipeline::RankingReport;

pub fn rankings_path(dir: &Path, cup: &str, category: RankingCategory, cap: u32) -> PathBuf {
    dir.join(cup)
        .join(category.slug())
        .join(format!("rankings-{cap}.json"))
}

fn csv_path(dir: &Path, cup: &str, category: RankingCategory, cap: u32) -> PathBuf {
    rankings_path(dir, cup, category, cap).with_extension("csv")
}

fn manifest_path(dir: &Path, cup: &str, cap: u32) -> PathBuf {
    dir.join(cup).join(format!("manifest-{cap}.json"))
}

/// Earlier ranking list for this cup/category/cap; `Ok(None)` when none exists.
pub fn load_prior_rankings(
    dir: &Path,
    cup: &str,
    category: RankingCategory,
    cap: u32,
) -> Result<Option<Vec<RankingEntry>>> {
    let path = rankings_path(dir, cup, category, cap);
    if !path.is_file() {
        debug!(path = %path.display(), "no prior rankings");
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|source| MetarankError::Read {
        path: path.clone(),
        source,
    })?;
    let entries = serde_json::from_str(&raw).map_err(|source| MetarankError::Parse { path, source })?;
    Ok(Some(entries))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| MetarankError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

pub fn write_rankings(
    dir: &Path,
    cup: &str,
    category: RankingCategory,
    cap: u32,
    entries: &[RankingEntry],
) -> Result<PathBuf> {
    let path = rankings_path(dir, cup, category, cap);
    ensure_parent(&path)?;
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(&path, json).map_err(|source| MetarankError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    species_id: &'a str,
    species_name: &'a str,
    score: f64,
    moveset: String,
    top_matchup: &'a str,
    top_counter: &'a str,
}

pub fn write_csv(
    dir: &Path,
    cup: &str,
    category: RankingCategory,
    cap: u32,
    entries: &[RankingEntry],
) -> Result<PathBuf> {
    let path = csv_path(dir, cup, category, cap);
    ensure_parent(&path)?;
    let mut writer = csv::Writer::from_path(&path)?;
    for (i, entry) in entries.iter().enumerate() {
        writer.serialize(CsvRow {
            rank: i + 1,
            species_id: &entry.species_id,
            species_name: &entry.species_name,
            score: entry.score,
            moveset: entry.moveset.join("/"),
            top_matchup: entry.matchups.first().map_or("", |m| m.opponent.as_str()),
            top_counter: entry.counters.first().map_or("", |m| m.opponent.as_str()),
        })?;
    }
    writer.flush().map_err(|source| MetarankError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestList {
    pub category: String,
    pub entries: usize,
    pub path: PathBuf,
}

/// What one run wrote, and when.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub generated_at: String,
    pub cup: String,
    pub cap: u32,
    pub custom: bool,
    pub roster_size: usize,
    pub lists: Vec<ManifestList>,
}

/// Write every list of a report (plus CSVs when asked) and the manifest.
/// Returns the manifest.
pub fn write_report(dir: &Path, report: &RankingReport, export_csv: bool) -> Result<RunManifest> {
    let mut lists = Vec::new();
    for (category, entries) in report.lists() {
        let path = write_rankings(dir, &report.cup, category, report.cap, entries)?;
        if export_csv {
            write_csv(dir, &report.cup, category, report.cap, entries)?;
        }
        lists.push(ManifestList {
            category: category.slug().to_string(),
            entries: entries.len(),
            path,
        });
    }

    let manifest = RunManifest {
        generated_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        cup: report.cup.clone(),
        cap: report.cap,
        custom: report.custom,
        roster_size: report.roster_size,
        lists,
    };
    let path = manifest_path(dir, &report.cup, report.cap);
    ensure_parent(&path)?;
    fs::write(&path, serde_json::to_string_pretty(&manifest)?).map_err(|source| {
        MetarankError::Write {
            path: path.clone(),
            source,
        }
    })?;
    info!(path = %path.display(), lists = manifest.lists.len(), "rankings written");
    Ok(manifest)
}
