//! Gap and duplicate detection over a directory of `<id>.json` files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::file_id::{list_json_files, parse_file_id, FileId};

/// Outcome of one scan. All ID lists are ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub id_space_max: u32,
    /// `*.json` entries seen, duplicates included
    pub found: usize,
    pub distinct: usize,
    pub missing: Vec<FileId>,
    pub duplicates: Vec<FileId>,
    pub out_of_range: Vec<FileId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty() && self.out_of_range.is_empty()
    }

    /// Console summary, one line per finding.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.missing.is_empty() {
            lines.push("No IDs are missing.".to_string());
        } else {
            lines.push(format!("Missing IDs: {}", join_ids(&self.missing)));
        }
        if self.duplicates.is_empty() {
            lines.push("No duplicate IDs.".to_string());
        } else {
            lines.push(format!("Duplicate IDs: {}", join_ids(&self.duplicates)));
        }
        if !self.out_of_range.is_empty() {
            lines.push(format!(
                "IDs outside 1..={}: {}",
                self.id_space_max,
                join_ids(&self.out_of_range)
            ));
        }
        lines
    }
}

fn join_ids(ids: &[FileId]) -> String {
    let parts: Vec<String> = ids.iter().map(FileId::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Compare the IDs derived from a list of file names against `1..=id_space_max`.
///
/// Occurrences are counted on the raw names, before anything is deduplicated,
/// so two names mapping to one ID show up as a duplicate.
pub fn check_names<'a, I>(names: I, id_space_max: u32) -> Result<IntegrityReport>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<FileId, usize> = BTreeMap::new();
    let mut found = 0usize;
    for name in names {
        *counts.entry(parse_file_id(name)?).or_default() += 1;
        found += 1;
    }

    let duplicates: Vec<FileId> = counts
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(&id, _)| id)
        .collect();

    let present: BTreeSet<FileId> = counts.keys().copied().collect();
    let missing: Vec<FileId> = (1..=u64::from(id_space_max))
        .map(FileId)
        .filter(|id| !present.contains(id))
        .collect();
    let out_of_range: Vec<FileId> = present
        .iter()
        .copied()
        .filter(|id| id.0 == 0 || id.0 > u64::from(id_space_max))
        .collect();

    Ok(IntegrityReport {
        id_space_max,
        found,
        distinct: present.len(),
        missing,
        duplicates,
        out_of_range,
    })
}

/// Scan `dir` (read-only) and report gaps, duplicates and strays.
pub fn check_ids(dir: &Path, id_space_max: u32) -> Result<IntegrityReport> {
    let entries = list_json_files(dir)?;
    info!("Scanning {} JSON files in {:?}", entries.len(), dir);

    let report = check_names(entries.iter().map(|e| e.file_name.as_str()), id_space_max)?;

    info!(
        "found={} distinct={} missing={} duplicates={} out_of_range={}",
        report.found,
        report.distinct,
        report.missing.len(),
        report.duplicates.len(),
        report.out_of_range.len()
    );
    if !report.duplicates.is_empty() {
        warn!("Duplicate IDs: {:?}", report.duplicates);
    }
    Ok(report)
}
