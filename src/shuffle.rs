//! Copy numbered files under freshly sampled IDs.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rand::seq::index;
use rand::Rng;
use serde::Serialize;

use crate::error::{Result, ToolError};
use crate::file_id::{has_digit_stem, list_json_files, FileId, JsonEntry};

/// One copied file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub source: String,
    pub new_id: FileId,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ShuffleReport {
    pub skipped: usize,
    pub assignments: Vec<Assignment>,
    /// `*.json` files already in the target before the run
    pub preexisting: usize,
    /// target file names replaced by a copy
    pub overwritten: Vec<String>,
}

impl ShuffleReport {
    pub fn copied(&self) -> usize {
        self.assignments.len()
    }
}

/// Draw `count` distinct IDs from `1..=id_space_max`.
pub fn sample_ids<R: Rng + ?Sized>(rng: &mut R, count: usize, id_space_max: u32) -> Result<Vec<FileId>> {
    if count > id_space_max as usize {
        return Err(ToolError::Capacity { requested: count, available: id_space_max });
    }
    Ok(index::sample(rng, id_space_max as usize, count)
        .into_iter()
        .map(|i| FileId(i as u64 + 1))
        .collect())
}

/// Files in `source` whose name is `<digits>.<...>.json`. The rest are ignored.
pub fn eligible_files(source: &Path) -> Result<(Vec<JsonEntry>, usize)> {
    let all = list_json_files(source)?;
    let total = all.len();
    let eligible: Vec<JsonEntry> = all.into_iter().filter(|e| has_digit_stem(&e.file_name)).collect();
    let skipped = total - eligible.len();
    Ok((eligible, skipped))
}

/// Shuffle with the thread-local RNG.
pub fn shuffle_files(
    source: &Path,
    target: &Path,
    id_space_max: u32,
    bar: &ProgressBar,
) -> Result<ShuffleReport> {
    shuffle_files_with_rng(source, target, id_space_max, &mut rand::thread_rng(), bar)
}

/// Refuse a target that resolves to the source directory: copies would
/// land on files not yet read.
fn ensure_distinct_dirs(source: &Path, target: &Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }
    let source_canon = fs::canonicalize(source).map_err(|e| ToolError::io(source, e))?;
    let target_canon = fs::canonicalize(target).map_err(|e| ToolError::io(target, e))?;
    if source_canon == target_canon {
        return Err(ToolError::Config(format!(
            "target {} is the source directory; shuffle into a separate directory",
            target.display()
        )));
    }
    Ok(())
}

/// Copy every eligible file of `source` into `target` as `<new_id>.json`.
///
/// The capacity and same-directory checks run before anything is written,
/// so a rejected run leaves no trace on disk. Sources are never modified.
/// Files already in the target are replaced when a new ID lands on them;
/// each replacement is listed in the report.
pub fn shuffle_files_with_rng<R: Rng + ?Sized>(
    source: &Path,
    target: &Path,
    id_space_max: u32,
    rng: &mut R,
    bar: &ProgressBar,
) -> Result<ShuffleReport> {
    let (files, skipped) = eligible_files(source)?;
    info!("{} eligible files in {:?} ({} skipped)", files.len(), source, skipped);

    let new_ids = sample_ids(rng, files.len(), id_space_max)?;
    ensure_distinct_dirs(source, target)?;

    fs::create_dir_all(target).map_err(|e| ToolError::io(target, e))?;
    let preexisting = list_json_files(target)?.len();
    if preexisting > 0 {
        warn!("target {:?} already holds {} JSON files", target, preexisting);
    }

    bar.set_length(files.len() as u64);
    let mut assignments = Vec::with_capacity(files.len());
    let mut overwritten = Vec::new();
    for (entry, new_id) in files.into_iter().zip(new_ids) {
        let dest: PathBuf = target.join(new_id.file_name());
        if dest.exists() {
            warn!("{} overwrites {:?}", entry.file_name, dest);
            overwritten.push(new_id.file_name());
        }
        fs::copy(&entry.path, &dest).map_err(|e| ToolError::io(&entry.path, e))?;
        debug!("{} -> {}", entry.file_name, new_id.file_name());
        assignments.push(Assignment { source: entry.file_name, new_id });
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(ShuffleReport { skipped, assignments, preexisting, overwritten })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn seed_dir(ids: impl IntoIterator<Item = u32>) -> TempDir {
        let dir = TempDir::new().unwrap();
        for id in ids {
            fs::write(dir.path().join(format!("{id}.json")), format!(r#"{{"orig":{id}}}"#)).unwrap();
        }
        dir
    }

    #[test]
    fn sampled_ids_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = sample_ids(&mut rng, 500, 600).unwrap();
        assert_eq!(ids.len(), 500);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 500);
        assert!(ids.iter().all(|id| (1..=600).contains(&id.0)));
    }

    #[test]
    fn full_space_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ids: Vec<u64> = sample_ids(&mut rng, 50, 50).unwrap().into_iter().map(|i| i.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn copies_every_eligible_file_under_a_new_name() {
        let src = seed_dir(1..=20);
        fs::write(src.path().join("cover.json"), "{}").unwrap();
        fs::write(src.path().join("12a.json"), "{}").unwrap();
        fs::write(src.path().join("3.png"), "png").unwrap();
        let dst = TempDir::new().unwrap();
        let target = dst.path().join("shuffled");

        let mut rng = StdRng::seed_from_u64(42);
        let report =
            shuffle_files_with_rng(src.path(), &target, 30_000, &mut rng, &ProgressBar::hidden())
                .unwrap();

        assert_eq!(report.copied(), 20);
        assert_eq!(report.skipped, 2);
        assert_eq!(fs::read_dir(&target).unwrap().count(), 20);

        let new_ids: HashSet<FileId> = report.assignments.iter().map(|a| a.new_id).collect();
        assert_eq!(new_ids.len(), 20);

        for a in &report.assignments {
            let copied = fs::read_to_string(target.join(a.new_id.file_name())).unwrap();
            let original = fs::read_to_string(src.path().join(&a.source)).unwrap();
            assert_eq!(copied, original);
        }
        // sources untouched
        assert_eq!(fs::read_dir(src.path()).unwrap().count(), 23);
    }

    #[test]
    fn oversubscribed_space_fails_before_writing() {
        let src = seed_dir(1..=5);
        let dst = TempDir::new().unwrap();
        let target = dst.path().join("out");

        let err = shuffle_files(src.path(), &target, 4, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, ToolError::Capacity { requested: 5, available: 4 }));
        assert!(!target.exists());
    }

    #[test]
    fn copies_are_independent_of_sources() {
        let src = seed_dir([1]);
        let dst = TempDir::new().unwrap();

        let report = shuffle_files(src.path(), dst.path(), 1, &ProgressBar::hidden()).unwrap();
        assert_eq!(report.assignments[0].new_id, FileId(1));

        fs::write(dst.path().join("1.json"), "changed").unwrap();
        assert_eq!(fs::read_to_string(src.path().join("1.json")).unwrap(), r#"{"orig":1}"#);
    }

    #[test]
    fn target_equal_to_source_is_rejected_before_any_copy() {
        let dir = TempDir::new().unwrap();
        for id in 1..=3 {
            fs::write(dir.path().join(format!("{id}.json")), format!("orig{id}")).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(3);
        let err = shuffle_files_with_rng(dir.path(), dir.path(), 3, &mut rng, &ProgressBar::hidden())
            .unwrap_err();
        assert!(matches!(err, ToolError::Config(_)), "{err}");

        // same directory spelled differently
        let dotted = dir.path().join(".");
        let err = shuffle_files(dir.path(), &dotted, 3, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, ToolError::Config(_)), "{err}");

        for id in 1..=3 {
            assert_eq!(fs::read_to_string(dir.path().join(format!("{id}.json"))).unwrap(), format!("orig{id}"));
        }
    }

    #[test]
    fn replaced_and_preexisting_target_files_are_reported() {
        let src = seed_dir(1..=2);
        let dst = TempDir::new().unwrap();
        // a full space of two: both stale files get hit
        fs::write(dst.path().join("1.json"), "stale").unwrap();
        fs::write(dst.path().join("2.json"), "stale").unwrap();
        fs::write(dst.path().join("900.json"), "stale").unwrap();

        let report = shuffle_files(src.path(), dst.path(), 2, &ProgressBar::hidden()).unwrap();

        assert_eq!(report.copied(), 2);
        assert_eq!(report.preexisting, 3);
        let mut overwritten = report.overwritten.clone();
        overwritten.sort();
        assert_eq!(overwritten, ["1.json", "2.json"]);
        assert_eq!(fs::read_to_string(dst.path().join("900.json")).unwrap(), "stale");
    }
}
