//! Rewrite `name` and `image` in every metadata file of a directory.
//!
//! `name` becomes the file's ID, `image` gets the configured prefix. Every
//! other key is kept as-is and in its original order. Files are written back
//! in place with four-space indentation.

use std::fs;
use std::path::Path;

use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::error::{Result, ToolError};
use crate::file_id::{list_json_files, parse_file_id, FileId};

/// What to do when one file cannot be patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// stop at the first failing file
    #[default]
    Abort,
    /// leave the file untouched, record the failure, continue
    Skip,
}

#[derive(Debug, Clone)]
pub struct PatchOptions {
    pub image_prefix: String,
    /// Leave `image` alone when it already starts with the prefix.
    pub skip_prefixed: bool,
    pub on_error: ErrorPolicy,
}

impl PatchOptions {
    pub fn new(image_prefix: impl Into<String>) -> Self {
        Self { image_prefix: image_prefix.into(), skip_prefixed: true, on_error: ErrorPolicy::Abort }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    /// `name` was set, `image` already carried the prefix
    AlreadyPrefixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchReport {
    pub patched: usize,
    pub already_prefixed: usize,
    /// `*.json` files whose name carries no numeric ID; left untouched
    pub skipped: Vec<String>,
    pub failures: Vec<PatchFailure>,
}

/// Apply the edit to one parsed document.
pub fn patch_value(doc: &mut Value, id: FileId, opts: &PatchOptions, path: &Path) -> Result<PatchOutcome> {
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| ToolError::schema(path, "top-level JSON is not an object"))?;

    let image = match obj.get("image") {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(ToolError::schema(path, format!("\"image\" is not a string: {other}")));
        }
        None => return Err(ToolError::schema(path, "\"image\" is missing")),
    };

    let prefix = opts.image_prefix.as_str();
    let outcome = if opts.skip_prefixed && !prefix.is_empty() && image.starts_with(prefix) {
        PatchOutcome::AlreadyPrefixed
    } else {
        let prefixed = format!("{prefix}{image}");
        obj.insert("image".to_string(), Value::String(prefixed));
        PatchOutcome::Patched
    };
    obj.insert("name".to_string(), Value::String(id.to_string()));
    Ok(outcome)
}

/// Pretty JSON with four-space indentation.
pub fn to_indented_json(doc: &Value) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)?;
    Ok(buf)
}

/// Read, patch and rewrite a single file.
pub fn patch_file(path: &Path, file_name: &str, opts: &PatchOptions) -> Result<PatchOutcome> {
    let id = parse_file_id(file_name)?;
    let raw = fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    let mut doc: Value = serde_json::from_str(&raw).map_err(|e| ToolError::Parse {
        target: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let outcome = patch_value(&mut doc, id, opts, path)?;

    let bytes = to_indented_json(&doc).map_err(|e| ToolError::Parse {
        target: path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::write(path, bytes).map_err(|e| ToolError::io(path, e))?;
    Ok(outcome)
}

/// Patch every `*.json` file in `dir`, in name order. Files without a
/// numeric ID in their name (`collection.json`) are skipped with a warning.
pub fn patch_dir(dir: &Path, opts: &PatchOptions, bar: &ProgressBar) -> Result<PatchReport> {
    let entries = list_json_files(dir)?;
    info!("Patching {} files in {:?} with prefix {:?}", entries.len(), dir, opts.image_prefix);

    bar.set_length(entries.len() as u64);
    let mut report = PatchReport::default();
    for entry in &entries {
        if parse_file_id(&entry.file_name).is_err() {
            warn!("{}: no numeric ID in file name, skipped", entry.file_name);
            report.skipped.push(entry.file_name.clone());
            bar.inc(1);
            continue;
        }
        match patch_file(&entry.path, &entry.file_name, opts) {
            Ok(PatchOutcome::Patched) => report.patched += 1,
            Ok(PatchOutcome::AlreadyPrefixed) => {
                debug!("{}: image already prefixed", entry.file_name);
                report.already_prefixed += 1;
            }
            Err(e) if opts.on_error == ErrorPolicy::Skip => {
                error!("{}: {e}", entry.file_name);
                report.failures.push(PatchFailure { file: entry.file_name.clone(), error: e.to_string() });
            }
            Err(e) => {
                bar.abandon();
                return Err(e);
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        "patched={} already_prefixed={} skipped={} failed={}",
        report.patched,
        report.already_prefixed,
        report.skipped.len(),
        report.failures.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const PREFIX: &str = "ipfs://X/";

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn sets_name_and_prefixes_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("42.json");
        fs::write(&path, r#"{"image": "pic.png", "attributes": [{"trait_type": "Hat", "value": "Red"}]}"#)
            .unwrap();

        let outcome = patch_file(&path, "42.json", &PatchOptions::new("ipfs://root/")).unwrap();

        assert_eq!(outcome, PatchOutcome::Patched);
        assert_eq!(
            read(&path),
            json!({
                "image": "ipfs://root/pic.png",
                "attributes": [{"trait_type": "Hat", "value": "Red"}],
                "name": "42",
            })
        );
    }

    #[test]
    fn output_keeps_key_order_and_indents_by_four() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("7.json");
        fs::write(&path, r#"{"name":"old","image":"a.png","zeta":1,"alpha":2}"#).unwrap();

        patch_file(&path, "7.json", &PatchOptions::new("p/")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\n    \"name\": \"7\",\n    \"image\": \"p/a.png\",\n    \"zeta\": 1,\n    \"alpha\": 2\n}"
        );
    }

    #[test]
    fn second_run_is_guarded_by_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.json");
        fs::write(&path, r#"{"image": "1.png"}"#).unwrap();
        let opts = PatchOptions::new(PREFIX);

        assert_eq!(patch_file(&path, "1.json", &opts).unwrap(), PatchOutcome::Patched);
        assert_eq!(patch_file(&path, "1.json", &opts).unwrap(), PatchOutcome::AlreadyPrefixed);
        assert_eq!(read(&path)["image"], "ipfs://X/1.png");
    }

    #[test]
    fn second_run_doubles_prefix_without_guard() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.json");
        fs::write(&path, r#"{"image": "1.png"}"#).unwrap();
        let opts = PatchOptions { skip_prefixed: false, ..PatchOptions::new(PREFIX) };

        patch_file(&path, "1.json", &opts).unwrap();
        patch_file(&path, "1.json", &opts).unwrap();
        assert_eq!(read(&path)["image"], "ipfs://X/ipfs://X/1.png");
    }

    #[test]
    fn missing_or_non_string_image_is_schema_error() {
        let opts = PatchOptions::new(PREFIX);
        let path = Path::new("3.json");
        for mut doc in [json!({"name": "x"}), json!({"image": 5}), json!(["image"])] {
            let err = patch_value(&mut doc, FileId(3), &opts, path).unwrap_err();
            assert!(matches!(err, ToolError::Schema { .. }), "{err}");
        }
    }

    #[test]
    fn files_without_numeric_id_are_skipped_untouched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1.json"), r#"{"image": "1.png"}"#).unwrap();
        fs::write(dir.path().join("collection.json"), r#"{"image": "banner.png"}"#).unwrap();

        let report = patch_dir(dir.path(), &PatchOptions::new(PREFIX), &ProgressBar::hidden()).unwrap();

        assert_eq!(report.patched, 1);
        assert_eq!(report.skipped, ["collection.json"]);
        assert!(report.failures.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("collection.json")).unwrap(),
            r#"{"image": "banner.png"}"#
        );
    }

    #[test]
    fn abort_policy_stops_at_first_bad_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1.json"), r#"{"image": "1.png"}"#).unwrap();
        fs::write(dir.path().join("2.json"), "{not json").unwrap();
        fs::write(dir.path().join("3.json"), r#"{"image": "3.png"}"#).unwrap();

        let err = patch_dir(dir.path(), &PatchOptions::new(PREFIX), &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, ToolError::Parse { .. }));

        // files are visited in name order: 1 done, 3 never reached
        assert_eq!(read(&dir.path().join("1.json"))["image"], "ipfs://X/1.png");
        assert_eq!(read(&dir.path().join("3.json"))["image"], "3.png");
    }

    #[test]
    fn skip_policy_records_failures_and_continues() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1.json"), r#"{"image": "1.png"}"#).unwrap();
        fs::write(dir.path().join("2.json"), r#"{"name": "no image"}"#).unwrap();
        fs::write(dir.path().join("3.json"), r#"{"image": "ipfs://X/3.png"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let opts = PatchOptions { on_error: ErrorPolicy::Skip, ..PatchOptions::new(PREFIX) };
        let report = patch_dir(dir.path(), &opts, &ProgressBar::hidden()).unwrap();

        assert_eq!(report.patched, 1);
        assert_eq!(report.already_prefixed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "2.json");
        assert_eq!(fs::read_to_string(dir.path().join("2.json")).unwrap(), r#"{"name": "no image"}"#);
        assert_eq!(read(&dir.path().join("3.json"))["name"], "3");
    }
}
