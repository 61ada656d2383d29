//! Carbon-intensity input loading with an offline fallback.
//!
//! Retrieval from the remote grid API lives outside this crate; the
//! collaborator drops a JSON file of slot records next to the scenario and
//! keeps a fallback copy from the last successful fetch.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::carbon::CarbonSlot;

/// Which file a successful load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarbonSource {
    /// The configured primary input file.
    Primary,
    /// The offline fallback file.
    Fallback,
}

/// Failure to read or parse a carbon input file.
#[derive(Debug)]
pub struct LoadError {
    /// Path of the file that failed.
    pub path: String,
    /// Read or parse failure description.
    pub message: String,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "carbon load error: \"{}\": {}", self.path, self.message)
    }
}

/// Reads and parses one carbon input file.
///
/// # Errors
///
/// Returns a `LoadError` if the file cannot be read or is not a JSON array
/// of slot records.
pub fn read_carbon_file(path: &Path) -> Result<Vec<CarbonSlot>, LoadError> {
    let raw = fs::read_to_string(path).map_err(|e| LoadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| LoadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Loads the primary carbon file, falling back to the offline copy.
///
/// # Errors
///
/// Returns the primary file's `LoadError` when no fallback is configured or
/// the fallback fails too.
pub fn load_with_fallback(
    primary: &Path,
    fallback: Option<&Path>,
) -> Result<(Vec<CarbonSlot>, CarbonSource), LoadError> {
    match read_carbon_file(primary) {
        Ok(slots) => Ok((slots, CarbonSource::Primary)),
        Err(primary_err) => match fallback {
            Some(fb) => match read_carbon_file(fb) {
                Ok(slots) => Ok((slots, CarbonSource::Fallback)),
                Err(_) => Err(primary_err),
            },
            None => Err(primary_err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"from": "2026-01-05T00:00Z", "to": "2026-01-05T00:30Z",
         "intensity": {"forecast": 120, "actual": 130}},
        {"from": "2026-01-05T00:30Z", "to": "2026-01-05T01:00Z",
         "intensity": {"forecast": 118, "actual": null}}
    ]"#;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("flex-sim-input-{name}"));
        let mut f = std::fs::File::create(&path).expect("temp file should create");
        f.write_all(content.as_bytes()).expect("temp write");
        path
    }

    #[test]
    fn reads_valid_file() {
        let path = write_temp("valid.json", SAMPLE);
        let slots = read_carbon_file(&path).expect("sample should parse");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].intensity.effective(), 130.0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_carbon_file(Path::new("/nonexistent/carbon.json"))
            .expect_err("missing file must fail");
        assert!(err.path.contains("carbon.json"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = write_temp("broken.json", "{not json");
        assert!(read_carbon_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn fallback_is_used_when_primary_is_missing() {
        let fb = write_temp("fallback.json", SAMPLE);
        let (slots, source) =
            load_with_fallback(Path::new("/nonexistent/carbon.json"), Some(&fb))
                .expect("fallback should load");
        assert_eq!(slots.len(), 2);
        assert_eq!(source, CarbonSource::Fallback);
        std::fs::remove_file(&fb).ok();
    }

    #[test]
    fn primary_error_survives_failed_fallback() {
        let err = load_with_fallback(
            Path::new("/nonexistent/primary.json"),
            Some(Path::new("/nonexistent/fallback.json")),
        )
        .expect_err("both missing must fail");
        assert!(err.path.contains("primary.json"));
    }
}
