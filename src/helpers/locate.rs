use glob::{MatchOptions, Pattern};
use regex::RegexBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    GlobError(#[from] glob::GlobError),

    #[error("{0}")]
    RegexError(#[from] regex::Error),
}

/// Finds the newest browser-style copy of `file_name` inside `directory`.
///
/// Repeated downloads of `Report.xlsx` land as `Report (1).xlsx`,
/// `Report (2).xlsx` and so on. The copy with the highest number wins; the
/// plain `Report.xlsx` is only returned when no numbered copy exists. Names
/// are compared case-insensitively.
///
/// # Returns
///
/// * `Ok(None)` - No file in `directory` matches
pub fn find_latest_file(directory: &Path, file_name: &str) -> Result<Option<PathBuf>, LocateError> {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or(file_name);
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{}", extension))
        .unwrap_or_default();

    let name_pattern = RegexBuilder::new(&format!(
        r"^{}(?:\s*\((\d+)\))?{}$",
        regex::escape(stem),
        regex::escape(&extension)
    ))
    .case_insensitive(true)
    .build()?;

    let search = format!(
        "{}{}{}*",
        Pattern::escape(&directory.to_string_lossy()),
        std::path::MAIN_SEPARATOR,
        Pattern::escape(stem)
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut latest: Option<(Option<u64>, PathBuf)> = None;
    for candidate in glob::glob_with(&search, options)? {
        let candidate = candidate?;
        let Some(name) = candidate.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(captures) = name_pattern.captures(name) else {
            continue;
        };
        let number = match captures.get(1) {
            Some(digits) => match digits.as_str().parse::<u64>() {
                Ok(number) => Some(number),
                Err(_) => continue,
            },
            None => None,
        };
        debug!("Candidate {} (copy {:?})", candidate.display(), number);
        if latest.as_ref().map_or(true, |(best, _)| number > *best) {
            latest = Some((number, candidate));
        }
    }

    if latest.is_none() {
        warn!("No file matching {} in {}", file_name, directory.display());
    }
    Ok(latest.map(|(_, path)| path))
}
