//! Corpus discovery: recording enumeration per speaker and the subjects table.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use walkdir::WalkDir;

/// All wav files under `data_dir` whose stem contains the speaker id, sorted
/// for deterministic processing order.
pub fn recordings_for_speaker(data_dir: &Path, speaker_id: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(data_dir) {
        let entry =
            entry.with_context(|| format!("failed to walk corpus directory {data_dir:?}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        let matches_speaker = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.contains(speaker_id));
        if is_wav && matches_speaker {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// One row of the subjects table. Only the columns the analyses consume are
/// retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub random_id: String,
    /// `adminAreaLevel1` column, when present and non-empty.
    pub admin_area: Option<String>,
}

impl Subject {
    pub fn is_californian(&self) -> bool {
        matches!(self.admin_area.as_deref(), Some("California") | Some("CA"))
    }
}

/// Reads the tab-separated subjects table. The header must name a
/// `random_id` column; `adminAreaLevel1` is optional.
pub fn read_subjects(path: &Path) -> Result<Vec<Subject>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read subjects table {path:?}"))?;
    parse_subjects(&data).with_context(|| format!("malformed subjects table {path:?}"))
}

fn parse_subjects(data: &str) -> Result<Vec<Subject>> {
    let mut lines = data.lines();
    let header = lines.next().ok_or_else(|| anyhow!("empty table"))?;
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();
    let id_column = columns
        .iter()
        .position(|c| *c == "random_id")
        .ok_or_else(|| anyhow!("no random_id column in header"))?;
    let area_column = columns.iter().position(|c| *c == "adminAreaLevel1");

    let mut subjects = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
        let random_id = cells
            .get(id_column)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("line {}: missing random_id", idx + 2))?
            .to_string();
        let admin_area = area_column
            .and_then(|col| cells.get(col))
            .map(|area| area.to_string())
            .filter(|area| !area.is_empty());
        subjects.push(Subject {
            random_id,
            admin_area,
        });
    }
    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn parses_subjects_and_region_filter() {
        let data = "random_id\tgender\tadminAreaLevel1\n\
                    ab12\tf\tCalifornia\n\
                    cd34\tm\tOregon\n\
                    ef56\tf\tCA\n\
                    gh78\tm\t\n";
        let subjects = parse_subjects(data).unwrap();
        assert_eq!(subjects.len(), 4);
        let californian: Vec<&str> = subjects
            .iter()
            .filter(|s| s.is_californian())
            .map(|s| s.random_id.as_str())
            .collect();
        assert_eq!(californian, vec!["ab12", "ef56"]);
        assert_eq!(subjects[3].admin_area, None);
    }

    #[test]
    fn rejects_tables_without_random_id() {
        assert!(parse_subjects("speaker\tregion\nx\ty\n").is_err());
        assert!(parse_subjects("").is_err());
    }

    #[test]
    fn finds_speaker_recordings_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "ab12_1_take.wav",
            "ab12_2_take.wav",
            "ab12_2_take.TextGrid",
            "cd34_1_take.wav",
        ] {
            File::create(dir.path().join(name)).unwrap();
        }

        let found = recordings_for_speaker(dir.path(), "ab12").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["ab12_1_take.wav", "ab12_2_take.wav"]);
    }
}
