// Corpus driver: turns a directory of chant scores into per-chant records.
//
// The run has two passes over the same sorted file list. Pass 1 loads every
// score only to learn the largest mukhli count in the corpus, which fixes
// the width of the measure table. Pass 2 loads every score again and
// computes full modes, per-measure modes (padded to that width), and
// melodic patterns. Nothing is cached between passes; each score is parsed,
// analyzed, and dropped before the next is read.
//
// A file that fails to load is reported and skipped in both passes, so one
// bad transcription never sinks the run. The driver never prints: it
// reports through a `Progress` callback and leaves rendering to the caller
// (see main.rs).

use crate::analysis::{Diagnostics, FullModes, MeasureModes, full_modes, mukhli_count, mukhli_modes};
use crate::config::AnalysisConfig;
use crate::musicxml::load_chant;
use crate::patterns::{ChantPatterns, PatternOptions, find_patterns};
use crate::score::ScoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Something the driver wants the user to know about.
#[derive(Debug)]
pub enum Progress<'a> {
    /// Pass 1 is about to load this file.
    PreProcessing(&'a Path),
    /// Pass 2 is about to analyze this file.
    Analyzing(&'a Path),
    /// A file could not be loaded and is left out.
    Skipped { path: &'a Path, error: &'a ScoreError },
    /// An advisory raised while analyzing a chant.
    Warning(&'a str),
}

/// Everything computed for one chant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChantRecord {
    pub chant_id: String,
    pub full_modes: FullModes,
    /// One entry per mukhli slot, padded to the corpus maximum.
    pub measure_modes: Vec<MeasureModes>,
    pub patterns: ChantPatterns,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub records: Vec<ChantRecord>,
    /// Largest mukhli count among the loadable chants.
    pub max_measures: usize,
    pub skipped: Vec<PathBuf>,
}

/// Score files in `dir` whose names end with `extension`, sorted by name.
pub fn list_score_files(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Pass 1: the largest mukhli count among `files`.
pub fn max_measure_count(files: &[PathBuf], on_progress: &mut impl FnMut(Progress<'_>)) -> usize {
    let mut max = 0;
    for path in files {
        on_progress(Progress::PreProcessing(path));
        match load_chant(path) {
            Ok(chant) => max = max.max(mukhli_count(&chant)),
            Err(error) => on_progress(Progress::Skipped { path, error: &error }),
        }
    }
    max
}

/// Pass 2: analyze each loadable file, padding measure modes to `max_measures`.
pub fn analyze_files(
    files: &[PathBuf],
    max_measures: usize,
    options: &PatternOptions,
    on_progress: &mut impl FnMut(Progress<'_>),
) -> CorpusReport {
    let mut report = CorpusReport {
        max_measures,
        ..CorpusReport::default()
    };

    for path in files {
        on_progress(Progress::Analyzing(path));
        let chant = match load_chant(path) {
            Ok(chant) => chant,
            Err(error) => {
                on_progress(Progress::Skipped { path, error: &error });
                report.skipped.push(path.clone());
                continue;
            }
        };

        let mut diagnostics = Diagnostics::new();
        if mukhli_count(&chant) == 0 {
            diagnostics.warn(format!("No measures found in {}", path.display()));
        }
        let mut measure_modes = mukhli_modes(&chant, &mut diagnostics);
        if measure_modes.len() < max_measures {
            measure_modes.resize_with(max_measures, MeasureModes::default);
        }
        for warning in &diagnostics.warnings {
            on_progress(Progress::Warning(warning));
        }

        report.records.push(ChantRecord {
            full_modes: full_modes(&chant),
            patterns: find_patterns(&chant, options),
            measure_modes,
            chant_id: chant.id,
        });
    }
    report
}

/// Both passes over the configured input directory.
pub fn run(
    config: &AnalysisConfig,
    on_progress: &mut impl FnMut(Progress<'_>),
) -> Result<CorpusReport, Box<dyn std::error::Error>> {
    let files = list_score_files(&config.input_dir, &config.file_extension)?;
    let max_measures = max_measure_count(&files, on_progress);
    Ok(analyze_files(
        &files,
        max_measures,
        &config.pattern_options(),
        on_progress,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_score_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["GCH_002_b.xml", "GCH_001_a.xml", "notes.txt", "GCH_003_c.XML"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let files = list_score_files(dir.path(), ".xml").unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        // Suffix match is case-sensitive; directories are ignored.
        assert_eq!(names, vec!["GCH_001_a.xml", "GCH_002_b.xml"]);
    }

    #[test]
    fn test_unloadable_files_skipped_in_both_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GCH_001_broken.xml");
        std::fs::write(&path, "<score-partwise><part>").unwrap();
        let files = vec![path];

        let mut skipped = 0;
        let max = max_measure_count(&files, &mut |p| {
            if matches!(p, Progress::Skipped { .. }) {
                skipped += 1;
            }
        });
        assert_eq!(max, 0);

        let report = analyze_files(&files, max, &PatternOptions::default(), &mut |p| {
            if matches!(p, Progress::Skipped { .. }) {
                skipped += 1;
            }
        });
        assert_eq!(skipped, 2);
        assert!(report.records.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_chant_without_measures_is_warned_by_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GCH_004_empty.xml");
        std::fs::write(
            &path,
            "<score-partwise><part id=\"P1\"/><part id=\"P2\"/><part id=\"P3\"/></score-partwise>",
        )
        .unwrap();
        let files = vec![path.clone()];

        let mut warnings = Vec::new();
        let report = analyze_files(&files, 2, &PatternOptions::default(), &mut |p| {
            if let Progress::Warning(message) = p {
                warnings.push(message.to_string());
            }
        });
        assert_eq!(
            warnings,
            vec![format!("No measures found in {}", path.display())]
        );
        // Still recorded, padded with empty groups.
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].measure_modes, vec![MeasureModes::default(); 2]);
    }

    #[test]
    fn test_run_fails_on_missing_input_dir() {
        let dir = TempDir::new().unwrap();
        let config = AnalysisConfig {
            input_dir: dir.path().join("absent"),
            ..AnalysisConfig::default()
        };
        assert!(run(&config, &mut |_| {}).is_err());
    }
}
