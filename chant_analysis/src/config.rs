// Run configuration for the corpus analysis.
//
// `AnalysisConfig` holds every tunable of a run: where the scores live,
// where tables go, which lyric line carries the QNR, and a couple of output
// switches. The binary looks for `chant_analysis.json` in the working
// directory and falls back to defaults when it is absent or unreadable.
// Every field has a default, so a config file only needs the keys it
// changes.
//
// See also: `corpus.rs` which consumes the config, `patterns.rs` for
// `PatternOptions`.

use crate::patterns::PatternOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "chant_analysis.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory scanned for score files.
    pub input_dir: PathBuf,
    /// Directory the tables are written to. Created if missing.
    pub output_dir: PathBuf,
    /// Only files whose names end with this suffix are read (case-sensitive).
    pub file_extension: String,
    /// Lyric line (0-based) holding the QNR label.
    pub qnr_lyric_index: usize,
    /// Report tetrachords that end a voice with no note after them.
    pub emit_trailing_tetrachords: bool,
    /// Also write `analysis.json` with every chant record.
    pub write_json: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            file_extension: ".xml".to_string(),
            qnr_lyric_index: 1,
            emit_trailing_tetrachords: false,
            write_json: false,
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn pattern_options(&self) -> PatternOptions {
        PatternOptions {
            qnr_lyric_index: self.qnr_lyric_index,
            emit_trailing_tetrachords: self.emit_trailing_tetrachords,
        }
    }
}
