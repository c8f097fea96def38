// Table output: the three CSV files and the optional JSON dump.
//
// - full_modes.csv: one row per chant, whole-voice modes.
// - mukhli_modes.csv: one row per chant, four columns (combined, top,
//   middle, bass) per mukhli slot up to the corpus maximum.
// - musical_events.csv: one row per chant, one column per pattern key in
//   the order keys were first found across the corpus. Each cell lists the
//   chant's occurrences as `['1.001.1.3-4', '2.001.1.7-8']`.
//
// Missing values render as empty fields. Fields are quoted only when they
// contain a comma, a double quote, or a line break; rows end with `\n`.
// Rendering is pure so that the same records always yield the same bytes.

use crate::corpus::{ChantRecord, CorpusReport};
use crate::patterns::Occurrence;
use crate::score::VoiceRole;
use std::path::{Path, PathBuf};

pub const FULL_MODES_FILE: &str = "full_modes.csv";
pub const MUKHLI_MODES_FILE: &str = "mukhli_modes.csv";
pub const MUSICAL_EVENTS_FILE: &str = "musical_events.csv";
pub const JSON_FILE: &str = "analysis.json";

/// Quote a CSV field if it needs it.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_row(out: &mut String, fields: &[String]) {
    let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Quoted list item: single quotes, unless the text holds a `'` and no `"`,
/// in which case double quotes. Backslashes and the chosen quote are escaped.
fn quoted_label(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// List cell: `['1.001.1.3-4', '2.001.1.7-8']`.
pub fn render_list(occurrences: &[Occurrence]) -> String {
    let items: Vec<String> = occurrences
        .iter()
        .map(|o| quoted_label(&o.to_string()))
        .collect();
    format!("[{}]", items.join(", "))
}

pub fn full_modes_csv(records: &[ChantRecord]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &["chant_number", "top_mode", "middle_mode", "bass_mode", "combined_mode"].map(String::from),
    );
    for record in records {
        let modes = &record.full_modes;
        let mut row = vec![record.chant_id.clone()];
        row.extend(VoiceRole::ALL.map(|role| modes.voice(role).unwrap_or_default().to_string()));
        row.push(modes.combined.clone().unwrap_or_default());
        push_row(&mut out, &row);
    }
    out
}

pub fn mukhli_modes_csv(records: &[ChantRecord], max_measures: usize) -> String {
    let mut out = String::new();
    let mut header = vec!["chant_number".to_string()];
    for slot in 1..=max_measures {
        header.push(format!("mukhli_{slot}_combined_mode"));
        header.extend(VoiceRole::ALL.map(|role| format!("mukhli_{slot}_{role}_mode")));
    }
    push_row(&mut out, &header);

    for record in records {
        let mut row = vec![record.chant_id.clone()];
        for slot in 0..max_measures {
            match record.measure_modes.get(slot) {
                Some(modes) => {
                    row.push(modes.combined.clone().unwrap_or_default());
                    row.extend(
                        VoiceRole::ALL.map(|role| modes.voice(role).unwrap_or_default().to_string()),
                    );
                }
                None => row.extend(std::iter::repeat_n(String::new(), 4)),
            }
        }
        push_row(&mut out, &row);
    }
    out
}

/// Pattern keys across all records, in first-found order.
pub fn event_keys(records: &[ChantRecord]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for key in record.patterns.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

pub fn musical_events_csv(records: &[ChantRecord]) -> String {
    let keys = event_keys(records);
    let mut out = String::new();
    let mut header = vec!["chant_number".to_string()];
    header.extend(keys.iter().cloned());
    push_row(&mut out, &header);

    for record in records {
        let mut row = vec![record.chant_id.clone()];
        for key in &keys {
            row.push(record.patterns.get(key).map(render_list).unwrap_or_default());
        }
        push_row(&mut out, &row);
    }
    out
}

/// Write every table into `output_dir`, creating it if needed. Returns the
/// paths written, in order.
pub fn write_tables(
    report: &CorpusReport,
    output_dir: &Path,
    write_json: bool,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;

    let mut tables = vec![
        (FULL_MODES_FILE, full_modes_csv(&report.records)),
        (
            MUKHLI_MODES_FILE,
            mukhli_modes_csv(&report.records, report.max_measures),
        ),
        (MUSICAL_EVENTS_FILE, musical_events_csv(&report.records)),
    ];
    if write_json {
        let mut json = serde_json::to_string_pretty(&report.records)?;
        json.push('\n');
        tables.push((JSON_FILE, json));
    }

    let mut written = Vec::with_capacity(tables.len());
    for (name, contents) in tables {
        let path = output_dir.join(name);
        std::fs::write(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}
