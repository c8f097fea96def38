// Melodic pattern search: interval pairs and tetrachords, located by QNR.
//
// Two independent pattern families are scanned over each voice's full note
// sequence (measure boundaries are ignored):
//
// - Interval pairs: consecutive notes forming a perfect fourth, major third,
//   or minor third, matched by interval *name*. An augmented second spans
//   the same three semitones as a minor third but is not one.
// - Tetrachords: four consecutive notes whose three directed semitone steps
//   are exactly [2,2,1] (major), [2,1,2] (minor), [1,3,1] (phrygian), or
//   [2,2,2] (lydian). If the note after the tetrachord lands a perfect fifth
//   from its first note, the occurrence is filed under `<kind>_tetrachord_fifth`
//   and spans five notes; otherwise it is filed under `<kind>_tetrachord`.
//   A fifth note without a QNR cannot label the span, so the tetrachord
//   falls back to the plain four-note key.
//   A tetrachord ending the voice (no fifth note to judge) is dropped unless
//   `emit_trailing_tetrachords` is set.
//
// Occurrences are labelled with the QNR lyric of their first and last notes.
// Every note in the span must carry a QNR; spans that don't are skipped
// silently, since unlabelled notes are common in the corpus.
//
// Numbering: interval-pair indices restart for each voice; tetrachord
// indices run across the whole chant per key.

use crate::pitch::Interval;
use crate::score::{Chant, Note, VoiceRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval pairs searched for, in output order.
pub const MELODIC_INTERVALS: [&str; 3] = ["P4", "M3", "m3"];

/// The four tetrachord shapes recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrachordKind {
    Major,
    Minor,
    Phrygian,
    Lydian,
}

impl TetrachordKind {
    pub const ALL: [TetrachordKind; 4] = [
        TetrachordKind::Major,
        TetrachordKind::Minor,
        TetrachordKind::Phrygian,
        TetrachordKind::Lydian,
    ];

    /// Directed semitone steps between the four notes.
    pub fn steps(self) -> [i32; 3] {
        match self {
            TetrachordKind::Major => [2, 2, 1],
            TetrachordKind::Minor => [2, 1, 2],
            TetrachordKind::Phrygian => [1, 3, 1],
            TetrachordKind::Lydian => [2, 2, 2],
        }
    }

    /// Exact match on the step triple; no transposition or inversion.
    pub fn classify(steps: [i32; 3]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.steps() == steps)
    }

    pub fn name(self) -> &'static str {
        match self {
            TetrachordKind::Major => "major",
            TetrachordKind::Minor => "minor",
            TetrachordKind::Phrygian => "phrygian",
            TetrachordKind::Lydian => "lydian",
        }
    }

    /// Pattern key, e.g. "major_tetrachord" or "major_tetrachord_fifth".
    pub fn key(self, with_fifth: bool) -> String {
        if with_fifth {
            format!("{}_tetrachord_fifth", self.name())
        } else {
            format!("{}_tetrachord", self.name())
        }
    }
}

/// One located pattern, rendered `{index}.{chant}.{voice}.{first}-{last}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub index: usize,
    pub chant_id: String,
    /// 1-based voice number (1 = top, 3 = bass).
    pub voice: usize,
    pub first_qnr: String,
    pub last_qnr: String,
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}-{}",
            self.index, self.chant_id, self.voice, self.first_qnr, self.last_qnr
        )
    }
}

/// Knobs for the pattern search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// Which lyric line holds the QNR (0-based).
    pub qnr_lyric_index: usize,
    pub emit_trailing_tetrachords: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        PatternOptions {
            qnr_lyric_index: 1,
            emit_trailing_tetrachords: false,
        }
    }
}

/// All occurrences found in one chant, grouped by key in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChantPatterns {
    entries: Vec<(String, Vec<Occurrence>)>,
}

impl ChantPatterns {
    pub fn push(&mut self, key: &str, occurrence: Occurrence) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, list)) => list.push(occurrence),
            None => self.entries.push((key.to_string(), vec![occurrence])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[Occurrence]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, list)| list.as_slice())
    }

    pub fn count(&self, key: &str) -> usize {
        self.get(key).map_or(0, <[Occurrence]>::len)
    }

    /// Keys in the order they were first found.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// QNR labels for every note in `span`, or `None` if any is missing.
fn span_qnrs<'a>(span: &[&'a Note], qnr_lyric_index: usize) -> Option<Vec<&'a str>> {
    span.iter().map(|&n| n.lyric(qnr_lyric_index)).collect()
}

fn scan_interval_pairs(
    notes: &[&Note],
    chant_id: &str,
    role: VoiceRole,
    options: &PatternOptions,
    patterns: &mut ChantPatterns,
) {
    for target in MELODIC_INTERVALS {
        let mut index = 0;
        for pair in notes.windows(2) {
            if Interval::between(&pair[0].pitch, &pair[1].pitch).name() != target {
                continue;
            }
            let Some(qnrs) = span_qnrs(pair, options.qnr_lyric_index) else {
                continue;
            };
            index += 1;
            patterns.push(
                target,
                Occurrence {
                    index,
                    chant_id: chant_id.to_string(),
                    voice: role.number(),
                    first_qnr: qnrs[0].to_string(),
                    last_qnr: qnrs[1].to_string(),
                },
            );
        }
    }
}

fn scan_tetrachords(
    notes: &[&Note],
    chant_id: &str,
    role: VoiceRole,
    options: &PatternOptions,
    patterns: &mut ChantPatterns,
) {
    for start in 0..notes.len().saturating_sub(3) {
        let steps = [0, 1, 2].map(|k| {
            Interval::between(&notes[start + k].pitch, &notes[start + k + 1].pitch).semitones
        });
        let Some(kind) = TetrachordKind::classify(steps) else {
            continue;
        };

        let (key, span) = match notes.get(start + 4) {
            Some(fifth)
                if fifth.lyric(options.qnr_lyric_index).is_some()
                    && Interval::between(&notes[start].pitch, &fifth.pitch).is_perfect_fifth() =>
            {
                (kind.key(true), &notes[start..start + 5])
            }
            Some(_) => (kind.key(false), &notes[start..start + 4]),
            None if options.emit_trailing_tetrachords => (kind.key(false), &notes[start..start + 4]),
            None => continue,
        };

        let Some(qnrs) = span_qnrs(span, options.qnr_lyric_index) else {
            continue;
        };
        let index = patterns.count(&key) + 1;
        patterns.push(
            &key,
            Occurrence {
                index,
                chant_id: chant_id.to_string(),
                voice: role.number(),
                first_qnr: qnrs[0].to_string(),
                last_qnr: qnrs[qnrs.len() - 1].to_string(),
            },
        );
    }
}

/// Scan every voice of `chant` for interval pairs, then tetrachords.
pub fn find_patterns(chant: &Chant, options: &PatternOptions) -> ChantPatterns {
    let mut patterns = ChantPatterns::default();
    for role in VoiceRole::ALL {
        let notes = chant.voice(role).notes();
        scan_interval_pairs(&notes, &chant.id, role, options, &mut patterns);
        scan_tetrachords(&notes, &chant.id, role, options, &mut patterns);
    }
    patterns
}
