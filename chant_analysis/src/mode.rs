// Mode extraction: which pitch classes a passage uses, read from its center.
//
// In this corpus a "mode" is descriptive rather than theoretical: take the
// distinct pitch-class names a span of notes actually sings, then list them
// upward from a tonal center (usually the span's final note, see
// analysis.rs for how the center is chosen). The result is rendered as a
// space-separated string such as "D E F G A B- C".
//
// Ordering is by semitone distance above the center, mod 12. Names are
// compared by spelling, so F# and G- both appear if both are written; such
// enharmonic ties keep the order in which the names were first sung. After
// sorting, the list is rotated so the center's own spelling comes first.
//
// Used by analysis.rs for full-voice and per-measure modes.

use crate::score::Note;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The pitch classes of a passage, ordered upward from its center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Pitch-class names; the first entry is the center.
    pub names: Vec<String>,
}

impl Mode {
    /// Build the mode of `notes` around `center`. Returns `None` when there
    /// are no notes. The center does not need to be one of the notes.
    pub fn extract<'a>(notes: impl IntoIterator<Item = &'a Note>, center: &Note) -> Option<Mode> {
        let mut classes: Vec<(String, u8)> = Vec::new();
        for note in notes {
            let name = note.pitch.name();
            if !classes.iter().any(|(n, _)| *n == name) {
                classes.push((name, note.pitch.pitch_class()));
            }
        }
        if classes.is_empty() {
            return None;
        }

        let center_name = center.pitch.name();
        let center_pc = center.pitch.pitch_class();
        if !classes.iter().any(|(n, _)| *n == center_name) {
            classes.push((center_name.clone(), center_pc));
        }

        // Stable: enharmonic spellings keep first-sung order.
        classes.sort_by_key(|&(_, pc)| (pc + 12 - center_pc) % 12);
        let start = classes
            .iter()
            .position(|(n, _)| *n == center_name)
            .unwrap_or(0);
        classes.rotate_left(start);

        Some(Mode {
            names: classes.into_iter().map(|(n, _)| n).collect(),
        })
    }

    pub fn center(&self) -> &str {
        &self.names[0]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(" "))
    }
}

/// Mode string of `notes` around `center`; empty when there are no notes.
pub fn extract_mode<'a>(notes: impl IntoIterator<Item = &'a Note>, center: &Note) -> String {
    Mode::extract(notes, center)
        .map(|m| m.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(pitches: &[&str]) -> Vec<Note> {
        pitches
            .iter()
            .map(|p| Note::new(p.parse().unwrap()))
            .collect()
    }

    fn n(pitch: &str) -> Note {
        Note::new(pitch.parse().unwrap())
    }

    #[test]
    fn test_d_dorian_from_final() {
        let line = notes(&["A4", "G4", "F4", "E4", "D4", "C4", "B3", "D4"]);
        assert_eq!(extract_mode(&line, &n("D4")), "D E F G A B C");
    }

    #[test]
    fn test_empty_passage_gives_empty_string() {
        let none: Vec<Note> = Vec::new();
        assert_eq!(extract_mode(&none, &n("D4")), "");
        assert!(Mode::extract(&none, &n("D4")).is_none());
    }

    #[test]
    fn test_center_outside_passage_is_added() {
        let line = notes(&["E4", "F4", "A4"]);
        let mode = Mode::extract(&line, &n("D3")).unwrap();
        assert_eq!(mode.center(), "D");
        assert_eq!(mode.to_string(), "D E F A");
    }

    #[test]
    fn test_octaves_and_repeats_collapse() {
        let line = notes(&["G3", "G4", "B-3", "B-4", "C5", "G2"]);
        assert_eq!(extract_mode(&line, &n("G3")), "G B- C");
    }

    #[test]
    fn test_ordering_wraps_around_the_octave() {
        // Center A: C is 3 semitones above, B 2 above, G 10 above.
        let line = notes(&["C4", "G4", "B4", "A4"]);
        assert_eq!(extract_mode(&line, &n("A4")), "A B C G");
    }

    #[test]
    fn test_enharmonic_center_comes_first() {
        // F# and G- share a pitch class; the center's spelling leads.
        let line = notes(&["F#4", "A4", "G-4"]);
        let mode = Mode::extract(&line, &n("G-4")).unwrap();
        assert_eq!(mode.center(), "G-");
        assert_eq!(mode.to_string(), "G- A F#");
    }

    #[test]
    fn test_names_are_unique_and_match_input_set() {
        let line = notes(&["E4", "F#4", "G4", "A4", "B4", "C5", "D5", "E5", "F#3", "E3"]);
        let mode = Mode::extract(&line, &n("E3")).unwrap();
        let mut seen = mode.names.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), mode.names.len());
        assert_eq!(mode.names.len(), 7);
        assert_eq!(mode.center(), "E");
    }
}
