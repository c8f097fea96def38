// Score representation for three-voice chant transcriptions.
//
// A chant is sung by three voices: top (mtkmeli), middle (modzakhili) and
// bass (bani). Each voice is a part made of numbered measures holding notes;
// a note is a spelled pitch with its lyric lines. The second lyric line of
// every note carries the chant's running note identifier (QNR), which is
// only ever used to label where a pattern occurs.
//
// The model mirrors what the analysis needs and nothing else: no durations,
// no ties, no rests. Chords are dropped at load time (see musicxml.rs).
//
// Measures are looked up by their printed number, so a part whose measures
// are numbered 1, 2, 4 has no measure 3 even though it stores three.

use crate::pitch::{Pitch, PitchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Voice role, in score order (first part is the top voice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceRole {
    Top = 0,
    Middle = 1,
    Bass = 2,
}

impl VoiceRole {
    pub const ALL: [VoiceRole; 3] = [VoiceRole::Top, VoiceRole::Middle, VoiceRole::Bass];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based voice number used in pattern labels.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            VoiceRole::Top => "top",
            VoiceRole::Middle => "middle",
            VoiceRole::Bass => "bass",
        }
    }
}

impl fmt::Display for VoiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sung note: pitch plus lyric lines in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub lyrics: Vec<String>,
}

impl Note {
    pub fn new(pitch: Pitch) -> Self {
        Note {
            pitch,
            lyrics: Vec::new(),
        }
    }

    pub fn with_lyrics(pitch: Pitch, lyrics: &[&str]) -> Self {
        Note {
            pitch,
            lyrics: lyrics.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Lyric line `index` (0-based), if the note has that many.
    pub fn lyric(&self, index: usize) -> Option<&str> {
        self.lyrics.get(index).map(String::as_str)
    }
}

/// One measure of one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// The number attribute as written ("1", "12", "7a", "X1").
    pub number: String,
    pub notes: Vec<Note>,
}

impl Measure {
    /// Numeric value of the measure number: its leading digits, if any.
    pub fn number_value(&self) -> Option<u32> {
        let digits: String = self
            .number
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

/// A part: the measures of one voice in score order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub measures: Vec<Measure>,
}

impl Part {
    /// All notes of the part, measure by measure.
    pub fn notes(&self) -> Vec<&Note> {
        self.measures.iter().flat_map(|m| m.notes.iter()).collect()
    }

    /// The first measure whose number is `number`.
    pub fn measure(&self, number: u32) -> Option<&Measure> {
        self.measures
            .iter()
            .find(|m| m.number_value() == Some(number))
    }

    /// Number of measures numbered 1 or higher (pickup measure 0 excluded).
    pub fn measure_count(&self) -> usize {
        self.measures
            .iter()
            .filter(|m| m.number_value().is_some_and(|n| n >= 1))
            .count()
    }
}

/// A parsed score: every part in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub parts: Vec<Part>,
}

/// Why a chant file could not be turned into a `Chant`.
#[derive(Debug)]
pub enum ScoreError {
    Io(std::io::Error),
    Xml(String),
    NotPartwise(String),
    TooFewParts(usize),
    Pitch { measure: String, source: PitchError },
    NoChantId(PathBuf),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::Io(e) => write!(f, "could not read score: {e}"),
            ScoreError::Xml(e) => write!(f, "malformed XML: {e}"),
            ScoreError::NotPartwise(root) => {
                write!(f, "expected <score-partwise>, found <{root}>")
            }
            ScoreError::TooFewParts(n) => write!(f, "expected 3 voice parts, found {n}"),
            ScoreError::Pitch { measure, source } => {
                write!(f, "bad pitch in measure {measure}: {source}")
            }
            ScoreError::NoChantId(path) => {
                write!(f, "no chant number in file name {}", path.display())
            }
        }
    }
}

impl std::error::Error for ScoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreError::Io(e) => Some(e),
            ScoreError::Pitch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScoreError {
    fn from(e: std::io::Error) -> Self {
        ScoreError::Io(e)
    }
}

/// Chant number from a file name: the second `_`-separated token of the
/// file name (`GCH_001_dasdebeli.xml` gives `001`).
pub fn chant_id_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.split('_').nth(1).map(str::to_string)
}

/// One chant: its number and its three voices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chant {
    pub id: String,
    pub voices: [Part; 3],
}

impl Chant {
    /// Take the first three parts as top, middle, and bass. Extra parts are ignored.
    pub fn from_score(id: impl Into<String>, score: Score) -> Result<Self, ScoreError> {
        let found = score.parts.len();
        let mut parts = score.parts.into_iter();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(top), Some(middle), Some(bass)) => Ok(Chant {
                id: id.into(),
                voices: [top, middle, bass],
            }),
            _ => Err(ScoreError::TooFewParts(found)),
        }
    }

    pub fn voice(&self, role: VoiceRole) -> &Part {
        &self.voices[role.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(number: &str, pitches: &[&str]) -> Measure {
        Measure {
            number: number.to_string(),
            notes: pitches.iter().map(|p| Note::new(p.parse().unwrap())).collect(),
        }
    }

    #[test]
    fn test_measure_number_value() {
        assert_eq!(measure("12", &[]).number_value(), Some(12));
        assert_eq!(measure("7a", &[]).number_value(), Some(7));
        assert_eq!(measure("X1", &[]).number_value(), None);
        assert_eq!(measure("", &[]).number_value(), None);
    }

    #[test]
    fn test_part_lookup_by_number() {
        let part = Part {
            id: "P1".into(),
            measures: vec![
                measure("0", &["G4"]),
                measure("1", &["C4", "D4"]),
                measure("2", &["E4"]),
                measure("4", &["F4"]),
            ],
        };
        assert_eq!(part.measure_count(), 3); // pickup excluded
        assert_eq!(part.measure(1).unwrap().notes.len(), 2);
        assert!(part.measure(3).is_none());
        assert_eq!(part.measure(4).unwrap().notes[0].pitch.name(), "F");
        assert_eq!(part.notes().len(), 5);
    }

    #[test]
    fn test_chant_id_from_path() {
        assert_eq!(
            chant_id_from_path(Path::new("data/GCH_001_dasdebeli.xml")).as_deref(),
            Some("001")
        );
        assert_eq!(chant_id_from_path(Path::new("nochant.xml")), None);
    }

    #[test]
    fn test_chant_needs_three_parts() {
        let score = Score {
            parts: vec![Part::default(), Part::default()],
        };
        assert!(matches!(
            Chant::from_score("001", score),
            Err(ScoreError::TooFewParts(2))
        ));

        let score = Score {
            parts: vec![Part::default(); 4],
        };
        let chant = Chant::from_score("001", score).unwrap();
        assert_eq!(chant.id, "001");
    }

    #[test]
    fn test_note_lyrics() {
        let note = Note::with_lyrics("A4".parse().unwrap(), &["ha", "17"]);
        assert_eq!(note.lyric(1), Some("17"));
        assert_eq!(note.lyric(2), None);
    }
}
