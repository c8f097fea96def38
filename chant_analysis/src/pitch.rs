// Spelled pitches and named intervals.
//
// Chant transcriptions are analyzed by spelling, not just by MIDI number:
// a mode string lists pitch-class names ("B-", "F#") and melodic patterns
// are matched by interval name ("m3" is not "A2" even though both span three
// semitones). A `Pitch` therefore keeps its letter, alteration, and octave,
// and an `Interval` carries both its diatonic quality/number and its signed
// semitone size.
//
// Naming follows the usual analysis convention: sharps are written `#`,
// flats `-`, and interval names are undirected ("P5" both ways) while
// `Interval::semitones` keeps direction.
//
// Used by musicxml.rs (pitch construction), mode.rs (pitch-class ordering),
// analysis.rs (P5 center rule), and patterns.rs (pair/tetrachord matching).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest alteration accepted in either direction (quadruple sharp/flat).
pub const MAX_ALTER: i8 = 4;

/// Diatonic step letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Position within the octave counted in letters (C = 0 .. B = 6).
    pub fn diatonic_index(self) -> i32 {
        self as i32
    }

    /// Semitones above C of the natural step.
    pub fn semitones(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    pub fn from_letter(c: char) -> Option<Step> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }
}

/// Why a pitch could not be built or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PitchError {
    UnknownStep(String),
    AlterOutOfRange(i32),
    NonIntegerAlter(String),
    BadOctave(String),
    Empty,
}

impl fmt::Display for PitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PitchError::UnknownStep(s) => write!(f, "unknown pitch step '{s}'"),
            PitchError::AlterOutOfRange(a) => {
                write!(f, "alteration {a} outside -{MAX_ALTER}..={MAX_ALTER}")
            }
            PitchError::NonIntegerAlter(s) => write!(f, "microtonal alteration '{s}' not supported"),
            PitchError::BadOctave(s) => write!(f, "invalid octave '{s}'"),
            PitchError::Empty => write!(f, "empty pitch name"),
        }
    }
}

impl std::error::Error for PitchError {}

/// A spelled pitch: letter, alteration (sharps positive), and octave.
///
/// Octaves are scientific: C4 is middle C, `ps()` of C4 is 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    pub alter: i8,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alter: i32, octave: i8) -> Result<Self, PitchError> {
        if alter.abs() > MAX_ALTER as i32 {
            return Err(PitchError::AlterOutOfRange(alter));
        }
        Ok(Pitch {
            step,
            alter: alter as i8,
            octave,
        })
    }

    /// Pitch-class name without octave: "C", "F#", "B-", "E--".
    pub fn name(&self) -> String {
        let mut name = String::with_capacity(1 + self.alter.unsigned_abs() as usize);
        name.push(self.step.letter());
        let mark = if self.alter > 0 { '#' } else { '-' };
        for _ in 0..self.alter.unsigned_abs() {
            name.push(mark);
        }
        name
    }

    /// Continuous semitone position (C4 = 60).
    pub fn ps(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.step.semitones() + self.alter as i32
    }

    /// Pitch class 0-11 (C = 0). Enharmonic spellings share a class.
    pub fn pitch_class(&self) -> u8 {
        self.ps().rem_euclid(12) as u8
    }

    /// Absolute diatonic position in letters, used for generic interval size.
    pub fn diatonic(&self) -> i32 {
        self.octave as i32 * 7 + self.step.diatonic_index()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    /// Parse "C4", "F#3", "B-4", "Bb4", "E--5". A missing octave means 4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let first = chars.next().ok_or(PitchError::Empty)?;
        let step = Step::from_letter(first).ok_or_else(|| PitchError::UnknownStep(s.to_string()))?;

        let rest = chars.as_str();
        let accidental_len = rest
            .find(|c: char| !matches!(c, '#' | '-' | 'b'))
            .unwrap_or(rest.len());
        let (accidentals, octave_text) = rest.split_at(accidental_len);

        // '-' directly after the letter is always a flat, so negative
        // octaves cannot be written here.
        let mut alter = 0i32;
        for c in accidentals.chars() {
            alter += if c == '#' { 1 } else { -1 };
        }

        let octave = if octave_text.is_empty() {
            4
        } else {
            octave_text
                .parse::<i8>()
                .map_err(|_| PitchError::BadOctave(octave_text.to_string()))?
        };

        Pitch::new(step, alter, octave)
    }
}

/// Interval quality. Augmented/diminished carry their multiplicity
/// (2 = doubly augmented).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Perfect,
    Major,
    Minor,
    Augmented(u8),
    Diminished(u8),
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Quality::Perfect => f.write_str("P"),
            Quality::Major => f.write_str("M"),
            Quality::Minor => f.write_str("m"),
            Quality::Augmented(n) => f.write_str(&"A".repeat(n as usize)),
            Quality::Diminished(n) => f.write_str(&"d".repeat(n as usize)),
        }
    }
}

/// The interval from one pitch to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Directed size: end.ps() - start.ps().
    pub semitones: i32,
    /// Undirected generic number (1 = unison, 5 = fifth, 8 = octave, 12 = twelfth).
    pub generic: u32,
    pub quality: Quality,
}

impl Interval {
    pub fn between(start: &Pitch, end: &Pitch) -> Self {
        let semitones = end.ps() - start.ps();
        let steps = end.diatonic() - start.diatonic();

        // Orient upward so quality is judged on the ascending form.
        let (steps, span) = if steps < 0 || (steps == 0 && semitones < 0) {
            (-steps, -semitones)
        } else {
            (steps, semitones)
        };

        let octaves = steps / 7;
        let simple = steps % 7; // 0 = unison .. 6 = seventh
        let simple_span = span - 12 * octaves;

        let quality = match simple {
            0 | 3 | 4 => {
                let reference = [0, 0, 0, 5, 7][simple as usize];
                let delta = simple_span - reference;
                match delta {
                    0 => Quality::Perfect,
                    d if d > 0 => Quality::Augmented(d as u8),
                    d => Quality::Diminished((-d) as u8),
                }
            }
            _ => {
                let reference = [0, 2, 4, 0, 0, 9, 11][simple as usize];
                let delta = simple_span - reference;
                match delta {
                    0 => Quality::Major,
                    -1 => Quality::Minor,
                    d if d > 0 => Quality::Augmented(d as u8),
                    d => Quality::Diminished((-d - 1) as u8),
                }
            }
        };

        Interval {
            semitones,
            generic: steps as u32 + 1,
            quality,
        }
    }

    /// Undirected name, e.g. "P5", "m3", "A2", "P12".
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// A simple perfect fifth in either direction ("P5"; compound fifths do not count).
    pub fn is_perfect_fifth(&self) -> bool {
        self.quality == Quality::Perfect && self.generic == 5
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quality, self.generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    fn name_of(a: &str, b: &str) -> String {
        Interval::between(&p(a), &p(b)).name()
    }

    #[test]
    fn test_parse_and_names() {
        assert_eq!(p("C4").name(), "C");
        assert_eq!(p("F#3").name(), "F#");
        assert_eq!(p("B-4").name(), "B-");
        assert_eq!(p("Bb4").name(), "B-"); // 'b' accepted as a flat
        assert_eq!(p("E--5").name(), "E--");
        assert_eq!(p("G").octave, 4); // default octave
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("H4".parse::<Pitch>(), Err(PitchError::UnknownStep(_))));
        assert!(matches!("".parse::<Pitch>(), Err(PitchError::Empty)));
        assert!(matches!("Cx".parse::<Pitch>(), Err(PitchError::BadOctave(_))));
        assert!(matches!(
            "C#####4".parse::<Pitch>(),
            Err(PitchError::AlterOutOfRange(5))
        ));
    }

    #[test]
    fn test_ps_and_pitch_class() {
        assert_eq!(p("C4").ps(), 60);
        assert_eq!(p("A4").ps(), 69);
        assert_eq!(p("C-4").ps(), 59);
        assert_eq!(p("C-4").pitch_class(), 11); // enharmonic with B
        assert_eq!(p("B#3").pitch_class(), 0);
        assert_eq!(p("C2").ps(), 36);
    }

    #[test]
    fn test_simple_interval_names() {
        assert_eq!(name_of("C4", "G4"), "P5");
        assert_eq!(name_of("C4", "F4"), "P4");
        assert_eq!(name_of("C4", "E4"), "M3");
        assert_eq!(name_of("D4", "F4"), "m3");
        assert_eq!(name_of("E4", "F4"), "m2");
        assert_eq!(name_of("C4", "C4"), "P1");
        assert_eq!(name_of("C4", "C5"), "P8");
    }

    #[test]
    fn test_altered_interval_names() {
        assert_eq!(name_of("F4", "B4"), "A4"); // tritone as augmented fourth
        assert_eq!(name_of("B3", "F4"), "d5");
        assert_eq!(name_of("E-4", "F#4"), "A2");
        assert_eq!(name_of("C#4", "E-4"), "d3");
        assert_eq!(name_of("B-3", "F#4"), "A5");
        assert_eq!(name_of("C4", "F##4"), "AA4");
    }

    #[test]
    fn test_augmented_second_is_not_minor_third() {
        // Both span three semitones; only the spelling differs.
        let a2 = Interval::between(&p("E-4"), &p("F#4"));
        let m3 = Interval::between(&p("E-4"), &p("G-4"));
        assert_eq!(a2.semitones, m3.semitones);
        assert_ne!(a2.name(), m3.name());
        assert_eq!(m3.name(), "m3");
    }

    #[test]
    fn test_direction() {
        let down = Interval::between(&p("G4"), &p("C4"));
        assert_eq!(down.name(), "P5");
        assert_eq!(down.semitones, -7);
        assert!(down.is_perfect_fifth());
    }

    #[test]
    fn test_compound_fifth_is_not_p5() {
        let twelfth = Interval::between(&p("C3"), &p("G4"));
        assert_eq!(twelfth.name(), "P12");
        assert!(!twelfth.is_perfect_fifth());
        assert_eq!(name_of("C4", "E5"), "M10");
    }

    #[test]
    fn test_enharmonic_unison_and_diminished_second() {
        assert_eq!(name_of("C4", "C#4"), "A1");
        assert_eq!(name_of("B#3", "C4"), "d2");
    }
}
