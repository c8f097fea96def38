// Per-chant mode analysis: whole-voice modes and per-measure (mukhli) modes.
//
// Full modes: each voice's mode over all its notes, centered on that voice's
// last note, plus a combined mode over all three voices centered on the
// bass's last note.
//
// Mukhli modes: the top voice's measure count drives a walk over measures
// 1..=N. Each voice is looked up by measure number independently, so a voice
// missing a measure only loses its own entry for that measure. Within a
// measure, a voice's center is its last note, except that an upper voice
// whose last note sits a perfect fifth above the bass's last note takes the
// bass note as its center. The combined measure mode pools all voices and
// centers on the bass where it sings, else on the last pooled note.
//
// Problems found along the way (missing measures, empty measures) go into a
// `Diagnostics` list and never abort the chant. A chant with no measures at
// all is reported by the driver, which knows the file name.

use crate::mode::extract_mode;
use crate::pitch::Interval;
use crate::score::{Chant, Note, VoiceRole};
use serde::{Deserialize, Serialize};

/// Advisory messages collected while analyzing a chant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Whole-chant modes. `None` where a voice has no notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullModes {
    pub top: Option<String>,
    pub middle: Option<String>,
    pub bass: Option<String>,
    pub combined: Option<String>,
}

impl FullModes {
    pub fn voice(&self, role: VoiceRole) -> Option<&str> {
        match role {
            VoiceRole::Top => self.top.as_deref(),
            VoiceRole::Middle => self.middle.as_deref(),
            VoiceRole::Bass => self.bass.as_deref(),
        }
    }

    fn set_voice(&mut self, role: VoiceRole, mode: String) {
        match role {
            VoiceRole::Top => self.top = Some(mode),
            VoiceRole::Middle => self.middle = Some(mode),
            VoiceRole::Bass => self.bass = Some(mode),
        }
    }
}

/// Modes of one measure. An all-`None` value pads chants shorter than the
/// longest chant in the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureModes {
    pub combined: Option<String>,
    pub top: Option<String>,
    pub middle: Option<String>,
    pub bass: Option<String>,
}

impl MeasureModes {
    pub fn voice(&self, role: VoiceRole) -> Option<&str> {
        match role {
            VoiceRole::Top => self.top.as_deref(),
            VoiceRole::Middle => self.middle.as_deref(),
            VoiceRole::Bass => self.bass.as_deref(),
        }
    }

    fn set_voice(&mut self, role: VoiceRole, mode: String) {
        match role {
            VoiceRole::Top => self.top = Some(mode),
            VoiceRole::Middle => self.middle = Some(mode),
            VoiceRole::Bass => self.bass = Some(mode),
        }
    }
}

/// Modes of each voice and of all voices together.
pub fn full_modes(chant: &Chant) -> FullModes {
    let mut modes = FullModes::default();
    let mut pooled: Vec<&Note> = Vec::new();

    for role in VoiceRole::ALL {
        let notes = chant.voice(role).notes();
        if let Some(&last) = notes.last() {
            modes.set_voice(role, extract_mode(notes.iter().copied(), last));
        }
        pooled.extend(notes);
    }

    if let Some(bass_final) = chant.voice(VoiceRole::Bass).notes().last().copied() {
        modes.combined = Some(extract_mode(pooled.iter().copied(), bass_final));
    }
    modes
}

/// Center for an upper voice's measure: its last note, unless that note is a
/// perfect fifth from the bass's last note, in which case the bass note.
pub fn resolve_center<'a>(candidate: &'a Note, bass_final: Option<&'a Note>) -> &'a Note {
    match bass_final {
        Some(bass) if Interval::between(&bass.pitch, &candidate.pitch).is_perfect_fifth() => bass,
        _ => candidate,
    }
}

/// Number of measures the mukhli walk covers for this chant.
pub fn mukhli_count(chant: &Chant) -> usize {
    chant.voice(VoiceRole::Top).measure_count()
}

/// Modes of every measure 1..=N, N taken from the top voice. Empty when the
/// top voice has no numbered measures; the caller knows the file and
/// reports that case.
pub fn mukhli_modes(chant: &Chant, diagnostics: &mut Diagnostics) -> Vec<MeasureModes> {
    let count = mukhli_count(chant);
    let mut result = Vec::with_capacity(count);
    for number in 1..=count as u32 {
        let bass_notes: Vec<&Note> = chant
            .voice(VoiceRole::Bass)
            .measure(number)
            .map(|m| m.notes.iter().collect())
            .unwrap_or_default();
        let bass_final = bass_notes.last().copied();

        let mut modes = MeasureModes::default();
        let mut pooled: Vec<&Note> = Vec::new();

        for role in VoiceRole::ALL {
            let Some(measure) = chant.voice(role).measure(number) else {
                diagnostics.warn(format!("No measure {number} found in {role} voice"));
                continue;
            };
            pooled.extend(measure.notes.iter());

            let Some(last) = measure.notes.last() else {
                diagnostics.warn(format!("No notes found in measure {number} of {role} voice"));
                continue;
            };
            let center = if role == VoiceRole::Bass {
                last
            } else {
                resolve_center(last, bass_final)
            };
            modes.set_voice(role, extract_mode(&measure.notes, center));
        }

        if let Some(&last_pooled) = pooled.last() {
            let center = bass_final.unwrap_or(last_pooled);
            modes.combined = Some(extract_mode(pooled.iter().copied(), center));
        }
        result.push(modes);
    }
    result
}
