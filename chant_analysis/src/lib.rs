// Chant Mode Analysis
//
// Analyzes a corpus of three-voice Georgian chant transcriptions (MusicXML)
// and tabulates, per chant, the modes each voice and the whole texture use
// and where a fixed set of melodic patterns occur. Patterns are located by
// QNR, the running note number each transcription carries as a lyric.
//
// Architecture:
// - pitch.rs: Spelled pitches, pitch classes, and named intervals
// - score.rs: Score model (parts, measures, notes) and the three voice roles
// - musicxml.rs: Partwise MusicXML loading into the score model
// - mode.rs: Mode extraction (distinct pitch classes ordered from a center)
// - analysis.rs: Whole-voice modes and per-measure (mukhli) modes
// - patterns.rs: Interval-pair and tetrachord search
// - config.rs: Run configuration, loaded from JSON
// - corpus.rs: Two-pass driver over a directory of scores
// - tables.rs: CSV and JSON output
//
// Output is deterministic: the same input directory always produces the
// same bytes.

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod mode;
pub mod musicxml;
pub mod patterns;
pub mod pitch;
pub mod score;
pub mod tables;
