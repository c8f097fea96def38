// MusicXML score loading.
//
// Reads partwise MusicXML (`<score-partwise>`) into the `Score` model. Only
// what the analysis consumes is extracted: parts in document order, their
// measures with the printed measure number, and for each note its spelled
// pitch and lyric lines.
//
// Note selection rules:
// - rests and unpitched notes are skipped;
// - chords are skipped entirely (a note followed by `<chord/>` notes forms
//   one chord, and none of its members count as melodic notes);
// - grace notes and tied continuations are kept as ordinary notes.
//
// Lyrics are kept in document order with surrounding whitespace trimmed.
// A `<lyric>` with no text (e.g. a bare extender) is dropped, so the lyrics
// after it move up a line.
//
// DTDs are allowed because exported MusicXML nearly always carries a
// DOCTYPE declaration.

use crate::pitch::{Pitch, PitchError, Step};
use crate::score::{Chant, Measure, Note, Part, Score, ScoreError, chant_id_from_path};
use roxmltree::{Document, Node, ParsingOptions};
use std::path::Path;

/// Parse a MusicXML document from text.
pub fn parse_score(text: &str) -> Result<Score, ScoreError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options).map_err(|e| ScoreError::Xml(e.to_string()))?;
    let root = doc.root_element();
    let root_name = root.tag_name().name();
    if root_name != "score-partwise" {
        return Err(ScoreError::NotPartwise(root_name.to_string()));
    }

    let parts = children_named(root, "part")
        .map(parse_part)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Score { parts })
}

/// Read and parse a MusicXML file.
pub fn load_score(path: &Path) -> Result<Score, ScoreError> {
    let text = std::fs::read_to_string(path)?;
    parse_score(&text)
}

/// Load a chant file: chant number from the file name, voices from the score.
pub fn load_chant(path: &Path) -> Result<Chant, ScoreError> {
    let id = chant_id_from_path(path).ok_or_else(|| ScoreError::NoChantId(path.to_path_buf()))?;
    let score = load_score(path)?;
    Chant::from_score(id, score)
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &'static str) -> Option<&'a str> {
    children_named(node, name).next().and_then(|n| n.text())
}

fn has_child(node: Node<'_, '_>, name: &'static str) -> bool {
    children_named(node, name).next().is_some()
}

fn parse_part(node: Node<'_, '_>) -> Result<Part, ScoreError> {
    let measures = children_named(node, "measure")
        .map(parse_measure)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Part {
        id: node.attribute("id").unwrap_or_default().to_string(),
        measures,
    })
}

fn parse_measure(node: Node<'_, '_>) -> Result<Measure, ScoreError> {
    let number = node.attribute("number").unwrap_or_default().to_string();

    // (is chord continuation, pitched note if any) for every <note>.
    let mut raw: Vec<(bool, Option<Note>)> = Vec::new();
    for note_node in children_named(node, "note") {
        let in_chord = has_child(note_node, "chord");
        let note = parse_note(note_node).map_err(|source| ScoreError::Pitch {
            measure: number.clone(),
            source,
        })?;
        raw.push((in_chord, note));
    }

    let chord_flags: Vec<bool> = raw.iter().map(|(in_chord, _)| *in_chord).collect();
    let notes = raw
        .into_iter()
        .enumerate()
        .filter(|(i, (in_chord, _))| {
            let starts_chord = chord_flags.get(i + 1).copied().unwrap_or(false);
            !in_chord && !starts_chord
        })
        .filter_map(|(_, (_, note))| note)
        .collect();

    Ok(Measure { number, notes })
}

/// A pitched note, or `None` for rests and unpitched notes.
fn parse_note(node: Node<'_, '_>) -> Result<Option<Note>, PitchError> {
    if has_child(node, "rest") {
        return Ok(None);
    }
    let Some(pitch_node) = children_named(node, "pitch").next() else {
        return Ok(None);
    };
    let pitch = parse_pitch(pitch_node)?;

    let lyrics = children_named(node, "lyric")
        .map(|lyric| {
            children_named(lyric, "text")
                .filter_map(|t| t.text())
                .collect::<String>()
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    Ok(Some(Note { pitch, lyrics }))
}

fn parse_pitch(node: Node<'_, '_>) -> Result<Pitch, PitchError> {
    let step_text = child_text(node, "step").unwrap_or_default().trim();
    let mut letters = step_text.chars();
    let step = match (letters.next(), letters.next()) {
        (Some(c), None) => Step::from_letter(c),
        _ => None,
    }
    .ok_or_else(|| PitchError::UnknownStep(step_text.to_string()))?;

    let alter = match child_text(node, "alter").map(str::trim) {
        None | Some("") => 0,
        Some(text) => {
            let value: f64 = text
                .parse()
                .map_err(|_| PitchError::NonIntegerAlter(text.to_string()))?;
            if value.fract() != 0.0 {
                return Err(PitchError::NonIntegerAlter(text.to_string()));
            }
            value as i32
        }
    };

    let octave_text = child_text(node, "octave").unwrap_or_default().trim();
    let octave: i8 = octave_text
        .parse()
        .map_err(|_| PitchError::BadOctave(octave_text.to_string()))?;

    Pitch::new(step, alter, octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#;

    fn note(step: &str, alter: Option<i32>, octave: i32, lyrics: &[&str]) -> String {
        let alter = alter.map(|a| format!("<alter>{a}</alter>")).unwrap_or_default();
        let lyrics: String = lyrics
            .iter()
            .enumerate()
            .map(|(i, l)| format!("<lyric number=\"{}\"><text>{l}</text></lyric>", i + 1))
            .collect();
        format!(
            "<note><pitch><step>{step}</step>{alter}<octave>{octave}</octave></pitch><duration>1</duration>{lyrics}</note>"
        )
    }

    fn doc(parts: &[&str]) -> String {
        let body: String = parts
            .iter()
            .enumerate()
            .map(|(i, p)| format!("<part id=\"P{}\">{p}</part>", i + 1))
            .collect();
        format!("{HEADER}<score-partwise version=\"3.1\">{body}</score-partwise>")
    }

    #[test]
    fn test_parse_pitches_and_lyrics() {
        let measure = format!(
            "<measure number=\"1\">{}{}<note><rest/><duration>1</duration></note></measure>",
            note("B", Some(-1), 3, &["a", "1"]),
            note("F", Some(1), 4, &["men", "2"]),
        );
        let score = parse_score(&doc(&[&measure])).unwrap();
        assert_eq!(score.parts.len(), 1);
        assert_eq!(score.parts[0].id, "P1");

        let notes = &score.parts[0].measures[0].notes;
        assert_eq!(notes.len(), 2, "rest should be skipped");
        assert_eq!(notes[0].pitch.to_string(), "B-3");
        assert_eq!(notes[1].pitch.to_string(), "F#4");
        assert_eq!(notes[1].lyric(0), Some("men"));
        assert_eq!(notes[1].lyric(1), Some("2"));
    }

    #[test]
    fn test_chords_are_dropped() {
        let chord_member = note("E", None, 4, &[]).replacen("<note>", "<note><chord/>", 1);
        let measure = format!(
            "<measure number=\"1\">{}{}{}{}</measure>",
            note("D", None, 4, &[]),
            note("C", None, 4, &[]),
            chord_member,
            note("G", None, 4, &[]),
        );
        let score = parse_score(&doc(&[&measure])).unwrap();
        let names: Vec<String> = score.parts[0].measures[0]
            .notes
            .iter()
            .map(|n| n.pitch.to_string())
            .collect();
        assert_eq!(names, vec!["D4", "G4"]);
    }

    #[test]
    fn test_measure_numbers_kept_verbatim() {
        let part = format!(
            "<measure number=\"0\">{}</measure><measure number=\"1\">{}</measure><measure number=\"2a\">{}</measure>",
            note("C", None, 4, &[]),
            note("D", None, 4, &[]),
            note("E", None, 4, &[]),
        );
        let score = parse_score(&doc(&[&part])).unwrap();
        let part = &score.parts[0];
        assert_eq!(part.measures[2].number, "2a");
        assert_eq!(part.measure_count(), 2);
        assert_eq!(part.measure(2).unwrap().notes[0].pitch.name(), "E");
    }

    #[test]
    fn test_microtonal_alter_rejected() {
        let measure = format!("<measure number=\"3\">{}</measure>", note("C", None, 4, &[]))
            .replace("<octave>", "<alter>0.5</alter><octave>");
        match parse_score(&doc(&[&measure])) {
            Err(ScoreError::Pitch { measure, source }) => {
                assert_eq!(measure, "3");
                assert!(matches!(source, PitchError::NonIntegerAlter(_)));
            }
            other => panic!("expected pitch error, got {other:?}"),
        }
    }

    #[test]
    fn test_timewise_rejected() {
        let text = "<score-timewise><measure number=\"1\"/></score-timewise>";
        assert!(matches!(parse_score(text), Err(ScoreError::NotPartwise(_))));
    }

    #[test]
    fn test_malformed_xml_rejected() {
        assert!(matches!(
            parse_score("<score-partwise><part>"),
            Err(ScoreError::Xml(_))
        ));
    }

    #[test]
    fn test_textless_lyrics_dropped_and_text_trimmed() {
        let measure = format!(
            "<measure number=\"1\">{}{}</measure>",
            note("A", None, 3, &[]),
            note("B", None, 3, &["mi", " 10 "]),
        )
        .replacen(
            "</note>",
            "<lyric number=\"1\"><extend/></lyric><lyric number=\"2\"><text>9</text></lyric></note>",
            1,
        );
        let score = parse_score(&doc(&[&measure])).unwrap();
        let notes = &score.parts[0].measures[0].notes;
        // The extender takes no line, so "9" is the first lyric.
        assert_eq!(notes[0].lyrics, vec!["9".to_string()]);
        assert_eq!(notes[0].lyric(1), None);
        assert_eq!(notes[1].lyric(1), Some("10"));
    }
}
