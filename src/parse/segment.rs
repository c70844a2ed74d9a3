//! Instruction segmentation.
//!
//! Takes the raw instruction block located by the field extractor and turns
//! it into an ordered sequence of [`Instruction`] values, telling section
//! headers apart from steps, merging continuation lines, and trimming the
//! recipe metadata models sometimes append after the last real step.

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::Instruction;

/// Phrase the generation prompt instructs the model to emit when it cannot
/// find the requested content. A block consisting of one such line becomes
/// a single error-flagged step so the UI can render an empty state instead
/// of a fake step.
pub const NOT_DETECTED_MARKER: &str = "could not be detected";

lazy_static! {
    // A line that is nothing but metadata - model leakage, not a step
    static ref PURE_METADATA_LINE: Regex =
        Regex::new(r"(?i)^(?:servings|cooking time|difficulty):[ \t]*\w+$").unwrap();
    // First occurrence of a metadata label; everything from here on is
    // trailing leakage
    static ref METADATA_LABEL: Regex = Regex::new(
        r"(?i)\**[ \t]*(?:cooking time|cook time|total time|servings|serves|yield|difficulty)[ \t]*\**[ \t]*:"
    )
    .unwrap();
    static ref NUMBERED_LINE: Regex = Regex::new(r"^[ \t]*(\d+)[.)][ \t]+(.*)$").unwrap();
}

/// Segment a raw instruction block into headers and steps.
///
/// Step numbers are taken verbatim from the text; out-of-order or skipped
/// numbers pass through untouched. An empty block yields an empty sequence
/// (the error sentinel is reserved for an explicit "not detected" line).
pub fn segment(block: &str) -> Vec<Instruction> {
    let trimmed = block.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    // A lone "not detected" message is the model saying there is nothing
    // here; surface it as a distinct error step
    if !trimmed.contains('\n') && trimmed.to_lowercase().contains(NOT_DETECTED_MARKER) {
        return vec![Instruction::error_step(trimmed)];
    }

    let filtered: Vec<&str> = trimmed
        .lines()
        .filter(|line| !PURE_METADATA_LINE.is_match(line.trim()))
        .collect();
    let mut body = filtered.join("\n");

    // Cut trailing metadata the model appended after the last step
    if let Some(label) = METADATA_LABEL.find(&body) {
        body.truncate(label.start());
    }

    let clearly_numbered = body
        .lines()
        .filter(|line| NUMBERED_LINE.is_match(line))
        .count()
        >= 2;

    let mut instructions = if clearly_numbered {
        segment_numbered(&body)
    } else {
        segment_freeform(&body)
    };

    trim_serving_steps(&mut instructions);
    instructions
}

fn segment_numbered(body: &str) -> Vec<Instruction> {
    let mut instructions: Vec<Instruction> = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(captures) = NUMBERED_LINE.captures(line) {
            instructions.push(Instruction::step(
                captures[2].trim(),
                captures[1].parse().ok(),
            ));
        } else if let Some(Instruction::Step { content, .. }) = instructions.last_mut() {
            // Continuation of the previous step
            content.push(' ');
            content.push_str(line);
        } else {
            instructions.push(Instruction::step(line, None));
        }
    }
    instructions
}

fn segment_freeform(body: &str) -> Vec<Instruction> {
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut buffer = String::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush_step(&mut buffer, &mut instructions);
            continue;
        }
        if is_header_line(line) {
            flush_step(&mut buffer, &mut instructions);
            instructions.push(Instruction::header(line.trim_end_matches(':').trim()));
            continue;
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(line);
    }
    flush_step(&mut buffer, &mut instructions);
    instructions
}

/// A short line ending in ":" that does not start with a digit reads as a
/// section header ("For the sauce:"), not a step.
fn is_header_line(line: &str) -> bool {
    line.chars().count() < 40
        && line.ends_with(':')
        && !line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn flush_step(buffer: &mut String, instructions: &mut Vec<Instruction>) {
    if buffer.is_empty() {
        return;
    }
    // A buffered paragraph can still carry its own number ("1. Mix.")
    // when the block as a whole was not clearly numbered
    if let Some(captures) = NUMBERED_LINE.captures(buffer) {
        instructions.push(Instruction::step(
            captures[2].trim(),
            captures[1].parse().ok(),
        ));
    } else {
        instructions.push(Instruction::step(buffer.trim(), None));
    }
    buffer.clear();
}

/// Models sometimes attach metadata to the final "serve" step instead of a
/// separate trailing block; re-apply the metadata cut inside such steps.
fn trim_serving_steps(instructions: &mut [Instruction]) {
    for instruction in instructions {
        if let Instruction::Step { content, .. } = instruction {
            let lower = content.to_lowercase();
            if lower.starts_with("serve") || lower.starts_with("serving") {
                if let Some(label) = METADATA_LABEL.find(content) {
                    content.truncate(label.start());
                    let trimmed = content.trim().to_string();
                    *content = trimmed;
                }
            }
        }
    }
}
