//! CLI output formatting.
//!
//! Every command formats into `Vec<String>` lines first and prints second,
//! so the formatting is testable without capturing stdout. Diagnostics go
//! through `tracing` on stderr; only these lines go to stdout.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! 001 dawn.jpg (4000x3000, rotate 0)
//!     full 2411520 bytes, preview 41877 bytes, info 44 bytes
//!     out/dawn.full.jpg
//!     out/dawn.preview.jpg
//!     out/dawn.info.json
//! 002 broken.jpg
//!     FAILED: Decode failed: Failed to read dimensions: ...
//!
//! Built 1, failed 1
//! ```
//!
//! ## Probe
//!
//! ```text
//! dawn.jpg
//!     Raw size: 3000x4000
//!     Orientation: 6 (rotate-90) → class 270 (code 3)
//!     Logical size: 4000x3000
//!     Preview: 384x512, sample factor 4
//!     Info: {"orientation":3,"width":4000,"height":3000}
//! ```

use crate::batch::{BatchEvent, BatchSummary, WrittenPart};
use crate::builder::BuildPlan;

/// Format a 1-based position as a zero-padded 3-digit string.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `full N bytes, preview N bytes, info N bytes`
fn part_sizes(parts: &[WrittenPart]) -> String {
    parts
        .iter()
        .map(|p| format!("{} {} bytes", p.kind.label(), p.len))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Build
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Built {
            index,
            input,
            info,
            parts,
        } => {
            let header = match info {
                Some(info) => format!(
                    "{} {} ({}x{}, rotate {})",
                    format_index(*index),
                    input,
                    info.width,
                    info.height,
                    info.orientation.degrees()
                ),
                None => format!("{} {}", format_index(*index), input),
            };
            let mut lines = vec![header, format!("{}{}", indent(1), part_sizes(parts))];
            lines.extend(
                parts
                    .iter()
                    .map(|p| format!("{}{}", indent(1), p.path.display())),
            );
            lines
        }
        BatchEvent::Failed {
            index,
            input,
            error,
        } => vec![
            format!("{} {}", format_index(*index), input),
            format!("{}FAILED: {}", indent(1), error),
        ],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    vec![
        String::new(),
        format!("Built {}, failed {}", summary.built, summary.failed),
    ]
}

/// Print batch summary to stdout.
pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Format what a build would do, without rendering anything.
pub fn format_probe_output(input: &str, plan: &BuildPlan, info_json: &str) -> Vec<String> {
    let pad = indent(1);
    vec![
        input.to_string(),
        format!("{pad}Raw size: {}x{}", plan.raw.width, plan.raw.height),
        format!(
            "{pad}Orientation: {} ({}) \u{2192} class {} (code {})",
            plan.orientation.value(),
            plan.orientation.name(),
            plan.class.degrees(),
            plan.class.code()
        ),
        format!("{pad}Logical size: {}x{}", plan.logical.0, plan.logical.1),
        format!(
            "{pad}Preview: {}x{}, sample factor {}",
            plan.preview.width, plan.preview.height, plan.preview.sample_factor
        ),
        format!("{pad}Info: {info_json}"),
    ]
}

/// Print probe output to stdout.
pub fn print_probe_output(input: &str, plan: &BuildPlan, info_json: &str) {
    for line in format_probe_output(input, plan, info_json) {
        println!("{}", line);
    }
}
