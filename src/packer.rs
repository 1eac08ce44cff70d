//! Tree mode: fan the per-file engine out over a worker pool and collect one
//! document's worth of results.
//!
//! Each file is an independent, stateless invocation, so the pool needs no
//! shared state, and results come back in scan order regardless of how the
//! pool schedules them. A file whose budget turns out infeasible is included
//! unmodified and reported in the summary; nothing here ever aborts the
//! whole run.

use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::assembler::TruncationReport;
use crate::engine::truncate_source;
use crate::error::{validate_line_limit, ShearError};
use crate::scanner::{scan_tree, FileEntry, ScanOptions};

/// One file's contribution to the pack.
#[derive(Debug)]
pub struct PackedFile {
    pub rel_path: String,
    pub text: String,
    pub report: TruncationReport,
}

#[derive(Debug, Serialize)]
pub struct InfeasibleFile {
    pub path: String,
    pub minimum_required: usize,
}

/// Aggregated run outcome for summary reporting.
#[derive(Debug, Default, Serialize)]
pub struct PackSummary {
    pub files_packed: usize,
    pub files_truncated: usize,
    pub total_lines: usize,
    pub kept_lines: usize,
    pub binary_skipped: usize,
    /// Files whose declarations alone exceeded the budget; included
    /// unmodified, listed here with the smallest limit that would work.
    pub infeasible: Vec<InfeasibleFile>,
}

#[derive(Debug, Clone)]
pub struct PackOptions {
    pub line_limit: Option<usize>,
    pub exclude_dir_names: Vec<String>,
    pub max_file_bytes: u64,
    pub progress: bool,
}

enum Outcome {
    Packed { file: PackedFile, input_lines: usize },
    Infeasible { file: PackedFile, minimum_required: usize },
    BinarySkipped,
    Unreadable,
}

/// Scan `root` and run the truncation engine over every candidate file.
///
/// A zero line limit is a configuration error and fails the run up front;
/// per-file problems never do.
pub fn pack_tree(root: &Path, opts: &PackOptions) -> Result<(Vec<PackedFile>, PackSummary)> {
    if let Some(limit) = opts.line_limit {
        validate_line_limit(limit)?;
    }

    let entries = scan_tree(&ScanOptions {
        root: root.to_path_buf(),
        max_file_bytes: opts.max_file_bytes,
        exclude_dir_names: opts.exclude_dir_names.clone(),
    })?;

    let bar = if opts.progress {
        let bar = ProgressBar::new(entries.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<Outcome> = entries
        .par_iter()
        .map(|entry| {
            let outcome = process_entry(entry, opts.line_limit);
            bar.inc(1);
            outcome
        })
        .collect();
    bar.finish_and_clear();

    let mut files = Vec::with_capacity(outcomes.len());
    let mut summary = PackSummary::default();

    for outcome in outcomes {
        match outcome {
            Outcome::Packed { file, input_lines } => {
                summary.files_packed += 1;
                if file.report.truncated {
                    summary.files_truncated += 1;
                }
                summary.total_lines += input_lines;
                summary.kept_lines += file.report.kept_lines;
                files.push(file);
            }
            Outcome::Infeasible {
                file,
                minimum_required,
            } => {
                summary.files_packed += 1;
                summary.total_lines += file.report.kept_lines;
                summary.kept_lines += file.report.kept_lines;
                summary.infeasible.push(InfeasibleFile {
                    path: file.rel_path.clone(),
                    minimum_required,
                });
                files.push(file);
            }
            Outcome::BinarySkipped => summary.binary_skipped += 1,
            Outcome::Unreadable => {}
        }
    }

    Ok((files, summary))
}

fn process_entry(entry: &FileEntry, line_limit: Option<usize>) -> Outcome {
    let raw = match std::fs::read(&entry.abs_path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("skipping unreadable {}: {e}", entry.abs_path.display());
            return Outcome::Unreadable;
        }
    };
    if raw.contains(&0u8) {
        debug!("skipping binary file {}", entry.rel_path.display());
        return Outcome::BinarySkipped;
    }

    let text = String::from_utf8(raw)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    let rel_path = entry.rel_path.to_string_lossy().replace('\\', "/");
    let input_lines = text.lines().count();

    match truncate_source(&entry.rel_path, &text, None, line_limit) {
        Ok(result) => Outcome::Packed {
            file: PackedFile {
                rel_path,
                text: result.text,
                report: result.report,
            },
            input_lines,
        },
        Err(ShearError::LineLimitTooSmall {
            minimum_required, ..
        }) => {
            warn!(
                "{rel_path}: line limit infeasible, needs at least {minimum_required}; \
                 including unmodified"
            );
            Outcome::Infeasible {
                file: PackedFile {
                    rel_path,
                    text,
                    report: TruncationReport::passthrough(line_limit, input_lines),
                },
                minimum_required,
            }
        }
        Err(e) => {
            // InvalidLineLimit is caught before the fan-out; anything else
            // here means a bug, but one file must not sink the run.
            warn!("{rel_path}: {e}; including unmodified");
            Outcome::Packed {
                file: PackedFile {
                    rel_path,
                    text,
                    report: TruncationReport::passthrough(line_limit, input_lines),
                },
                input_lines,
            }
        }
    }
}
