//! Output reconstruction: original lines in, truncated text plus a report out.
//!
//! Reserved (header/footer) lines and selected function bodies are emitted
//! verbatim in original order. An unselected function collapses to a single
//! marker line. Unclassified runs pass through while slack remains and are
//! otherwise excluded wholesale behind one marker; they are never cut
//! mid-statement. Marker lines do not count toward the budget.

use serde::Serialize;

use crate::allocator::SelectionPlan;

/// Sigil starting every elision marker; cannot be confused with source.
pub const ELISION_SIGIL: &str = "⋮----";

/// Section tag for a surviving line. Reporting only; identity stays with the
/// line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSection {
    Header,
    Core,
    Footer,
}

/// Kept-line counts per section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionBreakdown {
    pub header: usize,
    pub core: usize,
    pub footer: usize,
}

impl SectionBreakdown {
    fn count(&mut self, section: LineSection, lines: usize) {
        match section {
            LineSection::Header => self.header += lines,
            LineSection::Core => self.core += lines,
            LineSection::Footer => self.footer += lines,
        }
    }

    pub fn total(&self) -> usize {
        self.header + self.core + self.footer
    }
}

/// The externally visible artifact of one allocation decision.
#[derive(Debug, Clone, Serialize)]
pub struct TruncationReport {
    pub truncated: bool,
    pub line_limit: Option<usize>,
    /// Real source lines emitted; markers excluded.
    pub kept_lines: usize,
    pub sections: SectionBreakdown,
    pub elided_functions: Vec<String>,
}

impl TruncationReport {
    /// Report for text that went through unchanged; unclassified, so every
    /// line counts as core.
    pub fn passthrough(line_limit: Option<usize>, kept_lines: usize) -> Self {
        Self {
            truncated: false,
            line_limit,
            kept_lines,
            sections: SectionBreakdown {
                core: kept_lines,
                ..SectionBreakdown::default()
            },
            elided_functions: Vec::new(),
        }
    }
}

fn function_marker(name: &str, count: usize) -> String {
    format!("{ELISION_SIGIL} {name} ({count} lines elided)")
}

fn gap_marker(count: usize) -> String {
    format!("{ELISION_SIGIL} ({count} lines elided)")
}

#[derive(Clone, Copy, PartialEq)]
enum Role {
    Header,
    Footer,
    Function(usize),
    Gap,
}

/// Rebuild the file from the allocator's plan.
pub fn assemble(
    lines: &[&str],
    plan: &SelectionPlan,
    line_limit: usize,
) -> (String, TruncationReport) {
    let total = lines.len();

    let mut roles = vec![Role::Gap; total];
    for &row in &plan.header_lines {
        if row < total {
            roles[row] = Role::Header;
        }
    }
    for &row in &plan.footer_lines {
        if row < total {
            roles[row] = Role::Footer;
        }
    }
    for (idx, sf) in plan.functions.iter().enumerate() {
        for row in sf.analysis.start_line..=sf.analysis.end_line.min(total.saturating_sub(1)) {
            roles[row] = Role::Function(idx);
        }
    }

    let mut slack = line_limit.saturating_sub(plan.committed_lines());
    let mut out: Vec<String> = Vec::with_capacity(total.min(line_limit + 8));
    let mut sections = SectionBreakdown::default();
    let mut elided: Vec<String> = Vec::new();

    let mut i = 0;
    while i < total {
        match roles[i] {
            Role::Header => {
                out.push(lines[i].to_string());
                sections.count(LineSection::Header, 1);
                i += 1;
            }
            Role::Footer => {
                out.push(lines[i].to_string());
                sections.count(LineSection::Footer, 1);
                i += 1;
            }
            Role::Function(idx) => {
                let sf = &plan.functions[idx];
                let end = sf.analysis.end_line.min(total - 1);
                if sf.selected {
                    for row in i..=end {
                        out.push(lines[row].to_string());
                    }
                    sections.count(LineSection::Core, end - i + 1);
                } else {
                    out.push(function_marker(&sf.analysis.name, sf.analysis.line_count));
                    elided.push(sf.analysis.name.clone());
                }
                i = end + 1;
            }
            Role::Gap => {
                let mut j = i;
                while j < total && roles[j] == Role::Gap {
                    j += 1;
                }
                let run = j - i;
                if run <= slack {
                    for row in i..j {
                        out.push(lines[row].to_string());
                    }
                    sections.count(LineSection::Core, run);
                    slack -= run;
                } else {
                    out.push(gap_marker(run));
                }
                i = j;
            }
        }
    }

    let mut text = out.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }

    let kept = sections.total();
    let report = TruncationReport {
        truncated: kept < total,
        line_limit: Some(line_limit),
        kept_lines: kept,
        sections,
        elided_functions: elided,
    };

    (text, report)
}
