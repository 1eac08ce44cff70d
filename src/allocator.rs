//! Budget allocation: decide which function bodies survive a line limit.
//!
//! Greedy by descending complexity rather than optimal knapsack: budgets are
//! small relative to function counts, runs must be reproducible, and ties
//! have to resolve predictably. Analyzer output is consumed by value and
//! comes back paired with decisions; nothing is mutated in place.

use std::collections::BTreeSet;

use crate::analyzer::FunctionAnalysis;
use crate::error::{Result, ShearError};

/// One function with its final keep/drop decision.
#[derive(Debug, Clone)]
pub struct SelectedFunction {
    pub analysis: FunctionAnalysis,
    pub selected: bool,
}

/// The allocator's verdict for one file, in original file order.
#[derive(Debug)]
pub struct SelectionPlan {
    pub header_lines: BTreeSet<usize>,
    pub footer_lines: BTreeSet<usize>,
    pub functions: Vec<SelectedFunction>,
}

impl SelectionPlan {
    /// Lines committed to the output: reserved declarations plus every
    /// selected body. Gap lines spend whatever is left.
    pub fn committed_lines(&self) -> usize {
        let selected: usize = self
            .functions
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.analysis.line_count)
            .sum();
        self.header_lines.len() + self.footer_lines.len() + selected
    }
}

/// Decide which functions fit within `budget` after header and footer lines
/// are reserved.
///
/// Fails fast when the reservation alone reaches the budget, reporting the
/// smallest limit that would work.
pub fn allocate(
    header_lines: BTreeSet<usize>,
    footer_lines: BTreeSet<usize>,
    functions: Vec<FunctionAnalysis>,
    budget: usize,
) -> Result<SelectionPlan> {
    if budget == 0 {
        return Err(ShearError::InvalidLineLimit(budget));
    }

    let reserved = header_lines.len() + footer_lines.len();
    if reserved >= budget {
        return Err(ShearError::LineLimitTooSmall {
            line_limit: budget,
            minimum_required: reserved + 1,
        });
    }

    let mut remaining = budget - reserved;

    // Rank by complexity, ties by position so reruns are byte-identical.
    let mut order: Vec<usize> = (0..functions.len()).collect();
    order.sort_by(|&a, &b| {
        functions[b]
            .complexity
            .total_cmp(&functions[a].complexity)
            .then(functions[a].start_line.cmp(&functions[b].start_line))
    });

    let mut selected = vec![false; functions.len()];
    for idx in order {
        let need = functions[idx].line_count;
        if need <= remaining {
            selected[idx] = true;
            remaining -= need;
        }
    }

    let functions = functions
        .into_iter()
        .zip(selected)
        .map(|(analysis, selected)| SelectedFunction { analysis, selected })
        .collect();

    Ok(SelectionPlan {
        header_lines,
        footer_lines,
        functions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(name: &str, start: usize, lines: usize, complexity: f64) -> FunctionAnalysis {
        FunctionAnalysis::new(name, start, start + lines - 1, complexity)
    }

    fn rows(range: std::ops::Range<usize>) -> BTreeSet<usize> {
        range.collect()
    }

    #[test]
    fn greedy_fill_by_complexity() {
        // 2 header lines, functions of 10/5/8 lines at 0.9/0.3/0.6: with a
        // limit of 20 the 10- and 8-line bodies fit exactly and the 5-line
        // one is dropped.
        let functions = vec![
            f("first", 2, 10, 0.9),
            f("second", 12, 5, 0.3),
            f("third", 17, 8, 0.6),
        ];
        let plan = allocate(rows(0..2), BTreeSet::new(), functions, 20).unwrap();

        let picks: Vec<(&str, bool)> = plan
            .functions
            .iter()
            .map(|sf| (sf.analysis.name.as_str(), sf.selected))
            .collect();
        assert_eq!(
            picks,
            vec![("first", true), ("second", false), ("third", true)]
        );
        assert_eq!(plan.committed_lines(), 20);
    }

    #[test]
    fn infeasible_budget_reports_minimum() {
        let functions = vec![f("only", 2, 3, 0.5)];
        let err = allocate(rows(0..2), BTreeSet::new(), functions, 2).unwrap_err();
        match err {
            ShearError::LineLimitTooSmall {
                line_limit,
                minimum_required,
            } => {
                assert_eq!(line_limit, 2);
                assert_eq!(minimum_required, 3);
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn footer_counts_toward_reservation() {
        let err = allocate(rows(0..3), rows(10..13), vec![], 6).unwrap_err();
        assert_eq!(err.minimum_required(), Some(7));
    }

    #[test]
    fn ties_break_by_file_order() {
        // Equal complexity, only one fits: the earlier function wins.
        let functions = vec![f("later", 10, 4, 0.5), f("earlier", 2, 4, 0.5)];
        let plan = allocate(BTreeSet::new(), BTreeSet::new(), functions, 5).unwrap();
        let earlier = plan
            .functions
            .iter()
            .find(|sf| sf.analysis.name == "earlier")
            .unwrap();
        let later = plan
            .functions
            .iter()
            .find(|sf| sf.analysis.name == "later")
            .unwrap();
        assert!(earlier.selected);
        assert!(!later.selected);
    }

    #[test]
    fn skipped_function_does_not_block_smaller_ones() {
        // The 9-line body does not fit after the 10-line pick, but the
        // 3-line one still does.
        let functions = vec![
            f("big", 0, 10, 0.9),
            f("mid", 10, 9, 0.8),
            f("small", 19, 3, 0.1),
        ];
        let plan = allocate(BTreeSet::new(), BTreeSet::new(), functions, 13).unwrap();
        let picks: Vec<bool> = plan.functions.iter().map(|sf| sf.selected).collect();
        assert_eq!(picks, vec![true, false, true]);
    }

    #[test]
    fn zero_budget_is_a_configuration_error() {
        let err = allocate(BTreeSet::new(), BTreeSet::new(), vec![], 0).unwrap_err();
        assert!(matches!(err, ShearError::InvalidLineLimit(0)));
    }

    #[test]
    fn no_functions_is_fine_when_reservation_fits() {
        let plan = allocate(rows(0..2), BTreeSet::new(), vec![], 10).unwrap();
        assert!(plan.functions.is_empty());
        assert_eq!(plan.committed_lines(), 2);
    }
}
