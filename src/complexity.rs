//! Structural complexity scoring for function bodies.
//!
//! The allocator ranks functions by how much behavior they pack per line, not
//! by raw length, so a short branch-heavy function outranks a long trivial
//! one. Scores are normalized to [0,1] against a fixed ceiling to keep the
//! ranking comparable across languages.

use tree_sitter::Node;

/// Raw points are divided by this and clamped; 20 points saturates the score.
pub const COMPLEXITY_CEILING: f64 = 20.0;

/// Every function starts here.
pub const BASE_SCORE: f64 = 1.0;

/// Normalized score when nothing about the body could be inspected.
pub const DEGENERATE_SCORE: f64 = BASE_SCORE / COMPLEXITY_CEILING;

/// Per-language node-kind tables consumed by the scorer.
///
/// A profile lists which concrete-syntax kinds count as control flow, which
/// mark a nested function definition, where the parameter list hangs, and any
/// language-specific kinds that signal non-trivial behavior.
pub struct ComplexityProfile {
    /// Conditionals, switch/match arms.
    pub branch_kinds: &'static [&'static str],
    pub loop_kinds: &'static [&'static str],
    /// Exception/cleanup handling constructs.
    pub handler_kinds: &'static [&'static str],
    /// Binary-expression kinds whose operator is checked against
    /// `logical_operators` before counting.
    pub binary_kinds: &'static [&'static str],
    pub logical_operators: &'static [&'static str],
    /// Function-definition kinds; each nested occurrence is worth 2 points.
    pub function_kinds: &'static [&'static str],
    /// Field name of the parameter list on a function node ("" to skip).
    pub parameters_field: &'static str,
    /// (kind, weight) extras, each weighted 0.1 to 0.5 per occurrence.
    pub bonus_kinds: &'static [(&'static str, f64)],
}

/// Empty profile used by the heuristic default analyzer; scores degenerate.
pub const EMPTY_PROFILE: ComplexityProfile = ComplexityProfile {
    branch_kinds: &[],
    loop_kinds: &[],
    handler_kinds: &[],
    binary_kinds: &[],
    logical_operators: &[],
    function_kinds: &[],
    parameters_field: "",
    bonus_kinds: &[],
};

/// Score one function/method node. Pure, total, normalized to [0,1].
pub fn score_function(node: Node, profile: &ComplexityProfile) -> f64 {
    normalize(raw_score(node, profile))
}

pub fn normalize(raw: f64) -> f64 {
    (raw / COMPLEXITY_CEILING).clamp(0.0, 1.0)
}

fn raw_score(node: Node, profile: &ComplexityProfile) -> f64 {
    let mut raw = BASE_SCORE;

    visit_descendants(node, &mut |n: Node| {
        let kind = n.kind();

        if profile.branch_kinds.contains(&kind)
            || profile.loop_kinds.contains(&kind)
            || profile.handler_kinds.contains(&kind)
        {
            raw += 1.0;
        }

        if profile.binary_kinds.contains(&kind) && is_logical_operator(n, profile) {
            raw += 1.0;
        }

        // Nested definitions weigh double: they hide whole behaviors that
        // would otherwise be separate regions.
        if profile.function_kinds.contains(&kind) {
            raw += 2.0;
        }

        for (bonus_kind, weight) in profile.bonus_kinds {
            if kind == *bonus_kind {
                raw += weight;
            }
        }
    });

    if !profile.parameters_field.is_empty() {
        if let Some(params) = node.child_by_field_name(profile.parameters_field) {
            let count = params.named_child_count() as f64;
            raw += (count / 5.0).min(1.0);
        }
    }

    raw
}

fn is_logical_operator(node: Node, profile: &ComplexityProfile) -> bool {
    match node.child_by_field_name("operator") {
        Some(op) => profile.logical_operators.contains(&op.kind()),
        None => false,
    }
}

fn visit_descendants(node: Node, f: &mut impl FnMut(Node)) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        f(child);
        visit_descendants(child, f);
    }
}
