//! Structural analyzer for TypeScript and JavaScript (TSX/JSX included).

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::complexity::{score_function, ComplexityProfile};
use crate::error::Result;
use crate::syntax::Language;

use super::{
    add_node_rows, add_signature_rows, collect_function_nodes, footer_window_start, node_end_row,
    node_text, FunctionAnalysis, StructuralAnalyzer,
};

pub const TS_PROFILE: ComplexityProfile = ComplexityProfile {
    branch_kinds: &["if_statement", "switch_case", "ternary_expression"],
    loop_kinds: &[
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
    ],
    handler_kinds: &["try_statement", "catch_clause", "finally_clause"],
    binary_kinds: &["binary_expression"],
    logical_operators: &["&&", "||", "??"],
    function_kinds: &[
        "function_declaration",
        "function_expression",
        "arrow_function",
        "method_definition",
        "generator_function_declaration",
        "generator_function",
    ],
    parameters_field: "parameters",
    bonus_kinds: &[
        ("await_expression", 0.2),
        ("decorator", 0.2),
        ("type_parameters", 0.2),
    ],
};

/// Region kinds: collection stops at each of these, so an arrow function
/// inside a method body counts as nesting, not as its own region.
const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "method_definition",
    "function_expression",
    "arrow_function",
];

const TEST_RUNNER_CALLEES: &[&str] = &["describe", "it", "test"];

pub struct TypeScriptAnalyzer;

impl StructuralAnalyzer for TypeScriptAnalyzer {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::Tsx]
    }

    fn profile(&self) -> &'static ComplexityProfile {
        &TS_PROFILE
    }

    fn header_lines(&self, lines: &[&str], _src: &[u8], root: Node) -> Result<BTreeSet<usize>> {
        let total = lines.len();
        let mut header = BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            classify_header_node(&mut header, child, total);
        }

        Ok(header)
    }

    fn functions(&self, _lines: &[&str], src: &[u8], root: Node) -> Result<Vec<FunctionAnalysis>> {
        let mut nodes = Vec::new();
        collect_function_nodes(root, FUNCTION_KINDS, &mut nodes);

        Ok(nodes
            .into_iter()
            .map(|node| {
                FunctionAnalysis::new(
                    function_name(src, node),
                    node.start_position().row,
                    node_end_row(node),
                    score_function(node, &TS_PROFILE),
                )
            })
            .collect())
    }

    fn footer_lines(&self, lines: &[&str], src: &[u8], root: Node) -> Result<BTreeSet<usize>> {
        let total = lines.len();
        let window = footer_window_start(total);
        let mut footer = BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.start_position().row < window {
                continue;
            }
            match child.kind() {
                "expression_statement" => {
                    if is_entry_or_test_call(src, child) {
                        add_node_rows(&mut footer, child, total);
                    }
                }
                "if_statement" => {
                    let is_entry_guard = child
                        .child_by_field_name("condition")
                        .is_some_and(|cond| node_text(src, cond).contains("require.main"));
                    if is_entry_guard {
                        add_node_rows(&mut footer, child, total);
                    }
                }
                _ => {}
            }
        }

        Ok(footer)
    }
}

fn classify_header_node(header: &mut BTreeSet<usize>, node: Node, total: usize) {
    match node.kind() {
        "import_statement" => add_node_rows(header, node, total),
        "export_statement" => match node.child_by_field_name("declaration") {
            // Re-exports and named export lists are import-shaped.
            None => add_node_rows(header, node, total),
            // `export class ...` etc: classify the wrapped declaration.
            Some(decl) => classify_header_node(header, decl, total),
        },
        "class_declaration" | "abstract_class_declaration" | "interface_declaration"
        | "enum_declaration" | "internal_module" => {
            let body = node.child_by_field_name("body");
            add_signature_rows(header, node, body, total);
        }
        "type_alias_declaration" => add_signature_rows(header, node, None, total),
        _ => {}
    }
}

/// Name field when present; otherwise climb to the declarator/property the
/// function value is bound to.
fn function_name(src: &[u8], node: Node) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        let text = node_text(src, name).trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    let mut current = node;
    while let Some(parent) = current.parent() {
        let named = match parent.kind() {
            "variable_declarator" | "public_field_definition" => parent.child_by_field_name("name"),
            "pair" => parent.child_by_field_name("key"),
            "assignment_expression" => parent.child_by_field_name("left"),
            "parenthesized_expression" => {
                current = parent;
                continue;
            }
            _ => None,
        };
        if let Some(name) = named {
            let text = node_text(src, name).trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
        break;
    }

    "anonymous".to_string()
}

fn is_entry_or_test_call(src: &[u8], stmt: Node) -> bool {
    let mut cursor = stmt.walk();
    for child in stmt.children(&mut cursor) {
        if child.kind() != "call_expression" {
            continue;
        }
        if let Some(callee) = child.child_by_field_name("function") {
            let text = node_text(src, callee);
            if text == "main" || TEST_RUNNER_CALLEES.contains(&text) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, Language};

    fn analyze_fixture(text: &str) -> (BTreeSet<usize>, Vec<FunctionAnalysis>, BTreeSet<usize>) {
        let lines: Vec<&str> = text.lines().collect();
        let tree = parse(text, Language::TypeScript).unwrap();
        let root = tree.root_node();
        let analyzer = TypeScriptAnalyzer;
        (
            analyzer.header_lines(&lines, text.as_bytes(), root).unwrap(),
            analyzer.functions(&lines, text.as_bytes(), root).unwrap(),
            analyzer.footer_lines(&lines, text.as_bytes(), root).unwrap(),
        )
    }

    #[test]
    fn imports_and_interface_signatures_are_header() {
        let text = "\
import { readFile } from 'fs';
import path from 'path';
export { helper } from './helper';

interface Options {
    depth: number;
}

export function run(options: Options): void {
    console.log(options.depth);
}
";
        let (header, functions, _) = analyze_fixture(text);
        assert!(header.contains(&0) && header.contains(&1) && header.contains(&2));
        assert!(header.contains(&4), "interface signature row");
        assert!(!header.contains(&5), "interface body is not header");
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "run");
        assert_eq!(functions[0].start_line, 8);
    }

    #[test]
    fn arrow_functions_take_their_binding_name() {
        let text = "\
const compute = (a: number, b: number): number => {
    return a + b;
};

export const publish = async () => {
    await flush();
};
";
        let (_, functions, _) = analyze_fixture(text);
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["compute", "publish"]);
    }

    #[test]
    fn class_methods_are_regions_and_signature_is_header() {
        let text = "\
export class Greeter {
    greet(name: string): string {
        return `hi ${name}`;
    }
}
";
        let (header, functions, _) = analyze_fixture(text);
        assert!(header.contains(&0), "class signature row");
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "greet");
    }

    #[test]
    fn trailing_test_calls_are_footer() {
        let mut text = String::new();
        for i in 0..16 {
            text.push_str(&format!("function work{i}() {{ return {i}; }}\n"));
        }
        text.push_str("describe('pack', () => {\n    it('works', () => {});\n});\n");
        text.push_str("main();\n");

        let (_, _, footer) = analyze_fixture(&text);
        assert!(footer.contains(&16), "describe block start");
        assert!(footer.contains(&18), "describe block end");
        assert!(footer.contains(&19), "main() call");
        assert!(!footer.contains(&15));
    }

    #[test]
    fn nested_arrows_are_not_separate_regions() {
        let text = "\
function outer() {
    const inner = () => 1;
    return inner();
}
";
        let (_, functions, _) = analyze_fixture(text);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "outer");
    }
}
