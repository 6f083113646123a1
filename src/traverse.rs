//! Pre-order walk over the AST nodes of a tree.
//!
//! A value counts as an AST node when it is an object with a string `type`
//! field. Children are found in fields that hold a node or an array of
//! nodes; other objects (`loc`, `range`, engine metadata) are not entered.
use crate::node::{NodeKind, TreeNode};

pub fn is_ast_node<N: TreeNode>(value: &N) -> bool {
    value.kind() == NodeKind::Object && value.type_tag().is_some()
}

/// Visit every AST node under `root` (root included) in document order.
/// A root array is treated as a list of top-level nodes.
pub fn walk<'n, N: TreeNode>(root: &'n N, mut visit: impl FnMut(&'n N)) {
    let mut stack: Vec<&'n N> = Vec::new();
    push_children_of_list(root, &mut stack);
    if is_ast_node(root) {
        stack.push(root);
    }
    let mut children: Vec<&'n N> = Vec::new();
    while let Some(node) = stack.pop() {
        visit(node);
        for (_, value) in node.fields() {
            if is_ast_node(value) {
                children.push(value);
            } else if value.kind() == NodeKind::Array {
                children.extend(value.elements().iter().filter(|el| is_ast_node(*el)));
            }
        }
        stack.extend(children.drain(..).rev());
    }
}

fn push_children_of_list<'n, N: TreeNode>(root: &'n N, stack: &mut Vec<&'n N>) {
    if root.kind() == NodeKind::Array {
        stack.extend(root.elements().iter().filter(|el| is_ast_node(*el)).rev());
    }
}

/// All AST nodes under `root`, in pre-order.
pub fn nodes<N: TreeNode>(root: &N) -> Vec<&N> {
    let mut out = Vec::new();
    walk(root, |node| out.push(node));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visits_nodes_in_document_order() {
        let ast = json!({
            "type": "Program",
            "body": [
                { "type": "ExpressionStatement",
                  "expression": { "type": "Identifier", "name": "a" } },
                { "type": "EmptyStatement" }
            ],
            "loc": { "start": { "line": 1, "column": 0 }, "end": { "line": 2, "column": 1 } }
        });
        let tags: Vec<&str> = nodes(&ast).into_iter().filter_map(TreeNode::type_tag).collect();
        assert_eq!(tags, vec!["Program", "ExpressionStatement", "Identifier", "EmptyStatement"]);
    }

    #[test]
    fn skips_null_holes_and_non_node_objects() {
        let ast = json!({
            "type": "ArrayExpression",
            "elements": [ null, { "type": "Literal", "value": 1 }, 2 ],
            "extra": { "parenthesized": true }
        });
        assert_eq!(nodes(&ast).len(), 2);
    }

    #[test]
    fn root_array_is_a_node_list() {
        let list = json!([ { "type": "EmptyStatement" }, { "type": "DebuggerStatement" }, "noise" ]);
        let tags: Vec<&str> = nodes(&list).into_iter().filter_map(TreeNode::type_tag).collect();
        assert_eq!(tags, vec!["EmptyStatement", "DebuggerStatement"]);
        assert!(nodes(&json!(3)).is_empty());
    }
}
