//! Structural conformance: does a node satisfy a schema?
//!
//! A mismatch is a plain `false`, never an error. References are resolved
//! through the registry while descending, and an unresolved reference in a
//! structural position simply does not match.
//!
//! Termination:
//! - descending into a field or element moves to a strictly smaller subtree;
//! - expanding named schemas on the *same* node is tracked on a trail of
//!   `(name, node)` frames, and re-entering a frame that is still open is a
//!   non-productive cycle, which does not match;
//! - `max_depth` bounds descent so a pathological tree cannot blow the stack.
use crate::node::{NodeKind, TreeNode};
use crate::registry::Registry;
use crate::schema::{ArrayShape, ObjectShape, Schema};

pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct Matcher<'r> {
    registry: &'r Registry,
    max_depth: usize,
}

// Per-call bookkeeping. Frames below `base` belong to ancestor nodes and can
// never collide with the current node, so only `frames[base..]` is scanned.
#[derive(Default)]
struct Trail<'s> {
    frames: Vec<(&'s str, usize)>,
    base: usize,
    depth: usize,
}

impl<'r> Matcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn matches<N: TreeNode>(&self, node: &N, schema: &Schema) -> bool {
        let mut trail = Trail::default();
        self.check(node, schema, &mut trail)
    }

    fn check<'s, N: TreeNode>(&self, node: &N, schema: &'s Schema, trail: &mut Trail<'s>) -> bool
    where
        'r: 's,
    {
        match schema {
            Schema::Any => true,
            Schema::Ref(name) => self.check_ref(node, name, trail),
            Schema::Type(constraint) => constraint.admits(node),
            Schema::Object(shape) => self.check_object(node, shape, trail),
            Schema::Array(shape) => self.check_array(node, shape, trail),
            Schema::AllOf(parts) => parts.iter().all(|part| self.check(node, part, trail)),
            Schema::AnyOf(parts) => parts.iter().any(|part| self.check(node, part, trail)),
        }
    }

    fn check_ref<'s, N: TreeNode>(&self, node: &N, name: &'s str, trail: &mut Trail<'s>) -> bool
    where
        'r: 's,
    {
        let frame = (name, node_id(node));
        if trail.frames[trail.base..].contains(&frame) {
            tracing::trace!(schema = name, "reference cycle on the same node");
            return false;
        }
        let def = match self.registry.resolve(name) {
            Ok(def) => def,
            Err(error) => {
                tracing::debug!(%error, "unresolved reference does not match");
                return false;
            }
        };
        trail.frames.push(frame);
        let ok = self.check(node, &def.schema, trail);
        trail.frames.pop();
        ok
    }

    fn check_object<'s, N: TreeNode>(&self, node: &N, shape: &'s ObjectShape, trail: &mut Trail<'s>) -> bool
    where
        'r: 's,
    {
        if node.kind() != NodeKind::Object {
            return false;
        }
        if shape.required.iter().any(|name| node.field(name).is_none()) {
            return false;
        }
        shape.properties.iter().all(|(name, sub)| match node.field(name) {
            Some(child) => self.descend(child, sub, trail),
            None => true,
        })
    }

    fn check_array<'s, N: TreeNode>(&self, node: &N, shape: &'s ArrayShape, trail: &mut Trail<'s>) -> bool
    where
        'r: 's,
    {
        if node.kind() != NodeKind::Array {
            return false;
        }
        let elements = node.elements();
        if !shape.admits_len(elements.len()) {
            return false;
        }
        match &shape.items {
            Some(item) => elements.iter().all(|el| self.descend(el, item, trail)),
            None => true,
        }
    }

    fn descend<'s, N: TreeNode>(&self, child: &N, schema: &'s Schema, trail: &mut Trail<'s>) -> bool
    where
        'r: 's,
    {
        if trail.depth >= self.max_depth {
            tracing::warn!(max_depth = self.max_depth, "match depth limit reached");
            return false;
        }
        let (base, depth) = (trail.base, trail.depth);
        trail.base = trail.frames.len();
        trail.depth += 1;
        let ok = self.check(child, schema, trail);
        trail.base = base;
        trail.depth = depth;
        ok
    }
}

fn node_id<N>(node: &N) -> usize {
    node as *const N as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArrayShape, Kind, ObjectShape, Pattern, TypeConstraint};
    use serde_json::{json, Value};

    fn tag(name: &str) -> Schema {
        TypeConstraint::of(Kind::String).pattern(Pattern::exact(name)).into()
    }

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(
            "Node",
            Schema::Object(ObjectShape::new().required_property("type", Schema::of_kind(Kind::String))),
        )
        .unwrap();
        reg.register("Expression", Schema::reference("Node")).unwrap();
        reg.register(
            "Identifier",
            Schema::all_of([
                Schema::reference("Expression"),
                ObjectShape::new()
                    .property("type", tag("Identifier"))
                    .required_property("name", Schema::of_kind(Kind::String))
                    .into(),
            ]),
        )
        .unwrap();
        reg.register(
            "Literal",
            Schema::all_of([
                Schema::reference("Expression"),
                ObjectShape::new()
                    .property("type", tag("Literal"))
                    .required_property(
                        "value",
                        Schema::any_of([
                            Schema::of_kind(Kind::String),
                            Schema::of_kind(Kind::Boolean),
                            Schema::null(),
                            Schema::of_kind(Kind::Number),
                        ]),
                    )
                    .into(),
            ]),
        )
        .unwrap();
        reg.register(
            "CallExpression",
            Schema::all_of([
                Schema::reference("Expression"),
                ObjectShape::new()
                    .property("type", tag("CallExpression"))
                    .required_property("callee", Schema::reference("Expression"))
                    .required_property("arguments", ArrayShape::new().items(Schema::reference("Expression")).into())
                    .into(),
            ]),
        )
        .unwrap();
        reg
    }

    fn call(callee: &str, args: usize) -> Value {
        let arguments: Vec<Value> = (0..args)
            .map(|i| json!({ "type": "Literal", "value": i, "raw": i.to_string() }))
            .collect();
        json!({
            "type": "CallExpression",
            "callee": { "type": "Identifier", "name": callee },
            "arguments": arguments
        })
    }

    #[test]
    fn type_discriminator_selects_node_kind() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let ident = json!({ "type": "Identifier", "name": "x" });
        assert!(m.matches(&ident, &Schema::reference("Identifier")));
        assert!(!m.matches(&ident, &Schema::reference("Literal")));
        assert!(m.matches(&ident, &Schema::reference("Expression")));
    }

    #[test]
    fn required_fields_must_be_present() {
        let reg = registry();
        let m = Matcher::new(&reg);
        assert!(m.matches(&json!({ "type": "Literal", "value": null }), &Schema::reference("Literal")));
        assert!(!m.matches(&json!({ "type": "Literal" }), &Schema::reference("Literal")));
        assert!(!m.matches(&json!({ "type": "Literal", "value": {} }), &Schema::reference("Literal")));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let ident = json!({ "type": "Identifier", "name": "x", "range": [0, 1], "engineData": { "k": 1 } });
        assert!(m.matches(&ident, &Schema::reference("Identifier")));
    }

    #[test]
    fn optional_fields_are_checked_only_when_present() {
        let reg = Registry::new();
        let m = Matcher::new(&reg);
        let shape: Schema = ObjectShape::new().property("label", Schema::of_kind(Kind::String)).into();
        assert!(m.matches(&json!({}), &shape));
        assert!(m.matches(&json!({ "label": "x" }), &shape));
        assert!(!m.matches(&json!({ "label": 3 }), &shape));
    }

    #[test]
    fn null_never_matches_shapes() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let null = Value::Null;
        assert!(!m.matches(&null, &Schema::reference("Identifier")));
        assert!(!m.matches(&null, &ObjectShape::new().into()));
        assert!(!m.matches(&null, &ArrayShape::new().into()));
        assert!(m.matches(&null, &Schema::reference("Identifier").nullable()));
        assert!(m.matches(&null, &Schema::Any));
    }

    #[test]
    fn array_bounds_and_elements() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let pair: Schema = ArrayShape::new().items(Schema::reference("Expression")).min_items(2).max_items(2).into();
        assert!(m.matches(&json!([{ "type": "Identifier", "name": "a" }, { "type": "Literal", "value": 1 }]), &pair));
        assert!(!m.matches(&json!([{ "type": "Identifier", "name": "a" }]), &pair));
        assert!(!m.matches(&json!([{ "type": "Identifier", "name": "a" }, 2]), &pair));
        assert!(!m.matches(&json!({ "0": 1 }), &pair));

        let anything: Schema = ArrayShape::new().into();
        assert!(m.matches(&json!([null, 1, "x"]), &anything));
    }

    #[test]
    fn composite_call_schema() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let f_with_two = Schema::all_of([
            Schema::reference("CallExpression"),
            ObjectShape::new()
                .property(
                    "callee",
                    Schema::all_of([
                        Schema::reference("Identifier"),
                        ObjectShape::new().property("name", TypeConstraint::default().pattern(Pattern::new("^f$").unwrap()).into()).into(),
                    ]),
                )
                .property("arguments", ArrayShape::new().min_items(2).max_items(2).into())
                .into(),
        ]);
        assert!(m.matches(&call("f", 2), &f_with_two));
        assert!(!m.matches(&call("f", 1), &f_with_two));
        assert!(!m.matches(&call("g", 2), &f_with_two));
        assert!(m.matches(&call("g", 2), &Schema::reference("CallExpression")));
    }

    #[test]
    fn unresolved_reference_in_field_fails_closed() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let shape: Schema = ObjectShape::new().property("body", Schema::reference("Missing")).into();
        assert!(!m.matches(&json!({ "body": {} }), &shape));
        // absent optional field never consults the reference
        assert!(m.matches(&json!({}), &shape));
    }

    #[test]
    fn mutual_references_terminate() {
        let mut reg = Registry::new();
        reg.register("A", Schema::any_of([Schema::reference("B"), Schema::of_kind(Kind::String)])).unwrap();
        reg.register("B", Schema::any_of([Schema::reference("A"), Schema::of_kind(Kind::Number)])).unwrap();
        reg.register("C", Schema::all_of([Schema::reference("D")])).unwrap();
        reg.register("D", Schema::all_of([Schema::reference("C")])).unwrap();
        let m = Matcher::new(&reg);
        assert!(m.matches(&json!("x"), &Schema::reference("A")));
        assert!(m.matches(&json!(1), &Schema::reference("A")));
        assert!(!m.matches(&json!(true), &Schema::reference("A")));
        assert!(!m.matches(&json!({}), &Schema::reference("C")));
    }

    #[test]
    fn recursive_tree_schema() {
        let mut reg = Registry::new();
        reg.register(
            "Tree",
            Schema::Object(
                ObjectShape::new()
                    .required_property("value", Schema::of_kind(Kind::Integer))
                    .property("children", ArrayShape::new().items(Schema::reference("Tree")).into()),
            ),
        )
        .unwrap();
        let m = Matcher::new(&reg);
        let good = json!({ "value": 1, "children": [ { "value": 2 }, { "value": 3, "children": [ { "value": 4 } ] } ] });
        let bad = json!({ "value": 1, "children": [ { "value": 2, "children": [ { "value": "x" } ] } ] });
        assert!(m.matches(&good, &Schema::reference("Tree")));
        assert!(!m.matches(&bad, &Schema::reference("Tree")));
    }

    #[test]
    fn depth_limit_fails_closed() {
        let mut reg = Registry::new();
        reg.register(
            "List",
            Schema::Object(ObjectShape::new().property("next", Schema::reference("List").nullable())),
        )
        .unwrap();
        let mut node = json!({ "next": null });
        for _ in 0..10 {
            node = json!({ "next": node });
        }
        assert!(Matcher::new(&reg).matches(&node, &Schema::reference("List")));
        assert!(!Matcher::new(&reg).with_max_depth(5).matches(&node, &Schema::reference("List")));
    }

    #[test]
    fn same_schema_on_sibling_nodes_is_not_a_cycle() {
        let reg = registry();
        let m = Matcher::new(&reg);
        let args: Schema = ArrayShape::new().items(Schema::reference("Identifier")).into();
        let two = json!([{ "type": "Identifier", "name": "a" }, { "type": "Identifier", "name": "b" }]);
        assert!(m.matches(&two, &args));
    }
}
