//! NodeArena storage and creation methods (`add_*`).

use super::node::*;
use callref_common::Span;
use smallvec::SmallVec;

/// Flat storage for syntax nodes.
///
/// Nodes are appended and never removed; a [`NodeIndex`] stays valid for the
/// lifetime of the arena. An arena may start numbering at a non-zero base so
/// that nodes synthesized during resolution do not share indices with the
/// parsed input.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    base: u32,
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// An empty arena whose first index follows the last index of `other`.
    #[must_use]
    pub fn synthetic_after(other: &NodeArena) -> NodeArena {
        NodeArena {
            base: other.end_index(),
            nodes: Vec::new(),
        }
    }

    fn end_index(&self) -> u32 {
        self.base + self.nodes.len() as u32
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeIndex {
        let index = NodeIndex(self.end_index());
        self.nodes.push(Node { kind, span });
        index
    }

    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        let offset = index.0.checked_sub(self.base)?;
        self.nodes.get(offset as usize)
    }

    #[must_use]
    pub fn kind(&self, index: NodeIndex) -> Option<&NodeKind> {
        self.get(index).map(|node| &node.kind)
    }

    /// Span of `index`, or a dummy span for an index from another arena.
    #[must_use]
    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map_or(Span::dummy(), |node| node.span)
    }

    #[must_use]
    pub fn name_text(&self, index: NodeIndex) -> Option<&str> {
        match self.kind(index)? {
            NodeKind::Name(text) => Some(text),
            _ => None,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn add_name(&mut self, text: impl Into<String>, span: Span) -> NodeIndex {
        self.add(NodeKind::Name(text.into()), span)
    }

    pub fn add_call(
        &mut self,
        callee: NodeIndex,
        type_args: SmallVec<[NodeIndex; 2]>,
        value_args: Option<Vec<NodeIndex>>,
        lambda_args: SmallVec<[NodeIndex; 1]>,
        span: Span,
    ) -> NodeIndex {
        self.add(
            NodeKind::Call(CallData {
                callee,
                type_args,
                value_args,
                lambda_args,
            }),
            span,
        )
    }

    pub fn add_dot_qualified(&mut self, receiver: NodeIndex, selector: NodeIndex) -> NodeIndex {
        let span = self.span(receiver).cover(self.span(selector));
        self.add(
            NodeKind::DotQualified(QualifiedData {
                receiver,
                selector: Some(selector),
            }),
            span,
        )
    }

    pub fn add_safe_qualified(&mut self, receiver: NodeIndex, selector: NodeIndex) -> NodeIndex {
        let span = self.span(receiver).cover(self.span(selector));
        self.add(
            NodeKind::SafeQualified(QualifiedData {
                receiver,
                selector: Some(selector),
            }),
            span,
        )
    }

    pub fn add_type_reference(
        &mut self,
        qualifier: SmallVec<[String; 2]>,
        type_args: SmallVec<[NodeIndex; 2]>,
        nullable: bool,
        span: Span,
    ) -> NodeIndex {
        self.add(
            NodeKind::TypeReference(TypeReferenceData {
                qualifier,
                type_args,
                nullable,
            }),
            span,
        )
    }

    /// Build `a.b.c` from plain segment names, left-associated like the
    /// parser builds dotted chains.
    ///
    /// Returns `None` for an empty segment list.
    pub fn add_dotted_chain(&mut self, segments: &[(String, Span)]) -> Option<NodeIndex> {
        let mut iter = segments.iter();
        let (first, first_span) = iter.next()?;
        let mut chain = self.add_name(first.clone(), *first_span);
        for (name, span) in iter {
            let selector = self.add_name(name.clone(), *span);
            chain = self.add_dot_qualified(chain, selector);
        }
        Some(chain)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Source-like rendering of a node, used in diagnostic messages and CLI
    /// output.
    #[must_use]
    pub fn render(&self, index: NodeIndex) -> String {
        let mut out = String::new();
        self.render_into(index, &mut out);
        out
    }

    fn render_into(&self, index: NodeIndex, out: &mut String) {
        let Some(kind) = self.kind(index) else {
            out.push_str("<?>");
            return;
        };
        match kind {
            NodeKind::Name(text) => out.push_str(text),
            NodeKind::Call(call) => {
                self.render_into(call.callee, out);
                self.render_type_args(&call.type_args, out);
                if let Some(args) = &call.value_args {
                    out.push('(');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.render_into(*arg, out);
                    }
                    out.push(')');
                }
                for lambda in &call.lambda_args {
                    out.push(' ');
                    self.render_into(*lambda, out);
                }
            }
            NodeKind::DotQualified(q) | NodeKind::SafeQualified(q) => {
                self.render_into(q.receiver, out);
                out.push_str(if matches!(kind, NodeKind::SafeQualified(_)) {
                    "?."
                } else {
                    "."
                });
                if let Some(selector) = q.selector {
                    self.render_into(selector, out);
                }
            }
            NodeKind::NotNull(inner) => {
                self.render_into(*inner, out);
                out.push_str("!!");
            }
            NodeKind::Parenthesized(inner) => {
                out.push('(');
                self.render_into(*inner, out);
                out.push(')');
            }
            NodeKind::Literal(lit) => match lit {
                LiteralKind::Int(value) => out.push_str(&value.to_string()),
                LiteralKind::String(value) => {
                    out.push('"');
                    out.push_str(value);
                    out.push('"');
                }
                LiteralKind::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
                LiteralKind::Null => out.push_str("null"),
            },
            NodeKind::This => out.push_str("this"),
            NodeKind::Lambda(body) => {
                out.push('{');
                if let Some(body) = body {
                    out.push(' ');
                    self.render_into(*body, out);
                    out.push(' ');
                }
                out.push('}');
            }
            NodeKind::TypeReference(data) => {
                out.push_str(&data.qualifier.join("."));
                self.render_type_args(&data.type_args, out);
                if data.nullable {
                    out.push('?');
                }
            }
            NodeKind::StarProjection => out.push('*'),
            NodeKind::ClassLiteral(data) => {
                if let Some(receiver) = data.receiver {
                    self.render_into(receiver, out);
                }
                if data.has_question_marks {
                    out.push('?');
                }
                out.push_str("::class");
                self.render_type_args(&data.type_args, out);
            }
            NodeKind::CallableReference(data) => {
                if let Some(receiver) = data.receiver {
                    self.render_into(receiver, out);
                }
                if data.has_question_marks {
                    out.push('?');
                }
                out.push_str("::");
                self.render_into(data.reference, out);
            }
        }
    }

    fn render_type_args(&self, args: &[NodeIndex], out: &mut String) {
        if args.is_empty() {
            return;
        }
        out.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.render_into(*arg, out);
        }
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_arena_indices_follow_the_original() {
        let mut arena = NodeArena::new();
        let a = arena.add_name("a", Span::new(0, 1));
        let b = arena.add_name("b", Span::new(2, 3));
        arena.add_dot_qualified(a, b);

        let mut synthetic = NodeArena::synthetic_after(&arena);
        let chain = synthetic
            .add_dotted_chain(&[("a".into(), Span::new(0, 1)), ("b".into(), Span::new(2, 3))])
            .expect("non-empty chain");
        assert!(chain.0 >= arena.len() as u32);
        assert!(arena.get(chain).is_none());
        assert_eq!(synthetic.render(chain), "a.b");
        assert!(synthetic.get(a).is_none());
    }

    #[test]
    fn dotted_chain_is_left_associated() {
        let mut arena = NodeArena::new();
        let chain = arena
            .add_dotted_chain(&[
                ("a".into(), Span::new(0, 1)),
                ("b".into(), Span::new(2, 3)),
                ("c".into(), Span::new(4, 5)),
            ])
            .expect("non-empty chain");
        let Some(NodeKind::DotQualified(outer)) = arena.kind(chain) else {
            panic!("expected a qualified expression");
        };
        assert_eq!(arena.render(outer.receiver), "a.b");
        assert_eq!(arena.span(chain), Span::new(0, 5));
    }
}
