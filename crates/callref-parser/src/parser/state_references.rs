//! Recursive-descent parser for reference expressions.
//!
//! ```text
//! reference   := postfix? '?'* '::' ( 'class' type_args? | IDENT | <empty> )
//! postfix     := primary ( '.' segment | '?.' segment | '!!' )*
//! segment     := IDENT type_args? call_suffix?
//! primary     := segment | literal | 'this' | '(' postfix ')'
//! call_suffix := '(' (postfix (',' postfix)*)? ')' lambda* | lambda+
//! lambda      := '{' postfix? '}'
//! type_args   := '<' type_arg (',' type_arg)* '>'
//! type_arg    := '*' | type
//! type        := IDENT ('.' IDENT)* type_args? '?'*
//! ```

use super::node::*;
use super::node_arena::NodeArena;
use super::scanner::{TokenCursor, TokenKind, scan};
use super::{ParseError, ParseResult};
use callref_common::Span;
use callref_common::limits::MAX_TYPE_ARGUMENT_DEPTH;
use smallvec::SmallVec;

/// A parsed `::` expression together with the arena that owns its nodes.
#[derive(Clone, Debug)]
pub struct ParsedReference {
    pub source: String,
    pub arena: NodeArena,
    /// The [`NodeKind::ClassLiteral`] or [`NodeKind::CallableReference`] node.
    pub root: NodeIndex,
}

/// Parse a single reference expression such as `a.b<C>::d` or `Foo?::class`.
pub fn parse_reference(source: &str) -> ParseResult<ParsedReference> {
    let mut arena = NodeArena::new();
    let root = parse_reference_into(&mut arena, source)?;
    tracing::trace!(source, root = %root, "parsed reference");
    Ok(ParsedReference {
        source: source.to_string(),
        arena,
        root,
    })
}

/// Parse a reference expression into an existing arena.
///
/// Spans are relative to `source`, so callers that share an arena between
/// several inputs keep one source text per parsed reference.
pub fn parse_reference_into(arena: &mut NodeArena, source: &str) -> ParseResult<NodeIndex> {
    let tokens = scan(source)?;
    let mut parser = ReferenceParser {
        cursor: TokenCursor::new(tokens),
        arena,
        depth: 0,
    };
    let root = parser.parse_reference()?;
    if !parser.cursor.at(&TokenKind::Eof) {
        return Err(parser.cursor.unexpected("end of reference"));
    }
    Ok(root)
}

struct ReferenceParser<'a> {
    cursor: TokenCursor,
    arena: &'a mut NodeArena,
    depth: u32,
}

impl ReferenceParser<'_> {
    fn parse_reference(&mut self) -> ParseResult<NodeIndex> {
        let start = self.cursor.peek().span.start;
        let receiver = if self.cursor.at(&TokenKind::ColonColon) {
            None
        } else {
            Some(self.parse_postfix()?)
        };

        let mut has_question_marks = false;
        while self.cursor.eat(&TokenKind::Question) {
            has_question_marks = true;
        }
        let colons = self.cursor.expect(&TokenKind::ColonColon, "'::'")?;

        if self.cursor.at_ident("class") {
            self.cursor.bump();
            let type_args = if self.cursor.at(&TokenKind::Less) {
                self.parse_type_args()?.into_iter().collect()
            } else {
                SmallVec::new()
            };
            let end = self.cursor.previous_end();
            return Ok(self.arena.add(
                NodeKind::ClassLiteral(ClassLiteralData {
                    receiver,
                    has_question_marks,
                    type_args,
                }),
                Span::new(start, end),
            ));
        }

        let reference = match &self.cursor.peek().kind {
            TokenKind::Ident(_) => {
                let (name, span) = self.cursor.expect_ident("a member name")?;
                self.arena.add_name(name, span)
            }
            // `X::` with nothing after it is kept as an empty reference so that
            // resolution can still report on it.
            TokenKind::Eof => self
                .arena
                .add_name(String::new(), Span::new(colons.span.end, colons.span.end)),
            _ => return Err(self.cursor.unexpected("a member name or 'class'")),
        };
        let end = self.cursor.previous_end();
        Ok(self.arena.add(
            NodeKind::CallableReference(CallableReferenceData {
                receiver,
                reference,
                has_question_marks,
            }),
            Span::new(start, end),
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<NodeIndex> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.eat(&TokenKind::Dot) {
                let selector = self.parse_segment()?;
                expr = self.arena.add_dot_qualified(expr, selector);
            } else if self.cursor.eat(&TokenKind::QuestionDot) {
                let selector = self.parse_segment()?;
                expr = self.arena.add_safe_qualified(expr, selector);
            } else if self.cursor.at(&TokenKind::BangBang) {
                let bang = self.cursor.bump();
                let span = self.arena.span(expr).cover(bang.span);
                expr = self.arena.add(NodeKind::NotNull(expr), span);
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<NodeIndex> {
        let token = self.cursor.peek().clone();
        match &token.kind {
            TokenKind::Int(value) => {
                let value = *value;
                self.cursor.bump();
                Ok(self
                    .arena
                    .add(NodeKind::Literal(LiteralKind::Int(value)), token.span))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.cursor.bump();
                Ok(self
                    .arena
                    .add(NodeKind::Literal(LiteralKind::String(text)), token.span))
            }
            TokenKind::LParen => {
                self.cursor.bump();
                self.enter(token.span)?;
                let inner = self.parse_postfix()?;
                self.depth -= 1;
                let close = self.cursor.expect(&TokenKind::RParen, "')'")?;
                Ok(self.arena.add(
                    NodeKind::Parenthesized(inner),
                    token.span.cover(close.span),
                ))
            }
            TokenKind::Ident(word) if word == "this" => {
                self.cursor.bump();
                Ok(self.arena.add(NodeKind::This, token.span))
            }
            TokenKind::Ident(word) if word == "true" || word == "false" => {
                let value = word == "true";
                self.cursor.bump();
                Ok(self
                    .arena
                    .add(NodeKind::Literal(LiteralKind::Boolean(value)), token.span))
            }
            TokenKind::Ident(word) if word == "null" => {
                self.cursor.bump();
                Ok(self.arena.add(NodeKind::Literal(LiteralKind::Null), token.span))
            }
            TokenKind::Ident(_) => self.parse_segment(),
            _ => Err(self.cursor.unexpected("an expression")),
        }
    }

    /// `IDENT type_args? call_suffix?`
    fn parse_segment(&mut self) -> ParseResult<NodeIndex> {
        let (name, name_span) = self.cursor.expect_ident("a name")?;
        let callee = self.arena.add_name(name, name_span);

        let type_args = if self.cursor.at(&TokenKind::Less) {
            self.parse_type_args()?
        } else {
            SmallVec::new()
        };

        let value_args = if self.cursor.eat(&TokenKind::LParen) {
            let mut args = Vec::new();
            if !self.cursor.at(&TokenKind::RParen) {
                loop {
                    args.push(self.parse_postfix()?);
                    if !self.cursor.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.cursor.expect(&TokenKind::RParen, "')'")?;
            Some(args)
        } else {
            None
        };

        let mut lambda_args = SmallVec::new();
        while self.cursor.at(&TokenKind::LBrace) {
            lambda_args.push(self.parse_lambda()?);
        }

        if type_args.is_empty() && value_args.is_none() && lambda_args.is_empty() {
            return Ok(callee);
        }
        let span = Span::new(name_span.start, self.cursor.previous_end());
        Ok(self
            .arena
            .add_call(callee, type_args, value_args, lambda_args, span))
    }

    fn parse_lambda(&mut self) -> ParseResult<NodeIndex> {
        let open = self.cursor.expect(&TokenKind::LBrace, "'{'")?;
        self.enter(open.span)?;
        let body = if self.cursor.at(&TokenKind::RBrace) {
            None
        } else {
            Some(self.parse_postfix()?)
        };
        self.depth -= 1;
        let close = self.cursor.expect(&TokenKind::RBrace, "'}'")?;
        Ok(self
            .arena
            .add(NodeKind::Lambda(body), open.span.cover(close.span)))
    }

    fn parse_type_args(&mut self) -> ParseResult<SmallVec<[NodeIndex; 2]>> {
        let open = self.cursor.expect(&TokenKind::Less, "'<'")?;
        self.enter(open.span)?;
        let mut args = SmallVec::new();
        loop {
            if self.cursor.at(&TokenKind::Star) {
                let star = self.cursor.bump();
                args.push(self.arena.add(NodeKind::StarProjection, star.span));
            } else {
                args.push(self.parse_type()?);
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::Greater, "'>'")?;
        self.depth -= 1;
        Ok(args)
    }

    fn parse_type(&mut self) -> ParseResult<NodeIndex> {
        let (first, first_span) = self.cursor.expect_ident("a type name")?;
        let mut qualifier: SmallVec<[String; 2]> = SmallVec::new();
        qualifier.push(first);
        while self.cursor.at(&TokenKind::Dot) {
            self.cursor.bump();
            let (segment, _) = self.cursor.expect_ident("a type name")?;
            qualifier.push(segment);
        }
        let type_args = if self.cursor.at(&TokenKind::Less) {
            self.parse_type_args()?
        } else {
            SmallVec::new()
        };
        let mut nullable = false;
        while self.cursor.eat(&TokenKind::Question) {
            nullable = true;
        }
        let span = Span::new(first_span.start, self.cursor.previous_end());
        Ok(self
            .arena
            .add_type_reference(qualifier, type_args, nullable, span))
    }

    fn enter(&mut self, span: Span) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_TYPE_ARGUMENT_DEPTH {
            return Err(ParseError::new("expression nested too deeply", span));
        }
        Ok(())
    }
}
