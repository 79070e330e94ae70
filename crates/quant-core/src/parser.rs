//! Recursive-descent parser for `.qs` stylesheets
//!
//! Grammar (informal):
//!
//! ```text
//! stylesheet := (at-rule | rule)*
//! rule       := selector '{' (at-rule | rule | declaration ';'?)* '}'
//! at-rule    := '@' name prelude (';' | '{' (at-rule | rule)* '}')
//! declaration:= property ':' value
//! ```
//!
//! A selector is the concatenation of adjacent selector tokens. Errors at the
//! top level are recorded and the parser resynchronizes after the next `}` or
//! `;`, so one malformed rule never hides the rest of the file.

use crate::ast::{AtRule, Declaration, Loc, Node, Rule, StyleSheet};
use crate::diagnostics::{Diagnostic, Severity};
use crate::lexer::{Position, Token, TokenKind, lex};
use std::fmt;
use thiserror::Error;
use tracing::debug;

const IMPORTANT: &str = "!important";

/// Outcome of parsing a `.qs` source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub stylesheet: StyleSheet,
    /// Recovered errors, in source order
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse errors as error-severity diagnostics
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(ParseError::to_diagnostic).collect()
    }
}

/// Hard parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    EmptySelector,
    MissingBrace,
    MissingProperty,
    MissingColon,
    MissingAtRuleName,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::EmptySelector => "empty selector",
            ParseErrorKind::MissingBrace => "missing brace",
            ParseErrorKind::MissingProperty => "missing property",
            ParseErrorKind::MissingColon => "missing colon",
            ParseErrorKind::MissingAtRuleName => "missing at-rule name",
        };
        f.write_str(text)
    }
}

/// A parse error anchored at the offending token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
    pub end: Position,
    /// Kind of the token that triggered the error
    pub found: TokenKind,
}

impl ParseError {
    fn at(kind: ParseErrorKind, message: impl Into<String>, token: &Token) -> Self {
        Self {
            kind,
            message: message.into(),
            position: token.start,
            end: token.end,
            found: token.kind,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let hint = match self.kind {
            ParseErrorKind::EmptySelector => "start the rule with a utility name, e.g. `btn { ... }`",
            ParseErrorKind::MissingBrace => "check for an unclosed or missing `{` / `}`",
            ParseErrorKind::MissingProperty => "declarations look like `property: value;`",
            ParseErrorKind::MissingColon => "separate the property and its value with `:`",
            ParseErrorKind::MissingAtRuleName => "write the at-rule name right after `@`",
        };
        Diagnostic::new(
            "Q000",
            format!("{} (found {})", self.message, self.found),
            Severity::Error,
            Loc::new(self.position, self.end),
        )
        .with_hint(hint)
    }
}

type PResult<T> = std::result::Result<T, ParseError>;

/// Lex and parse a source in one step
pub fn parse(source: &str) -> ParseResult {
    Parser::new(lex(source)).parse()
}

/// Token-stream parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Build a parser over a token stream
    ///
    /// Whitespace tokens are dropped and an end marker is appended if missing.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect();
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map(|t| t.end).unwrap_or_else(Position::origin);
            tokens.push(Token::new(TokenKind::Eof, end, end));
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the whole stream, recovering from top-level errors
    pub fn parse(mut self) -> ParseResult {
        let mut body = Vec::new();
        let mut errors = Vec::new();

        while !self.at(TokenKind::Eof) {
            match self.parse_top_level() {
                Ok(node) => body.push(node),
                Err(err) => {
                    debug!("Recovering from parse error: {}", err);
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        debug!(
            "Parsed {} top-level nodes with {} errors",
            body.len(),
            errors.len()
        );
        ParseResult {
            stylesheet: StyleSheet::new(body),
            errors,
        }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, error: ParseErrorKind, message: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(ParseError::at(error, message, self.peek()))
        }
    }

    /// Discard tokens up to and including the next `}` or `;`
    fn synchronize(&mut self) {
        while !self.at(TokenKind::Eof) {
            let token = self.bump();
            if matches!(token.kind, TokenKind::RBrace | TokenKind::Semicolon) {
                break;
            }
        }
    }

    fn parse_top_level(&mut self) -> PResult<Node> {
        if self.at(TokenKind::At) {
            return self.parse_at_rule().map(Node::AtRule);
        }
        self.parse_rule().map(Node::Rule)
    }

    fn is_selector_token(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::SelectorChunk
                | TokenKind::Ident
                | TokenKind::Hash
                | TokenKind::Number
                | TokenKind::Dimension
                | TokenKind::String
                | TokenKind::Colon
        )
    }

    /// Concatenate adjacent selector tokens without separators
    fn consume_selector(&mut self) -> PResult<(String, Position)> {
        let start = self.peek().start;
        let mut selector = String::new();
        while Self::is_selector_token(self.peek().kind) {
            selector.push_str(self.bump().text());
        }
        if selector.is_empty() {
            return Err(ParseError::at(
                ParseErrorKind::EmptySelector,
                "Empty selector",
                self.peek(),
            ));
        }
        Ok((selector, start))
    }

    fn parse_rule(&mut self) -> PResult<Rule> {
        let (selector, start) = self.consume_selector()?;
        self.expect(
            TokenKind::LBrace,
            ParseErrorKind::MissingBrace,
            "Expected '{' after selector",
        )?;
        let (declarations, children) = self.parse_block_content()?;
        let close = self.expect(
            TokenKind::RBrace,
            ParseErrorKind::MissingBrace,
            "Expected '}' at end of block",
        )?;

        Ok(Rule {
            selector,
            declarations,
            children,
            loc: Loc::new(start, close.end),
        })
    }

    /// Lookahead: a run of selector tokens followed by `{` opens a nested rule
    fn starts_nested_rule(&self) -> bool {
        let mut index = self.pos;
        while Self::is_selector_token(self.kind_at(index)) {
            index += 1;
        }
        index > self.pos && self.kind_at(index) == TokenKind::LBrace
    }

    fn parse_block_content(&mut self) -> PResult<(Vec<Declaration>, Vec<Node>)> {
        let mut declarations = Vec::new();
        let mut children = Vec::new();

        loop {
            match self.peek().kind {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::At => children.push(Node::AtRule(self.parse_at_rule()?)),
                TokenKind::Semicolon => {
                    self.bump();
                }
                _ if self.starts_nested_rule() => children.push(Node::Rule(self.parse_rule()?)),
                _ => {
                    declarations.push(self.parse_declaration()?);
                    if self.at(TokenKind::Semicolon) {
                        self.bump();
                    }
                }
            }
        }

        Ok((declarations, children))
    }

    fn parse_declaration(&mut self) -> PResult<Declaration> {
        if !self.at_any(&[TokenKind::Ident, TokenKind::SelectorChunk]) {
            return Err(ParseError::at(
                ParseErrorKind::MissingProperty,
                "Expected property name",
                self.peek(),
            ));
        }
        let name = self.bump();

        // `color:` and `color:red` arrive as one chunk; split at the first colon
        let (property, head) = match name.text().split_once(':') {
            Some((property, rest)) => (property.to_string(), rest.to_string()),
            None => {
                self.expect(
                    TokenKind::Colon,
                    ParseErrorKind::MissingColon,
                    "Expected ':' after property name",
                )?;
                (name.text().to_string(), String::new())
            }
        };

        let (raw_value, last_end) = self.join_until(
            head,
            name.end,
            &[TokenKind::Semicolon, TokenKind::RBrace],
        );
        let (value, important) = split_important(raw_value.trim());

        Ok(Declaration {
            property,
            value,
            important,
            loc: Loc::new(name.start, last_end),
        })
    }

    fn parse_at_rule(&mut self) -> PResult<AtRule> {
        let at = self.expect(TokenKind::At, ParseErrorKind::MissingAtRuleName, "Expected '@'")?;

        let name_token = self.peek().clone();
        let (name, prelude_head) = match name_token.kind {
            TokenKind::Ident | TokenKind::SelectorChunk => (name_token.text().to_string(), String::new()),
            // `@media(...)` lexes as a function opener; keep the paren in the prelude
            TokenKind::Function => (
                name_token.value.clone().unwrap_or_default(),
                "(".to_string(),
            ),
            _ => {
                return Err(ParseError::at(
                    ParseErrorKind::MissingAtRuleName,
                    "Expected at-rule name after '@'",
                    &name_token,
                ));
            }
        };
        self.bump();
        let name = name.to_ascii_lowercase();

        let (prelude, _) = self.join_until(
            prelude_head,
            name_token.end,
            &[TokenKind::LBrace, TokenKind::Semicolon, TokenKind::RBrace],
        );
        let prelude = prelude.trim().to_string();

        if self.at(TokenKind::Semicolon) {
            let semi = self.bump();
            return Ok(AtRule {
                name,
                prelude,
                block: None,
                loc: Loc::new(at.start, semi.end),
            });
        }

        let message = format!("Expected '{{' after @{name}");
        self.expect(TokenKind::LBrace, ParseErrorKind::MissingBrace, &message)?;

        let mut block = Vec::new();
        while !self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
            block.push(self.parse_top_level()?);
        }

        let message = format!("Expected '}}' at end of @{name}");
        let close = self.expect(TokenKind::RBrace, ParseErrorKind::MissingBrace, &message)?;

        Ok(AtRule {
            name,
            prelude,
            block: Some(block),
            loc: Loc::new(at.start, close.end),
        })
    }

    /// Concatenate tokens until one of `stops` (or the end marker)
    ///
    /// Whitespace and comments were filtered out by the lexer; a gap between
    /// two consecutive tokens is restored as a single space so values such as
    /// `1px solid red` survive.
    fn join_until(&mut self, mut out: String, after: Position, stops: &[TokenKind]) -> (String, Position) {
        let mut prev_end = after;
        while !self.at_any(stops) && !self.at(TokenKind::Eof) {
            let token = self.bump();
            if token.start.offset > prev_end.offset && !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token.text());
            prev_end = token.end;
        }
        (out, prev_end)
    }
}

/// Strip a trailing `!important` (any case), returning the bare value and the flag
fn split_important(value: &str) -> (String, bool) {
    let lower = value.to_ascii_lowercase();
    if lower.ends_with(IMPORTANT) {
        let bare = value[..value.len() - IMPORTANT.len()].trim_end();
        (bare.to_string(), true)
    } else {
        (value.to_string(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_rule(result: &ParseResult) -> &Rule {
        match &result.stylesheet.body[0] {
            Node::Rule(rule) => rule,
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_simple_rule() {
        let result = parse("btn { color: red; padding: 1rem 2rem }");
        assert!(result.is_valid(), "{:?}", result.errors);
        let rule = first_rule(&result);
        assert_eq!(rule.selector, "btn");
        let decls: Vec<_> = rule
            .declarations
            .iter()
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert_eq!(decls, vec![("color", "red"), ("padding", "1rem 2rem")]);
    }

    #[test]
    fn test_parse_compact_declaration() {
        let result = parse("x{color:red;background:url(a.png)}");
        let rule = first_rule(&result);
        assert_eq!(rule.declarations[0].value, "red");
        assert_eq!(rule.declarations[1].property, "background");
        assert_eq!(rule.declarations[1].value, "url(a.png)");
    }

    #[test]
    fn test_parse_function_values_keep_spacing() {
        let result = parse("x { color: rgb(0, 10, 20); border: 1px solid #fff; }");
        let rule = first_rule(&result);
        assert_eq!(rule.declarations[0].value, "rgb(0, 10, 20)");
        assert_eq!(rule.declarations[1].value, "1px solid #fff");
    }

    #[test]
    fn test_parse_important() {
        let result = parse("x { color: red !important; margin: 0!IMPORTANT }");
        let rule = first_rule(&result);
        assert_eq!(rule.declarations[0].value, "red");
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[1].value, "0");
        assert!(rule.declarations[1].important);
    }

    #[test]
    fn test_parse_variant_and_arbitrary_selectors() {
        let result = parse("md:hover:bg-[#ff0000] { background: #ff0000; }");
        assert_eq!(first_rule(&result).selector, "md:hover:bg-[#ff0000]");
    }

    #[test]
    fn test_parse_nested_rules() {
        let result = parse("btn { color: red; &:hover { color: blue; } :focus { outline: none } }");
        assert!(result.is_valid(), "{:?}", result.errors);
        let rule = first_rule(&result);
        assert_eq!(rule.declarations.len(), 1);
        let nested: Vec<_> = rule
            .children
            .iter()
            .map(|n| match n {
                Node::Rule(r) => r.selector.clone(),
                Node::AtRule(a) => a.name.clone(),
            })
            .collect();
        assert_eq!(nested, vec!["&:hover", ":focus"]);
    }

    #[test]
    fn test_parse_at_rule_with_block() {
        let result = parse("@media (min-width: 768px) { md-flex { display: flex; } }");
        assert!(result.is_valid(), "{:?}", result.errors);
        let Node::AtRule(at) = &result.stylesheet.body[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(at.name, "media");
        assert_eq!(at.prelude, "(min-width: 768px)");
        assert_eq!(at.block.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_parse_bodiless_at_rule() {
        let result = parse("@layer utilities;\nbtn { color: red }");
        assert!(result.is_valid());
        let Node::AtRule(at) = &result.stylesheet.body[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(at.name, "layer");
        assert_eq!(at.prelude, "utilities");
        assert!(at.block.is_none());
        assert_eq!(result.stylesheet.body.len(), 2);
    }

    #[test]
    fn test_at_rule_name_is_lowercased() {
        let result = parse("@MEDIA print { x { color: red } }");
        let Node::AtRule(at) = &result.stylesheet.body[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(at.name, "media");
    }

    #[test]
    fn test_empty_selector_error() {
        // Recovery stops at the first `;`, so the dangling `}` errors again
        let result = parse("{ color: red; } ok { color: blue }");
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].kind, ParseErrorKind::EmptySelector);
        assert_eq!(result.errors[0].position.offset, 0);
        assert_eq!(result.errors[1].kind, ParseErrorKind::EmptySelector);
        assert_eq!(first_rule(&result).selector, "ok");
    }

    #[test]
    fn test_missing_colon_error() {
        let result = parse("btn { color red; }\nok { color: blue }");
        assert_eq!(result.errors[0].kind, ParseErrorKind::MissingColon);
        assert!(
            result
                .stylesheet
                .body
                .iter()
                .any(|n| matches!(n, Node::Rule(r) if r.selector == "ok"))
        );
    }

    #[test]
    fn test_missing_property_error() {
        let result = parse("btn { 12px; }");
        assert_eq!(result.errors[0].kind, ParseErrorKind::MissingProperty);
        assert_eq!(result.errors[0].found, TokenKind::Dimension);
    }

    #[test]
    fn test_missing_brace_error() {
        let result = parse("btn color: red;");
        assert_eq!(result.errors[0].kind, ParseErrorKind::MissingBrace);
    }

    #[test]
    fn test_missing_at_rule_name() {
        let result = parse("@ { }");
        assert_eq!(result.errors[0].kind, ParseErrorKind::MissingAtRuleName);
    }

    #[test]
    fn test_unterminated_block_reports_missing_brace() {
        let result = parse("btn { color: red;");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ParseErrorKind::MissingBrace);
        assert_eq!(result.errors[0].found, TokenKind::Eof);
    }

    #[test]
    fn test_error_converts_to_diagnostic() {
        let result = parse("{ }");
        let diagnostics = result.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "Q000");
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert!(diagnostics[0].hint.is_some());
    }

    #[test]
    fn test_rule_loc_spans_selector_to_brace() {
        let result = parse("  btn { color: red }");
        let rule = first_rule(&result);
        assert_eq!(rule.loc.start.offset, 2);
        assert_eq!(rule.loc.end.offset, 20);
    }

    #[test]
    fn test_parser_accepts_tokens_without_end_marker() {
        let mut tokens = lex("a { b: c }");
        tokens.pop();
        let result = Parser::new(tokens).parse();
        assert!(result.is_valid());
        assert_eq!(result.stylesheet.body.len(), 1);
    }
}
