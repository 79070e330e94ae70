//! QuantCSS lexer
//!
//! Tokenizes `.qs` source into a flat stream of tokens with positions.
//! Lexing never fails: input it does not understand degrades to one-character
//! identifier tokens, and the parser decides what is acceptable.
//!
//! The interesting part is the "selector chunk": a maximal run of
//! selector-safe characters (`A-Za-z0-9_-:/.%!`) merged into one token, with
//! bracketed arbitrary values (`w-[calc(100%-2px)]`, `content-['a]b']`) swallowed
//! whole. Utility selectors are therefore usually a single token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the source: byte offset plus 1-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of the first character of a source
    pub const fn origin() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,
    Bang,
    At,
    Hash,
    Number,
    /// Number followed by a unit (`12px`, `50%`)
    Dimension,
    String,
    /// Identifier immediately followed by `(`; the `(` is part of the token
    Function,
    Ident,
    /// Run of selector-safe characters that is not a plain identifier
    SelectorChunk,
    Whitespace,
    Eof,
}

impl TokenKind {
    /// Tokens dropped before parsing
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Bang => "'!'",
            TokenKind::At => "'@'",
            TokenKind::Hash => "'#'",
            TokenKind::Number => "number",
            TokenKind::Dimension => "dimension",
            TokenKind::String => "string",
            TokenKind::Function => "function",
            TokenKind::Ident => "identifier",
            TokenKind::SelectorChunk => "selector",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A token with its decoded value, exact source text and span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Decoded payload (string contents without quotes or escapes, number with unit, ...)
    pub value: Option<String>,
    /// Exact source slice
    pub raw: Option<String>,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, start: Position, end: Position) -> Self {
        Self {
            kind,
            value: None,
            raw: None,
            start,
            end,
        }
    }

    fn with_text(
        kind: TokenKind,
        start: Position,
        end: Position,
        value: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            raw: Some(raw.into()),
            start,
            end,
        }
    }

    /// Source text of the token, falling back to its decoded value
    pub fn text(&self) -> &str {
        self.raw
            .as_deref()
            .or(self.value.as_deref())
            .unwrap_or_default()
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '-' || ch == '.'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Characters that may appear in a utility selector outside brackets
pub fn is_selector_safe(ch: char) -> bool {
    is_ident_char(ch) || matches!(ch, ':' | '/' | '.' | '%' | '!')
}

fn is_unit_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '%'
}

/// Streaming lexer over a `.qs` source
///
/// Yields every token including whitespace; the end marker is not yielded by
/// the iterator (see [`lex`]).
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    last_significant: Option<TokenKind>,
    /// Open `(` count; reset at statement boundaries
    paren_depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
            last_significant: None,
            paren_depth: 0,
        }
    }

    /// Current position of the cursor
    pub fn cursor(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.offset..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn slice_from(&self, start: Position) -> &'a str {
        &self.input[start.offset..self.offset]
    }

    fn punct(&mut self, kind: TokenKind, start: Position) -> Token {
        self.bump();
        let raw = self.slice_from(start);
        Token {
            kind,
            value: None,
            raw: Some(raw.to_string()),
            start,
            end: self.cursor(),
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        self.bump();
        self.bump();
        while let Some(ch) = self.peek() {
            if ch == '*' && self.peek_nth(1) == Some('/') {
                self.bump();
                self.bump();
                return;
            }
            self.bump();
        }
    }

    /// `//` right after `:`, `(` or a function opener, or anywhere inside
    /// parentheses, is part of a URL, not a comment
    fn at_line_comment(&self) -> bool {
        self.peek() == Some('/')
            && self.peek_nth(1) == Some('/')
            && self.paren_depth == 0
            && !matches!(
                self.last_significant,
                Some(TokenKind::Colon | TokenKind::LParen | TokenKind::Function)
            )
    }

    fn at_block_comment(&self) -> bool {
        self.peek() == Some('/') && self.peek_nth(1) == Some('*')
    }

    fn lex_whitespace(&mut self, start: Position) -> Token {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
        let raw = self.slice_from(start);
        Token::with_text(TokenKind::Whitespace, start, self.cursor(), raw, raw)
    }

    fn lex_string(&mut self, start: Position) -> Token {
        let quote = self.bump().unwrap_or('"');
        let mut value = String::new();

        while let Some(ch) = self.bump() {
            if ch == '\\' {
                if let Some(escaped) = self.bump() {
                    value.push(escaped);
                }
                continue;
            }
            if ch == quote {
                break;
            }
            value.push(ch);
        }

        let raw = self.slice_from(start);
        Token::with_text(TokenKind::String, start, self.cursor(), value, raw)
    }

    fn lex_number(&mut self, start: Position) -> Token {
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        while self.peek().is_some_and(is_digit) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(is_digit) {
            self.bump();
            while self.peek().is_some_and(is_digit) {
                self.bump();
            }
        }

        let kind = if self.peek().is_some_and(is_unit_char) {
            while self.peek().is_some_and(is_unit_char) {
                self.bump();
            }
            TokenKind::Dimension
        } else {
            TokenKind::Number
        };

        let raw = self.slice_from(start);
        Token::with_text(kind, start, self.cursor(), raw, raw)
    }

    /// Consume a quoted run verbatim, honouring backslash escapes
    fn skip_quoted(&mut self, quote: char) {
        self.bump();
        while let Some(ch) = self.bump() {
            if ch == '\\' {
                self.bump();
                continue;
            }
            if ch == quote {
                break;
            }
        }
    }

    /// Consume a `[...]` segment as a unit
    ///
    /// Bracket depth and parenthesis depth are tracked separately; brackets
    /// inside a parenthesised group do not count, and quoted strings at either
    /// level are skipped without touching either counter.
    fn consume_bracketed(&mut self) {
        self.bump();
        let mut brackets = 1usize;
        let mut parens = 0usize;

        while let Some(ch) = self.peek() {
            match ch {
                '\'' | '"' => {
                    self.skip_quoted(ch);
                    continue;
                }
                '(' => parens += 1,
                ')' => parens = parens.saturating_sub(1),
                '[' if parens == 0 => brackets += 1,
                ']' if parens == 0 => brackets -= 1,
                _ => {}
            }
            self.bump();
            if brackets == 0 {
                break;
            }
        }
    }

    /// Identifier, function opener or selector chunk
    fn lex_word(&mut self, start: Position) -> Token {
        let rest = &self.input[self.offset..];
        let ident_len = rest
            .char_indices()
            .find(|&(_, ch)| !is_ident_char(ch))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());

        if ident_len > 0 && rest[ident_len..].starts_with('(') {
            let name = &rest[..ident_len];
            for _ in 0..=name.chars().count() {
                self.bump();
            }
            let raw = self.slice_from(start);
            return Token::with_text(TokenKind::Function, start, self.cursor(), name, raw);
        }

        while let Some(ch) = self.peek() {
            if ch == '[' {
                self.consume_bracketed();
                continue;
            }
            if !is_selector_safe(ch) && ch != ']' {
                break;
            }
            // A comment glued to a word ends it; `//` inside parentheses is a URL
            if self.at_block_comment()
                || (ch == '/' && self.peek_nth(1) == Some('/') && self.paren_depth == 0)
            {
                break;
            }
            self.bump();
        }

        let raw = self.slice_from(start);
        let kind = if raw.chars().all(is_ident_char) {
            TokenKind::Ident
        } else {
            TokenKind::SelectorChunk
        };
        Token::with_text(kind, start, self.cursor(), raw, raw)
    }

    /// Produce the next token, or `None` once the input is exhausted
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            let ch = self.peek()?;

            if self.at_line_comment() {
                self.skip_line_comment();
                continue;
            }
            if self.at_block_comment() {
                self.skip_block_comment();
                continue;
            }

            let start = self.cursor();
            let token = match ch {
                c if c.is_whitespace() => return Some(self.lex_whitespace(start)),
                '{' => self.punct(TokenKind::LBrace, start),
                '}' => self.punct(TokenKind::RBrace, start),
                '(' => self.punct(TokenKind::LParen, start),
                ')' => self.punct(TokenKind::RParen, start),
                '[' => self.punct(TokenKind::LBracket, start),
                ']' => self.punct(TokenKind::RBracket, start),
                ':' => self.punct(TokenKind::Colon, start),
                ';' => self.punct(TokenKind::Semicolon, start),
                ',' => self.punct(TokenKind::Comma, start),
                '!' => self.punct(TokenKind::Bang, start),
                '@' => self.punct(TokenKind::At, start),
                '#' => {
                    self.bump();
                    Token::with_text(TokenKind::Hash, start, self.cursor(), "#", "#")
                }
                '\'' | '"' => self.lex_string(start),
                c if is_digit(c)
                    || (matches!(c, '+' | '-') && self.peek_nth(1).is_some_and(is_digit)) =>
                {
                    self.lex_number(start)
                }
                c if is_ident_start(c) => self.lex_word(start),
                _ => {
                    self.bump();
                    let raw = self.slice_from(start);
                    Token::with_text(TokenKind::Ident, start, self.cursor(), raw, raw)
                }
            };

            match token.kind {
                TokenKind::Function | TokenKind::LParen => self.paren_depth += 1,
                TokenKind::RParen => self.paren_depth = self.paren_depth.saturating_sub(1),
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => self.paren_depth = 0,
                _ => {}
            }
            self.last_significant = Some(token.kind);
            return Some(token);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Lex a source into parser-ready tokens
///
/// Whitespace is dropped and the stream is terminated by an [`TokenKind::Eof`]
/// token positioned at the end of the input.
pub fn lex(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens: Vec<Token> = lexer.by_ref().filter(|t| !t.kind.is_trivia()).collect();
    let end = lexer.cursor();
    tokens.push(Token::new(TokenKind::Eof, end, end));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_rule() {
        assert_eq!(
            kinds("btn { color: red; }"),
            vec![
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::SelectorChunk,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_variant_selector_is_single_chunk() {
        let tokens = lex("md:hover:bg-red{}");
        assert_eq!(tokens[0].kind, TokenKind::SelectorChunk);
        assert_eq!(tokens[0].text(), "md:hover:bg-red");
    }

    #[test]
    fn test_bracketed_arbitrary_value() {
        let input = "bg-[url('a]b.png')]:hover w-[calc(100%-[2px])] {";
        let tokens = lex(input);
        assert_eq!(tokens[0].text(), "bg-[url('a]b.png')]:hover");
        assert_eq!(tokens[1].text(), "w-[calc(100%-[2px])]");
        assert_eq!(tokens[2].kind, TokenKind::LBrace);
    }

    #[test]
    fn test_nested_brackets() {
        let tokens = lex("grid-cols-[[a]_1fr] {");
        assert_eq!(tokens[0].text(), "grid-cols-[[a]_1fr]");
    }

    #[test]
    fn test_function_token() {
        let tokens = lex("rgb(0, 0, 0)");
        assert_eq!(tokens[0].kind, TokenKind::Function);
        assert_eq!(tokens[0].value.as_deref(), Some("rgb"));
        assert_eq!(tokens[0].text(), "rgb(");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[2].kind, TokenKind::Comma);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_numbers_and_dimensions() {
        let tokens = lex("12 1.5rem -4px 50% +3");
        let summary: Vec<_> = tokens
            .iter()
            .map(|t| (t.kind, t.value.clone().unwrap_or_default()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Number, "12".to_string()),
                (TokenKind::Dimension, "1.5rem".to_string()),
                (TokenKind::Dimension, "-4px".to_string()),
                (TokenKind::Dimension, "50%".to_string()),
                (TokenKind::Number, "+3".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex(r#""a\"b""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value.as_deref(), Some("a\"b"));
        assert_eq!(tokens[0].raw.as_deref(), Some(r#""a\"b""#));
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "// line\nbtn /* block\n comment */ {}";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_protocol_relative_url_is_not_a_comment() {
        let tokens = lex("url(//cdn/x.png)");
        let text: String = tokens.iter().map(|t| t.text()).collect();
        assert_eq!(text, "url(//cdn/x.png)");
    }

    #[test]
    fn test_end_marker_position() {
        let input = "a {\n  b: c;\n}";
        let tokens = lex(input);
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.start.offset, input.len());
        assert_eq!(eof.start.line, 3);
        assert_eq!(eof.start.column, 2);
    }

    #[test]
    fn test_unknown_characters_degrade_to_idents() {
        let tokens = lex("& > ~ ¿");
        assert!(
            tokens[..tokens.len() - 1]
                .iter()
                .all(|t| t.kind == TokenKind::Ident)
        );
        assert_eq!(tokens[0].text(), "&");
        assert_eq!(tokens[3].text(), "¿");
    }

    #[test]
    fn test_positions_track_lines() {
        let tokens = lex("a\n  b");
        assert_eq!(tokens[1].start, Position::new(4, 2, 3));
    }

    #[test]
    fn test_streaming_lexer_keeps_whitespace() {
        let input = "hover:bg-red {\n  color: #fff;\n}";
        let text: String = Lexer::new(input).map(|t| t.text().to_string()).collect();
        assert_eq!(text, input);
    }

    fn words(input: &str) -> Vec<String> {
        lex(input)
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::SelectorChunk))
            .map(|t| t.text().to_string())
            .collect()
    }

    #[test]
    fn test_block_comment_glued_to_word() {
        assert_eq!(words("btn/* note */ {}"), vec!["btn"]);
        assert_eq!(words("md:p-4/**/{}"), vec!["md:p-4"]);
        assert_eq!(words("color: red/* brand */;"), vec!["color", "red"]);
    }

    #[test]
    fn test_line_comment_glued_to_word() {
        assert_eq!(words("red// x\n"), vec!["red"]);
        assert_eq!(words("w-1/2// half\n{}"), vec!["w-1/2"]);
    }

    #[test]
    fn test_double_slash_inside_function_is_kept() {
        let tokens = lex("url(https://cdn.example/a.png)");
        let text: String = tokens.iter().map(|t| t.text()).collect();
        assert_eq!(text, "url(https://cdn.example/a.png)");
    }
}
