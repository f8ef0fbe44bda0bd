use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of characters that should read as a number
    Literal,
    /// A run of `<`, `>` and `=` characters
    Relation,
    /// An explicit `,` or `;` separator
    Separator,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Splits one delimited input line into tokens.
///
/// Whitespace only separates tokens. `,` and `;` are kept as [`TokenKind::Separator`]
/// so the parser can spot empty fields such as `1,,2`. Relation symbols end a
/// literal, so `3,2<=18` splits into five tokens.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, kind: TokenKind, keep: impl Fn(char) -> bool) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if keep(c) {
                self.advance();
            } else {
                break;
            }
        }
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            ',' | ';' => {
                self.advance();
                Token::new(
                    TokenKind::Separator,
                    Span::new(start, self.pos),
                    &self.source[start..self.pos],
                )
            }
            c if is_relation_char(c) => self.read_while(TokenKind::Relation, is_relation_char),
            _ => self.read_while(TokenKind::Literal, |c| {
                !c.is_whitespace() && !is_separator(c) && !is_relation_char(c)
            }),
        }
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c == ';'
}

fn is_relation_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        Lexer::tokenize(source).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_whitespace_delimited() {
        assert_eq!(texts("  1  0 <= 4 "), vec!["1", "0", "<=", "4", ""]);
        assert_eq!(
            kinds("1 0 <= 4"),
            vec![
                TokenKind::Literal,
                TokenKind::Literal,
                TokenKind::Relation,
                TokenKind::Literal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_glued_relation() {
        assert_eq!(texts("3,2<=18"), vec!["3", ",", "2", "<=", "18", ""]);
        assert_eq!(texts("1>=-5"), vec!["1", ">=", "-5", ""]);
    }

    #[test]
    fn test_semicolons_and_tabs() {
        assert_eq!(texts("1.5;\t-2e3 ; 7"), vec!["1.5", ";", "-2e3", ";", "7", ""]);
    }

    #[test]
    fn test_relation_runs_are_kept_whole() {
        assert_eq!(texts("1 =< 2"), vec!["1", "=<", "2", ""]);
        assert_eq!(texts("1 == 2"), vec!["1", "==", "2", ""]);
    }

    #[test]
    fn test_consecutive_separators() {
        assert_eq!(
            kinds("1,,2"),
            vec![
                TokenKind::Literal,
                TokenKind::Separator,
                TokenKind::Separator,
                TokenKind::Literal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = Lexer::tokenize("x≤ 4");
        assert_eq!(tokens[0].text, "x≤");
        assert_eq!(tokens[0].span, Span::new(0, 4));
        assert_eq!(tokens[1].span, Span::new(5, 6));
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(kinds("   "), vec![TokenKind::Eof]);
    }
}
