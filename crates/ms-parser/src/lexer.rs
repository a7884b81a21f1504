use ms_core::{ModScriptError, SourceLocation, SourceSpan};

use crate::grammar::{Grammar, Keyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    Comma,
    Colon,
}

impl Punct {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Colon => ":",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    String,
    Number,
    Operator(Operator),
    Punct(Punct),
    Comment,
    EndOfInput,
}

/// For string literals `lexeme` holds the unescaped contents, for comments
/// the text after `#`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

impl Token {
    /// Human-readable form used in syntax errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Keyword(keyword) => keyword.to_string(),
            TokenKind::Identifier => format!("identifier '{}'", self.lexeme),
            TokenKind::String => format!("string \"{}\"", self.lexeme),
            TokenKind::Number => format!("number {}", self.lexeme),
            TokenKind::Operator(op) => format!("'{}'", op.as_str()),
            TokenKind::Punct(punct) => format!("'{}'", punct.as_str()),
            TokenKind::Comment => "comment".to_string(),
            TokenKind::EndOfInput => "end of input".to_string(),
        }
    }
}

/// Lazy token stream. Yields `EndOfInput` once, then `None`; a lex error is
/// also terminal.
pub struct Lexer<'a> {
    grammar: &'a Grammar,
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// A leading UTF-8 byte-order mark is skipped; positions start after it.
    pub fn new(source: &'a str, grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            source: source.strip_prefix('\u{FEFF}').unwrap_or(source),
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.offset..].chars().nth(1)
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

    fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan {
            start,
            end: self.location(),
        }
    }

    fn token(&self, kind: TokenKind, lexeme: impl Into<String>, start: SourceLocation) -> Token {
        Token {
            kind,
            lexeme: lexeme.into(),
            span: self.span_from(start),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn lex_token(&mut self) -> Result<Token, ModScriptError> {
        loop {
            self.skip_whitespace();
            let start = self.location();
            let Some(ch) = self.peek() else {
                return Ok(self.token(TokenKind::EndOfInput, "", start));
            };

            if ch == '#' {
                let text = self.lex_comment();
                if self.grammar.retain_comments {
                    return Ok(self.token(TokenKind::Comment, text, start));
                }
                continue;
            }

            let token = match ch {
                '"' => self.lex_string(start)?,
                c if c.is_ascii_digit() => self.lex_number(start),
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(start),
                _ => self.lex_symbol(start)?,
            };
            return Ok(token);
        }
    }

    fn lex_comment(&mut self) -> String {
        self.bump();
        let begin = self.offset;
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
        self.source[begin..self.offset].trim().to_string()
    }

    fn lex_string(&mut self, start: SourceLocation) -> Result<Token, ModScriptError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ModScriptError::lex(
                        "LEX_UNTERMINATED_STRING",
                        "String literal is not terminated.",
                        self.span_from(start),
                    ));
                }
                Some('"') => break,
                Some('\\') => {
                    let escape_at = self.location();
                    let escaped = match self.bump() {
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        other => {
                            let shown = other.map(String::from).unwrap_or_default();
                            return Err(ModScriptError::lex(
                                "LEX_INVALID_ESCAPE",
                                format!("Invalid escape sequence \"\\{}\".", shown),
                                SourceSpan::at(escape_at),
                            ));
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }
        Ok(self.token(TokenKind::String, value, start))
    }

    fn lex_number(&mut self, start: SourceLocation) -> Token {
        let begin = self.offset;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let lexeme = &self.source[begin..self.offset];
        self.token(TokenKind::Number, lexeme, start)
    }

    fn lex_word(&mut self, start: SourceLocation) -> Token {
        let begin = self.offset;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let word = &self.source[begin..self.offset];
        let kind = match self.grammar.keyword(word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        };
        self.token(kind, word, start)
    }

    fn lex_symbol(&mut self, start: SourceLocation) -> Result<Token, ModScriptError> {
        let begin = self.offset;
        let ch = self.bump().unwrap_or_default();
        let followed_by_eq = self.peek() == Some('=');
        let kind = match ch {
            '(' => TokenKind::Punct(Punct::LParen),
            ')' => TokenKind::Punct(Punct::RParen),
            ',' => TokenKind::Punct(Punct::Comma),
            ':' => TokenKind::Punct(Punct::Colon),
            '+' => TokenKind::Operator(Operator::Plus),
            '-' => TokenKind::Operator(Operator::Minus),
            '*' => TokenKind::Operator(Operator::Star),
            '/' => TokenKind::Operator(Operator::Slash),
            '%' => TokenKind::Operator(Operator::Percent),
            '=' if followed_by_eq => {
                self.bump();
                TokenKind::Operator(Operator::Eq)
            }
            '=' => TokenKind::Operator(Operator::Assign),
            '!' if followed_by_eq => {
                self.bump();
                TokenKind::Operator(Operator::NotEq)
            }
            '<' if followed_by_eq => {
                self.bump();
                TokenKind::Operator(Operator::LessEq)
            }
            '<' => TokenKind::Operator(Operator::Less),
            '>' if followed_by_eq => {
                self.bump();
                TokenKind::Operator(Operator::GreaterEq)
            }
            '>' => TokenKind::Operator(Operator::Greater),
            other => {
                return Err(ModScriptError::lex(
                    "LEX_UNEXPECTED_CHAR",
                    format!("Unexpected character '{}'.", other),
                    self.span_from(start),
                ));
            }
        };
        let lexeme = &self.source[begin..self.offset];
        Ok(self.token(kind, lexeme, start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ModScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.lex_token() {
            Ok(token) => {
                if token.kind == TokenKind::EndOfInput {
                    self.finished = true;
                }
                Some(Ok(token))
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

pub fn tokenize(source: &str, grammar: &Grammar) -> Result<Vec<Token>, ModScriptError> {
    Lexer::new(source, grammar).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarVersion;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, &Grammar::default())
            .expect("lex should pass")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lexes_call_with_string_arguments() {
        let tokens = tokenize(
            r#"Copy("readme.txt", "Data\\readme.txt")"#,
            &Grammar::default(),
        )
        .expect("lex should pass");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "Copy");
        assert_eq!(tokens[2].lexeme, "readme.txt");
        assert_eq!(tokens[4].lexeme, "Data\\readme.txt");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let tokens = tokenize("\u{FEFF}Warn(\"hi\")\n", &Grammar::default())
            .expect("BOM-prefixed source should lex");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "Warn");
        assert_eq!(tokens[0].span.start.line, 1);
        assert_eq!(tokens[0].span.start.column, 1);

        let error = tokenize("Warn(\"hi\")\u{FEFF}", &Grammar::default())
            .expect_err("a BOM elsewhere is still a stray character");
        assert_eq!(error.code, "LEX_UNEXPECTED_CHAR");
    }

    #[test]
    fn two_character_operators_win_over_single() {
        assert_eq!(
            kinds("a <= b == c != d >= e = f"),
            vec![
                TokenKind::Identifier,
                TokenKind::Operator(Operator::LessEq),
                TokenKind::Identifier,
                TokenKind::Operator(Operator::Eq),
                TokenKind::Identifier,
                TokenKind::Operator(Operator::NotEq),
                TokenKind::Identifier,
                TokenKind::Operator(Operator::GreaterEq),
                TokenKind::Identifier,
                TokenKind::Operator(Operator::Assign),
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn keywords_depend_on_grammar_version() {
        let v1 = Grammar::new(GrammarVersion::V1);
        let tokens = tokenize("while If", &v1).expect("lex should pass");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::If));
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("x = 1\n  y = 2.5", &Grammar::default()).expect("lex");
        let y = &tokens[3];
        assert_eq!(y.lexeme, "y");
        assert_eq!(y.span.start, SourceLocation { line: 2, column: 3 });
        assert_eq!(tokens[5].lexeme, "2.5");
    }

    #[test]
    fn comments_are_skipped_unless_retained() {
        assert_eq!(
            kinds("# note\nx"),
            vec![TokenKind::Identifier, TokenKind::EndOfInput]
        );
        let grammar = Grammar {
            retain_comments: true,
            ..Grammar::default()
        };
        let tokens = tokenize("# install the core files\nx", &grammar).expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].lexeme, "install the core files");
    }

    #[test]
    fn unterminated_string_reports_start_position() {
        let error = tokenize("x = \"open\ny = 1", &Grammar::default())
            .expect_err("lex should fail");
        assert_eq!(error.code, "LEX_UNTERMINATED_STRING");
        let span = error.span.expect("span");
        assert_eq!(span.start, SourceLocation { line: 1, column: 5 });
    }

    #[test]
    fn invalid_escape_and_unexpected_character_fail() {
        let escape = tokenize(r#""bad \q""#, &Grammar::default()).expect_err("escape");
        assert_eq!(escape.code, "LEX_INVALID_ESCAPE");
        let symbol = tokenize("x = 1 $ 2", &Grammar::default()).expect_err("symbol");
        assert_eq!(symbol.code, "LEX_UNEXPECTED_CHAR");
        assert_eq!(
            symbol.span.map(|s| s.start),
            Some(SourceLocation { line: 1, column: 7 })
        );
    }

    #[test]
    fn stream_ends_after_error() {
        let grammar = Grammar::default();
        let mut lexer = Lexer::new("@ x", &grammar);
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }
}
