use crate::error::{CalcError, SyntaxError};

use std::fmt::{self, Display, Formatter};
use std::io::{BufRead, Cursor};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// A lexeme is a run of visible ASCII (`!` to `~`), or a single stray character
static LEXEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[!-~]+|[^\s]").expect("lexeme pattern is valid")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    Number(f64),
    Word(String),
    EndOfLine,
    EndOfStream,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Word(w) => write!(f, "{w}"),
            Self::EndOfLine => write!(f, "end of line"),
            Self::EndOfStream => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    t: TokenType,
    pub lexeme: String,
    pub line: usize,
    pub location: Range<usize>,
}

impl Token {
    pub fn new(t: TokenType, lexeme: String, line: usize, location: Range<usize>) -> Self {
        Self {
            t,
            lexeme,
            line,
            location,
        }
    }

    pub fn token(&self) -> TokenType {
        self.t.clone()
    }

    pub fn kind(&self) -> &TokenType {
        &self.t
    }

    fn parse(s: &str, line: usize, location: Range<usize>) -> Self {
        let t = if NUMBER.is_match(s) {
            // the pattern only admits literals `f64::from_str` accepts
            s.parse::<f64>().map(TokenType::Number).unwrap_or(TokenType::Word(s.to_string()))
        } else {
            TokenType::Word(s.to_string())
        };

        Self::new(t, s.to_string(), line, location)
    }
}

/// Splits a character stream into tokens, one line at a time.
///
/// Whitespace separates tokens. When the stream is line significant every
/// `\n` becomes an [`TokenType::EndOfLine`] token instead of whitespace.
/// Once the input is exhausted [`TokenType::EndOfStream`] is produced forever.
pub struct Tokenizer<R: BufRead> {
    reader: R,
    line_significant: bool,

    code: String,
    line: usize,
    offset: usize,
    pending_eol: bool,
    finished: bool,

    lookahead: Option<Token>,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R, line_significant: bool) -> Self {
        Self {
            reader,
            line_significant,
            code: String::new(),
            line: 0,
            offset: 0,
            pending_eol: false,
            finished: false,
            lookahead: None,
        }
    }

    /// Consume and return the next token
    pub fn next_token(&mut self) -> Result<Token, CalcError> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    /// Look at the next token without consuming it
    pub fn peek_token(&mut self) -> Result<&Token, CalcError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.scan()?,
        };

        Ok(self.lookahead.insert(token))
    }

    /// Build a syntax error pointing at `token` on the line being read
    pub fn error_at(&self, token: &Token, message: String) -> SyntaxError {
        SyntaxError::new(message)
            .location(token.line, token.location.clone())
            .code(self.code.clone())
    }

    fn scan(&mut self) -> Result<Token, CalcError> {
        loop {
            if self.finished {
                return Ok(self.end(TokenType::EndOfStream));
            }

            if let Some(mat) = LEXEME.find_at(&self.code, self.offset) {
                let (s, location) = (mat.as_str(), mat.range());
                self.offset = location.end;

                let token = Token::parse(s, self.line, self.column(location));

                if !s.starts_with(|c: char| ('!'..='~').contains(&c)) {
                    return Err(self.error_at(&token, format!("unexpected character {s:?}")).into());
                }

                return Ok(token);
            }

            if self.pending_eol {
                self.pending_eol = false;
                return Ok(self.end(TokenType::EndOfLine));
            }

            self.read_line()?;
        }
    }

    // the last line is kept at end of input so errors can still quote it
    fn read_line(&mut self) -> Result<(), CalcError> {
        let mut code = String::new();

        if self.reader.read_line(&mut code)? == 0 {
            self.finished = true;
        } else {
            self.code = code;
            self.offset = 0;
            self.line += 1;
            self.pending_eol = self.line_significant && self.code.ends_with('\n');
        }

        Ok(())
    }

    /// byte range to char columns, so carets line up on non-ASCII lines
    fn column(&self, r: Range<usize>) -> Range<usize> {
        let start = self.code[..r.start].chars().count();
        start..start + self.code[r].chars().count()
    }

    fn end(&self, t: TokenType) -> Token {
        let col = self.code.trim_end_matches(['\n', '\r']).chars().count();
        Token::new(t, String::new(), self.line.max(1), col..col)
    }
}

impl std::str::FromStr for Tokenizer<Cursor<String>> {
    type Err = ();

    /// Tokenize a string in stream mode
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tokenizer::new(Cursor::new(s.to_string()), false))
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = Result<Token, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.t == TokenType::EndOfStream => None,
            other => Some(other),
        }
    }
}
