use std::error;
use std::fmt;
use std::io;
use std::ops::Range;

/// A malformed or incomplete expression, with enough context to point at it
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    message: String,
    note: Option<String>,

    file: Option<String>,
    code: Option<String>,
    location: Option<(usize, Range<usize>)>,
}

impl SyntaxError {
    pub(crate) fn new(message: String) -> Self {
        Self {
            message,
            note: None,
            file: None,
            code: None,
            location: None,
        }
    }

    pub(crate) fn note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }

    /// Attach the name of the file the expression was read from
    pub fn file(mut self, file: String) -> Self {
        self.file = Some(file);
        self
    }

    /// Renumber the error's line, for input that was fed in one line at a time
    pub fn line(mut self, line: usize) -> Self {
        if let Some((l, _)) = &mut self.location {
            *l = line;
        }
        self
    }

    pub(crate) fn location(mut self, line: usize, r: Range<usize>) -> Self {
        self.location = Some((line, r));
        self
    }

    /// the text of the line `location` refers to
    pub(crate) fn code(mut self, code: String) -> Self {
        self.code = Some(code);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line and 0-based column range of the offending token
    pub fn position(&self) -> Option<(usize, Range<usize>)> {
        self.location.clone()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some((line, loc)) = &self.location {
            let filename = self.file.clone().unwrap_or("<input>".into());

            if let Some(code) = &self.code {
                let numspaces = " ".repeat(line.to_string().len());

                write!(f, "\n --> {filename}:{line}:{}\n", loc.start + 1)?;
                write!(f, "{numspaces} |\n")?;
                write!(f, "{line} | {}\n", code.trim_end())?;

                let spaces = " ".repeat(loc.start);
                let pointers = "^".repeat(loc.len().max(1));

                write!(f, "{numspaces} | {spaces}{pointers}")?;

                if let Some(note) = &self.note {
                    write!(f, " {note}")?;
                }
            } else {
                write!(f, " @ {filename}:{line}:{}", loc.start + 1)?;
            }
        }

        Ok(())
    }
}

impl error::Error for SyntaxError {}

/// Everything that can stop an evaluation session
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CalcError>;
