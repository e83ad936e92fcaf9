//! Diagnostic taxonomy.
//!
//! Nothing in the core is fatal. Loading and converting always produce a
//! best-effort value plus a list of [`Diagnostic`]s for the caller to show.
//!
//! ```text
//! Diagnostic
//!  ├─ Config   line rejected by the rule-file grammar (line skipped)
//!  ├─ Decode   malformed escape/entity or unpaired surrogate (sentinel used)
//!  ├─ Encode   code point that has no 16-bit encoding (sentinel used)
//!  └─ Source   rule file missing or unreadable (fallback table used)
//! ```

use crate::codec::format_unicode_number;
use std::path::PathBuf;
use thiserror::Error;

/// Problems found while decoding 16-bit text into code points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid XML numeric character reference: {context}")]
    InvalidXmlNumeric { context: String },
    #[error("Unknown XML character entity reference: {context}")]
    UnknownXmlEntity { context: String },
    #[error("Invalid Java backslash hexadecimal number: {context}")]
    InvalidUnicodeEscape { context: String },
    #[error("Unknown Java backslash notation: {context}")]
    UnknownBackslash { context: String },
    #[error("Unpaired UTF-16 high surrogate: {} {}", unicode(.high), follower_text(.next))]
    UnpairedHigh { high: u32, next: Option<u32> },
    #[error("Unpaired UTF-16 low surrogate: {}", unicode(.0))]
    UnpairedLow(u32),
}

fn unicode(cp: &u32) -> String {
    format_unicode_number(*cp)
}

fn follower_text(next: &Option<u32>) -> String {
    match *next {
        Some(cp) => format!("followed by {}", format_unicode_number(cp)),
        None => "at end of input".to_string(),
    }
}

/// A code point that cannot be written as 16-bit text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid UTF-32 character number: 0x{0:x}")]
pub struct EncodeError(pub u32);

/// Why a configuration line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing command keyword or verb")]
    MissingKeyword,
    #[error("unknown command keyword or verb: {0}")]
    UnknownKeyword(String),
    #[error("missing space after command keyword or verb")]
    MissingSpace,
    #[error("invalid low-high range from {} to {}", unicode(.low), unicode(.high))]
    InvalidRange { low: u32, high: u32 },
    #[error("maximum Unicode character number is {}", format_unicode_number(crate::codec::MAX_CODE_POINT))]
    CodePointTooLarge,
    #[error("UTF-16 surrogate characters are reserved: {}", unicode(.0))]
    SurrogateReserved(u32),
    #[error("missing character number, range, or quoted string")]
    MissingLeftSide,
    #[error("first parameter or left side may not be empty")]
    EmptyLeftSide,
    #[error("unknown replace special action: {0}")]
    UnknownSpecial(String),
    #[error("missing character number or quoted string")]
    MissingRightSide,
    #[error("syntax error or unexpected input: {0}")]
    UnexpectedInput(String),
}

/// Anything worth telling the user about a load or a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A configuration line was skipped.
    #[error("Note: {error}\nConfiguration line {line}: {text}")]
    Config { line: usize, text: String, error: ConfigError },

    /// Decoding raised a problem; `line` is set when it came from a rule file.
    #[error("{}{error}", line_prefix(.line))]
    Decode { line: Option<usize>, error: DecodeError },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Configuration data file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Unable to read configuration data file: {}\n{message}", .path.display())]
    SourceUnreadable { path: PathBuf, message: String },
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|n| format!("Configuration line {n}: ")).unwrap_or_default()
}

impl From<DecodeError> for Diagnostic {
    fn from(error: DecodeError) -> Self {
        Diagnostic::Decode { line: None, error }
    }
}

impl Diagnostic {
    /// Line number in the rule file this diagnostic points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Diagnostic::Config { line, .. } => Some(*line),
            Diagnostic::Decode { line, .. } => *line,
            _ => None,
        }
    }
}
