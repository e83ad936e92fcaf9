use crate::error::Diagnostic;
use std::borrow::Cow;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Rule file looked for in the working directory when none is named.
pub const DEFAULT_RULES_FILE: &str = "plaintext.txt";

/// Where rule text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource<'a> {
    /// [`DEFAULT_RULES_FILE`]; silently absent is fine.
    DefaultFile,
    /// A file the user asked for; absence is reported.
    File(&'a Path),
    /// Rule text already in memory.
    Text(&'a str),
}

impl RuleSource<'_> {
    /// Read the source as text.
    ///
    /// `Ok(None)` means the default file does not exist. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub(crate) fn read(&self) -> Result<Option<Cow<'_, str>>, Diagnostic> {
        let path = match self {
            RuleSource::Text(text) => return Ok(Some(Cow::Borrowed(*text))),
            RuleSource::DefaultFile => Path::new(DEFAULT_RULES_FILE),
            RuleSource::File(path) => *path,
        };

        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()))),
            Err(err) if err.kind() == ErrorKind::NotFound => match self {
                RuleSource::DefaultFile => Ok(None),
                _ => Err(Diagnostic::SourceNotFound { path: absolute(path) }),
            },
            Err(err) => Err(Diagnostic::SourceUnreadable { path: absolute(path), message: err.to_string() }),
        }
    }
}

/// Resolve against the working directory so messages say where we looked.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl fmt::Display for RuleSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::DefaultFile => f.write_str(DEFAULT_RULES_FILE),
            RuleSource::File(path) => write!(f, "{}", path.display()),
            RuleSource::Text(_) => f.write_str("<inline rules>"),
        }
    }
}
