//! Rule tables: compiling rule files and the built-in fallback.
//!
//! A rule file is UTF-8 text (an optional byte-order mark is ignored) with one
//! rule per line:
//!
//! ```text
//! # comment
//! accept  <left>
//! delete  <left>
//! replace <left> = <right>
//! replace <left> = <special> [<right>]
//! ```
//!
//! Loading never fails as a whole. A bad line is skipped and reported with its
//! line number; a missing or unreadable file is reported (unless it is the
//! default file, which may simply not exist). When nothing usable was loaded
//! the eight-rule [`fallback_table`] is installed instead.
//!
//! - `parser.rs`: the per-line grammar (`LineParser`).
//! - `source.rs`: reading a [`RuleSource`] into text.
//! - `fallback.rs`: the built-in smart-punctuation table.

#[path = "table/fallback.rs"]
mod fallback;
#[path = "table/parser.rs"]
mod parser;
#[path = "table/source.rs"]
mod source;


pub use fallback::fallback_table;
pub use source::{DEFAULT_RULES_FILE, RuleSource};

use crate::codec::Notation;
use crate::error::Diagnostic;
use crate::{Rule, RuleTable};
use parser::LineParser;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Compile rule-file text into rules, in line order.
///
/// Diagnostics name the 1-based line they came from. The fallback table is not
/// applied here; see [`load`].
pub fn parse_rules(text: &str, notation: Notation) -> (Vec<Rule>, Vec<Diagnostic>) {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut rules = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in split_lines(text).enumerate() {
        let line_number = idx + 1;
        match LineParser::new(line, notation).parse(line_number) {
            Ok(parsed) => {
                diagnostics
                    .extend(parsed.warnings.into_iter().map(|error| Diagnostic::Decode { line: Some(line_number), error }));
                rules.extend(parsed.rule);
            }
            Err(error) => {
                tracing::debug!(line = line_number, %error, "skipping rule line");
                diagnostics.push(Diagnostic::Config { line: line_number, text: line.to_string(), error });
            }
        }
    }

    (rules, diagnostics)
}

/// Lines ended by `\n`, `\r\n` or a lone `\r`. A final terminator does not start an empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let (line, tail) = match rest.find(['\n', '\r']) {
            Some(end) => {
                let width = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                (&rest[..end], &rest[end + width..])
            }
            None => (rest, ""),
        };
        rest = tail;
        Some(line)
    })
}

/// Read `source`, compile it, and fall back to the built-in table when empty.
pub(crate) fn load(source: &RuleSource<'_>, notation: Notation) -> (RuleTable, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut rules = Vec::new();

    match source.read() {
        Ok(Some(text)) => {
            let (parsed, parse_diagnostics) = parse_rules(&text, notation);
            rules = parsed;
            diagnostics.extend(parse_diagnostics);
        }
        Ok(None) => tracing::debug!(source = %source, "default rule file not present"),
        Err(diagnostic) => diagnostics.push(diagnostic),
    }

    if rules.is_empty() {
        tracing::info!(source = %source, "no rules loaded, using built-in table");
        return (fallback_table(), diagnostics);
    }

    tracing::info!(source = %source, rules = rules.len(), rejected = diagnostics.len(), "rule table loaded");
    (RuleTable::new(rules), diagnostics)
}
