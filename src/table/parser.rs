//! Line grammar for rule files.
//!
//! Each line is compiled on its own by a [`LineParser`], a cursor over the
//! line that consumes one token at a time. Every token pattern is anchored at
//! the cursor (`^` against the unread rest of the line), so a match never
//! re-scans text that was already consumed.
//!
//! ```text
//! line    ::= WS* ('#' ...)?                              (blank / comment)
//!           | keyword WS left ('=' right)? WS* ('#' ...)?
//! keyword ::= accept | delete | replace                   (case-insensitive)
//! left    ::= num ('..' | ':') num | item (WS item)*
//! right   ::= special? (WS item)* | item (WS item)*
//! item    ::= num | '"' chars '"'
//! num     ::= [0-9]+ | U+hex | 0xhex
//! ```
//!
//! ## Invariants
//!
//! - A line produces either one complete [`Rule`] or one [`ConfigError`];
//!   never a partial rule.
//! - Literal code points (bare numbers) are never surrogates and never exceed
//!   [`MAX_CODE_POINT`]. Range endpoints are only bounded, not surrogate-checked.
//! - Decode problems inside quoted strings are reported but do not reject the
//!   line; the sentinel takes the place of the bad text.

use crate::codec::{self, MAX_CODE_POINT, Notation};
use crate::error::{ConfigError, DecodeError};
use crate::{Action, Pattern, Rule};
use regex::{Captures, Regex};

/// Token patterns. `[[:space:]]` is ASCII whitespace only.
fn comment() -> &'static Regex {
    regex!(r"^[[:space:]]*(?:#.*)?$")
}

fn equal_sign() -> &'static Regex {
    regex!(r"^[[:space:]]*=")
}

/// At least two characters, so the `U` of `U+nnnn` is never a keyword.
fn keyword() -> &'static Regex {
    regex!(r"^[[:space:]]*([A-Za-z][0-9A-Za-z]+)")
}

fn space() -> &'static Regex {
    regex!(r"^[[:space:]]+")
}

fn number() -> &'static Regex {
    regex!(r"^[[:space:]]*(?:(?:[Uu]\+|0[Xx])([0-9A-Fa-f]+)|([0-9]+))")
}

fn range() -> &'static Regex {
    regex!(
        r"^[[:space:]]*(?:(?:[Uu]\+|0[Xx])([0-9A-Fa-f]+)|([0-9]+))[[:space:]]*(?:\.\.|:)[[:space:]]*(?:(?:[Uu]\+|0[Xx])([0-9A-Fa-f]+)|([0-9]+))"
    )
}

fn quoted(notation: Notation) -> &'static Regex {
    if notation.contains(Notation::BACKSLASH) {
        // A backslash may hide a quote.
        regex!(r#"^[[:space:]]*"((?:\\.|[^"])*)""#)
    } else {
        regex!(r#"^[[:space:]]*"([^"]*)""#)
    }
}

/// Outcome of compiling one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedLine {
    /// `None` for blank and comment-only lines.
    pub rule: Option<Rule>,
    /// Decode problems from quoted strings (the rule is still valid).
    pub warnings: Vec<DecodeError>,
}

pub(crate) struct LineParser<'a> {
    line: &'a str,
    pos: usize,
    notation: Notation,
    warnings: Vec<DecodeError>,
}

impl<'a> LineParser<'a> {
    pub(crate) fn new(line: &'a str, notation: Notation) -> Self {
        Self { line, pos: 0, notation, warnings: Vec::new() }
    }

    /// Compile the whole line into at most one rule.
    pub(crate) fn parse(mut self, line_number: usize) -> Result<ParsedLine, ConfigError> {
        if self.eat(comment()).is_some() {
            return Ok(ParsedLine { rule: None, warnings: Vec::new() });
        }

        let verb = self.eat(keyword()).ok_or(ConfigError::MissingKeyword)?[1].to_ascii_lowercase();
        let (mut action, mut right) = match verb.as_str() {
            "accept" => (Action::Accept, None),
            "delete" => (Action::Replace, Some(String::new())),
            "replace" => (Action::Replace, None),
            _ => return Err(ConfigError::UnknownKeyword(verb)),
        };
        self.eat(space()).ok_or(ConfigError::MissingSpace)?;

        let pattern = self.left_side()?;

        if verb == "replace" {
            let (special, text) = self.right_side()?;
            action = special.unwrap_or(Action::Replace);
            right = text;
        }

        if self.eat(comment()).is_none() {
            return Err(self.unexpected());
        }

        Ok(ParsedLine { rule: Some(Rule { action, pattern, right, line: Some(line_number) }), warnings: self.warnings })
    }

    /// Match `re` at the cursor and advance past it.
    fn eat(&mut self, re: &Regex) -> Option<Captures<'a>> {
        let line = self.line;
        let rest = &line[self.pos..];
        let caps = re.captures(rest)?;
        self.pos += caps.get(0).map_or(0, |m| m.end());
        Some(caps)
    }

    fn unexpected(&self) -> ConfigError {
        ConfigError::UnexpectedInput(self.line[self.pos..].to_string())
    }

    /// A low-high range, or one or more items.
    fn left_side(&mut self) -> Result<Pattern, ConfigError> {
        if let Some(caps) = self.eat(range()) {
            let low = parse_number(&caps, 1, 2);
            let high = parse_number(&caps, 3, 4);
            // Endpoints may be surrogates; only literals are checked for that.
            return if low <= high && high <= MAX_CODE_POINT {
                Ok(Pattern::Range { low, high })
            } else {
                Err(ConfigError::InvalidRange { low, high })
            };
        }

        let (count, code_points) = self.items(false)?;
        if count == 0 {
            Err(ConfigError::MissingLeftSide)
        } else if code_points.is_empty() {
            Err(ConfigError::EmptyLeftSide)
        } else {
            Ok(Pattern::Sequence(code_points))
        }
    }

    /// `= [special] [items]`. Returns the special action, if any, and the right text.
    fn right_side(&mut self) -> Result<(Option<Action>, Option<String>), ConfigError> {
        if self.eat(equal_sign()).is_none() {
            return Err(self.unexpected());
        }

        let special = match self.eat(keyword()) {
            Some(caps) => {
                let word = caps[1].to_ascii_lowercase();
                Some(Action::from_special(&word).ok_or(ConfigError::UnknownSpecial(word))?)
            }
            None => None,
        };

        let (count, code_points) = self.items(special.is_some())?;
        if count > 0 {
            // Bare numbers were validated and decoding only yields valid code points.
            let (text, _) = codec::encode(&code_points);
            Ok((special, Some(text)))
        } else if special.is_some() {
            Ok((special, None))
        } else {
            Err(ConfigError::MissingRightSide)
        }
    }

    /// Whitespace-separated numbers and quoted strings, concatenated.
    ///
    /// Stops quietly at the first thing that is not an item; the caller decides
    /// whether what follows is acceptable.
    fn items(&mut self, space_first: bool) -> Result<(usize, Vec<u32>), ConfigError> {
        let mut count = 0;
        let mut code_points = Vec::new();
        loop {
            if (count > 0 || space_first) && self.eat(space()).is_none() {
                break;
            }

            if let Some(caps) = self.eat(number()) {
                count += 1;
                code_points.push(literal_code_point(parse_number(&caps, 1, 2))?);
            } else if let Some(caps) = self.eat(quoted(self.notation)) {
                count += 1;
                let decoded = codec::decode(&caps[1], self.notation);
                code_points.extend(decoded.code_points);
                self.warnings.extend(decoded.diagnostics);
            } else {
                break;
            }
        }
        Ok((count, code_points))
    }
}

/// Read a number from whichever of the hex/decimal groups matched.
///
/// Values too large for 32 bits saturate, which every caller rejects.
fn parse_number(caps: &Captures<'_>, hex_group: usize, decimal_group: usize) -> u32 {
    let parsed = match (caps.get(hex_group), caps.get(decimal_group)) {
        (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16),
        (None, Some(decimal)) => decimal.as_str().parse::<u32>(),
        (None, None) => return u32::MAX,
    };
    parsed.unwrap_or(u32::MAX)
}

fn literal_code_point(value: u32) -> Result<u32, ConfigError> {
    if value > MAX_CODE_POINT {
        Err(ConfigError::CodePointTooLarge)
    } else if codec::is_surrogate(value) {
        Err(ConfigError::SurrogateReserved(value))
    } else {
        Ok(value)
    }
}
