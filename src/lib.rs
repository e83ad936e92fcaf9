extern crate self as plaintext;

#[macro_use]
mod macros;
mod api;
pub mod captions;
pub mod codec;
mod engine;
mod error;
mod table;

pub use api::{
    ConvertDetails, ConvertResult, ConvertResultVerbose, LoadResult, Options, RuleHit, SharedTable, convert,
    convert_verbose, convert_with, load_rules,
};
pub use codec::{Notation, format_unicode_number};
pub use engine::{CompiledRules, Converter, CustomFormatter, RuleId, RuleIndex, RunMetrics, RunResult};
pub use error::{ConfigError, DecodeError, Diagnostic, EncodeError};
pub use table::{DEFAULT_RULES_FILE, RuleSource, fallback_table, parse_rules};

// --- Rule model --------------------------------------------------------------

/// What a rule does with the text it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Copy the matched text unchanged.
    Accept,
    /// Emit the rule's right side (possibly empty).
    Replace,
    /// `<U+XXXX ... right>`; a template for caller-specific annotation.
    Custom,
    /// `<decimal>` per code point.
    DecimalRef,
    /// `<HEX>` per code point.
    HexRef,
    /// `\uXXXX` per 16-bit unit.
    EscapedUtf16,
    /// `<octal>` per code point.
    OctalRef,
    /// `<U+XXXX>` per code point.
    UnicodeRef,
    /// `&#decimal;` per code point.
    XmlDecimalRef,
    /// `&#xHEX;` per code point.
    XmlHexRef,
}

impl Action {
    /// Map a `replace ... = <keyword>` special action (already lowercased).
    pub fn from_special(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "custom" => Action::Custom,
            "decnum" => Action::DecimalRef,
            "hexnum" => Action::HexRef,
            "java16" => Action::EscapedUtf16,
            "octnum" => Action::OctalRef,
            "uninum" => Action::UnicodeRef,
            "xmldec" => Action::XmlDecimalRef,
            "xmlhex" => Action::XmlHexRef,
            _ => return None,
        })
    }

    /// Rule-file spelling of this action (`accept`, `replace`, or the special keyword).
    pub fn keyword(self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Replace => "replace",
            Action::Custom => "custom",
            Action::DecimalRef => "decnum",
            Action::HexRef => "hexnum",
            Action::EscapedUtf16 => "java16",
            Action::OctalRef => "octnum",
            Action::UnicodeRef => "uninum",
            Action::XmlDecimalRef => "xmldec",
            Action::XmlHexRef => "xmlhex",
        }
    }

    /// Whether applying this action counts as a change.
    pub fn is_change(self) -> bool {
        self != Action::Accept
    }
}

/// The left side of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Any single code point in `low..=high`. Endpoints may be surrogates.
    Range { low: u32, high: u32 },
    /// A non-empty run of code points matched contiguously.
    Sequence(Vec<u32>),
}

impl Pattern {
    /// Number of code points this pattern consumes when it matches at `at`.
    pub fn match_len(&self, input: &[u32], at: usize) -> Option<usize> {
        match self {
            Pattern::Range { low, high } => {
                input.get(at).filter(|&&cp| (*low..=*high).contains(&cp)).map(|_| 1)
            }
            Pattern::Sequence(left) => {
                let end = at.checked_add(left.len())?;
                (!left.is_empty() && input.get(at..end) == Some(left.as_slice())).then_some(left.len())
            }
        }
    }
}

/// One ordered rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    pub pattern: Pattern,
    /// Replacement text, or the auxiliary text appended by `Custom`.
    pub right: Option<String>,
    /// Rule-file line this rule came from; `None` for built-in rules.
    pub line: Option<usize>,
}

impl Rule {
    pub fn is_range(&self) -> bool {
        matches!(self.pattern, Pattern::Range { .. })
    }
}

/// An immutable, ordered rule table. Order is declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
