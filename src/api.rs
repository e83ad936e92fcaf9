use crate::codec::{self, Notation};
use crate::engine::Converter;
use crate::error::Diagnostic;
use crate::table::{self, RuleSource};
use crate::{Action, CustomFormatter, RuleTable};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Notation toggles for the two text sources.
///
/// `data` applies to quoted strings in rule files, `user` to the text being
/// converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub data: Notation,
    pub user: Notation,
}

impl Options {
    /// Build from per-notation levels: 0 off, 1 rule data only, 2 user text only, 3 both.
    ///
    /// Levels above 3 are masked to their low two bits.
    pub fn from_levels(backslash: u8, xml: u8) -> Self {
        let pick = |level: u8, bit: u8, flag: Notation| if level & bit != 0 { flag } else { Notation::empty() };
        Self {
            data: pick(backslash, 1, Notation::BACKSLASH) | pick(xml, 1, Notation::XML),
            user: pick(backslash, 2, Notation::BACKSLASH) | pick(xml, 2, Notation::XML),
        }
    }
}

/// Result from [`load_rules`].
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// The loaded rules, or the fallback table when none loaded.
    pub table: RuleTable,
    /// Source, syntax and decode problems, in line order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result from [`convert`] and [`convert_with`].
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The converted text.
    pub text: String,
    /// Rule applications other than `accept`.
    pub changes: usize,
    /// Decode problems in the input, then encode problems in the output.
    pub diagnostics: Vec<Diagnostic>,
    /// Total elapsed time spent decoding and converting.
    pub elapsed: Duration,
}

/// How often one rule fired, for [`ConvertDetails`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    /// Position in the table.
    pub index: usize,
    /// Rule-file line, `None` for built-in rules.
    pub line: Option<usize>,
    pub action: Action,
    pub hits: usize,
}

/// Additional details returned by [`convert_verbose`].
#[derive(Debug, Clone)]
pub struct ConvertDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// Time spent decoding the input text.
    pub decode: Duration,
    /// Time spent scanning and rendering.
    pub scan: Duration,
    /// Code points after decoding.
    pub input_code_points: usize,
    /// Code points no rule matched.
    pub unmatched: usize,
    /// Rule patterns tested against the input.
    pub candidates_tested: usize,
    /// Rules that fired at least once, in table order.
    pub rule_hits: Vec<RuleHit>,
}

/// Result from [`convert_verbose`].
#[derive(Debug, Clone)]
pub struct ConvertResultVerbose {
    pub text: String,
    pub changes: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub elapsed: Duration,
    pub details: ConvertDetails,
}

/// Load a rule table from `source`, decoding quoted strings with `notation`.
///
/// Never fails: problems come back as diagnostics, and an empty result is
/// replaced by [`fallback_table`](crate::fallback_table).
///
/// # Example
/// ```
/// use plaintext::{Notation, RuleSource, load_rules};
///
/// let loaded = load_rules(RuleSource::Text("replace 0x2014 = \"--\""), Notation::empty());
/// assert_eq!(loaded.table.len(), 1);
/// assert!(loaded.diagnostics.is_empty());
/// ```
pub fn load_rules(source: RuleSource<'_>, notation: Notation) -> LoadResult {
    let (table, diagnostics) = table::load(&source, notation);
    LoadResult { table, diagnostics }
}

/// Convert `text` with `table`, decoding `notation` in the input first.
///
/// # Example
/// ```
/// use plaintext::{Notation, convert, fallback_table};
///
/// let out = convert("\u{201C}Hello\u{201D}", &fallback_table(), Notation::empty());
/// assert_eq!(out.text, "\"Hello\"");
/// assert_eq!(out.changes, 2);
/// ```
pub fn convert(text: &str, table: &RuleTable, notation: Notation) -> ConvertResult {
    let (result, _) = run(text, Converter::new(table), notation);
    result
}

/// Like [`convert`], rendering `custom` rules with `format`.
pub fn convert_with(text: &str, table: &RuleTable, notation: Notation, format: &CustomFormatter) -> ConvertResult {
    let (result, _) = run(text, Converter::new(table).with_custom(format), notation);
    result
}

/// Convert `text` and return per-rule counts and phase timings as well.
pub fn convert_verbose(text: &str, table: &RuleTable, notation: Notation) -> ConvertResultVerbose {
    let (result, details) = run(text, Converter::new(table), notation);
    ConvertResultVerbose {
        text: result.text,
        changes: result.changes,
        diagnostics: result.diagnostics,
        elapsed: result.elapsed,
        details,
    }
}

fn run(text: &str, converter: Converter<'_>, notation: Notation) -> (ConvertResult, ConvertDetails) {
    let start = Instant::now();
    let decoded = codec::decode(text, notation);
    let decode = start.elapsed();

    let out = converter.run(&decoded.code_points);
    let total = start.elapsed();

    let mut diagnostics: Vec<Diagnostic> = decoded.diagnostics.into_iter().map(Diagnostic::from).collect();
    diagnostics.extend(out.diagnostics.into_iter().map(Diagnostic::from));

    let rules = converter.compiled().rules;
    let rule_hits = out
        .metrics
        .rule_hits
        .iter()
        .enumerate()
        .filter(|&(_, &hits)| hits > 0)
        .map(|(index, &hits)| RuleHit { index, line: rules[index].line, action: rules[index].action, hits })
        .collect();

    let details = ConvertDetails {
        total,
        decode,
        scan: out.metrics.total,
        input_code_points: decoded.code_points.len(),
        unmatched: out.metrics.unmatched,
        candidates_tested: out.metrics.candidates_tested,
        rule_hits,
    };

    (ConvertResult { text: out.text, changes: out.changes, diagnostics, elapsed: total }, details)
}

// --- Shared table --------------------------------------------------------------

/// A rule table that can be reloaded while other threads convert with it.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it; a reload
/// builds a whole new table and swaps it in, so a conversion in progress never
/// sees a partly built table.
#[derive(Debug, Default)]
pub struct SharedTable {
    current: RwLock<Arc<RuleTable>>,
}

impl SharedTable {
    pub fn new(table: RuleTable) -> Self {
        Self { current: RwLock::new(Arc::new(table)) }
    }

    /// The table in effect right now.
    pub fn snapshot(&self) -> Arc<RuleTable> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install `table`, returning the one it replaces.
    pub fn replace(&self, table: RuleTable) -> Arc<RuleTable> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(table))
    }

    /// Load `source` and install the result.
    pub fn reload(&self, source: RuleSource<'_>, notation: Notation) -> Vec<Diagnostic> {
        let LoadResult { table, diagnostics } = load_rules(source, notation);
        tracing::info!(rules = table.len(), diagnostics = diagnostics.len(), "rule table swapped");
        self.replace(table);
        diagnostics
    }

    pub fn convert(&self, text: &str, notation: Notation) -> ConvertResult {
        convert(text, &self.snapshot(), notation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, DecodeError, fallback_table};

    #[test]
    fn curly_quotes_through_fallback() {
        let res = convert("\u{201C}Hello\u{201D}", &fallback_table(), Notation::empty());
        assert_eq!(res.text, "\"Hello\"");
        assert_eq!(res.changes, 2);
        assert!(res.diagnostics.is_empty());
    }

    #[test]
    fn em_dash_rule() {
        let loaded = load_rules(RuleSource::Text("replace 0x2014 = \"--\""), Notation::empty());
        let res = convert("a\u{2014}b", &loaded.table, Notation::empty());
        assert_eq!(res.text, "a--b");
        assert_eq!(res.changes, 1);
    }

    #[test]
    fn uninum_rule() {
        let loaded = load_rules(RuleSource::Text("replace \"é\" = uninum"), Notation::empty());
        assert!(loaded.diagnostics.is_empty());
        let res = convert("é", &loaded.table, Notation::empty());
        assert_eq!(res.text, "<U+00E9>");
        assert_eq!(res.changes, 1);
    }

    #[test]
    fn one_bad_line_among_ten() {
        let text = "accept 0x20..0x7E\n\
                    replace 0x2014 = \"--\"\n\
                    replace 0x2013 = \"-\"\n\
                    delete 0xAD\n\
                    replace U+2026 = \"...\"\n\
                    replace 0x2019 \"'\"\n\
                    replace 0x201C = \"\\\"\"\n\
                    replace 0x201D = \"\\\"\"\n\
                    replace 0xE9 = xmlhex\n\
                    accept 0xA0";
        let loaded = load_rules(RuleSource::Text(text), Notation::BACKSLASH);
        assert_eq!(loaded.table.len(), 9);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line(), Some(6));
    }

    #[test]
    fn notation_applies_to_user_text() {
        let table = fallback_table();

        let res = convert("&#x201C;Hi&#8221; &amp;", &table, Notation::XML);
        assert_eq!(res.text, "\"Hi\" &");
        assert_eq!(res.changes, 2);

        let res = convert("&#x201C;Hi", &table, Notation::empty());
        assert_eq!(res.text, "&#x201C;Hi");
        assert_eq!(res.changes, 0);

        let res = convert("\\u2014 \\\\", &table, Notation::BACKSLASH);
        assert_eq!(res.text, "-- \\");
        assert_eq!(res.changes, 1);
    }

    #[test]
    fn decode_and_encode_problems_are_reported() {
        let res = convert("a\\qb", &fallback_table(), Notation::BACKSLASH);
        assert_eq!(res.text, "a\\qb");
        assert!(matches!(
            res.diagnostics.as_slice(),
            [Diagnostic::Decode { line: None, error: DecodeError::UnknownBackslash { .. } }]
        ));

        let table = RuleTable::new(vec![rule!(Replace [0x41] => "ok")]);
        let res = convert("\\uD800A", &table, Notation::BACKSLASH);
        assert_eq!(res.text, "?ok");
        assert!(matches!(
            res.diagnostics.as_slice(),
            [Diagnostic::Decode { error: DecodeError::UnpairedHigh { high: 0xD800, next: Some(0x41) }, .. }]
        ));
        assert_eq!(res.diagnostics[0].to_string(), "Unpaired UTF-16 high surrogate: U+D800 followed by U+0041");
    }

    #[test]
    fn custom_formatter_entry_point() {
        let loaded = load_rules(RuleSource::Text("replace 0x2122 = custom \"TM\""), Notation::empty());
        assert_eq!(convert("\u{2122}", &loaded.table, Notation::empty()).text, "<U+2122 TM>");

        let upper: &CustomFormatter = &|_, right, out| out.push_str(&right.unwrap_or_default().to_uppercase());
        let res = convert_with("x\u{2122}", &loaded.table, Notation::empty(), upper);
        assert_eq!(res.text, "xTM");
        assert_eq!(res.changes, 1);
    }

    #[test]
    fn verbose_reports_rule_hits() {
        let loaded = load_rules(
            RuleSource::Text("# smart quotes\nreplace 0x2018 = \"'\"\nreplace 0x2019 = \"'\"\naccept 0x61..0x7A"),
            Notation::empty(),
        );
        let res = convert_verbose("it\u{2019}s \u{2019}x\u{2019}", &loaded.table, Notation::empty());

        assert_eq!(res.text, "it's 'x'");
        assert_eq!(res.changes, 3);
        assert_eq!(res.elapsed, res.details.total);
        assert!(res.details.decode <= res.details.total);
        assert_eq!(res.details.input_code_points, 8);
        assert_eq!(res.details.unmatched, 1);
        assert_eq!(
            res.details.rule_hits,
            vec![
                RuleHit { index: 1, line: Some(3), action: Action::Replace, hits: 3 },
                RuleHit { index: 2, line: Some(4), action: Action::Accept, hits: 4 },
            ]
        );
    }

    #[test]
    fn missing_named_source_falls_back() {
        let path = std::path::Path::new("definitely/not/here/rules.txt");
        let loaded = load_rules(RuleSource::File(path), Notation::empty());
        assert_eq!(loaded.table, fallback_table());
        assert!(matches!(loaded.diagnostics.as_slice(), [Diagnostic::SourceNotFound { .. }]));
    }

    #[test]
    fn options_from_levels() {
        assert_eq!(Options::from_levels(0, 0), Options::default());
        assert_eq!(Options::from_levels(1, 2), Options { data: Notation::BACKSLASH, user: Notation::XML });
        assert_eq!(Options::from_levels(3, 3), Options { data: Notation::all(), user: Notation::all() });
    }

    #[test]
    fn shared_table_swaps_whole_tables() {
        let shared = SharedTable::new(fallback_table());
        let before = shared.snapshot();

        let diagnostics = shared.reload(RuleSource::Text("replace 0x2014 = \"-\"\nbogus line"), Notation::empty());
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::Config { line: 2, error: ConfigError::UnknownKeyword(_), .. }]
        ));

        // A snapshot taken earlier still sees the old table.
        assert_eq!(before.len(), 8);
        assert_eq!(shared.snapshot().len(), 1);
        assert_eq!(shared.convert("\u{2014}", Notation::empty()).text, "-");

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| assert_eq!(shared.convert("\u{2014}\u{2014}", Notation::empty()).changes, 2));
            }
        });

        let old = shared.replace(RuleTable::default());
        assert_eq!(old.len(), 1);
        assert_eq!(shared.convert("\u{2014}", Notation::empty()).text, "\u{2014}");
    }
}
