use plaintext::{ConvertDetails, Diagnostic, RuleTable, format_unicode_number};

/// What a piece of report text is, which decides its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Heading,
    Warning,
    Count,
    Timing,
    Emphasis,
    Muted,
}

impl Style {
    fn sgr(self) -> &'static str {
        match self {
            Style::Heading => "90",
            Style::Warning => "33",
            Style::Count => "36",
            Style::Timing => "32",
            Style::Emphasis => "1",
            Style::Muted => "2",
        }
    }
}

/// ANSI styling for stderr; plain text when color is off.
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn style(&self, style: Style, text: impl AsRef<str>) -> String {
        if self.enabled { format!("\x1b[{}m{}\x1b[0m", style.sgr(), text.as_ref()) } else { text.as_ref().to_string() }
    }

    /// `━━━ Title ━━━` section header, preceded by a blank line.
    pub fn heading(&self, title: &str) -> String {
        format!("\n{}", self.style(Style::Heading, format!("━━━ {title} ━━━")))
    }
}

/// `zero`, `one`, `two`, then digit-grouped numbers; plural unless exactly one.
pub fn pretty_plural(number: usize, singular: &str) -> String {
    const NAMES: [&str; 3] = ["zero", "one", "two"];

    let count = NAMES.get(number).map_or_else(|| group_digits(number), |name| name.to_string());
    if number == 1 { format!("{count} {singular}") } else { format!("{count} {singular}s") }
}

fn group_digits(number: usize) -> String {
    let digits = number.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Summary shown after a conversion. Characters are counted as 16-bit units.
pub fn status_line(output: &str, changes: usize) -> String {
    format!(
        "Text has {} with {}.",
        pretty_plural(output.encode_utf16().count(), "character"),
        pretty_plural(changes, "change")
    )
}

pub fn print_diagnostics(diagnostics: &[Diagnostic], palette: &Palette) {
    for diagnostic in diagnostics {
        eprintln!("{}", palette.style(Style::Warning, diagnostic.to_string()));
    }
}

pub fn print_stats(source: &str, table: &RuleTable, details: &ConvertDetails, palette: &Palette) {
    eprintln!("{}", palette.heading("Rules"));
    eprintln!("  {} from {}", pretty_plural(table.len(), "rule"), palette.style(Style::Emphasis, source));

    eprintln!("{}", palette.heading("Hits"));
    if details.rule_hits.is_empty() {
        eprintln!("{}", palette.style(Style::Muted, "  No rule matched"));
    }
    for hit in &details.rule_hits {
        let origin = hit.line.map_or_else(|| "built-in".to_string(), |line| format!("line {line}"));
        let left = table.rules().get(hit.index).map(|rule| describe_left(&rule.pattern)).unwrap_or_default();
        eprintln!(
            "  {:>4}  {:<10} {:<8} {:<24} {}",
            palette.style(Style::Muted, format!("#{}", hit.index + 1)),
            origin,
            hit.action.keyword(),
            left,
            palette.style(Style::Count, format!("×{}", hit.hits)),
        );
    }

    eprintln!("{}", palette.heading("Scan"));
    eprintln!(
        "  {} in, {} unmatched, {} tested",
        pretty_plural(details.input_code_points, "code point"),
        details.unmatched,
        pretty_plural(details.candidates_tested, "candidate"),
    );

    eprintln!("{}", palette.heading("Timing"));
    eprintln!(
        "  Total: {}  │  Decode: {}  │  Scan: {}",
        palette.style(Style::Timing, format!("{:?}", details.total)),
        palette.style(Style::Muted, format!("{:?}", details.decode)),
        palette.style(Style::Count, format!("{:?}", details.scan)),
    );
    eprintln!();
}

fn describe_left(pattern: &plaintext::Pattern) -> String {
    match pattern {
        plaintext::Pattern::Range { low, high } => {
            format!("{}..{}", format_unicode_number(*low), format_unicode_number(*high))
        }
        plaintext::Pattern::Sequence(left) => {
            let shown: Vec<String> = left.iter().take(4).map(|&cp| format_unicode_number(cp)).collect();
            if left.len() > shown.len() { format!("{} ...", shown.join(" ")) } else { shown.join(" ") }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_phrasing() {
        let cases = [
            (0, "zero changes"),
            (1, "one change"),
            (2, "two changes"),
            (3, "3 changes"),
            (999, "999 changes"),
            (1000, "1,000 changes"),
            (1234567, "1,234,567 changes"),
        ];
        for (number, expected) in cases {
            assert_eq!(pretty_plural(number, "change"), expected);
        }
    }

    #[test]
    fn status_counts_utf16_units() {
        assert_eq!(status_line("\"Hello\"", 2), "Text has 7 characters with two changes.");
        assert_eq!(status_line("\u{1F600}", 1), "Text has two characters with one change.");
        assert_eq!(status_line("", 0), "Text has zero characters with zero changes.");
    }

    #[test]
    fn left_side_descriptions() {
        assert_eq!(describe_left(&plaintext::Pattern::Range { low: 0x20, high: 0x7E }), "U+0020..U+007E");
        assert_eq!(describe_left(&plaintext::Pattern::Sequence(vec![0x65, 0x301])), "U+0065 U+0301");
        assert_eq!(describe_left(&plaintext::Pattern::Sequence(vec![0x41; 5])), "U+0041 U+0041 U+0041 U+0041 ...");
    }

    #[test]
    fn palette_styles_only_when_enabled() {
        let plain = Palette::new(false);
        assert_eq!(plain.style(Style::Warning, "x"), "x");
        assert_eq!(plain.heading("Hits"), "\n━━━ Hits ━━━");

        let color = Palette::new(true);
        assert_eq!(color.style(Style::Muted, "x"), "\x1b[2mx\x1b[0m");
        assert_eq!(color.style(Style::Warning, "x"), "\x1b[33mx\x1b[0m");
    }
}
