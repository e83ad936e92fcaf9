//! Caption files to rule files.
//!
//! Character-map tools describe code points one per line as
//! `U+XXXX = caption`. Each such line becomes a rule that replaces the
//! character by `<U+XXXX caption>`, which is handy for spotting unusual
//! characters in otherwise plain text. Lines of any other shape are dropped.

/// Convert caption lines into rule-file text, one `replace` rule per caption.
///
/// # Example
/// ```
/// let rules = plaintext::captions::rules_from_captions("u+2014 = em dash\nnot a caption\n");
/// assert_eq!(rules, "replace U+2014 = \"<U+2014 em dash>\"\n");
/// ```
pub fn rules_from_captions(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if let Some(rule) = rule_from_caption(line) {
            out.push_str(&rule);
            out.push('\n');
        }
    }
    tracing::debug!(lines = text.lines().count(), rules = out.lines().count(), "captions converted");
    out
}

/// One caption line as a rule, or `None` if the line is not a caption.
pub fn rule_from_caption(line: &str) -> Option<String> {
    let caps = regex!(r"^[[:space:]]*[Uu]\+([0-9A-Fa-f]+)[[:space:]]*=[[:space:]]*(.*[^[:space:]])[[:space:]]*$")
        .captures(line)?;
    let number = caps[1].to_ascii_uppercase();
    Some(format!("replace U+{number} = \"<U+{number} {}>\"", quote_safe(&caps[2])))
}

/// Rule strings cannot contain `"`; close the string, emit U+0022, reopen.
fn quote_safe(caption: &str) -> String {
    caption.replace('"', "\" U+0022 \"")
}
