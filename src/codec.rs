//! Code-point codec.
//!
//! Bridges 16-bit code-unit text and sequences of Unicode code points. Two
//! optional inline notations can be decoded on the way in:
//!
//! - **Backslash escapes** (`\n`, `\u2014`, `\101`, ...), as in Java source.
//! - **XML references** (`&amp;`, `&#8212;`, `&#x2014;`, ...).
//!
//! Decoding never fails. Malformed notation is left as literal text, and an
//! unpaired surrogate becomes [`SENTINEL`]; both raise a [`DecodeError`].
//!
//! ```text
//! u16 units ── notation? ──> one unit value ── surrogate pairing ──> u32 code points
//!                 │                                   │
//!                 └─ DecodeError (left literal)       └─ DecodeError + SENTINEL
//! ```

use crate::error::{DecodeError, EncodeError};

/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Placeholder substituted for anything that cannot be decoded or encoded.
pub const SENTINEL: u32 = '?' as u32;

const HIGH_SURROGATE_BEGIN: u32 = 0xD800;
const HIGH_SURROGATE_END: u32 = 0xDBFF;
const LOW_SURROGATE_BEGIN: u32 = 0xDC00;
const LOW_SURROGATE_END: u32 = 0xDFFF;
const SURROGATE_MASK: u32 = 0x03FF;
const SURROGATE_SHIFT: u32 = 10;
const SUPPLEMENTARY_OFFSET: u32 = 0x1_0000;

/// Maximum number of units quoted back in a decode diagnostic.
const CONTEXT_LIMIT: usize = 25;

const AMPERSAND: u16 = b'&' as u16;
const BACKSLASH: u16 = b'\\' as u16;

bitflags::bitflags! {
    /// Inline notations recognised while decoding text.
    ///
    /// Each text source (rule file, live user text) carries its own set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Notation: u8 {
        const BACKSLASH = 1 << 0;
        const XML       = 1 << 1;
    }
}

/// Output of [`decode`] and [`decode_units`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub code_points: Vec<u32>,
    pub diagnostics: Vec<DecodeError>,
}

/// Format a code point as `U+` and uppercase hex, at least four digits.
pub fn format_unicode_number(number: u32) -> String {
    format!("U+{number:04X}")
}

pub fn is_surrogate(cp: u32) -> bool {
    (HIGH_SURROGATE_BEGIN..=LOW_SURROGATE_END).contains(&cp)
}

fn is_high_surrogate(cp: u32) -> bool {
    (HIGH_SURROGATE_BEGIN..=HIGH_SURROGATE_END).contains(&cp)
}

fn is_low_surrogate(cp: u32) -> bool {
    (LOW_SURROGATE_BEGIN..=LOW_SURROGATE_END).contains(&cp)
}

// --- Decoding ----------------------------------------------------------------

/// Decode `text` into code points, honouring the notations in `notation`.
pub fn decode(text: &str, notation: Notation) -> Decoded {
    let units: Vec<u16> = text.encode_utf16().collect();
    decode_units(&units, notation)
}

/// Decode raw 16-bit units. Unlike `&str`, the input may hold lone surrogates.
pub fn decode_units(units: &[u16], notation: Notation) -> Decoded {
    let mut out = Decoded { code_points: Vec::with_capacity(units.len()), diagnostics: Vec::new() };
    let mut pending_high: Option<u32> = None;
    let mut next = 0;

    while next < units.len() {
        // Each notation yields exactly one unit value and consumes >= 1 units.
        let (value, used) = match units[next] {
            AMPERSAND if notation.contains(Notation::XML) => xml_reference(units, next, &mut out.diagnostics),
            BACKSLASH if notation.contains(Notation::BACKSLASH) => {
                backslash_escape(units, next, &mut out.diagnostics)
            }
            unit => (u32::from(unit), 1),
        };
        assemble(&mut pending_high, value, &mut out);
        next += used;
    }

    if let Some(high) = pending_high {
        out.code_points.push(SENTINEL);
        out.diagnostics.push(DecodeError::UnpairedHigh { high, next: None });
    }
    out
}

/// Surrogate-pair assembly. A high surrogate waits in `pending` for its low half.
fn assemble(pending: &mut Option<u32>, value: u32, out: &mut Decoded) {
    if let Some(high) = pending.take() {
        if is_low_surrogate(value) {
            out.code_points.push(
                SUPPLEMENTARY_OFFSET + ((high - HIGH_SURROGATE_BEGIN) << SURROGATE_SHIFT) + (value - LOW_SURROGATE_BEGIN),
            );
            return;
        }
        out.code_points.push(SENTINEL);
        out.diagnostics.push(DecodeError::UnpairedHigh { high, next: Some(value) });
    }

    if is_high_surrogate(value) {
        *pending = Some(value);
    } else if is_low_surrogate(value) {
        out.code_points.push(SENTINEL);
        out.diagnostics.push(DecodeError::UnpairedLow(value));
    } else {
        out.code_points.push(value);
    }
}

fn ascii_at(units: &[u16], at: usize) -> Option<char> {
    units.get(at).and_then(|&u| u8::try_from(u).ok()).filter(u8::is_ascii).map(char::from)
}

fn starts_with(units: &[u16], at: usize, needle: &str) -> bool {
    let end = at + needle.len();
    end <= units.len() && units[at..end].iter().zip(needle.bytes()).all(|(&u, b)| u == u16::from(b))
}

/// Up to [`CONTEXT_LIMIT`] printable units starting at `at`, for diagnostics.
fn context(units: &[u16], at: usize) -> String {
    let end = units[at..]
        .iter()
        .take(CONTEXT_LIMIT)
        .position(|&u| u < 0x20 || (0x7F..=0x9F).contains(&u))
        .map_or_else(|| (at + CONTEXT_LIMIT).min(units.len()), |p| at + p);
    String::from_utf16_lossy(&units[at..end])
}

const XML_ENTITIES: [(&str, char); 5] =
    [("&amp;", '&'), ("&apos;", '\''), ("&gt;", '>'), ("&lt;", '<'), ("&quot;", '"')];

fn xml_reference(units: &[u16], at: usize, diagnostics: &mut Vec<DecodeError>) -> (u32, usize) {
    if let Some(&(name, ch)) = XML_ENTITIES.iter().find(|(name, _)| starts_with(units, at, name)) {
        return (ch as u32, name.len());
    }

    if !starts_with(units, at, "&#") {
        diagnostics.push(DecodeError::UnknownXmlEntity { context: context(units, at) });
        return (u32::from(AMPERSAND), 1);
    }

    let mut i = at + 2;
    let mut digits = 0;
    let mut radix = 10;
    let mut value: u32 = 0;
    let mut closed = false;
    while i < units.len() && value <= MAX_CODE_POINT {
        let Some(ch) = ascii_at(units, i) else { break };
        i += 1;
        if digits == 0 && radix == 10 && (ch == 'x' || ch == 'X') {
            radix = 16;
        } else if let Some(d) = ch.to_digit(radix) {
            digits += 1;
            value = value * radix + d;
        } else if digits > 0 && ch == ';' {
            closed = true;
            break;
        } else {
            break;
        }
    }

    if closed && value <= MAX_CODE_POINT {
        (value, i - at)
    } else {
        diagnostics.push(DecodeError::InvalidXmlNumeric { context: context(units, at) });
        (u32::from(AMPERSAND), 1)
    }
}

fn backslash_escape(units: &[u16], at: usize, diagnostics: &mut Vec<DecodeError>) -> (u32, usize) {
    let simple = match ascii_at(units, at + 1) {
        Some('"') => Some('"'),
        Some('\'') => Some('\''),
        Some('\\') => Some('\\'),
        Some('b') => Some('\u{8}'),
        Some('f') => Some('\u{c}'),
        Some('n') => Some('\n'),
        Some('r') => Some('\r'),
        Some('t') => Some('\t'),
        _ => None,
    };
    if let Some(ch) = simple {
        return (ch as u32, 2);
    }

    if ascii_at(units, at + 1) == Some('u') {
        // `\uu` drops one `u`, leaving a literal backslash.
        if ascii_at(units, at + 2) == Some('u') {
            return (u32::from(BACKSLASH), 2);
        }
        let (value, digits) = accumulate(units, at + 2, 16, 4);
        if digits == 4 {
            return (value, 6);
        }
        diagnostics.push(DecodeError::InvalidUnicodeEscape { context: context(units, at) });
        return (u32::from(BACKSLASH), 1);
    }

    let (value, digits) = accumulate(units, at + 1, 8, 3);
    if digits > 0 && value <= 0xFF {
        (value, digits + 1)
    } else {
        diagnostics.push(DecodeError::UnknownBackslash { context: context(units, at) });
        (u32::from(BACKSLASH), 1)
    }
}

/// Read up to `max_digits` digits in `radix` starting at `from`.
fn accumulate(units: &[u16], from: usize, radix: u32, max_digits: usize) -> (u32, usize) {
    let mut value = 0;
    let mut digits = 0;
    while digits < max_digits {
        match ascii_at(units, from + digits).and_then(|ch| ch.to_digit(radix)) {
            Some(d) => value = value * radix + d,
            None => break,
        }
        digits += 1;
    }
    (value, digits)
}

// --- Encoding ----------------------------------------------------------------

/// Append one code point as 16-bit units (a surrogate pair above U+FFFF).
///
/// Invalid code points append [`SENTINEL`] and report an [`EncodeError`].
pub fn push_utf16(out: &mut Vec<u16>, cp: u32) -> Result<(), EncodeError> {
    if cp > MAX_CODE_POINT || is_surrogate(cp) {
        out.push(SENTINEL as u16);
        return Err(EncodeError(cp));
    }
    if cp < SUPPLEMENTARY_OFFSET {
        out.push(cp as u16);
    } else {
        let offset = cp - SUPPLEMENTARY_OFFSET;
        out.push((HIGH_SURROGATE_BEGIN + (offset >> SURROGATE_SHIFT)) as u16);
        out.push((LOW_SURROGATE_BEGIN + (offset & SURROGATE_MASK)) as u16);
    }
    Ok(())
}

/// Append one code point to a `String`, with the same validity rules as [`push_utf16`].
pub fn push_code_point(out: &mut String, cp: u32) -> Result<(), EncodeError> {
    match char::from_u32(cp) {
        Some(ch) => {
            out.push(ch);
            Ok(())
        }
        None => {
            out.push(SENTINEL as u8 as char);
            Err(EncodeError(cp))
        }
    }
}

/// Encode code points to 16-bit units.
pub fn encode_units(code_points: &[u32]) -> (Vec<u16>, Vec<EncodeError>) {
    let mut units = Vec::with_capacity(code_points.len());
    let errors = code_points.iter().filter_map(|&cp| push_utf16(&mut units, cp).err()).collect();
    (units, errors)
}

/// Encode code points to text.
pub fn encode(code_points: &[u32]) -> (String, Vec<EncodeError>) {
    let mut text = String::with_capacity(code_points.len());
    let errors = code_points.iter().filter_map(|&cp| push_code_point(&mut text, cp).err()).collect();
    (text, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cps(text: &str) -> Vec<u32> {
        text.chars().map(u32::from).collect()
    }

    #[test]
    fn format_unicode_number_pads_to_four_digits() {
        assert_eq!(format_unicode_number(0x41), "U+0041");
        assert_eq!(format_unicode_number(0xE9), "U+00E9");
        assert_eq!(format_unicode_number(0x2014), "U+2014");
        assert_eq!(format_unicode_number(0x1F600), "U+1F600");
        assert_eq!(format_unicode_number(0x10FFFF), "U+10FFFF");
    }

    #[test]
    fn plain_text_decodes_without_notation() {
        let out = decode("a&amp;\\n", Notation::empty());
        assert_eq!(out.code_points, cps("a&amp;\\n"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn xml_entities_and_numeric_references() {
        let cases: Vec<(&str, &str)> = vec![
            ("&amp;", "&"),
            ("&apos;", "'"),
            ("&gt;", ">"),
            ("&lt;", "<"),
            ("&quot;", "\""),
            ("&#8212;", "\u{2014}"),
            ("&#x2014;", "\u{2014}"),
            ("&#X2014;", "\u{2014}"),
            ("a&#65;b", "aAb"),
            ("&#x1F600;", "\u{1F600}"),
        ];
        for (input, expected) in cases {
            let out = decode(input, Notation::XML);
            assert_eq!(out.code_points, cps(expected), "input {input:?}");
            assert!(out.diagnostics.is_empty(), "input {input:?}: {:?}", out.diagnostics);
        }
    }

    #[test]
    fn malformed_xml_reference_is_left_literal() {
        let cases = ["&nbsp;", "&#;", "&#x;", "&#12", "&#x110000;", "&#65x;", "&"];
        for input in cases {
            let out = decode(input, Notation::XML);
            assert_eq!(out.code_points, cps(input), "input {input:?}");
            assert_eq!(out.diagnostics.len(), 1, "input {input:?}");
        }
    }

    #[test]
    fn xml_diagnostic_quotes_limited_context() {
        let input = format!("&bogus;{}\nafter", "x".repeat(40));
        let out = decode(&input, Notation::XML);
        let DecodeError::UnknownXmlEntity { context } = &out.diagnostics[0] else {
            panic!("expected unknown entity, got {:?}", out.diagnostics);
        };
        assert_eq!(context.chars().count(), 25);
        assert!(context.starts_with("&bogus;"));

        let out = decode("&bad\nrest", Notation::XML);
        let DecodeError::UnknownXmlEntity { context } = &out.diagnostics[0] else {
            panic!("expected unknown entity");
        };
        assert_eq!(context, "&bad");
    }

    #[test]
    fn backslash_escapes() {
        let cases: Vec<(&str, &str)> = vec![
            ("\\\"", "\""),
            ("\\'", "'"),
            ("\\\\", "\\"),
            ("\\b", "\u{8}"),
            ("\\f", "\u{c}"),
            ("\\n", "\n"),
            ("\\r", "\r"),
            ("\\t", "\t"),
            ("\\u2014", "\u{2014}"),
            ("\\u00e9", "\u{e9}"),
            ("\\uu2014", "\\u2014"),
            ("\\101", "A"),
            ("\\0", "\0"),
            ("\\377", "\u{ff}"),
            ("\\1018", "A8"),
        ];
        for (input, expected) in cases {
            let out = decode(input, Notation::BACKSLASH);
            assert_eq!(out.code_points, cps(expected), "input {input:?}");
            assert!(out.diagnostics.is_empty(), "input {input:?}");
        }
    }

    #[test]
    fn malformed_backslash_escape_is_left_literal() {
        let cases = ["\\u12", "\\uXYZW", "\\q", "\\400", "\\"];
        for input in cases {
            let out = decode(input, Notation::BACKSLASH);
            assert_eq!(out.code_points, cps(input), "input {input:?}");
            assert_eq!(out.diagnostics.len(), 1, "input {input:?}");
        }
    }

    #[test]
    fn escaped_surrogate_pair_combines() {
        let out = decode("\\uD83D\\uDE00", Notation::BACKSLASH);
        assert_eq!(out.code_points, vec![0x1F600]);
        assert!(out.diagnostics.is_empty());

        // Mixed notations may form one pair.
        let out = decode("&#xD83D;\\uDE00", Notation::BACKSLASH | Notation::XML);
        assert_eq!(out.code_points, vec![0x1F600]);
    }

    #[test]
    fn raw_surrogate_units_pair_up() {
        let out = decode_units(&[0x61, 0xD83D, 0xDE00, 0x62], Notation::empty());
        assert_eq!(out.code_points, vec![0x61, 0x1F600, 0x62]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn unpaired_surrogates_become_sentinel() {
        let out = decode_units(&[0xD800], Notation::empty());
        assert_eq!(out.code_points, vec![SENTINEL]);
        assert_eq!(out.diagnostics, vec![DecodeError::UnpairedHigh { high: 0xD800, next: None }]);

        let out = decode_units(&[0xD800, 0x41], Notation::empty());
        assert_eq!(out.code_points, vec![SENTINEL, 0x41]);
        assert_eq!(out.diagnostics, vec![DecodeError::UnpairedHigh { high: 0xD800, next: Some(0x41) }]);

        let out = decode_units(&[0xDC00, 0x41], Notation::empty());
        assert_eq!(out.code_points, vec![SENTINEL, 0x41]);
        assert_eq!(out.diagnostics, vec![DecodeError::UnpairedLow(0xDC00)]);

        // A second high surrogate restarts pairing.
        let out = decode_units(&[0xD800, 0xD83D, 0xDE00], Notation::empty());
        assert_eq!(out.code_points, vec![SENTINEL, 0x1F600]);
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn encode_writes_surrogate_pairs() {
        let (units, errors) = encode_units(&[0x41, 0x1F600, 0x10FFFF]);
        assert_eq!(units, vec![0x41, 0xD83D, 0xDE00, 0xDBFF, 0xDFFF]);
        assert!(errors.is_empty());
    }

    #[test]
    fn encode_replaces_invalid_code_points() {
        let (text, errors) = encode(&[0x41, 0xD800, 0x110000, 0x42]);
        assert_eq!(text, "A??B");
        assert_eq!(errors, vec![EncodeError(0xD800), EncodeError(0x110000)]);

        let (units, errors) = encode_units(&[0xDFFF]);
        assert_eq!(units, vec![SENTINEL as u16]);
        assert_eq!(errors.len(), 1);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(chars in prop::collection::vec(any::<char>(), 0..64)) {
            let code_points: Vec<u32> = chars.into_iter().map(u32::from).collect();
            let (text, errors) = encode(&code_points);
            prop_assert!(errors.is_empty());
            let decoded = decode(&text, Notation::empty());
            prop_assert_eq!(decoded.code_points, code_points.clone());

            let (units, _) = encode_units(&code_points);
            prop_assert_eq!(decode_units(&units, Notation::empty()).code_points, code_points);
        }
    }
}
