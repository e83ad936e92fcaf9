use crate::codec::{self, format_unicode_number};
use crate::{Action, EncodeError, Rule};

/// Replacement renderer for `custom` rules.
///
/// Receives the matched code points and the rule's right side, and appends the
/// replacement to the output. Without one, `custom` renders
/// `<U+XXXX U+YYYY right>`.
pub type CustomFormatter = dyn Fn(&[u32], Option<&str>, &mut String) + Send + Sync;

/// Append the replacement for `rule` applied to `matched`.
pub(crate) fn render(
    rule: &Rule,
    matched: &[u32],
    custom: Option<&CustomFormatter>,
    out: &mut String,
    errors: &mut Vec<EncodeError>,
) {
    let right = rule.right.as_deref();

    match rule.action {
        Action::Accept => {
            for &cp in matched {
                if let Err(err) = codec::push_code_point(out, cp) {
                    errors.push(err);
                }
            }
        }
        Action::Replace => out.push_str(right.unwrap_or_default()),
        Action::Custom => match custom {
            Some(format) => format(matched, right, out),
            None => custom_default(matched, right, out),
        },
        Action::DecimalRef => per_code_point(matched, out, |cp| format!("<{cp}>")),
        Action::HexRef => per_code_point(matched, out, |cp| format!("<{cp:X}>")),
        Action::OctalRef => per_code_point(matched, out, |cp| format!("<{cp:o}>")),
        Action::UnicodeRef => per_code_point(matched, out, |cp| format!("<{}>", format_unicode_number(cp))),
        Action::XmlDecimalRef => per_code_point(matched, out, |cp| format!("&#{cp};")),
        Action::XmlHexRef => per_code_point(matched, out, |cp| format!("&#x{cp:X};")),
        Action::EscapedUtf16 => {
            let (units, unencodable) = codec::encode_units(matched);
            errors.extend(unencodable);
            for unit in units {
                out.push_str(&format!("\\u{unit:04X}"));
            }
        }
    }
}

fn per_code_point(matched: &[u32], out: &mut String, format: impl Fn(u32) -> String) {
    for &cp in matched {
        out.push_str(&format(cp));
    }
}

fn custom_default(matched: &[u32], right: Option<&str>, out: &mut String) {
    out.push('<');
    let numbers: Vec<String> = matched.iter().map(|&cp| format_unicode_number(cp)).collect();
    out.push_str(&numbers.join(" "));
    if let Some(right) = right.filter(|r| !r.is_empty()) {
        out.push(' ');
        out.push_str(right);
    }
    out.push('>');
}
