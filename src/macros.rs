#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a built-in [`Rule`](crate::Rule) (no source line).
///
/// ```ignore
/// rule!(Replace [0x2014] => "--");
/// rule!(UnicodeRef [0x65, 0x301]);
/// rule!(Accept 0x20 ..= 0x7E);
/// ```
#[macro_export]
macro_rules! rule {
    ($action:ident [ $($cp:expr),+ $(,)? ] $(=> $right:expr)? $(,)?) => {
        $crate::Rule {
            action: $crate::Action::$action,
            pattern: $crate::Pattern::Sequence(vec![ $($cp),+ ]),
            right: None $(.or(Some(::std::string::String::from($right))))?,
            line: None,
        }
    };
    ($action:ident $low:literal ..= $high:literal $(=> $right:expr)? $(,)?) => {
        $crate::Rule {
            action: $crate::Action::$action,
            pattern: $crate::Pattern::Range { low: $low, high: $high },
            right: None $(.or(Some(::std::string::String::from($right))))?,
            line: None,
        }
    };
}
