use crate::RuleTable;

/// The table used when no rules could be loaded: smart punctuation to ASCII.
pub fn fallback_table() -> RuleTable {
    RuleTable::new(vec![
        rule!(Replace [0x2013] => "-"),   // en dash
        rule!(Replace [0x2014] => "--"),  // em dash
        rule!(Replace [0x2018] => "'"),   // left single quotation mark
        rule!(Replace [0x2019] => "'"),   // right single quotation mark
        rule!(Replace [0x201A] => "'"),   // single low-9 quotation mark
        rule!(Replace [0x201C] => "\""),  // left double quotation mark
        rule!(Replace [0x201D] => "\""),  // right double quotation mark
        rule!(Replace [0x201E] => "\""),  // double low-9 quotation mark
    ])
}
