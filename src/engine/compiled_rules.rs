//! Rule indexing.
//!
//! Scanning every rule at every input position is correct but slow for large
//! tables (thousands of caption rules are common). `CompiledRules` builds a
//! cheap index once per table so that the converter only tests rules that can
//! possibly match the code point under the cursor.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `CompiledRules::rules` (table order).
//! - Every id list in `RuleIndex` is strictly ascending, so merging them in
//!   ascending order visits candidates in table order. The first candidate that
//!   matches is therefore the first rule in the table that matches.

use crate::{Pattern, Rule, RuleTable};
use std::collections::HashMap;

/// Rule identifier (index into the table).
pub type RuleId = usize;

#[derive(Debug, Default, Clone)]
pub struct RuleIndex {
    /// Sequence rules keyed by the first code point of their left side.
    pub by_first: HashMap<u32, Vec<RuleId>>,
    /// All range rules.
    pub ranges: Vec<RuleId>,
}

/// A rule table plus its lookup index.
#[derive(Debug, Clone)]
pub struct CompiledRules<'a> {
    pub rules: &'a [Rule],
    pub index: RuleIndex,
}

impl<'a> CompiledRules<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        let rules = table.rules();
        let mut index = RuleIndex::default();

        for (id, rule) in rules.iter().enumerate() {
            match &rule.pattern {
                Pattern::Range { .. } => index.ranges.push(id),
                Pattern::Sequence(left) => {
                    if let Some(&first) = left.first() {
                        index.by_first.entry(first).or_default().push(id);
                    }
                }
            }
        }

        Self { rules, index }
    }

    /// The first rule (in table order) matching at `at`, with its match length.
    ///
    /// Also returns how many candidates were tested, for metrics.
    pub fn first_match(&self, input: &[u32], at: usize) -> (Option<(RuleId, usize)>, usize) {
        let Some(&cp) = input.get(at) else {
            return (None, 0);
        };

        let mut sequences = self.index.by_first.get(&cp).map_or(&[][..], Vec::as_slice).iter().copied().peekable();
        let mut ranges = self
            .index
            .ranges
            .iter()
            .copied()
            .filter(|&id| matches!(self.rules[id].pattern, Pattern::Range { low, high } if low <= cp && cp <= high))
            .peekable();

        let mut tested = 0;
        loop {
            let next = match (sequences.peek(), ranges.peek()) {
                (Some(&s), Some(&r)) if s < r => sequences.next(),
                (_, Some(_)) => ranges.next(),
                (Some(_), None) => sequences.next(),
                (None, None) => None,
            };
            let Some(id) = next else {
                return (None, tested);
            };

            tested += 1;
            if let Some(len) = self.rules[id].pattern.match_len(input, at) {
                return (Some((id, len)), tested);
            }
        }
    }
}
