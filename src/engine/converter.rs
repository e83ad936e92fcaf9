use super::compiled_rules::CompiledRules;
use super::metrics::{RunMetrics, RunResult};
use super::render::{CustomFormatter, render};
use crate::{RuleTable, codec};
use std::time::Instant;

/// Applies a rule table to code-point input.
///
/// Build once per table and reuse; `run` takes `&self`.
pub struct Converter<'a> {
    compiled: CompiledRules<'a>,
    custom: Option<&'a CustomFormatter>,
}

impl<'a> Converter<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { compiled: CompiledRules::new(table), custom: None }
    }

    /// Render `custom` rules with `format` instead of the default `<U+XXXX right>`.
    pub fn with_custom(mut self, format: &'a CustomFormatter) -> Self {
        self.custom = Some(format);
        self
    }

    pub fn compiled(&self) -> &CompiledRules<'a> {
        &self.compiled
    }

    /// Rewrite `input` in one left-to-right pass.
    pub fn run(&self, input: &[u32]) -> RunResult {
        let start = Instant::now();
        let rules = self.compiled.rules;

        let mut text = String::with_capacity(input.len());
        let mut diagnostics = Vec::new();
        let mut metrics = RunMetrics { rule_hits: vec![0; rules.len()], ..RunMetrics::default() };
        let mut changes = 0;
        let mut cursor = 0;

        while cursor < input.len() {
            metrics.positions += 1;
            let (found, tested) = self.compiled.first_match(input, cursor);
            metrics.candidates_tested += tested;

            match found {
                Some((id, len)) => {
                    let rule = &rules[id];
                    render(rule, &input[cursor..cursor + len], self.custom, &mut text, &mut diagnostics);
                    tracing::trace!(rule = id, line = ?rule.line, action = rule.action.keyword(), at = cursor, len, "rule applied");

                    metrics.rule_hits[id] += 1;
                    if rule.action.is_change() {
                        changes += 1;
                    }
                    cursor += len;
                }
                None => {
                    if let Err(err) = codec::push_code_point(&mut text, input[cursor]) {
                        diagnostics.push(err);
                    }
                    metrics.unmatched += 1;
                    cursor += 1;
                }
            }
        }

        metrics.total = start.elapsed();
        tracing::debug!(
            input = input.len(),
            changes,
            unmatched = metrics.unmatched,
            candidates = metrics.candidates_tested,
            elapsed_us = metrics.total.as_micros() as u64,
            "conversion finished"
        );

        RunResult { text, changes, diagnostics, metrics }
    }
}
