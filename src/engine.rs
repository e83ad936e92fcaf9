//! Substitution engine.
//!
//! The engine rewrites a sequence of code points with a [`RuleTable`](crate::RuleTable)
//! in one left-to-right pass:
//!
//! ```text
//! table ──> CompiledRules::new        (compiled_rules.rs)
//!               │  index sequence rules by first code point,
//!               │  keep range rules in table order
//!               v
//! input ──> Converter::run            (converter.rs)
//!               │  at each cursor position: first matching rule wins
//!               │  no match -> copy one code point
//!               v
//!           render                    (render.rs)
//!               │  Accept / Replace / Custom / numeric notations
//!               v
//!           RunResult { text, changes, metrics }   (metrics.rs)
//! ```
//!
//! ## Semantics
//!
//! - Leftmost, first-rule-wins, no backtracking: once a rule is applied the
//!   cursor moves past everything it matched.
//! - A range rule consumes one code point, a sequence rule its whole left side.
//! - `changes` counts rule applications other than `Accept`, not characters.
//! - The engine holds no state between runs; a `Converter` may be reused and
//!   shared across threads as long as its table is not being rebuilt.
//!
//! ## Debugging
//!
//! Each applied rule is traced at `TRACE` level and each run summarised at
//! `DEBUG` level (see `RUST_LOG`).

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/converter.rs"]
mod converter;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/render.rs"]
mod render;


pub use compiled_rules::{CompiledRules, RuleId, RuleIndex};
pub use converter::Converter;
pub use metrics::{RunMetrics, RunResult};
pub use render::CustomFormatter;
