//! compiler.rs - Turns a `RewriteConfig` into ready-to-apply rules.
//!
//! Compilation substitutes the receiver into each pattern, builds the regexes,
//! works out which capture groups are positional arguments and trial-renders
//! every replacement template. Anything that could go wrong while rewriting
//! is caught here, so a compiled rule set can only fail on I/O.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::config::{RewriteConfig, RewriteRule, RuleKind, MAX_PATTERN_LENGTH, RECEIVER_PLACEHOLDER};
use crate::errors::CurvefixError;

/// Named group holding the variable a `price_split` result was assigned to.
pub const BINDING_GROUP: &str = "binding";
/// Named group holding the `true`/`false` flag of a `price_split` call.
pub const FLAG_GROUP: &str = "flag";

/// Values available to a replacement template.
#[derive(Debug, Default, Serialize)]
pub struct RenderContext<'a> {
    pub receiver: &'a str,
    /// Reordered arguments joined with `", "`.
    pub arguments: String,
    pub binding: &'a str,
    pub slot: &'a str,
    pub selected: &'a str,
}

/// Destructuring names for a split price getter: the first slot of the
/// tuple, and the variable the caller's binding is assigned from.
///
/// The `false` case names the unused slot `yesPrice_temp` while the `true`
/// case uses plain `yesPrice`. Migrated test files already depend on these
/// exact names.
pub fn price_bindings(is_yes: bool) -> (&'static str, &'static str) {
    if is_yes {
        ("yesPrice", "yesPrice")
    } else {
        ("yesPrice_temp", "noPrice")
    }
}

/// How a compiled rule finds its matches.
#[derive(Debug)]
pub enum Matcher {
    /// Exact text and its already rendered replacement.
    Literal { needle: String, replacement: String },
    Regex(Regex),
}

/// A single compiled rewrite rule.
#[derive(Debug)]
pub struct CompiledRule {
    pub name: String,
    pub label: String,
    /// One-line description of the interface change, for reports.
    pub description: String,
    pub kind: RuleKind,
    pub matcher: Matcher,
    /// Matches `<call>\s*(` for balanced argument scanning.
    pub call_regex: Option<Regex>,
    /// Positions into the positional arguments, in output order.
    pub argument_order: Vec<usize>,
    /// Capture group indices of the unnamed groups, in pattern order.
    pub positional_groups: Vec<usize>,
    receiver: String,
    template: String,
}

impl CompiledRule {
    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    /// Renders the replacement template against `ctx`.
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<String, CurvefixError> {
        render_template(&self.name, &self.template, ctx)
    }

    /// Applies `argument_order` to the positional arguments.
    pub fn reordered<'a>(&self, positional: &[&'a str]) -> Vec<&'a str> {
        self.argument_order
            .iter()
            .filter_map(|&i| positional.get(i).copied())
            .collect()
    }

    /// Applies `argument_order` to the positional arguments and joins them.
    pub fn reorder(&self, positional: &[&str]) -> String {
        self.reordered(positional).join(", ")
    }
}

/// All enabled rules of a config, compiled, in pass order.
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
}

fn render_template(name: &str, template: &str, ctx: &RenderContext<'_>) -> Result<String, CurvefixError> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(name, template)
        .map_err(|e| CurvefixError::Template(name.to_string(), e.to_string()))?;
    tt.render(name, ctx)
        .map_err(|e| CurvefixError::Template(name.to_string(), e.to_string()))
}

/// Compiles every enabled rule of `config`.
///
/// Errors from all rules are collected and reported together.
pub fn compile_rules(config: &RewriteConfig) -> Result<CompiledRules, CurvefixError> {
    let receiver = config.receiver();
    let active: Vec<&RewriteRule> = config.active_rules().collect();
    debug!("Starting compilation of {} rules for receiver '{}'.", active.len(), receiver);

    let mut compiled_rules = Vec::with_capacity(active.len());
    let mut compilation_errors = Vec::new();

    for rule in active {
        match compile_rule(rule, receiver) {
            Ok(compiled) => {
                log::debug!(
                    target: "curvefix_core::compiler",
                    "Rule '{}' compiled successfully.",
                    &rule.name
                );
                compiled_rules.push(compiled);
            }
            Err(e) => compilation_errors.push(e),
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(CurvefixError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
    Ok(CompiledRules { rules: compiled_rules })
}

fn compile_rule(rule: &RewriteRule, receiver: &str) -> Result<CompiledRule, CurvefixError> {
    let pattern = rule
        .pattern
        .as_deref()
        .ok_or_else(|| CurvefixError::Fatal(format!("Rule '{}' has no pattern.", rule.name)))?;

    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(CurvefixError::PatternLengthExceeded(
            rule.name.clone(),
            pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }

    let base_ctx = RenderContext {
        receiver,
        ..Default::default()
    };

    if rule.kind == RuleKind::Literal {
        let needle = pattern.replace(RECEIVER_PLACEHOLDER, receiver);
        let replacement = render_template(&rule.name, &rule.replace_with, &base_ctx)?;
        return Ok(CompiledRule {
            name: rule.name.clone(),
            label: rule.label().to_string(),
            description: rule.description().to_string(),
            kind: rule.kind,
            matcher: Matcher::Literal { needle, replacement },
            call_regex: None,
            argument_order: Vec::new(),
            positional_groups: Vec::new(),
            receiver: receiver.to_string(),
            template: rule.replace_with.clone(),
        });
    }

    let escaped_receiver = regex::escape(receiver);
    let regex = RegexBuilder::new(&pattern.replace(RECEIVER_PLACEHOLDER, &escaped_receiver))
        .multi_line(rule.multiline)
        .dot_matches_new_line(rule.dot_matches_new_line)
        .size_limit(10 * (1 << 20))
        .build()
        .map_err(|e| CurvefixError::RuleCompilationError(rule.name.clone(), e))?;

    let positional_groups: Vec<usize> = regex
        .capture_names()
        .enumerate()
        .skip(1)
        .filter(|(_, name)| name.is_none())
        .map(|(idx, _)| idx)
        .collect();

    let argument_order = rule.argument_order.clone().unwrap_or_default();
    if let Some(&index) = argument_order.iter().find(|&&i| i >= positional_groups.len()) {
        return Err(CurvefixError::InvalidArgumentOrder {
            rule: rule.name.clone(),
            index,
            available: positional_groups.len(),
        });
    }

    if rule.kind == RuleKind::PriceSplit {
        for group in [BINDING_GROUP, FLAG_GROUP] {
            if !regex.capture_names().flatten().any(|n| n == group) {
                return Err(CurvefixError::MissingCaptureGroup {
                    rule: rule.name.clone(),
                    group: group.to_string(),
                });
            }
        }
    }

    let call_regex = match rule.call.as_deref() {
        Some(call) if rule.kind == RuleKind::Reorder => {
            let call = call.replace(RECEIVER_PLACEHOLDER, &escaped_receiver);
            Some(
                Regex::new(&format!(r"{}\s*\(", call))
                    .map_err(|e| CurvefixError::RuleCompilationError(rule.name.clone(), e))?,
            )
        }
        Some(_) => {
            warn!("Rule '{}': `call` is only used by reorder rules; ignoring it.", rule.name);
            None
        }
        None => None,
    };

    // Unknown fields and bad syntax surface here rather than mid-rewrite.
    let (slot, selected) = price_bindings(true);
    render_template(
        &rule.name,
        &rule.replace_with,
        &RenderContext {
            receiver,
            arguments: "a".to_string(),
            binding: "b",
            slot,
            selected,
        },
    )?;

    Ok(CompiledRule {
        name: rule.name.clone(),
        label: rule.label().to_string(),
        description: rule.description().to_string(),
        kind: rule.kind,
        matcher: Matcher::Regex(regex),
        call_regex,
        argument_order,
        positional_groups,
        receiver: receiver.to_string(),
        template: rule.replace_with.clone(),
    })
}
