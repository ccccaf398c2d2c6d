// curvefix-core/src/engines/regex_engine.rs
//! A `RewriteEngine` implementation that applies compiled rules with
//! regular expressions, one full pass over the text per rule.
//! License: MIT OR APACHE 2.0

use log::{debug, warn};

use crate::arguments;
use crate::config::{RewriteConfig, RewriteSummaryItem, RuleKind};
use crate::engine::{ArgumentMode, EngineOptions, RewriteEngine};
use crate::errors::CurvefixError;
use crate::rewrite_match::{line_number_at, summarize, RewriteMatch};
use crate::rules::compiler::{
    compile_rules, price_bindings, CompiledRule, CompiledRules, Matcher, RenderContext, BINDING_GROUP, FLAG_GROUP,
};

/// Output of a single pass.
type PassOutput = (String, Vec<RewriteMatch>);

#[derive(Debug)]
pub struct RegexRewriteEngine {
    compiled_rules: CompiledRules,
    config: RewriteConfig,
    options: EngineOptions,
}

impl RegexRewriteEngine {
    pub fn new(config: RewriteConfig) -> Result<Self, CurvefixError> {
        Self::with_options(config, EngineOptions::default())
    }

    pub fn with_options(config: RewriteConfig, options: EngineOptions) -> Result<Self, CurvefixError> {
        let compiled_rules = compile_rules(&config)?;
        Ok(Self {
            compiled_rules,
            config,
            options,
        })
    }

    /// Runs every rule in order, returning the final text and each rule's
    /// matches.
    fn run_passes(&self, content: &str, source_id: &str) -> Result<(String, Vec<Vec<RewriteMatch>>), CurvefixError> {
        let mut current = content.to_string();
        let mut per_rule = Vec::with_capacity(self.compiled_rules.rules.len());

        for rule in &self.compiled_rules.rules {
            let (next, matches) = self.apply_rule(rule, &current, source_id)?;
            debug!("Rule '{}' rewrote {} occurrence(s).", rule.name, matches.len());
            current = next;
            per_rule.push(matches);
        }
        Ok((current, per_rule))
    }

    fn apply_rule(&self, rule: &CompiledRule, content: &str, source_id: &str) -> Result<PassOutput, CurvefixError> {
        match &rule.matcher {
            Matcher::Literal { needle, replacement } => Ok(apply_literal(rule, needle, replacement, content, source_id)),
            Matcher::Regex(re) => match (&rule.call_regex, self.options.argument_mode) {
                (Some(call), ArgumentMode::Balanced) if rule.kind == RuleKind::Reorder => {
                    apply_balanced(rule, call, content, source_id)
                }
                _ => apply_regex(rule, re, content, source_id),
            },
        }
    }
}

fn new_match(rule: &CompiledRule, content: &str, start: usize, end: usize, replacement: String, suspect: bool, source_id: &str) -> RewriteMatch {
    RewriteMatch {
        rule_name: rule.name.clone(),
        original: content[start..end].to_string(),
        replacement,
        start,
        end,
        line_number: line_number_at(content, start),
        suspect,
        source_id: source_id.to_string(),
    }
}

fn apply_literal(rule: &CompiledRule, needle: &str, replacement: &str, content: &str, source_id: &str) -> PassOutput {
    let matches: Vec<RewriteMatch> = content
        .match_indices(needle)
        .map(|(start, text)| new_match(rule, content, start, start + text.len(), replacement.to_string(), false, source_id))
        .collect();

    if matches.is_empty() {
        return (content.to_string(), matches);
    }
    (content.replace(needle, replacement), matches)
}

fn apply_regex(rule: &CompiledRule, re: &regex::Regex, content: &str, source_id: &str) -> Result<PassOutput, CurvefixError> {
    let mut rewritten = String::with_capacity(content.len());
    let mut matches = Vec::new();
    let mut last_end = 0usize;

    for caps in re.captures_iter(content) {
        let whole = caps
            .get(0)
            .ok_or_else(|| CurvefixError::Fatal("Regex capture failed".to_string()))?;

        let positional: Vec<&str> = rule
            .positional_groups
            .iter()
            .map(|&i| caps.get(i).map_or("", |m| m.as_str().trim()))
            .collect();
        let suspect = positional
            .iter()
            .any(|arg| !arguments::is_balanced(arg) || arguments::line_comment_start(arg).is_some());

        let mut ctx = RenderContext {
            receiver: rule.receiver(),
            arguments: rule.reorder(&positional),
            ..Default::default()
        };
        if rule.kind == RuleKind::PriceSplit {
            let is_yes = caps.name(FLAG_GROUP).is_some_and(|m| m.as_str() == "true");
            let (slot, selected) = price_bindings(is_yes);
            ctx.binding = caps.name(BINDING_GROUP).map_or("", |m| m.as_str());
            ctx.slot = slot;
            ctx.selected = selected;
        }
        let replacement = rule.render(&ctx)?;

        let m = new_match(rule, content, whole.start(), whole.end(), replacement, suspect, source_id);
        if suspect {
            warn!(
                "Rule '{}' at line {}: an argument was probably split at a nested comma or ends in a `//` comment: {}",
                rule.name, m.line_number, m.original
            );
        }

        rewritten.push_str(&content[last_end..whole.start()]);
        rewritten.push_str(&m.replacement);
        last_end = whole.end();
        matches.push(m);
    }

    rewritten.push_str(&content[last_end..]);
    Ok((rewritten, matches))
}

fn apply_balanced(rule: &CompiledRule, call: &regex::Regex, content: &str, source_id: &str) -> Result<PassOutput, CurvefixError> {
    let expected = rule.positional_groups.len();
    let mut rewritten = String::with_capacity(content.len());
    let mut matches = Vec::new();
    let mut last_end = 0usize;
    let mut pos = 0usize;

    while let Some(opener) = call.find_at(content, pos) {
        let open = opener.end() - 1;
        let Some(close) = arguments::find_call_end(content, open) else {
            debug!(
                "Rule '{}' at line {}: call is never closed; leaving it untouched.",
                rule.name,
                line_number_at(content, opener.start())
            );
            pos = opener.end();
            continue;
        };

        let args = arguments::split_top_level(&content[open + 1..close]);
        if args.len() != expected {
            debug!(
                "Rule '{}' at line {}: expected {} arguments, found {}; leaving call untouched.",
                rule.name,
                line_number_at(content, opener.start()),
                expected,
                args.len()
            );
            pos = opener.end();
            continue;
        }

        let replacement = rule.render(&RenderContext {
            receiver: rule.receiver(),
            arguments: arguments::join_arguments(&rule.reordered(&args)),
            ..Default::default()
        })?;

        rewritten.push_str(&content[last_end..opener.start()]);
        rewritten.push_str(&replacement);
        matches.push(new_match(rule, content, opener.start(), close + 1, replacement, false, source_id));
        last_end = close + 1;
        pos = close + 1;
    }

    rewritten.push_str(&content[last_end..]);
    Ok((rewritten, matches))
}

impl RewriteEngine for RegexRewriteEngine {
    fn rewrite(&self, content: &str, source_id: &str) -> Result<(String, Vec<RewriteSummaryItem>), CurvefixError> {
        let (rewritten, per_rule) = self.run_passes(content, source_id)?;
        let summary = self
            .compiled_rules
            .rules
            .iter()
            .zip(per_rule.iter())
            .map(|(rule, matches)| summarize(&rule.name, &rule.label, matches))
            .collect();
        Ok((rewritten, summary))
    }

    fn find_matches(&self, content: &str, source_id: &str) -> Result<Vec<RewriteMatch>, CurvefixError> {
        let (_, per_rule) = self.run_passes(content, source_id)?;
        Ok(per_rule.into_iter().flatten().collect())
    }

    fn compiled_rules(&self) -> &CompiledRules { &self.compiled_rules }
    fn get_rules(&self) -> &RewriteConfig { &self.config }
    fn get_options(&self) -> &EngineOptions { &self.options }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RegexRewriteEngine {
        RegexRewriteEngine::new(RewriteConfig::load_default_rules().unwrap()).unwrap()
    }

    fn balanced_engine() -> RegexRewriteEngine {
        RegexRewriteEngine::with_options(
            RewriteConfig::load_default_rules().unwrap(),
            EngineOptions { argument_mode: ArgumentMode::Balanced },
        )
        .unwrap()
    }

    fn rewrite(engine: &RegexRewriteEngine, input: &str) -> String {
        engine.rewrite(input, "test").unwrap().0
    }

    #[test]
    fn renames_name_calls() {
        let out = rewrite(&engine(), "expect(await lmsr.name()).to.equal(\"LMSR\");\nlmsr.name();");
        assert_eq!(out, "expect(await lmsr.curveName()).to.equal(\"LMSR\");\nlmsr.curveName();");
    }

    #[test]
    fn other_receivers_are_left_alone() {
        let input = "token.name(); lmsr.name(1);";
        assert_eq!(rewrite(&engine(), input), input);
    }

    #[test]
    fn splits_yes_price_getter() {
        let out = rewrite(
            &engine(),
            "const price = await lmsr.getPrice(yesShares, noShares, true, LIQUIDITY_PARAM);",
        );
        assert_eq!(
            out,
            "const [yesPrice, noPrice] = await lmsr.getPrices(LIQUIDITY_PARAM, yesShares, noShares);\n            const price = yesPrice;"
        );
    }

    #[test]
    fn splits_no_price_getter_with_temp_slot() {
        let out = rewrite(&engine(), "const p = await lmsr.getPrice(a, b, false, params);");
        assert_eq!(
            out,
            "const [yesPrice_temp, noPrice] = await lmsr.getPrices(params, a, b);\n            const p = noPrice;"
        );
    }

    #[test]
    fn reorders_calculate_cost() {
        let out = rewrite(&engine(), "lmsr.calculateCost(0, 0, ONE_ETHER, true, LIQUIDITY_PARAM)");
        assert_eq!(out, "lmsr.calculateCost(LIQUIDITY_PARAM, 0, 0, true, ONE_ETHER)");
    }

    #[test]
    fn reorders_multiline_calculate_refund() {
        let input = "await lmsr.calculateRefund(\n    100,\n    50,\n    shares,\n    false,\n    params\n);";
        assert_eq!(rewrite(&engine(), input), "await lmsr.calculateRefund(params, 100, 50, false, shares);");
    }

    #[test]
    fn summary_has_one_item_per_rule_in_order() {
        let (_, summary) = engine()
            .rewrite("lmsr.name(); lmsr.name(); lmsr.calculateCost(a, b, c, d, e);", "test")
            .unwrap();
        let counts: Vec<(&str, usize)> = summary.iter().map(|s| (s.rule_name.as_str(), s.occurrences)).collect();
        assert_eq!(
            counts,
            vec![("curve_name", 2), ("get_prices", 0), ("calculate_cost", 1), ("calculate_refund", 0)]
        );
    }

    #[test]
    fn nested_commas_are_flagged_as_suspect() {
        let input = "lmsr.calculateCost(0, 0, toWei(1, 'ether'), true, PARAMS)";
        let (_, summary) = engine().rewrite(input, "test").unwrap();
        let cost = summary.iter().find(|s| s.rule_name == "calculate_cost").unwrap();
        assert_eq!(cost.occurrences, 1);
        assert_eq!(cost.suspect_occurrences, 1);
    }

    #[test]
    fn balanced_mode_keeps_nested_arguments_whole() {
        let input = "lmsr.calculateCost(0, 0, toWei(1, 'ether'), true, PARAMS)";
        assert_eq!(
            rewrite(&balanced_engine(), input),
            "lmsr.calculateCost(PARAMS, 0, 0, true, toWei(1, 'ether'))"
        );
    }

    #[test]
    fn balanced_mode_skips_calls_with_wrong_arity() {
        let input = "lmsr.calculateCost(a, b, c) + lmsr.calculateCost(f(x, y), b, c, d, [e, g])";
        assert_eq!(
            rewrite(&balanced_engine(), input),
            "lmsr.calculateCost(a, b, c) + lmsr.calculateCost([e, g], f(x, y), b, d, c)"
        );
    }

    const ZERO_LIQUIDITY_CALL: &str = r#"            await expect(
                lmsr.calculateCost(
                    ethers.parseEther("1000"),
                    ethers.parseEther("1000"),
                    ONE_ETHER,
                    true,
                    0 // Invalid b = 0
                )
            ).to.be.revertedWith("Invalid liquidity parameter");"#;

    #[test]
    fn trailing_line_comment_is_flagged_as_suspect() {
        let (out, summary) = engine().rewrite(ZERO_LIQUIDITY_CALL, "test").unwrap();
        assert!(out.contains(
            r#"lmsr.calculateCost(0 // Invalid b = 0, ethers.parseEther("1000"), ethers.parseEther("1000"), true, ONE_ETHER)"#
        ));
        let cost = summary.iter().find(|s| s.rule_name == "calculate_cost").unwrap();
        assert_eq!(cost.occurrences, 1);
        assert_eq!(cost.suspect_occurrences, 1);
    }

    #[test]
    fn balanced_mode_keeps_trailing_comment_out_of_the_call() {
        let (out, summary) = balanced_engine().rewrite(ZERO_LIQUIDITY_CALL, "test").unwrap();
        assert_eq!(
            out,
            r#"            await expect(
                lmsr.calculateCost(0, // Invalid b = 0
ethers.parseEther("1000"), ethers.parseEther("1000"), true, ONE_ETHER)
            ).to.be.revertedWith("Invalid liquidity parameter");"#
        );
        let cost = summary.iter().find(|s| s.rule_name == "calculate_cost").unwrap();
        assert_eq!(cost.suspect_occurrences, 0);
    }

    #[test]
    fn find_matches_reports_lines() {
        let input = "line one\nconst x = await lmsr.getPrice(a, b, true, c);\nlmsr.calculateCost(1, 2, 3, 4, 5)";
        let matches = engine().find_matches(input, "test.js").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].rule_name, "get_prices");
        assert_eq!(matches[0].line_number, 2);
        assert_eq!(matches[1].rule_name, "calculate_cost");
        // the getPrice rewrite added a line before it
        assert_eq!(matches[1].line_number, 4);
        assert_eq!(matches[1].source_id, "test.js");
    }

    #[test]
    fn empty_input_is_a_successful_no_op() {
        let (out, summary) = engine().rewrite("", "test").unwrap();
        assert_eq!(out, "");
        assert!(summary.iter().all(|s| s.occurrences == 0));
    }
}
