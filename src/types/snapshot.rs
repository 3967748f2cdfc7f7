use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::Context;
use super::evaluation_report::EvaluationReport;
use super::ruleset::RuleSet;
use crate::catalog::Catalog;
use crate::exclusion::ExclusionPlan;

/// Licensing tier of the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Only the first rule-set runs, and only with the active-product-count
    /// condition. Priorities and stop toggles are ignored.
    #[default]
    Free,
    Paid,
}

/// Immutable, per-request view of the configured rule-sets.
///
/// Rule-sets are kept sorted by their index. Loaded fresh for each request by
/// [`RulesetStore::load`](crate::store::RulesetStore::load) or built directly.
///
/// # Example
///
/// ```
/// use shop_rules::{
///     CompareOp, Condition, Context, MemoryCatalog, NumericFact, RuleSet, Snapshot, Tier,
/// };
///
/// let snapshot = Snapshot::new(Tier::Paid).ruleset(
///     RuleSet::new(0, Condition::numeric(NumericFact::TotalQuantity, CompareOp::Gt, 3.0))
///         .hide_products(|p| p.products([42])),
/// );
///
/// let ctx = Context::new().cart_line(7, 0, 5);
/// let plan = snapshot.apply(&ctx, &MemoryCatalog::new());
/// assert!(plan.product_ids().contains(&42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    enabled: bool,
    tier: Tier,
    rulesets: Vec<RuleSet>,
}

impl Snapshot {
    /// An enabled snapshot with no rule-sets.
    #[must_use]
    pub fn new(tier: Tier) -> Self {
        Self {
            enabled: true,
            tier,
            rulesets: Vec::new(),
        }
    }

    /// Load from a JSON document of stored options (option name to value),
    /// using the default option prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ShopRulesError`](crate::ShopRulesError) on invalid JSON or a
    /// malformed serialized option.
    pub fn from_options_json(json: &str) -> Result<Self, crate::ShopRulesError> {
        let store = crate::store::MemoryOptionStore::from_json(json)?;
        Ok(crate::store::RulesetStore::new(store).load())
    }

    /// Read an options JSON file. See [`from_options_json`](Self::from_options_json).
    ///
    /// # Errors
    ///
    /// Returns [`ShopRulesError`](crate::ShopRulesError) on I/O or decode failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::ShopRulesError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_options_json(&input)
    }

    /// Turn rule processing on or off as a whole.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add a rule-set. A rule-set with an index already present replaces it.
    #[must_use]
    pub fn ruleset(mut self, ruleset: RuleSet) -> Self {
        match self
            .rulesets
            .binary_search_by_key(&ruleset.index, |r| r.index)
        {
            Ok(pos) => self.rulesets[pos] = ruleset,
            Err(pos) => self.rulesets.insert(pos, ruleset),
        }
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Rule-sets sorted by index.
    #[must_use]
    pub fn rulesets(&self) -> &[RuleSet] {
        &self.rulesets
    }

    /// Look up a rule-set by its index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RuleSet> {
        self.rulesets
            .binary_search_by_key(&index, |r| r.index)
            .ok()
            .map(|pos| &self.rulesets[pos])
    }

    /// Run the rule-sets against the request and return the merged exclusions.
    #[must_use]
    pub fn apply<C: Catalog + ?Sized>(&self, ctx: &Context, catalog: &C) -> ExclusionPlan {
        self.apply_detailed(ctx, catalog).into_plan()
    }

    /// Like [`apply`](Self::apply), with the evaluation trace.
    pub fn apply_detailed<C: Catalog + ?Sized>(
        &self,
        ctx: &Context,
        catalog: &C,
    ) -> EvaluationReport {
        crate::schedule::run(self, catalog, |ruleset| {
            ruleset.condition.evaluate(ctx, catalog)
        })
    }

    /// Run with a caller-supplied condition evaluator. The evaluator is called
    /// once per rule-set whose condition would be evaluated.
    pub fn apply_with<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        evaluator: impl FnMut(&RuleSet) -> bool,
    ) -> EvaluationReport {
        crate::schedule::run(self, catalog, evaluator)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Snapshot({:?}, {} rulesets{})",
            self.tier,
            self.rulesets.len(),
            if self.enabled { "" } else { ", disabled" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompareOp, Condition, NumericFact};

    fn rs(index: usize) -> RuleSet {
        RuleSet::new(
            index,
            Condition::numeric(NumericFact::TotalQuantity, CompareOp::Gt, 0.0),
        )
    }

    #[test]
    fn rulesets_sorted_by_index() {
        let snap = Snapshot::new(Tier::Paid).ruleset(rs(4)).ruleset(rs(1)).ruleset(rs(2));
        let indices: Vec<usize> = snap.rulesets().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert!(snap.get(2).is_some());
        assert!(snap.get(3).is_none());
    }

    #[test]
    fn same_index_replaces() {
        let snap = Snapshot::new(Tier::Paid)
            .ruleset(rs(1))
            .ruleset(rs(1).priority(9));
        assert_eq!(snap.rulesets().len(), 1);
        assert_eq!(snap.get(1).and_then(|r| r.priority), Some(9));
    }

    #[test]
    fn display() {
        let snap = Snapshot::new(Tier::Free).ruleset(rs(0)).enabled(false);
        assert_eq!(snap.to_string(), "Snapshot(Free, 1 rulesets, disabled)");
    }
}
