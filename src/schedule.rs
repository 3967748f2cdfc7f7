use std::time::Instant;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::exclusion::ExclusionPlan;
use crate::types::{ConditionKind, EvaluationReport, RuleSet, Snapshot, Tier};

/// Order rule-sets for evaluation and return their indices.
///
/// Ascending by priority; equal priorities keep their index order. Rule-sets
/// without a priority go last, also in index order.
#[must_use]
pub fn order(rulesets: &[RuleSet]) -> Vec<usize> {
    let mut prioritized: Vec<&RuleSet> = rulesets.iter().filter(|r| r.priority.is_some()).collect();
    prioritized.sort_by_key(|r| r.priority);

    prioritized
        .into_iter()
        .chain(rulesets.iter().filter(|r| r.priority.is_none()))
        .map(|r| r.index)
        .collect()
}

pub(crate) fn run<C, F>(snapshot: &Snapshot, catalog: &C, mut evaluator: F) -> EvaluationReport
where
    C: Catalog + ?Sized,
    F: FnMut(&RuleSet) -> bool,
{
    let start = Instant::now();
    let mut plan = ExclusionPlan::new();
    let mut evaluated = Vec::new();
    let mut matched = Vec::new();
    let mut halted_at = None;

    let scheduled = if !snapshot.is_enabled() {
        debug!("rule processing disabled");
        Vec::new()
    } else {
        match snapshot.tier() {
            Tier::Free => snapshot.rulesets().first().map(|r| r.index).into_iter().collect(),
            Tier::Paid => order(snapshot.rulesets()),
        }
    };

    match snapshot.tier() {
        Tier::Free => {
            if let Some(ruleset) = scheduled.first().and_then(|&idx| snapshot.get(idx)) {
                if ruleset.condition.kind() == Some(ConditionKind::ActiveProductCount) {
                    evaluated.push(ruleset.index);
                    if evaluator(ruleset) {
                        plan.absorb(ruleset, catalog);
                        matched.push(ruleset.index);
                    }
                } else {
                    debug!(
                        index = ruleset.index,
                        "free tier only runs an active_product_count first ruleset"
                    );
                }
            }
        }
        Tier::Paid => {
            for &idx in &scheduled {
                let Some(ruleset) = snapshot.get(idx) else {
                    continue;
                };
                if ruleset.condition.is_blank() {
                    debug!(index = idx, "skipping ruleset without a condition value");
                    continue;
                }

                evaluated.push(idx);
                let hit = evaluator(ruleset);
                debug!(index = idx, priority = ?ruleset.priority, hit, "evaluated ruleset");

                if hit {
                    plan.absorb(ruleset, catalog);
                    matched.push(idx);
                }
                // A stop-toggled rule-set ends iteration whether or not it matched.
                if ruleset.stop_other_rules {
                    debug!(index = idx, hit, "stop toggle halts remaining rulesets");
                    halted_at = Some(idx);
                    break;
                }
            }
        }
    }

    info!(
        evaluated = evaluated.len(),
        matched = matched.len(),
        products = plan.product_ids().len(),
        categories = plan.category_ids().len(),
        price_filters = plan.price_filters().len(),
        "applied rulesets"
    );

    EvaluationReport::new(scheduled, evaluated, matched, halted_at, plan, start.elapsed())
}
