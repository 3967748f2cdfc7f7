
use std::cell::Cell;

use proptest::prelude::*;
use shop_rules::{order, CompareOp, Condition, NumericFact, Snapshot, Tier};
use strategies::{
    arb_compare_op, arb_condition, arb_context, arb_membership_op, arb_rulesets, arb_selection,
    catalog,
};

// ---------------------------------------------------------------------------
// Invariant 1: Numeric operators agree with plain comparison
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn numeric_operator_consistency(
        op in arb_compare_op(),
        threshold in 0_u32..30,
        ctx in arb_context(),
    ) {
        let threshold = f64::from(threshold);
        let condition = Condition::numeric(NumericFact::TotalQuantity, op, threshold);
        #[allow(clippy::cast_precision_loss)]
        let fact = ctx.total_quantity() as f64;
        prop_assert_eq!(condition.evaluate(&ctx, &catalog()), op.compare(fact, threshold));
    }

    #[test]
    fn equal_and_not_equal_are_complements(threshold in 0_u32..30, ctx in arb_context()) {
        let c = catalog();
        let threshold = f64::from(threshold);
        let eq = Condition::numeric(NumericFact::TotalQuantity, CompareOp::Eq, threshold);
        let neq = Condition::numeric(NumericFact::TotalQuantity, CompareOp::Neq, threshold);
        prop_assert_ne!(eq.evaluate(&ctx, &c), neq.evaluate(&ctx, &c));
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Exclusion operators negate inclusion, except that blank
// conditions are false under both
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn membership_negation_duality(selection in arb_selection(), ctx in arb_context()) {
        use shop_rules::MembershipOp::{Excludes, Includes};

        let c = catalog();
        let includes = selection.with_op(Some(Includes)).evaluate(&ctx, &c);
        let excludes = selection.with_op(Some(Excludes)).evaluate(&ctx, &c);
        if selection.is_empty() {
            prop_assert!(!includes);
            prop_assert!(!excludes);
        } else {
            prop_assert_ne!(includes, excludes);
        }
    }

    #[test]
    fn blank_operator_is_false(selection in arb_selection(), ctx in arb_context()) {
        prop_assert!(!selection.with_op(None).evaluate(&ctx, &catalog()));
    }

    #[test]
    fn evaluation_is_deterministic(condition in arb_condition(), ctx in arb_context()) {
        let c = catalog();
        let first = condition.evaluate(&ctx, &c);
        for _ in 0..3 {
            prop_assert_eq!(condition.evaluate(&ctx, &c), first);
        }
    }

    #[test]
    fn membership_op_round_trips_through_both_spellings(op in arb_membership_op()) {
        use shop_rules::MembershipOp;

        prop_assert_eq!(MembershipOp::from_wire(op.as_role_wire()), Some(op));
        prop_assert_eq!(MembershipOp::from_wire(op.as_cart_wire()), Some(op));
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Priority ordering
//
// Set priorities ascend, ties and blanks keep index order, blanks go last.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn order_is_a_sorted_permutation(rulesets in arb_rulesets()) {
        let scheduled = order(&rulesets);
        prop_assert_eq!(scheduled.len(), rulesets.len());

        let mut seen = scheduled.clone();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), rulesets.len());

        let keys: Vec<(bool, i64, usize)> = scheduled
            .iter()
            .map(|&idx| {
                let priority = rulesets[idx].priority;
                (priority.is_none(), priority.unwrap_or_default(), idx)
            })
            .collect();
        for pair in keys.windows(2) {
            prop_assert!(pair[0] < pair[1], "out of order: {:?}", keys);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Stop toggle short-circuits
//
// Counted with the evaluator: after a stop-toggled rule-set is evaluated,
// nothing else is, whether it matched or not.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn stop_toggle_short_circuits(rulesets in arb_rulesets(), outcome in any::<bool>()) {
        let mut snapshot = Snapshot::new(Tier::Paid);
        for ruleset in &rulesets {
            snapshot = snapshot.ruleset(ruleset.clone());
        }

        let calls = Cell::new(0_usize);
        let report = snapshot.apply_with(&catalog(), |_| {
            calls.set(calls.get() + 1);
            outcome
        });

        let runnable: Vec<usize> = order(&rulesets)
            .into_iter()
            .filter(|&idx| !rulesets[idx].condition.is_blank())
            .collect();
        let expected = match runnable.iter().position(|&idx| rulesets[idx].stop_other_rules) {
            Some(pos) => pos + 1,
            None => runnable.len(),
        };

        prop_assert_eq!(calls.get(), expected);
        prop_assert_eq!(report.evaluated(), &runnable[..expected]);
        if let Some(stop) = report.halted_at() {
            prop_assert_eq!(report.evaluated().last(), Some(&stop));
        }
        if outcome {
            prop_assert_eq!(report.matched(), report.evaluated());
        } else {
            prop_assert!(report.plan().is_empty());
        }
    }

    #[test]
    fn free_tier_evaluates_at_most_once(rulesets in arb_rulesets()) {
        let mut snapshot = Snapshot::new(Tier::Free);
        for ruleset in &rulesets {
            snapshot = snapshot.ruleset(ruleset.clone());
        }
        let calls = Cell::new(0_usize);
        let report = snapshot.apply_with(&catalog(), |_| {
            calls.set(calls.get() + 1);
            true
        });
        prop_assert!(calls.get() <= 1);
        prop_assert!(report.evaluated().iter().all(|&idx| idx == 0));
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Exclusions are a union
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn plan_is_union_of_matched(rulesets in arb_rulesets(), ctx in arb_context()) {
        let mut snapshot = Snapshot::new(Tier::Paid);
        for ruleset in &rulesets {
            snapshot = snapshot.ruleset(ruleset.clone());
        }
        let report = snapshot.apply_detailed(&ctx, &catalog());

        let expected: Vec<u64> = {
            let mut ids: Vec<u64> = report.matched().iter().map(|&idx| 100 + idx as u64).collect();
            ids.sort_unstable();
            ids
        };
        let actual: Vec<u64> = report.plan().product_ids().iter().copied().collect();
        prop_assert_eq!(actual, expected);
    }
}
