use std::cell::Cell;

use shop_rules::{
    CompareOp, Condition, Context, MemoryCatalog, NumericFact, Product, RuleSet, Snapshot, Tier,
};

fn main() {
    let snapshot = Snapshot::new(Tier::Paid)
        .ruleset(
            RuleSet::new(
                0,
                Condition::numeric(NumericFact::TotalQuantity, CompareOp::Gt, 10.0),
            )
            .priority(0)
            .stop_other_rules(true)
            .hide_products(|p| p.products([1])),
        )
        .ruleset(
            RuleSet::new(
                1,
                Condition::numeric(NumericFact::ActiveProductCount, CompareOp::Gte, 1.0),
            )
            .priority(1)
            .hide_products(|p| p.products([2])),
        );

    let catalog = MemoryCatalog::new()
        .product(Product::new(1))
        .product(Product::new(2));
    let ctx = Context::new().cart_line(1, 0, 3);

    // Rule-set 0 is false but stop-toggled, so rule-set 1 never runs.
    let report = snapshot.apply_detailed(&ctx, &catalog);
    println!("{report}");
    println!();
    println!("Scheduled order: {:?}", report.order());
    println!("Evaluated: {:?}", report.evaluated());
    println!("Halted at: {:?}", report.halted_at());
    println!("{}", report.plan());

    let calls = Cell::new(0);
    let forced = snapshot.apply_with(&catalog, |_| {
        calls.set(calls.get() + 1);
        true
    });
    println!("Forced match after {} evaluation(s): {}", calls.get(), forced.plan());
}
