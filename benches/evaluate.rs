use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shop_rules::store::{MemoryOptionStore, OptionStore, RulesetStore};
use shop_rules::{
    CartIdFact, CompareOp, Condition, Context, MembershipOp, MemoryCatalog, NumericFact, Product,
    RuleSet, Snapshot, Tier,
};

/// A catalog of `n` products spread over ten categories.
fn build_catalog(n: u64) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new().coupon("SPRING", 500);
    for id in 1..=n {
        catalog = catalog
            .product(Product::new(id).in_categories([1000 + id % 10]).with_terms([2000 + id % 3]))
            .variation(10_000 + id, id);
    }
    catalog
}

/// `n` rule-sets cycling through the condition families, none of them
/// stop-toggled, so every one is evaluated.
fn build_snapshot(n: usize) -> Snapshot {
    let mut snapshot = Snapshot::new(Tier::Paid);
    for i in 0..n {
        let id = i as u64;
        let condition = match i % 4 {
            0 => Condition::numeric(NumericFact::ActiveProductCount, CompareOp::Gt, 10.0),
            1 => Condition::numeric(NumericFact::OrderSubtotal, CompareOp::Gte, 50.0),
            2 => Condition::cart_ids(CartIdFact::Categories, MembershipOp::Includes, [1000 + id % 10]),
            _ => Condition::customer_roles(MembershipOp::Excludes, ["wholesale"]),
        };
        snapshot = snapshot.ruleset(
            RuleSet::new(i, condition)
                .priority((n - i) as i64)
                .hide_products(|p| p.products([id + 1]).attribute_terms([2000 + id % 3]))
                .hide_categories(|c| c.containing_variants([10_001 + id]).product_count(CompareOp::Lt, 3.0)),
        );
    }
    snapshot
}

fn build_context() -> Context {
    Context::new()
        .cart_line(3, 0, 2)
        .cart_line(7, 10_007, 1)
        .subtotal("$1,250.00")
        .coupon("SPRING")
        .roles(["customer"])
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let ctx = build_context();

    for &products in &[100_u64, 1_000] {
        let catalog = build_catalog(products);
        for &n in &[5, 20, 50] {
            let snapshot = build_snapshot(n);
            group.bench_function(&format!("{n}_rulesets_{products}_products"), |b| {
                b.iter(|| snapshot.apply(black_box(&ctx), &catalog));
            });
        }
    }

    group.finish();
}

fn bench_conditions(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition");
    let ctx = build_context();
    let catalog = build_catalog(1_000);

    let cases = [
        ("active_product_count", Condition::numeric(NumericFact::ActiveProductCount, CompareOp::Gt, 10.0)),
        ("order_subtotal", Condition::numeric(NumericFact::OrderSubtotal, CompareOp::Gte, 50.0)),
        ("product_categories", Condition::cart_ids(CartIdFact::Categories, MembershipOp::Excludes, [1001, 1002, 1003])),
        ("coupon_applied", Condition::cart_ids(CartIdFact::Coupons, MembershipOp::Includes, [500])),
    ];
    for (name, condition) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| condition.evaluate(black_box(&ctx), &catalog));
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for &n in &[5, 20, 50] {
        let snapshot = build_snapshot(n);
        let mut store = RulesetStore::new(MemoryOptionStore::new());
        store.save(snapshot.rulesets()).unwrap();
        let mut memory = store.into_inner();
        memory
            .update_option("woo_shop_manager_ruleset_toggle", "yes".into())
            .unwrap();
        let store = RulesetStore::new(memory);

        group.bench_function(&format!("{n}_rulesets"), |b| {
            b.iter(|| black_box(store.load()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_apply, bench_conditions, bench_load);
criterion_main!(benches);
