use std::sync::Arc;

use shop_rules::{
    Context, MemoryCatalog, PostsClauses, Product, ProductQueryArgs, Snapshot, SubcategoryArgs,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let snapshot = Snapshot::from_file("demos/options.json").expect("failed to load options");
    println!("{snapshot}");

    let catalog = MemoryCatalog::new()
        .category(20, None)
        .category(21, Some(20))
        .category(30, None)
        .category(40, None)
        .product(Product::new(12).in_categories([20]))
        .product(Product::new(15).in_categories([21]))
        .product(Product::new(16).in_categories([30]))
        .coupon("SPRING", 500);

    let ctx = Context::new()
        .cart_line(15, 0, 2)
        .subtotal("$149.90")
        .roles(["customer"]);

    // Product query hook.
    let report = snapshot.apply_detailed(&ctx, &catalog);
    println!("{report}");

    let plan = Arc::new(report.into_plan());
    let mut args = ProductQueryArgs::default();
    plan.apply_to_query(&mut args);
    let mut clauses = PostsClauses::default();
    plan.apply_price_clauses(&mut clauses, "wp_");

    println!(
        "{}",
        serde_json::to_string_pretty(&args).expect("query args serialize")
    );
    println!("JOIN:{}", clauses.join);
    println!("WHERE:{}", clauses.where_sql);

    // Category listing hook, called later by the storefront.
    let subcategories = shop_rules::ExclusionPlan::subcategory_filter(Arc::clone(&plan));
    let listing = subcategories(SubcategoryArgs {
        parent: Some(20),
        exclude: Vec::new(),
    });
    println!("Hidden categories: {:?}", listing.exclude);
}
