//! Conditional product and category hiding for a WooCommerce-style shop page.
//!
//! A shop owner configures rule-sets. Each pairs one condition about the
//! request (cart contents, subtotal, customer role, product counts) with
//! exclusions to apply when it holds. Per request, a [`Snapshot`] of the
//! rule-sets is run against a [`Context`] and a [`Catalog`], producing an
//! [`ExclusionPlan`]: product IDs, category IDs, taxonomy clauses and price
//! filters the storefront's query hooks apply.
//!
//! Conditions fail closed. A blank operator or comparison value, an operator
//! from another condition family, or an unknown condition kind all evaluate
//! to `false`.
//!
//! ```
//! use shop_rules::{
//!     CompareOp, Condition, Context, MemoryCatalog, NumericFact, Product, RuleSet, Snapshot,
//!     Tier,
//! };
//!
//! let catalog = MemoryCatalog::new()
//!     .product(Product::new(1).in_categories([10]))
//!     .product(Product::new(2).in_categories([11]));
//!
//! let snapshot = Snapshot::new(Tier::Paid).ruleset(
//!     RuleSet::new(0, Condition::numeric(NumericFact::OrderSubtotal, CompareOp::Gte, 50.0))
//!         .hide_categories(|c| c.categories([11])),
//! );
//!
//! let plan = snapshot.apply(&Context::new().subtotal("$75.00"), &catalog);
//! assert!(plan.category_ids().contains(&11));
//! ```

mod catalog;
mod error;
mod evaluate;
mod exclusion;
pub mod numeric;
mod schedule;
pub mod store;
mod types;

pub use catalog::{
    Availability, Catalog, CategoryCount, MemoryCatalog, Product, ProductQuery, StockStatus,
};
pub use error::ShopRulesError;
pub use exclusion::{ExclusionPlan, PostsClauses, PriceFilter, ProductQueryArgs, SubcategoryArgs};
pub use schedule::order;
pub use types::{
    CartIdFact, CartLine, CategoryExclusions, CompareOp, Condition, ConditionKind, Context,
    CountRule, EvaluationReport, MembershipOp, NumericFact, PriceRule, ProductExclusions,
    QueryClause, RuleSet, Snapshot, TermOperator, Tier, PRODUCT_CATEGORY_TAXONOMY,
};
