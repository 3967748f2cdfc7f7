//! Accumulating the effects of matched rule-sets and handing them to the
//! storefront's query hooks.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::types::{CompareOp, QueryClause, RuleSet};

/// A deferred "hide by price" predicate contributed by one rule-set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceFilter {
    pub ruleset: usize,
    pub op: CompareOp,
    pub price: f64,
}

impl PriceFilter {
    /// `true` when a product with this `_price` is hidden. Compares against
    /// [`bound`](Self::bound), as the generated SQL does.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn excludes(&self, price: f64) -> bool {
        self.op.compare(price, self.bound() as f64)
    }

    /// Threshold bound as an integer, matching the `%d` placeholder the query
    /// layer binds it with.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bound(&self) -> i64 {
        self.price.trunc() as i64
    }

    fn sql_op(&self) -> &'static str {
        match self.op {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "=",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
            CompareOp::Neq => "!=",
        }
    }
}

/// Arguments of the shop's product query that rule-sets may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQueryArgs {
    pub tax_query: Vec<QueryClause>,
    pub post_not_in: Vec<u64>,
}

/// Arguments of the sub-category listing on the shop page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryArgs {
    pub parent: Option<u64>,
    pub exclude: Vec<u64>,
}

/// SQL fragments of the product query, before execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsClauses {
    pub join: String,
    pub where_sql: String,
}

/// The merged exclusions of every rule-set that matched during a request.
///
/// Sets are unioned across rule-sets, never intersected. The plan is built once
/// per request and then read by the product-query hook and, later, by the
/// category-listing hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionPlan {
    tax_clauses: Vec<QueryClause>,
    product_ids: BTreeSet<u64>,
    category_ids: BTreeSet<u64>,
    price_filters: Vec<PriceFilter>,
}

impl ExclusionPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the exclusion effects of a matched rule-set.
    pub fn absorb<C: Catalog + ?Sized>(&mut self, ruleset: &RuleSet, catalog: &C) {
        let products = &ruleset.products;

        if !products.in_categories.is_empty() {
            self.tax_clauses.push(QueryClause::not_in_categories(
                products.in_categories.iter().copied(),
            ));
        }
        self.product_ids.extend(products.products.iter().copied());
        self.product_ids.extend(
            products
                .variants
                .iter()
                .filter_map(|&v| catalog.variation_parent(v)),
        );
        for &term in &products.attribute_terms {
            self.product_ids.extend(catalog.products_with_term(term));
        }
        if let Some(price) = products.price {
            self.price_filters.push(PriceFilter {
                ruleset: ruleset.index,
                op: price.op,
                price: price.price,
            });
        }

        let categories = &ruleset.categories;

        self.category_ids.extend(categories.categories.iter().copied());
        self.category_ids.extend(
            categories
                .subcategories
                .iter()
                .filter_map(|&c| catalog.category_parent(c)),
        );
        for &product in &categories.containing_products {
            self.category_ids.extend(catalog.product_categories(product));
        }
        for &variant in &categories.containing_variants {
            if let Some(parent) = catalog.variation_parent(variant) {
                self.category_ids.extend(catalog.product_categories(parent));
            }
        }
        if let Some(rule) = categories.product_count {
            #[allow(clippy::cast_precision_loss)]
            let hidden = catalog
                .categories()
                .into_iter()
                .filter(|c| rule.op.compare(c.count as f64, rule.threshold))
                .map(|c| c.id);
            self.category_ids.extend(hidden);
        }
    }

    #[must_use]
    pub fn tax_clauses(&self) -> &[QueryClause] {
        &self.tax_clauses
    }

    #[must_use]
    pub fn product_ids(&self) -> &BTreeSet<u64> {
        &self.product_ids
    }

    #[must_use]
    pub fn category_ids(&self) -> &BTreeSet<u64> {
        &self.category_ids
    }

    #[must_use]
    pub fn price_filters(&self) -> &[PriceFilter] {
        &self.price_filters
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tax_clauses.is_empty()
            && self.product_ids.is_empty()
            && self.category_ids.is_empty()
            && self.price_filters.is_empty()
    }

    /// `true` when a product with this `_price` is hidden by any price filter.
    #[must_use]
    pub fn hides_price(&self, price: f64) -> bool {
        self.price_filters.iter().any(|f| f.excludes(price))
    }

    /// Add the taxonomy and product-id exclusions to a product query.
    pub fn apply_to_query(&self, args: &mut ProductQueryArgs) {
        args.tax_query.extend(self.tax_clauses.iter().cloned());
        for &id in &self.product_ids {
            if !args.post_not_in.contains(&id) {
                args.post_not_in.push(id);
            }
        }
    }

    /// Set the `exclude` list of a sub-category listing. Leaves the arguments
    /// untouched when no category is hidden.
    pub fn apply_to_subcategories(&self, args: &mut SubcategoryArgs) {
        if !self.category_ids.is_empty() {
            args.exclude = self.category_ids.iter().copied().collect();
        }
    }

    /// Hook for the category listing, which the storefront calls after the
    /// product query has been built. The closure owns the finished plan.
    #[must_use]
    pub fn subcategory_filter(plan: Arc<Self>) -> impl Fn(SubcategoryArgs) -> SubcategoryArgs {
        move |mut args| {
            plan.apply_to_subcategories(&mut args);
            args
        }
    }

    /// Append one `NOT IN` sub-select per price filter to the query's SQL.
    ///
    /// All filters apply independently. Tables are named with `table_prefix`
    /// (`wp_` gives `wp_posts` / `wp_postmeta`).
    pub fn apply_price_clauses(&self, clauses: &mut PostsClauses, table_prefix: &str) {
        if self.price_filters.is_empty() {
            return;
        }
        let posts = format!("{table_prefix}posts");
        let postmeta = format!("{table_prefix}postmeta");
        if !clauses.join.contains("postmeta") {
            clauses.join.push_str(&format!(
                " LEFT JOIN {postmeta} ON {posts}.ID = {postmeta}.post_id"
            ));
        }
        for filter in &self.price_filters {
            clauses.where_sql.push_str(&format!(
                " AND {posts}.ID NOT IN (SELECT post_id FROM {postmeta} \
                 WHERE meta_key = '_price' AND meta_value {} {})",
                filter.sql_op(),
                filter.bound(),
            ));
        }
        clauses.where_sql.push_str(&format!(" AND {postmeta}.meta_key = '_price'"));
    }
}

impl fmt::Display for ExclusionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExclusionPlan({} category clauses, {} products, {} categories, {} price filters)",
            self.tax_clauses.len(),
            self.product_ids.len(),
            self.category_ids.len(),
            self.price_filters.len(),
        )
    }
}
