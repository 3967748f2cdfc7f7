use std::collections::HashSet;

use tracing::trace;

use crate::catalog::{Availability, Catalog, ProductQuery};
use crate::numeric;
use crate::types::{CartIdFact, Condition, Context, NumericFact};

/// Evaluate a condition against the request.
///
/// Fails closed: a blank operator or comparison value, or an unknown kind,
/// evaluates to `false`.
pub(crate) fn evaluate<C: Catalog + ?Sized>(
    condition: &Condition,
    ctx: &Context,
    catalog: &C,
) -> bool {
    match condition {
        Condition::Numeric {
            fact,
            op: Some(op),
            threshold: Some(threshold),
            ..
        } => {
            let value = numeric_fact(*fact, ctx, catalog);
            trace!(fact = ?fact, value, threshold, "numeric fact");
            op.compare(value, *threshold)
        }
        Condition::CustomerRoles {
            op: Some(op),
            roles,
            ..
        } if !roles.is_empty() => {
            let held = ctx.user_roles();
            trace!(roles = ?held, "customer roles");
            op.test(roles, |role| held.contains(role))
        }
        Condition::CartIds {
            fact,
            op: Some(op),
            ids,
            ..
        } if !ids.is_empty() => {
            let present = cart_ids(*fact, ctx, catalog);
            trace!(fact = ?fact, ids = ?present, "cart ids");
            op.test(ids, |id| present.contains(id))
        }
        _ => false,
    }
}

#[allow(clippy::cast_precision_loss)]
fn numeric_fact<C: Catalog + ?Sized>(fact: NumericFact, ctx: &Context, catalog: &C) -> f64 {
    match fact {
        NumericFact::ActiveProductCount => {
            catalog.count_products(&ProductQuery::from_context(ctx, Availability::Any)) as f64
        }
        NumericFact::AvailableProductCount => {
            catalog.count_products(&ProductQuery::from_context(ctx, Availability::Purchasable))
                as f64
        }
        NumericFact::OrderSubtotal => numeric::extract(ctx.subtotal_display()),
        NumericFact::TotalQuantity => ctx.total_quantity() as f64,
    }
}

fn cart_ids<C: Catalog + ?Sized>(fact: CartIdFact, ctx: &Context, catalog: &C) -> HashSet<u64> {
    let lines = ctx.cart_lines();
    match fact {
        CartIdFact::Products => lines.iter().map(|l| l.product_id).collect(),
        CartIdFact::Variations => lines
            .iter()
            .map(|l| l.variation_id)
            .filter(|&id| id != 0)
            .collect(),
        CartIdFact::Categories => lines
            .iter()
            .flat_map(|l| catalog.product_categories(l.product_id))
            .collect(),
        CartIdFact::Coupons => ctx
            .applied_coupons()
            .iter()
            .filter_map(|code| catalog.coupon_id(code))
            .collect(),
    }
}

impl Condition {
    /// Evaluate this condition against the request. See the crate docs for the
    /// fail-closed rules.
    #[must_use]
    pub fn evaluate<C: Catalog + ?Sized>(&self, ctx: &Context, catalog: &C) -> bool {
        evaluate(self, ctx, catalog)
    }
}
