use std::fmt;

use serde::{Deserialize, Serialize};

use super::operator::{CompareOp, MembershipOp};

/// The closed set of condition kinds a rule-set can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    ActiveProductCount,
    AvailableProductCount,
    OrderSubtotal,
    CustomerRoles,
    ProductInCart,
    ProductVariations,
    ProductCategories,
    CouponApplied,
    TotalQuantity,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 9] = [
        ConditionKind::ActiveProductCount,
        ConditionKind::AvailableProductCount,
        ConditionKind::OrderSubtotal,
        ConditionKind::CustomerRoles,
        ConditionKind::ProductInCart,
        ConditionKind::ProductVariations,
        ConditionKind::ProductCategories,
        ConditionKind::CouponApplied,
        ConditionKind::TotalQuantity,
    ];

    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_wire() == s)
    }

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            ConditionKind::ActiveProductCount => "active_product_count",
            ConditionKind::AvailableProductCount => "available_product_count",
            ConditionKind::OrderSubtotal => "order_subtotal",
            ConditionKind::CustomerRoles => "customer_roles",
            ConditionKind::ProductInCart => "product_in_cart",
            ConditionKind::ProductVariations => "product_variations",
            ConditionKind::ProductCategories => "product_categories",
            ConditionKind::CouponApplied => "coupon_applied",
            ConditionKind::TotalQuantity => "total_quantity",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Numeric facts computed from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFact {
    /// Products matching the current query filters.
    ActiveProductCount,
    /// Matching products that are in stock or can be backordered.
    AvailableProductCount,
    /// Cart subtotal as displayed.
    OrderSubtotal,
    /// Sum of cart line quantities.
    TotalQuantity,
}

impl NumericFact {
    #[must_use]
    pub fn kind(self) -> ConditionKind {
        match self {
            NumericFact::ActiveProductCount => ConditionKind::ActiveProductCount,
            NumericFact::AvailableProductCount => ConditionKind::AvailableProductCount,
            NumericFact::OrderSubtotal => ConditionKind::OrderSubtotal,
            NumericFact::TotalQuantity => ConditionKind::TotalQuantity,
        }
    }
}

/// ID sets derived from the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartIdFact {
    Products,
    Variations,
    Categories,
    Coupons,
}

impl CartIdFact {
    #[must_use]
    pub fn kind(self) -> ConditionKind {
        match self {
            CartIdFact::Products => ConditionKind::ProductInCart,
            CartIdFact::Variations => ConditionKind::ProductVariations,
            CartIdFact::Categories => ConditionKind::ProductCategories,
            CartIdFact::Coupons => ConditionKind::CouponApplied,
        }
    }
}

/// A rule-set condition together with its operator and comparison value.
///
/// The shape of the comparison value depends on the kind, so each family gets
/// its own variant. A missing operator (blank, or one from another family) is
/// `None`; the condition then evaluates to `false`.
///
/// `has_value` records whether a comparison value was configured at all. A
/// value that was present but unreadable leaves `has_value` set with nothing
/// parsed, and the condition evaluates to `false` instead of being skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Condition {
    Numeric {
        fact: NumericFact,
        op: Option<CompareOp>,
        threshold: Option<f64>,
        has_value: bool,
    },
    CustomerRoles {
        op: Option<MembershipOp>,
        roles: Vec<String>,
        has_value: bool,
    },
    CartIds {
        fact: CartIdFact,
        op: Option<MembershipOp>,
        ids: Vec<u64>,
        has_value: bool,
    },
    /// A stored kind this engine does not know. Never matches.
    Unsupported { kind: String, has_value: bool },
}

impl Condition {
    #[must_use]
    pub fn numeric(fact: NumericFact, op: CompareOp, threshold: f64) -> Self {
        Condition::Numeric {
            fact,
            op: Some(op),
            threshold: Some(threshold),
            has_value: true,
        }
    }

    #[must_use]
    pub fn customer_roles<I, S>(op: MembershipOp, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        Condition::CustomerRoles {
            op: Some(op),
            has_value: !roles.is_empty(),
            roles,
        }
    }

    #[must_use]
    pub fn cart_ids(fact: CartIdFact, op: MembershipOp, ids: impl IntoIterator<Item = u64>) -> Self {
        let ids: Vec<u64> = ids.into_iter().collect();
        Condition::CartIds {
            fact,
            op: Some(op),
            has_value: !ids.is_empty(),
            ids,
        }
    }

    /// The condition kind, or `None` when the stored kind is unknown.
    #[must_use]
    pub fn kind(&self) -> Option<ConditionKind> {
        match self {
            Condition::Numeric { fact, .. } => Some(fact.kind()),
            Condition::CustomerRoles { .. } => Some(ConditionKind::CustomerRoles),
            Condition::CartIds { fact, .. } => Some(fact.kind()),
            Condition::Unsupported { .. } => None,
        }
    }

    /// `true` when no comparison value was configured. Such rule-sets are
    /// skipped by the scheduler. An unreadable value is not blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Condition::Numeric { has_value, .. }
            | Condition::CustomerRoles { has_value, .. }
            | Condition::CartIds { has_value, .. }
            | Condition::Unsupported { has_value, .. } => !has_value,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Numeric {
                fact, op, threshold, ..
            } => match (op, threshold) {
                (Some(op), Some(t)) => write!(f, "({} {op} {t})", fact.kind()),
                _ => write!(f, "({} <blank>)", fact.kind()),
            },
            Condition::CustomerRoles { op, roles, .. } => match op {
                Some(op) => write!(f, "(customer_roles {op} [{}])", roles.join(", ")),
                None => write!(f, "(customer_roles <blank>)"),
            },
            Condition::CartIds { fact, op, ids, .. } => {
                let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
                match op {
                    Some(op) => write!(f, "({} {op} [{}])", fact.kind(), ids.join(", ")),
                    None => write!(f, "({} <blank>)", fact.kind()),
                }
            }
            Condition::Unsupported { kind, .. } => write!(f, "(unsupported '{kind}')"),
        }
    }
}
