use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::operator::CompareOp;

/// "Do not show products" price test: hide products whose `_price` compares
/// true against `price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRule {
    pub op: CompareOp,
    pub price: f64,
}

impl PriceRule {
    /// Returns `None` unless `op` is one of the price operators
    /// (less-than, greater-than, equal).
    #[must_use]
    pub fn new(op: CompareOp, price: f64) -> Option<Self> {
        op.is_price_op().then_some(Self { op, price })
    }
}

/// "Do not show categories" product-count test: hide every category whose
/// product count compares true against `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRule {
    pub op: CompareOp,
    pub threshold: f64,
}

/// Product exclusion effects of a rule-set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductExclusions {
    /// Hide products assigned to any of these categories.
    pub in_categories: Vec<u64>,
    /// Hide these products.
    pub products: Vec<u64>,
    /// Hide the parent products of these variations.
    pub variants: Vec<u64>,
    /// Hide every product carrying one of these attribute terms.
    pub attribute_terms: Vec<u64>,
    pub price: Option<PriceRule>,
}

impl ProductExclusions {
    #[must_use]
    pub fn in_categories(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.in_categories.extend(ids);
        self
    }

    #[must_use]
    pub fn products(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.products.extend(ids);
        self
    }

    #[must_use]
    pub fn variants(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.variants.extend(ids);
        self
    }

    #[must_use]
    pub fn attribute_terms(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.attribute_terms.extend(ids);
        self
    }

    /// Set the price test. Operators other than less-than, greater-than and
    /// equal leave the price test unset.
    #[must_use]
    pub fn price(mut self, op: CompareOp, price: f64) -> Self {
        self.price = PriceRule::new(op, price);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_categories.is_empty()
            && self.products.is_empty()
            && self.variants.is_empty()
            && self.attribute_terms.is_empty()
            && self.price.is_none()
    }
}

/// Category exclusion effects of a rule-set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryExclusions {
    /// Hide these categories.
    pub categories: Vec<u64>,
    /// Hide the parents of these sub-categories.
    pub subcategories: Vec<u64>,
    /// Hide every category that holds one of these products.
    pub containing_products: Vec<u64>,
    /// Hide every category that holds the parent product of one of these
    /// variations.
    pub containing_variants: Vec<u64>,
    pub product_count: Option<CountRule>,
}

impl CategoryExclusions {
    #[must_use]
    pub fn categories(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.categories.extend(ids);
        self
    }

    #[must_use]
    pub fn subcategories(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.subcategories.extend(ids);
        self
    }

    #[must_use]
    pub fn containing_products(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.containing_products.extend(ids);
        self
    }

    #[must_use]
    pub fn containing_variants(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.containing_variants.extend(ids);
        self
    }

    #[must_use]
    pub fn product_count(mut self, op: CompareOp, threshold: f64) -> Self {
        self.product_count = Some(CountRule { op, threshold });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.subcategories.is_empty()
            && self.containing_products.is_empty()
            && self.containing_variants.is_empty()
            && self.product_count.is_none()
    }
}

/// One configured rule-set: a condition paired with exclusion effects.
///
/// # Example
///
/// ```
/// use shop_rules::{CompareOp, Condition, NumericFact, RuleSet};
///
/// let ruleset = RuleSet::new(0, Condition::numeric(NumericFact::TotalQuantity, CompareOp::Gt, 3.0))
///     .priority(1)
///     .stop_other_rules(true)
///     .hide_products(|p| p.products([42]).price(CompareOp::Lt, 10.0))
///     .hide_categories(|c| c.categories([7]));
///
/// assert_eq!(ruleset.priority, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Position key of the rule-set in the stored configuration.
    pub index: usize,
    pub condition: Condition,
    /// Lower runs first. `None` sorts after every set priority.
    pub priority: Option<i64>,
    /// Halt iteration once this rule-set has been evaluated.
    pub stop_other_rules: bool,
    pub products: ProductExclusions,
    pub categories: CategoryExclusions,
}

impl RuleSet {
    #[must_use]
    pub fn new(index: usize, condition: Condition) -> Self {
        Self {
            index,
            condition,
            priority: None,
            stop_other_rules: false,
            products: ProductExclusions::default(),
            categories: CategoryExclusions::default(),
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn stop_other_rules(mut self, stop: bool) -> Self {
        self.stop_other_rules = stop;
        self
    }

    #[must_use]
    pub fn hide_products(mut self, f: impl FnOnce(ProductExclusions) -> ProductExclusions) -> Self {
        self.products = f(std::mem::take(&mut self.products));
        self
    }

    #[must_use]
    pub fn hide_categories(
        mut self,
        f: impl FnOnce(CategoryExclusions) -> CategoryExclusions,
    ) -> Self {
        self.categories = f(std::mem::take(&mut self.categories));
        self
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ruleset #{} {}", self.index, self.condition)?;
        if let Some(p) = self.priority {
            write!(f, " priority={p}")?;
        }
        if self.stop_other_rules {
            write!(f, " stop")?;
        }
        Ok(())
    }
}
