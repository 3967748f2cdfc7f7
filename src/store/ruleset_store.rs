use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use super::config::StoreConfig;
use super::error::StoreError;
use super::value::OptionValue;
use crate::numeric;
use crate::types::{
    CartIdFact, CategoryExclusions, CompareOp, Condition, ConditionKind, CountRule,
    MembershipOp, NumericFact, PriceRule, ProductExclusions, RuleSet, Snapshot, Tier,
};

/// Key/value storage for named options, in the manner of the WordPress
/// options table.
pub trait OptionStore {
    fn get_option(&self, name: &str) -> Option<OptionValue>;

    /// # Errors
    ///
    /// Backend-specific write failures.
    fn update_option(&mut self, name: &str, value: OptionValue) -> Result<(), StoreError>;

    /// Deleting a missing option is not an error.
    ///
    /// # Errors
    ///
    /// Backend-specific delete failures.
    fn delete_option(&mut self, name: &str) -> Result<(), StoreError>;
}

/// Option name suffixes. Each per-rule-set field is an array keyed by
/// rule-set index.
pub mod fields {
    pub const CONDITIONS: &str = "conditions";
    pub const OPERATOR: &str = "operator";
    pub const CONDITION_SUBFIELD: &str = "condition_subfield";
    pub const RULE_SET_PRIORITY: &str = "rule_set_priority";
    pub const RULE_TOGGLE: &str = "rule_toggle";

    pub const PRODUCT_IN_CATEGORY: &str = "show_product_in_category";
    pub const PRODUCT_IS_PRODUCT: &str = "show_product_is_product";
    pub const PRODUCT_HAS_VARIANT: &str = "show_product_has_variant";
    pub const PRODUCT_HAS_SUBATTRIBUTE: &str = "show_product_has_subattribute";
    pub const PRODUCT_PRICE_TYPE: &str = "show_product_price_type";
    pub const PRODUCT_PRICE: &str = "show_product_price";

    pub const CATEGORY_IS_CATEGORY: &str = "show_category_is_category";
    pub const CATEGORY_HAS_SUBCATEGORY: &str = "show_category_has_subcategory";
    pub const CATEGORY_PRODUCT_IN: &str = "show_category_product_in";
    pub const CATEGORY_HAS_VARIANT: &str = "show_category_has_variant";
    pub const CATEGORY_PRODUCT_COUNT_TYPE: &str = "show_category_product_count_type";
    pub const CATEGORY_PRODUCT_COUNT: &str = "show_category_product_count";

    pub const RULESET_TOGGLE: &str = "ruleset_toggle";
    pub const VISUAL_CUSTOMIZER: &str = "visual_customizer";

    pub const API_LICENSE_KEY: &str = "api_license_key";
    pub const API_GET_RESPONSE: &str = "api_get_response";

    /// Fields stored as one array per rule-set attribute.
    pub const RULESET: [&str; 17] = [
        CONDITIONS,
        OPERATOR,
        CONDITION_SUBFIELD,
        RULE_SET_PRIORITY,
        RULE_TOGGLE,
        PRODUCT_IN_CATEGORY,
        PRODUCT_IS_PRODUCT,
        PRODUCT_HAS_VARIANT,
        PRODUCT_HAS_SUBATTRIBUTE,
        PRODUCT_PRICE_TYPE,
        PRODUCT_PRICE,
        CATEGORY_IS_CATEGORY,
        CATEGORY_HAS_SUBCATEGORY,
        CATEGORY_PRODUCT_IN,
        CATEGORY_HAS_VARIANT,
        CATEGORY_PRODUCT_COUNT_TYPE,
        CATEGORY_PRODUCT_COUNT,
    ];

    /// Every option the plugin owns.
    pub const ALL: [&str; 27] = [
        "cron_log",
        API_LICENSE_KEY,
        "api_password",
        "api_product_id",
        "api_purchase_emails",
        API_GET_RESPONSE,
        "zamartz_api_admin_notice_data",
        "network_admin_api_status",
        RULESET_TOGGLE,
        VISUAL_CUSTOMIZER,
        CONDITIONS,
        OPERATOR,
        CONDITION_SUBFIELD,
        RULE_SET_PRIORITY,
        RULE_TOGGLE,
        PRODUCT_IN_CATEGORY,
        PRODUCT_IS_PRODUCT,
        PRODUCT_HAS_VARIANT,
        PRODUCT_HAS_SUBATTRIBUTE,
        PRODUCT_PRICE_TYPE,
        PRODUCT_PRICE,
        CATEGORY_IS_CATEGORY,
        CATEGORY_HAS_SUBCATEGORY,
        CATEGORY_PRODUCT_IN,
        CATEGORY_HAS_VARIANT,
        CATEGORY_PRODUCT_COUNT_TYPE,
        CATEGORY_PRODUCT_COUNT,
    ];
}

const YES: &str = "yes";
const NO: &str = "no";

/// Reads and writes rule-set configuration through an [`OptionStore`].
#[derive(Debug)]
pub struct RulesetStore<S> {
    store: S,
    config: StoreConfig,
}

impl<S: OptionStore> RulesetStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    pub fn with_config(store: S, config: StoreConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn get(&self, field: &str) -> Option<OptionValue> {
        self.store.get_option(&self.config.option_name(field))
    }

    fn put(&mut self, field: &str, value: OptionValue) -> Result<(), StoreError> {
        let name = self.config.option_name(field);
        self.store.update_option(&name, value)
    }

    /// Whether rule processing is switched on as a whole.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.get(fields::RULESET_TOGGLE)
            .and_then(|v| v.as_text())
            .is_some_and(|s| s == YES)
    }

    /// # Errors
    ///
    /// Propagates the backend write failure.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.put(
            fields::RULESET_TOGGLE,
            OptionValue::from(if enabled { YES } else { NO }),
        )
    }

    /// Paid needs a license key and an activation response that says
    /// `activated: true`. Anything else is free.
    #[must_use]
    pub fn tier(&self) -> Tier {
        let licensed = self
            .get(fields::API_LICENSE_KEY)
            .is_some_and(|key| !key.is_blank());
        let activated = self
            .get(fields::API_GET_RESPONSE)
            .is_some_and(|resp| resp.field("activated") == Some(&OptionValue::Bool(true)));
        if licensed && activated {
            Tier::Paid
        } else {
            Tier::Free
        }
    }

    /// Read the stored configuration into a [`Snapshot`].
    ///
    /// Each field is read once. A rule-set exists for every index present in
    /// any per-rule-set field. Missing, blank or malformed entries read as
    /// unset.
    #[must_use]
    pub fn load(&self) -> Snapshot {
        let loaded: HashMap<&str, OptionValue> = fields::RULESET
            .iter()
            .filter_map(|&field| self.get(field).map(|value| (field, value)))
            .collect();

        let indices: BTreeSet<usize> = loaded.values().flat_map(OptionValue::indices).collect();
        let row = Row { loaded: &loaded };

        let mut snapshot = Snapshot::new(self.tier()).enabled(self.is_enabled());
        for index in indices {
            snapshot = snapshot.ruleset(row.ruleset(index));
        }
        info!(
            rulesets = snapshot.rulesets().len(),
            tier = ?snapshot.tier(),
            enabled = snapshot.is_enabled(),
            "loaded ruleset configuration"
        );
        snapshot
    }

    /// Write rule-sets back, repairing duplicate priorities first. Returns the
    /// rule-sets as written.
    ///
    /// # Errors
    ///
    /// Stops at the first backend write failure.
    pub fn save(&mut self, rulesets: &[RuleSet]) -> Result<Vec<RuleSet>, StoreError> {
        let mut rulesets = rulesets.to_vec();
        rulesets.sort_by_key(|r| r.index);
        dedupe_priorities(&mut rulesets);

        for field in fields::RULESET {
            let value = OptionValue::indexed(rulesets.iter().map(|r| (r.index, encode(field, r))));
            self.put(field, value)?;
        }
        debug!(rulesets = rulesets.len(), "saved ruleset configuration");
        Ok(rulesets)
    }

    /// Delete every option the plugin owns.
    ///
    /// # Errors
    ///
    /// Stops at the first backend delete failure.
    pub fn purge(&mut self) -> Result<(), StoreError> {
        for field in fields::ALL {
            let name = self.config.option_name(field);
            self.store.delete_option(&name)?;
        }
        info!(options = fields::ALL.len(), "purged stored options");
        Ok(())
    }
}

/// Blank repeated priorities, scanning in index order. When a value was
/// already seen, the earlier holder loses it and the later one keeps it.
pub fn dedupe_priorities(rulesets: &mut [RuleSet]) {
    let mut holder: HashMap<i64, usize> = HashMap::new();
    for pos in 0..rulesets.len() {
        let Some(priority) = rulesets[pos].priority else {
            continue;
        };
        if let Some(earlier) = holder.insert(priority, pos) {
            debug!(
                priority,
                blanked = rulesets[earlier].index,
                kept = rulesets[pos].index,
                "duplicate ruleset priority"
            );
            rulesets[earlier].priority = None;
        }
    }
}

/// Field lookup for one rule-set index.
struct Row<'a> {
    loaded: &'a HashMap<&'a str, OptionValue>,
}

impl Row<'_> {
    fn raw(&self, field: &str, index: usize) -> Option<&OptionValue> {
        self.loaded
            .get(field)?
            .at(index)
            .filter(|value| !value.is_blank())
    }

    fn text(&self, field: &str, index: usize) -> Option<String> {
        let text = self.raw(field, index)?.as_text();
        if text.is_none() {
            warn!(field, index, "expected a scalar, ignoring");
        }
        text.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    }

    fn ids(&self, field: &str, index: usize) -> Vec<u64> {
        self.raw(field, index).map(OptionValue::as_ids).unwrap_or_default()
    }

    fn number(&self, field: &str, index: usize) -> Option<f64> {
        let text = self.text(field, index)?;
        let parsed = numeric::parse_threshold(&text);
        if parsed.is_none() {
            warn!(field, index, value = %text, "not a number, ignoring");
        }
        parsed
    }

    fn compare_op(&self, field: &str, index: usize) -> Option<CompareOp> {
        let text = self.text(field, index)?;
        let op = CompareOp::from_wire(&text);
        if op.is_none() {
            warn!(field, index, value = %text, "unknown comparison operator");
        }
        op
    }

    fn ruleset(&self, index: usize) -> RuleSet {
        let priority = self.text(fields::RULE_SET_PRIORITY, index).and_then(|text| {
            let parsed = text.parse::<i64>().ok();
            if parsed.is_none() {
                warn!(index, value = %text, "priority is not an integer, treating as unset");
            }
            parsed
        });
        let stop_other_rules = self
            .text(fields::RULE_TOGGLE, index)
            .is_some_and(|s| s == YES);

        let products = ProductExclusions {
            in_categories: self.ids(fields::PRODUCT_IN_CATEGORY, index),
            products: self.ids(fields::PRODUCT_IS_PRODUCT, index),
            variants: self.ids(fields::PRODUCT_HAS_VARIANT, index),
            attribute_terms: self.ids(fields::PRODUCT_HAS_SUBATTRIBUTE, index),
            price: self.price_rule(index),
        };
        let categories = CategoryExclusions {
            categories: self.ids(fields::CATEGORY_IS_CATEGORY, index),
            subcategories: self.ids(fields::CATEGORY_HAS_SUBCATEGORY, index),
            containing_products: self.ids(fields::CATEGORY_PRODUCT_IN, index),
            containing_variants: self.ids(fields::CATEGORY_HAS_VARIANT, index),
            product_count: self.count_rule(index),
        };

        RuleSet {
            index,
            condition: self.condition(index),
            priority,
            stop_other_rules,
            products,
            categories,
        }
    }

    fn price_rule(&self, index: usize) -> Option<PriceRule> {
        let op = self.compare_op(fields::PRODUCT_PRICE_TYPE, index)?;
        let price = self.number(fields::PRODUCT_PRICE, index)?;
        let rule = PriceRule::new(op, price);
        if rule.is_none() {
            warn!(index, op = %op, "price filter only supports <, > and =");
        }
        rule
    }

    fn count_rule(&self, index: usize) -> Option<CountRule> {
        Some(CountRule {
            op: self.compare_op(fields::CATEGORY_PRODUCT_COUNT_TYPE, index)?,
            threshold: self.number(fields::CATEGORY_PRODUCT_COUNT, index)?,
        })
    }

    fn condition(&self, index: usize) -> Condition {
        let kind_text = self.text(fields::CONDITIONS, index).unwrap_or_default();
        let op_text = self.text(fields::OPERATOR, index);
        let value = self.raw(fields::CONDITION_SUBFIELD, index);
        let has_value = value.is_some();

        let Some(kind) = ConditionKind::from_wire(&kind_text) else {
            warn!(index, kind = %kind_text, "unsupported condition, ruleset never matches");
            return Condition::Unsupported {
                kind: kind_text,
                has_value,
            };
        };

        let membership = || {
            let op = op_text.as_deref().and_then(MembershipOp::from_wire);
            if op.is_none() {
                warn!(index, %kind, op = ?op_text, "operator does not fit condition");
            }
            op
        };

        match numeric_fact(kind) {
            Some(fact) => {
                let op = op_text.as_deref().and_then(CompareOp::from_wire);
                if op.is_none() {
                    warn!(index, %kind, op = ?op_text, "operator does not fit condition");
                }
                Condition::Numeric {
                    fact,
                    op,
                    threshold: self.number(fields::CONDITION_SUBFIELD, index),
                    has_value,
                }
            }
            None if kind == ConditionKind::CustomerRoles => {
                let roles = value.map(OptionValue::as_strings).unwrap_or_default();
                if has_value && roles.is_empty() {
                    warn!(index, "no usable roles, ruleset never matches");
                }
                Condition::CustomerRoles {
                    op: membership(),
                    roles,
                    has_value,
                }
            }
            None => {
                let ids = self.ids(fields::CONDITION_SUBFIELD, index);
                if has_value && ids.is_empty() {
                    warn!(index, %kind, "no usable ids, ruleset never matches");
                }
                Condition::CartIds {
                    fact: cart_fact(kind),
                    op: membership(),
                    ids,
                    has_value,
                }
            }
        }
    }
}

fn numeric_fact(kind: ConditionKind) -> Option<NumericFact> {
    match kind {
        ConditionKind::ActiveProductCount => Some(NumericFact::ActiveProductCount),
        ConditionKind::AvailableProductCount => Some(NumericFact::AvailableProductCount),
        ConditionKind::OrderSubtotal => Some(NumericFact::OrderSubtotal),
        ConditionKind::TotalQuantity => Some(NumericFact::TotalQuantity),
        _ => None,
    }
}

fn cart_fact(kind: ConditionKind) -> CartIdFact {
    match kind {
        ConditionKind::ProductVariations => CartIdFact::Variations,
        ConditionKind::ProductCategories => CartIdFact::Categories,
        ConditionKind::CouponApplied => CartIdFact::Coupons,
        _ => CartIdFact::Products,
    }
}

fn text_or_blank(value: Option<String>) -> OptionValue {
    OptionValue::String(value.unwrap_or_default())
}

fn encode(field: &str, ruleset: &RuleSet) -> OptionValue {
    let p = &ruleset.products;
    let c = &ruleset.categories;
    match field {
        fields::CONDITIONS => OptionValue::String(match &ruleset.condition {
            Condition::Unsupported { kind, .. } => kind.clone(),
            other => other.kind().map(ConditionKind::as_wire).unwrap_or_default().to_owned(),
        }),
        fields::OPERATOR => text_or_blank(match &ruleset.condition {
            Condition::Numeric { op, .. } => op.map(|op| op.as_wire().to_owned()),
            Condition::CustomerRoles { op, .. } => op.map(|op| op.as_role_wire().to_owned()),
            Condition::CartIds { op, .. } => op.map(|op| op.as_cart_wire().to_owned()),
            Condition::Unsupported { .. } => None,
        }),
        fields::CONDITION_SUBFIELD => match &ruleset.condition {
            Condition::Numeric { threshold, .. } => text_or_blank(threshold.map(|t| t.to_string())),
            Condition::CustomerRoles { roles, .. } => OptionValue::indexed(
                roles
                    .iter()
                    .enumerate()
                    .map(|(pos, role)| (pos, OptionValue::from(role.as_str()))),
            ),
            Condition::CartIds { ids, .. } => OptionValue::ids(ids),
            Condition::Unsupported { .. } => OptionValue::from(""),
        },
        fields::RULE_SET_PRIORITY => text_or_blank(ruleset.priority.map(|p| p.to_string())),
        fields::RULE_TOGGLE => OptionValue::from(if ruleset.stop_other_rules { YES } else { NO }),
        fields::PRODUCT_IN_CATEGORY => OptionValue::ids(&p.in_categories),
        fields::PRODUCT_IS_PRODUCT => OptionValue::ids(&p.products),
        fields::PRODUCT_HAS_VARIANT => OptionValue::ids(&p.variants),
        fields::PRODUCT_HAS_SUBATTRIBUTE => OptionValue::ids(&p.attribute_terms),
        fields::PRODUCT_PRICE_TYPE => text_or_blank(p.price.map(|r| r.op.as_wire().to_owned())),
        fields::PRODUCT_PRICE => text_or_blank(p.price.map(|r| r.price.to_string())),
        fields::CATEGORY_IS_CATEGORY => OptionValue::ids(&c.categories),
        fields::CATEGORY_HAS_SUBCATEGORY => OptionValue::ids(&c.subcategories),
        fields::CATEGORY_PRODUCT_IN => OptionValue::ids(&c.containing_products),
        fields::CATEGORY_HAS_VARIANT => OptionValue::ids(&c.containing_variants),
        fields::CATEGORY_PRODUCT_COUNT_TYPE => {
            text_or_blank(c.product_count.map(|r| r.op.as_wire().to_owned()))
        }
        fields::CATEGORY_PRODUCT_COUNT => {
            text_or_blank(c.product_count.map(|r| r.threshold.to_string()))
        }
        _ => OptionValue::Null,
    }
}
