use serde::{Deserialize, Serialize};

/// Taxonomy that holds product categories.
pub const PRODUCT_CATEGORY_TAXONOMY: &str = "product_cat";

/// Set operator of a taxonomy clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermOperator {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
}

/// One filter of a product query, as the storefront's query layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryClause {
    Taxonomy {
        taxonomy: String,
        terms: Vec<u64>,
        operator: TermOperator,
    },
    Meta {
        key: String,
        value: String,
    },
}

impl QueryClause {
    /// Clause hiding every product assigned to one of `categories`.
    #[must_use]
    pub fn not_in_categories(categories: impl IntoIterator<Item = u64>) -> Self {
        QueryClause::Taxonomy {
            taxonomy: PRODUCT_CATEGORY_TAXONOMY.to_owned(),
            terms: categories.into_iter().collect(),
            operator: TermOperator::NotIn,
        }
    }
}

/// One line of the shopping cart. `variation_id` is `0` for simple products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: u64,
    pub variation_id: u64,
    pub quantity: u64,
}

/// Read-only snapshot of the request: the shop query being built, the cart and
/// the visitor.
///
/// # Example
///
/// ```
/// use shop_rules::Context;
///
/// let ctx = Context::new()
///     .cart_line(12, 0, 2)
///     .cart_line(15, 16, 1)
///     .subtotal("$1,250.00")
///     .coupon("SPRING")
///     .roles(["customer"]);
///
/// assert_eq!(ctx.total_quantity(), 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    tax_query: Vec<QueryClause>,
    meta_query: Vec<QueryClause>,
    cart: Vec<CartLine>,
    subtotal: String,
    coupons: Vec<String>,
    roles: Option<Vec<String>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a taxonomy filter of the current query.
    #[must_use]
    pub fn tax_filter(mut self, clause: QueryClause) -> Self {
        self.tax_query.push(clause);
        self
    }

    /// Add a meta filter of the current query.
    #[must_use]
    pub fn meta_filter(mut self, key: &str, value: &str) -> Self {
        self.meta_query.push(QueryClause::Meta {
            key: key.to_owned(),
            value: value.to_owned(),
        });
        self
    }

    #[must_use]
    pub fn cart_line(mut self, product_id: u64, variation_id: u64, quantity: u64) -> Self {
        self.cart.push(CartLine {
            product_id,
            variation_id,
            quantity,
        });
        self
    }

    /// Cart subtotal as the storefront displays it, currency symbol and
    /// separators included.
    #[must_use]
    pub fn subtotal(mut self, display: &str) -> Self {
        display.clone_into(&mut self.subtotal);
        self
    }

    #[must_use]
    pub fn coupon(mut self, code: &str) -> Self {
        self.coupons.push(code.to_owned());
        self
    }

    /// Roles of the logged-in visitor. Leave unset for anonymous visitors.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn tax_query(&self) -> &[QueryClause] {
        &self.tax_query
    }

    #[must_use]
    pub fn meta_query(&self) -> &[QueryClause] {
        &self.meta_query
    }

    #[must_use]
    pub fn cart_lines(&self) -> &[CartLine] {
        &self.cart
    }

    #[must_use]
    pub fn subtotal_display(&self) -> &str {
        &self.subtotal
    }

    #[must_use]
    pub fn applied_coupons(&self) -> &[String] {
        &self.coupons
    }

    /// Role slugs of the visitor; empty when logged out.
    #[must_use]
    pub fn user_roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.roles.is_some()
    }

    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.cart.iter().map(|line| line.quantity).sum()
    }
}
