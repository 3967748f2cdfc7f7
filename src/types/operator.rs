use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric comparison operators used by count, subtotal, quantity, price and
/// category-count tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "less_than")]
    Lt,
    #[serde(rename = "greater_than")]
    Gt,
    #[serde(rename = "less_than_equal")]
    Lte,
    #[serde(rename = "greater_than_equal")]
    Gte,
    #[serde(rename = "equal")]
    Eq,
    #[serde(rename = "not_equal_to")]
    Neq,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Lt,
        CompareOp::Gt,
        CompareOp::Lte,
        CompareOp::Gte,
        CompareOp::Eq,
        CompareOp::Neq,
    ];

    /// Parse the stored option spelling (`less_than`, `not_equal_to`, ...).
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "less_than" => Some(CompareOp::Lt),
            "greater_than" => Some(CompareOp::Gt),
            "less_than_equal" => Some(CompareOp::Lte),
            "greater_than_equal" => Some(CompareOp::Gte),
            "equal" => Some(CompareOp::Eq),
            "not_equal_to" => Some(CompareOp::Neq),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            CompareOp::Lt => "less_than",
            CompareOp::Gt => "greater_than",
            CompareOp::Lte => "less_than_equal",
            CompareOp::Gte => "greater_than_equal",
            CompareOp::Eq => "equal",
            CompareOp::Neq => "not_equal_to",
        }
    }

    /// Apply the operator with `fact` on the left and `threshold` on the right.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn compare(self, fact: f64, threshold: f64) -> bool {
        match self {
            CompareOp::Lt => fact < threshold,
            CompareOp::Gt => fact > threshold,
            CompareOp::Lte => fact <= threshold,
            CompareOp::Gte => fact >= threshold,
            CompareOp::Eq => fact == threshold,
            CompareOp::Neq => fact != threshold,
        }
    }

    /// Price filters only offer less-than, greater-than and equal.
    #[must_use]
    pub fn is_price_op(self) -> bool {
        matches!(self, CompareOp::Lt | CompareOp::Gt | CompareOp::Eq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// Set-membership operators for role and cart-id tests.
///
/// `is`/`contains` both map to [`MembershipOp::Includes`]; `is_not`/`not_contain`
/// both map to [`MembershipOp::Excludes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipOp {
    Includes,
    Excludes,
}

impl MembershipOp {
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "is" | "contains" => Some(MembershipOp::Includes),
            "is_not" | "not_contain" => Some(MembershipOp::Excludes),
            _ => None,
        }
    }

    /// Stored spelling for the role family (`is` / `is_not`).
    #[must_use]
    pub fn as_role_wire(self) -> &'static str {
        match self {
            MembershipOp::Includes => "is",
            MembershipOp::Excludes => "is_not",
        }
    }

    /// Stored spelling for the cart family (`contains` / `not_contain`).
    #[must_use]
    pub fn as_cart_wire(self) -> &'static str {
        match self {
            MembershipOp::Includes => "contains",
            MembershipOp::Excludes => "not_contain",
        }
    }

    /// Test a selection against a fact set.
    ///
    /// `Includes` stops at the first selected item that is present. `Excludes`
    /// has to walk the whole selection before it can answer `true`.
    pub fn test<T>(self, selected: &[T], mut present: impl FnMut(&T) -> bool) -> bool {
        let hit = selected.iter().any(|item| present(item));
        match self {
            MembershipOp::Includes => hit,
            MembershipOp::Excludes => !hit,
        }
    }
}

impl fmt::Display for MembershipOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipOp::Includes => write!(f, "in"),
            MembershipOp::Excludes => write!(f, "not in"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_op_wire_names() {
        for op in CompareOp::ALL {
            assert_eq!(CompareOp::from_wire(op.as_wire()), Some(op));
        }
        assert_eq!(CompareOp::from_wire("contains"), None);
        assert_eq!(CompareOp::from_wire(""), None);
    }

    #[test]
    fn compare_table() {
        assert!(CompareOp::Lt.compare(1.0, 2.0));
        assert!(!CompareOp::Lt.compare(2.0, 2.0));
        assert!(CompareOp::Gt.compare(3.0, 2.0));
        assert!(CompareOp::Lte.compare(2.0, 2.0));
        assert!(CompareOp::Gte.compare(2.0, 2.0));
        assert!(CompareOp::Eq.compare(5.0, 5.0));
        assert!(!CompareOp::Neq.compare(5.0, 5.0));
        assert!(CompareOp::Neq.compare(5.0, 4.0));
    }

    #[test]
    fn price_ops() {
        assert!(CompareOp::Lt.is_price_op());
        assert!(CompareOp::Gt.is_price_op());
        assert!(CompareOp::Eq.is_price_op());
        assert!(!CompareOp::Gte.is_price_op());
        assert!(!CompareOp::Neq.is_price_op());
    }

    #[test]
    fn display() {
        assert_eq!(CompareOp::Gte.to_string(), ">=");
        assert_eq!(MembershipOp::Excludes.to_string(), "not in");
    }

    #[test]
    fn membership_spellings() {
        assert_eq!(MembershipOp::from_wire("is"), Some(MembershipOp::Includes));
        assert_eq!(
            MembershipOp::from_wire("contains"),
            Some(MembershipOp::Includes)
        );
        assert_eq!(
            MembershipOp::from_wire("is_not"),
            Some(MembershipOp::Excludes)
        );
        assert_eq!(
            MembershipOp::from_wire("not_contain"),
            Some(MembershipOp::Excludes)
        );
        assert_eq!(MembershipOp::from_wire("equal"), None);
    }

    #[test]
    fn includes_short_circuits() {
        let mut calls = 0;
        let hit = MembershipOp::Includes.test(&[1, 2, 3], |id| {
            calls += 1;
            *id == 1
        });
        assert!(hit);
        assert_eq!(calls, 1);
    }

    #[test]
    fn excludes_scans_everything_before_true() {
        let mut calls = 0;
        let none_present = MembershipOp::Excludes.test(&[1, 2, 3], |_| {
            calls += 1;
            false
        });
        assert!(none_present);
        assert_eq!(calls, 3);
    }
}
