mod condition;
mod context;
mod evaluation_report;
mod operator;
mod ruleset;
mod snapshot;

pub use condition::{CartIdFact, Condition, ConditionKind, NumericFact};
pub use context::{CartLine, Context, QueryClause, TermOperator, PRODUCT_CATEGORY_TAXONOMY};
pub use evaluation_report::EvaluationReport;
pub use operator::{CompareOp, MembershipOp};
pub use ruleset::{CategoryExclusions, CountRule, PriceRule, ProductExclusions, RuleSet};
pub use snapshot::{Snapshot, Tier};
