use std::fmt;
use std::time::Duration;

use crate::exclusion::ExclusionPlan;

/// Detailed result of running a [`Snapshot`](super::Snapshot) against a
/// request.
///
/// Records the scheduled order, which rule-sets had their condition evaluated,
/// which matched, which one halted iteration, the merged exclusions, and the
/// wall-clock duration.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    order: Vec<usize>,
    evaluated: Vec<usize>,
    matched: Vec<usize>,
    halted_at: Option<usize>,
    plan: ExclusionPlan,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        order: Vec<usize>,
        evaluated: Vec<usize>,
        matched: Vec<usize>,
        halted_at: Option<usize>,
        plan: ExclusionPlan,
        duration: Duration,
    ) -> Self {
        Self {
            order,
            evaluated,
            matched,
            halted_at,
            plan,
            duration,
        }
    }

    /// Rule-set indices in scheduled order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Indices whose condition was evaluated, in evaluation order.
    #[must_use]
    pub fn evaluated(&self) -> &[usize] {
        &self.evaluated
    }

    /// Indices whose condition was true and whose exclusions were applied.
    #[must_use]
    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    /// The stop-toggled rule-set that ended iteration, if any.
    #[must_use]
    pub fn halted_at(&self) -> Option<usize> {
        self.halted_at
    }

    #[must_use]
    pub fn plan(&self) -> &ExclusionPlan {
        &self.plan
    }

    #[must_use]
    pub fn into_plan(self) -> ExclusionPlan {
        self.plan
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

fn join(ids: &[usize]) -> String {
    ids.iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluated: [{}]", join(&self.evaluated))?;
        write!(f, ", matched: [{}]", join(&self.matched))?;
        match self.halted_at {
            Some(idx) => write!(f, ", halted at: {idx}")?,
            None => write!(f, ", halted at: none")?,
        }
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
