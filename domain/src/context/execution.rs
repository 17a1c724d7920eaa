//! Per-run execution context

use super::dimension::{Dimension, ProcessPhase};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context passed by value through every agent call of one request.
///
/// `organization_id` and `user_id` attribute cost; usage is only recorded
/// when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The subject (perspective) the panel is reviewing; also the persistence key
    pub subject_id: Uuid,
    pub dimension: Option<Dimension>,
    pub phase: Option<ProcessPhase>,
    pub goal_statement: Option<String>,
    pub organization_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl ExecutionContext {
    pub fn new(subject_id: Uuid) -> Self {
        Self {
            subject_id,
            dimension: None,
            phase: None,
            goal_statement: None,
            organization_id: None,
            user_id: None,
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_phase(mut self, phase: ProcessPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal_statement = Some(goal.into());
        self
    }

    pub fn with_attribution(mut self, organization_id: Uuid, user_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self.user_id = Some(user_id);
        self
    }

    /// Both attribution ids, if the run is billable to someone
    pub fn attribution(&self) -> Option<(Uuid, Uuid)> {
        self.organization_id.zip(self.user_id)
    }
}
