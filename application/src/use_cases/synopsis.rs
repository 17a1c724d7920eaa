//! Synopsis use case
//!
//! Asks the reviewer for a prose summary of everything persisted for a
//! subject: the latest opinion of each specialist plus every challenge and
//! its verdict.

use crate::ports::repository::RepositoryError;
use crate::use_cases::agent::{AgentError, AgentPool};
use crate::use_cases::debate::latest_specialist_outputs;
use boomerang_domain::{CallKind, ExecutionContext, FailureClass, PromptTemplate};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Output budget of the synopsis call
pub const SYNOPSIS_MAX_TOKENS: u32 = 1024;

#[derive(Error, Debug, Clone)]
pub enum SynopsisError {
    #[error("No specialist outputs found for this subject. Run the agents first.")]
    NoSpecialistOutputs,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl SynopsisError {
    pub fn classify(&self) -> FailureClass {
        match self {
            SynopsisError::Agent(e) => e.classify(),
            SynopsisError::NoSpecialistOutputs => FailureClass::Recoverable,
        }
    }
}

impl From<RepositoryError> for SynopsisError {
    fn from(e: RepositoryError) -> Self {
        SynopsisError::Agent(e.into())
    }
}

/// Generated synopsis with the token usage of the call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synopsis {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

pub struct GenerateSynopsisUseCase {
    pool: Arc<AgentPool>,
}

impl GenerateSynopsisUseCase {
    pub fn new(pool: Arc<AgentPool>) -> Self {
        Self { pool }
    }

    pub async fn execute(&self, context: &ExecutionContext) -> Result<Synopsis, SynopsisError> {
        let outputs = latest_specialist_outputs(&self.pool, context.subject_id).await?;
        if outputs.is_empty() {
            return Err(SynopsisError::NoSpecialistOutputs);
        }
        let challenges = self
            .pool
            .repository()
            .challenges_ordered(context.subject_id)
            .await?;

        let opinions: Vec<(String, String)> = outputs
            .into_iter()
            .map(|o| (o.agent, o.content))
            .collect();
        let prompt = PromptTemplate::synopsis_prompt(&opinions, &challenges);

        info!(
            "Synopsis over {} opinions and {} challenges",
            opinions.len(),
            challenges.len()
        );
        let result = self
            .pool
            .reviewer()
            .raw_chat(
                CallKind::Synopsis,
                &prompt,
                PromptTemplate::synopsis_system(),
                Some(SYNOPSIS_MAX_TOKENS),
                context,
            )
            .await?;

        Ok(Synopsis {
            text: result.text,
            input_tokens: result.input_tokens,
            output_tokens: result.output_tokens,
        })
    }
}
