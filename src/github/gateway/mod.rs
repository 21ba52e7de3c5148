//! Gateway for sending GraphQL queries to GitHub through Octocrab.
//!
//! The [`QueryTransport`] trait is the seam between the pagination engine
//! and the network: the iterator only ever sees a query, its variables and
//! the raw JSON response. The Octocrab implementation handles the real HTTP
//! exchange, and tests substitute the generated mock.

mod error_mapping;
mod graphql;

pub use graphql::OctocrabQueryGateway;

use async_trait::async_trait;
use serde_json::Value;

use crate::github::error::MiningError;
use crate::github::query::QueryVariables;

/// Transport that executes one GraphQL query per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Sends `query` with `variables` and returns the raw response envelope.
    async fn send(&self, query: &str, variables: &QueryVariables) -> Result<Value, MiningError>;
}
