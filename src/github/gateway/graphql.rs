//! Octocrab-backed GraphQL transport.

use async_trait::async_trait;
use http::Uri;
use octocrab::Octocrab;
use serde_json::{Value, json};

use crate::github::error::MiningError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::query::QueryVariables;

use super::QueryTransport;
use super::error_mapping::map_octocrab_error;

/// Sends `MineRepository` rounds to the GitHub GraphQL endpoint.
pub struct OctocrabQueryGateway {
    client: Octocrab,
}

impl OctocrabQueryGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Connects to the GraphQL endpoint that serves `locator`.
    ///
    /// Enterprise hosts are reached through their `/api` base, public GitHub
    /// through `api.github.com`.
    ///
    /// # Errors
    ///
    /// Returns `MiningError::InvalidUrl` when the API base is not a valid URI
    /// and `MiningError::Api` when Octocrab rejects the client settings.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Self, MiningError> {
        let api_base = locator
            .api_base()
            .as_str()
            .parse::<Uri>()
            .map_err(|error| MiningError::InvalidUrl(error.to_string()))?;

        let client = Octocrab::builder()
            .personal_token(token.as_ref())
            .base_uri(api_base)
            .map_err(|error| MiningError::Api {
                message: format!("invalid GraphQL base: {error}"),
            })?
            .build()
            .map_err(|error| map_octocrab_error("connect", &error))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl QueryTransport for OctocrabQueryGateway {
    async fn send(&self, query: &str, variables: &QueryVariables) -> Result<Value, MiningError> {
        tracing::trace!(
            owner = %variables.owner,
            name = %variables.name,
            bytes = query.len(),
            "sending GraphQL query"
        );
        let payload = json!({ "query": query, "variables": variables });
        self.client
            .graphql::<Value>(&payload)
            .await
            .map_err(|error| map_octocrab_error("graphql query", &error))
    }
}
