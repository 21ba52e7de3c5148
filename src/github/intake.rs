//! High-level mining facade used by the CLI.

use super::error::MiningError;
use super::gateway::QueryTransport;
use super::iterator::{MiningRequest, ProjectIterator};
use super::models::Project;
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// Drives a [`ProjectIterator`] to completion over a transport.
///
/// # Example
///
/// ```ignore
/// use magpie::{MiningRequest, OctocrabQueryGateway, PersonalAccessToken, ProjectMiner, RepositoryLocator};
///
/// let token = PersonalAccessToken::new("ghp_example")?;
/// let locator = RepositoryLocator::from_owner_repo("owner", "repo")?;
/// let gateway = OctocrabQueryGateway::for_token(&token, &locator)?;
/// let project = ProjectMiner::new(&gateway)
///     .mine(&MiningRequest::for_locator(&locator, 100))
///     .await?;
/// ```
pub struct ProjectMiner<'client, Transport>
where
    Transport: QueryTransport,
{
    client: &'client Transport,
    telemetry: &'client dyn TelemetrySink,
    max_rounds: Option<usize>,
}

impl<'client, Transport> ProjectMiner<'client, Transport>
where
    Transport: QueryTransport,
{
    /// Create a miner that records no telemetry and has no round limit.
    #[must_use]
    pub const fn new(client: &'client Transport) -> Self {
        Self {
            client,
            telemetry: &NoopTelemetrySink,
            max_rounds: None,
        }
    }

    /// Record round and completion events to `telemetry`.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'client dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Stop after at most `max_rounds` merged rounds.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Mine the requested repository.
    ///
    /// When the round limit is hit first, the partial project gathered so
    /// far is returned.
    ///
    /// # Errors
    ///
    /// Propagates the first failing round. Rounds merged before the failure
    /// are discarded along with the iterator.
    pub async fn mine(&self, request: &MiningRequest) -> Result<Project, MiningError> {
        let mut iterator = ProjectIterator::new(self.client, request.clone());

        while iterator.has_next() {
            if self
                .max_rounds
                .is_some_and(|limit| iterator.rounds() >= limit)
            {
                tracing::warn!(
                    rounds = iterator.rounds(),
                    "round limit reached; returning partial project"
                );
                break;
            }

            iterator.next().await?;
            if let Some(project) = iterator.project() {
                self.telemetry.record(TelemetryEvent::RoundMerged {
                    round: iterator.rounds(),
                    commits: project.commits.len(),
                    issues: project.issues.len(),
                    comments: project.comment_count(),
                    fetched_elements: iterator.fetched_elements(),
                });
            }
        }

        let complete = !iterator.has_next();
        let rounds = iterator.rounds();
        let project = iterator.into_project();
        tracing::info!(
            owner = %request.owner,
            name = %request.name,
            rounds,
            commits = project.commits.len(),
            issues = project.issues.len(),
            comments = project.comment_count(),
            complete,
            "mining finished"
        );
        self.telemetry.record(TelemetryEvent::MiningFinished {
            rounds,
            commits: project.commits.len(),
            issues: project.issues.len(),
            comments: project.comment_count(),
            complete,
        });
        Ok(project)
    }
}
