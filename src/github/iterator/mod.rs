//! Round-by-round mining of one repository.
//!
//! [`ProjectIterator`] drives the `MineRepository` query across as many round
//! trips as needed. The first round creates the aggregate [`Project`] with
//! the first page of commits, issues and each issue's comments. Later rounds
//! continue the commit and issue streams from their cursors and ask for the
//! next comment page of up to
//! [`COMMENT_FAN_OUT`](super::query::COMMENT_FAN_OUT) issues, until every stream
//! is either exhausted or has reached the target element count.
//!
//! Callers pull rounds explicitly:
//!
//! ```ignore
//! let mut iterator = ProjectIterator::new(&gateway, request);
//! while iterator.has_next() {
//!     iterator.next().await?;
//! }
//! let project = iterator.into_project();
//! ```

use chrono::{DateTime, Utc};

use super::error::MiningError;
use super::gateway::QueryTransport;
use super::locator::RepositoryLocator;
use super::merge::merge;
use super::models::Project;
use super::pagination::PageCursor;
use super::query::{
    CommentBatch, CommentQueryBuilder, MAX_PAGE_SIZE, QueryVariables, round_document,
};
use super::response;

/// What to mine and how much of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningRequest {
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Upper bound for commits, issues, and comments per issue.
    pub target: usize,
    /// Whether commits are mined at all.
    pub include_commits: bool,
    /// Whether issues (and their comments) are mined at all.
    pub include_issues: bool,
    /// Only commits after this instant.
    pub commits_since: Option<DateTime<Utc>>,
    /// Only issues updated after this instant.
    pub issues_since: Option<DateTime<Utc>>,
}

impl MiningRequest {
    /// Requests up to `target` elements per stream of the given repository.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>, target: usize) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            target,
            include_commits: true,
            include_issues: true,
            commits_since: None,
            issues_since: None,
        }
    }

    /// Requests up to `target` elements per stream of the located repository.
    #[must_use]
    pub fn for_locator(locator: &RepositoryLocator, target: usize) -> Self {
        Self::new(
            locator.owner().as_str(),
            locator.repository().as_str(),
            target,
        )
    }

    /// Enables or disables the commit stream.
    #[must_use]
    pub const fn with_commits(mut self, include: bool) -> Self {
        self.include_commits = include;
        self
    }

    /// Enables or disables the issue stream.
    #[must_use]
    pub const fn with_issues(mut self, include: bool) -> Self {
        self.include_issues = include;
        self
    }

    /// Restricts commits to those after `since`.
    #[must_use]
    pub const fn with_commits_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.commits_since = since;
        self
    }

    /// Restricts issues to those updated after `since`.
    #[must_use]
    pub const fn with_issues_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.issues_since = since;
        self
    }
}

/// Pull-based iterator that grows a [`Project`] one round trip at a time.
///
/// Each successful [`next`](Self::next) merges exactly one response. A
/// failed round leaves the aggregate and the fetched-element counter as they
/// were, so the caller may retry or stop with a valid partial project.
pub struct ProjectIterator<'client, Transport>
where
    Transport: QueryTransport,
{
    transport: &'client Transport,
    variables: QueryVariables,
    comments: CommentQueryBuilder,
    target: usize,
    include_commits: bool,
    include_issues: bool,
    fetched: usize,
    rounds: usize,
    project: Option<Project>,
}

impl<'client, Transport> ProjectIterator<'client, Transport>
where
    Transport: QueryTransport,
{
    /// Creates an iterator that has not fetched anything yet.
    #[must_use]
    pub fn new(transport: &'client Transport, request: MiningRequest) -> Self {
        let variables = QueryVariables {
            commits_since: request.commits_since,
            issues_since: request.issues_since,
            ..QueryVariables::new(request.owner, request.name)
        };
        Self {
            transport,
            variables,
            comments: CommentQueryBuilder::new(request.target),
            target: request.target,
            include_commits: request.include_commits,
            include_issues: request.include_issues,
            fetched: 0,
            rounds: 0,
            project: None,
        }
    }

    /// Returns true while any stream still needs another round.
    ///
    /// This is derived from the aggregate alone: commits and issues need
    /// more while the shared counter is below target and their cursor has a
    /// next page; an issue needs more comments while its comment cursor has
    /// a next page and it holds fewer than target comments.
    #[must_use]
    pub fn has_next(&self) -> bool {
        let Some(project) = self.project.as_ref() else {
            return true;
        };

        let streams_open = self.fetched < self.target
            && (project.commits_page.has_next_page() || project.issues_page.has_next_page());

        streams_open
            || project
                .issues
                .iter()
                .any(|issue| self.comments.needs_comments(issue))
    }

    /// Performs one round: request, validate, map, merge.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::IterationFinished`] when [`has_next`](Self::has_next)
    /// is already false, and otherwise propagates transport, validation and
    /// mapping failures. Nothing is merged when an error is returned.
    pub async fn next(&mut self) -> Result<(), MiningError> {
        if !self.has_next() {
            return Err(MiningError::IterationFinished);
        }

        let (page_size, batch) = match self.project.as_ref() {
            None => (self.prepare_initial(), CommentBatch::default()),
            Some(project) => {
                let page_size = refine_variables(
                    &mut self.variables,
                    project,
                    self.fetched,
                    self.target,
                );
                (page_size, self.comments.build(project))
            }
        };

        tracing::debug!(
            round = self.rounds + 1,
            commits = self.variables.fetch_commits.then_some(self.variables.commits_first),
            issues = self.variables.fetch_issues.then_some(self.variables.issues_first),
            comment_fragments = batch.len(),
            "requesting mining round"
        );

        let query = round_document(&batch.query_fragment());
        let response = self.transport.send(&query, &self.variables).await?;
        let payload = response::validate(response, &self.variables)?;

        let merged = if let Some(project) = self.project.take() {
            match response::map_round(&payload, &self.variables, &batch) {
                Ok(round) => merge(project, round),
                Err(error) => {
                    self.project = Some(project);
                    return Err(error);
                }
            }
        } else {
            response::map_project(&payload, &self.variables)?
        };

        self.project = Some(merged);
        self.fetched = self.fetched.saturating_add(page_size);
        self.rounds += 1;
        Ok(())
    }

    fn prepare_initial(&mut self) -> usize {
        let page_size = self.target.min(MAX_PAGE_SIZE);
        let variables = &mut self.variables;
        variables.fetch_commits = self.include_commits;
        variables.commits_first = if self.include_commits { page_size } else { 0 };
        variables.commits_cursor = None;
        variables.fetch_issues = self.include_issues;
        variables.issues_first = if self.include_issues { page_size } else { 0 };
        variables.issues_cursor = None;
        variables.comments_first = page_size;
        page_size
    }

    /// The aggregate as of the last successful round, if any.
    #[must_use]
    pub const fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Consumes the iterator and returns the aggregate.
    ///
    /// An iterator that never completed a round yields an empty project.
    #[must_use]
    pub fn into_project(self) -> Project {
        self.project.unwrap_or_default()
    }

    /// Sum of the page sizes requested by successful rounds.
    #[must_use]
    pub const fn fetched_elements(&self) -> usize {
        self.fetched
    }

    /// Upper bound for every stream.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Number of successful rounds.
    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    /// Variables of the most recently prepared round.
    #[must_use]
    pub const fn variables(&self) -> &QueryVariables {
        &self.variables
    }
}

/// Points the commit and issue selections at their next pages, or switches
/// them off, and returns the page size charged to the round.
fn refine_variables(
    variables: &mut QueryVariables,
    project: &Project,
    fetched: usize,
    target: usize,
) -> usize {
    let page_size = target.saturating_sub(fetched).min(MAX_PAGE_SIZE);
    let under_target = fetched < target;

    (
        variables.fetch_commits,
        variables.commits_first,
        variables.commits_cursor,
    ) = continuation(&project.commits_page, under_target, page_size);
    (
        variables.fetch_issues,
        variables.issues_first,
        variables.issues_cursor,
    ) = continuation(&project.issues_page, under_target, page_size);

    variables.comments_first = target.min(MAX_PAGE_SIZE);
    page_size
}

fn continuation(
    page: &PageCursor,
    under_target: bool,
    page_size: usize,
) -> (bool, usize, Option<String>) {
    if page.has_next_page() && under_target {
        (true, page_size, page.end_cursor().map(ToOwned::to_owned))
    } else {
        (false, 0, None)
    }
}

#[cfg(test)]
mod tests;
