//! Merging one round's pages into the aggregate.

use super::models::{Comment, Commit, Issue, Project};
use super::pagination::Connection;

/// Next comment page for one issue, keyed by the issue's node identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComments {
    /// Issue the comments belong to.
    pub issue_id: String,
    /// The fetched page.
    pub comments: Connection<Comment>,
}

/// Everything a refinement round fetched.
///
/// `None` means the stream was not requested this round, which is distinct
/// from a requested page that came back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundResult {
    /// Next commit page, if commits were requested.
    pub commits: Option<Connection<Commit>>,
    /// Next issue page, if issues were requested.
    pub issues: Option<Connection<Issue>>,
    /// Next comment pages for the issues addressed this round.
    pub comments: Vec<IssueComments>,
}

/// Merges a round into the aggregate and returns the result.
///
/// Records are appended in remote order and nothing already present is
/// removed or reordered. A stream's cursor is replaced only when that
/// stream was part of the round.
#[must_use]
pub fn merge(mut project: Project, round: RoundResult) -> Project {
    if let Some(page) = round.commits {
        project.commits.extend(page.nodes);
        project.commits_page = page.page;
    }

    if let Some(page) = round.issues {
        project.issues.extend(page.nodes);
        project.issues_page = page.page;
    }

    for IssueComments { issue_id, comments } in round.comments {
        let Some(issue) = project.issues.iter_mut().find(|issue| issue.id == issue_id) else {
            tracing::warn!("dropping comment page for unknown issue {issue_id}");
            continue;
        };
        issue.comments.extend(comments.nodes);
        issue.comments_page = comments.page;
    }

    project
}
