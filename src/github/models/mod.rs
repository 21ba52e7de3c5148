//! Data models representing a mined repository and its records.
//!
//! This module contains the aggregate [`Project`] record built across mining
//! rounds, together with the commit, issue and comment records it owns.
//! Types prefixed with `Api` are internal deserialisation targets mirroring
//! the GitHub GraphQL payload; they convert into the public domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::{Connection, PageCursor};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Aggregate record for one repository, grown round by round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// GraphQL node identifier of the repository.
    pub id: String,
    /// Repository name.
    pub name: String,
    /// HTML URL of the repository.
    pub url: Option<String>,
    /// Commits on the default branch, in remote order.
    pub commits: Vec<Commit>,
    /// Issues ordered by creation time.
    pub issues: Vec<Issue>,
    /// Position within the commit history stream.
    pub commits_page: PageCursor,
    /// Position within the issue stream.
    pub issues_page: PageCursor,
}

impl Project {
    /// Total number of comments across all issues.
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.issues.iter().map(|issue| issue.comments.len()).sum()
    }

    /// Finds an issue by its node identifier.
    #[must_use]
    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }
}

/// A commit on the repository's default branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Git object identifier.
    pub oid: String,
    /// Full commit message.
    pub message: Option<String>,
    /// Commit timestamp.
    pub committed_at: Option<DateTime<Utc>>,
    /// Git author name.
    pub author_name: Option<String>,
    /// Git author email.
    pub author_email: Option<String>,
    /// GitHub login linked to the author, when GitHub could resolve one.
    pub author_login: Option<String>,
    /// HTML URL of the commit.
    pub url: Option<String>,
}

/// An issue together with the comments fetched for it so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// GraphQL node identifier.
    pub id: String,
    /// Issue number within the repository.
    pub number: u64,
    /// Issue title.
    pub title: Option<String>,
    /// Issue body.
    pub body: Option<String>,
    /// State (e.g. OPEN, CLOSED).
    pub state: Option<String>,
    /// HTML URL of the issue.
    pub url: Option<String>,
    /// Author login.
    pub author: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Close timestamp, if closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Comments in remote order; only ever appended to.
    pub comments: Vec<Comment>,
    /// Position within this issue's comment stream.
    pub comments_page: PageCursor,
}

/// An issue comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// GraphQL node identifier.
    pub id: String,
    /// Comment body.
    pub body: Option<String>,
    /// Author login.
    pub author: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiRepository {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) url: Option<String>,
    pub(crate) default_branch_ref: Option<ApiBranchRef>,
    pub(crate) issues: Option<ApiConnection<ApiIssue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiBranchRef {
    pub(crate) target: Option<ApiCommitTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitTarget {
    pub(crate) history: Option<ApiConnection<ApiCommit>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiConnection<T> {
    pub(crate) page_info: ApiPageInfo,
    #[serde(default = "Vec::new")]
    pub(crate) nodes: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPageInfo {
    pub(crate) end_cursor: Option<String>,
    pub(crate) has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiCommit {
    pub(crate) oid: String,
    pub(crate) message: Option<String>,
    pub(crate) committed_date: Option<DateTime<Utc>>,
    pub(crate) url: Option<String>,
    pub(crate) author: Option<ApiGitActor>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiGitActor {
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) user: Option<ApiActor>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiActor {
    pub(crate) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiIssue {
    pub(crate) id: String,
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) author: Option<ApiActor>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) closed_at: Option<DateTime<Utc>>,
    pub(crate) comments: Option<ApiConnection<ApiComment>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiComment {
    pub(crate) id: String,
    pub(crate) body: Option<String>,
    pub(crate) author: Option<ApiActor>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

/// Result of one aliased comment fragment: the issue located by adjacency
/// and its next comment page.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssueLookup {
    #[serde(default = "Vec::new")]
    pub(crate) nodes: Vec<ApiIssueComments>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssueComments {
    pub(crate) id: String,
    pub(crate) comments: ApiConnection<ApiComment>,
}

impl From<ApiPageInfo> for PageCursor {
    fn from(value: ApiPageInfo) -> Self {
        Self::new(value.end_cursor, value.has_next_page)
    }
}

impl<A, T> From<ApiConnection<A>> for Connection<T>
where
    A: Into<T>,
{
    fn from(value: ApiConnection<A>) -> Self {
        Self {
            nodes: value.nodes.into_iter().map(Into::into).collect(),
            page: value.page_info.into(),
        }
    }
}

impl From<ApiCommit> for Commit {
    fn from(value: ApiCommit) -> Self {
        let (author_name, author_email, author_login) =
            value.author.map_or((None, None, None), |author| {
                (
                    author.name,
                    author.email,
                    author.user.and_then(|user| user.login),
                )
            });
        Self {
            oid: value.oid,
            message: value.message,
            committed_at: value.committed_date,
            author_name,
            author_email,
            author_login,
            url: value.url,
        }
    }
}

impl From<ApiIssue> for Issue {
    fn from(value: ApiIssue) -> Self {
        let comments: Connection<Comment> = value.comments.map(Into::into).unwrap_or_default();
        Self {
            id: value.id,
            number: value.number,
            title: value.title,
            body: value.body,
            state: value.state,
            url: value.url,
            author: value.author.and_then(|author| author.login),
            created_at: value.created_at,
            updated_at: value.updated_at,
            closed_at: value.closed_at,
            comments: comments.nodes,
            comments_page: comments.page,
        }
    }
}

impl From<ApiComment> for Comment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            body: value.body,
            author: value.author.and_then(|author| author.login),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
