//! GraphQL documents and variables for incremental repository mining.
//!
//! Every round sends the same `MineRepository` document. Per-entity fetch
//! flags in [`QueryVariables`] switch the commit and issue selections on or
//! off through `@include`, and the comment fragments produced by
//! [`CommentQueryBuilder`] are spliced into the `repository` selection.

use chrono::{DateTime, Utc};
use serde::Serialize;

mod comments;

pub use comments::{
    COMMENT_FAN_OUT, CommentBatch, CommentFragment, CommentQueryBuilder, IssueDirection,
};

/// Largest page GitHub serves for any connection.
pub const MAX_PAGE_SIZE: usize = 100;

/// Variables for the next round's `MineRepository` query.
///
/// The iterator mutates one instance in place between rounds. Per-issue
/// comment cursors are not stored here; they live in the issue records and
/// reach the query through the comment fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Only commits after this instant.
    pub commits_since: Option<DateTime<Utc>>,
    /// Only issues updated after this instant.
    pub issues_since: Option<DateTime<Utc>>,
    /// Requested commit page size.
    pub commits_first: usize,
    /// Requested issue page size.
    pub issues_first: usize,
    /// Requested first comment page size for issues returned this round.
    pub comments_first: usize,
    /// Whether the commit history is selected this round.
    pub fetch_commits: bool,
    /// Whether the issue list is selected this round.
    pub fetch_issues: bool,
    /// Cursor to continue the commit history from.
    pub commits_cursor: Option<String>,
    /// Cursor to continue the issue list from.
    pub issues_cursor: Option<String>,
}

impl QueryVariables {
    /// Creates variables for a repository with nothing selected yet.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Describes the round for error diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "owner={owner}, name={name}, commits_cursor={commits}, issues_cursor={issues}",
            owner = self.owner,
            name = self.name,
            commits = self.commits_cursor.as_deref().unwrap_or("none"),
            issues = self.issues_cursor.as_deref().unwrap_or("none"),
        )
    }
}

const DOCUMENT_HEAD: &str = r"query MineRepository(
  $owner: String!,
  $name: String!,
  $commitsFirst: Int!,
  $commitsCursor: String,
  $commitsSince: GitTimestamp,
  $fetchCommits: Boolean!,
  $issuesFirst: Int!,
  $issuesCursor: String,
  $issuesSince: DateTime,
  $fetchIssues: Boolean!,
  $commentsFirst: Int!
) {
  repository(owner: $owner, name: $name) {
    id
    name
    url
    defaultBranchRef @include(if: $fetchCommits) {
      target {
        ... on Commit {
          history(first: $commitsFirst, after: $commitsCursor, since: $commitsSince) {
            pageInfo { hasNextPage endCursor }
            nodes { ...CommitFields }
          }
        }
      }
    }
    issues(
      first: $issuesFirst,
      after: $issuesCursor,
      filterBy: { since: $issuesSince },
      orderBy: { field: CREATED_AT, direction: ASC }
    ) @include(if: $fetchIssues) {
      pageInfo { hasNextPage endCursor }
      nodes {
        ...IssueFields
        comments(first: $commentsFirst) {
          pageInfo { hasNextPage endCursor }
          nodes { ...CommentFields }
        }
      }
    }
";

const DOCUMENT_TAIL: &str = r"  }
}

fragment CommitFields on Commit {
  oid
  message
  committedDate
  url
  author { name email user { login } }
}

fragment IssueFields on Issue {
  id
  number
  title
  body
  state
  url
  author { login }
  createdAt
  updatedAt
  closedAt
}

fragment CommentFields on IssueComment {
  id
  body
  author { login }
  createdAt
  updatedAt
}
";

/// Assembles the GraphQL document for one round.
///
/// `comment_fragments` is spliced verbatim inside the `repository`
/// selection; pass an empty string when no issue needs more comments.
#[must_use]
pub fn round_document(comment_fragments: &str) -> String {
    let mut document =
        String::with_capacity(DOCUMENT_HEAD.len() + comment_fragments.len() + DOCUMENT_TAIL.len());
    document.push_str(DOCUMENT_HEAD);
    if !comment_fragments.is_empty() {
        document.push_str(comment_fragments);
        document.push('\n');
    }
    document.push_str(DOCUMENT_TAIL);
    document
}
