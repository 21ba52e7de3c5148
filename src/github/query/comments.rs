//! Batched next-page comment requests for issues that still need comments.
//!
//! GitHub's batched `issues` connection offers no by-identifier sub-selection
//! in this form, so each fragment locates its issue relative to a neighbour's
//! cursor and is tagged with a positional alias `issue_<index>`. The alias is
//! only used to find the fragment's result in the response; the owning issue
//! is the identifier captured when the fragment was built, and the issue the
//! remote located must carry that same identifier.

use crate::github::models::{Issue, Project};

use super::MAX_PAGE_SIZE;

/// Most issues addressed by the comment fragments of a single round.
pub const COMMENT_FAN_OUT: usize = 10;

/// Direction used to locate an issue next to a neighbour's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueDirection {
    /// `issues(first: 1, after: cursor)`.
    After,
    /// `issues(last: 1, before: cursor)`.
    Before,
}

/// Next-page comment request for one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFragment {
    /// Response key of this fragment (`issue_<index>`).
    pub alias: String,
    /// Node identifier of the issue the comments belong to.
    pub issue_id: String,
    /// Position of the issue in the aggregate when the fragment was built.
    pub index: usize,
    /// How the issue is located relative to `issue_cursor`.
    pub direction: IssueDirection,
    /// Neighbouring cursor used to locate the issue.
    pub issue_cursor: Option<String>,
    /// Number of comments requested.
    pub page_size: usize,
    /// The issue's own comment cursor.
    pub comments_cursor: Option<String>,
}

impl CommentFragment {
    /// Renders the fragment as an aliased `issues` selection.
    #[must_use]
    pub fn render(&self) -> String {
        let issue_cursor = literal(self.issue_cursor.as_deref());
        let locator = match self.direction {
            IssueDirection::After => format!("first: 1, after: {issue_cursor}"),
            IssueDirection::Before => format!("last: 1, before: {issue_cursor}"),
        };
        format!(
            "    {alias}: issues({locator}, filterBy: {{ since: $issuesSince }}, \
             orderBy: {{ field: CREATED_AT, direction: ASC }}) {{\n      \
             nodes {{\n        id\n        \
             comments(first: {page_size}, after: {cursor}) {{\n          \
             pageInfo {{ hasNextPage endCursor }}\n          \
             nodes {{ ...CommentFields }}\n        }}\n      }}\n    }}",
            alias = self.alias,
            page_size = self.page_size,
            cursor = literal(self.comments_cursor.as_deref()),
        )
    }
}

/// Renders an optional cursor as a GraphQL string literal or `null`.
fn literal(cursor: Option<&str>) -> String {
    cursor.map_or_else(
        || "null".to_owned(),
        |value| serde_json::Value::from(value).to_string(),
    )
}

/// The comment fragments of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentBatch {
    fragments: Vec<CommentFragment>,
}

impl CommentBatch {
    /// The fragments in aggregate order.
    #[must_use]
    pub fn fragments(&self) -> &[CommentFragment] {
        &self.fragments
    }

    /// Number of issues addressed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if no issue needs comments this round.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Newline-joined fragments, empty when the batch is empty.
    #[must_use]
    pub fn query_fragment(&self) -> String {
        self.fragments
            .iter()
            .map(CommentFragment::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Selects issues that need more comments and builds their fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentQueryBuilder {
    target: usize,
    fan_out: usize,
}

impl CommentQueryBuilder {
    /// Creates a builder capping every issue at `target` comments.
    #[must_use]
    pub const fn new(target: usize) -> Self {
        Self {
            target,
            fan_out: COMMENT_FAN_OUT,
        }
    }

    /// Returns true if the issue may still receive comments.
    #[must_use]
    pub fn needs_comments(&self, issue: &Issue) -> bool {
        issue.comments_page.has_next_page() && issue.comments.len() < self.target
    }

    /// Builds the fragments for the first issues, in aggregate order, that
    /// still need comments.
    #[must_use]
    pub fn build(&self, project: &Project) -> CommentBatch {
        let issues = project.issues.as_slice();
        let fragments = issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| self.needs_comments(issue))
            .take(self.fan_out)
            .map(|(index, issue)| self.fragment(issues, index, issue))
            .collect();
        CommentBatch { fragments }
    }

    fn fragment(&self, issues: &[Issue], index: usize, issue: &Issue) -> CommentFragment {
        let (direction, neighbour) = if index + 1 == issues.len() {
            let previous = index.checked_sub(1).and_then(|position| issues.get(position));
            (IssueDirection::After, previous)
        } else {
            (IssueDirection::Before, issues.get(index + 1))
        };
        let remaining = self.target.saturating_sub(issue.comments.len());

        CommentFragment {
            alias: format!("issue_{index}"),
            issue_id: issue.id.clone(),
            index,
            direction,
            issue_cursor: neighbour
                .and_then(|other| other.comments_page.end_cursor())
                .map(ToOwned::to_owned),
            page_size: remaining.min(MAX_PAGE_SIZE),
            comments_cursor: issue.comments_page.end_cursor().map(ToOwned::to_owned),
        }
    }
}
