//! Test helpers for constructing mining fixtures.
//!
//! Builders here keep iterator, merge and query tests focused on cursor
//! state rather than record boilerplate.
//!
//! # Examples
//!
//! ```
//! use magpie::github::models::test_support::{issue_with_comments, project_with_issues};
//!
//! let issue = issue_with_comments("I_1", 3, Some("c3"), true);
//! let project = project_with_issues(vec![issue]);
//! assert_eq!(project.comment_count(), 3);
//! ```

use crate::github::pagination::PageCursor;

use super::{Comment, Commit, Issue, Project};

/// Constructs a comment with the given identifier and a derived body.
#[must_use]
pub fn comment(id: &str) -> Comment {
    Comment {
        id: id.to_owned(),
        body: Some(format!("body of {id}")),
        author: Some("reviewer".to_owned()),
        ..Comment::default()
    }
}

/// Constructs a commit with the given object identifier.
#[must_use]
pub fn commit(oid: &str) -> Commit {
    Commit {
        oid: oid.to_owned(),
        message: Some(format!("commit {oid}")),
        ..Commit::default()
    }
}

/// Constructs an issue holding `count` comments and the given comment cursor.
///
/// Comment identifiers are derived from the issue identifier so that
/// assertions can tell comments of different issues apart.
#[must_use]
pub fn issue_with_comments(
    id: &str,
    count: usize,
    end_cursor: Option<&str>,
    has_next_page: bool,
) -> Issue {
    Issue {
        id: id.to_owned(),
        title: Some(format!("issue {id}")),
        comments: (0..count)
            .map(|index| comment(&format!("{id}-C{index}")))
            .collect(),
        comments_page: PageCursor::new(end_cursor.map(ToOwned::to_owned), has_next_page),
        ..Issue::default()
    }
}

/// Constructs a project holding the given issues and exhausted commit and
/// issue streams.
#[must_use]
pub fn project_with_issues(issues: Vec<Issue>) -> Project {
    Project {
        id: "R_1".to_owned(),
        name: "repo".to_owned(),
        url: Some("https://github.com/owner/repo".to_owned()),
        issues,
        ..Project::default()
    }
}
