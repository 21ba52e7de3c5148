//! One-line description of a mining run.

use std::fmt;

use crate::github::models::Project;

/// Counts reported by the CLI once mining stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Commits mined.
    pub commits: usize,
    /// Issues mined.
    pub issues: usize,
    /// Comments mined across all issues.
    pub comments: usize,
}

impl ProjectSummary {
    /// Counts the records held by `project`.
    #[must_use]
    pub fn of(project: &Project) -> Self {
        Self {
            commits: project.commits.len(),
            issues: project.issues.len(),
            comments: project.comment_count(),
        }
    }
}

impl fmt::Display for ProjectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} commits, {} issues, {} comments",
            self.commits, self.issues, self.comments
        )
    }
}
