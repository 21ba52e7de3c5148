//! Incremental mining of a GitHub repository over GraphQL.
//!
//! A mining run fetches commits, issues and issue comments in rounds. Each
//! round sends one `MineRepository` document whose variables continue the
//! commit and issue streams from their cursors and whose aliased fragments
//! fetch the next comment page of a bounded number of issues. Responses are
//! validated and mapped before they are merged, so a failed round never
//! leaves a half-updated project behind.

pub mod error;
pub mod gateway;
pub mod intake;
pub mod iterator;
pub mod locator;
pub mod merge;
pub mod models;
pub mod pagination;
pub mod query;
pub mod response;

pub use error::MiningError;
pub use gateway::{OctocrabQueryGateway, QueryTransport};
pub use intake::ProjectMiner;
pub use iterator::{MiningRequest, ProjectIterator};
pub use locator::{PersonalAccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use merge::{IssueComments, RoundResult, merge};
pub use models::{Comment, Commit, Issue, Project};
pub use pagination::{Connection, PageCursor};
pub use query::{COMMENT_FAN_OUT, CommentQueryBuilder, MAX_PAGE_SIZE, QueryVariables};

#[cfg(test)]
pub use gateway::MockQueryTransport;

#[cfg(test)]
mod tests;
