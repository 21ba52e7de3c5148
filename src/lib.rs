//! Magpie library crate for incremental GitHub repository mining.
//!
//! The library fetches a repository's commits, issues and issue comments
//! through GitHub's GraphQL API in as few round trips as it can, growing a
//! single [`Project`] aggregate round by round up to a target element count.
//! Pagination state lives in the aggregate, so a run can stop after any
//! successful round with a consistent partial result.

pub mod config;
pub mod export;
pub mod github;
pub mod telemetry;

pub use config::MagpieConfig;
pub use github::{
    MiningError, MiningRequest, OctocrabQueryGateway, PersonalAccessToken, Project,
    ProjectIterator, ProjectMiner, QueryTransport, RepositoryLocator,
};
