//! Validation and mapping of `MineRepository` responses.
//!
//! A response is first checked for GraphQL errors and a repository payload,
//! then converted into either a fresh [`Project`] (first round) or a
//! [`RoundResult`] to merge into an existing one. Nothing here mutates the
//! aggregate, so a response that fails either step leaves it untouched.

use serde::Deserialize;
use serde_json::Value;

use super::error::MiningError;
use super::merge::{IssueComments, RoundResult};
use super::models::{ApiIssueLookup, ApiRepository, Commit, Issue, Project};
use super::pagination::Connection;
use super::query::{CommentBatch, QueryVariables};

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

fn invalid(message: impl Into<String>, variables: &QueryVariables) -> MiningError {
    MiningError::InvalidResponse {
        message: message.into(),
        parameters: variables.describe(),
    }
}

fn mapping_error(error: &serde_json::Error) -> MiningError {
    MiningError::Mapping {
        message: error.to_string(),
    }
}

/// Checks the response envelope and unwraps the repository payload.
///
/// # Errors
///
/// Returns [`MiningError::InvalidResponse`] when the response reports
/// GraphQL errors, is not a GraphQL envelope, or lacks a repository.
pub fn validate(response: Value, variables: &QueryVariables) -> Result<Value, MiningError> {
    let envelope: GraphQlEnvelope = serde_json::from_value(response)
        .map_err(|error| invalid(format!("malformed envelope: {error}"), variables))?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let messages = errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(invalid(messages, variables));
    }

    match envelope
        .data
        .and_then(|mut data| data.get_mut("repository").map(Value::take))
    {
        Some(repository @ Value::Object(_)) => Ok(repository),
        _ => Err(invalid("response does not contain the repository", variables)),
    }
}

fn commit_page(
    repository: &ApiRepository,
    variables: &QueryVariables,
) -> Option<Connection<Commit>> {
    variables.fetch_commits.then(|| {
        repository
            .default_branch_ref
            .clone()
            .and_then(|branch| branch.target)
            .and_then(|target| target.history)
            .map(Into::into)
            .unwrap_or_default()
    })
}

fn issue_page(repository: &ApiRepository, variables: &QueryVariables) -> Option<Connection<Issue>> {
    variables
        .fetch_issues
        .then(|| repository.issues.clone().map(Into::into).unwrap_or_default())
}

/// Converts a first-round payload into a new aggregate.
///
/// Streams not selected by `variables` start exhausted.
///
/// # Errors
///
/// Returns [`MiningError::Mapping`] when the payload does not have the
/// repository shape.
pub fn map_project(payload: &Value, variables: &QueryVariables) -> Result<Project, MiningError> {
    let repository = ApiRepository::deserialize(payload).map_err(|error| mapping_error(&error))?;
    let commits = commit_page(&repository, variables).unwrap_or_default();
    let issues = issue_page(&repository, variables).unwrap_or_default();

    Ok(Project {
        id: repository.id,
        name: repository.name,
        url: repository.url,
        commits: commits.nodes,
        issues: issues.nodes,
        commits_page: commits.page,
        issues_page: issues.page,
    })
}

/// Converts a refinement payload into the pages to merge.
///
/// Every fragment of `batch` must appear under its alias and locate the
/// issue recorded in the fragment.
///
/// # Errors
///
/// Returns [`MiningError::InvalidResponse`] when an alias is missing,
/// locates no issue, or locates a different issue, and [`MiningError::Mapping`] when a page has the wrong
/// shape.
pub fn map_round(
    payload: &Value,
    variables: &QueryVariables,
    batch: &CommentBatch,
) -> Result<RoundResult, MiningError> {
    let repository = ApiRepository::deserialize(payload).map_err(|error| mapping_error(&error))?;

    let comments = batch
        .fragments()
        .iter()
        .map(|fragment| {
            let aliased = payload.get(&fragment.alias).ok_or_else(|| {
                invalid(
                    format!("missing comment page for alias {}", fragment.alias),
                    variables,
                )
            })?;
            let lookup =
                ApiIssueLookup::deserialize(aliased).map_err(|error| mapping_error(&error))?;
            let node = lookup.nodes.into_iter().next().ok_or_else(|| {
                invalid(
                    format!("alias {} did not resolve an issue", fragment.alias),
                    variables,
                )
            })?;
            if node.id != fragment.issue_id {
                return Err(invalid(
                    format!(
                        "alias {} resolved issue {} instead of {} at position {}",
                        fragment.alias, node.id, fragment.issue_id, fragment.index
                    ),
                    variables,
                ));
            }
            Ok(IssueComments {
                issue_id: node.id,
                comments: node.comments.into(),
            })
        })
        .collect::<Result<Vec<_>, MiningError>>()?;

    Ok(RoundResult {
        commits: commit_page(&repository, variables),
        issues: issue_page(&repository, variables),
        comments,
    })
}
