//! Shared GraphQL fixtures for integration tests.
//!
//! Responses are shaped like GitHub's `MineRepository` payloads so that the
//! Octocrab gateway, response mapping and merging run unmodified.

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path Octocrab posts GraphQL documents to for a non-github.com host.
pub const GRAPHQL_PATH: &str = "/api/graphql";

/// Builds a connection with `pageInfo` and `nodes`.
pub fn connection(nodes: Vec<Value>, end_cursor: Option<&str>, has_next_page: bool) -> Value {
    json!({
        "pageInfo": { "hasNextPage": has_next_page, "endCursor": end_cursor },
        "nodes": nodes
    })
}

/// Commit nodes with object ids `sha<index>`.
pub fn commit_nodes(range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|index| {
            json!({
                "oid": format!("sha{index}"),
                "message": format!("change {index}"),
                "committedDate": "2024-05-01T10:00:00Z",
                "author": { "name": "Octo Cat", "email": "octo@example.com", "user": { "login": "octocat" } }
            })
        })
        .collect()
}

/// Wraps repository fields in a GraphQL envelope.
pub fn envelope(fields: &Value) -> Value {
    let mut repository = json!({
        "id": "R_1",
        "name": "repo",
        "url": "https://github.com/octo/repo"
    });
    if let (Some(target), Some(extra)) = (repository.as_object_mut(), fields.as_object()) {
        target.extend(extra.clone());
    }
    json!({ "data": { "repository": repository } })
}

/// Serves `response` exactly once for a request whose variables contain
/// `variables`.
pub async fn mount_round(server: &MockServer, variables: Value, response: Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "variables": variables })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}
