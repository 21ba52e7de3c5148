//! Round-level tests for `ProjectIterator` over a scripted transport.

use mockall::Sequence;
use rstest::rstest;
use serde_json::{Value, json};

use super::{MiningRequest, ProjectIterator};
use crate::github::error::MiningError;
use crate::github::gateway::MockQueryTransport;
use crate::github::query::QueryVariables;

const ROUND_GUARD: usize = 50;

fn connection(nodes: Vec<Value>, end_cursor: Option<&str>, has_next_page: bool) -> Value {
    json!({
        "pageInfo": { "hasNextPage": has_next_page, "endCursor": end_cursor },
        "nodes": nodes
    })
}

fn commit_nodes(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(|index| json!({ "oid": format!("sha{index}") })).collect()
}

fn comment_nodes(issue_id: &str, range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|index| json!({ "id": format!("{issue_id}-C{index}"), "body": "text" }))
        .collect()
}

fn issue_node(id: &str, number: u64, comments: Value) -> Value {
    json!({ "id": id, "number": number, "title": format!("issue {number}"), "comments": comments })
}

/// Wraps repository fields in a GraphQL envelope.
fn envelope(fields: &Value) -> Value {
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

fn history(commits: Value) -> Value {
    json!({ "target": { "history": commits } })
}

fn no_commits() -> Value {
    history(connection(Vec::new(), None, false))
}

fn no_issues() -> Value {
    connection(Vec::new(), None, false)
}

fn expect_round<F>(
    transport: &mut MockQueryTransport,
    sequence: &mut Sequence,
    matches: F,
    response: Result<Value, MiningError>,
) where
    F: Fn(&str, &QueryVariables) -> bool + Send + 'static,
{
    transport
        .expect_send()
        .withf(move |query: &str, variables: &QueryVariables| matches(query, variables))
        .times(1)
        .in_sequence(sequence)
        .return_once(move |_, _| response);
}

async fn drain(iterator: &mut ProjectIterator<'_, MockQueryTransport>) {
    let mut guard = 0;
    while iterator.has_next() {
        iterator.next().await.expect("round should succeed");
        guard += 1;
        assert!(guard < ROUND_GUARD, "iteration did not terminate");
    }
}

#[rstest]
fn fresh_iterator_has_work_and_nothing_fetched() {
    let transport = MockQueryTransport::new();
    let iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 5));

    assert!(iterator.has_next());
    assert!(iterator.project().is_none());
    assert_eq!(iterator.fetched_elements(), 0);
    assert_eq!(iterator.target(), 5);
}

#[tokio::test]
async fn small_target_finishes_with_capped_comments() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    let issues = connection(
        vec![
            issue_node("I_1", 1, connection(comment_nodes("I_1", 0..5), Some("c5"), true)),
            issue_node("I_2", 2, connection(Vec::new(), None, false)),
        ],
        Some("i2"),
        false,
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |query, variables| {
            !query.contains("issue_0:")
                && variables.commits_first == 5
                && variables.issues_first == 5
                && variables.comments_first == 5
        },
        Ok(envelope(&json!({
            "defaultBranchRef": history(connection(commit_nodes(0..3), Some("h3"), false)),
            "issues": issues
        }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 5));
    drain(&mut iterator).await;

    assert!(iterator.rounds() <= 2, "took {} rounds", iterator.rounds());
    let project = iterator.project().expect("project should exist");
    assert_eq!(project.commits.len(), 3);
    assert_eq!(project.issues.len(), 2);
    assert_eq!(project.issue("I_1").map(|issue| issue.comments.len()), Some(5));
    assert_eq!(project.issue("I_2").map(|issue| issue.comments.len()), Some(0));
}

#[tokio::test]
async fn zero_target_requests_empty_pages_and_finishes() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| {
            variables.commits_first == 0
                && variables.issues_first == 0
                && variables.comments_first == 0
        },
        Ok(envelope(&json!({ "defaultBranchRef": no_commits(), "issues": no_issues() }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 0));
    iterator.next().await.expect("single round should succeed");

    assert!(!iterator.has_next());
    let project = iterator.into_project();
    assert!(project.commits.is_empty());
    assert!(project.issues.is_empty());
}

#[tokio::test]
async fn large_target_continues_open_streams_from_cursor() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| {
            variables.fetch_commits
                && variables.fetch_issues
                && variables.commits_first == 100
                && variables.commits_cursor.is_none()
        },
        Ok(envelope(&json!({
            "defaultBranchRef": history(connection(commit_nodes(0..100), Some("h1"), true)),
            "issues": no_issues()
        }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| {
            variables.fetch_commits
                && variables.commits_first == 100
                && variables.commits_cursor.as_deref() == Some("h1")
                && !variables.fetch_issues
                && variables.issues_first == 0
        },
        Ok(envelope(&json!({
            "defaultBranchRef": history(connection(commit_nodes(100..200), Some("h2"), true))
        }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| {
            variables.commits_first == 50 && variables.commits_cursor.as_deref() == Some("h2")
        },
        Ok(envelope(&json!({
            "defaultBranchRef": history(connection(commit_nodes(200..250), Some("h3"), true))
        }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 250));
    drain(&mut iterator).await;

    assert_eq!(iterator.rounds(), 3);
    assert_eq!(iterator.fetched_elements(), 250);
    let project = iterator.into_project();
    assert_eq!(project.commits.len(), 250);
    assert_eq!(
        project.commits.last().map(|commit| commit.oid.as_str()),
        Some("sha249")
    );
    assert!(
        project.commits_page.has_next_page(),
        "remote still has commits but the target is reached"
    );
}

#[tokio::test]
async fn refinement_round_pages_comments_by_alias() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    let issues = connection(
        vec![
            issue_node("I_0", 1, connection(comment_nodes("I_0", 0..2), Some("c0"), true)),
            issue_node("I_1", 2, connection(comment_nodes("I_1", 0..10), Some("c1"), true)),
        ],
        Some("i1"),
        false,
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, _| true,
        Ok(envelope(&json!({ "defaultBranchRef": no_commits(), "issues": issues }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |query, variables| {
            query.contains(r#"issue_0: issues(last: 1, before: "c1""#)
                && query.contains(r#"comments(first: 8, after: "c0")"#)
                && !query.contains("issue_1:")
                && !variables.fetch_commits
                && !variables.fetch_issues
        },
        Ok(envelope(&json!({
            "issue_0": { "nodes": [{
                "id": "I_0",
                "comments": connection(comment_nodes("I_0", 2..5), Some("c0b"), false)
            }] }
        }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 10));
    drain(&mut iterator).await;

    assert_eq!(iterator.rounds(), 2);
    let project = iterator.into_project();
    let first = project.issue("I_0").expect("first issue");
    let ids: Vec<&str> = first.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["I_0-C0", "I_0-C1", "I_0-C2", "I_0-C3", "I_0-C4"]);
    assert!(first.comments_page.is_exhausted());
    let second = project.issue("I_1").expect("second issue");
    assert_eq!(second.comments.len(), 10, "capped issue is left alone");
    assert_eq!(project.comment_count(), 15);
}

#[tokio::test]
async fn invalid_round_leaves_aggregate_untouched_and_can_be_retried() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, _| true,
        Ok(envelope(&json!({
            "defaultBranchRef": history(connection(commit_nodes(0..100), Some("h1"), true)),
            "issues": no_issues()
        }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| variables.commits_cursor.as_deref() == Some("h1"),
        Ok(json!({ "data": null, "errors": [{ "message": "Something went wrong" }] })),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| variables.commits_cursor.as_deref() == Some("h1"),
        Ok(envelope(&json!({
            "defaultBranchRef": history(connection(commit_nodes(100..150), Some("h2"), false))
        }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 150));
    iterator.next().await.expect("first round should succeed");
    let snapshot = iterator.project().cloned();

    let error = iterator.next().await.expect_err("second round should fail");

    match error {
        MiningError::InvalidResponse { message, parameters } => {
            assert!(message.contains("Something went wrong"), "got {message}");
            assert!(parameters.contains("commits_cursor=h1"), "got {parameters}");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
    assert_eq!(iterator.project().cloned(), snapshot);
    assert_eq!(iterator.fetched_elements(), 100);
    assert!(iterator.has_next());

    iterator.next().await.expect("retry should succeed");
    assert_eq!(iterator.fetched_elements(), 150);
    assert_eq!(iterator.project().map(|project| project.commits.len()), Some(150));
}

#[tokio::test]
async fn unresolved_alias_restores_previous_aggregate() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    let issues = connection(
        vec![issue_node("I_0", 1, connection(comment_nodes("I_0", 0..1), Some("c0"), true))],
        Some("i0"),
        false,
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, _| true,
        Ok(envelope(&json!({ "defaultBranchRef": no_commits(), "issues": issues }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |query, _| query.contains("issue_0:"),
        Ok(envelope(&json!({ "issue_0": { "nodes": [] } }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 3));
    iterator.next().await.expect("first round should succeed");
    let snapshot = iterator.project().cloned();

    let error = iterator.next().await.expect_err("alias should not resolve");

    assert!(
        matches!(error, MiningError::InvalidResponse { .. }),
        "expected InvalidResponse, got {error:?}"
    );
    assert_eq!(iterator.project().cloned(), snapshot);
    assert_eq!(iterator.rounds(), 1);
}

#[tokio::test]
async fn alias_resolving_another_issue_is_rejected_without_merging() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    let issues = connection(
        vec![issue_node("I_0", 1, connection(comment_nodes("I_0", 0..1), Some("c0"), true))],
        Some("i0"),
        false,
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |_, _| true,
        Ok(envelope(&json!({ "defaultBranchRef": no_commits(), "issues": issues }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |query, _| query.contains("issue_0:"),
        Ok(envelope(&json!({
            "issue_0": { "nodes": [{
                "id": "I_OTHER",
                "comments": connection(comment_nodes("I_OTHER", 0..2), Some("x1"), false)
            }] }
        }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 3));
    iterator.next().await.expect("first round should succeed");
    let snapshot = iterator.project().cloned();

    let error = iterator.next().await.expect_err("foreign issue should be rejected");

    assert!(
        matches!(error, MiningError::InvalidResponse { .. }),
        "expected InvalidResponse, got {error:?}"
    );
    assert_eq!(iterator.project().cloned(), snapshot);
    let comments: Vec<String> = iterator
        .project()
        .and_then(|project| project.issue("I_0"))
        .map(|issue| issue.comments.iter().map(|c| c.id.clone()).collect())
        .unwrap_or_default();
    assert_eq!(comments, vec!["I_0-C0".to_owned()]);
    assert_eq!(iterator.fetched_elements(), 3);
}

#[tokio::test]
async fn later_issue_pages_and_comment_refinement_respect_target() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| variables.issues_first == 100 && variables.comments_first == 100,
        Ok(envelope(&json!({
            "issues": connection(
                vec![
                    issue_node("I_0", 1, connection(comment_nodes("I_0", 0..100), Some("c0"), true)),
                    issue_node("I_1", 2, connection(Vec::new(), None, false)),
                ],
                Some("i1"),
                true,
            )
        }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |query, variables| {
            variables.fetch_issues
                && variables.issues_first == 50
                && variables.issues_cursor.as_deref() == Some("i1")
                && variables.comments_first == 100
                && query.contains("issue_0: issues(last: 1, before: null")
                && query.contains(r#"comments(first: 50, after: "c0")"#)
        },
        Ok(envelope(&json!({
            "issues": connection(
                vec![
                    issue_node("I_2", 3, connection(comment_nodes("I_2", 0..100), Some("c2"), true)),
                    issue_node("I_3", 4, connection(comment_nodes("I_3", 0..3), Some("c3"), false)),
                ],
                Some("i3"),
                true,
            ),
            "issue_0": { "nodes": [{
                "id": "I_0",
                "comments": connection(comment_nodes("I_0", 100..150), Some("c0b"), true)
            }] }
        }))),
    );
    expect_round(
        &mut transport,
        &mut sequence,
        |query, variables| {
            !variables.fetch_issues
                && query.contains(r#"issue_2: issues(last: 1, before: "c3""#)
                && query.contains(r#"comments(first: 50, after: "c2")"#)
                && !query.contains("issue_0:")
        },
        Ok(envelope(&json!({
            "issue_2": { "nodes": [{
                "id": "I_2",
                "comments": connection(comment_nodes("I_2", 100..150), Some("c2b"), true)
            }] }
        }))),
    );

    let target = 150;
    let request = MiningRequest::new("octo", "repo", target).with_commits(false);
    let mut iterator = ProjectIterator::new(&transport, request);
    iterator.next().await.expect("first round should succeed");
    let first_round = iterator.project().cloned().expect("project after first round");
    drain(&mut iterator).await;

    assert_eq!(iterator.rounds(), 3);
    assert!(!iterator.has_next());
    let project = iterator.into_project();
    assert!(project.issues.len() <= target);
    let issue_ids: Vec<&str> = project.issues.iter().map(|issue| issue.id.as_str()).collect();
    assert_eq!(issue_ids, vec!["I_0", "I_1", "I_2", "I_3"]);
    for issue in &project.issues {
        assert!(
            issue.comments.len() <= target,
            "{} holds {} comments",
            issue.id,
            issue.comments.len()
        );
    }
    for earlier in &first_round.issues {
        let later = project.issue(&earlier.id).expect("earlier issue kept");
        assert_eq!(
            later.comments.get(..earlier.comments.len()),
            Some(earlier.comments.as_slice()),
            "earlier comments of {} keep their order",
            earlier.id
        );
    }
    assert_eq!(project.issue("I_0").map(|issue| issue.comments.len()), Some(150));
    assert_eq!(project.issue("I_2").map(|issue| issue.comments.len()), Some(150));
    assert_eq!(project.issue("I_3").map(|issue| issue.comments.len()), Some(3));
}

#[tokio::test]
async fn transport_failure_on_first_round_keeps_iterator_fresh() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, _| true,
        Err(MiningError::Network {
            message: "connection reset".to_owned(),
        }),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 5));
    let error = iterator.next().await.expect_err("transport should fail");

    assert!(matches!(error, MiningError::Network { .. }), "got {error:?}");
    assert!(iterator.project().is_none());
    assert_eq!(iterator.fetched_elements(), 0);
    assert!(iterator.has_next());
}

#[tokio::test]
async fn disabled_streams_are_never_selected() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, variables| {
            !variables.fetch_commits && variables.commits_first == 0 && variables.fetch_issues
        },
        Ok(envelope(&json!({
            "issues": connection(
                vec![issue_node("I_0", 1, connection(Vec::new(), None, false))],
                Some("i0"),
                false,
            )
        }))),
    );

    let request = MiningRequest::new("octo", "repo", 20).with_commits(false);
    let mut iterator = ProjectIterator::new(&transport, request);
    drain(&mut iterator).await;

    let project = iterator.into_project();
    assert!(project.commits.is_empty());
    assert!(project.commits_page.is_exhausted());
    assert_eq!(project.issues.len(), 1);
}

#[tokio::test]
async fn next_after_completion_reports_finished_without_sending() {
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        |_, _| true,
        Ok(envelope(&json!({ "defaultBranchRef": no_commits(), "issues": no_issues() }))),
    );

    let mut iterator = ProjectIterator::new(&transport, MiningRequest::new("octo", "repo", 5));
    iterator.next().await.expect("round should succeed");
    let snapshot = iterator.project().cloned();

    for _ in 0..2 {
        assert!(!iterator.has_next());
        let error = iterator.next().await.expect_err("iteration is finished");
        assert_eq!(error, MiningError::IterationFinished);
    }
    assert_eq!(iterator.project().cloned(), snapshot);
}

#[tokio::test]
async fn since_bounds_are_forwarded_as_variables() {
    let since = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&chrono::Utc);
    let mut transport = MockQueryTransport::new();
    let mut sequence = Sequence::new();
    expect_round(
        &mut transport,
        &mut sequence,
        move |_, variables| {
            variables.commits_since == Some(since) && variables.issues_since == Some(since)
        },
        Ok(envelope(&json!({ "defaultBranchRef": no_commits(), "issues": no_issues() }))),
    );

    let request = MiningRequest::new("octo", "repo", 5)
        .with_commits_since(Some(since))
        .with_issues_since(Some(since));
    let mut iterator = ProjectIterator::new(&transport, request);

    iterator.next().await.expect("round should succeed");
}
