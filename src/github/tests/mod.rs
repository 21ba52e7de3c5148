//! Unit tests for repository locators and access tokens.

use rstest::rstest;

use super::{MiningError, MiningRequest, PersonalAccessToken, RepositoryLocator};

#[rstest]
fn parses_repository_url() {
    let locator = RepositoryLocator::parse("https://github.com/octo/repo")
        .expect("should parse repository URL");
    assert_eq!(locator.owner().as_str(), "octo", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "repo", "repository mismatch");
    assert_eq!(
        locator.api_base().as_str(),
        "https://api.github.com/",
        "api base mismatch"
    );
}

#[rstest]
#[case::trailing_path("https://github.com/octo/repo/issues")]
#[case::git_suffix("https://github.com/octo/repo.git")]
fn ignores_trailing_decoration(#[case] input: &str) {
    let locator = RepositoryLocator::parse(input).expect("should parse repository URL");
    assert_eq!(locator.owner().as_str(), "octo", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "repo", "repository mismatch");
}

#[rstest]
#[case::enterprise("https://ghe.example.com/foo/bar", "https://ghe.example.com/api")]
#[case::enterprise_with_port(
    "https://ghe.example.com:8443/foo/bar",
    "https://ghe.example.com:8443/api"
)]
fn derives_enterprise_graphql_base(#[case] input: &str, #[case] expected: &str) {
    let locator = RepositoryLocator::parse(input).expect("should parse enterprise URL");
    assert_eq!(
        locator.api_base().as_str(),
        expected,
        "enterprise api base mismatch"
    );
}

#[rstest]
#[case::no_repository("https://github.com/octo")]
#[case::empty_repository("https://github.com/octo/")]
fn rejects_incomplete_paths(#[case] input: &str) {
    let result = RepositoryLocator::parse(input);
    assert!(
        matches!(result, Err(MiningError::MissingPathSegments)),
        "expected MissingPathSegments, got {result:?}"
    );
}

#[rstest]
fn rejects_unparseable_url() {
    let result = RepositoryLocator::parse("not a url");
    assert!(
        matches!(result, Err(MiningError::InvalidUrl(_))),
        "expected InvalidUrl, got {result:?}"
    );
}

#[rstest]
fn from_owner_repo_defaults_to_github() {
    let locator =
        RepositoryLocator::from_owner_repo("octo", "repo").expect("should create locator");
    assert_eq!(locator.owner().as_str(), "octo", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "repo", "repository mismatch");
    assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
}

#[rstest]
#[case::empty_owner("", "repo")]
#[case::empty_repo("octo", "")]
fn rejects_empty_segment(#[case] owner: &str, #[case] repo: &str) {
    let result = RepositoryLocator::from_owner_repo(owner, repo);
    assert!(
        matches!(result, Err(MiningError::MissingPathSegments)),
        "expected MissingPathSegments, got {result:?}"
    );
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn rejects_missing_token(#[case] token: &str) {
    let result = PersonalAccessToken::new(token);
    assert!(
        matches!(result, Err(MiningError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn token_is_trimmed() {
    let token = PersonalAccessToken::new("  ghp_example \n").expect("token should be valid");
    assert_eq!(token.value(), "ghp_example");
}

#[rstest]
fn request_for_locator_uses_owner_and_name() {
    let locator = RepositoryLocator::parse("https://github.com/octo/repo")
        .expect("should parse repository URL");

    let request = MiningRequest::for_locator(&locator, 7);

    assert_eq!(request.owner, "octo");
    assert_eq!(request.name, "repo");
    assert_eq!(request.target, 7);
    assert!(request.include_commits && request.include_issues);
}
