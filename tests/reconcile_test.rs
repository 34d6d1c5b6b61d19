//! Reconciliation behaviour through the public library API.

use std::path::Path;
use std::time::Duration;

use provisioner::catalog::loader::parse_catalog;
use provisioner::catalog::catalog_entries;
use provisioner::provider::{MockCall, MockProvider, RetryProvider};
use provisioner::reconciler::{
    is_noop, plan, reconcile, Action, CatalogEntry, FailureKind, OutcomeKind, Reconciler,
};
use provisioner::version::VersionSpec;

fn v(s: &str) -> VersionSpec {
    VersionSpec::parse(s).unwrap()
}

fn entry(name: &str, min: &str) -> CatalogEntry {
    CatalogEntry::new(name, v(min))
}

#[test]
fn one_record_per_entry_in_catalog_order() {
    let provider = MockProvider::new()
        .with_installed("b", "1.0")
        .fail_query("c")
        .fail_install("d");
    let catalog = vec![
        entry("a", "1.0"),
        entry("b", "2.0"),
        entry("c", "1.0"),
        entry("d", "1.0"),
        entry("e", "0.1"),
    ];

    let report = reconcile(&catalog, false, &provider);

    let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(report.counts().total(), 5);
    assert_eq!(report.counts().failed, 2);
    assert!(report.has_failures());
}

#[test]
fn failures_are_tagged_and_do_not_stop_the_run() {
    let provider = MockProvider::new().fail_query("broken").fail_install("flaky");
    let catalog = vec![entry("broken", "1.0"), entry("flaky", "1.0"), entry("jq", "1.6")];

    let report = reconcile(&catalog, false, &provider);

    assert_eq!(report.records[0].failure, Some(FailureKind::Query));
    assert!(report.records[0].action.is_none());
    assert_eq!(report.records[1].failure, Some(FailureKind::Install));
    assert_eq!(report.records[2].kind, OutcomeKind::Success);
    assert_eq!(provider.installed("jq"), Some(v("1.6")));
}

#[test]
fn satisfied_catalog_makes_no_mutating_calls() {
    let provider = MockProvider::new()
        .with_installed("git", "2.40.1")
        .with_installed("node", "20.11");
    let catalog = vec![entry("git", "2.30"), entry("node", "20")];

    let report = reconcile(&catalog, false, &provider);

    assert!(report
        .records
        .iter()
        .all(|r| r.kind == OutcomeKind::Skipped));
    assert!(provider.mutating_calls().is_empty());
}

#[test]
fn forced_run_uninstalls_before_installing() {
    let provider = MockProvider::new().with_installed("git", "2.40");
    let catalog = vec![entry("git", "2.30")];

    let report = Reconciler::new(&provider)
        .force_reinstall(true)
        .reconcile(&catalog);

    assert!(report.force_reinstall);
    assert_eq!(report.records[0].action, Some(Action::Reinstall));
    assert_eq!(report.records[0].kind, OutcomeKind::Success);
    assert_eq!(
        provider.mutating_calls(),
        vec![
            MockCall::Uninstall("git".to_string()),
            MockCall::Install("git".to_string(), v("2.30")),
        ]
    );
}

#[test]
fn second_run_is_a_noop() {
    let provider = MockProvider::new()
        .with_installed("node", "18.2")
        .with_latest("node", "20.11");
    let catalog = vec![entry("node", "20"), entry("jq", "1.6")];

    let first = reconcile(&catalog, false, &provider);
    assert_eq!(first.counts().updated, 1);
    assert_eq!(first.counts().success, 1);

    let second = reconcile(&catalog, false, &provider);
    assert_eq!(second.counts().skipped, 2);
    assert!(is_noop(&plan(&catalog, false, &provider)));
}

#[test]
fn retry_recovers_transient_install_failure() {
    let mock = MockProvider::new().fail_install_times("jq", 1);
    let provider = RetryProvider::new(mock.clone(), 2, Duration::ZERO);

    let report = reconcile(&[entry("jq", "1.6")], false, &provider);

    assert_eq!(report.records[0].kind, OutcomeKind::Success);
    assert_eq!(mock.installed("jq"), Some(v("1.6")));
}

#[test]
fn catalog_file_feeds_the_reconciler() {
    let config = parse_catalog(
        r#"
backends:
  - name: mock
    query: "true"
    install: "true"
    upgrade: "true"
    uninstall: "true"
packages:
  - name: git
    min_version: "2.30"
  - name: node
    min_version: 20
"#,
        Path::new("catalog.yml"),
    )
    .unwrap();
    let entries = catalog_entries(&config).unwrap();
    assert_eq!(entries, vec![entry("git", "2.30"), entry("node", "20")]);

    let provider = MockProvider::new().with_installed("git", "2.29");
    let report = reconcile(&entries, false, &provider);

    assert_eq!(report.records[0].kind, OutcomeKind::Updated);
    assert_eq!(report.records[1].kind, OutcomeKind::Success);
}
