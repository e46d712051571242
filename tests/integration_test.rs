use std::fs;
use std::path::Path;
use std::process::Command;

use git2::{Oid, Repository};
use semver::Version;
use serial_test::serial;
use tempfile::TempDir;

use mono_release::cli::orchestration;
use mono_release::config::Config;
use mono_release::domain::TagPattern;
use mono_release::git::{Git2History, History};
use mono_release::ledger::TagLedger;
use mono_release::workspace::{PackageGraph, PackageManifest};

fn init_repo() -> TempDir {
    let dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(dir.path()).expect("Could not init git repo");

    let mut config = repo.config().expect("Could not get config");
    config
        .set_str("user.name", "Test User")
        .expect("Could not set user.name");
    config
        .set_str("user.email", "test@example.com")
        .expect("Could not set user.email");

    dir
}

fn commit_file(dir: &TempDir, rel_path: &str, content: &str, message: &str) -> Oid {
    let repo = Repository::open(dir.path()).unwrap();
    let full_path = dir.path().join(rel_path);
    fs::create_dir_all(full_path.parent().unwrap()).unwrap();
    fs::write(&full_path, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(rel_path)).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = repo.signature().unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

/// Check out a new branch at the given commit. Returns the name of the
/// branch that was checked out before.
fn switch_to_new_branch(dir: &TempDir, name: &str, at: Oid) -> String {
    let repo = Repository::open(dir.path()).unwrap();
    let previous = repo.head().unwrap().shorthand().unwrap().to_string();

    let commit = repo.find_commit(at).unwrap();
    repo.branch(name, &commit, false).unwrap();
    repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
        .unwrap();

    previous
}

fn switch_to_branch(dir: &TempDir, name: &str) {
    let repo = Repository::open(dir.path()).unwrap();
    repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
        .unwrap();
}

fn merge_into_head(dir: &TempDir, other: Oid, message: &str) -> Oid {
    let repo = Repository::open(dir.path()).unwrap();
    let ours = repo.head().unwrap().peel_to_commit().unwrap();
    let theirs = repo.find_commit(other).unwrap();

    let mut index = repo.merge_commits(&ours, &theirs, None).unwrap();
    assert!(!index.has_conflicts());
    let tree_id = index.write_tree_to(&repo).unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = repo.signature().unwrap();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &[&ours, &theirs],
    )
    .unwrap()
}

fn tag(dir: &TempDir, name: &str, oid: Oid) {
    let repo = Repository::open(dir.path()).unwrap();
    let object = repo.find_object(oid, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap();
}

fn workspace_config() -> Config {
    let mut config = Config::default();
    config.workspace.packages = vec![
        PackageManifest {
            name: "core".to_string(),
            path: "packages/core".to_string(),
            dependencies: vec![],
        },
        PackageManifest {
            name: "api".to_string(),
            path: "packages/api".to_string(),
            dependencies: vec!["core".to_string()],
        },
    ];
    config
}

#[test]
fn test_list_commits_chronological_with_changed_paths() {
    let dir = init_repo();
    commit_file(&dir, "packages/core/lib.rs", "a", "feat(core): seed");
    commit_file(&dir, "packages/api/main.rs", "b", "feat(api): seed");

    let history = Git2History::open(dir.path()).unwrap();
    let entries = history.list_commits(None, None).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].raw_message.trim(), "feat(core): seed");
    assert_eq!(entries[0].changed_paths, vec!["packages/core/lib.rs"]);
    assert_eq!(entries[1].changed_paths, vec!["packages/api/main.rs"]);
}

#[test]
fn test_list_commits_path_filter_and_since() {
    let dir = init_repo();
    let first = commit_file(&dir, "packages/core/lib.rs", "a", "feat(core): one");
    commit_file(&dir, "packages/api/main.rs", "b", "feat(api): two");
    commit_file(&dir, "packages/core/lib.rs", "c", "fix(core): three");

    let history = Git2History::open(dir.path()).unwrap();

    let core_only = history.list_commits(Some("packages/core"), None).unwrap();
    assert_eq!(core_only.len(), 2);

    let since_first = history
        .list_commits(Some("packages/core"), Some(&first.to_string()))
        .unwrap();
    assert_eq!(since_first.len(), 1);
    assert_eq!(since_first[0].raw_message.trim(), "fix(core): three");

    // Short hashes resolve through revparse instead of being zero-padded
    // into an id that matches nothing.
    let since_short = history
        .list_commits(Some("packages/core"), Some(&first.to_string()[..7]))
        .unwrap();
    assert_eq!(since_short, since_first);

    assert!(history.list_commits(None, Some("no-such-ref")).is_err());
}

#[test]
fn test_since_range_keeps_merged_side_branch_commits() {
    let dir = init_repo();
    let base = commit_file(&dir, "README.md", "readme", "chore: init");
    let release = commit_file(&dir, "packages/core/lib.rs", "a", "feat(core): seed");

    // Side branch forked before the release, merged after it.
    let main = switch_to_new_branch(&dir, "topic", base);
    let side = commit_file(&dir, "packages/core/side.rs", "b", "feat(core): side work");
    switch_to_branch(&dir, &main);
    merge_into_head(&dir, side, "Merge branch 'topic'");

    let history = Git2History::open(dir.path()).unwrap();
    let entries = history
        .list_commits(Some("packages/core"), Some(&release.to_string()))
        .unwrap();

    // The unreleased side-branch commit is in the range, plus the merge
    // commit whose first-parent diff touches the package.
    let messages: Vec<&str> = entries.iter().map(|e| e.raw_message.trim()).collect();
    assert!(messages.contains(&"feat(core): side work"));
    assert_eq!(entries.len(), 2);
    // The already-released commit and the base stay excluded.
    assert!(!messages.contains(&"feat(core): seed"));
    assert!(!messages.contains(&"chore: init"));
}

#[test]
fn test_ledger_resolves_latest_tag_from_real_tags() {
    let dir = init_repo();
    let first = commit_file(&dir, "packages/core/lib.rs", "a", "feat(core): one");
    let second = commit_file(&dir, "packages/core/lib.rs", "b", "feat(core): two");
    tag(&dir, "core-v0.1.0", first);
    tag(&dir, "core-v0.2.0", second);
    tag(&dir, "unrelated-tag", second);

    let history = Git2History::open(dir.path()).unwrap();
    let ledger = TagLedger::new(&history, TagPattern::default());

    let latest = ledger.latest_tag("core").unwrap().unwrap();
    assert_eq!(latest.version, Version::new(0, 2, 0));
    assert_eq!(latest.commit_hash, second.to_string());
    assert!(ledger.latest_tag("api").unwrap().is_none());
}

#[test]
fn test_prepare_and_apply_against_real_repository() {
    let dir = init_repo();
    let seed = commit_file(&dir, "packages/core/lib.rs", "a", "feat(core): seed");
    tag(&dir, "core-v0.1.0", seed);
    tag(&dir, "api-v0.1.0", seed);
    commit_file(&dir, "packages/core/lib.rs", "b", "feat(core): resolver");

    let config = workspace_config();
    let graph = PackageGraph::build(config.workspace.packages.clone()).unwrap();
    let history = Git2History::open(dir.path()).unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

    let plan =
        orchestration::plan_releases(&history, &config, &graph, today, dir.path()).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].package, "core");
    assert_eq!(plan[0].next_version, Version::new(0, 2, 0));

    orchestration::stage_plan(&plan, dir.path()).unwrap();
    let changelog = fs::read_to_string(dir.path().join("packages/core/CHANGELOG.md")).unwrap();
    assert!(changelog.contains("## 0.2.0 (2024-05-10)"));
    assert!(changelog.contains("- **core**: resolver ("));

    let applied = orchestration::apply_plan(&history, dir.path()).unwrap();
    assert_eq!(applied.tags, vec!["core-v0.2.0"]);

    // The tag exists in the repository and points at the release commit
    let repo = Repository::open(dir.path()).unwrap();
    let reference = repo.find_reference("refs/tags/core-v0.2.0").unwrap();
    assert_eq!(
        reference.peel_to_commit().unwrap().id().to_string(),
        applied.commit_hash
    );

    // The release commit carries the staged changelog
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.id().to_string(), applied.commit_hash);
    assert!(head.message().unwrap().contains("chore(release): publish"));
}

#[test]
fn test_rerunning_prepare_is_idempotent_on_disk() {
    let dir = init_repo();
    commit_file(&dir, "packages/core/lib.rs", "a", "feat(core): seed");

    let config = workspace_config();
    let graph = PackageGraph::build(config.workspace.packages.clone()).unwrap();
    let history = Git2History::open(dir.path()).unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

    let plan =
        orchestration::plan_releases(&history, &config, &graph, today, dir.path()).unwrap();
    orchestration::stage_plan(&plan, dir.path()).unwrap();
    let first = fs::read_to_string(dir.path().join("packages/core/CHANGELOG.md")).unwrap();

    let plan =
        orchestration::plan_releases(&history, &config, &graph, today, dir.path()).unwrap();
    orchestration::stage_plan(&plan, dir.path()).unwrap();
    let second = fs::read_to_string(dir.path().join("packages/core/CHANGELOG.md")).unwrap();

    assert_eq!(first, second);
}

// Serialized: concurrent `cargo run` invocations contend on the target lock.
#[test]
#[serial]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "mono-release", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("mono-release"));
    assert!(stdout.contains("prepare"));
    assert!(stdout.contains("affected"));
}

// Serialized: concurrent `cargo run` invocations contend on the target lock.
#[test]
#[serial]
fn test_cli_check_without_inputs_fails() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "mono-release", "--", "check"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Nothing to check"));
}
