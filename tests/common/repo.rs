use std::path::Path;

use assert_fs::TempDir;
use fake::Fake;
use fake::faker::lorem::en::Paragraph;
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use rstest::fixture;

/// Fixed base timestamp so listing order never depends on the clock.
pub const BASE_TIME: i64 = 1_700_000_000;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// `main` with one commit and `feature` with one newer commit; `main`
/// checked out. Sorted listing order: `feature`, then `main`.
#[fixture]
pub fn seeded_repository(repository_dir: TempDir) -> TempDir {
    let repo = init_repository(repository_dir.path());
    commit_file(
        &repo,
        "README.md",
        &throwaway_content(),
        "Initial commit",
        BASE_TIME,
    );
    create_branch(&repo, "feature");
    checkout_branch(&repo, "feature");
    commit_file(
        &repo,
        "feature.txt",
        &throwaway_content(),
        "Start feature work",
        BASE_TIME + 60,
    );
    checkout_branch(&repo, "main");
    repository_dir
}

/// [`seeded_repository`] plus an `origin` remote carrying a `topic`
/// branch newer than everything local.
#[fixture]
pub fn seeded_repository_with_remote(seeded_repository: TempDir) -> TempDir {
    let repo = open_repository(seeded_repository.path());
    seed_remote_branch(&repo, "topic", "Remote topic work", BASE_TIME + 120);
    seeded_repository
}

/// A repository with no commits whose unborn HEAD points at `main`,
/// while `origin/main` already exists, as after `git init` followed by
/// a fetch.
#[fixture]
pub fn unborn_repository_with_remote(repository_dir: TempDir) -> TempDir {
    let repo = init_repository(repository_dir.path());
    seed_remote_branch(&repo, "main", "Remote main work", BASE_TIME);
    repository_dir
}

pub fn init_repository(dir: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(dir, &opts).expect("Failed to init repository")
}

pub fn open_repository(dir: &Path) -> Repository {
    Repository::open(dir).expect("Failed to open repository")
}

pub fn signature(at: i64) -> Signature<'static> {
    Signature::new("fake_user", "fake_email@email.com", &Time::new(at, 0))
        .expect("Failed to build signature")
}

/// Writes `file` in the working tree, stages it, and commits it on the
/// current HEAD branch with a fixed author time.
pub fn commit_file(repo: &Repository, file: &str, content: &str, message: &str, at: i64) -> Oid {
    let workdir = repo.workdir().expect("Repository has no workdir");
    std::fs::write(workdir.join(file), content).expect("Failed to write file");

    let mut index = repo.index().expect("Failed to open index");
    index.add_path(Path::new(file)).expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");

    let sig = signature(at);
    let parent = repo
        .head()
        .ok()
        .map(|head| head.peel_to_commit().expect("Failed to peel HEAD"));
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Failed to commit")
}

pub fn create_branch(repo: &Repository, name: &str) {
    let head = repo
        .head()
        .expect("Failed to read HEAD")
        .peel_to_commit()
        .expect("Failed to peel HEAD");
    repo.branch(name, &head, false).expect("Failed to create branch");
}

pub fn checkout_branch(repo: &Repository, name: &str) {
    let refname = format!("refs/heads/{name}");
    let target = repo.revparse_single(&refname).expect("Failed to resolve branch");
    repo.checkout_tree(&target, None).expect("Failed to checkout tree");
    repo.set_head(&refname).expect("Failed to move HEAD");
}

/// Creates `origin/<name>` pointing at a fresh commit on top of HEAD
/// (or a root commit when HEAD is unborn), without touching the
/// network. The `origin` remote is registered so upstream
/// configuration resolves against its refspec.
pub fn seed_remote_branch(repo: &Repository, name: &str, message: &str, at: i64) {
    if repo.find_remote("origin").is_err() {
        repo.remote("origin", "https://example.com/origin.git")
            .expect("Failed to add origin remote");
    }
    let parent = repo
        .head()
        .ok()
        .map(|head| head.peel_to_commit().expect("Failed to peel HEAD"));
    let tree_id = match &parent {
        Some(commit) => commit.tree_id(),
        None => repo
            .index()
            .expect("Failed to open index")
            .write_tree()
            .expect("Failed to write tree"),
    };
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let sig = signature(at);
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    let tip = repo
        .commit(None, &sig, &sig, message, &tree, &parents)
        .expect("Failed to create remote tip commit");
    repo.reference(
        &format!("refs/remotes/origin/{name}"),
        tip,
        true,
        "seed remote branch",
    )
    .expect("Failed to create remote-tracking ref");
}

/// Creates the `origin/HEAD` alias ref pointing at `origin/<target>`.
pub fn seed_remote_head(repo: &Repository, target: &str) {
    repo.reference_symbolic(
        "refs/remotes/origin/HEAD",
        &format!("refs/remotes/origin/{target}"),
        true,
        "seed remote HEAD",
    )
    .expect("Failed to create remote HEAD ref");
}

fn throwaway_content() -> String {
    Paragraph(1..3).fake::<String>()
}
