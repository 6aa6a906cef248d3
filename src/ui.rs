//! Terminal rendering and interactive prompts.
//!
//! Everything here writes through an injected `std::io::Write` sink, so
//! tests capture output without a terminal. No git logic lives in this
//! module.

use std::io::{self, Write};

use colored::Colorize;
use derive_new::new;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect};
use minus::Pager;

use crate::branch::{BranchInfo, REMOTE_TAG};

const MESSAGE_LIMIT: usize = 60;

/// Adapts the minus pager to `std::io::Write`.
///
/// The pager only accepts `&str`, so this wrapper decodes each buffer
/// and forwards it, letting rendering code stay generic over its sink.
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `render` against a fresh pager and blocks until the user quits
/// the paged view.
pub fn page_screen<F>(render: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let pager = Pager::new();
    let mut writer = PagerWriter::new(pager.clone());
    render(&mut writer)?;
    minus::page_all(pager)?;
    Ok(())
}

/// Prints the sorted branch table. The checked-out branch is starred
/// and highlighted; remote-tracking entries carry the remote tag.
pub fn render_branch_table(
    out: &mut dyn Write,
    branches: &[BranchInfo],
    current_branch: &str,
) -> io::Result<()> {
    let name_width = column_width(branches.iter().map(table_name), "Branch");
    let author_width = column_width(branches.iter().map(|b| b.author.clone()), "Author");

    writeln!(out, "{}", "Git Branches (sorted by latest commit)".bold())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}  {}  {}  {}  {}",
        format!("{:<name_width$}", "Branch").bold(),
        format!("{:<7}", "Commit").bold(),
        format!("{:<author_width$}", "Author").bold(),
        format!("{:<19}", "Date").bold(),
        "Message".bold(),
    )?;

    for branch in branches {
        let current = branch.is_current(current_branch);
        let marker = if current { "*".green().bold() } else { " ".normal() };
        let name = format!("{:<name_width$}", table_name(branch));
        let name = if current { name.green().bold() } else { name.cyan() };
        writeln!(
            out,
            "{marker} {name}  {commit}  {author}  {date}  {message}",
            commit = format!("{:<7}", branch.short_hash()).magenta(),
            author = format!("{:<author_width$}", branch.author),
            date = format!("{:<19}", branch.formatted_date()).yellow(),
            message = truncated(&branch.message),
        )?;
    }
    Ok(())
}

/// Prints the selected branch's commit metadata and, when available,
/// its diff. `None` means the diff could not be fetched and the caller
/// already reported it.
pub fn render_commit_details(
    out: &mut dyn Write,
    branch: &BranchInfo,
    diff: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "{} {}", "Branch:".cyan().bold(), branch.name)?;
    writeln!(out, "{} {}", "Commit:".cyan().bold(), branch.commit_hash)?;
    writeln!(out, "{} {}", "Author:".cyan().bold(), branch.author)?;
    writeln!(out, "{} {}", "Date:".cyan().bold(), branch.formatted_date())?;
    writeln!(out, "{} {}", "Message:".cyan().bold(), branch.message)?;
    let kind = if branch.is_remote { "Remote" } else { "Local" };
    writeln!(out, "{} {kind}", "Type:".cyan().bold())?;

    let Some(diff) = diff else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "{}", "Commit Diff:".yellow().bold())?;
    writeln!(out)?;
    if diff.trim().is_empty() {
        writeln!(out, "{}", "No changes in this commit".dimmed())?;
    } else {
        write_diff(out, diff)?;
    }
    Ok(())
}

/// Echoes the plain-git command equivalent to the pending switch.
pub fn show_checkout_command(out: &mut dyn Write, branch: &BranchInfo) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "To switch to this branch, run:".green().bold())?;
    if branch.is_remote {
        writeln!(out, "  git checkout -b {} {}", branch.short_name(), branch.name)
    } else {
        writeln!(out, "  git checkout {}", branch.name)
    }
}

pub fn show_error(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {message}", "✗".red().bold())
}

pub fn show_success(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {message}", "✓".green().bold())
}

pub fn show_warning(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {message}", "!".yellow().bold())
}

pub fn show_info(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.yellow())
}

/// User input source for the orchestrator. Production goes through
/// `dialoguer`; tests substitute scripted implementations.
pub trait Prompter {
    /// Returns the index of the chosen branch, or `None` when the user
    /// backs out of the prompt.
    fn select_branch(
        &self,
        branches: &[BranchInfo],
        current_branch: &str,
    ) -> anyhow::Result<Option<usize>>;

    /// Asks whether to switch to `branch_name`. Backing out counts as a
    /// decline.
    fn confirm_checkout(&self, branch_name: &str) -> anyhow::Result<bool>;
}

/// Terminal-backed [`Prompter`] using dialoguer's fuzzy selection.
pub struct TermPrompter {
    theme: ColorfulTheme,
}

impl TermPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn select_branch(
        &self,
        branches: &[BranchInfo],
        current_branch: &str,
    ) -> anyhow::Result<Option<usize>> {
        let labels: Vec<String> = branches
            .iter()
            .map(|branch| branch.display_label(current_branch))
            .collect();
        let choice = FuzzySelect::with_theme(&self.theme)
            .with_prompt("Select a branch to view details:")
            .items(&labels)
            .default(0)
            .interact_opt();
        flatten_interrupt(choice)
    }

    fn confirm_checkout(&self, branch_name: &str) -> anyhow::Result<bool> {
        let choice = Confirm::with_theme(&self.theme)
            .with_prompt(format!("Do you want to switch to '{branch_name}' now?"))
            .default(false)
            .interact_opt();
        Ok(flatten_interrupt(choice)?.unwrap_or(false))
    }
}

/// Ctrl-C inside a prompt means the user backed out, not a failure.
fn flatten_interrupt<T>(choice: dialoguer::Result<Option<T>>) -> anyhow::Result<Option<T>> {
    match choice {
        Ok(value) => Ok(value),
        Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn table_name(branch: &BranchInfo) -> String {
    if branch.is_remote {
        format!("{} {REMOTE_TAG}", branch.name)
    } else {
        branch.name.clone()
    }
}

fn truncated(message: &str) -> String {
    if message.chars().count() <= MESSAGE_LIMIT {
        message.to_string()
    } else {
        let cut: String = message.chars().take(MESSAGE_LIMIT).collect();
        format!("{cut}...")
    }
}

fn column_width(cells: impl Iterator<Item = String>, header: &str) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain([header.len()])
        .max()
        .unwrap_or(header.len())
}

/// Paint class of one patch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffLine {
    FileHeader,
    HunkHeader,
    Added,
    Removed,
    Context,
}

impl DiffLine {
    // "---"/"+++" also start removed and added content lines, so the
    // header markers only count between a file header and its first
    // hunk. `in_hunk` tracks that position across calls.
    fn classify(line: &str, in_hunk: &mut bool) -> Self {
        if line.starts_with("diff --git") {
            *in_hunk = false;
            return Self::FileHeader;
        }
        if line.starts_with("@@") {
            *in_hunk = true;
            return Self::HunkHeader;
        }
        if !*in_hunk && is_file_header(line) {
            Self::FileHeader
        } else if line.starts_with('+') {
            Self::Added
        } else if line.starts_with('-') {
            Self::Removed
        } else {
            Self::Context
        }
    }
}

fn write_diff(out: &mut dyn Write, patch: &str) -> io::Result<()> {
    let mut in_hunk = false;
    for line in patch.lines() {
        match DiffLine::classify(line, &mut in_hunk) {
            DiffLine::FileHeader => writeln!(out, "{}", line.bold())?,
            DiffLine::HunkHeader => writeln!(out, "{}", line.cyan())?,
            DiffLine::Added => writeln!(out, "{}", line.green())?,
            DiffLine::Removed => writeln!(out, "{}", line.red())?,
            DiffLine::Context => writeln!(out, "{line}")?,
        }
    }
    Ok(())
}

fn is_file_header(line: &str) -> bool {
    line.starts_with("index ")
        || line.starts_with("--- ")
        || line.starts_with("+++ ")
        || line.starts_with("new file mode")
        || line.starts_with("deleted file mode")
        || line.starts_with("old mode")
        || line.starts_with("new mode")
}
