//! Orchestration of the browse, inspect, and switch flow.

use std::io::Write;
use std::path::PathBuf;

use derive_new::new;

use crate::branch::BranchInfo;
use crate::repo::GitRepo;
use crate::ui::{self, Prompter};

/// Runtime options resolved from the command line.
#[derive(Debug, Clone, new)]
pub struct Options {
    pub include_remote: bool,
    pub skip_confirm: bool,
    pub path: PathBuf,
}

/// Drives one session: resolve repository, list, select, inspect,
/// confirm, switch. Holds the output sink and the prompt source so
/// tests can script both.
#[derive(new)]
pub struct App<P: Prompter> {
    prompter: P,
    out: Box<dyn Write>,
    interactive: bool,
    use_pager: bool,
}

impl<P: Prompter> App<P> {
    pub fn run(&mut self, options: &Options) -> anyhow::Result<()> {
        let repo = GitRepo::discover(&options.path)?;
        let current_branch = repo.current_branch()?;
        let branches = repo.list_branches(options.include_remote)?;

        ui::render_branch_table(&mut self.out, &branches, &current_branch)?;

        // Without a terminal the listing is all we can offer.
        if !self.interactive {
            return Ok(());
        }

        writeln!(self.out)?;
        let Some(index) = self.prompter.select_branch(&branches, &current_branch)? else {
            ui::show_info(&mut self.out, "Cancelled by user.")?;
            return Ok(());
        };
        let branch = &branches[index];

        self.show_details(&repo, branch)?;

        if branch.is_current(&current_branch) {
            ui::show_info(&mut self.out, &format!("Already on '{current_branch}'"))?;
            return Ok(());
        }

        ui::show_checkout_command(&mut self.out, branch)?;
        if !options.skip_confirm && !self.prompter.confirm_checkout(&branch.name)? {
            ui::show_info(&mut self.out, "Branch switch cancelled.")?;
            return Ok(());
        }

        repo.checkout(branch)?;
        ui::show_success(
            &mut self.out,
            &format!("Switched to branch '{}'", branch.short_name()),
        )?;
        Ok(())
    }

    /// A failed diff fetch downgrades to a warning; the metadata screen
    /// still renders.
    fn show_details(&mut self, repo: &GitRepo, branch: &BranchInfo) -> anyhow::Result<()> {
        let diff = match repo.commit_diff(&branch.commit_hash) {
            Ok(diff) => Some(diff),
            Err(err) => {
                ui::show_warning(&mut self.out, &format!("Could not get diff: {err}"))?;
                None
            }
        };
        if self.use_pager {
            ui::page_screen(|out| ui::render_commit_details(out, branch, diff.as_deref()))
        } else {
            ui::render_commit_details(&mut self.out, branch, diff.as_deref())?;
            Ok(())
        }
    }
}
