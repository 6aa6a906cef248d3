use std::path::PathBuf;

use clap::Parser;
use is_terminal::IsTerminal;
use sprig::app::{App, Options};
use sprig::error::Error;
use sprig::ui::{self, TermPrompter};

#[derive(Parser)]
#[command(
    name = "sprig",
    version = "0.1.0",
    about = "Interactive git branch explorer and switcher",
    long_about = "Lists the repository's branches sorted by most recent commit, \
    shows the latest commit and its diff for a selected branch, \
    and optionally checks the branch out.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short, long, help = "Include remote-tracking branches in the listing")]
    remote: bool,
    #[arg(short, long, help = "Skip the confirmation prompt when switching")]
    switch: bool,
    #[arg(short, long, default_value = ".", help = "Repository path to search from")]
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let options = Options::new(cli.remote, cli.switch, cli.path);

    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let use_pager = interactive && std::env::var_os("NO_PAGER").is_none();
    let mut app = App::new(
        TermPrompter::new(),
        Box::new(std::io::stdout()),
        interactive,
        use_pager,
    );

    if let Err(err) = app.run(&options) {
        std::process::exit(report(&err));
    }
}

/// One line on stderr per failure, plus the exit code for the class.
fn report(err: &anyhow::Error) -> i32 {
    let mut stderr = std::io::stderr();
    match err.downcast_ref::<Error>() {
        Some(domain) => {
            let _ = ui::show_error(&mut stderr, &domain.to_string());
            if matches!(domain, Error::RepositoryNotFound { .. }) {
                let _ = ui::show_info(
                    &mut stderr,
                    "Make sure you're in a git repository or provide a valid path with --path",
                );
            }
            domain.exit_code()
        }
        None => {
            let _ = ui::show_error(&mut stderr, &format!("Unexpected error: {err:#}"));
            1
        }
    }
}
