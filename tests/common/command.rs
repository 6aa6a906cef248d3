use std::path::Path;

use assert_cmd::Command;

/// Builds an invocation of the sprig binary with the pager disabled,
/// ready for further `assert_cmd` chaining.
pub fn run_sprig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("sprig").expect("Failed to find sprig binary");
    cmd.envs(vec![("NO_PAGER", "1")]);
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}
