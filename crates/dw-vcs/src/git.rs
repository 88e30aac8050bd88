//! [`VcsCommandRunner`] backed by the `git` executable.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{VcsCommandRunner, VcsError};

/// Runs git as a subprocess.
///
/// Every invocation is blocking. Interactive credential prompts are disabled
/// so an unreachable or private remote fails instead of hanging.
#[derive(Debug, Clone)]
pub struct GitCommandRunner {
    binary: PathBuf,
}

impl Default for GitCommandRunner {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCommandRunner {
    /// Create a runner using the given git executable.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run git with `args`, optionally inside `dir`, returning stdout.
    fn run<I, S>(&self, dir: Option<&Path>, args: I) -> Result<String, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        let command = self.describe(&args);

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %command, dir = ?dir, "running git");

        let output = cmd.output().map_err(|source| VcsError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(VcsError::ProcessFailed {
                command,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn describe(&self, args: &[OsString]) -> String {
        let mut parts = vec![self.binary.to_string_lossy().into_owned()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

impl VcsCommandRunner for GitCommandRunner {
    fn clone_repository(
        &self,
        source: &str,
        branch: &str,
        working_directory: &Path,
    ) -> Result<(), VcsError> {
        self.run(
            None,
            [
                OsStr::new("clone"),
                OsStr::new("--branch"),
                OsStr::new(branch),
                OsStr::new(source),
                working_directory.as_os_str(),
            ],
        )?;
        Ok(())
    }

    fn pull(&self, working_directory: &Path) -> Result<(), VcsError> {
        self.run(Some(working_directory), ["pull", "--ff-only", "--tags"])?;
        Ok(())
    }

    fn tags(&self, working_directory: &Path) -> Result<Vec<String>, VcsError> {
        let stdout = self.run(Some(working_directory), ["tag", "--list"])?;
        Ok(parse_tag_list(&stdout))
    }

    fn export(
        &self,
        working_directory: &Path,
        reference: &str,
        target_directory: &Path,
    ) -> Result<(), VcsError> {
        // Forget worktrees whose directories were deleted by hand, otherwise
        // re-adding the same path is refused.
        self.run(Some(working_directory), ["worktree", "prune"])?;
        self.run(
            Some(working_directory),
            [
                OsStr::new("worktree"),
                OsStr::new("add"),
                OsStr::new("--detach"),
                target_directory.as_os_str(),
                OsStr::new(reference),
            ],
        )?;
        Ok(())
    }
}

/// Split `git tag --list` output into names, keeping order.
fn parse_tag_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=DW", "-c", "user.email=dw@example.com"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(status.status.success(), "git {args:?} failed: {status:?}");
    }

    /// Create an upstream repository on branch `master` with the given tags.
    fn upstream(tmp: &TempDir, tags: &[&str]) -> PathBuf {
        let dir = tmp.path().join("upstream");
        fs::create_dir_all(&dir).unwrap();
        git(&dir, &["init", "--quiet", "--initial-branch=master"]);
        fs::write(dir.join("documentation.md"), "# Docs\n").unwrap();
        git(&dir, &["add", "."]);
        git(&dir, &["commit", "--quiet", "-m", "initial"]);
        for tag in tags {
            git(&dir, &["tag", tag]);
        }
        dir
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(
            parse_tag_list("v1.0\n\nv2.0\n  v10.0  \n"),
            vec!["v1.0", "v2.0", "v10.0"]
        );
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn test_describe_command() {
        let runner = GitCommandRunner::new("/usr/bin/git");
        let args = vec![OsString::from("tag"), OsString::from("--list")];
        assert_eq!(runner.describe(&args), "/usr/bin/git tag --list");
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let runner = GitCommandRunner::new("/nonexistent/git-binary");
        let err = runner.pull(tmp.path()).unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }));
    }

    #[test]
    fn test_tags_outside_repository_is_process_failure() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let err = GitCommandRunner::default().tags(tmp.path()).unwrap_err();
        assert!(err.is_process_failure(), "unexpected error: {err}");
    }

    #[test]
    fn test_clone_tags_and_export() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let source = upstream(&tmp, &["v1.0", "v2.0"]);
        let runner = GitCommandRunner::default();
        let working = tmp.path().join("product/.repository");

        runner
            .clone_repository(&source.to_string_lossy(), "master", &working)
            .unwrap();
        assert!(working.join(".git").exists());

        let tags = runner.tags(&working).unwrap();
        assert_eq!(tags, vec!["v1.0", "v2.0"]);

        let target = tmp.path().join("product/v1.0");
        runner.export(&working, "v1.0", &target).unwrap();
        assert_eq!(
            fs::read_to_string(target.join("documentation.md")).unwrap(),
            "# Docs\n"
        );
    }

    #[test]
    fn test_clone_unknown_branch_fails() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let source = upstream(&tmp, &[]);
        let err = GitCommandRunner::default()
            .clone_repository(
                &source.to_string_lossy(),
                "does-not-exist",
                &tmp.path().join("clone"),
            )
            .unwrap_err();
        assert!(err.is_process_failure());
    }

    #[test]
    fn test_pull_picks_up_new_tags() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let source = upstream(&tmp, &["v1.0"]);
        let runner = GitCommandRunner::default();
        let working = tmp.path().join("clone");
        runner
            .clone_repository(&source.to_string_lossy(), "master", &working)
            .unwrap();

        fs::write(source.join("changelog.md"), "# Changes\n").unwrap();
        git(&source, &["add", "."]);
        git(&source, &["commit", "--quiet", "-m", "changes"]);
        git(&source, &["tag", "v1.1"]);

        runner.pull(&working).unwrap();

        assert_eq!(runner.tags(&working).unwrap(), vec!["v1.0", "v1.1"]);
        assert!(working.join("changelog.md").exists());
    }
}
