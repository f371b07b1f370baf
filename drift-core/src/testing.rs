//! Scripted [`VcsCommandPort`] for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::VcsCommandError;
use crate::vcs::VcsCommandPort;

type Response = Result<String, VcsCommandError>;

/// Replays canned responses keyed by command line and optionally by
/// repository. Unscripted commands fail with exit code 1.
#[derive(Default)]
pub(crate) struct ScriptedGit {
  responses: RefCell<HashMap<(Option<PathBuf>, String), VecDeque<Response>>>,
  calls: RefCell<Vec<(PathBuf, String)>>,
}

impl ScriptedGit {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Answer `command` with `stdout` in every repository.
  pub(crate) fn ok(self, command: &str, stdout: &str) -> Self {
    self.push(None, command, Ok(stdout.to_string()))
  }

  /// Fail `command` with `exit_code` in every repository.
  pub(crate) fn fail(self, command: &str, exit_code: i32, stderr: &str) -> Self {
    let err = failure(command, exit_code, stderr);
    self.push(None, command, Err(err))
  }

  /// Fail `command` only inside `repo`.
  pub(crate) fn fail_in(self, repo: &str, command: &str, exit_code: i32, stderr: &str) -> Self {
    let err = failure(command, exit_code, stderr);
    self.push(Some(PathBuf::from(repo)), command, Err(err))
  }

  fn push(self, repo: Option<PathBuf>, command: &str, response: Response) -> Self {
    self
      .responses
      .borrow_mut()
      .entry((repo, command.to_string()))
      .or_default()
      .push_back(response);
    self
  }

  /// Every command issued so far, in order.
  pub(crate) fn commands(&self) -> Vec<String> {
    self.calls.borrow().iter().map(|(_, command)| command.clone()).collect()
  }

  /// Commands issued inside `repo`, in order.
  pub(crate) fn commands_in(&self, repo: &str) -> Vec<String> {
    self
      .calls
      .borrow()
      .iter()
      .filter(|(dir, _)| dir == Path::new(repo))
      .map(|(_, command)| command.clone())
      .collect()
  }

  fn next_response(&self, dir: &Path, command: &str) -> Option<Response> {
    let mut responses = self.responses.borrow_mut();
    for key in [(Some(dir.to_path_buf()), command.to_string()), (None, command.to_string())] {
      if let Some(queue) = responses.get_mut(&key) {
        // The last scripted response repeats once the queue drains.
        let response = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
        if response.is_some() {
          return response;
        }
      }
    }
    None
  }
}

fn failure(command: &str, exit_code: i32, stderr: &str) -> VcsCommandError {
  VcsCommandError::NonZeroExit {
    command: command.to_string(),
    exit_code,
    stderr: stderr.to_string(),
  }
}

impl VcsCommandPort for ScriptedGit {
  async fn execute(&self, args: &[String], working_dir: &Path) -> Result<String, VcsCommandError> {
    let command = args.join(" ");
    self
      .calls
      .borrow_mut()
      .push((working_dir.to_path_buf(), command.clone()));

    self
      .next_response(working_dir, &command)
      .unwrap_or_else(|| Err(failure(&command, 1, "unscripted command")))
  }
}
