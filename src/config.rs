//! Harness configuration, resolved once at start and passed down explicitly.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

/// Environment variable that overrides the target command.
pub const COMMAND_ENV: &str = "JET_TEST_EXE";

/// Command used when nothing overrides it.
pub const DEFAULT_COMMAND: &str = "jet";

/// File extension of fixtures.
pub const FIXTURE_EXTENSION: &str = "jet";

/// Suites of the reference deployment, each read from a same-named directory.
pub const DEFAULT_SUITES: [&str; 4] = ["atoms", "let", "functions", "forms"];

/// How the target executable is invoked for every fixture.
///
/// The full command line is `<program> <leading_args>... <fixture> <extra_args>...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub program: PathBuf,
    pub leading_args: Vec<OsString>,
    pub extra_args: Vec<OsString>,
    pub timeout: Option<Duration>,
    pub fail_on_nonzero_exit: bool,
}

impl HarnessConfig {
    /// Builds a config from a whitespace-separated command string such as `valgrind -q jet`.
    ///
    /// An empty string leaves `program` empty; spawning then fails with
    /// [`ExecutionError::EmptyCommand`](crate::ExecutionError::EmptyCommand).
    pub fn from_command(command: &str) -> Self {
        let mut words = command.split_whitespace();
        let program = words.next().map(PathBuf::from).unwrap_or_default();
        Self {
            program,
            leading_args: words.map(OsString::from).collect(),
            extra_args: Vec::new(),
            timeout: None,
            fail_on_nonzero_exit: false,
        }
    }

    /// Resolves the command from an explicit override, then `JET_TEST_EXE`, then `jet`.
    pub fn resolve(explicit: Option<&str>) -> Self {
        let from_env = env::var(COMMAND_ENV).ok();
        let command = pick_command(explicit, from_env.as_deref());
        debug!(command, "resolved target command");
        Self::from_command(command).with_program_lookup()
    }

    /// Replaces a bare program name with its location on `PATH`, when there is one.
    pub fn with_program_lookup(mut self) -> Self {
        if self.program.as_os_str().is_empty() {
            return self;
        }
        match which::which(&self.program) {
            Ok(found) => self.program = found,
            Err(err) => warn!(
                program = %self.program.display(),
                "target executable not found ({err}); tests will fail to spawn it"
            ),
        }
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fail_on_nonzero_exit(mut self, enabled: bool) -> Self {
        self.fail_on_nonzero_exit = enabled;
        self
    }

    /// Human-readable program name for messages.
    pub fn program_label(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::from_command(DEFAULT_COMMAND)
    }
}

fn pick_command<'a>(explicit: Option<&'a str>, from_env: Option<&'a str>) -> &'a str {
    explicit
        .filter(|c| !c.trim().is_empty())
        .or(from_env.filter(|c| !c.trim().is_empty()))
        .unwrap_or(DEFAULT_COMMAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_string_splits_into_program_and_leading_args() {
        let config = HarnessConfig::from_command("valgrind -q  jet");
        assert_eq!(config.program, PathBuf::from("valgrind"));
        assert_eq!(
            config.leading_args,
            vec![OsString::from("-q"), OsString::from("jet")]
        );
        assert!(config.extra_args.is_empty());
        assert_eq!(config.timeout, None);
        assert!(!config.fail_on_nonzero_exit);
    }

    #[test]
    fn empty_command_has_no_program() {
        let config = HarnessConfig::from_command("   ");
        assert!(config.program.as_os_str().is_empty());
        assert!(config.leading_args.is_empty());
    }

    #[test]
    fn explicit_beats_env_beats_default() {
        assert_eq!(pick_command(Some("a"), Some("b")), "a");
        assert_eq!(pick_command(None, Some("b")), "b");
        assert_eq!(pick_command(Some(" "), Some("b")), "b");
        assert_eq!(pick_command(None, Some("")), DEFAULT_COMMAND);
        assert_eq!(pick_command(None, None), DEFAULT_COMMAND);
    }

    #[test]
    fn builders_set_fields() {
        let config = HarnessConfig::default()
            .with_extra_args(["--stdlib-path", "lib"])
            .with_timeout(Some(Duration::from_millis(250)))
            .with_fail_on_nonzero_exit(true);
        assert_eq!(config.program, PathBuf::from("jet"));
        assert_eq!(config.extra_args.len(), 2);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert!(config.fail_on_nonzero_exit);
    }

    #[test]
    fn lookup_keeps_unknown_program_verbatim() {
        let config = HarnessConfig::from_command("definitely-not-a-real-jet-binary-42")
            .with_program_lookup();
        assert_eq!(
            config.program,
            PathBuf::from("definitely-not-a-real-jet-binary-42")
        );
    }
}
