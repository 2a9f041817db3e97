//! Creation of a single pipeline stage process.
//!
//! A stage's standard streams are decided entirely before the process exists:
//! first the pipe ends handed over by the orchestrator, then the stage's own
//! redirections, which replace a pipe end bound to the same stream. The parent
//! never rebinds its own descriptors; everything it opens is close-on-exec, so
//! the child ends up holding only its three standard streams.

use crate::command::{EXIT_FAILURE, EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND, ExitCode};
use crate::env::Environment;
use crate::external::find_command_path;
use crate::parser::{Redirect, RedirectKind, Stage};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, PipeReader, PipeWriter};
use std::process::{Child, Command, Stdio};

/// Mode for files created by output redirection.
#[cfg(unix)]
const CREATE_MODE: u32 = 0o644;

/// Pipe ends the orchestrator binds to a stage before its redirections apply.
///
/// `None` leaves the stream inherited from the shell. The ends are moved in, so
/// once the stage is launched (or fails to launch) the parent holds no copy.
#[derive(Debug, Default)]
pub struct StageWiring {
    pub stdin: Option<PipeReader>,
    pub stdout: Option<PipeWriter>,
}

/// Reasons a stage fails before its program starts running.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// A redirection target could not be opened.
    #[error("{target}: {source}")]
    Redirect {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Nothing is left to run once redirections are removed.
    #[error("empty command")]
    EmptyCommand,

    /// The program is not in the search path or does not exist.
    #[error("command not found")]
    NotFound,

    /// The program exists but may not be executed.
    #[error("permission denied")]
    NotExecutable,

    /// The OS refused to create or start the process.
    #[error("cannot execute: {0}")]
    Spawn(#[source] io::Error),
}

impl LaunchError {
    /// Exit status recorded for a stage that failed this way.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchError::Redirect { .. } | LaunchError::EmptyCommand => EXIT_FAILURE,
            LaunchError::NotExecutable | LaunchError::Spawn(_) => EXIT_NOT_EXECUTABLE,
            LaunchError::NotFound => EXIT_NOT_FOUND,
        }
    }
}

/// Launches one stage as a child process and returns its handle.
///
/// Streams are bound in this order: pipe ends from `wiring`, then input
/// redirection, then output redirection. A redirection displaces the pipe end
/// for the same stream, which is closed right away so the neighbouring stage
/// sees end of stream. Any failure leaves the other stages untouched; the
/// caller only gets the error to report.
pub fn launch(
    stage: &Stage,
    wiring: StageWiring,
    env: &Environment,
) -> Result<Child, LaunchError> {
    let mut stdin = wiring.stdin.map_or_else(Stdio::inherit, Stdio::from);
    let mut stdout = wiring.stdout.map_or_else(Stdio::inherit, Stdio::from);

    if let Some(redirect) = &stage.redirects.input {
        stdin = open_redirect(redirect, env)?.into();
    }
    if let Some(redirect) = &stage.redirects.output {
        stdout = open_redirect(redirect, env)?.into();
    }

    let program = stage.program().ok_or(LaunchError::EmptyCommand)?;
    let path = find_command_path(env.search_path.as_deref(), &env.current_dir, program)
        .ok_or(LaunchError::NotFound)?;

    let mut command = Command::new(&path);
    set_arg0(&mut command, program);
    command
        .args(stage.args())
        .current_dir(&env.current_dir)
        .stdin(stdin)
        .stdout(stdout);

    let child = command.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LaunchError::NotFound,
        io::ErrorKind::PermissionDenied => LaunchError::NotExecutable,
        _ => LaunchError::Spawn(e),
    })?;
    debug!(
        "launched {} as pid {} with args {:?}",
        path.display(),
        child.id(),
        stage.args()
    );
    Ok(child)
}

fn open_redirect(redirect: &Redirect, env: &Environment) -> Result<File, LaunchError> {
    let mut options = OpenOptions::new();
    match redirect.kind {
        RedirectKind::Input => options.read(true),
        RedirectKind::Output => options.write(true).create(true).truncate(true),
        RedirectKind::Append => options.append(true).create(true),
    };
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CREATE_MODE);
    }

    options
        .open(env.resolve(&redirect.target))
        .map_err(|source| LaunchError::Redirect {
            target: redirect.target.clone(),
            source,
        })
}

/// Keeps `argv[0]` as typed even though the resolved path is executed.
#[cfg(unix)]
fn set_arg0(command: &mut Command, program: &str) {
    use std::os::unix::process::CommandExt;
    command.arg0(program);
}

#[cfg(not(unix))]
fn set_arg0(_command: &mut Command, _program: &str) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stage;
    use crate::testutil::TempDir;
    use std::fs;
    use std::io::{Read, Write};

    #[test]
    fn test_output_redirect_writes_file() {
        let tmp = TempDir::new("launch_out");
        let env = tmp.env();

        let stage = parse_stage("echo hello world > out.txt");
        let mut child = launch(&stage, StageWiring::default(), &env).unwrap();
        assert!(child.wait().unwrap().success());

        assert_eq!(fs::read_to_string(tmp.path("out.txt")).unwrap(), "hello world\n");
    }

    #[test]
    fn test_truncate_and_append() {
        let tmp = TempDir::new("launch_append");
        let env = tmp.env();
        fs::write(tmp.path("log.txt"), "stale contents\n").unwrap();

        for line in ["echo one > log.txt", "echo two >> log.txt"] {
            let mut child = launch(&parse_stage(line), StageWiring::default(), &env).unwrap();
            child.wait().unwrap();
        }

        assert_eq!(fs::read_to_string(tmp.path("log.txt")).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_missing_input_fails_before_output_is_opened() {
        let tmp = TempDir::new("launch_missing");
        let env = tmp.env();

        let stage = parse_stage("cat < missing.txt > out.txt");
        let err = launch(&stage, StageWiring::default(), &env).unwrap_err();

        assert!(matches!(err, LaunchError::Redirect { ref target, .. } if target == "missing.txt"));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(err.to_string().starts_with("missing.txt: "));
        assert!(!tmp.path("out.txt").exists());
    }

    #[test]
    fn test_unknown_program_is_not_found() {
        let tmp = TempDir::new("launch_notfound");
        let stage = parse_stage("definitely-not-a-real-program-4711 --flag");
        let err = launch(&stage, StageWiring::default(), &tmp.env()).unwrap_err();
        assert!(matches!(err, LaunchError::NotFound));
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
    }

    #[test]
    fn test_empty_stage_still_opens_redirects() {
        let tmp = TempDir::new("launch_empty");
        let err = launch(&parse_stage("> created.txt"), StageWiring::default(), &tmp.env())
            .unwrap_err();
        assert!(matches!(err, LaunchError::EmptyCommand));
        assert!(tmp.path("created.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_plain_file_is_not_executable() {
        let tmp = TempDir::new("launch_noexec");
        fs::write(tmp.path("script.sh"), "echo nope\n").unwrap();

        let err = launch(&parse_stage("./script.sh"), StageWiring::default(), &tmp.env())
            .unwrap_err();
        assert!(matches!(err, LaunchError::NotExecutable));
        assert_eq!(err.exit_code(), EXIT_NOT_EXECUTABLE);
    }

    #[test]
    fn test_pipe_ends_become_standard_streams() {
        let tmp = TempDir::new("launch_pipes");
        let (stdin_reader, mut stdin_writer) = io::pipe().unwrap();
        let (mut stdout_reader, stdout_writer) = io::pipe().unwrap();

        let wiring = StageWiring {
            stdin: Some(stdin_reader),
            stdout: Some(stdout_writer),
        };
        let mut child = launch(&parse_stage("tr a-z A-Z"), wiring, &tmp.env()).unwrap();

        stdin_writer.write_all(b"through the pipe\n").unwrap();
        drop(stdin_writer);

        let mut out = String::new();
        stdout_reader.read_to_string(&mut out).unwrap();
        assert!(child.wait().unwrap().success());
        assert_eq!(out, "THROUGH THE PIPE\n");
    }

    #[test]
    fn test_output_redirect_overrides_pipe() {
        let tmp = TempDir::new("launch_override");
        let (mut reader, writer) = io::pipe().unwrap();

        let wiring = StageWiring {
            stdin: None,
            stdout: Some(writer),
        };
        let mut child = launch(&parse_stage("echo redirected > out.txt"), wiring, &tmp.env())
            .unwrap();

        // The displaced write end is closed everywhere, so the reader sees EOF.
        let mut piped = Vec::new();
        reader.read_to_end(&mut piped).unwrap();
        assert!(child.wait().unwrap().success());

        assert!(piped.is_empty());
        assert_eq!(fs::read_to_string(tmp.path("out.txt")).unwrap(), "redirected\n");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_argv_zero_is_name_as_typed() {
        let tmp = TempDir::new("launch_arg0");
        let stage = parse_stage("cat /proc/self/cmdline > out.txt");
        let mut child = launch(&stage, StageWiring::default(), &tmp.env()).unwrap();
        assert!(child.wait().unwrap().success());
        assert_eq!(
            fs::read(tmp.path("out.txt")).unwrap(),
            b"cat\0/proc/self/cmdline\0"
        );
    }
}
