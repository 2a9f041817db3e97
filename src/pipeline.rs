//! Pipeline orchestration: one pipe per stage boundary, every stage waited for.

use crate::command::{EXIT_FAILURE, EXIT_SUCCESS, ExitCode};
use crate::env::Environment;
use crate::launcher::{self, StageWiring};
use crate::parser::Stage;
use log::{debug, warn};
use std::io::{self, PipeReader};
use std::process::{Child, ExitStatus};

/// Outcome of running one pipeline to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Exit status of every stage, in stage order.
    pub statuses: Vec<ExitCode>,
    /// Number of pipes allocated between stages.
    pub pipes: usize,
}

impl PipelineReport {
    /// The pipeline's status: that of its last stage.
    pub fn exit_code(&self) -> ExitCode {
        self.statuses.last().copied().unwrap_or(EXIT_SUCCESS)
    }
}

/// A stage after the launch phase.
enum Launched {
    Running(Child),
    Failed(ExitCode),
}

/// Runs `stages` as one pipeline and blocks until every stage has finished.
///
/// Stages are launched left to right. Between two neighbours one pipe is
/// allocated; its write end goes to the left stage and its read end becomes
/// the input of the right one. The first stage reads the shell's standard
/// input and the last one writes to the shell's standard output unless
/// redirected. The parent gives up each pipe end as soon as the stage that
/// owns it has been launched.
///
/// A stage that cannot be launched is reported on stderr and recorded with a
/// failure status; the rest of the pipeline still runs. Every launched child
/// is waited for before returning.
pub fn run_pipeline(stages: &[Stage], env: &Environment) -> PipelineReport {
    let mut launched = Vec::with_capacity(stages.len());
    let mut input: Option<PipeReader> = None;
    let mut pipes = 0;
    let last = stages.len().saturating_sub(1);

    for (i, stage) in stages.iter().enumerate() {
        let (next_input, output) = if i < last {
            match io::pipe() {
                Ok((reader, writer)) => {
                    pipes += 1;
                    (Some(reader), Some(writer))
                }
                Err(e) => {
                    // Without a pipe the rest of the chain cannot be wired.
                    report(stage, &format!("cannot create pipe: {e}"));
                    launched.resize_with(stages.len(), || Launched::Failed(EXIT_FAILURE));
                    break;
                }
            }
        } else {
            (None, None)
        };

        let wiring = StageWiring {
            stdin: input.take(),
            stdout: output,
        };
        match launcher::launch(stage, wiring, env) {
            Ok(child) => launched.push(Launched::Running(child)),
            Err(err) => {
                report(stage, &err.to_string());
                launched.push(Launched::Failed(err.exit_code()));
            }
        }
        input = next_input;
    }
    drop(input);
    debug!("pipeline of {} stages uses {} pipes", stages.len(), pipes);

    let statuses = launched.into_iter().map(collect).collect();
    PipelineReport { statuses, pipes }
}

fn collect(stage: Launched) -> ExitCode {
    match stage {
        Launched::Running(mut child) => match child.wait() {
            Ok(status) => {
                let code = exit_code(status);
                debug!("pid {} exited with {}", child.id(), code);
                code
            }
            Err(e) => {
                warn!("failed to wait for pid {}: {}", child.id(), e);
                EXIT_FAILURE
            }
        },
        Launched::Failed(code) => code,
    }
}

fn report(stage: &Stage, message: &str) {
    let name = stage.program().unwrap_or("pipeshell");
    warn!("{name}: {message}");
    eprintln!("{name}: {message}");
}

/// Maps a wait status to a shell exit code; signals become `128 + signal`.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}
