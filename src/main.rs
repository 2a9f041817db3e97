use argh::FromArgs;
use log::LevelFilter;
use pipeshell::Interpreter;
use pipeshell::config::{DEFAULT_MAX_SOURCE_DEPTH, DEFAULT_PROMPT, ShellConfig};
use pipeshell::logging;

#[derive(FromArgs)]
/// Run command lines as pipelines of external programs.
struct Args {
    #[argh(positional)]
    /// script to run instead of reading commands interactively.
    script: Option<String>,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt shown before each interactive line.
    prompt: String,

    #[argh(option, default = "LevelFilter::Warn")]
    /// diagnostics level: off, error, warn, info, debug or trace.
    log_level: LevelFilter,

    #[argh(option, default = "DEFAULT_MAX_SOURCE_DEPTH")]
    /// how deep `source` may nest.
    max_source_depth: usize,
}

fn main() -> std::process::ExitCode {
    let args: Args = argh::from_env();
    logging::init(args.log_level);

    let config = ShellConfig {
        prompt: args.prompt,
        max_source_depth: args.max_source_depth,
    };
    let mut shell = Interpreter::with_config(config);

    let code = match args.script {
        Some(script) => shell.source(&script).unwrap_or_else(|e| {
            eprintln!("{e:#}");
            1
        }),
        None => match shell.repl() {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("pipeshell: {e}");
                1
            }
        },
    };

    std::process::ExitCode::from(u8::try_from(code).unwrap_or(1))
}
