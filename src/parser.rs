use crate::lexer;

/// Kind of redirection
///
/// Defines the specific operation mode for an I/O redirection (`<`, `>`, `>>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// Input redirection (`<`): Reads standard input from a specified file.
    Input,
    /// Output redirection (`>`): Writes standard output to a file, **truncating** the file if it exists.
    Output,
    /// Output redirection with append (`>>`): Writes standard output to a file, **appending** to the file if it exists.
    Append,
}

impl RedirectKind {
    /// Recognizes a redirection operator token.
    pub fn from_operator(token: &str) -> Option<Self> {
        match token {
            "<" => Some(RedirectKind::Input),
            ">" => Some(RedirectKind::Output),
            ">>" => Some(RedirectKind::Append),
            _ => None,
        }
    }

    /// The operator as written on the command line.
    pub fn operator(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
            RedirectKind::Append => ">>",
        }
    }

    /// Whether this redirection rebinds standard output rather than standard input.
    pub fn is_output(self) -> bool {
        !matches!(self, RedirectKind::Input)
    }
}

/// A single redirection directive extracted from a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// How the target is opened and which stream it replaces.
    pub kind: RedirectKind,
    /// The file path operand, as written.
    pub target: String,
}

/// The effective redirections of one stage, at most one per standard stream.
///
/// Directives are recorded in scan order and a later directive for the same
/// stream replaces the earlier one, so `cmd > a > b` only writes to `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirects {
    /// Rebinding of standard input (`<`).
    pub input: Option<Redirect>,
    /// Rebinding of standard output (`>` or `>>`).
    pub output: Option<Redirect>,
}

impl Redirects {
    /// Records a directive, replacing any earlier one for the same stream.
    pub fn push(&mut self, redirect: Redirect) {
        if redirect.kind.is_output() {
            self.output = Some(redirect);
        } else {
            self.input = Some(redirect);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// One stage of a pipeline: the clean argument vector plus its redirections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    /// Program name followed by its arguments, with every redirection removed.
    pub argv: Vec<String>,
    pub redirects: Redirects,
}

impl Stage {
    /// The program to run, if the stage names one.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments following the program name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

/// Separates redirection operators and their operands from a stage's tokens.
///
/// Tokens are scanned left to right. An operator consumes itself and the token
/// right after it; an operator with nothing after it is dropped without
/// producing a directive. Every other token is kept, in order, as an argument.
pub fn resolve_redirects(tokens: Vec<String>) -> Stage {
    let mut stage = Stage::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match RedirectKind::from_operator(&token) {
            Some(kind) => {
                if let Some(target) = tokens.next() {
                    stage.redirects.push(Redirect { kind, target });
                }
            }
            None => stage.argv.push(token),
        }
    }

    stage
}

/// Parses the text of a single stage.
pub fn parse_stage(text: &str) -> Stage {
    resolve_redirects(lexer::split_into_tokens(text))
}

/// Parses a whole command line into its ordered pipeline stages.
///
/// Always returns at least one stage; a line without `|` is the one-stage case.
pub fn parse_pipeline(line: &str) -> Vec<Stage> {
    lexer::split_pipeline(line)
        .into_iter()
        .map(parse_stage)
        .collect()
}
