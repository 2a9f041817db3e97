//! A module implementing lexical analysis for the command line.
//!
//! The language has no quoting or escaping: a word is any run of non-whitespace
//! characters, and operators are only recognized later, as whole tokens.

/// The pipe delimiter separating pipeline stages.
pub const PIPE: char = '|';

/// Splits a line into whitespace-delimited tokens.
///
/// Runs of whitespace count as one separator and never produce empty tokens,
/// so an empty or blank line yields an empty vector.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

/// Splits a raw line into its pipeline stage strings.
///
/// The split is purely lexical: every `|` is a stage boundary, including one
/// that was meant to be part of a redirect target. A line without a pipe comes
/// back as a single stage equal to the line itself, and joining the stages with
/// `|` always reproduces the input.
pub fn split_pipeline(line: &str) -> Vec<&str> {
    line.split(PIPE).collect()
}
