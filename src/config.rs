/// Prompt shown by the interactive read-loop.
pub const DEFAULT_PROMPT: &str = "Shell> ";

/// How deep `source` may nest before it refuses to go further.
pub const DEFAULT_MAX_SOURCE_DEPTH: usize = 64;

/// Settings for one interpreter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Prompt printed before each interactive line.
    pub prompt: String,
    /// Maximum number of nested `source` calls. A script that sources itself
    /// stops with an error at this depth instead of exhausting the stack.
    pub max_source_depth: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_source_depth: DEFAULT_MAX_SOURCE_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.prompt, "Shell> ");
        assert_eq!(config.max_source_depth, 64);
    }
}
