/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// a mistake in what the user typed: syntax, missing file, unknown command
    User,
    /// an OS call failed: fork, open, pipe
    System,
    /// an internal anomaly
    Debug,
}

/// Where human-readable messages go.
pub trait Sink {
    fn report(&mut self, level: Level, msg: &str);
}
