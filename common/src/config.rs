#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Emits raw collaborator output and per-probe diagnostics.
    ///
    /// Does not change what gets scanned, only what gets printed.
    pub verbose: bool,
}
