use std::fmt;

/// How the face frame reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsBackend {
    /// iTerm2 inline-image escape (iTerm2, WezTerm).
    ITerm2,
    /// Unicode half-block cells; works everywhere.
    UnicodeBlock,
}

impl fmt::Display for GraphicsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GraphicsBackend::ITerm2 => "iterm2",
            GraphicsBackend::UnicodeBlock => "unicode",
        })
    }
}

/// Pick a backend.
///
/// `ABI_GRAPHICS=iterm2|unicode` wins; otherwise `TERM_PROGRAM` is checked
/// for terminals known to speak the iTerm2 protocol.
pub fn detect_backend() -> GraphicsBackend {
    if let Ok(val) = std::env::var("ABI_GRAPHICS") {
        match val.to_lowercase().as_str() {
            "iterm2" => return GraphicsBackend::ITerm2,
            "unicode" => return GraphicsBackend::UnicodeBlock,
            _ => {}
        }
    }

    match std::env::var("TERM_PROGRAM").as_deref() {
        Ok("iTerm.app") | Ok("WezTerm") => GraphicsBackend::ITerm2,
        _ => GraphicsBackend::UnicodeBlock,
    }
}
