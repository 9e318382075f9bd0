use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for level loading, configuration and image access.
#[derive(Debug)]
pub enum EngineError {
    /// A level line has the wrong field count, a non-numeric field, or the
    /// input ended before a section sentinel was reached.
    Format { line: usize, reason: String },
    /// A record names an atlas image that was never declared.
    UnknownAtlas { line: usize, name: String },
    /// A record names an animation strip that was never declared.
    UnknownAnimation { line: usize, name: String },
    /// File I/O error
    Io { path: PathBuf, source: io::Error },
    /// Config JSON could not be parsed
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Image bytes could not be decoded
    Image { path: PathBuf, reason: String },
}

impl EngineError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        EngineError::Format {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Format { line, reason } => {
                write!(f, "Level format error at line {}: {}", line, reason)
            }
            EngineError::UnknownAtlas { line, name } => {
                write!(f, "Unknown atlas image '{}' referenced at line {}", name, line)
            }
            EngineError::UnknownAnimation { line, name } => {
                write!(f, "Unknown animation '{}' referenced at line {}", name, line)
            }
            EngineError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            EngineError::Json { path, source } => {
                write!(f, "JSON parse error in {}: {}", path.display(), source)
            }
            EngineError::Image { path, reason } => {
                write!(f, "Cannot decode image {}: {}", path.display(), reason)
            }
        }
    }
}

impl error::Error for EngineError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            EngineError::Io { source, .. } => Some(source),
            EngineError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
