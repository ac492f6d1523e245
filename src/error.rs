// Crate-wide error type. Every variant states *where* things went wrong.
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Input file is missing or could not be opened.
    #[error("source not found: {}: {source}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Zero-size or undecodable frame data.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Missing or out-of-range size / fps / path.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Background-removed animation could not be written.
    #[error("encode error: {0}")]
    Encode(String),

    /// Creating the overlay window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the window failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// An OS window-manager call failed.
    #[error("platform error: {0}")]
    Platform(String),

    /// Controller used outside its lifecycle (e.g. run after termination).
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    pub fn source_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceNotFound {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            Error::invalid_image("x")
                .to_string()
                .contains("invalid image:")
        );
        assert!(
            Error::configuration("x")
                .to_string()
                .contains("configuration error:")
        );
        assert!(Error::encode("x").to_string().contains("encode error:"));
        assert!(Error::platform("x").to_string().contains("platform error:"));
    }

    #[test]
    fn source_not_found_names_the_path() {
        let err = Error::source_not_found(
            "missing/cat.gif",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("cat.gif"));
        assert!(msg.contains("gone"));
    }
}
