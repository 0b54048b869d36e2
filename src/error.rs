use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RamanError {
    #[error("Cannot read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Duplicate spectrum name '{name}' ({path})")]
    DuplicateName { name: String, path: PathBuf },
    #[error("Spectrum '{name}'")]
    Numerics {
        name: String,
        #[source]
        source: pls_core::SolveError,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Cannot write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

impl RamanError {
    /// The message followed by every underlying cause.
    pub fn chain(&self) -> String {
        let mut msg = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(s) = source {
            msg.push_str(&format!(": {}", s));
            source = s.source();
        }
        msg
    }

    /// Problems with the input files themselves.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RamanError::Io { .. } | RamanError::Parse { .. } | RamanError::DuplicateName { .. }
        )
    }
}
