//! Error types for patch loading and saving.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading, validating or saving a patch.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Engine name not recognised
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// Table-driven engine built without a table
    #[error("engine '{0}' needs a lookup table")]
    MissingTable(String),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a directory creation error.
    pub fn create_dir(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result alias for patch operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn read_file_display_and_source() {
        let err = ConfigError::read_file(
            "/patches/lead.toml",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/patches/lead.toml"));
        assert!(msg.contains("gone"));
        assert!(err.source().is_some());
    }

    #[test]
    fn write_file_and_create_dir_keep_paths() {
        let write = ConfigError::write_file("/out/a.toml", io::Error::other("denied"));
        assert!(matches!(&write, ConfigError::WriteFile { path, .. } if path == Path::new("/out/a.toml")));
        let dir = ConfigError::create_dir("/out", io::Error::other("denied"));
        assert!(dir.to_string().starts_with("failed to create directory '/out'"));
    }

    #[test]
    fn toml_parse_converts() {
        let parse_err = toml::from_str::<toml::Value>("engine = ").unwrap_err();
        let err: ConfigError = parse_err.into();
        assert!(matches!(err, ConfigError::TomlParse(_)));
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }

    #[test]
    fn engine_errors_display() {
        assert_eq!(
            ConfigError::UnknownEngine("granular".into()).to_string(),
            "unknown engine: granular"
        );
        assert_eq!(
            ConfigError::MissingTable("waveshaper".into()).to_string(),
            "engine 'waveshaper' needs a lookup table"
        );
    }

    #[test]
    fn validation_converts_and_chains() {
        let err: ConfigError = ValidationError::InvalidSampleRate(0).into();
        assert!(err.to_string().contains("sample rate"));
        assert!(err.source().is_some());
    }
}
