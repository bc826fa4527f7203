//! File I/O for the wavegrid framework.
//!
//! This crate provides:
//!
//! - **Lookup tables**: [`read_npy`] / [`write_npy`] for NumPy `.npy` grids,
//!   [`read_json_table`] / [`write_json_table`] for the `{"shape", "data"}`
//!   JSON form, and [`load_table`] which picks a reader by file extension
//! - **Background loading**: [`spawn_table_loader`] loads a table off the
//!   audio thread so an engine can be installed once it is ready
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for impulse responses
//!   and rendered output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wavegrid_io::{load_table, read_wav};
//!
//! let table = Arc::new(load_table("grid.npy")?);
//! let (impulse, spec) = read_wav("hall.wav")?;
//! ```

mod json_table;
mod loader;
mod npy;
mod wav;

use std::path::{Path, PathBuf};

pub use json_table::{JsonTable, parse_json_table, read_json_table, write_json_table};
pub use loader::{TableLoader, spawn_table_loader};
pub use npy::{decode_npy, encode_npy, read_npy, write_npy};
pub use wav::{WavSpec, read_wav, write_wav};

use wavegrid_core::{LookupTable, TableError};

/// Error types for wavegrid file I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoded data does not form a valid table.
    #[error("invalid lookup table: {0}")]
    Table(#[from] TableError),

    /// Malformed JSON table.
    #[error("JSON table error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed NPY header or truncated data.
    #[error("malformed NPY file: {0}")]
    Npy(String),

    /// NPY element type other than little-endian `f4`/`f8`.
    #[error("unsupported NPY dtype {0:?} (expected '<f4' or '<f8')")]
    NpyDtype(String),

    /// Fortran-ordered NPY array.
    #[error("Fortran-ordered NPY arrays are not supported")]
    NpyFortranOrder,

    /// File extension is neither `.npy` nor `.json`.
    #[error("unsupported table file: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The background loader thread panicked.
    #[error("table loader thread panicked")]
    LoaderPanicked,
}

/// Convenience result type for wavegrid file I/O.
pub type Result<T> = std::result::Result<T, Error>;

/// Load a lookup table, choosing the format from the file extension.
///
/// `.npy` files are read with [`read_npy`], `.json` files with
/// [`read_json_table`].
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<LookupTable> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let table = match ext.as_deref() {
        Some("npy") => read_npy(path)?,
        Some("json") => read_json_table(path)?,
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };
    tracing::info!(path = %path.display(), shape = ?table.shape(), "loaded lookup table");
    Ok(table)
}
