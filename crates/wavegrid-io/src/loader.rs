//! One-shot background table loading.
//!
//! Loading and validating a table can take arbitrarily long, so it happens
//! on its own thread. The host polls or joins the [`TableLoader`] and
//! installs the engine once the table is ready; the audio thread never waits.

use crate::{Error, Result, load_table};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use wavegrid_core::LookupTable;

/// Handle to a table being loaded in the background.
#[derive(Debug)]
pub struct TableLoader {
    path: PathBuf,
    handle: JoinHandle<Result<Arc<LookupTable>>>,
}

impl TableLoader {
    /// Path being loaded.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Whether the load has finished (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the load to finish.
    pub fn join(self) -> Result<Arc<LookupTable>> {
        self.handle.join().map_err(|_| Error::LoaderPanicked)?
    }
}

/// Start loading the table at `path` on a background thread.
pub fn spawn_table_loader(path: impl Into<PathBuf>) -> Result<TableLoader> {
    let path = path.into();
    let thread_path = path.clone();
    let handle = std::thread::Builder::new()
        .name("wavegrid-table-loader".into())
        .spawn(move || {
            tracing::debug!(path = %thread_path.display(), "loading table");
            load_table(&thread_path).map(Arc::new)
        })?;
    Ok(TableLoader { path, handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write_npy;

    #[test]
    fn loads_on_background_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.npy");
        let table = LookupTable::from_fn([8, 2, 2], |a, b, c| (a + b + c) as f32).unwrap();
        write_npy(&path, &table).unwrap();

        let loader = spawn_table_loader(&path).unwrap();
        assert_eq!(loader.path(), path);
        let loaded = loader.join().unwrap();
        assert_eq!(*loaded, table);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = spawn_table_loader(dir.path().join("absent.npy")).unwrap();
        assert!(matches!(loader.join(), Err(Error::Io(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        std::fs::write(&path, "1,2,3").unwrap();
        let loader = spawn_table_loader(&path).unwrap();
        assert!(matches!(loader.join(), Err(Error::UnsupportedFormat(_))));
    }
}
