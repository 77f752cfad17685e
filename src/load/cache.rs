// src/load/cache.rs

use super::Table;
use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Per-session dataset cache keyed by source path. Each distinct file is
/// parsed once for the cache's lifetime; sources are static for a run, so
/// there is no invalidation.
#[derive(Debug, Default)]
pub struct SourceCache {
    tables: HashMap<PathBuf, Arc<Table>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached table for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Table>> {
        if let Some(table) = self.tables.get(path) {
            debug!(path = %path.display(), "source cache hit");
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(Table::from_csv_path(path)?);
        self.tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn second_load_reuses_the_parsed_table() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"a,b\n1,2\n")?;

        let mut cache = SourceCache::new();
        let first = cache.get_or_load(file.path())?;

        // overwrite on disk; the cache must keep serving the first parse
        file.write_all(b"3,4\n")?;
        let second = cache.get_or_load(file.path())?;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
        assert_eq!(cache.len(), 1);
        Ok(())
    }
}
