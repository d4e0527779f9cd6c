//! Month-keyed collection of loaded tables

use super::{load_table, BinnedLikelihoodTable, Month};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Directory holding trained tables named `<table_id>_M<MM>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    pub root: PathBuf,
}

impl TableSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Path of table `id` for `month`
    pub fn path_for(&self, id: &str, month: Month) -> PathBuf {
        self.root.join(format!("{}_M{}.json", id, month))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Tables for one month, shared read-only between classifiers.
#[derive(Debug, Clone)]
pub struct TableStore {
    month: Month,
    tables: HashMap<String, Arc<BinnedLikelihoodTable>>,
}

impl TableStore {
    /// Empty store for `month`
    pub fn new(month: Month) -> Self {
        Self {
            month,
            tables: HashMap::new(),
        }
    }

    /// Load the tables `ids` for `month` from `source`.
    ///
    /// A missing file is reported as [`Error::MissingTable`].
    pub fn load<'a, I>(source: &TableSource, month: Month, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut store = Self::new(month);
        for id in ids {
            if store.contains(id) {
                continue;
            }
            let path = source.path_for(id, month);
            if !path.is_file() {
                return Err(Error::MissingTable {
                    table: id.to_string(),
                    month: month.get(),
                });
            }
            debug!("Reading table {} from {}", id, path.display());
            let mut table = load_table(&path)?;
            if table.name() != id {
                // The file name is authoritative
                table = BinnedLikelihoodTable::new(id, table.rows().to_vec())?;
            }
            store.insert(table);
        }
        info!(
            "Loaded {} tables for month {} from {}",
            store.len(),
            month,
            source.root().display()
        );
        Ok(store)
    }

    /// Add or replace a table under its own name
    pub fn insert(&mut self, table: BinnedLikelihoodTable) {
        self.tables.insert(table.name().to_string(), Arc::new(table));
    }

    pub fn get(&self, id: &str) -> Result<Arc<BinnedLikelihoodTable>> {
        self.tables
            .get(id)
            .cloned()
            .ok_or_else(|| Error::MissingTable {
                table: id.to_string(),
                month: self.month.get(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Loaded table ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{save_table, SurfaceBins};
    use tempfile::tempdir;

    fn table(name: &str) -> BinnedLikelihoodTable {
        BinnedLikelihoodTable::uniform(name, SurfaceBins::uniform(200.0, 1.0, 0.8, 0.5)).unwrap()
    }

    #[test]
    fn test_path_naming() {
        let source = TableSource::new("/data/tables");
        let path = source.path_for("Btd_11_85", Month::new(4).unwrap());
        assert_eq!(path, PathBuf::from("/data/tables/Btd_11_85_M04.json"));
    }

    #[test]
    fn test_load_and_share() {
        let dir = tempdir().unwrap();
        let source = TableSource::new(dir.path());
        let month = Month::new(11).unwrap();
        save_table(&table("T_11"), source.path_for("T_11", month)).unwrap();
        save_table(&table("T_Std"), source.path_for("T_Std", month)).unwrap();

        let store = TableStore::load(&source, month, ["T_11", "T_Std", "T_11"]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids(), vec!["T_11", "T_Std"]);

        let a = store.get("T_11").unwrap();
        let b = store.get("T_11").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_missing_table() {
        let dir = tempdir().unwrap();
        let source = TableSource::new(dir.path());
        let month = Month::new(2).unwrap();

        match TableStore::load(&source, month, ["Ref_Std"]) {
            Err(Error::MissingTable { table, month }) => {
                assert_eq!(table, "Ref_Std");
                assert_eq!(month, 2);
            }
            other => panic!("expected missing table, got {:?}", other),
        }

        let store = TableStore::new(month);
        assert!(matches!(store.get("T_11"), Err(Error::MissingTable { .. })));
    }
}
