//! JSON persistence for likelihood tables

use super::{BinnedLikelihoodTable, TableFields};
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read a table from a JSON file and validate it.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<BinnedLikelihoodTable> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let fields: TableFields = serde_json::from_reader(reader)?;
    BinnedLikelihoodTable::try_from(fields)
}

/// Write a table as pretty-printed JSON.
pub fn save_table<P: AsRef<Path>>(table: &BinnedLikelihoodTable, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}
