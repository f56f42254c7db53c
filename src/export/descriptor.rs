//! JSON sidecar describing an exported terrain.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::terrain::TerrainDescriptor;

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes `descriptor` as pretty-printed JSON.
pub fn export_terrain_descriptor(
    descriptor: &TerrainDescriptor,
    path: &Path,
) -> Result<(), DescriptorError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, descriptor)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads a descriptor written by [`export_terrain_descriptor`].
pub fn load_terrain_descriptor(path: &Path) -> Result<TerrainDescriptor, DescriptorError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
