//! Block file persistence
//!
//! Each block file holds exactly one encoded block. Any file that cannot
//! be read or decoded aborts the load.

use crate::core::{Block, BlockError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {}: {source}", .path.display())]
    InvalidBlock {
        path: PathBuf,
        #[source]
        source: BlockError,
    },
}

/// Read one block from a block file
pub fn read_block_file(path: &Path) -> Result<Block, StorageError> {
    let bytes = fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let block = Block::decode(&bytes).map_err(|source| StorageError::InvalidBlock {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Read block {} from {}", block.height, path.display());
    Ok(block)
}

/// Write one block to a block file
pub fn write_block_file(path: &Path, block: &Block) -> Result<(), StorageError> {
    fs::write(path, block.encode()).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every block file, failing on the first bad one
pub fn load_blocks<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Block>, StorageError> {
    paths
        .iter()
        .map(|path| read_block_file(path.as_ref()))
        .collect()
}
