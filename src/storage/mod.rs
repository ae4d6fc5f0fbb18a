//! Storage module for block files

pub mod persistence;

pub use persistence::{load_blocks, read_block_file, write_block_file, StorageError};
