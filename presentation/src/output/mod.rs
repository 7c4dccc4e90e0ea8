//! Console output and export files

pub mod console;
pub mod export_writer;
