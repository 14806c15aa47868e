//! Outer surfaces: the command line, CSV tables and exported files.

pub mod cli;
pub mod csv;
pub mod document;
pub mod export;
pub mod sheet;
pub mod views;
