//! I/O utilities for tesseract experiment data files.
//!
//! Provides functions for reading and writing sampled measurement data
//! (.b8 and 01 files) and for converting experiment circuits to and from
//! Stim's circuit text format, so that shots sampled by external tools can
//! be decoded and circuits built here can be sampled elsewhere.

/// File loading utilities for measurement data formats.
///
/// Reads and writes Stim's packed .b8 format and the line-oriented 01
/// format, converting them to and from shot matrices.
pub mod loader;

/// Parser for Stim circuit text.
///
/// Turns the subset of Stim instructions used by the experiment into a
/// circuit of ISA instructions.
pub mod parser;

/// Stim circuit text writer.
pub mod writer;
