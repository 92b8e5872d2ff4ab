//! Error types for the segmentation pipeline.
//!
//! One error type per layer:
//!
//! - [`FormatError`] - Unsupported input file type (raised before any I/O)
//! - [`IngestError`] - Unreadable input or a row that fails required-field parsing
//! - [`MappingError`] - No brand or field mapping for a group (non-fatal, logged and skipped)
//! - [`WriteError`] - An artifact could not be written (reported per artifact)
//! - [`ConfigError`] - Configuration file could not be loaded
//! - [`SegmentationError`] - Top-level orchestration errors
//!
//! Conversions into [`SegmentationError`] are automatic via `From`,
//! so `?` works across layer boundaries.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Format Errors
// =============================================================================

/// The input file extension is not one the orchestrator can ingest.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Extension present but not supported.
    #[error("Unsupported file type '.{extension}' for {}. Only .xlsx and .csv files are supported.", .path.display())]
    Unsupported { path: PathBuf, extension: String },

    /// No extension at all.
    #[error("Cannot infer file type of {}: no extension. Only .xlsx and .csv files are supported.", .path.display())]
    MissingExtension { path: PathBuf },
}

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors while reading rows out of a source file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to open or read the file.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV structure.
    #[error("Invalid CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Workbook could not be opened or a sheet could not be read.
    #[error("Invalid spreadsheet {}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },

    /// A data row has a missing or non-numeric id.
    #[error("{}{} line {line}: invalid id '{value}': {message}", .path.display(), sheet_suffix(.sheet))]
    InvalidRow {
        path: PathBuf,
        sheet: Option<String>,
        line: usize,
        value: String,
        message: String,
    },
}

fn sheet_suffix(sheet: &Option<String>) -> String {
    match sheet {
        Some(name) => format!(" [sheet '{}']", name),
        None => String::new(),
    }
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// A group could not be mapped to platform fields.
///
/// Never fatal: the grouping engine logs these and skips the group.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MappingError {
    /// The center label is not listed in the center directory.
    #[error("No brand registered for center '{center}'")]
    UnknownCenter { center: String },

    /// The brand has no entry in the field-mapping table.
    #[error("No field mapping found for brand '{brand}'")]
    BrandNotFound { brand: String },

    /// The brand exists but has no mapping for this category.
    #[error("No field mapping found for brand '{brand}', category '{category}'")]
    CategoryNotFound { brand: String, category: String },
}

// =============================================================================
// Write Errors
// =============================================================================

/// An artifact could not be written.
///
/// Carries the full target path and the (brand, category, chunk) it belongs to
/// so a caller can retry just that artifact.
#[derive(Debug, Error)]
#[error("Failed to write {brand} / {category} part {chunk_index} to {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    pub brand: String,
    pub category: String,
    pub chunk_index: usize,
    #[source]
    pub source: std::io::Error,
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("Invalid config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Parsed, but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Segmentation Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::Segmenter::run`].
/// Mapping misses and write failures are not here: they are recorded in the
/// run report instead of aborting the run.
#[derive(Debug, Error)]
pub enum SegmentationError {
    /// Unsupported input format.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Ingestion failed; no artifacts were written for this file.
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for mapping lookups.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for the orchestrator.
pub type SegmentationResult<T> = Result<T, SegmentationError>;
