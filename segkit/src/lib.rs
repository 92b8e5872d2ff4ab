//! # Segkit - contact spreadsheets to CRM segmentation rules
//!
//! Segkit reads contact lists (CSV files or Excel workbooks), groups contacts
//! by center, maps centers to brands and writes one segmentation document per
//! (brand, category, chunk) for the marketing platform.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XLSX / CSV  │────▶│   Ingest    │────▶│  Transform  │────▶│  Segment    │
//! │  (id,center)│     │ (RowReader) │     │ (group+map) │     │  JSON files │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segkit::{SegmentationConfig, Segmenter};
//! use std::path::Path;
//!
//! let report = Segmenter::new(SegmentationConfig::default())
//!     .run(Path::new("contacts.xlsx"), Path::new("out"))?;
//! println!("Wrote {} segments", report.artifact_count());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Layered error types
//! - [`models`] - Rows, field mappings, criteria trees
//! - [`config`] - Run configuration (brands, centers, split policy)
//! - [`mapping`] - Brand field-mapping table and center directory
//! - [`ingest`] - CSV and XLSX row readers
//! - [`transform`] - Grouping, criteria, chunking, emission, pipeline
//! - [`parser`] - Generic CSV to JSON conversion
//! - [`validation`] - JSON Schema validation

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Brand data
pub mod mapping;

// Reading
pub mod ingest;
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError, FormatError, IngestError, MappingError, SegmentationError, SegmentationResult,
    WriteError,
};

// =============================================================================
// Re-exports - Models and configuration
// =============================================================================

pub use config::{InvalidRowPolicy, SegmentationConfig};
pub use mapping::{BrandTable, CenterDirectory};
pub use models::{CriteriaNode, FieldMapping, Operator, Row, RowTable, SegmentationDocument};

// =============================================================================
// Re-exports - Ingestion
// =============================================================================

pub use ingest::{CsvRowReader, InputFormat, RowReader, XlsxRowReader};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    build_criteria, build_document, map_segments, process_segmentation_file, split, Artifact,
    ArtifactWriter, SegmentationReport, Segmenter, SplitPolicy, TableReport, WriteFailure,
    DEFAULT_CHUNK_THRESHOLD,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    convert_regular_csv, csv_to_json, decode_content, detect_delimiter, detect_encoding,
    parse_bytes_auto, parse_csv_file_auto, CsvError, ParseResult,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    format_violations, is_valid, is_valid_segmentation, validate, validate_segmentation,
    SchemaViolation,
};
