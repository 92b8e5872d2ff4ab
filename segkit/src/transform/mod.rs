//! Transformation module.
//!
//! Turns ingested rows into segmentation documents on disk:
//! - Grouper: rows by center, centers to brands, brands to categories
//! - Criteria: the criteria tree of one segment
//! - Chunker: splitting oversized row sets
//! - Emitter: artifact naming and atomic writes
//! - Pipeline: the orchestrator tying the steps together

pub mod chunker;
pub mod criteria;
pub mod emitter;
pub mod grouper;
pub mod pipeline;

pub use chunker::{split, SplitPolicy, DEFAULT_CHUNK_THRESHOLD};
pub use criteria::{build_criteria, build_document, segment_name};
pub use emitter::{artifact_file_name, ArtifactWriter};
pub use grouper::{group_by_center, map_segments, BrandSegment, Grouping, RowGroup, SkippedGroup};
pub use pipeline::{
    process_segmentation_file, Artifact, Readers, SegmentationReport, Segmenter, TableReport,
    WriteFailure,
};
