//! Service modules for the pipeline stages

pub mod csvio;
pub mod ingest;
pub mod results;
pub mod templates;

// Re-export service types
pub use ingest::{IngestWarning, LeadIngestor};
pub use results::ResultsRecorder;
pub use templates::{RenderedTemplate, TemplateCatalog};
