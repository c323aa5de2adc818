//! Metadata sources for entity export
//!
//! A [`MetadataSource`] enumerates entity definitions and their attributes
//! from the source platform in a single request.
//!
//! ## Sources
//!
//! - [`ResponseFileSource`] replays a saved `EntityDefinitions` response
//! - [`MockSource`] serves in-memory entities for tests and demos
//!
//! ## Example
//!
//! ```rust,ignore
//! use cdmbridge_source::{MetadataSource, MetadataQuery, ResponseFileSource};
//!
//! let source = ResponseFileSource::new("metadata-response.json");
//! source.test_connection().await?;
//! let entities = source.query_all_entities(&MetadataQuery::default()).await?;
//! ```

pub mod source;
pub mod metadata;
pub mod mock;
pub mod response_file;

pub use source::{MetadataSource, SourceError};
pub use metadata::{AttributeMetadata, AttributeType, EntityFilters, EntityMetadata, MetadataQuery};
pub use mock::{MockSource, MockSourceBuilder};
pub use response_file::ResponseFileSource;
