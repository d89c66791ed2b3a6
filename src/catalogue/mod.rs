//! Catalogue Metadata
//!
//! Attaches catalogue titles, links and record types to archive directories.
//! Resolution is nearest-registered-ancestor over a persisted mapping, with an
//! optional live service consulted when no ancestor is registered.

pub mod client;
pub mod mapping;
pub mod record;
pub mod resolver;

pub use client::{CatalogueService, HttpCatalogueService, DEFAULT_API_URL};
pub use mapping::CatalogueMapping;
pub use record::{CatalogueMetadata, CatalogueRecord};
pub use resolver::{CatalogueResolver, ResolverStats};
