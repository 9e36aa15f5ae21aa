//! trackmart-ingest library interface
//!
//! Catalog extraction: the rate-limited API client, the windowed search
//! pagination loop, artist enrichment batching, and the sweep job that
//! hands records to the external load stage.

pub mod client;
pub mod enrich;
pub mod extract;
pub mod job;
