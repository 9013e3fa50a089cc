//! Content selection: relevance scoring of résumé blocks against a job
//! description and truncation to section limits.
//!
//! - `keywords`: deterministic keyword-overlap scoring (fallback signal)
//! - `similarity` / `cache`: vector math and per-block embedding cache
//! - `semantic`: the ranking entry point combining both signals
//! - `selector`: top-N truncation per section

pub mod cache;
pub mod handlers;
pub mod keywords;
pub mod selector;
pub mod semantic;
pub mod similarity;
