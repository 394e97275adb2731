//! Ad/page correlation and prospect materialization.
//!
//! Reads scraped pages and fetched ads from a `RecordStore`, joins them by
//! page id, and emits one `ProspectContext` per (page, ad) pair that has
//! enough data for outreach.

pub mod builder;
pub mod correlate;
pub mod dedupe;
pub mod transform;

pub use builder::{
    assemble_prospects, partition_records, ProspectBuild, ProspectBuilder, ProspectOptions,
    ProspectStats,
};
pub use correlate::correlate;
pub use dedupe::{dedupe, UniquePages};
pub use transform::to_prospect_context;
