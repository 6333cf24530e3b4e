//! network-free half of pahelink: markup extraction, quality selection and
//! release-api pagination math.

pub mod errors;
pub mod language;
pub mod listing;
pub mod metadata;
pub mod paginate;
pub mod policy;
pub mod rules;
pub mod select;

pub use errors::{CoreError, Result};
pub use language::AudioLanguage;
pub use listing::{DEFAULT_MIRROR_DOMAIN, EpisodeCandidate, ListingParser};
pub use metadata::{PageKind, PageMetadata, extract_metadata};
pub use paginate::{EpisodeRange, PAGE_SIZE, PageWindow, compute_offset, page_of, plan_pages};
pub use policy::{QualityTarget, SelectionPolicy};
pub use select::{SelectionScan, scan, select};
