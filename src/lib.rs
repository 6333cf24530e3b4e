pub mod builder;
pub mod client;
pub mod context;
pub mod delivery;
pub mod errors;
pub mod http;
pub mod link;
pub mod series;

pub use builder::*;
pub use client::*;
pub use errors::*;

pub mod prelude {
    pub use crate::builder::PaheBuilder;
    pub use crate::client::PaheClient;
    pub use crate::context::{RequestContext, RequestKind};
    pub use crate::delivery::{
        ArchiveProgress, Archiver, DeliveryPlan, DeliveryReport, Downloader, LinkResolver,
        PassthroughResolver, ResolvedLinks, archive_name, deliver, download_dir_name,
        export_links, resolve_links,
    };
    pub use crate::errors::{PaheError, Result};
    pub use crate::http::{HttpSource, PageSource, RetryPolicy};
    pub use crate::link::PaheLink;
    pub use crate::series::{
        ChosenEpisode, EpisodeEvent, SeriesReport, SkipReason, SkippedEpisode,
    };

    pub use pahelink_core::{
        AudioLanguage, EpisodeCandidate, EpisodeRange, PageMetadata, QualityTarget,
        SelectionPolicy,
    };
}
