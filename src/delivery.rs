//! hand-off of chosen mirrors to the outside world: link resolution, link
//! export, downloading and archiving.
//!
//! resolution, downloading and archiving are collaborators behind traits;
//! this module only sequences them.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::errors::{PaheError, Result};
use crate::series::ChosenEpisode;

/// turns an intermediate mirror link into a final direct link.
pub trait LinkResolver {
    /// `None` marks a failed resolution; the episode is dropped from the batch.
    fn resolve(&self, link: &str) -> impl Future<Output = Option<String>> + Send;
}

/// downloads an ordered set of direct links into `directory`.
pub trait Downloader {
    fn download(
        &self,
        links: &[String],
        directory: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// progress of an archive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveProgress {
    pub items_done: usize,
    pub items_total: usize,
    pub current_file: String,
    pub bytes_done: u64,
    pub bytes_total: u64,
}

/// packs a directory into an archive.
pub trait Archiver {
    fn archive(
        &self,
        source_dir: &Path,
        archive_name: &str,
        remove_source: bool,
        progress: &mut dyn FnMut(ArchiveProgress),
    ) -> bool;
}

/// resolver that hands back the mirror link unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl LinkResolver for PassthroughResolver {
    async fn resolve(&self, link: &str) -> Option<String> {
        Some(link.to_string())
    }
}

/// direct links in episode order, plus the episodes whose resolution failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLinks {
    pub links: Vec<String>,
    pub failed: Vec<ChosenEpisode>,
}

/// resolves every chosen mirror in order.
pub async fn resolve_links<R: LinkResolver>(
    resolver: &R,
    chosen: &[ChosenEpisode],
) -> ResolvedLinks {
    let mut resolved = ResolvedLinks::default();

    for episode in chosen {
        match resolver
            .resolve(&episode.candidate.source_link)
            .await
            .filter(|link| !link.trim().is_empty())
        {
            Some(link) => resolved.links.push(link),
            None => {
                warn!(
                    episode = ?episode.episode,
                    link = %episode.candidate.source_link,
                    "link resolution failed; dropping episode"
                );
                resolved.failed.push(episode.clone());
            }
        }
    }

    resolved
}

/// writes `links` to `path`, one per line.
pub async fn export_links(path: &Path, links: &[String]) -> Result<()> {
    let io_err = |source| PaheError::Io {
        context: format!("writing {}", path.display()),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(io_err)?;
    for link in links {
        file.write_all(link.as_bytes()).await.map_err(io_err)?;
        file.write_all(b"\n").await.map_err(io_err)?;
    }
    file.flush().await.map_err(io_err)?;

    info!(path = %path.display(), links = links.len(), "exported links");
    Ok(())
}

/// directory name for a series title that is valid on every platform.
pub fn download_dir_name(title: &str) -> String {
    const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let cleaned: String = title
        .chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_end_matches(['.', ' ']);

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

/// archive file name for a download directory.
pub fn archive_name(directory: &str) -> String {
    format!("{}.zip", directory.replace(' ', "_"))
}

/// what to do with the chosen episodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// write the resolved links to a text file.
    Export { path: PathBuf },
    /// download into a directory named after the title, optionally zipping it.
    Download {
        title: String,
        zip: bool,
        remove_source: bool,
    },
}

/// outcome of [`deliver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub resolved: ResolvedLinks,
    /// archive written, when one was requested and succeeded.
    pub archive: Option<String>,
}

/// resolves the chosen mirrors and carries out `plan`.
pub async fn deliver<R, D, A>(
    plan: &DeliveryPlan,
    chosen: &[ChosenEpisode],
    resolver: &R,
    downloader: &D,
    archiver: &A,
    mut on_archive_progress: impl FnMut(ArchiveProgress),
) -> Result<DeliveryReport>
where
    R: LinkResolver,
    D: Downloader,
    A: Archiver,
{
    let resolved = resolve_links(resolver, chosen).await;
    let mut archive = None;

    match plan {
        DeliveryPlan::Export { path } => export_links(path, &resolved.links).await?,
        DeliveryPlan::Download {
            title,
            zip,
            remove_source,
        } => {
            let directory = download_dir_name(title);
            downloader
                .download(&resolved.links, Path::new(&directory))
                .await?;

            if *zip {
                let name = archive_name(&directory);
                let ok = archiver.archive(
                    Path::new(&directory),
                    &name,
                    *remove_source,
                    &mut on_archive_progress,
                );
                if ok {
                    archive = Some(name);
                } else {
                    warn!(%name, "archiving failed");
                }
            }
        }
    }

    Ok(DeliveryReport { resolved, archive })
}
