use std::time::Duration;

use owo_colors::OwoColorize;

use pahelink::prelude::*;

use crate::args::*;
use crate::logger::*;
use crate::prompt::*;

/// links picked for a run, in episode order.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub title: Option<String>,
    pub links: Vec<String>,
}

impl ResolvedRun {
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("unknown")
    }
}

fn runtime_args(args: ResolveArgs) -> Result<RuntimeArgs> {
    match args {
        args if args.app_args.interactive => prompt_for_args(args),
        ResolveArgs {
            series: Some(series),
            cookies,
            episodes,
            quality,
            lang,
            ..
        } => Ok(RuntimeArgs::new(series, cookies, episodes, quality, lang)),
        args => prompt_for_args(args),
    }
}

fn builder_for(args: &ResolveArgs, cookies: Option<&str>) -> PaheBuilder {
    let builder = PaheBuilder::new()
        .base_domain(&args.domain)
        .mirror_domain(&args.mirror_domain)
        .timeout(Duration::from_secs(args.timeout.max(1)))
        .retries(args.retries);

    match cookies {
        Some(cookies) => builder.cookies_str(cookies),
        None => builder,
    }
}

fn describe(chosen: &ChosenEpisode) -> String {
    let candidate = &chosen.candidate;
    let episode = chosen
        .episode
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "episode {} {} {}{}",
        episode.yellow(),
        candidate.quality_label().yellow(),
        candidate.language.label().yellow(),
        if candidate.bluray { " (bluray)" } else { "" },
    )
}

fn log_metadata(info: &PageMetadata, logger: &CliLogger) {
    logger.success(format!(
        "title: {}",
        info.title.as_deref().unwrap_or("unknown").yellow()
    ));
    if let Some(kind) = &info.content_type {
        logger.success(format!("type: {}", kind.yellow()));
    }
    if let Some(count) = &info.episode_count {
        logger.success(format!("episodes: {}", count.yellow()));
    }
    if let Some(label) = &info.episode_label {
        logger.success(format!("episode: {}", label.yellow()));
    }
}

fn log_event(logger: &CliLogger, event: EpisodeEvent<'_>) {
    match event {
        EpisodeEvent::Chosen(chosen) => logger.success(describe(chosen)),
        EpisodeEvent::Skipped(skipped) => logger.warn(format!(
            "episode {} skipped: {}",
            skipped.episode.yellow(),
            skipped.reason
        )),
    }
}

pub async fn resolve_episode_links(args: ResolveArgs, logger: &CliLogger) -> Result<ResolvedRun> {
    let runtime = runtime_args(args.clone())?;
    let link = PaheLink::parse(&runtime.series)?;

    logger.loading("initializing");
    let pahe = builder_for(&args, runtime.cookies.as_deref()).build()?;
    logger.success("initialized");

    let policy = SelectionPolicy::new(runtime.quality, runtime.lang.clone());
    let url = link.url(pahe.base_domain());

    let (info, chosen) = match &link {
        PaheLink::Series { anime_id } => {
            let info = logger
                .while_loading(
                    format!("getting info from: {}", url.yellow()),
                    pahe.get_metadata(&link),
                )
                .await?;
            log_metadata(&info, logger);

            let report = logger
                .while_loading(
                    format!(
                        "resolving episodes {} at {} ({})",
                        runtime.episodes.yellow(),
                        policy.target.yellow(),
                        policy.language.yellow()
                    ),
                    pahe.resolve_series(anime_id, runtime.episodes, &policy, |event| {
                        log_event(logger, event)
                    }),
                )
                .await?;

            if report.is_empty() {
                logger.warn("no episode had a usable download mirror");
            }
            (info, report.chosen)
        }
        PaheLink::Episode { .. } => {
            let (info, chosen) = logger
                .while_loading(
                    format!(
                        "resolving {} at {} ({})",
                        url.yellow(),
                        policy.target.yellow(),
                        policy.language.yellow()
                    ),
                    pahe.resolve_episode_page(&url, &policy),
                )
                .await?;
            log_metadata(&info, logger);
            logger.success(describe(&chosen));
            (info, vec![chosen])
        }
    };

    let resolved = resolve_links(&PassthroughResolver, &chosen).await;
    for failed in &resolved.failed {
        logger.warn(format!(
            "could not resolve link for {}",
            failed.candidate.source_link.yellow()
        ));
    }

    Ok(ResolvedRun {
        title: info.title,
        links: resolved.links,
    })
}
