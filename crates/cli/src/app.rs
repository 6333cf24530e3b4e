use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

use pahelink::prelude::*;

use crate::args::*;
use crate::episode::*;
use crate::logger::*;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve and print the chosen download link of each episode
    Resolve(ResolveArgs),
    /// Resolve and write the chosen download links to a file
    Export(ExportArgs),
}

impl Cli {
    fn app_args(&self) -> &AppArgs {
        match &self.command {
            Some(Commands::Resolve(args)) => &args.app_args,
            Some(Commands::Export(args)) => &args.resolve.app_args,
            None => &self.resolve.app_args,
        }
    }
}

#[derive(Debug)]
pub struct App {
    cli: Cli,
    logger: Arc<CliLogger>,
}

impl App {
    pub fn new() -> Self {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Self {
        let logger = Arc::new(CliLogger::new(&cli.app_args().log_level));
        Self { cli, logger }
    }

    pub fn logger(&self) -> &CliLogger {
        &self.logger
    }

    /// runs the selected command; returns false when it failed.
    pub async fn run(&self) -> bool {
        if self.logger.enabled(LogLevel::Debug) {
            init_tracing(Arc::clone(&self.logger));
        }

        let result = match &self.cli.command {
            Some(Commands::Resolve(args)) => self.resolve(args.clone()).await,
            Some(Commands::Export(args)) => self.export(args.clone()).await,
            None => self.resolve(self.cli.resolve.clone()).await,
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                self.logger.failed(format!("{err}"));
                false
            }
        }
    }

    pub async fn resolve(&self, args: ResolveArgs) -> Result<()> {
        let logger = &self.logger;
        let run = resolve_episode_links(args, logger).await?;

        logger.success(format!(
            "resolved {} link(s) for {}",
            run.links.len().yellow(),
            run.title().yellow()
        ));
        for link in &run.links {
            println!("{link}");
        }

        Ok(())
    }

    pub async fn export(&self, args: ExportArgs) -> Result<()> {
        let logger = &self.logger;
        let run = resolve_episode_links(args.resolve, logger).await?;

        logger
            .while_loading(
                format!("writing {}", args.output.display().yellow()),
                export_links(&args.output, &run.links),
            )
            .await?;

        logger.success(format!(
            "exported {} link(s) of {} to {}",
            run.links.len().yellow(),
            run.title().yellow(),
            args.output.display().yellow()
        ));
        Ok(())
    }
}
