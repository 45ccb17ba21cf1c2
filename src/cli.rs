use crate::config;
use crate::dispatch::Dispatcher;
use crate::logging::{self, LogOptions};
use crate::opener::Opener;
use crate::search::{CancelHandle, ProviderRegistry, SearchRequest};
use crate::ui::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "ferret")]
#[command(about = "Search AnswerHub, GitHub and Slack from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a provider by keyword
    #[command(alias = "s")]
    Search(SearchArgs),

    /// List the registered providers
    Providers,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Provider name (see `ferret providers`)
    #[arg(value_name = "PROVIDER")]
    pub provider: String,

    /// Search keyword; multiple words are joined with spaces
    #[arg(value_name = "KEYWORD", required = true, num_args = 1..)]
    pub keyword: Vec<String>,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<i64>,

    /// Results per page
    #[arg(long)]
    pub limit: Option<i64>,

    /// Open result # with FERRET_GOTO_CMD instead of printing
    #[arg(short, long, value_name = "N")]
    pub goto: Option<i64>,

    /// Abort the search after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Extra search option (repeatable), e.g. `-o page=2`
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,
}

impl SearchArgs {
    /// Merge the option bag with explicit flags; flags win
    pub fn request(&self) -> SearchRequest {
        let bag: BTreeMap<String, String> = self.options.iter().cloned().collect();
        let mut request = SearchRequest::from_options(self.keyword.join(" "), &bag);
        if let Some(page) = self.page {
            request = request.with_page(page);
        }
        if let Some(limit) = self.limit {
            request = request.with_limit(limit);
        }
        if let Some(goto) = self.goto {
            request = request.with_goto(goto);
        }
        request
    }

    fn cancel_handle(&self) -> CancelHandle {
        match self.timeout {
            Some(secs) => CancelHandle::new().with_timeout(Duration::from_secs(secs)),
            None => CancelHandle::new(),
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse arguments, build the registry and run the selected command
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = logging::init(&LogOptions::from_env(cli.debug))?;
    let settings = config::load()?;
    let registry = Arc::new(
        ProviderRegistry::with_defaults(&settings).context("Failed to register providers")?,
    );

    match cli.command {
        Commands::Providers => {
            let mut stdout = std::io::stdout().lock();
            ui::render_providers(&registry.descriptors(), &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Search(args) => {
            let dispatcher = Dispatcher::new(registry, Opener::from_settings(&settings));
            let request = args.request();
            let cancel = args.cancel_handle();

            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received, cancelling search");
                    on_interrupt.cancel();
                }
            });

            let mut stdout = std::io::stdout();
            Ok(dispatcher
                .run(&args.provider, &request, &cancel, args.format, &mut stdout)
                .await)
        }
    }
}
