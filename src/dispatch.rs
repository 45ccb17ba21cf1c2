//! Provider selection and result routing.
//!
//! The dispatcher is UI-agnostic: [`Dispatcher::execute`] returns an [`Outcome`],
//! while [`Dispatcher::run`] renders it and maps failures to an exit code.

use crate::opener::{Opener, OpenerError};
use crate::search::{
    CancelHandle, ErrorKind, ProviderRegistry, RegistryError, ResultItem, SearchError,
    SearchRequest,
};
use crate::ui::{self, OutputFormat};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Results to be rendered
    Listed(Vec<ResultItem>),
    /// The opener was launched on this link
    Opened { link: String },
}

/// Dispatch errors
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to search {provider} due to {source}")]
    Search {
        provider: String,
        #[source]
        source: SearchError,
    },

    #[error("invalid result # to go. It should be between 1 and {count}")]
    InvalidGoto { index: i64, count: usize },

    #[error(transparent)]
    Opener(#[from] OpenerError),

    #[error("failed to write output: {0}")]
    Output(#[from] anyhow::Error),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Registry(_) => ErrorKind::Registry,
            DispatchError::Search { source, .. } => source.kind(),
            DispatchError::InvalidGoto { .. }
            | DispatchError::Opener(_)
            | DispatchError::Output(_) => ErrorKind::Usage,
        }
    }
}

pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    opener: Opener,
}

impl Dispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, opener: Opener) -> Self {
        Self { registry, opener }
    }

    /// Resolve `provider`, run the search and open the `goto` result if requested
    pub async fn execute(
        &self,
        provider: &str,
        request: &SearchRequest,
        cancel: &CancelHandle,
    ) -> Result<Outcome, DispatchError> {
        let searcher = self.registry.lookup(provider)?;

        tracing::info!(
            provider = %provider,
            keyword = %request.keyword,
            page = request.page,
            limit = request.limit,
            "dispatching search"
        );

        let mut results = searcher
            .search(cancel, request)
            .await
            .map_err(|source| DispatchError::Search {
                provider: provider.to_string(),
                source,
            })?;

        let Some(index) = request.goto else {
            return Ok(Outcome::Listed(results));
        };

        let count = results.len();
        let position = usize::try_from(index)
            .ok()
            .filter(|i| (1..=count).contains(i))
            .ok_or(DispatchError::InvalidGoto { index, count })?;

        let link = results.swap_remove(position - 1).link;
        self.opener.open(&link).await?;
        Ok(Outcome::Opened { link })
    }

    /// Execute and render, reporting any failure as one line on stderr
    pub async fn run(
        &self,
        provider: &str,
        request: &SearchRequest,
        cancel: &CancelHandle,
        format: OutputFormat,
        out: &mut dyn Write,
    ) -> ExitCode {
        let result = match self.execute(provider, request, cancel).await {
            Ok(Outcome::Listed(results)) => {
                ui::render(&results, format, out).map_err(DispatchError::Output)
            }
            Ok(Outcome::Opened { .. }) => Ok(()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::debug!(kind = ?e.kind(), error = %e, "dispatch failed");
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    }
}
