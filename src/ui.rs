use crate::search::{ProviderInfo, ResultItem};
use anyhow::Result;
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use std::io::Write;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Write search results in the requested format
pub fn render(results: &[ResultItem], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(results, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

fn render_table(results: &[ResultItem], out: &mut dyn Write) -> Result<()> {
    if results.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }

    let with_dates = results.iter().any(|r| r.date.is_some());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["#", "TITLE"];
    if with_dates {
        header.push("DATE");
    }
    table.set_header(header);

    for (idx, item) in results.iter().enumerate() {
        let mut row = vec![(idx + 1).to_string(), item.description.clone()];
        if with_dates {
            row.push(
                item.date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            );
        }
        table.add_row(row);
    }

    writeln!(out, "{table}")?;
    Ok(())
}

/// Write the provider listing, one row per descriptor
pub fn render_providers(providers: &[ProviderInfo], out: &mut dyn Write) -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["NAME", "TITLE", "ENABLED"]);
    for info in providers {
        table.add_row(vec![
            info.name,
            info.title,
            if info.enabled { "yes" } else { "no" },
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}
