//! Budgetexec report runner
//!
//! Loads configuration, builds the report engine over a ledger JSON export
//! and prints the requested report as JSON.

mod cli;
mod source;

use std::sync::Arc;

use anyhow::Context;
use budgetexec_core::{EngineConfig, ReportEngine};
use budgetexec_shared::AppConfig;
use budgetexec_shared::types::PageRequest;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::source::JsonFileSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budgetexec=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;

    let path = cli.source.unwrap_or_else(|| config.source.path.clone());
    let credits_path = cli.credits.or_else(|| config.source.credits_path.clone());
    let engine_config = EngineConfig::from(&config);
    info!(
        path = %path,
        credits_path = ?credits_path,
        validity_hours = config.cache.validity_hours,
        timeout_secs = config.retrieval.timeout_secs,
        "engine configured"
    );

    let source = JsonFileSource::new(path).with_credits(credits_path);
    let engine = ReportEngine::new(Arc::new(source), engine_config);
    run(&engine, cli.command).await?;

    let stats = engine.cache_stats();
    info!(entries = stats.entries, "done");
    Ok(())
}

async fn run(engine: &ReportEngine, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Demonstrativo(period) => print_json(
            &engine
                .get_demonstrativo(period.year, period.month, &period.unit_filter())
                .await?,
        ),
        Command::Comparativo(period) => print_json(
            &engine
                .get_comparative_demonstrativo(period.year, period.month, &period.unit_filter())
                .await?,
        ),
        Command::Detalhe {
            period,
            category,
            group,
            no_compare,
        } => print_json(
            &engine
                .get_group_detail(
                    &category,
                    group.as_deref(),
                    period.year,
                    period.month,
                    &period.unit_filter(),
                    !no_compare,
                )
                .await?,
        ),
        Command::Creditos(period) => print_json(
            &engine
                .get_credits(period.year, period.month, &period.unit_filter())
                .await?,
        ),
        Command::Resumo(period) => print_json(
            &engine
                .get_summary(period.year, period.month, &period.unit_filter())
                .await?,
        ),
        Command::Filtros { year, month } => {
            print_json(&engine.get_available_filters(year, month).await?)
        }
        Command::Linhas {
            period,
            page,
            per_page,
        } => print_json(
            &engine
                .get_rows_page(
                    period.year,
                    period.month,
                    &period.unit_filter(),
                    &PageRequest { page, per_page },
                )
                .await?,
        ),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
