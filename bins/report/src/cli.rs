//! Command-line arguments.

use budgetexec_core::ledger::UnitFilter;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "budgetexec")]
#[command(about = "Budget-execution reports over a ledger export")]
pub struct Cli {
    /// Ledger JSON file; overrides `source.path` from configuration
    #[arg(long, env = "BUDGETEXEC_SOURCE_FILE")]
    pub source: Option<String>,

    /// Credit-rows JSON file; overrides `source.credits_path` from configuration
    #[arg(long, env = "BUDGETEXEC_CREDITS_FILE")]
    pub credits: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Exercise, month ceiling and unit of a report.
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Exercise year
    #[arg(long)]
    pub year: i32,

    /// Last month included (1-12)
    #[arg(long, default_value = "12")]
    pub month: u8,

    /// Organizational unit code; omit or pass CONSOLIDADO for all units
    #[arg(long)]
    pub unit: Option<String>,
}

impl PeriodArgs {
    pub fn unit_filter(&self) -> UnitFilter {
        UnitFilter::from_optional(self.unit.as_deref())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Category and group totals for one period
    Demonstrativo(PeriodArgs),

    /// Totals against the same period of the prior year
    Comparativo(PeriodArgs),

    /// Per-nature breakdown of one category or group
    Detalhe {
        #[command(flatten)]
        period: PeriodArgs,

        /// Category code
        #[arg(long)]
        category: String,

        /// Group code; omit for the whole category
        #[arg(long)]
        group: Option<String>,

        /// Skip the prior-year comparison
        #[arg(long)]
        no_compare: bool,
    },

    /// Additional credits by category for one period
    Creditos(PeriodArgs),

    /// Record counts and column totals for a period and the prior year
    Resumo(PeriodArgs),

    /// Exercises, months and units with movement
    Filtros {
        /// Exercise year
        #[arg(long)]
        year: i32,

        /// Last month included (1-12)
        #[arg(long, default_value = "12")]
        month: u8,
    },

    /// One page of the filtered rows
    Linhas {
        #[command(flatten)]
        period: PeriodArgs,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page
        #[arg(long, default_value = "100")]
        per_page: u32,
    },
}
