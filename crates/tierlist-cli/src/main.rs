//! tierlist — seed a record store and query dataset-relative recipe tiers.
//!
//! # Usage
//!
//! ```text
//! tierlist import --file records.json
//! tierlist search --scope public --attribute AGI --sort purity --take 20
//! tierlist top-role fighter --limit 10
//! tierlist analyze --json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use tierlist_engine::{Role, TierLabel};
use tierlist_search::SortField;

mod commands;

#[derive(Parser)]
#[command(
    name = "tierlist",
    about = "Recipe tierlist — metrics and dynamic tiering",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to tierlist.toml (default: ./tierlist.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the record store path from the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print results as JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load records from a JSON array into the store.
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Search a scope with filters, sorting and pagination.
    Search(SearchArgs),
    /// Show one record with its metrics (tier is always Unknown).
    Show { id: u64 },
    /// Most efficient records of one role partition.
    TopRole {
        /// fighter, crafter or universal.
        role: Role,
        #[arg(long, default_value = "public")]
        scope: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Records with the strongest contribution of one attribute.
    TopAttr {
        /// Base attribute symbol, e.g. AGI.
        symbol: String,
        #[arg(long, default_value = "public")]
        scope: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Per-attribute statistics over a scope.
    Analyze {
        #[arg(long, default_value = "public")]
        scope: String,
    },
    /// One representative variant per recipe name.
    Representatives {
        #[arg(long, default_value = "public")]
        scope: String,
    },
    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(long, default_value = "public")]
    scope: String,
    /// Name substring.
    #[arg(long)]
    text: Option<String>,
    /// Ingredient substring.
    #[arg(long)]
    ingredient: Option<String>,
    /// Required attribute symbol (any tier).
    #[arg(long)]
    attribute: Option<String>,
    #[arg(long)]
    max_cost: Option<u32>,
    #[arg(long)]
    min_purity: Option<f64>,
    /// Low, Mid, Best or Unknown.
    #[arg(long)]
    tier: Option<TierLabel>,
    #[arg(long)]
    min_efficiency: Option<f64>,
    #[arg(long, default_value = "efficiency")]
    sort: SortField,
    /// Sort ascending instead of descending.
    #[arg(long)]
    asc: bool,
    #[arg(long, default_value = "0")]
    skip: usize,
    #[arg(long)]
    take: Option<usize>,
    /// Fighter preference for this query only.
    #[arg(long, requires = "crafter")]
    fighter: Option<f64>,
    /// Crafter preference for this query only.
    #[arg(long, requires = "fighter")]
    crafter: Option<f64>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a tierlist.toml with default values.
    Init {
        #[arg(short, long, default_value = "tierlist.toml")]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let output = commands::Output { json: cli.json };
    let open = || commands::Context::open(cli.config.as_deref(), cli.db.clone());

    match cli.command {
        Commands::Config {
            action: ConfigAction::Init { path, force },
        } => commands::config::init(&path, force),
        Commands::Import { file } => commands::import::run(&open()?, &file).await,
        Commands::Search(args) => {
            let (scope, query) = args.into_query_parts();
            commands::query::search(&open()?, &scope, &query, output).await
        }
        Commands::Show { id } => commands::query::show(&open()?, id, output).await,
        Commands::TopRole { role, scope, limit } => {
            commands::query::top_role(&open()?, &scope, role, limit, output).await
        }
        Commands::TopAttr { symbol, scope, limit } => {
            commands::query::top_attr(&open()?, &scope, &symbol, limit, output).await
        }
        Commands::Analyze { scope } => commands::query::analyze(&open()?, &scope, output).await,
        Commands::Representatives { scope } => {
            commands::query::representatives(&open()?, &scope, output).await
        }
    }
}

impl SearchArgs {
    fn into_query_parts(self) -> (String, tierlist_search::SearchQuery) {
        use tierlist_core::{RecordFilter, RolePreferences};

        let preferences = match (self.fighter, self.crafter) {
            (Some(f), Some(c)) => Some(RolePreferences::new(f, c)),
            _ => None,
        };
        let query = tierlist_search::SearchQuery {
            filter: RecordFilter {
                text: self.text,
                ingredient: self.ingredient,
                attribute: self.attribute,
                cost_ceiling: self.max_cost,
            },
            purity_floor: self.min_purity,
            tier_label: self.tier,
            efficiency_floor: self.min_efficiency,
            sort: self.sort,
            descending: !self.asc,
            skip: self.skip,
            take: self.take,
            preferences,
        };
        (self.scope, query)
    }
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,tierlist=debug"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
