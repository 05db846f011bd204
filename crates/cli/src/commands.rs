//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use folio_core::{
    Asset, AssetClass, AssetFilter, Dividend, PortfolioSummary, SortKey, SortOrder,
    dividends_by_month, sort_assets,
};
use folio_http::client::credentials::FileStorage;
use folio_http::types::SignInRequest;
use folio_http::FolioClient;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{self, CliConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session tokens
    Signin {
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,

        /// Keep the session across restarts
        #[arg(long)]
        keep_connected: bool,
    },

    /// Revoke the session and forget the stored tokens
    Signout,

    /// Show whether a session is stored
    Status,

    /// Show the signed-in user's profile
    Profile,

    /// List subscription plans
    Plans,

    /// Stock lookup
    Stock {
        #[command(subcommand)]
        command: StockCommands,
    },

    /// Portfolio views
    Portfolio {
        #[command(subcommand)]
        command: PortfolioCommands,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum StockCommands {
    /// Search tickers and company names
    Search { query: String },

    /// Latest quote for a ticker
    Quote { ticker: String },
}

#[derive(Subcommand)]
pub enum PortfolioCommands {
    /// Totals and allocation by asset class
    Summary {
        /// Read assets from a local JSON file instead of the API
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Asset table with filtering and sorting
    Assets {
        /// Read assets from a local JSON file instead of the API
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only this asset class (stock, fii, etf, ...)
        #[arg(long)]
        class: Option<AssetClass>,

        /// Match ticker or name
        #[arg(long)]
        search: Option<String>,

        /// Minimum market value
        #[arg(long)]
        min_value: Option<Decimal>,

        /// ticker, name, quantity, value, pl or return
        #[arg(long, default_value = "value")]
        sort: SortKey,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
    },

    /// Dividends received per month
    Dividends {
        /// Read dividends from a local JSON file instead of the API
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Buy, hold and sell recommendations
    Recommendations,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Output file path (defaults to <config dir>/folio/config.toml)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        // Neither config helpers nor local files need the API
        let command = match self {
            Self::Config { command } => return command.execute(),
            Self::Portfolio { command } if command.is_offline() => {
                return command.execute_offline();
            }
            other => other,
        };

        let config = CliConfig::load(config_path.as_deref())?;
        let client = connect(&config)?;

        match command {
            Self::Signin {
                email,
                password,
                keep_connected,
            } => {
                client
                    .sign_in(&SignInRequest {
                        email: email.clone(),
                        password,
                        keep_connected,
                    })
                    .await?;
                println!("Signed in as {email}");
                Ok(())
            }
            Self::Signout => {
                client.sign_out().await?;
                println!("Signed out");
                Ok(())
            }
            Self::Status => {
                let signed_in = client.is_authenticated()?;
                let keep = client.credentials().keep_connected()?;
                println!("API:            {}", client.base_url());
                println!("Signed in:      {}", if signed_in { "yes" } else { "no" });
                println!("Keep connected: {}", if keep { "yes" } else { "no" });
                Ok(())
            }
            Self::Profile => print_json(&client.profile().await?),
            Self::Plans => {
                for plan in client.plans().await? {
                    let marker = if plan.highlighted { "*" } else { " " };
                    println!(
                        "{marker} {:<12} {:<20} {:>10}/mo",
                        plan.id, plan.name, plan.monthly_price
                    );
                }
                Ok(())
            }
            Self::Stock { command } => command.execute(&client).await,
            Self::Portfolio { command } => command.execute(&client).await,
            Self::Config { command } => command.execute(),
        }
    }
}

impl StockCommands {
    async fn execute(self, client: &FolioClient) -> Result<()> {
        match self {
            Self::Search { query } => {
                let matches = client.search_stocks(&query).await?;
                if matches.is_empty() {
                    println!("No matches for '{query}'");
                }
                for hit in matches {
                    println!(
                        "{:<8} {} {}",
                        hit.ticker,
                        hit.name,
                        hit.exchange.map(|e| format!("({e})")).unwrap_or_default()
                    );
                }
                Ok(())
            }
            Self::Quote { ticker } => {
                let quote = client.quote(&ticker).await?;
                println!(
                    "{} {} {} ({}%)",
                    quote.ticker, quote.currency, quote.price, quote.change_pct
                );
                Ok(())
            }
        }
    }
}

impl PortfolioCommands {
    const fn is_offline(&self) -> bool {
        matches!(
            self,
            Self::Summary { file: Some(_) }
                | Self::Assets { file: Some(_), .. }
                | Self::Dividends { file: Some(_) }
        )
    }

    fn execute_offline(self) -> Result<()> {
        match self {
            Self::Summary { file: Some(file) } => {
                let assets = load_assets(&file)?;
                print_summary(&PortfolioSummary::from_assets(&assets)?);
                Ok(())
            }
            Self::Assets {
                file: Some(file),
                class,
                search,
                min_value,
                sort,
                order,
            } => {
                let assets = load_assets(&file)?;
                let filter = AssetFilter {
                    class,
                    text: search,
                    min_market_value: min_value,
                };
                print_assets(&assets, &filter, sort, order)
            }
            Self::Dividends { file: Some(file) } => {
                let dividends: Vec<Dividend> = read_json(&file)?;
                print_dividends(&dividends)
            }
            _ => bail!("command needs the API"),
        }
    }

    async fn execute(self, client: &FolioClient) -> Result<()> {
        match self {
            Self::Summary { .. } => {
                print_summary(&client.portfolio_summary().await?);
                Ok(())
            }
            Self::Assets {
                class,
                search,
                min_value,
                sort,
                order,
                ..
            } => {
                let assets = client.assets().await?;
                let filter = AssetFilter {
                    class,
                    text: search,
                    min_market_value: min_value,
                };
                print_assets(&assets, &filter, sort, order)
            }
            Self::Dividends { .. } => {
                print_dividends(&client.dividends().await?)
            }
            Self::Recommendations => {
                for rec in client.recommendations().await? {
                    println!("{:<8} {:<5} {}", rec.ticker, rec.action.as_str(), rec.rationale);
                }
                Ok(())
            }
        }
    }
}

impl ConfigCommands {
    fn execute(self) -> Result<()> {
        match self {
            Self::Init { output, force } => {
                let path = match output {
                    Some(path) => path,
                    None => config::default_config_path()
                        .context("no configuration directory on this platform")?,
                };

                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }

                config::generate_default_config(&path)?;
                info!(path = %path.display(), "wrote default configuration");
                println!("Wrote {}", path.display());
                Ok(())
            }
        }
    }
}

/// Build a client whose session survives between invocations
fn connect(config: &CliConfig) -> Result<FolioClient> {
    let session_path = config.session_path();
    debug!(path = %session_path.display(), "opening session file");
    let storage = FileStorage::open(&session_path)
        .with_context(|| format!("failed to open session file {}", session_path.display()))?;

    Ok(FolioClient::builder(config.client.clone())
        .storage(Arc::new(storage))
        .build()?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Read a local asset list, rejecting positions the API would not accept
fn load_assets(path: &Path) -> Result<Vec<Asset>> {
    let assets: Vec<Asset> = read_json(path)?;
    for asset in &assets {
        asset
            .validate()
            .with_context(|| format!("invalid asset {} in {}", asset.ticker, path.display()))?;
    }
    Ok(assets)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(summary: &PortfolioSummary) {
    println!("Assets:       {}", summary.asset_count);
    println!("Invested:     {}", summary.total_invested);
    println!("Market value: {}", summary.market_value);
    println!("Profit/loss:  {} ({}%)", summary.profit_loss, summary.return_pct);
    for slice in &summary.allocation {
        println!(
            "  {:<18} {:>14} {:>7}%",
            slice.class.as_str(),
            slice.market_value,
            slice.percentage
        );
    }
}

fn print_assets(
    assets: &[Asset],
    filter: &AssetFilter,
    key: SortKey,
    order: SortOrder,
) -> Result<()> {
    let mut rows: Vec<Asset> = filter.apply(assets).into_iter().cloned().collect();
    sort_assets(&mut rows, key, order);

    for asset in &rows {
        println!(
            "{:<8} {:<18} {:>10} {:>14} {:>12} {:>8}%",
            asset.ticker,
            asset.class.as_str(),
            asset.quantity,
            asset.market_value()?,
            asset.profit_loss()?,
            asset.return_pct()?
        );
    }
    Ok(())
}

fn print_dividends(dividends: &[Dividend]) -> Result<()> {
    for month in dividends_by_month(dividends)? {
        println!("{}-{:02} {:>12}", month.year, month.month, month.total);
    }
    Ok(())
}
