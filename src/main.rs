//! Meta search API server and command line interface.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use meta_search_api::{
    engines::ParserRegistry,
    server::{self, AppState},
    Aggregator, AggregatorConfig, FailureMode, FanOut, FetcherConfig, HttpFetcher, ResultCache,
    RetryPolicy,
};

/// Multi-engine web search aggregator
#[derive(Parser)]
#[command(name = "meta-search-api")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP search API (default)
    Serve(ServeArgs),

    /// Run one aggregated search and print the results
    Search(SearchArgs),

    /// List configured search engines
    Engines,
}

#[derive(Args)]
struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Seconds a query's results stay cached
    #[arg(long, default_value_t = 300)]
    cache_ttl: u64,

    #[command(flatten)]
    aggregation: AggregationArgs,
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    aggregation: AggregationArgs,
}

#[derive(Args)]
struct AggregationArgs {
    /// Maximum number of merged results
    #[arg(long, default_value_t = 10)]
    result_cap: usize,

    /// Skip failing engines instead of failing the whole search
    #[arg(long)]
    isolate_failures: bool,

    /// Query all engines in parallel
    #[arg(long)]
    concurrent: bool,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    /// Additional attempts after a failed fetch
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Backoff unit in milliseconds between attempts
    #[arg(long, default_value_t = 500)]
    backoff_ms: u64,
}

impl AggregationArgs {
    fn build(&self, cache: Arc<ResultCache>) -> Result<Aggregator> {
        let fetcher = HttpFetcher::new(&FetcherConfig {
            timeout: Duration::from_secs(self.timeout),
            retry: RetryPolicy {
                max_retries: self.retries,
                base_delay: Duration::from_millis(self.backoff_ms),
            },
            ..Default::default()
        })?;

        let config = AggregatorConfig {
            result_cap: self.result_cap,
            failure_mode: if self.isolate_failures {
                FailureMode::Isolate
            } else {
                FailureMode::Abort
            },
            fan_out: if self.concurrent {
                FanOut::Concurrent
            } else {
                FanOut::Sequential
            },
        };

        Ok(Aggregator::new(Arc::new(fetcher), ParserRegistry::with_defaults()?, cache).with_config(config))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"))
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or(Commands::Serve(cli.serve)) {
        Commands::Serve(args) => run_server(args).await,
        Commands::Search(args) => run_search(args).await,
        Commands::Engines => list_engines(),
    }
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let cache = Arc::new(ResultCache::new(Duration::from_secs(args.cache_ttl)));
    let aggregator = args.aggregation.build(cache)?;
    let addr = SocketAddr::new(args.host, args.port);
    server::serve(addr, AppState::new(aggregator)).await?;
    Ok(())
}

fn list_engines() -> Result<()> {
    let parsers = ParserRegistry::with_defaults()?;
    println!("Configured search engines (results merged in this order):\n");
    for target in meta_search_api::default_targets() {
        let version = parsers
            .get(&target.name)
            .map(|parser| parser.selectors().version.clone())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<8} {:<12} {:<8} {}",
            target.engine,
            target.name,
            version,
            target.engine.url_template()
        );
    }
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let cache = Arc::new(ResultCache::default());
    let aggregator = args.aggregation.build(cache)?;

    let started = std::time::Instant::now();
    let outcome = aggregator.search(&args.query).await?;
    let elapsed = started.elapsed().as_millis();

    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results in {}ms):\n",
                args.query.trim(),
                outcome.results.len(),
                elapsed
            );

            for (i, result) in outcome.results.iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   URL: {}", result.url);
                if !result.snippet.is_empty() {
                    println!("   {}", meta_search_api::truncate_snippet(&result.snippet, 150));
                }
                println!("   Site: {}", result.site);
                println!();
            }

            for warning in &outcome.warnings {
                eprintln!("Warning: {} failed: {}", warning.engine, warning.message);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Compact => {
            for result in &outcome.results {
                println!("{}\t{}\t{}", result.site, result.title, result.url);
            }
        }
    }

    Ok(())
}
