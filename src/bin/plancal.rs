use anyhow::Result;
use chrono::Utc;
use plancal::assembler::CalendarAssembler;
use plancal::cache::DiscoveryCache;
use plancal::cli::{self, CliArgs};
use plancal::client::HttpFetcher;
use plancal::config::Config;
use plancal::context::StandardContext;
use plancal::logging;
use plancal::storage::LocalStorage;
use std::env;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match cli::parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            cli::print_help("plancal");
            std::process::exit(1);
        }
    };

    if args.help {
        cli::print_help("plancal");
        return;
    }

    logging::init(args.verbose);

    if let Err(e) = run(args).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let ctx = StandardContext::new(args.root);
    let config = Config::load_or_default(&ctx)?;

    let year = config.academic_year();
    let manual = LocalStorage::load_cancelled_dates(&config.cancellations_path(&ctx)?, year);
    let cache = DiscoveryCache::load(&ctx, config.discovery_ttl());
    let output = match args.output {
        Some(path) => path,
        None => config.output_path(&ctx)?,
    };

    let fetcher = HttpFetcher::new(config.request_timeout(), config.max_retries)?;
    let mut assembler = CalendarAssembler::new(fetcher, config, manual, cache, Utc::now());

    let summary = assembler.run().await?;
    log::info!(
        "{}/{} months processed, {} events",
        summary.processed,
        summary.sources,
        summary.events
    );
    assembler.write(&output)
}
