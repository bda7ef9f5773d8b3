use clap::Parser;
use anyhow::Result;
use chrono::Datelike;
use tracing::{info, error};

use cninfo_reports::{
    classifier,
    cli::Cli,
    cninfo::CninfoClient,
    config::Config,
    orchestrator::ReportFetcher,
    stocks::StockDatabase,
    storage::Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "cninfo_reports=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let file_appender = tracing_appender::rolling::never(".", "cninfo-reports.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env())
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(stocks) = &cli.stocks {
        config.stocks_path = stocks.clone();
    }
    config.validate()?;

    let database = StockDatabase::load(&config.stocks_path)?;

    let issuer = match classifier::classify(&database, &cli.stock) {
        Ok(issuer) => issuer,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let output_dir = cli.resolve_output_dir();
    println!("📊 Found stock: {} ({}) [{}]", issuer.code, issuer.name, issuer.market);
    println!("📁 Output directory: {}", output_dir.display());

    let storage = Storage::new(output_dir)?;
    let client = CninfoClient::new(&config)?;
    let fetcher = ReportFetcher::new(client, storage, &config);

    let current_year = chrono::Local::now().year();
    let outcome = fetcher.run(issuer, current_year).await;
    info!("Downloaded {} reports for {}", outcome.files.len(), outcome.stock_code);

    println!("\n{}", "=".repeat(50));
    println!("✅ Downloaded {} reports", outcome.files.len());
    println!("📁 Location: {}", outcome.output_dir.display());
    println!("\n📄 Files:");
    for file in &outcome.files {
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("  {}", name);
    }

    // Machine-readable result for the upload step
    println!("\n---JSON_OUTPUT---");
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
