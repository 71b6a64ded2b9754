use clap::Parser;
use std::time::Duration;
use stock_dash::config::cli::{ApiArgs, Command, Endpoint};
use stock_dash::core::dev_server;
use stock_dash::utils::error::{DashError, ErrorSeverity};
use stock_dash::utils::logger;
use stock_dash::{BuildConfig, CliConfig, LocalStorage, StaticBuilder, StockApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: CliConfig) -> Result<(), DashError> {
    match cli.command {
        Command::Api(args) => call_api(args).await,
        Command::Build => {
            let config = BuildConfig::load(cli.config.as_deref())?;
            let storage = LocalStorage::new(config.out_dir());
            let out_dir = config.out_dir();
            let manifest = StaticBuilder::new(config, storage).build().await?;

            for file in &manifest.files {
                println!(
                    "{:<6} {}",
                    format!("{:?}", file.kind),
                    out_dir.join(&file.file_name).display()
                );
            }
            println!("✅ {} files written to {}", manifest.files.len(), out_dir.display());
            Ok(())
        }
        Command::Serve { port } => {
            let config = BuildConfig::load(cli.config.as_deref())?;
            if let Some(port) = port {
                stock_dash::utils::validation::validate_range("--port", port, 1, u16::MAX)?;
            }
            dev_server::serve(&config, port).await
        }
    }
}

async fn call_api(args: ApiArgs) -> Result<(), DashError> {
    let api = StockApi::builder()
        .origin(args.origin)
        .timeout(Duration::from_millis(args.timeout_ms))
        .build()?;

    let body = match args.endpoint {
        Endpoint::DailySummary(query) => api.daily_summary(query.into_params()).await?,
        Endpoint::Screener(query) => api.screener(query.into_params()).await?,
        Endpoint::Kline { ticker, query } => api.get_kline(&ticker, query.into_params()).await?,
        Endpoint::List => api.get_list().await?,
        Endpoint::Detail { ticker, query } => {
            api.get_detail(&ticker, query.into_params()).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
