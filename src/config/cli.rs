use crate::api::params::{parse_key_value, ParamValue};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "stock-dash")]
#[command(about = "Stock dashboard API client, static builder and dev server")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(short, long, global = true, help = "Build configuration file (TOML)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Call one backend endpoint and print the JSON body
    Api(ApiArgs),
    /// Lay out entry, chunk and asset files in the output directory
    Build,
    /// Run the development server with the configured proxy rules
    Serve {
        #[arg(long, help = "Override the configured port")]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct ApiArgs {
    #[arg(long, default_value = crate::api::DEFAULT_ORIGIN)]
    pub origin: String,

    #[arg(long, default_value = "30000")]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Endpoint {
    /// Daily up/down statistics
    DailySummary(QueryArgs),
    /// Rank stocks by change over a date range
    Screener(QueryArgs),
    /// Candles for one ticker
    Kline {
        ticker: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// All known tickers
    List,
    /// Close-price curve for one ticker
    Detail {
        ticker: String,
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct QueryArgs {
    #[arg(short = 'p', long = "param", value_parser = parse_key_value, help = "Query parameter as key=value")]
    pub params: Vec<(String, ParamValue)>,
}

impl QueryArgs {
    pub fn into_params(self) -> crate::api::params::QueryParams {
        self.params.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kline_command() {
        let cli = CliConfig::try_parse_from([
            "stock-dash",
            "api",
            "kline",
            "AAPL",
            "-p",
            "period=weekly",
            "--param",
            "start_date=2024-01-01",
            "-p",
            "code=000001",
        ])
        .unwrap();

        let Command::Api(args) = cli.command else {
            panic!("expected api command");
        };
        assert_eq!(args.origin, "http://localhost:8000");
        assert_eq!(args.timeout_ms, 30000);

        let Endpoint::Kline { ticker, query } = args.endpoint else {
            panic!("expected kline endpoint");
        };
        assert_eq!(ticker, "AAPL");
        let params = query.into_params();
        assert_eq!(params["period"], ParamValue::Str("weekly".into()));
        assert_eq!(params["start_date"], ParamValue::Str("2024-01-01".into()));
        assert_eq!(params["code"], ParamValue::Str("000001".into()));
    }

    #[test]
    fn test_parse_serve_with_global_flags() {
        let cli =
            CliConfig::try_parse_from(["stock-dash", "serve", "--port", "3000", "-v", "-c", "dash.toml"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("dash.toml")));
        assert!(matches!(cli.command, Command::Serve { port: Some(3000) }));
    }

    #[test]
    fn test_rejects_malformed_param() {
        assert!(CliConfig::try_parse_from(["stock-dash", "api", "screener", "-p", "oops"]).is_err());
    }
}
