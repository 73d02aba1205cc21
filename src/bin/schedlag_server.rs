//! schedlag API Server binary
//!
//! HTTP front end for the scheduling lag analysis.

use std::path::PathBuf;

use clap::Parser;
use schedlag::api::{run_api_server, server::ApiConfig};
use schedlag::cli::load_config;

#[derive(Parser, Debug)]
#[command(name = "schedlag-server")]
#[command(version)]
#[command(about = "schedlag API Server - HTTP upload and download of scheduling lag reports")]
#[command(long_about = r#"
schedlag API Server

Endpoints:
  - POST /api/v1/analyze?file_name=<name>  - Analyze an export (raw bytes as body)
  - GET  /api/v1/reports/{run_id}/{report_file}  - Download a generated report

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Features:
  - Uploads up to 25 MiB
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs

Example usage:
  schedlag-server                            # Start on localhost:8080
  schedlag-server --host 0.0.0.0 --port 3000 --output-dir /srv/reports

  curl -X POST "http://localhost:8080/api/v1/analyze?file_name=lag.csv" \
    --data-binary @lag.csv
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SCHEDLAG_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SCHEDLAG_PORT")]
    port: u16,

    /// Directory for generated reports (defaults to the system temp dir)
    #[arg(short, long, env = "SCHEDLAG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// YAML analysis configuration
    #[arg(short, long, env = "SCHEDLAG_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        output_dir: args.output_dir.unwrap_or_else(std::env::temp_dir),
        analysis: load_config(args.config.as_deref())?,
    };

    run_api_server(config).await
}
