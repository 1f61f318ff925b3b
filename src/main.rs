//! uwb-bridge binary entry point.

use std::sync::Arc;

use tracing::info;
use uwb_bridge::api::AppState;
use uwb_bridge::cli;
use uwb_bridge::config::Config;
use uwb_bridge::ranging::RangingBackend;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("try 'uwb-bridge --help' for more information");
            return std::process::ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return std::process::ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return std::process::ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    uwb_bridge::logging::init_with_filter(config.log_filter());

    info!("uwb-bridge v{}", env!("CARGO_PKG_VERSION"));

    let backend = match config.to_sim_backend() {
        Ok(backend) => Arc::new(backend) as Arc<dyn RangingBackend>,
        Err(e) => {
            eprintln!("error: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            eprintln!("error: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        peers = config.sim.peers.len(),
        interval_ms = config.sim.report_interval_ms,
        "Simulated ranging backend initialized"
    );

    let state = AppState::with_backend(backend);

    if let Err(e) = uwb_bridge::api::serve_with_state(server_config, state).await {
        eprintln!("server error: {}", e);
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}
