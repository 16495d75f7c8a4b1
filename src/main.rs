//! Cosign-Guard CLI
//!
//! Runs the co-signing guard service and manages its signing key.

use clap::{Parser, Subcommand};
use cosign_guard::config::GuardConfig;
use cosign_guard::cosign::CoSigner;
use cosign_guard::crypto::KeyPair;
use cosign_guard::network::Server;
use cosign_guard::remote::HttpLedger;
use cosign_guard::service::Coordinator;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cosign-guard")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Co-signing guard for two-signature funds transfers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the guard service
    Serve {
        /// Path to the service keyfile
        #[arg(short, long)]
        keyfile: PathBuf,

        /// Path to the JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the listen address from the config
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Generate a new signing keyfile
    Keygen {
        /// Output path for the keyfile
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { output } => {
            let key_pair = KeyPair::generate();
            key_pair.save(&output)?;
            println!("Wrote keyfile {:?}", output);
            println!("Public key: {}", key_pair.public_key_hex());
            Ok(())
        }

        Commands::Serve {
            keyfile,
            config,
            listen,
        } => run_serve(&keyfile, config.as_deref(), listen),
    }
}

fn run_serve(
    keyfile: &std::path::Path,
    config_path: Option<&std::path::Path>,
    listen_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => GuardConfig::load(path)?,
        None => GuardConfig::default(),
    };
    if let Some(listen) = listen_override {
        config.listen = listen;
    }

    // Startup failures here are the only fatal errors in the service.
    let key_pair = KeyPair::load(keyfile)?;
    log::info!("Loaded signing key, public key {}", key_pair.public_key_hex());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let remote = HttpLedger::new(config.ledger_url.clone(), config.fetch_timeout())?;
        log::info!("Remote ledger at {}", remote.base_url());

        let coordinator = Arc::new(Coordinator::new(
            remote,
            CoSigner::new(key_pair),
            config.park_unverified,
        ));

        let server = Server::bind(&config.listen).await?;

        // Handle Ctrl+C; the pending ledger is soft state and is simply
        // discarded.
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            log::info!("Shutting down guard");
            std::process::exit(0);
        });

        server.run(coordinator).await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
