use clap::{Parser, Subcommand};
use rst_common::with_tokio::tokio;

use prople_courierd::errors::CourierdError;
use prople_courierd::svc::Server;

#[derive(Parser)]
#[command(name = "courierd")]
#[command(version = "1.0")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "serve")]
    #[command(about = "Running the agent wire endpoint and the admin API")]
    Serve {
        #[arg(short, long, value_name = "FILE")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CourierdError> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve { config } => {
            let server = Server::new(config.to_owned());
            server.serve().await?;
        }
    }

    Ok(())
}
