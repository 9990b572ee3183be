use clap::Parser;
use minerva::cli::{self, Cli};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "minerva=warn".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(Cli::parse()).await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
