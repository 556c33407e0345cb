use clap::Parser;
use client::input::InputManager;
use client::network::{Client, ClientConfig};
use client::rendering::Renderer;
use log::info;
use std::time::Duration;
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[command(author, version, about = "Connect-5 game client", long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(default_value = "8080")]
    port: u16,

    /// Player name (asked interactively when omitted)
    #[arg(short, long)]
    name: Option<String>,

    /// Seconds to wait for the connection to open
    #[arg(long, default_value = "5")]
    connect_timeout: u64,

    /// Seconds to wait for any server message before giving up
    #[arg(long, default_value = "600")]
    receive_timeout: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = ClientConfig {
        host: args.host,
        port: args.port,
        name: args.name,
        connect_timeout: Duration::from_secs(args.connect_timeout),
        receive_timeout: Duration::from_secs(args.receive_timeout),
    };
    info!("Server: {}", config.address());

    let stdin = std::io::stdin();
    let mut client: Client<TcpStream, _, _> = Client::new(
        config,
        InputManager::new(stdin.lock()),
        Renderer::new(std::io::stdout()),
    );
    client.run().await?;

    Ok(())
}
