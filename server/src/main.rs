use clap::Parser;
use log::info;
use server::network::Server;

#[derive(Parser, Debug)]
#[command(author, version, about = "Connect-5 game server", long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);

    info!("Starting Connect-5 server...");
    let mut server = Server::new(&address).await?;
    info!("Waiting for players to join...");

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
