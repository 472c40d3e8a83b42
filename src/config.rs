use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// Command-line configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "pulse-metrics")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to bind the HTTP listener to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
