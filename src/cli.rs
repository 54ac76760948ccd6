//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_BLOCK_SIZE: u16 = 128;
pub const DEFAULT_PORT: u16 = 2534;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Block size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub blocksize: u16,

    /// IP address to listen on
    #[arg(short, long, default_value = "0.0.0.0")]
    pub ip: String,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// File to serve
    pub file: PathBuf,
}

impl Cli {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
