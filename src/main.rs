use clap::Parser;
use std::io;

mod args;
mod compression;
mod config;
mod content_type;
mod error;
mod handler;
mod listing;
mod logging;
mod request;
mod resolver;
mod response;
mod server;

use args::Args;
use config::ServerConfig;
use logging::setup_logging;
use server::start_server;

fn main() -> io::Result<()> {
    let args = Args::parse();
    setup_logging();
    let config = ServerConfig::from_args(&args)?;
    start_server(config)
}
