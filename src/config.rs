use std::fs;
use std::io;
use std::path::PathBuf;

use crate::args::Args;
use crate::compression::CompressionMode;

/// Settings fixed at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Canonical root directory
    pub root: PathBuf,
    pub compression: CompressionMode,
    pub bind: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_args(args: &Args) -> io::Result<Self> {
        let root = fs::canonicalize(&args.root).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("cannot open root directory {}: {}", args.root.display(), e),
            )
        })?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }

        Ok(Self {
            root,
            compression: args.algorithm,
            bind: args.bind.clone(),
            port: args.port,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
