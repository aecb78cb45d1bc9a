use clap::Parser;
use std::path::PathBuf;

use crate::compression::CompressionMode;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Compression applied to every response
    #[arg(short, long, value_enum, ignore_case = true, default_value = "gzip")]
    pub algorithm: CompressionMode,

    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(default_value = ".")]
    pub root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["dirserve"]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.algorithm, CompressionMode::Gzip);
        assert_eq!(args.root, PathBuf::from("."));
    }

    #[test]
    fn short_flags_and_root() {
        let args = Args::parse_from(["dirserve", "-p", "9000", "-a", "BROTLI", "/srv/www"]);
        assert_eq!(args.port, 9000);
        assert_eq!(args.algorithm, CompressionMode::Brotli);
        assert_eq!(args.root, PathBuf::from("/srv/www"));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(Args::try_parse_from(["dirserve", "-a", "zstd"]).is_err());
    }
}
