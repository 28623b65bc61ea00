//! ==============================================================================
//! cli.rs - command line surface
//! ==============================================================================
//!
//! usage:
//!     tempreport --id=123456789 --host=lever.cs.ucla.edu --log=report.txt 18000
//!                [--period=2] [--scale=C] [--config=tempreport.toml]
//!
//! everything is validated here, before any resource is acquired.
//!
//! ==============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::domain::Scale;

/// Remote-controllable temperature reporting client
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 9-digit identification number sent to the server on connect
    #[arg(long, value_parser = parse_id)]
    pub id: String,

    /// Server host name or address
    #[arg(long)]
    pub host: String,

    /// File every report and received command is appended to
    #[arg(long)]
    pub log: PathBuf,

    /// Server port (must be above 1024)
    #[arg(value_parser = clap::value_parser!(u16).range(1025..))]
    pub port: u16,

    /// Seconds between readings
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub period: u64,

    /// Temperature scale, C or F
    #[arg(long, default_value = "F")]
    pub scale: Scale,

    /// Sensor / logging configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_id(s: &str) -> Result<String, String> {
    if s.len() == 9 && s.bytes().all(|b| b.is_ascii_digit()) {
        Ok(s.to_string())
    } else {
        Err("id must be 9 digits".to_string())
    }
}

/// validated per-run settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub log_path: PathBuf,
    pub period_secs: u64,
    pub scale: Scale,
}

impl From<&Args> for ClientConfig {
    fn from(args: &Args) -> Self {
        Self {
            id: args.id.clone(),
            host: args.host.clone(),
            port: args.port,
            log_path: args.log.clone(),
            period_secs: args.period,
            scale: args.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["tempreport"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_minimal_invocation_uses_defaults() {
        let args = parse(&["--id=123456789", "--host=localhost", "--log=out.txt", "18000"]).unwrap();
        let config = ClientConfig::from(&args);
        assert_eq!(config.id, "123456789");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 18000);
        assert_eq!(config.log_path, PathBuf::from("out.txt"));
        assert_eq!(config.period_secs, 1);
        assert_eq!(config.scale, Scale::Fahrenheit);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_optional_flags() {
        let args = parse(&[
            "--id=000000001",
            "--host=example.org",
            "--log=out.txt",
            "--period=5",
            "--scale=C",
            "2000",
        ])
        .unwrap();
        assert_eq!(args.period, 5);
        assert_eq!(args.scale, Scale::Celsius);
        assert_eq!(args.port, 2000);
    }

    #[test]
    fn test_missing_required_parameters() {
        assert!(parse(&["--host=localhost", "--log=out.txt", "18000"]).is_err());
        assert!(parse(&["--id=123456789", "--log=out.txt", "18000"]).is_err());
        assert!(parse(&["--id=123456789", "--host=localhost", "18000"]).is_err());
        assert!(parse(&["--id=123456789", "--host=localhost", "--log=out.txt"]).is_err());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let base = ["--host=localhost", "--log=out.txt"];
        let bad = [
            vec!["--id=12345678", "18000"],
            vec!["--id=12345678a", "18000"],
            vec!["--id=123456789", "1024"],
            vec!["--id=123456789", "--period=0", "18000"],
            vec!["--id=123456789", "--scale=K", "18000"],
        ];
        for extra in bad {
            let mut argv: Vec<&str> = base.to_vec();
            argv.extend(extra.iter().copied());
            assert!(parse(&argv).is_err(), "accepted {:?}", argv);
        }
    }
}
