//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::Parser;

/// Keymaster - keeps an installed application current and under remote control
#[derive(Parser, Debug)]
#[command(name = "keymaster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to a keymaster.yaml config file
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Run one update check and one control poll, then exit
    #[arg(long)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["keymaster"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.once);
    }

    #[test]
    fn test_flags() {
        let cli =
            Cli::try_parse_from(["keymaster", "-vv", "--once", "--config", "/etc/km.yaml"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.once);
        assert_eq!(cli.config.as_deref().map(|p| p.as_str()), Some("/etc/km.yaml"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["keymaster", "--forever"]).is_err());
    }
}
