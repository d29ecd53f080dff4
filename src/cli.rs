use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::composition::CompositionStrategy;

#[derive(Parser)]
#[command(name = "creative-check")]
#[command(about = "Check an advertising creative against the design guideline")]
pub struct Cli {
    /// Repeat for more detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate one PNG/JPEG creative and print the report
    Check {
        image: PathBuf,
        /// Guideline revision to use instead of the built-in one
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Override the configured mockup detection strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
    /// Print the active category catalog in match order
    Catalog {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Geometric,
    VisionModel,
}

impl From<StrategyArg> for CompositionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Geometric => CompositionStrategy::Geometric,
            StrategyArg::VisionModel => CompositionStrategy::VisionModel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_overrides() {
        let cli = Cli::try_parse_from([
            "creative-check",
            "-v",
            "check",
            "banner.png",
            "--json",
            "--strategy",
            "vision-model",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Check {
                image,
                json,
                strategy,
                config,
            } => {
                assert_eq!(image, PathBuf::from("banner.png"));
                assert!(json);
                assert!(config.is_none());
                assert!(matches!(strategy, Some(StrategyArg::VisionModel)));
            }
            Commands::Catalog { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn check_requires_an_image() {
        assert!(Cli::try_parse_from(["creative-check", "check"]).is_err());
    }
}
