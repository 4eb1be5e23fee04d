// src/cli/mod.rs - CLI definition (clap derive)

pub mod chat;

use clap::{Parser, Subcommand};

use crate::coach::prompts::CoachingMode;

#[derive(Parser)]
#[command(name = "beergame-coach", about = "Beer Game coaching assistant", version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive coaching session in the terminal (default)
    Chat(ChatArgs),
    /// Serve the session API for a web front end
    Serve {
        /// Port to listen on (overrides [api] port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the instruction template for a coaching mode
    Prompts {
        /// qualitative or quantitative
        #[arg(long, value_parser = parse_mode)]
        mode: Option<CoachingMode>,
    },
}

#[derive(clap::Args, Clone, Default)]
pub struct ChatArgs {
    /// Coaching mode: qualitative or quantitative (overrides [coach] mode)
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<CoachingMode>,
    /// Class section, e.g. "OPMGT 301 A"
    #[arg(long)]
    pub section: Option<String>,
    /// Canvas group number
    #[arg(short = 'g', long, visible_alias = "group")]
    pub participant: Option<String>,
    /// Beer Game role: Retailer, Wholesaler, Distributor, Factory
    #[arg(short, long)]
    pub role: Option<String>,
    /// Save after every reply (qualitative mode; quantitative always saves)
    #[arg(long)]
    pub autosave: bool,
}

fn parse_mode(s: &str) -> Result<CoachingMode, String> {
    CoachingMode::parse(s).ok_or_else(|| format!("unknown mode '{s}' (qualitative, quantitative)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_args() {
        let cli = Cli::parse_from([
            "beergame-coach",
            "chat",
            "--mode",
            "quantitative",
            "--section",
            "OPMGT 301 A",
            "--participant",
            "12",
            "-r",
            "Retailer",
        ]);
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.mode, Some(CoachingMode::Quantitative));
                assert_eq!(args.section.as_deref(), Some("OPMGT 301 A"));
                assert_eq!(args.participant.as_deref(), Some("12"));
                assert_eq!(args.role.as_deref(), Some("Retailer"));
                assert!(!args.autosave);
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["beergame-coach", "--config", "/tmp/c.toml"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(Cli::try_parse_from(["beergame-coach", "prompts", "--mode", "numeric"]).is_err());
    }
}
