use std::time::Duration;

use clap::{Parser, Subcommand};
use xy_lattice_sim::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "xy-sim")]
#[command(author, version, about = "XY-model Metropolis simulator")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Initial lattice side (32, 64, 128, 256 or 512)
    #[arg(long, global = true, env = "XY_SIM_SIZE", default_value_t = LatticeSize::N32, value_parser = parse_size)]
    pub size: LatticeSize,

    /// Initial temperature k_B T / J, in [0, 2]
    #[arg(short, long, global = true, env = "XY_SIM_TEMPERATURE", default_value_t = 1.0, value_parser = parse_temperature)]
    pub temperature: f64,

    /// Fixed RNG seed (random when omitted)
    #[arg(long, global = true, env = "XY_SIM_SEED")]
    pub seed: Option<u64>,

    /// Milliseconds between animation frames
    #[arg(long, global = true, env = "XY_SIM_FRAME_MS", default_value_t = 16)]
    pub frame_ms: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the interactive window (default)
    Gui,

    /// Run without a window and print the magnetization trace
    Headless {
        /// Number of sweeps to perform
        #[arg(long, default_value_t = 100)]
        sweeps: u64,

        /// Print a row every this many sweeps
        #[arg(long, default_value_t = 10)]
        report_every: u64,

        /// JSON instruction batch applied after the handoff,
        /// e.g. '[{"property":"beta","value":2}]'
        #[arg(long)]
        commands: Option<String>,
    },
}

fn parse_size(s: &str) -> Result<LatticeSize, String> {
    let n: i64 = s.parse().map_err(|e| format!("{}", e))?;
    LatticeSize::from_side(n).map_err(|e| e.to_string())
}

fn parse_temperature(s: &str) -> Result<f64, String> {
    let t: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=MAX_TEMPERATURE).contains(&t) {
        Ok(t)
    } else {
        Err(format!("temperature must be in [0, {}]", MAX_TEMPERATURE))
    }
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            size: self.size,
            beta: temperature_to_beta(self.temperature),
            frame_interval: Duration::from_millis(self.frame_ms),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["xy-sim"]).expect("parses");
        assert_eq!(cli.size, LatticeSize::N32);
        assert_eq!(cli.temperature, 1.0);
        assert!(cli.command.is_none());
        assert_eq!(cli.engine_config().beta, 1.0);
    }

    #[test]
    fn test_headless_args() {
        let cli = Cli::try_parse_from([
            "xy-sim", "headless", "--sweeps", "50", "--size", "128", "-t", "0", "--seed", "9",
        ])
        .expect("parses");
        assert_eq!(cli.size, LatticeSize::N128);
        assert!(cli.engine_config().beta.is_infinite());
        assert_eq!(cli.engine_config().seed, Some(9));
        assert!(matches!(cli.command, Some(Commands::Headless { sweeps: 50, .. })));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Cli::try_parse_from(["xy-sim", "--size", "100"]).is_err());
        assert!(Cli::try_parse_from(["xy-sim", "--temperature", "2.5"]).is_err());
        assert!(Cli::try_parse_from(["xy-sim", "--temperature", "-0.1"]).is_err());
    }
}
