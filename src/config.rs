//! Command-line configuration.
//!
//! Settings come from flags with environment fallbacks:
//!
//! - `WORKER_BIND` - HTTP ingress address of `worker run` (default: `127.0.0.1:6000`)
//! - `HOSTNAME` - identity matched against control message destinations
//! - `WORKER_CONCURRENCY` - number of execution slots (default: `4`)
//! - `WORKER_PEERS` - comma separated worker URLs that control commands are broadcast to

use crate::registry::RateLimit;

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Debug, Parser)]
#[command(name = "worker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a worker process.
    Run(RunArgs),
    /// Revoke a task on the fleet.
    Revoke(RevokeArgs),
    /// Change the rate limit of a task type on the fleet.
    RateLimit(RateLimitArgs),
    /// Ping the fleet.
    Ping(BroadcastArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Address the HTTP ingress listens on.
    #[arg(long, env = "WORKER_BIND", default_value = "127.0.0.1:6000")]
    pub bind: SocketAddr,

    /// Worker identity used for control message addressing.
    #[arg(long, env = "HOSTNAME", default_value = "localhost")]
    pub hostname: String,

    /// Number of execution slots.
    #[arg(long, env = "WORKER_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    /// Initial rate limit override, as `task_name=rate` (e.g. `emails.send=10/m`).
    #[arg(long = "rate-limit", value_parser = parse_rate_override)]
    pub rate_limits: Vec<RateOverride>,
}

#[derive(Debug, Clone, Args)]
pub struct BroadcastArgs {
    /// Worker base URL to send to (repeatable).
    #[arg(long = "peer", env = "WORKER_PEERS", value_delimiter = ',', required = true)]
    pub peers: Vec<String>,

    /// Only the worker with this hostname acts on the command.
    #[arg(long)]
    pub destination: Option<String>,
}

#[derive(Debug, Args)]
pub struct RevokeArgs {
    pub task_id: String,

    #[command(flatten)]
    pub broadcast: BroadcastArgs,
}

#[derive(Debug, Args)]
pub struct RateLimitArgs {
    pub task_name: String,

    /// New rate (`10/s`, `100/m`, `1000/h`); `0` disables limiting.
    pub rate_limit: String,

    #[command(flatten)]
    pub broadcast: BroadcastArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateOverride {
    pub task_name: String,
    pub rate_limit: Option<RateLimit>,
}

fn parse_rate_override(raw: &str) -> Result<RateOverride, String> {
    let (task_name, rate) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected task_name=rate, got {:?}", raw))?;
    let rate_limit = RateLimit::parse(rate).map_err(|e| e.to_string())?;

    Ok(RateOverride {
        task_name: task_name.trim().to_string(),
        rate_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["worker", "run", "--hostname", "w1"]).unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.hostname, "w1");
        assert!(args.rate_limits.is_empty());
    }

    #[test]
    fn test_rate_limit_overrides_are_parsed() {
        let cli = Cli::try_parse_from([
            "worker",
            "run",
            "--rate-limit",
            "emails.send=10/m",
            "--rate-limit",
            "reports.generate=0",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(
            args.rate_limits,
            vec![
                RateOverride {
                    task_name: "emails.send".to_string(),
                    rate_limit: Some(RateLimit::per_minute(10.0)),
                },
                RateOverride {
                    task_name: "reports.generate".to_string(),
                    rate_limit: None,
                },
            ]
        );
    }

    #[test]
    fn test_invalid_rate_override_is_rejected() {
        let result = Cli::try_parse_from(["worker", "run", "--rate-limit", "emails.send"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_revoke_with_peers() {
        let cli = Cli::try_parse_from([
            "worker",
            "revoke",
            "T1",
            "--peer",
            "http://a:6000,http://b:6000",
            "--destination",
            "a",
        ])
        .unwrap();

        let Commands::Revoke(args) = cli.command else {
            panic!("expected revoke");
        };
        assert_eq!(args.task_id, "T1");
        assert_eq!(args.broadcast.peers.len(), 2);
        assert_eq!(args.broadcast.destination.as_deref(), Some("a"));
    }
}
