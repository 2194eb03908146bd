use anyhow::Result;
use clap::Parser;
use distributed_worker::config::{BroadcastArgs, Cli, Commands, RunArgs};
use distributed_worker::control::ControlPublisher;
use distributed_worker::registry::{TaskTypeDescriptor, TaskTypeRegistry};
use distributed_worker::worker::Worker;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_worker(args).await,
        Commands::Revoke(args) => {
            let publisher = publisher(&args.broadcast)?;
            let delivered = publisher
                .revoke(&args.task_id, args.broadcast.destination.clone())
                .await;
            report("revoke", delivered, publisher.peers().len());
            Ok(())
        }
        Commands::RateLimit(args) => {
            let publisher = publisher(&args.broadcast)?;
            let delivered = publisher
                .rate_limit(
                    &args.task_name,
                    args.rate_limit.into(),
                    args.broadcast.destination.clone(),
                )
                .await;
            report("rate_limit", delivered, publisher.peers().len());
            Ok(())
        }
        Commands::Ping(args) => {
            let publisher = publisher(&args)?;
            let delivered = publisher.ping(args.destination.clone()).await;
            report("ping", delivered, publisher.peers().len());
            Ok(())
        }
    }
}

async fn run_worker(args: RunArgs) -> Result<()> {
    tracing::info!("Starting worker {} on {}", args.hostname, args.bind);

    // 1. Task types:
    let registry = TaskTypeRegistry::new();

    registry.register(TaskTypeDescriptor::new("echo"), |message| async move {
        tracing::info!("echo {}: {}", message.id.0, message.args);
        Ok(())
    });
    registry.register(
        TaskTypeDescriptor::new("sleep").with_retries(0, Duration::ZERO),
        |message| async move {
            let secs = message.args["seconds"].as_u64().unwrap_or(1);
            tokio::time::sleep(Duration::from_secs(secs)).await;
            Ok(())
        },
    );

    for rate in &args.rate_limits {
        if !registry.set_rate_limit(&rate.task_name, rate.rate_limit) {
            tracing::warn!("--rate-limit for unknown task type {} ignored", rate.task_name);
        }
    }

    // 2. Worker context, scheduler loop and execution slots:
    let worker = Worker::new(args.hostname, registry, args.concurrency);
    let _handles = worker.start();

    // 3. HTTP ingress:
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!("Worker {} accepting messages on {}", worker.hostname(), args.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, worker.router()).await?;

    Ok(())
}

fn publisher(args: &BroadcastArgs) -> Result<ControlPublisher> {
    ControlPublisher::new(args.peers.clone())
}

fn report(command: &str, delivered: usize, peers: usize) {
    tracing::info!("{} delivered to {}/{} workers", command, delivered, peers);
}
