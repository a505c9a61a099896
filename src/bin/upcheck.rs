use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use upcheck::{
    actors::{broker::BrokerHandle, dispatcher, prober::Prober, scheduler},
    alerts::AlertSink,
    config::read_config_file,
    server::{ServerConfig, spawn_server},
    target::Target,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Directory with static dashboard assets
    #[arg(short, long, default_value = "static")]
    static_dir: PathBuf,
}

fn init() {
    let filter = filter::Targets::new().with_target("upcheck", LevelFilter::TRACE);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let targets: Vec<_> = config.targets.iter().cloned().map(Target::new).collect();
    debug!("monitoring {} targets", targets.len());

    let broker = BrokerHandle::spawn();
    let alerts = AlertSink::new(config.alerts.clone());
    let prober = Prober::new(broker.clone(), alerts);

    let submit_tx = dispatcher::spawn(prober, targets.len());
    scheduler::start(&targets, submit_tx);

    spawn_server(
        ServerConfig {
            bind_addr: ([0, 0, 0, 0], args.port).into(),
            static_dir: Some(args.static_dir),
        },
        broker,
    )
    .await?;

    // Everything else runs for the lifetime of the process; shutdown is plain
    // termination, not a graceful drain.
    tokio::signal::ctrl_c().await?;

    Ok(())
}
