mod callbacks;
mod dashboard;
mod dataset;
mod figure;
mod options;
mod page;
mod server;
mod stats;

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use argh::FromArgs;
use dashboard::Dashboard;
use dataset::DataSource;
use server::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(FromArgs, Debug)]
/// Boxing analytics dashboard
struct Args {
    /// url or path of the boxer CSV dataset, defaults to the published dataset
    #[argh(option, short = 'd')]
    data: Option<DataSource>,

    /// address to serve the dashboard on
    #[argh(option, short = 'b', default = "default_bind()")]
    bind: SocketAddr,

    /// verbose logging and indented figure JSON
    #[argh(switch)]
    debug: bool,

    /// emit logs as JSON lines
    #[argh(switch)]
    json_logs: bool,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8050))
}

fn init_tracing(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_tracing(args.debug, args.json_logs);

    let source = match args.data {
        Some(source) => source,
        None => dataset::DEFAULT_SOURCE
            .parse()
            .context("Invalid default data source")?,
    };
    let records = dataset::load(&source)
        .with_context(|| format!("Failed to load dataset from {}", source))?;
    let dashboard = Dashboard::build(records, args.debug)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?
        .block_on(server::serve(args.bind, AppState::new(dashboard)))
}
