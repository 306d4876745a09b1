//! Proxy Dashboard terminal client

use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use proxy_dashboard::views::Panel;
use proxy_dashboard::{ApiClient, Config, Dashboard, DashboardError, DataSource, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "proxy-dashboard", version, about = "Terminal dashboard for a caching proxy")]
struct Cli {
    /// Root address of the proxy API
    #[arg(long, global = true, env = "API_BASE_URL")]
    base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one metrics snapshot
    Metrics,
    /// Print the most recent request logs
    Logs {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Inspect or edit the domain blacklist
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },
    /// Ask the proxy to drop its cache
    ClearCache,
    /// Poll panels and redraw them until Ctrl-C
    Watch {
        #[arg(value_enum, default_value_t = WatchTarget::All)]
        view: WatchTarget,
    },
}

#[derive(Subcommand, Debug)]
enum BlacklistAction {
    List,
    Add { domain: String },
    Remove { domain: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum WatchTarget {
    Logs,
    Realtime,
    Stats,
    Heatmap,
    All,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_tracing(cli.json_logs);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Command::Logs { limit: Some(limit) } = cli.command {
        config.logs_limit = limit;
    }

    config.validate().map_err(DashboardError::Config)?;
    info!("Using proxy API at {}", config.normalized_base_url());

    let client = Arc::new(ApiClient::from_config(&config)?);

    match cli.command {
        Command::Metrics => {
            let fetched = client.get_metrics().await;
            let live = fetched.is_live();
            let m = fetched.into_inner();
            println!(
                "requests {}  hits {}  misses {}  hit ratio {:.1}%  cpu {}%  ram {}%{}",
                m.total_requests,
                m.cache_hits,
                m.cache_misses,
                m.hit_ratio(),
                m.cpu,
                m.ram,
                if live { "" } else { "  (fallback data)" }
            );
            for point in &m.timeseries {
                println!("{:>6} rtt {}s", point.t, point.rtt);
            }
        }
        Command::Logs { .. } => {
            let dashboard = Dashboard::new(client.clone(), config);
            dashboard.logs.refresh().await;
            print!("{}", dashboard.logs.render());
        }
        Command::Blacklist { action } => {
            let dashboard = Dashboard::new(client.clone(), config);
            let ok = match action {
                BlacklistAction::List => {
                    dashboard.blacklist.refresh().await;
                    true
                }
                BlacklistAction::Add { domain } => dashboard.blacklist.add(&domain).await,
                BlacklistAction::Remove { domain } => dashboard.blacklist.remove(&domain).await,
            };

            for notification in dashboard.notifications.active().await {
                println!("[{}] {}", notification.level, notification.message);
            }
            print!("{}", dashboard.blacklist.render());

            if !ok {
                return Err(DashboardError::Other("blacklist update rejected".to_string()));
            }
        }
        Command::ClearCache => {
            if !client.clear_cache().await {
                return Err(DashboardError::Other("cache clear failed".to_string()));
            }
            println!("Cache cleared");
        }
        Command::Watch { view } => {
            let dashboard = Dashboard::new(client.clone(), config);
            watch(&dashboard, view).await?;
        }
    }

    let stats = client.stats().await;
    info!(
        "API stats - {} requests, {:.1}% available, avg {}ms",
        stats.requests,
        stats.availability(),
        stats.avg_duration_ms
    );

    Ok(())
}

async fn watch(dashboard: &Dashboard, target: WatchTarget) -> Result<()> {
    let panels: Vec<(&dyn Panel, Duration)> = dashboard
        .panels()
        .into_iter()
        .filter(|(panel, _)| matches_target(panel.title(), target))
        .collect();

    let handles: Vec<_> = panels
        .iter()
        .map(|(panel, period)| panel.start(*period))
        .collect();

    let mut redraw = interval(Duration::from_secs(1));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            _ = redraw.tick() => {
                // clear screen and home the cursor
                print!("\x1b[2J\x1b[H");
                for (panel, _) in &panels {
                    println!("{}", panel.render());
                }
            }
        }
    }

    info!("Stopping {} polls", handles.len());
    join_all(handles.into_iter().map(|handle| handle.shutdown())).await;

    Ok(())
}

fn matches_target(title: &str, target: WatchTarget) -> bool {
    match target {
        WatchTarget::All => true,
        WatchTarget::Logs => title == "Proxy Logs",
        WatchTarget::Realtime => title.starts_with("Real-time"),
        WatchTarget::Stats => title == "System Stats",
        WatchTarget::Heatmap => title == "Activity Heatmap",
    }
}

/// Initialize structured logging on stderr, leaving stdout to the panels
fn initialize_tracing(json: bool) {
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter_layer);

    if json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer.compact()).init();
    }
}
