use super::Host;
use super::common::{LogLevel, init_logging};
use super::config::Config;
use crate::Result;
use crate::compile::group_by_target;
use crate::directory::{DirectoryClient, SnapshotClient};
use crate::stats::{JsonLinesRecorder, LogRecorder, MetricSet, PollSummary, Poller, Recorder};
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::{IntoAppError, bail};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::watch;

const LOG_TARGET: &str = "   monitor";

#[derive(Parser, Debug)]
pub struct MonitorArgs {
    /// Path to configuration file
    #[arg(long, short = 'c', value_name = "PATH", default_value = "slapd-stats.yml")]
    pub config: Utf8PathBuf,

    /// YAML dump of the directory's monitor entries, re-read on every query
    #[arg(long, value_name = "PATH")]
    pub snapshot: Utf8PathBuf,

    /// Append measurements to this file as JSON lines instead of logging them
    #[arg(long, value_name = "PATH")]
    pub json: Option<Utf8PathBuf>,

    /// Stop after this many collection cycles per database
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

fn recorder(args: &MonitorArgs) -> Result<Arc<dyn Recorder>> {
    let Some(path) = &args.json else {
        return Ok(Arc::new(LogRecorder));
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .into_app_err_with(|| format!("opening measurement file '{path}'"))?;
    Ok(Arc::new(JsonLinesRecorder::new(file)))
}

/// Compile the configuration and poll every database until Ctrl-C (or the cycle limit)
pub async fn monitor<H: Host>(host: &mut H, args: &MonitorArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = Config::load(&args.config)?;
    let defs = config.compile().into_app_err("compiling the monitoring tree")?;
    if defs.is_empty() {
        bail!("configuration '{}' does not define any statistics", args.config);
    }

    let recorder = recorder(args)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut pollers = Vec::new();
    for (target, defs) in group_by_target(defs) {
        let client: Arc<dyn DirectoryClient> = Arc::new(SnapshotClient::new(&args.snapshot, &config.dn_separator));
        let metric_set = Arc::new(MetricSet::from_defs(target.clone(), client, &defs));
        let poller = Poller::new(metric_set, Arc::clone(&recorder), config.poll_interval).with_max_cycles(args.cycles);
        pollers.push((target, tokio::spawn(poller.run(shutdown_rx.clone()))));
    }

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!(target: LOG_TARGET, "Shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut summaries: Vec<(String, PollSummary)> = Vec::with_capacity(pollers.len());
    for (target, handle) in pollers {
        let summary = handle.await.into_app_err_with(|| format!("polling '{target}'"))?;
        summaries.push((target, summary));
    }
    ctrl_c.abort();

    let mut out = host.output();
    for (target, summary) in summaries {
        let _ = writeln!(
            out,
            "{target}: {} cycles ({} failed, {} degraded)",
            summary.cycles, summary.failed_cycles, summary.degraded_cycles
        );
    }

    Ok(())
}
