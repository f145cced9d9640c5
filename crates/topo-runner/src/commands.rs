//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use topo_core::Catalog;
use topo_core::config::AppConfig;
use topo_core::export::{AnalysisReport, JsonExport, csv_file_name, report_file_name, to_csv_string};
use topo_core::history::HistoryBuffer;
use topo_core::search::{SearchResults, search};
use topo_core::stats::{
    LatencyTier, PerformanceGrade, compute_statistics, exchange_summary, performance_score, region_summary,
};
use topo_core::time_util::{iso8601_ms, now_ms};
use topo_core::types::{HistoryPoint, LatencySample, Snapshot, TimeWindow};
use topo_monitor::{ProbeStats, create_connectivity_checker, create_monitor, create_source};
use topo_sim::{HistoryGenerator, LatencySynthesizer, generate_snapshot};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Report,
}

// ---------------------------------------------------------------------------
// live
// ---------------------------------------------------------------------------

/// Run the monitor until Ctrl+C or `ticks` publications.
pub async fn live(config: &AppConfig, catalog: Catalog, ticks: Option<u64>) -> Result<()> {
    let monitor_cfg = config.monitor();
    let monitor = create_monitor(&monitor_cfg, catalog.clone())?;
    let filters = config.effective_filters();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Arc<Snapshot>>();
    let subscription = monitor.subscribe(move |snap| {
        let _ = tx.send(snap);
    });

    let mut background = Vec::new();
    if let Some(checker) = create_connectivity_checker(&monitor_cfg)? {
        let (online_rx, task) = checker.spawn();
        background.push(task);
        background.push(monitor.watch_connectivity(online_rx));
    }

    monitor.start();
    info!("monitor started, press Ctrl+C to stop");

    let mut published = 0u64;
    loop {
        tokio::select! {
            snap = rx.recv() => {
                let Some(snap) = snap else { break };
                published += 1;
                let visible = visible_samples(&filters, &catalog, &snap.samples);
                println!("{}", live_line(snap.taken_at_ms, &visible));
                if ticks.is_some_and(|n| published >= n) {
                    break;
                }
            }
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("shutdown signal received");
                break;
            }
        }
    }

    monitor.stop();
    subscription.unsubscribe();
    for task in background {
        task.abort();
    }

    let stats = monitor.stats();
    info!(
        "monitor stopped: ticks={} published={} failed={} dropped_samples={}",
        stats.ticks, stats.published, stats.failed_ticks, stats.dropped_samples,
    );
    log_measurements(monitor.measurement_stats().as_deref());
    Ok(())
}

/// One status line per published snapshot.
fn live_line(taken_at_ms: u64, visible: &[LatencySample]) -> String {
    let stats = compute_statistics(visible);
    let score = performance_score(&stats);
    format!(
        "[{}] {stats} tier={:?} score={score} grade={}",
        iso8601_ms(taken_at_ms),
        LatencyTier::classify(stats.avg_latency),
        PerformanceGrade::from_score(score),
    )
}

fn log_measurements(stats: Option<&ProbeStats>) {
    if let Some(stats) = stats {
        info!("last snapshot: {} pairs measured, {} simulated", stats.measured(), stats.simulated());
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

/// Latency / loss summary of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub min_ms: u32,
    pub max_ms: u32,
    pub avg_ms: f64,
    pub avg_loss_pct: f64,
}

pub fn summarize(points: &[HistoryPoint]) -> Option<SeriesSummary> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    Some(SeriesSummary {
        min_ms: points.iter().map(|p| p.latency_ms).min().unwrap_or(0),
        max_ms: points.iter().map(|p| p.latency_ms).max().unwrap_or(0),
        avg_ms: points.iter().map(|p| f64::from(p.latency_ms)).sum::<f64>() / n,
        avg_loss_pct: points.iter().map(|p| p.packet_loss_pct).sum::<f64>() / n,
    })
}

pub fn history(config: &AppConfig, catalog: &Catalog, exchange: &str, region: &str, window: TimeWindow) -> Result<()> {
    let generator = HistoryGenerator::new(config.effective_history_points())?;
    let series = generator.generate(catalog, exchange, region, window, now_ms(), &mut rand::thread_rng())?;

    let mut buffer = HistoryBuffer::new(config.effective_history_capacity());
    buffer.replace(series.points.iter().copied());
    let points: Vec<HistoryPoint> = buffer.iter().copied().collect();

    println!("{} -> {} over {window}: {} points", series.exchange_id, series.cloud_region_id, points.len());
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        println!("  from {} to {}", iso8601_ms(first.timestamp_ms), iso8601_ms(last.timestamp_ms));
    }
    if let Some(s) = summarize(&points) {
        println!(
            "  latency min={}ms avg={:.1}ms max={}ms, avg loss={:.2}%",
            s.min_ms, s.avg_ms, s.max_ms, s.avg_loss_pct
        );
    }
    for p in buffer.latest(5) {
        println!("  {}  {:>5}ms  {:.2}%", iso8601_ms(p.timestamp_ms), p.latency_ms, p.packet_loss_pct);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

/// Print matches with latency summaries from one simulated snapshot.
pub fn run_search(catalog: &Catalog, query: &str, limit: usize) {
    let results = search(query, catalog, limit);
    if results.is_empty() {
        println!("no matches for {query:?}");
        return;
    }
    let snap = generate_snapshot(catalog, &LatencySynthesizer::new(), now_ms(), &mut rand::thread_rng());
    for line in search_lines(&results, &snap.samples) {
        println!("{line}");
    }
}

fn search_lines(results: &SearchResults<'_>, samples: &[LatencySample]) -> Vec<String> {
    let exchanges = results.exchanges.iter().map(|ex| {
        let summary = match exchange_summary(samples, &ex.id) {
            Some(s) => format!("avg={}ms min={}ms {:?}", s.avg, s.min, LatencyTier::classify(s.avg)),
            None => "no samples".to_string(),
        };
        format!("exchange  {:<10} {} ({})  {summary}", ex.id, ex.name, ex.region)
    });
    let regions = results.regions.iter().map(|r| {
        let summary = match region_summary(samples, &r.id) {
            Some(s) => format!("avg={}ms pairs={} {:?}", s.avg, s.connections, LatencyTier::classify(s.avg)),
            None => "no samples".to_string(),
        };
        format!("region    {:<22} {} {} ({})  {summary}", r.id, r.provider, r.region_code, r.location)
    });
    exchanges.chain(regions).collect()
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

/// Export one snapshot (filtered by config) to stdout or a file.
///
/// When `out` is a directory, the suggested file name is used inside it.
pub async fn export(config: &AppConfig, catalog: Catalog, format: ExportFormat, out: Option<PathBuf>) -> Result<()> {
    let source = create_source(&config.monitor(), catalog.clone())?;
    let snap = source.snapshot().await?;
    let samples = visible_samples(&config.effective_filters(), &catalog, &snap.samples);
    let now = now_ms();

    let (body, file_name) = match format {
        ExportFormat::Json => {
            let history = export_history(config, &catalog, &samples, now)?;
            let export = JsonExport::new(&samples, &history, now);
            (export.to_json_pretty()?, export.file_name())
        }
        ExportFormat::Csv => (to_csv_string(&samples)?, csv_file_name(now)),
        ExportFormat::Report => {
            let report = AnalysisReport::new(&samples, now);
            (report.to_json_pretty()?, report_file_name(now))
        }
    };

    match out {
        Some(path) => {
            let path = resolve_output(&path, &file_name);
            std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
            info!("exported {} samples to {}", samples.len(), path.display());
        }
        None => print!("{body}"),
    }
    log_measurements(source.measurement_stats().as_deref());
    Ok(())
}

/// History for the first exported pair, loaded through the bounded buffer.
fn export_history(
    config: &AppConfig,
    catalog: &Catalog,
    samples: &[LatencySample],
    now: u64,
) -> Result<Vec<HistoryPoint>> {
    let Some(first) = samples.first() else {
        warn!("no samples pass the configured filters, exporting empty history");
        return Ok(Vec::new());
    };
    let series = HistoryGenerator::new(config.effective_history_points())?.generate(
        catalog,
        &first.exchange_id,
        &first.cloud_region_id,
        TimeWindow::default(),
        now,
        &mut rand::thread_rng(),
    )?;
    let mut buffer = HistoryBuffer::new(config.effective_history_capacity());
    buffer.replace(series.points);
    Ok(buffer.iter().copied().collect())
}

fn resolve_output(path: &Path, file_name: &str) -> PathBuf {
    if path.is_dir() { path.join(file_name) } else { path.to_path_buf() }
}

fn visible_samples(
    filters: &topo_core::filter::FilterState,
    catalog: &Catalog,
    samples: &[LatencySample],
) -> Vec<LatencySample> {
    filters.filter_samples(catalog, samples).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latency_ms: u32, packet_loss_pct: f64) -> HistoryPoint {
        HistoryPoint { timestamp_ms: 0, latency_ms, packet_loss_pct }
    }

    #[test]
    fn summary_of_points() {
        let s = summarize(&[point(10, 0.5), point(30, 1.5), point(20, 1.0)]).unwrap();
        assert_eq!(s.min_ms, 10);
        assert_eq!(s.max_ms, 30);
        assert!((s.avg_ms - 20.0).abs() < 1e-9);
        assert!((s.avg_loss_pct - 1.0).abs() < 1e-9);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn output_path_resolution() {
        let dir = std::env::temp_dir();
        assert_eq!(resolve_output(&dir, "x.csv"), dir.join("x.csv"));
        let file = dir.join("does-not-exist-topo.csv");
        assert_eq!(resolve_output(&file, "x.csv"), file);
    }

    #[test]
    fn filters_apply_to_samples() {
        let catalog = Catalog::builtin();
        let mut filters = topo_core::filter::FilterState::default();
        filters.toggle_exchange("kraken");
        let samples = vec![
            LatencySample {
                exchange_id: "kraken".into(),
                cloud_region_id: "aws-us-west-2".into(),
                latency_ms: 40,
                timestamp_ms: 0,
                packet_loss_pct: 0.1,
            },
            LatencySample {
                exchange_id: "binance".into(),
                cloud_region_id: "aws-us-west-2".into(),
                latency_ms: 40,
                timestamp_ms: 0,
                packet_loss_pct: 0.1,
            },
        ];
        let visible = visible_samples(&filters, &catalog, &samples);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].exchange_id, "kraken");
    }

    #[test]
    fn live_line_carries_tier_and_grade() {
        let samples = vec![LatencySample {
            exchange_id: "binance".into(),
            cloud_region_id: "aws-ap-northeast-1".into(),
            latency_ms: 30,
            timestamp_ms: 0,
            packet_loss_pct: 0.0,
        }];
        let line = live_line(0, &samples);
        assert!(line.starts_with("[1970-01-01T00:00:00.000Z] n=1"), "{line}");
        assert!(line.contains("tier=Excellent"), "{line}");
        assert!(line.contains("grade="), "{line}");
    }

    #[test]
    fn search_lines_include_summaries() {
        let catalog = Catalog::builtin();
        let results = search("binance", &catalog, 5);
        let sample = |region: &str, latency_ms| LatencySample {
            exchange_id: "binance".into(),
            cloud_region_id: region.into(),
            latency_ms,
            timestamp_ms: 0,
            packet_loss_pct: 0.0,
        };
        let samples = vec![sample("aws-us-east-1", 100), sample("aws-ap-northeast-1", 20)];

        let lines = search_lines(&results, &samples);
        let binance = lines.iter().find(|l| l.starts_with("exchange  binance")).unwrap();
        assert!(binance.ends_with("avg=60ms min=20ms Good"), "{binance}");
    }

    #[tokio::test]
    async fn report_export_uses_report_file_name() {
        let dir = std::env::temp_dir().join(format!("topo-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        export(&AppConfig::default(), Catalog::builtin(), ExportFormat::Report, Some(dir.clone())).await.unwrap();

        let written = std::fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let name = written.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("latency-analysis-report-") && name.ends_with(".json"), "{name}");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn csv_export_to_directory() {
        let dir = std::env::temp_dir().join(format!("topo-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = AppConfig::default();

        export(&config, Catalog::builtin(), ExportFormat::Csv, Some(dir.clone())).await.unwrap();

        let written = std::fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let text = std::fs::read_to_string(&written).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(topo_core::export::CSV_HEADER));
        assert!(lines.count() > 0);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
