//! Session CLI subcommands
//!
//! This module provides CLI commands for posture monitoring sessions:
//! - Replaying recorded JSONL landmark streams
//! - Running deterministic synthetic sessions
//! - One-shot hip angle computation
//! - Assessment export to JSONL or CSV

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tokio::sync::broadcast::error::RecvError;

use posturelens_core::{
    classify_posture, joint_angle_degrees, AssessmentSink, CoreResult, Point2D,
    PostureAssessment, PostureState,
};
use posturelens_engine::{
    JsonlReplaySource, MemorySink, MonitorConfig, MonitorEvent, PostureMonitor, SessionSummary,
    SyntheticConfig, SyntheticSource,
};

/// Arguments for the replay command
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to a JSONL file with one pose frame per line
    pub input: PathBuf,

    /// Bend threshold in degrees
    #[arg(short = 't', long, default_value = "140.0")]
    pub threshold: f64,

    /// Visibility floor below which a landmark is ignored (0.0 = off)
    #[arg(long, default_value = "0.0")]
    pub min_visibility: f32,

    /// Sustained-bend alert window in milliseconds
    #[arg(long, default_value = "5000")]
    pub sustained_ms: u64,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    pub limit: Option<u64>,

    /// Print every assessment as it is evaluated
    #[arg(long)]
    pub show_frames: bool,

    /// Write assessments to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format for --output
    #[arg(long, value_enum, default_value = "jsonl")]
    pub output_format: ExportFormat,

    /// Output format for the final report
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the simulate command
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of frames to generate
    #[arg(short = 'n', long, default_value = "300")]
    pub frames: u64,

    /// Frames per bend-and-recover cycle
    #[arg(long, default_value = "120")]
    pub period: u64,

    /// Deepest hip angle of the sweep, in degrees
    #[arg(long, default_value = "100.0")]
    pub min_angle: f64,

    /// Upright hip angle of the sweep, in degrees
    #[arg(long, default_value = "175.0")]
    pub max_angle: f64,

    /// Bend threshold in degrees
    #[arg(short = 't', long, default_value = "140.0")]
    pub threshold: f64,

    /// Sustained-bend alert window in milliseconds
    #[arg(long, default_value = "5000")]
    pub sustained_ms: u64,

    /// Delay between frames in milliseconds (0 = as fast as possible)
    #[arg(short, long, default_value = "0")]
    pub interval: u64,

    /// Show a progress bar instead of live events
    #[arg(long)]
    pub progress: bool,

    /// Write assessments to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format for --output
    #[arg(long, value_enum, default_value = "jsonl")]
    pub output_format: ExportFormat,

    /// Output format for the final report
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the angle command
#[derive(Args, Debug)]
pub struct AngleArgs {
    /// Shoulder position as x,y
    #[arg(long)]
    pub shoulder: String,

    /// Hip position as x,y
    #[arg(long)]
    pub hip: String,

    /// Knee position as x,y
    #[arg(long)]
    pub knee: String,

    /// Bend threshold in degrees
    #[arg(short = 't', long, default_value = "140.0")]
    pub threshold: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for reports
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Pretty table output
    #[default]
    Table,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

/// Assessment export format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ExportFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// Comma-separated values with a header row
    Csv,
}

// ============================================================================
// Display Structs for Tables
// ============================================================================

/// Report row for the session summary table
#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute the replay command
pub async fn execute_replay(args: ReplayArgs) -> Result<()> {
    println!(
        "{} Replaying {}",
        "[POSTURELENS]".bright_cyan().bold(),
        args.input.display()
    );
    println!();
    print_config(args.threshold, args.min_visibility, args.sustained_ms);
    if let Some(limit) = args.limit {
        println!("  {} {} frames", "Limit:".dimmed(), limit);
    }
    println!();

    let config = MonitorConfig::builder()
        .poll_interval_ms(0)
        .bend_threshold_degrees(args.threshold)
        .min_visibility(args.min_visibility)
        .sustained_bend_ms(args.sustained_ms)
        .max_frames(args.limit)
        .build();

    let source = JsonlReplaySource::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let mut monitor = PostureMonitor::new(config, source)?;

    let collector = MemorySink::new();
    monitor.add_sink(collector.clone());
    if args.show_frames {
        println!(
            "  {:>6}  {:>8}  {}",
            "Frame".bold(),
            "Angle".bold(),
            "State".bold()
        );
        monitor.add_sink(ConsoleSink);
    }

    let summary = run_monitored_session(monitor, true).await?;

    if args.show_frames {
        println!();
    }
    finish_session(&summary, args.output.as_deref(), &args.output_format, &args.format, &collector)
}

/// Execute the simulate command
pub async fn execute_simulate(args: SimulateArgs) -> Result<()> {
    println!(
        "{} Simulating {} frames ({}-frame cycle, {:.0}-{:.0} degrees)",
        "[POSTURELENS]".bright_cyan().bold(),
        args.frames,
        args.period,
        args.min_angle,
        args.max_angle
    );
    println!();
    print_config(args.threshold, 0.0, args.sustained_ms);
    if args.interval > 0 {
        println!("  {} {}ms", "Interval:".dimmed(), args.interval);
    }
    println!();

    let config = MonitorConfig::builder()
        .poll_interval_ms(args.interval)
        .bend_threshold_degrees(args.threshold)
        .sustained_bend_ms(args.sustained_ms)
        .build();

    let synthetic = SyntheticConfig::new()
        .with_frames(Some(args.frames))
        .with_period_frames(args.period)
        .with_angle_range(args.min_angle, args.max_angle)
        .with_frame_interval_ms(args.interval.max(33));
    let source = SyntheticSource::new(synthetic);
    let mut monitor = PostureMonitor::new(config, source)?;

    let collector = MemorySink::new();
    monitor.add_sink(collector.clone());

    let bar = if args.progress {
        let bar = ProgressBar::new(args.frames);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        monitor.add_sink(ProgressSink { bar: bar.clone() });
        Some(bar)
    } else {
        None
    };

    let summary = run_monitored_session(monitor, !args.progress).await?;

    if let Some(bar) = bar {
        bar.finish_with_message("Simulation complete");
        println!();
    }
    finish_session(&summary, args.output.as_deref(), &args.output_format, &args.format, &collector)
}

/// Execute the angle command
pub fn execute_angle(args: AngleArgs) -> Result<()> {
    let shoulder = parse_point(&args.shoulder).context("invalid --shoulder")?;
    let hip = parse_point(&args.hip).context("invalid --hip")?;
    let knee = parse_point(&args.knee).context("invalid --knee")?;

    let angle = joint_angle_degrees(shoulder, hip, knee);
    let state = classify_posture(angle, args.threshold);

    match args.format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "hip_angle_degrees": angle,
                "state": state,
                "threshold_degrees": args.threshold,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Compact => {
            let raw = angle.map_or_else(|| "n/a".to_string(), |a| format!("{a:.1}"));
            println!("angle={} state={}", raw, state);
        }
        OutputFormat::Table => {
            println!("{} {}", "Hip angle:".bold(), format_angle(angle));
            println!(
                "{} {} {}",
                "State:".bold(),
                state_badge(state),
                format!("(threshold {:.1} degrees)", args.threshold).dimmed()
            );
            if angle.is_none() {
                println!(
                    "{} Angle unavailable: the shoulder or knee coincides with the hip.",
                    "[INFO]".blue()
                );
            }
        }
    }

    Ok(())
}

/// Run the monitor with ctrl-c handling and optional live event printing
async fn run_monitored_session(
    mut monitor: PostureMonitor,
    live_events: bool,
) -> Result<SessionSummary> {
    let handle = monitor.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!(
                "{} Stopping after the current frame...",
                "[CTRL-C]".yellow().bold()
            );
            handle.stop();
        }
    });

    let printer = if live_events {
        let mut events = monitor.subscribe();
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(MonitorEvent::SessionEnded { .. }) | Err(RecvError::Closed) => break,
                    Ok(event) => print_event(&event),
                    Err(RecvError::Lagged(_)) => continue,
                }
            }
        }))
    } else {
        None
    };

    let outcome = monitor.run().await;
    if let Some(printer) = printer {
        match &outcome {
            Ok(_) => {
                let _ = printer.await;
            }
            Err(_) => printer.abort(),
        }
    }
    Ok(outcome?)
}

/// Export collected assessments and print the final report
fn finish_session(
    summary: &SessionSummary,
    output: Option<&Path>,
    output_format: &ExportFormat,
    report_format: &OutputFormat,
    collector: &MemorySink,
) -> Result<()> {
    if let Some(output) = output {
        export_assessments(output, output_format, &collector.collected())?;
        println!(
            "{} Assessments written to {}",
            "[OK]".green().bold(),
            output.display()
        );
        println!();
    }
    print_summary(summary, report_format)
}

/// Write assessments to a file in the requested format
fn export_assessments(
    path: &Path,
    format: &ExportFormat,
    assessments: &[PostureAssessment],
) -> Result<()> {
    match format {
        ExportFormat::Jsonl => {
            let mut lines = String::new();
            for assessment in assessments {
                lines.push_str(&serde_json::to_string(assessment)?);
                lines.push('\n');
            }
            std::fs::write(path, lines)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            for assessment in assessments {
                writer.serialize(assessment)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Print the final session report
fn print_summary(summary: &SessionSummary, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Compact => {
            let stats = &summary.statistics;
            println!(
                "frames={} bent={} upright={} unknown={} transitions={} bent_ratio={:.3}",
                stats.frames_seen,
                stats.bent_frames,
                stats.upright_frames,
                stats.unknown_frames,
                stats.transitions,
                stats.bent_ratio()
            );
        }
        OutputFormat::Table => {
            println!("{}", "Session Report".bold().cyan());
            println!("{}", "=".repeat(50));
            let table = Table::new(summary_rows(summary))
                .with(Style::rounded())
                .to_string();
            println!("{}", table);

            let stats = &summary.statistics;
            if stats.frames_seen > 0 && stats.classified_frames() == 0 {
                println!(
                    "{} No frame carried the shoulder-hip-knee triple.",
                    "[WARN]".yellow()
                );
            }
        }
    }
    Ok(())
}

/// Build the summary table rows
fn summary_rows(summary: &SessionSummary) -> Vec<SummaryRow> {
    let stats = &summary.statistics;
    let row = |metric: &str, value: String| SummaryRow {
        metric: metric.to_string(),
        value,
    };

    #[allow(clippy::cast_precision_loss)]
    let duration_s = summary.duration_ms() as f64 / 1000.0;

    vec![
        row("Session", summary.session_id.to_string()),
        row("Duration", format!("{duration_s:.1}s")),
        row("Frames", stats.frames_seen.to_string()),
        row(
            "Bent",
            format!(
                "{} ({})",
                stats.bent_frames,
                format_ratio(stats.bent_ratio())
            ),
        ),
        row("Upright", stats.upright_frames.to_string()),
        row("Unknown", stats.unknown_frames.to_string()),
        row("Transitions", stats.transitions.to_string()),
        row("Min angle", format_angle(stats.min_angle_degrees)),
        row("Max angle", format_angle(stats.max_angle_degrees)),
        row("Mean angle", format_angle(stats.mean_angle_degrees)),
    ]
}

/// Print session configuration lines
fn print_config(threshold: f64, min_visibility: f32, sustained_ms: u64) {
    println!("{}", "Configuration:".bold());
    println!("  {} {:.1} degrees", "Bend threshold:".dimmed(), threshold);
    if min_visibility > 0.0 {
        println!("  {} {:.2}", "Visibility floor:".dimmed(), min_visibility);
    }
    println!("  {} {}ms", "Sustained window:".dimmed(), sustained_ms);
}

/// Sink that prints each assessment as a fixed-width row
struct ConsoleSink;

#[async_trait]
impl AssessmentSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn publish(&mut self, assessment: &PostureAssessment) -> CoreResult<()> {
        println!(
            "  {:>6}  {:>8}  {}",
            assessment.seq,
            format_angle(assessment.hip_angle_degrees),
            state_badge(assessment.state)
        );
        Ok(())
    }
}

/// Sink that advances a progress bar
struct ProgressSink {
    bar: ProgressBar,
}

#[async_trait]
impl AssessmentSink for ProgressSink {
    fn name(&self) -> &str {
        "progress"
    }

    async fn publish(&mut self, _assessment: &PostureAssessment) -> CoreResult<()> {
        self.bar.inc(1);
        Ok(())
    }
}

/// Print a session event line
fn print_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::StateChanged {
            seq,
            previous,
            current,
            angle_degrees,
        } => {
            println!(
                "{} frame {}: {} -> {} ({})",
                "[STATE]".blue().bold(),
                seq,
                state_badge(*previous),
                state_badge(*current),
                format_angle(*angle_degrees)
            );
        }
        MonitorEvent::SustainedBend { seq, duration_ms } => {
            #[allow(clippy::cast_precision_loss)]
            let seconds = *duration_ms as f64 / 1000.0;
            println!(
                "{} Sustained bend for {:.1}s (frame {})",
                "[ALERT]".red().bold(),
                seconds,
                seq
            );
        }
        MonitorEvent::SessionEnded { .. } => {}
    }
}

// ============================================================================
// Formatting Helpers
// ============================================================================

/// Parse an `x,y` pair into a point
fn parse_point(input: &str) -> Result<Point2D> {
    let parts: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("coordinates must be numbers")?;

    if parts.len() != 2 {
        anyhow::bail!("expected x,y (got {} values)", parts.len());
    }
    Ok(Point2D::new(parts[0], parts[1]))
}

/// Format posture state with its overlay color
fn state_badge(state: PostureState) -> String {
    match state {
        PostureState::Bent => "BENT".truecolor(255, 105, 180).bold().to_string(),
        PostureState::Upright => "UPRIGHT".truecolor(0, 207, 255).bold().to_string(),
        PostureState::Unknown => "UNKNOWN".dimmed().to_string(),
    }
}

/// Format an optional angle in degrees
fn format_angle(angle: Option<f64>) -> String {
    match angle {
        Some(angle) => format!("{angle:.1}°"),
        None => "n/a".to_string(),
    }
}

/// Format a 0..1 ratio as a percentage
fn format_ratio(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
