//! Tracing setup driven by the `logging:` config section.
//!
//! Console output goes through a fmt layer filtered per target; the
//! `"default"` section may additionally open a JSON file sink with size
//! based rotation. Both sinks read their levels from the same sections,
//! console and file independently.

use crate::config::{LoggingConfig, Section};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::fmt;

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

fn level_from_str(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        // unknown strings degrade to info rather than aborting startup
        _ => Some(Level::INFO),
    }
}

// FileRotate is not Sync, so the writer hands out mutex-guarded handles.
#[derive(Clone)]
struct RollingWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RollingWriter {
    type Writer = RollingHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RollingHandle(self.0.clone())
    }
}

#[derive(Clone)]
struct RollingHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RollingHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// The config split into the catch-all section and the per-target rest.
struct SectionView<'a> {
    default_section: Option<&'a Section>,
    target_sections: Vec<(String, &'a Section)>,
}

fn split_sections(cfg: &LoggingConfig) -> SectionView<'_> {
    let target_sections = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != "default")
        .map(|(k, v)| (k.clone(), v))
        .collect::<Vec<_>>();

    SectionView {
        default_section: cfg.get("default"),
        target_sections,
    }
}

/// Absolute log paths are taken as given, relative ones land under
/// `base_dir` (the server home).
fn log_file_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rolling_writer(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> Result<RollingWriter, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_backups)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RollingWriter(Arc::new(Mutex::new(rot))))
}

/// The file sink of the `"default"` section, or `None` when the `file`
/// field is empty or the file cannot be opened. An unopenable file logs to
/// stderr and falls back to console-only rather than failing startup.
fn default_file_writer(section: &Section, base_dir: &Path) -> Option<RollingWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(3);
    let log_path = log_file_path(&section.file, base_dir);

    match open_rolling_writer(&log_path, max_bytes as usize, max_backups) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to initialize log file '{}': {}",
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

/// Targets filter: the `"default"` section sets the catch-all level, every
/// other section the level of its target prefix. `pick` selects which of
/// the section's two levels applies (console or file).
fn targets_filter(
    view: &SectionView<'_>,
    pick: fn(&Section) -> &str,
) -> tracing_subscriber::filter::Targets {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::filter::Targets;

    let default_level = view
        .default_section
        .and_then(|s| level_from_str(pick(s)))
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF);

    let mut targets = Targets::new().with_default(default_level);

    for (target, section) in &view.target_sections {
        let level = level_from_str(pick(section))
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::OFF);
        targets = targets.with_target(target.clone(), level);
    }

    targets
}

/// Install the global subscriber for `cfg`, resolving relative log file
/// paths against `base_dir` (usually `server.home_dir`).
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // route `log` records into tracing before the subscriber exists
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        install_fallback();
        return;
    }

    let view = split_sections(cfg);

    let ansi = atty::is(atty::Stream::Stdout);
    let console_targets = targets_filter(&view, |s| &s.console_level);
    let file_writer = view
        .default_section
        .and_then(|s| default_file_writer(s, base_dir));

    install_layers(&view, ansi, console_targets, file_writer);
}

fn install_fallback() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn install_layers(
    view: &SectionView<'_>,
    ansi: bool,
    console_targets: tracing_subscriber::filter::Targets,
    file_writer: Option<RollingWriter>,
) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let Some(writer) = file_writer else {
        let _ = Registry::default().with(console_layer).try_init();
        return;
    };

    let file_targets = targets_filter(view, |s| &s.file_level);
    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(writer)
        .with_filter(file_targets);

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
