use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggerConfig};
use crate::error::TelemetryError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Errors go to stderr and every `out_err` file, everything else to stdout
/// and every `out` file.
pub fn init(cfg: &LoggerConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let mut layers: Vec<BoxedLayer> = vec![
        layer(cfg.format, true, std::io::stdout.with_min_level(Level::WARN)),
        layer(cfg.format, true, std::io::stderr.with_max_level(Level::ERROR)),
    ];
    for path in &cfg.out {
        let file = open_sink(path)?;
        layers.push(layer(cfg.format, false, file.with_min_level(Level::WARN)));
    }
    for path in &cfg.out_err {
        let file = open_sink(path)?;
        layers.push(layer(cfg.format, false, file.with_max_level(Level::ERROR)));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;
    Ok(())
}

fn layer<W>(format: LogFormat, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    }
}

// Append-only log file, parent directories created on demand
fn open_sink(path: &Path) -> Result<Mutex<File>, TelemetryError> {
    let open = || -> std::io::Result<File> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open()
        .map(Mutex::new)
        .map_err(|source| TelemetryError::Open {
            path: path.to_path_buf(),
            source,
        })
}
