//! Structured logging setup.
//!
//! Installs one stdout layer (text or JSON, filtered by `RUST_LOG` or the
//! configured level) and, when enabled, one append-only plain-text file per
//! notice channel. Each file layer only sees events whose target is its
//! channel.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use coherence_core::channel;
use coherence_core::config::LoggingConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::error::EngineError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// `logs_dir` must already exist when channel files are enabled.
pub fn init(config: &LoggingConfig, logs_dir: &Path) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stdout: BoxedLayer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![stdout.with_filter(filter).boxed()];

    if config.channel_files {
        for (target, stem) in channel::ALL {
            let path = logs_dir.join(format!("{stem}.log"));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| EngineError::io(&path, e))?;

            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(file))
                .with_filter(Targets::new().with_target(target, LevelFilter::TRACE));
            layers.push(layer.boxed());
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| EngineError::Logging {
            message: e.to_string(),
        })
}
