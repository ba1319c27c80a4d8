//! `radarframe` binary.
//!
//! Reads a sensor data stream from a TCP bridge or a file, logs live range
//! profiles, and writes the archive to CSV when the stream ends or Ctrl+C is
//! pressed.

mod cli;

use std::{error::Error, num::NonZeroUsize, sync::Arc, time::Duration};

use clap::Parser;
use radarframe::{
    acquisition::Acquisition,
    channel::{ArchiveConfig, FrameChannel},
    config::SessionConfig,
    error::RadarError,
    export::CsvTableSink,
    sensor_config::SensorProfile,
    viewer::{LogView, Viewer},
};
use tokio::{fs::File, io::AsyncRead, net::TcpStream, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type Source = Box<dyn AsyncRead + Unpin + Send>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();

    #[cfg(feature = "metrics")]
    if let Some(addr) = cli.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "serving metrics");
    }
    #[cfg(not(feature = "metrics"))]
    if cli.metrics_addr.is_some() {
        warn!("built without the metrics feature; --metrics-addr ignored");
    }

    let config = session_config(&cli)?;
    info!(
        range_bins = config.decoder.num_range_bins.get(),
        bin_spacing_m = config.bin_spacing_m,
        archive_capacity = config.archive.capacity.get(),
        "session configured"
    );

    let source = open_source(&cli).await?;
    let mut sink = CsvTableSink::create(&cli.export, config.bin_spacing_m)?;

    let channel = Arc::new(FrameChannel::new(config.archive));
    let shutdown = CancellationToken::new();

    let viewer = Viewer::new(
        LogView {
            bin_spacing_m: config.bin_spacing_m,
        },
        channel.subscribe(),
        config.poll_interval,
    );
    let viewer_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { viewer.run(&shutdown).await })
    };

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if signal::ctrl_c().await.is_ok() {
                info!("interrupt received");
            }
            shutdown.cancel();
        }
    });

    let mut acquisition = Acquisition::new(&config, channel);
    let outcome = acquisition.run(source, &shutdown, &mut sink).await;
    shutdown.cancel();
    if viewer_task.await.is_err() {
        warn!("viewer task panicked");
    }

    match outcome {
        Ok(report) => info!(
            exported = report.exported,
            rows = sink.rows_written(),
            path = %cli.export.display(),
            "archive exported"
        ),
        Err(RadarError::TransportClosed(err)) => info!(
            error = %err,
            rows = sink.rows_written(),
            path = %cli.export.display(),
            "stream ended; archive exported"
        ),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn session_config(cli: &cli::Cli) -> Result<SessionConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_sensor(&SensorProfile::from_path(path)?),
        None => SessionConfig::default(),
    };
    if let Some(bins) = cli.range_bins {
        let bins = NonZeroUsize::new(bins).ok_or("--range-bins must be non-zero")?;
        config = config.num_range_bins(bins);
    }
    if let Some(len) = cli.max_frame_length {
        config = config.max_frame_length(len);
    }
    let capacity = NonZeroUsize::new(cli.archive_capacity).ok_or("--archive-capacity must be non-zero")?;
    Ok(config
        .archive(ArchiveConfig::default().capacity(capacity))
        .poll_interval(Duration::from_millis(cli.poll_ms)))
}

async fn open_source(cli: &cli::Cli) -> Result<Source, Box<dyn Error>> {
    if let Some(addr) = &cli.connect {
        let stream = TcpStream::connect(addr).await?;
        info!(%addr, "connected to sensor bridge");
        return Ok(Box::new(stream));
    }
    if let Some(path) = &cli.input {
        let file = File::open(path).await?;
        info!(path = %path.display(), "reading sensor stream");
        return Ok(Box::new(file));
    }
    Err("either --connect or --input is required".into())
}
