//! Command line interface for the `radarframe` binary.

use std::{net::SocketAddr, path::PathBuf};

use clap::{ArgGroup, Parser};

/// Command line arguments for the `radarframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "radarframe",
    version,
    about = "Decode and archive range profiles from a radar data stream"
)]
#[command(group(ArgGroup::new("source").required(true).args(["connect", "input"])))]
pub struct Cli {
    /// TCP address of a serial bridge streaming the sensor data port.
    #[arg(short, long)]
    pub connect: Option<String>,

    /// Device node or capture file to read frames from.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Sensor chirp configuration (.cfg) used to derive range bins and
    /// their spacing. Without it, 256 bins spaced 0.04 m apart are assumed.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Range bins per profile; overrides the value derived from --config.
    #[arg(long)]
    pub range_bins: Option<usize>,

    /// Profiles kept in the export archive.
    #[arg(long, default_value_t = 1024)]
    pub archive_capacity: usize,

    /// CSV file written when acquisition stops.
    #[arg(short, long, default_value = "range_power_data.csv")]
    pub export: PathBuf,

    /// Viewer polling interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Largest accepted frame length in bytes.
    #[arg(long)]
    pub max_frame_length: Option<usize>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::Cli;

    #[test]
    fn defaults_apply() {
        let cli = Cli::parse_from(["radarframe", "--connect", "127.0.0.1:5000"]);
        assert_eq!(cli.connect.as_deref(), Some("127.0.0.1:5000"));
        assert_eq!(cli.archive_capacity, 1024);
        assert_eq!(cli.poll_ms, 100);
        assert_eq!(cli.export.to_str(), Some("range_power_data.csv"));
        assert!(cli.range_bins.is_none());
    }

    #[test]
    fn parses_file_source_and_overrides() {
        let cli = Cli::parse_from([
            "radarframe",
            "--input",
            "capture.bin",
            "--config",
            "profile.cfg",
            "--range-bins",
            "128",
            "--metrics-addr",
            "127.0.0.1:9000",
        ]);
        assert_eq!(cli.input.as_deref().and_then(|p| p.to_str()), Some("capture.bin"));
        assert_eq!(cli.range_bins, Some(128));
        assert!(cli.metrics_addr.is_some());
    }

    #[rstest]
    #[case::no_source(&["radarframe"][..])]
    #[case::both_sources(&["radarframe", "--connect", "h:1", "--input", "f"][..])]
    fn exactly_one_source_is_required(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
