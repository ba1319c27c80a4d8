//! Sensor profile derived from the chirp configuration file.
//!
//! The sensor is configured by a text file of CLI commands, one per line.
//! Only `profileCfg` and `frameCfg` matter for decoding; every other command
//! and every `%` comment line is ignored.
//!
//! ```text
//! % chirp profile
//! profileCfg 0 60 359 7 57.14 0 0 70 1 256 5209 0 0 158
//! frameCfg 0 2 16 0 100 1 0
//! ```

use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

/// Transmit antennas assumed when deriving Doppler bins.
pub const NUM_TX_ANTENNAS: usize = 3;

const SPEED_OF_LIGHT_M_S: f64 = 3e8;

/// Errors raised while loading a sensor profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read sensor config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No `profileCfg` command was present.
    #[error("sensor config has no profileCfg command")]
    MissingProfile,

    /// A command had too few arguments.
    #[error("line {line}: {command} is missing argument {index}")]
    MissingField {
        /// One-based line number.
        line: usize,
        /// Command name.
        command: &'static str,
        /// Zero-based argument index after the command name.
        index: usize,
    },

    /// An argument was not a valid number, or was out of range.
    #[error("line {line}: {command} argument {index} has invalid value {value:?}")]
    InvalidField {
        /// One-based line number.
        line: usize,
        /// Command name.
        command: &'static str,
        /// Zero-based argument index after the command name.
        index: usize,
        /// Offending text.
        value: String,
    },
}

/// Chirp timing from `frameCfg`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// First chirp index in a frame.
    pub chirp_start: u32,
    /// Last chirp index in a frame.
    pub chirp_end: u32,
    /// Loops of the chirp sequence per frame.
    pub loops: u32,
    /// Frames to transmit; zero means unbounded.
    pub frames: u32,
    /// Frame period in milliseconds.
    pub periodicity_ms: f64,
}

impl FrameTiming {
    /// Chirps transmitted per frame.
    #[must_use]
    pub fn chirps_per_frame(&self) -> usize {
        let chirps = self.chirp_end.saturating_sub(self.chirp_start).saturating_add(1);
        usize::try_from(chirps.saturating_mul(self.loops)).unwrap_or(usize::MAX)
    }
}

/// Chirp profile parameters and the quantities derived from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorProfile {
    /// Start frequency in GHz.
    pub start_freq_ghz: f64,
    /// Idle time in microseconds.
    pub idle_time_us: f64,
    /// Ramp end time in microseconds.
    pub ramp_end_time_us: f64,
    /// Frequency slope in MHz/us.
    pub freq_slope_mhz_per_us: f64,
    /// ADC samples per chirp.
    pub adc_samples: NonZeroUsize,
    /// ADC sample rate in ksps.
    pub sample_rate_ksps: f64,
    /// Frame timing, if a `frameCfg` command was present.
    pub frame: Option<FrameTiming>,
}

impl SensorProfile {
    /// Parse configuration text.
    ///
    /// When a command appears more than once the last occurrence wins, as it
    /// does on the sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingProfile`] without a `profileCfg` line, or
    /// a field error for a malformed `profileCfg`/`frameCfg` argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use radarframe::sensor_config::SensorProfile;
    ///
    /// let profile = SensorProfile::from_cfg_str(
    ///     "profileCfg 0 60 359 7 57.14 0 0 70 1 200 5209 0 0 158\n",
    /// )
    /// .expect("valid profile");
    /// assert_eq!(profile.num_range_bins().get(), 256);
    /// ```
    pub fn from_cfg_str(text: &str) -> Result<Self, ConfigError> {
        let mut profile = None;
        let mut frame = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let mut words = raw.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };
            if command.starts_with('%') {
                continue;
            }
            let args: Vec<&str> = words.collect();
            match command {
                "profileCfg" => profile = Some(parse_profile(line, &args)?),
                "frameCfg" => frame = Some(parse_frame(line, &args)?),
                other => debug!("sensor config line {line}: ignoring {other}"),
            }
        }

        let mut profile = profile.ok_or(ConfigError::MissingProfile)?;
        profile.frame = frame;
        Ok(profile)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error
    /// from [`from_cfg_str`](Self::from_cfg_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_cfg_str(&text)
    }

    /// Range bins per profile: ADC samples rounded up to a power of two.
    #[must_use]
    pub fn num_range_bins(&self) -> NonZeroUsize {
        self.adc_samples
            .checked_next_power_of_two()
            .unwrap_or(self.adc_samples)
    }

    /// Physical range resolution in metres.
    #[must_use]
    pub fn range_resolution_m(&self) -> f64 { self.metres_per_bin(self.adc_samples.get()) }

    /// Distance between adjacent range bins in metres.
    #[must_use]
    pub fn range_idx_to_m(&self) -> f64 { self.metres_per_bin(self.num_range_bins().get()) }

    /// Maximum unambiguous range in metres.
    #[must_use]
    pub fn max_range_m(&self) -> f64 {
        (300.0 * 0.9 * self.sample_rate_ksps) / (2.0 * self.freq_slope_mhz_per_us * 1e3)
    }

    /// Doppler bins per frame, if frame timing is known.
    #[must_use]
    pub fn num_doppler_bins(&self) -> Option<usize> {
        self.frame
            .map(|frame| frame.chirps_per_frame() / NUM_TX_ANTENNAS)
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "Sample counts are far below f64's exact integer range."
    )]
    fn metres_per_bin(&self, divisor: usize) -> f64 {
        (SPEED_OF_LIGHT_M_S * self.sample_rate_ksps * 1e3)
            / (2.0 * self.freq_slope_mhz_per_us * 1e12 * divisor as f64)
    }
}

struct Args<'a> {
    line: usize,
    command: &'static str,
    args: &'a [&'a str],
}

impl Args<'_> {
    fn raw(&self, index: usize) -> Result<&str, ConfigError> {
        self.args
            .get(index)
            .copied()
            .ok_or(ConfigError::MissingField {
                line: self.line,
                command: self.command,
                index,
            })
    }

    fn invalid(&self, index: usize, value: &str) -> ConfigError {
        ConfigError::InvalidField {
            line: self.line,
            command: self.command,
            index,
            value: value.to_owned(),
        }
    }

    fn parse<T: std::str::FromStr>(&self, index: usize) -> Result<T, ConfigError> {
        let raw = self.raw(index)?;
        raw.parse().map_err(|_| self.invalid(index, raw))
    }

    fn positive(&self, index: usize) -> Result<f64, ConfigError> {
        let value: f64 = self.parse(index)?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(self.invalid(index, self.raw(index)?))
        }
    }
}

fn parse_profile(line: usize, args: &[&str]) -> Result<SensorProfile, ConfigError> {
    let args = Args {
        line,
        command: "profileCfg",
        args,
    };
    let adc_samples: usize = args.parse(9)?;
    Ok(SensorProfile {
        start_freq_ghz: args.parse(1)?,
        idle_time_us: args.parse(2)?,
        ramp_end_time_us: args.parse(4)?,
        freq_slope_mhz_per_us: args.positive(7)?,
        adc_samples: NonZeroUsize::new(adc_samples)
            .ok_or_else(|| args.invalid(9, "0"))?,
        sample_rate_ksps: args.positive(10)?,
        frame: None,
    })
}

fn parse_frame(line: usize, args: &[&str]) -> Result<FrameTiming, ConfigError> {
    let args = Args {
        line,
        command: "frameCfg",
        args,
    };
    Ok(FrameTiming {
        chirp_start: args.parse(0)?,
        chirp_end: args.parse(1)?,
        loops: args.parse(2)?,
        frames: args.parse(3)?,
        periodicity_ms: args.parse(4)?,
    })
}
