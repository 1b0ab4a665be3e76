use crate::sink::Sink;
use log::Level;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfError {
    #[error("unsupported sink `{0}`, expected stdout, stderr, log or log:<level>")]
    UnsupportedSink(String),
    #[error("unknown log level `{0}`")]
    Level(String),
}

/// Sink named in text, e.g. on a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    Stderr,
    Log(Level),
}

impl SinkTarget {
    pub fn into_sink(self) -> Sink {
        match self {
            SinkTarget::Stdout => Sink::stdout(),
            SinkTarget::Stderr => Sink::stderr(),
            SinkTarget::Log(level) => Sink::log(level),
        }
    }
}

impl Default for SinkTarget {
    fn default() -> Self {
        SinkTarget::Stdout
    }
}

impl FromStr for SinkTarget {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stdout" | "-" => Ok(SinkTarget::Stdout),
            "stderr" => Ok(SinkTarget::Stderr),
            "log" => Ok(SinkTarget::Log(Level::Info)),
            other => match other.strip_prefix("log:") {
                Some(level) => Level::from_str(level)
                    .map(SinkTarget::Log)
                    .map_err(|_| ConfError::Level(level.to_string())),
                None => Err(ConfError::UnsupportedSink(other.to_string())),
            },
        }
    }
}
