pub mod sink;

pub use self::sink::{ConfError, SinkTarget};

/// What a [`RoundTripLogger`](crate::transport::RoundTripLogger) puts in its dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerConf {
    pub request_body: bool,
    pub response_body: bool,
}

impl Default for LoggerConf {
    fn default() -> Self {
        LoggerConf {
            request_body: true,
            response_body: true,
        }
    }
}

impl LoggerConf {
    /// Leaving a body out is useful when it is binary.
    pub fn with_bodies(self, request: bool, response: bool) -> Self {
        LoggerConf {
            request_body: request,
            response_body: response,
        }
    }
}
