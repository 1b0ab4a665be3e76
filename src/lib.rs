//! Logs the raw bytes of the HTTP requests and responses going through a hyper client.
//!
//! ```no_run
//! use httplog::{RoundTripLogger, Sink};
//! use hyper::Uri;
//!
//! # async fn run() -> Result<(), httplog::BoxError> {
//! let logger = RoundTripLogger::builder().prefixed(Sink::stdout());
//! let _res = logger.get(Uri::from_static("http://example.com/")).await?;
//! # Ok(())
//! # }
//! ```
pub mod conf;
pub mod dump;
pub mod sink;
pub mod transport;

pub use crate::conf::{ConfError, LoggerConf, SinkTarget};
pub use crate::sink::Sink;
pub use crate::transport::{http_transport, BoxError, Builder, DefaultTransport, HttpTransport, RoundTripLogger, RoundTripper};
