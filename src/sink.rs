use log::Level;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

pub const REQUEST_PREFIX: &[u8] = b"-> ";
pub const RESPONSE_PREFIX: &[u8] = b"<- ";

pub type DumpFn = Arc<dyn Fn(&[u8]) + Send + Sync>;

type PrintFn = Box<dyn Fn(fmt::Arguments<'_>) -> io::Result<usize> + Send + Sync>;
type LogFn = Box<dyn Fn(fmt::Arguments<'_>) + Send + Sync>;

/// Destination of the prefixed dumps.
///
/// Exactly one delivery mechanism per sink:
/// - a byte stream, written once per dump (`std::io::stdout()`, a file, a `Vec<u8>`...),
/// - a print-like function reporting how much it wrote, like `write!` on stdout,
/// - a log-like function returning nothing, like `log::info!`.
pub enum Sink {
    Writer(Mutex<Box<dyn Write + Send>>),
    Print(PrintFn),
    Log(LogFn),
}

impl Sink {
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Sink::Writer(Mutex::new(Box::new(writer)))
    }

    pub fn from_print_fn<F>(f: F) -> Self
    where
        F: Fn(fmt::Arguments<'_>) -> io::Result<usize> + Send + Sync + 'static,
    {
        Sink::Print(Box::new(f))
    }

    pub fn from_log_fn<F>(f: F) -> Self
    where
        F: Fn(fmt::Arguments<'_>) + Send + Sync + 'static,
    {
        Sink::Log(Box::new(f))
    }

    pub fn stdout() -> Self {
        Sink::from_writer(io::stdout())
    }

    pub fn stderr() -> Self {
        Sink::from_writer(io::stderr())
    }

    /// Emits every dump as a single `log` record at `level`.
    pub fn log(level: Level) -> Self {
        Sink::from_log_fn(move |args| log::log!(level, "{}", args))
    }

    /// The request (`-> `) and response (`<- `) callbacks, sharing this sink.
    pub fn into_dump_fns(self) -> (DumpFn, DumpFn) {
        let sink = Arc::new(self);
        let res_sink = sink.clone();
        (
            Arc::new(move |buf: &[u8]| sink.emit(REQUEST_PREFIX, buf)),
            Arc::new(move |buf: &[u8]| res_sink.emit(RESPONSE_PREFIX, buf)),
        )
    }

    fn emit(&self, prefix: &[u8], buf: &[u8]) {
        match self {
            Sink::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writer.write_all(&format_dump(prefix, buf)).and_then(|_| writer.flush()) {
                    log::debug!("dropped http dump, write failed: {}", e);
                }
            }
            Sink::Print(printf) => {
                let text = String::from_utf8_lossy(&prefixed(prefix, buf)).into_owned();
                if let Err(e) = printf(format_args!("{}\n\n", text)) {
                    log::debug!("dropped http dump, print failed: {}", e);
                }
            }
            Sink::Log(logf) => {
                let text = String::from_utf8_lossy(&prefixed(prefix, buf)).into_owned();
                logf(format_args!("{}\n\n", text))
            }
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Writer(_) => f.write_str("Sink::Writer"),
            Sink::Print(_) => f.write_str("Sink::Print"),
            Sink::Log(_) => f.write_str("Sink::Log"),
        }
    }
}

/// `buf` with `prefix` at its start and after each `\n`.
pub fn prefixed(prefix: &[u8], buf: &[u8]) -> Vec<u8> {
    let newlines = buf.iter().filter(|&&b| b == b'\n').count();
    let mut out = Vec::with_capacity(buf.len() + prefix.len() * (newlines + 1) + 2);
    out.extend_from_slice(prefix);
    for &b in buf {
        out.push(b);
        if b == b'\n' {
            out.extend_from_slice(prefix);
        }
    }
    out
}

/// [`prefixed`] followed by a blank separator line.
pub fn format_dump(prefix: &[u8], buf: &[u8]) -> Vec<u8> {
    let mut out = prefixed(prefix, buf);
    out.extend_from_slice(b"\n\n");
    out
}
