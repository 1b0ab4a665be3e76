use httplog::{BoxError, LoggerConf, RoundTripLogger, RoundTripper, SinkTarget};
use hyper::{Body, Request, Uri};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process;

const USAGE: &str = "usage: httplog <url> [--sink stdout|stderr|log|log:<level>] [--no-request-body] [--no-response-body]";

struct Args {
    url: Uri,
    sink: SinkTarget,
    conf: LoggerConf,
}

fn parse_args() -> Result<Args, BoxError> {
    let mut url = None;
    let mut sink = SinkTarget::default();
    let mut conf = LoggerConf::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sink" => sink = args.next().ok_or("--sink needs a value")?.parse()?,
            "--no-request-body" => conf.request_body = false,
            "--no-response-body" => conf.response_body = false,
            _ if url.is_none() => url = Some(arg.parse::<Uri>()?),
            other => return Err(format!("unexpected argument `{}`", other).into()),
        }
    }
    Ok(Args {
        url: url.ok_or(USAGE)?,
        sink,
        conf,
    })
}

async fn run(args: Args) -> Result<(), BoxError> {
    let logger = RoundTripLogger::builder().conf(args.conf).prefixed(args.sink.into_sink());
    let req = Request::get(args.url)
        .header("user-agent", concat!("httplog/", env!("CARGO_PKG_VERSION")))
        .body(Body::empty())?;
    let res = logger.round_trip(req).await?;
    log::info!("{} answered {}", env!("CARGO_PKG_NAME"), res.status());
    Ok(())
}

#[tokio::main]
async fn main() {
    SimpleLogger::new().with_level(LevelFilter::Info).init().ok();
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            process::exit(2);
        }
    };
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        process::exit(1);
    }
}
