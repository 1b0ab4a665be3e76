use crate::conf::LoggerConf;
use crate::dump::{dump_request_out, dump_response};
use crate::sink::{DumpFn, Sink};
use async_trait::async_trait;
use futures::task::{Context, Poll};
use hyper::client::connect::Connect;
use hyper::client::HttpConnector;
use hyper::service::Service;
use hyper::{Body, Client, Request, Response, Uri};
use hyper_tls::HttpsConnector;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything able to turn a request into a response.
#[async_trait]
pub trait RoundTripper: Send + Sync {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError>;
}

#[async_trait]
impl<C> RoundTripper for Client<C, Body>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        Ok(self.request(req).await?)
    }
}

pub type HttpTransport = Client<HttpsConnector<HttpConnector>>;

/// A plain hyper client (http and https) writing header names the way they are dumped.
pub fn http_transport() -> HttpTransport {
    Client::builder()
        .http1_title_case_headers(true)
        .build(HttpsConnector::new())
}

static GLOBAL_DEFAULT: OnceLock<DefaultTransport> = OnceLock::new();

/// Replaceable transport used by loggers built without an inner transport.
///
/// Handles are cheap to clone and all clones see the same transport. A logger
/// reads the current transport on every round trip, so calling [`DefaultTransport::set`]
/// affects loggers that were already built.
#[derive(Clone)]
pub struct DefaultTransport {
    current: Arc<RwLock<Arc<dyn RoundTripper>>>,
}

impl DefaultTransport {
    pub fn new<T: RoundTripper + 'static>(transport: T) -> Self {
        DefaultTransport {
            current: Arc::new(RwLock::new(Arc::new(transport))),
        }
    }

    /// The process-wide handle, holding [`http_transport`] until replaced.
    pub fn global() -> Self {
        GLOBAL_DEFAULT
            .get_or_init(|| DefaultTransport::new(http_transport()))
            .clone()
    }

    pub fn set<T: RoundTripper + 'static>(&self, transport: T) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(transport);
    }

    pub fn get(&self) -> Arc<dyn RoundTripper> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl fmt::Debug for DefaultTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultTransport")
    }
}

/// Transport logging the raw request and response of every completed round trip.
///
/// The request dump goes to the request callback, then the response dump to the
/// response callback, once the response head has been received and dumped.
/// Failed round trips are not logged and their error is returned as is.
#[derive(Clone)]
pub struct RoundTripLogger {
    transport: Option<Arc<dyn RoundTripper>>,
    fallback: Option<DefaultTransport>,
    reqf: DumpFn,
    resf: DumpFn,
    conf: LoggerConf,
}

impl RoundTripLogger {
    /// Logs to `reqf` and `resf`, going through `transport` or, when `None`, the global default.
    ///
    /// A bare `None` leaves `T` unknown: write `None::<HttpTransport>`, or use
    /// [`RoundTripLogger::builder`] which needs no transport type.
    pub fn new<T, Req, Res>(transport: Option<T>, reqf: Req, resf: Res) -> Self
    where
        T: RoundTripper + 'static,
        Req: Fn(&[u8]) + Send + Sync + 'static,
        Res: Fn(&[u8]) + Send + Sync + 'static,
    {
        let mut builder = Builder::default();
        if let Some(transport) = transport {
            builder = builder.transport(transport);
        }
        builder.build(reqf, resf)
    }

    /// Logs to `sink`, requests prefixed with `-> ` and responses with `<- `.
    ///
    /// As with [`RoundTripLogger::new`], pass `None::<HttpTransport>` for the default transport.
    pub fn prefixed<T: RoundTripper + 'static>(transport: Option<T>, sink: Sink) -> Self {
        let mut builder = Builder::default();
        if let Some(transport) = transport {
            builder = builder.transport(transport);
        }
        builder.prefixed(sink)
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn conf(&self) -> &LoggerConf {
        &self.conf
    }

    pub async fn get(&self, uri: Uri) -> Result<Response<Body>, BoxError> {
        let req = Request::get(uri).body(Body::empty())?;
        self.round_trip(req).await
    }

    fn inner(&self) -> Arc<dyn RoundTripper> {
        match &self.transport {
            Some(transport) => transport.clone(),
            None => match &self.fallback {
                Some(fallback) => fallback.get(),
                None => DefaultTransport::global().get(),
            },
        }
    }
}

#[async_trait]
impl RoundTripper for RoundTripLogger {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let transport = self.inner();
        let (req_dump, req) = dump_request_out(req, self.conf.request_body).await?;
        let res = match transport.round_trip(req).await {
            Ok(res) => res,
            Err(e) => {
                log::debug!("round trip failed, nothing logged: {}", e);
                return Err(e);
            }
        };
        let (res_dump, res) = dump_response(res, self.conf.response_body).await?;
        log::trace!("dumped {} request bytes, {} response bytes", req_dump.len(), res_dump.len());
        (self.reqf)(&req_dump);
        (self.resf)(&res_dump);
        Ok(res)
    }
}

impl Service<Request<Body>> for RoundTripLogger {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let logger = self.clone();
        Box::pin(async move { logger.round_trip(req).await })
    }
}

impl fmt::Debug for RoundTripLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundTripLogger")
            .field("transport", &self.transport.as_ref().map(|_| "custom").unwrap_or("default"))
            .field("conf", &self.conf)
            .finish()
    }
}

#[derive(Default)]
pub struct Builder {
    transport: Option<Arc<dyn RoundTripper>>,
    fallback: Option<DefaultTransport>,
    conf: LoggerConf,
}

impl Builder {
    pub fn transport<T: RoundTripper + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Default consulted when no transport is set, instead of [`DefaultTransport::global`].
    pub fn default_transport(mut self, fallback: DefaultTransport) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn conf(mut self, conf: LoggerConf) -> Self {
        self.conf = conf;
        self
    }

    pub fn with_bodies(mut self, request: bool, response: bool) -> Self {
        self.conf = self.conf.with_bodies(request, response);
        self
    }

    pub fn build<Req, Res>(self, reqf: Req, resf: Res) -> RoundTripLogger
    where
        Req: Fn(&[u8]) + Send + Sync + 'static,
        Res: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.build_with(Arc::new(reqf), Arc::new(resf))
    }

    pub fn prefixed(self, sink: Sink) -> RoundTripLogger {
        let (reqf, resf) = sink.into_dump_fns();
        self.build_with(reqf, resf)
    }

    fn build_with(self, reqf: DumpFn, resf: DumpFn) -> RoundTripLogger {
        RoundTripLogger {
            transport: self.transport,
            fallback: self.fallback,
            reqf,
            resf,
            conf: self.conf,
        }
    }
}
