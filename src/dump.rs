//! Wire-format serialization of requests and responses.
//!
//! A dump is the byte sequence a message has on an HTTP/1 connection: start
//! line, headers, a blank line and, optionally, the body. Dumping never alters
//! the message: when the body is included it is buffered and handed back with
//! the same bytes and the same framing (sized or streamed), otherwise it is not
//! polled at all.

use futures::{future, stream};
use hyper::body::{Bytes, HttpBody};
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use hyper::{Body, Method, Request, Response, Uri, Version};
use std::convert::Infallible;

/// Serializes an outgoing request the way a client writes it on the wire.
///
/// Framing headers the client adds on its own are part of the dump: `Content-Length`
/// for a sized, non-empty body and `Transfer-Encoding: chunked` for a streamed one.
pub async fn dump_request_out(req: Request<Body>, body: bool) -> Result<(Vec<u8>, Request<Body>), hyper::Error> {
    let (parts, req_body) = req.into_parts();
    let exact = req_body.size_hint().exact();
    let mut dump = Vec::new();
    // only HTTP/1 is dumped
    let version = if parts.version == Version::HTTP_10 { "HTTP/1.0" } else { "HTTP/1.1" };
    dump.extend_from_slice(
        format!("{} {} {}\r\n", parts.method, request_target(&parts.method, &parts.uri), version).as_bytes()
    );
    match parts.headers.get(HOST) {
        Some(host) => write_header(&mut dump, &HOST, host.as_bytes()),
        None => {
            if let Some(host) = host_of(&parts.uri) {
                write_header(&mut dump, &HOST, host.as_bytes())
            }
        }
    }
    write_headers(&mut dump, &parts.headers, Some(&HOST));
    let mut chunked = is_chunked(&parts.headers);
    if !parts.headers.contains_key(CONTENT_LENGTH) && !parts.headers.contains_key(TRANSFER_ENCODING) {
        match exact {
            Some(0) => {}
            Some(len) => write_header(&mut dump, &CONTENT_LENGTH, len.to_string().as_bytes()),
            None if parts.version != Version::HTTP_10 => {
                write_header(&mut dump, &TRANSFER_ENCODING, b"chunked");
                chunked = true;
            }
            None => {}
        }
    }
    dump.extend_from_slice(b"\r\n");
    let req_body = if body {
        let bytes = hyper::body::to_bytes(req_body).await?;
        write_body(&mut dump, chunked, &bytes);
        rebuild(bytes, exact)
    } else {
        req_body
    };
    Ok((dump, Request::from_parts(parts, req_body)))
}

/// Serializes a received response, status line first.
pub async fn dump_response(res: Response<Body>, body: bool) -> Result<(Vec<u8>, Response<Body>), hyper::Error> {
    let (parts, res_body) = res.into_parts();
    let exact = res_body.size_hint().exact();
    let mut dump = Vec::new();
    dump.extend_from_slice(format!("{:?} {}", parts.version, parts.status.as_u16()).as_bytes());
    if let Some(reason) = parts.status.canonical_reason() {
        dump.push(b' ');
        dump.extend_from_slice(reason.as_bytes());
    }
    dump.extend_from_slice(b"\r\n");
    write_headers(&mut dump, &parts.headers, None);
    dump.extend_from_slice(b"\r\n");
    let res_body = if body {
        let bytes = hyper::body::to_bytes(res_body).await?;
        write_body(&mut dump, is_chunked(&parts.headers), &bytes);
        rebuild(bytes, exact)
    } else {
        res_body
    };
    Ok((dump, Response::from_parts(parts, res_body)))
}

// A body of unknown size stays a stream, so it keeps being sent chunked.
fn rebuild(bytes: Bytes, exact: Option<u64>) -> Body {
    match exact {
        Some(_) => Body::from(bytes),
        None => Body::wrap_stream(stream::once(future::ready(Ok::<_, Infallible>(bytes)))),
    }
}

fn request_target(method: &Method, uri: &Uri) -> String {
    if *method == Method::CONNECT {
        if let Some(authority) = uri.authority() {
            return authority.to_string();
        }
    }
    match uri.path_and_query() {
        Some(pq) if !pq.as_str().is_empty() => pq.to_string(),
        _ => "/".to_string(),
    }
}

// Default ports are left out, as in the Host header the client sends.
fn host_of(uri: &Uri) -> Option<String> {
    let host = uri.host()?;
    let default_port = match uri.scheme_str() {
        Some("http") => Some(80),
        Some("https") => Some(443),
        _ => None,
    };
    match uri.port_u16() {
        Some(port) if Some(port) != default_port => Some(format!("{}:{}", host, port)),
        _ => Some(host.to_string()),
    }
}

fn write_headers(dump: &mut Vec<u8>, headers: &HeaderMap, skip: Option<&HeaderName>) {
    for (name, value) in headers {
        if Some(name) == skip {
            continue;
        }
        write_header(dump, name, value.as_bytes());
    }
}

fn write_header(dump: &mut Vec<u8>, name: &HeaderName, value: &[u8]) {
    title_case(dump, name.as_str().as_bytes());
    dump.extend_from_slice(b": ");
    dump.extend_from_slice(value);
    dump.extend_from_slice(b"\r\n");
}

// `content-type` is sent as `Content-Type`
fn title_case(dst: &mut Vec<u8>, name: &[u8]) {
    let mut upper = true;
    for &c in name {
        dst.push(if upper { c.to_ascii_uppercase() } else { c });
        upper = c == b'-';
    }
}

fn write_body(dump: &mut Vec<u8>, chunked: bool, body: &Bytes) {
    if chunked {
        if !body.is_empty() {
            dump.extend_from_slice(format!("{:x}\r\n", body.len()).as_bytes());
            dump.extend_from_slice(body);
            dump.extend_from_slice(b"\r\n");
        }
        dump.extend_from_slice(b"0\r\n\r\n");
    } else {
        dump.extend_from_slice(body);
    }
}

fn is_chunked(headers: &HeaderMap) -> bool {
    headers
        .get_all(TRANSFER_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .last()
        .map(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}
