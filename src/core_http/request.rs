use crate::core_http::error::HttpError;
use log::trace;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
            Method::Other(m) => f.write_str(m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request target up to the query string.
    pub path: String,
    pub content_length: usize,
    pub body: String,
}

impl Request {
    /// Decoded `application/x-www-form-urlencoded` pairs of the body.
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }
}

/// Flattens decoded pairs back to `k=v&k2=v2` without re-encoding.
pub fn flatten_form(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Accumulates one request, headers and body, within a fixed capacity.
#[derive(Debug)]
pub struct RequestParser {
    buf: Vec<u8>,
    capacity: usize,
}

impl RequestParser {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.buf.len())
    }

    pub fn push(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        if bytes.len() > self.remaining() {
            return Err(HttpError::RequestTooLarge {
                capacity: self.capacity,
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Offset of the first body byte once the blank line has arrived.
    fn header_end(&self) -> Option<usize> {
        let mut line_start = 0;
        for (i, &b) in self.buf.iter().enumerate() {
            if b != b'\n' {
                continue;
            }
            let line = &self.buf[line_start..i];
            if line.is_empty() || line == b"\r" {
                return Some(i + 1);
            }
            line_start = i + 1;
        }
        None
    }

    /// The request, once the header block and `Content-Length` body bytes
    /// are all buffered.
    pub fn parse(&self) -> Option<Request> {
        let body_start = self.header_end()?;
        let head = String::from_utf8_lossy(&self.buf[..body_start]);
        let mut lines = head.lines().map(|l| l.trim_end_matches('\r'));

        let request_line = lines.next()?;
        let mut parts = request_line.split(' ');
        let method = Method::parse(parts.next().unwrap_or(""));
        let target = parts.next().unwrap_or("/");
        let path = target.split('?').next().unwrap_or(target).to_string();

        let content_length = lines
            .filter_map(|l| l.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body = &self.buf[body_start..];
        if method == Method::Post && body.len() < content_length {
            trace!("HTTP body {}/{} bytes", body.len(), content_length);
            return None;
        }
        let body = if method == Method::Post {
            String::from_utf8_lossy(&body[..content_length]).into_owned()
        } else {
            String::new()
        };

        Some(Request {
            method,
            path,
            content_length,
            body,
        })
    }
}
