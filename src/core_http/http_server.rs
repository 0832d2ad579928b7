use crate::clock::Clock;
use crate::config::Config;
use crate::constants::FAVICON_PATH;
use crate::core_buffer::OutBuffer;
use crate::core_http::error::HttpError;
use crate::core_http::request::{flatten_form, Method, Request, RequestParser};
use crate::core_http::response::{
    content_type, make_head, make_info, patch_content_length, TEXT_HTML,
};
use crate::core_http::route::{PageContext, Route, RouteTable};
use crate::core_network::transport::{Role, SocketHandle, SocketOptions, Transport};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HTTP_READ_CHUNK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpTask {
    BeginHttp,
    WaitHttp,
    MainLoop,
    /// Response queued; drain it and linger before closing.
    DisconnectDelay,
    Disconnect,
}

/// Everything needed to write one response, borrowed from the engine.
struct Responder<'a> {
    out: &'a mut OutBuffer,
    server_name: &'a str,
    now: DateTime<Utc>,
    started: DateTime<Utc>,
}

impl Responder<'_> {
    /// Header, document envelope and the route's body.
    fn page(&mut self, status: u16, route: &Route, path: &str) {
        let offset = self.header(status, None, TEXT_HTML);
        let body_start = self.out.len();
        self.out.push_str("<!DOCTYPE HTML>\n<html>\n");
        make_head(self.out, self.server_name, &route.title);
        route.render(&mut PageContext::new(self.out, path, "", &[]));
        self.out.push_str("</html>\n");
        self.finish(offset, body_start);
    }

    /// Header and the route's raw output.
    fn cgi(&mut self, route: &Route, path: &str, post_body: &str, form: &[(String, String)]) {
        let offset = self.header(200, None, TEXT_HTML);
        let body_start = self.out.len();
        route.render(&mut PageContext::new(self.out, path, post_body, form));
        self.finish(offset, body_start);
    }

    /// Header and the file's bytes; `false` when the file can't be read.
    fn file(&mut self, file: &Path) -> bool {
        let data = match fs::read(file) {
            Ok(data) => data,
            Err(e) => {
                warn!("HTTP Server: can't read {}: {}", file.display(), e);
                return false;
            }
        };
        self.header(200, Some(data.len()), content_type(file));
        self.out.push_bytes(&data);
        debug!("HTTP file {} ({} bytes)", file.display(), data.len());
        true
    }

    fn empty(&mut self, status: u16) {
        self.header(status, Some(0), TEXT_HTML);
    }

    fn header(&mut self, status: u16, length: Option<usize>, content_type: &str) -> Option<usize> {
        make_info(
            self.out,
            status,
            length,
            content_type,
            self.server_name,
            self.now,
            self.started,
        )
    }

    fn finish(&mut self, offset: Option<usize>, body_start: usize) {
        let len = self.out.len() - body_start;
        if let Some(offset) = offset {
            patch_content_length(self.out, offset, len);
        }
        debug!("HTTP body {} bytes", len);
    }
}

/// Single-connection HTTP engine driven by [`HttpServer::service`].
///
/// Serves one request per connection from a table of render closures and
/// closes the connection once the response has drained.
pub struct HttpServer<T: Transport, C: Clock> {
    config: Arc<Config>,
    transport: T,
    clock: C,
    routes: RouteTable,
    fallback: Route,
    parser: RequestParser,
    out: OutBuffer,
    task: HttpTask,
    handle: Option<SocketHandle>,
    started: DateTime<Utc>,
    delay: u32,
    /// Ticks left for the peer to finish its request.
    idle: u32,
    /// Ticks to wait in `Disconnect` before listening again.
    retry: u32,
    connections: u64,
    ticks: u64,
}

impl<T: Transport, C: Clock> HttpServer<T, C> {
    pub fn new(config: Arc<Config>, transport: T, clock: C) -> Self {
        let started = clock.now().with_timezone(&Utc);
        let fallback = Route::new(
            "",
            "Not Found",
            false,
            Box::new(|page: &mut PageContext<'_>| {
                page.push_str("<body>\n<h1>404 Not Found</h1>\n</body>\n")
            }),
        );
        Self {
            routes: RouteTable::new(config.http.max_routes),
            parser: RequestParser::new(config.http.request_capacity),
            config,
            transport,
            clock,
            fallback,
            out: OutBuffer::new(),
            task: HttpTask::BeginHttp,
            handle: None,
            started,
            delay: 0,
            idle: 0,
            retry: 0,
            connections: 0,
            ticks: 0,
        }
    }

    pub fn task(&self) -> HttpTask {
        self.task
    }

    /// Requests answered since start.
    pub fn connections(&self) -> u64 {
        self.connections
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn set_link<R>(&mut self, path: &str, title: &str, render: R) -> Result<(), HttpError>
    where
        R: Fn(&mut PageContext<'_>) + Send + Sync + 'static,
    {
        self.routes.set_link(path, title, render)
    }

    pub fn set_cgi<R>(&mut self, path: &str, title: &str, render: R) -> Result<(), HttpError>
    where
        R: Fn(&mut PageContext<'_>) + Send + Sync + 'static,
    {
        self.routes.set_cgi(path, title, render)
    }

    pub fn set_file(
        &mut self,
        path: &str,
        title: &str,
        file: impl Into<PathBuf>,
    ) -> Result<(), HttpError> {
        self.routes.set_file(path, title, file)
    }

    pub fn set_not_found<R>(&mut self, title: &str, render: R)
    where
        R: Fn(&mut PageContext<'_>) + Send + Sync + 'static,
    {
        self.routes.set_not_found(title, render)
    }

    pub fn clear_links(&mut self) {
        self.routes.clear_links()
    }

    /// Runs one tick.
    pub fn service(&mut self) {
        self.ticks += 1;
        self.transport.service();

        match self.task {
            HttpTask::BeginHttp => self.begin(),
            HttpTask::WaitHttp => self.accept(),
            HttpTask::MainLoop => self.main_loop(),
            HttpTask::DisconnectDelay => self.drain(),
            HttpTask::Disconnect => {
                if let Some(handle) = self.handle.take() {
                    self.transport.close(handle);
                    debug!("HTTP connection closed");
                }
                self.parser.clear();
                self.out.clear();
                if self.retry > 0 {
                    self.retry -= 1;
                    return;
                }
                self.task = HttpTask::BeginHttp;
            }
        }
    }

    fn begin(&mut self) {
        let port = self.config.http.listen_port;
        let opened = self
            .transport
            .open(SocketOptions::data(self.config.http.request_capacity))
            .and_then(|handle| {
                self.handle = Some(handle);
                self.transport
                    .start(handle, Ipv4Addr::UNSPECIFIED, port, Role::Server)
            });
        match opened {
            Ok(()) => {
                debug!("HTTP Server listening on port {}", port);
                self.task = HttpTask::WaitHttp;
            }
            Err(e) => {
                error!("HTTP Server: can't listen on port {}: {}", port, e);
                self.retry = self.config.http.disconnect_delay_ticks;
                self.task = HttpTask::Disconnect;
            }
        }
    }

    fn accept(&mut self) {
        let Some(handle) = self.handle else {
            self.task = HttpTask::BeginHttp;
            return;
        };
        if !self.transport.probe(handle) {
            self.task = HttpTask::Disconnect;
            return;
        }
        if self.transport.connected(handle) {
            if let Some(peer) = self.transport.peer_ip(handle) {
                debug!("HTTP connection from {}", peer);
            }
            self.parser.clear();
            self.out.clear();
            self.idle = self.config.http.request_timeout_ticks;
            self.task = HttpTask::MainLoop;
        }
    }

    fn main_loop(&mut self) {
        let Some(handle) = self.handle else {
            self.task = HttpTask::Disconnect;
            return;
        };

        let mut buf = [0u8; HTTP_READ_CHUNK];
        let want = self.parser.remaining().clamp(1, HTTP_READ_CHUNK);
        match self.transport.recv(handle, &mut buf[..want]) {
            Ok(0) => {
                if !self.transport.connected(handle) {
                    debug!("HTTP peer left before sending a request");
                    self.task = HttpTask::Disconnect;
                    return;
                }
                if self.idle == 0 {
                    warn!("HTTP Server: request timeout");
                    self.task = HttpTask::Disconnect;
                    return;
                }
                self.idle -= 1;
            }
            Ok(n) => {
                if let Err(e) = self.parser.push(&buf[..n]) {
                    warn!("HTTP Server: {}", e);
                    self.linger();
                    return;
                }
                self.idle = self.config.http.request_timeout_ticks;
            }
            Err(e) => {
                debug!("HTTP read failed: {}", e);
                self.task = HttpTask::Disconnect;
                return;
            }
        }

        if let Some(request) = self.parser.parse() {
            self.respond(request);
            self.linger();
        }
    }

    fn linger(&mut self) {
        self.delay = self.config.http.disconnect_delay_ticks;
        self.task = HttpTask::DisconnectDelay;
    }

    fn respond(&mut self, request: Request) {
        self.connections += 1;
        info!("HTTP {} {}", request.method, request.path);

        let mut responder = Responder {
            out: &mut self.out,
            server_name: &self.config.http.server_name,
            now: self.clock.now().with_timezone(&Utc),
            started: self.started,
        };
        let not_found = self.routes.not_found().unwrap_or(&self.fallback);
        let path = request.path.as_str();

        match request.method {
            Method::Get => match self.routes.find(path, false) {
                Some(route) => match route.file_path() {
                    Some(file) => {
                        if !responder.file(file) {
                            responder.page(404, not_found, path)
                        }
                    }
                    None => responder.page(200, route, path),
                },
                None if path == FAVICON_PATH => responder.empty(404),
                None => {
                    info!("HTTP not found: {}", path);
                    responder.page(404, not_found, path)
                }
            },
            Method::Post => match self.routes.find(path, true) {
                Some(route) => {
                    let form = request.form();
                    let flat = flatten_form(&form);
                    responder.cgi(route, path, &flat, &form)
                }
                None => {
                    info!("HTTP not found: {}", path);
                    responder.page(404, not_found, path)
                }
            },
            Method::Other(ref method) => {
                warn!("HTTP method not supported: {}", method);
            }
        }
    }

    fn drain(&mut self) {
        let Some(handle) = self.handle else {
            self.task = HttpTask::Disconnect;
            return;
        };
        let sent = match self.out.flush_to(&mut self.transport, handle) {
            Ok(n) => n,
            Err(e) => {
                debug!("HTTP send failed: {}", e);
                self.out.clear();
                self.task = HttpTask::Disconnect;
                return;
            }
        };
        // Only idle ticks count towards the close.
        if sent == 0 {
            if self.delay == 0 {
                self.task = HttpTask::Disconnect;
            } else {
                self.delay -= 1;
            }
        }
    }
}
