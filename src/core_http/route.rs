use crate::core_buffer::OutBuffer;
use crate::core_http::error::HttpError;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// Page renderer. Writes HTML into the page; the engine supplies the
/// header block and, for normal pages, the document envelope.
pub type RenderFn = Box<dyn Fn(&mut PageContext<'_>) + Send + Sync>;

pub struct Route {
    pub path: String,
    pub title: String,
    /// CGI routes answer POST requests and render without the envelope.
    pub cgi: bool,
    /// Served as-is on GET instead of rendering.
    pub file: Option<PathBuf>,
    render: RenderFn,
}

impl Route {
    pub fn new(path: &str, title: &str, cgi: bool, render: RenderFn) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            cgi,
            file: None,
            render,
        }
    }

    /// A GET route answered with the content of `file`.
    pub fn file(path: &str, title: &str, file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::new(path, title, false, Box::new(|_: &mut PageContext<'_>| {}))
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn render(&self, page: &mut PageContext<'_>) {
        (self.render)(page)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("cgi", &self.cgi)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// Bounded route table keyed by `(path, cgi)`.
///
/// Re-registering a key replaces the entry in place, so insertion order is
/// kept and lookups return the first match.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
    max: usize,
    not_found: Option<Route>,
}

impl RouteTable {
    pub fn new(max: usize) -> Self {
        Self {
            routes: Vec::with_capacity(max),
            max,
            not_found: None,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn insert(&mut self, route: Route) -> Result<(), HttpError> {
        if let Some(slot) = self
            .routes
            .iter_mut()
            .find(|r| r.path == route.path && r.cgi == route.cgi)
        {
            debug!("HTTP route replaced: {} (cgi={})", route.path, route.cgi);
            *slot = route;
            return Ok(());
        }
        if self.routes.len() >= self.max {
            return Err(HttpError::RouteTableFull { max: self.max });
        }
        debug!("HTTP route added: {} (cgi={})", route.path, route.cgi);
        self.routes.push(route);
        Ok(())
    }

    /// Registers a page served on GET.
    pub fn set_link<R>(&mut self, path: &str, title: &str, render: R) -> Result<(), HttpError>
    where
        R: Fn(&mut PageContext<'_>) + Send + Sync + 'static,
    {
        self.insert(Route::new(path, title, false, Box::new(render)))
    }

    /// Registers a handler invoked on POST with the decoded form body.
    pub fn set_cgi<R>(&mut self, path: &str, title: &str, render: R) -> Result<(), HttpError>
    where
        R: Fn(&mut PageContext<'_>) + Send + Sync + 'static,
    {
        self.insert(Route::new(path, title, true, Box::new(render)))
    }

    /// Registers a static file served on GET.
    pub fn set_file(
        &mut self,
        path: &str,
        title: &str,
        file: impl Into<PathBuf>,
    ) -> Result<(), HttpError> {
        self.insert(Route::file(path, title, file))
    }

    /// Page rendered with status 404 for unknown paths.
    pub fn set_not_found<R>(&mut self, title: &str, render: R)
    where
        R: Fn(&mut PageContext<'_>) + Send + Sync + 'static,
    {
        self.not_found = Some(Route::new("", title, false, Box::new(render)));
    }

    pub fn not_found(&self) -> Option<&Route> {
        self.not_found.as_ref()
    }

    /// Drops every route, the not-found page included.
    pub fn clear_links(&mut self) {
        self.routes.clear();
        self.not_found = None;
    }

    pub fn find(&self, path: &str, cgi: bool) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path && r.cgi == cgi)
    }
}

/// What a render closure sees of the current request.
pub struct PageContext<'a> {
    out: &'a mut OutBuffer,
    pub path: &'a str,
    /// URL-decoded POST body, `k=v&k2=v2`; empty for GET.
    pub post_body: &'a str,
    pub form: &'a [(String, String)],
}

impl<'a> PageContext<'a> {
    pub fn new(
        out: &'a mut OutBuffer,
        path: &'a str,
        post_body: &'a str,
        form: &'a [(String, String)],
    ) -> Self {
        Self {
            out,
            path,
            post_body,
            form,
        }
    }

    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Write for PageContext<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}
