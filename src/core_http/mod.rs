pub mod error;
pub mod http_server;
pub mod request;
pub mod response;
pub mod route;

pub use error::HttpError;
pub use http_server::{HttpServer, HttpTask};
pub use request::{Method, Request, RequestParser};
pub use route::{PageContext, RenderFn, Route, RouteTable};
