use crate::clock::{Clock, SystemClock};
use crate::config::MAX_TICK_HZ;
use crate::constants::FAVICON_PATH;
use crate::core_fs::LocalStore;
use crate::core_http::{HttpServer, PageContext};
use crate::core_network::{FtpServer, TokioTransport, Transport};
use crate::helpers::log_config;
use crate::Config;
use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Runs both engines at `tick_hz` until Ctrl-C.
///
/// The engines never block; this loop is the only place that waits.
pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);
    info!("Starting server");
    log_config(&config);

    let store = LocalStore::new(&config.server.root_dir)
        .with_context(|| format!("Failed to open root directory: {}", config.server.root_dir))?;
    let mut ftp = FtpServer::new(config.clone(), TokioTransport::new(), store, SystemClock);

    let mut http = if config.http.enabled {
        let mut http = HttpServer::new(config.clone(), TokioTransport::new(), SystemClock);
        install_routes(&mut http, &config)?;
        Some(http)
    } else {
        None
    };

    let micros = u64::from(MAX_TICK_HZ) / u64::from(config.timing.tick_hz.max(1));
    let period = Duration::from_micros(micros.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                ftp.service();
                if let Some(http) = http.as_mut() {
                    http.service();
                }
            }
            res = &mut shutdown => {
                res.context("Failed to listen for the shutdown signal")?;
                info!("Shutting down after {} ticks", ftp.ticks());
                break;
            }
        }
    }

    Ok(())
}

/// Status page, a small form and its POST handler. A `favicon.ico` at the
/// top of the FTP root is served as a static file.
pub fn install_routes<T: Transport, C: Clock>(
    http: &mut HttpServer<T, C>,
    config: &Config,
) -> Result<()> {
    let host = config.server.host_name.clone();
    let ftp_port = config.server.listen_port;
    let started = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    http.set_link("/", "Status", move |page: &mut PageContext<'_>| {
        let _ = write!(
            page,
            "<body>\n<h1>{}</h1>\n<p>FTP on port {}, up since {}</p>\n\
             <form method=\"post\" action=\"/echo\">\n\
             <input type=\"text\" name=\"text\">\n\
             <input type=\"submit\" value=\"Send\">\n\
             </form>\n</body>\n",
            host, ftp_port, started
        );
    })?;

    http.set_cgi("/echo", "Echo", |page: &mut PageContext<'_>| {
        let text = page.form_value("text").unwrap_or("").to_string();
        let _ = writeln!(page, "<p>{}</p>", escape_html(&text));
    })?;

    let favicon = Path::new(&config.server.root_dir).join("favicon.ico");
    if favicon.is_file() {
        http.set_file(FAVICON_PATH, "favicon", favicon)?;
    }

    http.set_not_found("Not Found", |page: &mut PageContext<'_>| {
        page.push_str("<body>\n<h1>Not Found</h1>\n<p><a href=\"/\">Status</a></p>\n</body>\n");
    });

    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
