use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One tick per microsecond at most; the driver's period must not be zero.
pub const MAX_TICK_HZ: u32 = 1_000_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_port: u16,
    /// Address advertised in `227` replies. Empty means the local address
    /// of the control connection.
    pub pasv_address: String,
    pub pasv_port: u16,
    pub root_dir: String,
    pub host_name: String,
    pub system_name: String,
    pub username: String,
    /// Plain text, or a bcrypt hash (`$2...`).
    pub password: String,
    pub transfer_chunk_size: usize,
    pub line_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 21,
            pasv_address: String::new(),
            pasv_port: 55600,
            root_dir: String::from("/var/ftp"),
            host_name: String::from("tickftpd"),
            system_name: String::from("tickftpd"),
            username: String::from("ftp"),
            password: String::from("ftp"),
            transfer_chunk_size: 8192,
            line_capacity: 1024,
        }
    }
}

/// Every timeout is expressed in service ticks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_hz: u32,
    pub login_timeout_ticks: u32,
    pub data_connection_timeout_ticks: u32,
    pub transfer_timeout_ticks: u32,
    pub disconnect_linger_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_hz: 100,
            login_timeout_ticks: 100 * 30,
            data_connection_timeout_ticks: 100 * 10,
            transfer_timeout_ticks: 100 * 10,
            disconnect_linger_ticks: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub listen_port: u16,
    pub server_name: String,
    pub max_routes: usize,
    pub request_capacity: usize,
    /// Idle ticks allowed while a request is incomplete.
    pub request_timeout_ticks: u32,
    pub disconnect_delay_ticks: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_port: 80,
            server_name: String::from("tickftpd"),
            max_routes: 16,
            request_capacity: 2048,
            request_timeout_ticks: 100 * 10,
            disconnect_delay_ticks: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub timing: TimingConfig,
    pub http: HttpConfig,
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timing.tick_hz == 0 || self.timing.tick_hz > MAX_TICK_HZ {
            bail!("timing.tick_hz must be between 1 and {}", MAX_TICK_HZ);
        }
        if self.server.transfer_chunk_size == 0 {
            bail!("server.transfer_chunk_size must be greater than zero");
        }
        if self.server.line_capacity == 0 {
            bail!("server.line_capacity must be greater than zero");
        }
        if self.http.request_capacity == 0 {
            bail!("http.request_capacity must be greater than zero");
        }
        if self.http.max_routes == 0 {
            bail!("http.max_routes must be greater than zero");
        }
        if self.http.request_timeout_ticks == 0 {
            bail!("http.request_timeout_ticks must be greater than zero");
        }
        self.pasv_ip()?;
        Ok(())
    }

    /// Parsed `pasv_address`, `None` when it is left empty.
    pub fn pasv_ip(&self) -> Result<Option<Ipv4Addr>> {
        let addr = self.server.pasv_address.trim();
        if addr.is_empty() {
            return Ok(None);
        }
        let ip = addr
            .parse::<Ipv4Addr>()
            .with_context(|| format!("Invalid server.pasv_address: {}", addr))?;
        Ok(Some(ip))
    }
}
