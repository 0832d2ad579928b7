use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tickftpd", about = "A tick-driven FTP server with an HTTP status page.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Directory served over FTP
    #[arg(short, long)]
    pub root_dir: Option<String>,

    /// FTP control port
    #[arg(long)]
    pub ftp_port: Option<u16>,

    /// HTTP port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Run without the HTTP engine
    #[arg(long)]
    pub no_http: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a bcrypt hash of the given password and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}

impl Cli {
    /// Path given on the command line, else `default`.
    pub fn config_path<'a>(&'a self, default: &'a str) -> &'a str {
        if self.config.is_empty() {
            default
        } else {
            self.config.as_str()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_parse() {
        let cli = Cli::parse_from([
            "tickftpd",
            "--root-dir",
            "/srv/ftp",
            "--ftp-port",
            "2121",
            "--no-http",
            "-v",
        ]);
        assert_eq!(cli.root_dir.as_deref(), Some("/srv/ftp"));
        assert_eq!(cli.ftp_port, Some(2121));
        assert!(cli.no_http);
        assert!(cli.verbose);
        assert_eq!(cli.config_path("/etc/x.conf"), "/etc/x.conf");
    }
}
