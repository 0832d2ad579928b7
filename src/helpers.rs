use crate::Config;
use log::info;

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Port: {}", config.server.listen_port);
    info!(
        "  PASV Address: {}",
        if config.server.pasv_address.is_empty() {
            "(control socket address)"
        } else {
            config.server.pasv_address.as_str()
        }
    );
    info!("  PASV Port: {}", config.server.pasv_port);
    info!("  Root Directory: {}", config.server.root_dir);
    info!("  User: {}", config.server.username);
    info!(
        "  Transfer Chunk Size: {} KB",
        config.server.transfer_chunk_size / 1024
    );
    info!("  Tick Rate: {} Hz", config.timing.tick_hz);
    if config.http.enabled {
        info!("  HTTP Port: {}", config.http.listen_port);
    } else {
        info!("  HTTP: disabled");
    }
}
