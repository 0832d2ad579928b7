use crate::config::Config;
use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::core_network::data_channel::DataChannel;
use crate::core_network::error::TransportError;
use crate::core_network::transport::{Role, SocketOptions, Transport};
use crate::session::{Session, Task};
use log::{debug, error, warn};
use std::net::Ipv4Addr;

/// Handles the PASV FTP command.
///
/// Any previous channel is closed here; the listener itself is opened on
/// the next tick, in `StartPasv`, and only then is the `227` sent.
pub fn handle_pasv_command(ctx: &mut CommandContext<'_>) -> HandlerResult {
    ctx.session.close_data(&mut *ctx.transport);
    ctx.session.data = Some(DataChannel::passive(ctx.config.server.pasv_port));
    ctx.session.task = Task::StartPasv;
    Ok(())
}

/// `Entering Passive Mode (h1,h2,h3,h4,p1,p2)`
pub fn format_pasv_reply(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!(
        "Entering Passive Mode ({},{},{},{},{},{})",
        h1,
        h2,
        h3,
        h4,
        port >> 8,
        port & 255
    )
}

/// The configured public address, else the local address of the control
/// connection.
fn advertised_ip(config: &Config, session: &Session, transport: &dyn Transport) -> Ipv4Addr {
    if let Ok(Some(ip)) = config.pasv_ip() {
        return ip;
    }
    match session.ctrl.and_then(|ctrl| transport.local_ip(ctrl)) {
        Some(ip) => ip,
        None => {
            warn!("no address to advertise for PASV, using 0.0.0.0");
            Ipv4Addr::UNSPECIFIED
        }
    }
}

fn open_listener(
    config: &Config,
    session: &mut Session,
    transport: &mut dyn Transport,
) -> Result<(Ipv4Addr, u16), TransportError> {
    let port = session
        .data
        .as_ref()
        .map(|channel| channel.port)
        .unwrap_or(config.server.pasv_port);

    let handle = transport.open(SocketOptions::data(config.server.transfer_chunk_size))?;
    let mut channel = DataChannel::passive(port);
    channel.handle = Some(handle);
    channel.countdown = config.timing.data_connection_timeout_ticks;
    session.data = Some(channel);

    transport.start(handle, Ipv4Addr::UNSPECIFIED, port, Role::Server)?;
    let port = transport.local_port(handle).unwrap_or(port);
    let ip = advertised_ip(config, session, transport);
    if let Some(channel) = session.data.as_mut() {
        channel.addr = ip;
        channel.port = port;
    }
    debug!(
        "FTP Server data start (PASV): '{}' ({}) desc({})",
        ip, port, handle.0
    );
    Ok((ip, port))
}

/// `StartPasv`: opens the listener, replies `227` and waits for the client.
pub fn start_pasv(config: &Config, session: &mut Session, transport: &mut dyn Transport) {
    match open_listener(config, session, transport) {
        Ok((ip, port)) => {
            session.replies.reply(227, format_pasv_reply(ip, port));
            session.task = Task::DataConnection;
        }
        Err(e) => {
            error!("FTP Server error data (PASV) open: {}", e);
            session.close_data(transport);
            session.replies.line(&e.to_ftp_response());
            session.task = Task::Command;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pasv_reply_encodes_port_bytes() {
        assert_eq!(
            format_pasv_reply(Ipv4Addr::new(192, 168, 3, 20), 55600),
            "Entering Passive Mode (192,168,3,20,217,48)"
        );
        assert_eq!(
            format_pasv_reply(Ipv4Addr::new(10, 0, 0, 1), 255),
            "Entering Passive Mode (10,0,0,1,0,255)"
        );
    }
}
