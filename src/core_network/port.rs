use crate::config::Config;
use crate::core_ftpcommand::handlers::{CommandContext, HandlerResult};
use crate::core_network::data_channel::DataChannel;
use crate::core_network::error::TransportError;
use crate::core_network::transport::{Role, SocketOptions, Transport};
use crate::session::{Session, Task};
use log::{debug, error, info};
use std::net::Ipv4Addr;

/// Parses `h1,h2,h3,h4,p1,p2`, each a decimal in `0..=255`.
pub fn parse_port_argument(arg: &str) -> Option<(Ipv4Addr, u16)> {
    let fields = arg
        .split(',')
        .map(|f| f.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;
    let [h1, h2, h3, h4, p1, p2] = fields.as_slice() else {
        return None;
    };
    let ip = Ipv4Addr::new(*h1, *h2, *h3, *h4);
    let port = u16::from(*p1) << 8 | u16::from(*p2);
    Some((ip, port))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// The outbound connection is started on the next tick, in `StartPort`.
pub fn handle_port_command(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some((ip, port)) = arg.and_then(parse_port_argument) else {
        ctx.session.replies.reply(501, "PORT parameters error.");
        return Ok(());
    };

    info!("Received PORT command with IP: {} and port: {}", ip, port);
    ctx.session.close_data(&mut *ctx.transport);
    ctx.session.data = Some(DataChannel::active(ip, port));
    ctx.session.replies.reply(220, "PORT command successful");
    ctx.session.task = Task::StartPort;
    Ok(())
}

fn open_connection(
    config: &Config,
    session: &mut Session,
    transport: &mut dyn Transport,
) -> Result<(), TransportError> {
    let Some((ip, port)) = session.data.as_ref().map(|c| (c.addr, c.port)) else {
        return Err(TransportError::Closed);
    };

    let handle = transport.open(SocketOptions::data(config.server.transfer_chunk_size))?;
    let mut channel = DataChannel::active(ip, port);
    channel.handle = Some(handle);
    channel.countdown = config.timing.data_connection_timeout_ticks;
    session.data = Some(channel);

    transport.start(handle, ip, port, Role::Client)?;
    debug!(
        "FTP Server data start (PORT): '{}' ({}) desc({})",
        ip, port, handle.0
    );
    Ok(())
}

/// `StartPort`: connects out to the address given by PORT.
pub fn start_port(config: &Config, session: &mut Session, transport: &mut dyn Transport) {
    match open_connection(config, session, transport) {
        Ok(()) => session.task = Task::PortConnection,
        Err(e) => {
            error!("FTP Server error data (PORT) open: {}", e);
            session.close_data(transport);
            session.replies.reply(425, "Can't open data connection");
            session.task = Task::Command;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_argument() {
        assert_eq!(
            parse_port_argument("192,168,1,2,4,1"),
            Some((Ipv4Addr::new(192, 168, 1, 2), 1025))
        );
        assert_eq!(
            parse_port_argument("10, 0, 0, 9, 217, 48"),
            Some((Ipv4Addr::new(10, 0, 0, 9), 55600))
        );
    }

    #[test]
    fn test_parse_port_argument_rejects_bad_fields() {
        assert_eq!(parse_port_argument("192,168,1,2,4"), None);
        assert_eq!(parse_port_argument("192,168,1,2,4,1,7"), None);
        assert_eq!(parse_port_argument("192,168,1,256,4,1"), None);
        assert_eq!(parse_port_argument("192,168,1,-2,4,1"), None);
        assert_eq!(parse_port_argument("a,b,c,d,e,f"), None);
        assert_eq!(parse_port_argument(""), None);
    }
}
