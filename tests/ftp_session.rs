mod common;

use common::{test_config, FtpFixture, LOCAL_IP, PEER_IP};
use tickftpd::core_network::Role;
use tickftpd::session::Task;

#[test]
fn test_greeting_names_host_address_and_time() {
    let mut ftp = FtpFixture::new();
    assert_eq!(
        ftp.replies(),
        format!("220 testhost FTP server {} Tue Mar 5 07:08:09  2024\n", LOCAL_IP)
    );
}

#[test]
fn test_login_with_configured_credentials() {
    let mut ftp = FtpFixture::new();
    ftp.replies();

    assert_eq!(ftp.command("USER bob"), "331 OK. bob User password required\n");
    assert_eq!(ftp.task(), Task::Password);
    assert_eq!(ftp.command("PASS secret"), "230 Login ok bob\n");
    assert_eq!(ftp.task(), Task::Command);
    assert_eq!(ftp.server.session().user.as_deref(), Some("bob"));
}

#[test]
fn test_pass_before_user_is_rejected_and_disconnects() {
    let mut ftp = FtpFixture::new();
    ftp.replies();

    let reply = ftp.command("PASS secret");
    assert!(reply.starts_with("530 "), "{}", reply);
    assert_eq!(ftp.task(), Task::Disconnect);

    ftp.tick();
    assert_eq!(ftp.task(), Task::DisconnectMain);
    let ctrl = ftp.ctrl;
    assert!(ftp.transport().is_closed(ctrl));
}

#[test]
fn test_unknown_user_and_wrong_password_disconnect() {
    let mut ftp = FtpFixture::new();
    ftp.replies();
    assert_eq!(ftp.command("USER alice"), "530 alice User not found\n");
    assert_eq!(ftp.task(), Task::Disconnect);

    let mut ftp = FtpFixture::new();
    ftp.replies();
    ftp.command("USER bob");
    assert_eq!(ftp.command("PASS wrong"), "530 Password fail bob\n");
    assert_eq!(ftp.task(), Task::Disconnect);
}

#[test]
fn test_other_commands_during_login() {
    let mut ftp = FtpFixture::new();
    ftp.replies();
    assert_eq!(ftp.command("SYST"), "215 UNIX single task OS.\n");
    assert_eq!(ftp.task(), Task::UserIdentity);
    assert_eq!(ftp.command("PWD"), "500 USER Certification Error\n");
    assert_eq!(ftp.task(), Task::Disconnect);

    let mut ftp = FtpFixture::new();
    ftp.replies();
    ftp.command("USER bob");
    assert_eq!(ftp.command("USER bob"), "500 PASS Certification Error\n");
    assert_eq!(ftp.task(), Task::Disconnect);

    let mut ftp = FtpFixture::new();
    ftp.replies();
    assert_eq!(ftp.command("QUIT"), "221 Goodbye\n");
    assert_eq!(ftp.task(), Task::Disconnect);
}

#[test]
fn test_login_timeout() {
    let mut config = test_config();
    config.timing.login_timeout_ticks = 3;
    let mut ftp = FtpFixture::with_config(config);
    ftp.replies();

    ftp.ticks(3);
    assert_eq!(ftp.replies(), "");
    assert_eq!(ftp.task(), Task::UserIdentity);
    ftp.tick();
    assert_eq!(ftp.replies(), "530 Login timeout\n");
    assert_eq!(ftp.task(), Task::Disconnect);
}

#[test]
fn test_disconnect_lingers_then_listens_again() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    ftp.command("QUIT");
    ftp.tick();
    assert_eq!(ftp.task(), Task::DisconnectMain);
    assert!(ftp.server.session().user.is_none());

    // Default linger is 5 ticks.
    ftp.ticks(5);
    assert_eq!(ftp.task(), Task::DisconnectMain);
    ftp.tick();
    assert_eq!(ftp.task(), Task::Begin);
    ftp.tick();
    assert_eq!(ftp.task(), Task::Connection);
    assert_eq!(ftp.transport().open_sockets(), 1);
}

#[test]
fn test_control_loss_disconnects() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    let ctrl = ftp.ctrl;
    ftp.transport().peer_close(ctrl);
    ftp.tick();
    assert_eq!(ftp.task(), Task::DisconnectMain);
    assert!(ftp.transport().is_closed(ctrl));
    assert!(ftp.server.session().user.is_none());
}

#[test]
fn test_overlong_line_is_reported_and_session_survives() {
    let mut config = test_config();
    config.server.line_capacity = 64;
    let mut ftp = FtpFixture::with_config(config);
    ftp.login();

    ftp.send(&format!("CWD {}", "x".repeat(100)));
    ftp.ticks(2);
    assert!(ftp.replies().contains("500 Line too long."));
    assert_eq!(ftp.task(), Task::Command);
    assert_eq!(ftp.command("NOOP"), "200 NOOP ok\n");
}

#[test]
fn test_one_command_per_tick_in_order() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    ftp.send("NOOP");
    ftp.send("PWD");
    ftp.tick();
    assert_eq!(ftp.replies(), "200 NOOP ok\n");
    ftp.tick();
    assert_eq!(ftp.replies(), "257 \"/\" is your current directory\n");
}

#[test]
fn test_port_opens_outbound_connection() {
    let mut ftp = FtpFixture::new();
    ftp.login();

    assert_eq!(
        ftp.command("PORT 10,0,0,2,4,1"),
        "220 PORT command successful\n"
    );
    assert_eq!(ftp.task(), Task::StartPort);
    ftp.tick();
    assert_eq!(ftp.task(), Task::PortConnection);

    let data = ftp.transport().handle_for_port(1025).unwrap();
    let socket = ftp.transport().info(data);
    assert_eq!(socket.role, Some(Role::Client));
    assert_eq!(socket.addr, Some(PEER_IP));

    ftp.transport().connect(data);
    ftp.tick();
    assert_eq!(ftp.task(), Task::Command);
    assert!(ftp.server.session().data.is_some());
}

#[test]
fn test_malformed_port_argument() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    assert_eq!(ftp.command("PORT 10,0,0,2,4"), "501 PORT parameters error.\n");
    assert_eq!(ftp.command("PORT 10,0,0,300,4,1"), "501 PORT parameters error.\n");
    assert_eq!(ftp.task(), Task::Command);
    assert!(ftp.server.session().data.is_none());
}

#[test]
fn test_pasv_reply_advertises_control_address() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    ftp.send("PASV");
    ftp.ticks(2);
    assert_eq!(
        ftp.replies(),
        "227 Entering Passive Mode (192,168,1,10,217,48)\n"
    );
}

#[test]
fn test_pasv_reply_uses_configured_address() {
    let mut config = test_config();
    config.server.pasv_address = "203.0.113.7".to_string();
    let mut ftp = FtpFixture::with_config(config);
    ftp.login();
    ftp.send("PASV");
    ftp.ticks(2);
    assert_eq!(
        ftp.replies(),
        "227 Entering Passive Mode (203,0,113,7,217,48)\n"
    );
}

#[test]
fn test_data_wait_times_out_with_425() {
    let mut config = test_config();
    config.timing.data_connection_timeout_ticks = 20;
    let mut ftp = FtpFixture::with_config(config);
    ftp.login();

    ftp.send("PASV");
    ftp.ticks(2);
    assert!(ftp.replies().starts_with("227 "));
    let data = ftp.transport().handle_for_port(55600).unwrap();

    ftp.ticks(20);
    assert_eq!(ftp.replies(), "");
    assert_eq!(ftp.task(), Task::DataConnection);

    ftp.tick();
    assert_eq!(ftp.replies(), "425 No data connection (timeout)\n");
    assert_eq!(ftp.task(), Task::Command);
    assert!(ftp.server.session().data.is_none());
    assert!(ftp.transport().is_closed(data));
}

#[test]
fn test_new_negotiation_replaces_pending_channel() {
    let mut ftp = FtpFixture::new();
    ftp.login();

    ftp.send("PASV");
    ftp.ticks(2);
    ftp.replies();
    let first = ftp.transport().handle_for_port(55600).unwrap();
    assert_eq!(ftp.task(), Task::DataConnection);

    assert_eq!(
        ftp.command("PORT 10,0,0,2,4,1"),
        "220 PORT command successful\n"
    );
    assert!(ftp.transport().is_closed(first));
    ftp.tick();
    assert_eq!(ftp.task(), Task::PortConnection);
    // Control socket plus exactly one data socket.
    assert_eq!(ftp.transport().open_sockets(), 2);
}

#[test]
fn test_abor_while_waiting_for_data() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    ftp.send("PASV");
    ftp.ticks(2);
    ftp.replies();
    let data = ftp.transport().handle_for_port(55600).unwrap();

    assert_eq!(ftp.command("ABOR"), "226 Data connection closed\n");
    assert_eq!(ftp.task(), Task::Disconnect);
    assert!(ftp.transport().is_closed(data));
}

#[test]
fn test_pasv_open_failure() {
    let mut ftp = FtpFixture::new();
    ftp.login();
    ftp.send("PASV");
    ftp.tick();
    ftp.transport().fail_open = true;
    ftp.tick();
    assert_eq!(ftp.replies(), "425 Can't open data connection\n");
    assert_eq!(ftp.task(), Task::Command);
    assert!(ftp.server.session().data.is_none());
}
