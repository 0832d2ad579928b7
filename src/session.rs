use crate::core_buffer::LineAccumulator;
use crate::core_network::data_channel::DataChannel;
use crate::core_network::transport::{SocketHandle, Transport};
use crate::core_reply::ReplyBuffer;
use crate::core_transfer::TransferJob;
use log::debug;

/// Control-channel states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Begin,
    Connection,
    UserIdentity,
    Password,

    StartPasv,
    DataConnection,

    StartPort,
    PortConnection,

    /// Server to client.
    SendFile,
    /// Client to server.
    RecvFile,
    ClosePort,

    /// RNFR accepted, waiting for RNTO.
    RecvRename,

    Command,

    Disconnect,
    DisconnectMain,
}

impl Task {
    /// States where the control channel is open and must be read.
    pub fn reads_control(self) -> bool {
        !matches!(
            self,
            Task::Begin | Task::Connection | Task::Disconnect | Task::DisconnectMain
        )
    }

    /// States where an `ABOR` cancels the pending work at once.
    pub fn is_abortable(self) -> bool {
        matches!(
            self,
            Task::DataConnection | Task::PortConnection | Task::SendFile | Task::RecvFile
        )
    }
}

/// State of one control connection, owned by its `FtpServer`.
pub struct Session {
    pub task: Task,
    pub ctrl: Option<SocketHandle>,
    pub user: Option<String>,
    pub lines: LineAccumulator,
    pub replies: ReplyBuffer,
    pub data: Option<DataChannel>,
    pub transfer: Option<TransferJob>,
    pub rename_from: Option<String>,
    pub login_wait: u32,
    pub linger: u32,
}

impl Session {
    pub fn new(line_capacity: usize) -> Self {
        Self {
            task: Task::Begin,
            ctrl: None,
            user: None,
            lines: LineAccumulator::new(line_capacity),
            replies: ReplyBuffer::new(),
            data: None,
            transfer: None,
            rename_from: None,
            login_wait: 0,
            linger: 0,
        }
    }

    /// Drops the transfer job (closing its file) and the data channel.
    pub fn close_data(&mut self, transport: &mut dyn Transport) {
        if self.transfer.take().is_some() {
            debug!("transfer job dropped");
        }
        if let Some(channel) = self.data.take() {
            debug!("data channel closed: {:?}", channel.handle);
            channel.close(transport);
        }
    }

    /// Back to a fresh session; the control socket must already be closed.
    pub fn reset(&mut self) {
        self.ctrl = None;
        self.user = None;
        self.lines.clear();
        self.replies.clear();
        self.data = None;
        self.transfer = None;
        self.rename_from = None;
        self.login_wait = 0;
    }
}
