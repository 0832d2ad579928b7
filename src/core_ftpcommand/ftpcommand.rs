#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FtpCommand {
    // RFC 959
    ABOR,
    ACCT,
    ALLO,
    APPE,
    CDUP,
    CWD,
    DELE,
    HELP,
    LIST,
    MKD,
    NLST,
    NOOP,
    MODE,
    PASS,
    PASV,
    PORT,
    PWD,
    QUIT,
    REIN,
    REST,
    RETR,
    RMD,
    RNFR,
    RNTO,
    SITE,
    SMNT,
    STAT,
    STOR,
    STOU,
    STRU,
    SYST,
    TYPE,
    USER,
    // RFC 2389
    FEAT,
    // RFC 3659
    MDTM,
    MLSD,
    MLST,
    SIZE,
    XPWD,
}

const KEY_TABLE: &[(&str, FtpCommand)] = &[
    ("ABOR", FtpCommand::ABOR),
    ("ACCT", FtpCommand::ACCT),
    ("ALLO", FtpCommand::ALLO),
    ("APPE", FtpCommand::APPE),
    ("CDUP", FtpCommand::CDUP),
    ("CWD", FtpCommand::CWD),
    ("DELE", FtpCommand::DELE),
    ("HELP", FtpCommand::HELP),
    ("LIST", FtpCommand::LIST),
    ("MKD", FtpCommand::MKD),
    ("NLST", FtpCommand::NLST),
    ("NOOP", FtpCommand::NOOP),
    ("MODE", FtpCommand::MODE),
    ("PASS", FtpCommand::PASS),
    ("PASV", FtpCommand::PASV),
    ("PORT", FtpCommand::PORT),
    ("PWD", FtpCommand::PWD),
    ("QUIT", FtpCommand::QUIT),
    ("REIN", FtpCommand::REIN),
    ("REST", FtpCommand::REST),
    ("RETR", FtpCommand::RETR),
    ("RMD", FtpCommand::RMD),
    ("RNFR", FtpCommand::RNFR),
    ("RNTO", FtpCommand::RNTO),
    ("SITE", FtpCommand::SITE),
    ("SMNT", FtpCommand::SMNT),
    ("STAT", FtpCommand::STAT),
    ("STOR", FtpCommand::STOR),
    ("STOU", FtpCommand::STOU),
    ("STRU", FtpCommand::STRU),
    ("SYST", FtpCommand::SYST),
    ("TYPE", FtpCommand::TYPE),
    ("USER", FtpCommand::USER),
    ("FEAT", FtpCommand::FEAT),
    ("MDTM", FtpCommand::MDTM),
    ("MLSD", FtpCommand::MLSD),
    ("MLST", FtpCommand::MLST),
    ("SIZE", FtpCommand::SIZE),
    ("XPWD", FtpCommand::XPWD),
];

impl FtpCommand {
    /// Case-sensitive keyword lookup.
    pub fn from_keyword(key: &str) -> Option<FtpCommand> {
        KEY_TABLE
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, cmd)| *cmd)
    }

    pub fn keyword(self) -> &'static str {
        KEY_TABLE
            .iter()
            .find(|(_, cmd)| *cmd == self)
            .map(|(k, _)| *k)
            .unwrap_or("NONE")
    }

    /// Keywords that are recognised but answered as unknown.
    pub fn is_unsupported(self) -> bool {
        matches!(
            self,
            FtpCommand::ACCT
                | FtpCommand::ALLO
                | FtpCommand::APPE
                | FtpCommand::MODE
                | FtpCommand::REIN
                | FtpCommand::REST
                | FtpCommand::SMNT
                | FtpCommand::STAT
                | FtpCommand::STOU
                | FtpCommand::MLST
        )
    }
}

/// A parsed command line.
///
/// `arg` borrows the line it was parsed from, so a `Command` lives only as
/// long as the line popped from the accumulator for this dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    pub kind: FtpCommand,
    pub arg: Option<&'a str>,
}

impl<'a> Command<'a> {
    /// Splits at the first space. A keyword followed by an argument must be
    /// 3 or 4 characters long; a line without a space is all keyword.
    pub fn parse(line: &'a str) -> Option<Command<'a>> {
        match line.find(' ') {
            None => FtpCommand::from_keyword(line).map(|kind| Command { kind, arg: None }),
            Some(pos) if pos == 3 || pos == 4 => {
                FtpCommand::from_keyword(&line[..pos]).map(|kind| Command {
                    kind,
                    arg: Some(&line[pos + 1..]),
                })
            }
            Some(_) => None,
        }
    }

    /// The argument, `None` when missing or empty.
    pub fn non_empty_arg(&self) -> Option<&'a str> {
        self.arg.filter(|a| !a.is_empty())
    }
}
