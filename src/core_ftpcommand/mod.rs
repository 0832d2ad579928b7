// Here's the list of the FTP commands implemented
pub mod abor;
pub mod cdup;
pub mod cwd;
pub mod dele;
pub mod feat;
pub mod help;
pub mod list;
pub mod mdtm;
pub mod mkd;
pub mod noop;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod rmd;
pub mod rnfr;
pub mod rnto;
pub mod site;
pub mod size;
pub mod stor;
pub mod stru;
pub mod syst;
pub mod type_;
pub mod user;

pub mod error;
pub mod ftpcommand;
pub mod handlers;
