use crate::core_fs::DirEntry;
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Directory listing flavours sent over the data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `LIST`: Unix `ls -l` style.
    List,
    /// `NLST`: bare names.
    Nlst,
    /// `MLSD`: RFC 3659 facts.
    Mlsd,
}

/// `YYYYMMDDHHMMSS`, as used by `MDTM` and the MLSD `Modify` fact.
pub fn timestamp(t: &NaiveDateTime) -> String {
    t.format("%Y%m%d%H%M%S").to_string()
}

/// 512-byte blocks, at least one for any non-empty file.
fn blocks(size: u64) -> u64 {
    match size / 512 {
        0 if size > 0 => 1,
        n => n,
    }
}

/// Appends one `\n`-terminated listing line for `entry`.
pub fn encode(format: ListFormat, entry: &DirEntry, out: &mut String) {
    // Writing into a String cannot fail.
    let _ = match format {
        ListFormat::List => writeln!(
            out,
            "{}rw-rw-rw- {} user root {} {} {}",
            if entry.is_dir { 'd' } else { '-' },
            blocks(entry.size),
            entry.size,
            entry.modified.format("%b %-d %H:%M"),
            entry.name
        ),
        ListFormat::Nlst => writeln!(out, "{}", entry.name),
        ListFormat::Mlsd => writeln!(
            out,
            "Type={};Size={};Modify={}; {}",
            if entry.is_dir { "dir" } else { "file" },
            entry.size,
            timestamp(&entry.modified),
            entry.name
        ),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(name: &str, is_dir: bool, size: u64) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            is_dir,
            size,
            modified: NaiveDate::from_ymd_opt(2017, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 2)
                .unwrap(),
        }
    }

    #[test]
    fn test_list_line() {
        let mut out = String::new();
        encode(ListFormat::List, &entry("a.txt", false, 100), &mut out);
        encode(ListFormat::List, &entry("big.bin", false, 2048), &mut out);
        encode(ListFormat::List, &entry("sub", true, 0), &mut out);
        assert_eq!(
            out,
            "-rw-rw-rw- 1 user root 100 Mar 9 07:05 a.txt\n\
             -rw-rw-rw- 4 user root 2048 Mar 9 07:05 big.bin\n\
             drw-rw-rw- 0 user root 0 Mar 9 07:05 sub\n"
        );
    }

    #[test]
    fn test_nlst_and_mlsd_lines() {
        let mut out = String::new();
        encode(ListFormat::Nlst, &entry("a.txt", false, 100), &mut out);
        encode(ListFormat::Mlsd, &entry("a.txt", false, 100), &mut out);
        encode(ListFormat::Mlsd, &entry("sub", true, 0), &mut out);
        assert_eq!(
            out,
            "a.txt\n\
             Type=file;Size=100;Modify=20170309070502; a.txt\n\
             Type=dir;Size=0;Modify=20170309070502; sub\n"
        );
    }
}
