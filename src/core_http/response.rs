use crate::constants::CONTENT_LENGTH_FIELD;
use crate::core_buffer::OutBuffer;
use chrono::{DateTime, Utc};
use std::path::Path;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

pub const TEXT_HTML: &str = "text/html";

/// Content type of a static file, chosen by extension.
pub fn content_type(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        None | Some("txt") => "text/plain",
        Some("htm") | Some("html") => TEXT_HTML,
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("svg") => "image/svg+xml",
        Some(_) => "application/octet-stream",
    }
}

/// Writes the response header block.
///
/// With `length == None` a blank `Content-Length` field is reserved and its
/// offset returned, to be filled by [`patch_content_length`] once the body
/// is rendered.
pub fn make_info(
    out: &mut OutBuffer,
    status: u16,
    length: Option<usize>,
    content_type: &str,
    server_name: &str,
    now: DateTime<Utc>,
    last_modified: DateTime<Utc>,
) -> Option<usize> {
    out.push_str(&format!("HTTP/1.1 {} {}\r\n", status, status_reason(status)));
    out.push_str(&format!("Date: {}\r\n", now.format(HTTP_DATE)));
    out.push_str(&format!("Server: {}\r\n", server_name));
    out.push_str(&format!(
        "Last-Modified: {}\r\n",
        last_modified.format(HTTP_DATE)
    ));
    out.push_str("Accept-Ranges: bytes\r\n");
    out.push_str("Content-Length: ");
    let placeholder = match length {
        Some(len) => {
            out.push_str(&len.to_string());
            None
        }
        None => {
            let offset = out.len();
            out.push_str(&" ".repeat(CONTENT_LENGTH_FIELD));
            Some(offset)
        }
    };
    out.push_str("\r\n");
    out.push_str("Connection: close\r\n");
    out.push_str(&format!("Content-Type: {}\r\n", content_type));
    out.push_str("\r\n");
    placeholder
}

/// Fills the reserved field right-justified; lengths wider than the field
/// grow it instead of being cut.
pub fn patch_content_length(out: &mut OutBuffer, offset: usize, len: usize) {
    let digits = format!("{:>width$}", len, width = CONTENT_LENGTH_FIELD);
    if digits.len() == CONTENT_LENGTH_FIELD {
        out.patch(offset, digits.as_bytes());
    } else {
        out.splice(offset, CONTENT_LENGTH_FIELD, digits.as_bytes());
    }
}

pub fn make_head(out: &mut OutBuffer, server_name: &str, title: &str) {
    out.push_str("<head>\n");
    out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\n");
    out.push_str("<meta http-equiv=\"Pragma\" content=\"no-cache\">\n");
    out.push_str("<meta http-equiv=\"Cache-Control\" content=\"no-cache\">\n");
    out.push_str("<meta http-equiv=\"Expires\" content=\"0\">\n");
    out.push_str(&format!("<title>{} {}</title>\n", server_name, title));
    out.push_str("</head>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn header(length: Option<usize>) -> (OutBuffer, Option<usize>) {
        let mut out = OutBuffer::new();
        let t = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let offset = make_info(&mut out, 200, length, TEXT_HTML, "tickftpd", t, t);
        (out, offset)
    }

    #[test]
    fn test_header_block() {
        let (out, offset) = header(Some(0));
        assert!(offset.is_none());
        let text = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\nDate: Tue, 05 Mar 2024 07:08:09 GMT\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(text.ends_with("Content-Type: text/html\r\n\r\n"));
    }

    #[test]
    fn test_placeholder_patch_for_every_width() {
        for len in [0usize, 7, 42, 999, 12345, 99999] {
            let (mut out, offset) = header(None);
            let offset = offset.unwrap();
            patch_content_length(&mut out, offset, len);
            let field = &out.as_bytes()[offset..offset + CONTENT_LENGTH_FIELD];
            assert_eq!(field, format!("{:>5}", len).as_bytes());
        }
    }

    #[test]
    fn test_oversized_length_widens_field() {
        let (mut out, offset) = header(None);
        let offset = offset.unwrap();
        patch_content_length(&mut out, offset, 123456);
        let text = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(text.contains("Content-Length: 123456\r\n"));
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type(Path::new("logo.PNG")), "image/png");
        assert_eq!(content_type(Path::new("a/b.jpeg")), "image/jpeg");
        assert_eq!(content_type(Path::new("style.css")), "text/css");
        assert_eq!(content_type(Path::new("README")), "text/plain");
        assert_eq!(content_type(Path::new("blob.bin")), "application/octet-stream");
    }

    #[test]
    fn test_head_title() {
        let mut out = OutBuffer::new();
        make_head(&mut out, "tickftpd", "Index");
        let text = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(text.contains("<title>tickftpd Index</title>"));
        assert!(text.contains("no-cache"));
    }
}
