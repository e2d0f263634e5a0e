use std::collections::HashMap;
use std::io;

use http::header::CONTENT_TYPE;
use http::HeaderMap;

use crate::error::{Error, Result};

/// Domain name -> records, one entry per zone file line in file order.
pub type ZoneRecords = HashMap<String, Vec<String>>;

/// Line buffer size; a line must fit together with its newline.
pub const MAX_LINE_LEN: usize = 64 * 1024;

const GZIP_CONTENT_TYPES: [&str; 2] = ["application/x-gzip", "application/gzip"];

const FIELD_SEPARATOR: char = '\t';
const RECORD_SEPARATOR: &str = ",";

/// True when the response body is a gzip stream.
pub fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .is_some_and(|media_type| {
            GZIP_CONTENT_TYPES
                .iter()
                .any(|gzip| media_type.eq_ignore_ascii_case(gzip))
        })
}

/// Incremental zone file parser.
///
/// Body chunks are fed as they arrive; lines may span chunk boundaries.
/// Each line is split on tabs, the first field is the domain (kept verbatim)
/// and the remaining fields are joined with commas into one record. Lines
/// with fewer than two fields are skipped.
#[derive(Debug, Default)]
pub struct ZoneFileParser {
    pending: Vec<u8>,
    records: ZoneRecords,
}

impl ZoneFileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, mut data: &[u8]) -> Result<()> {
        while let Some(pos) = data.iter().position(|b| *b == b'\n') {
            let (line, rest) = data.split_at(pos);
            if self.pending.is_empty() {
                self.parse_line(line)?;
            } else {
                let mut buffered = std::mem::take(&mut self.pending);
                buffered.extend_from_slice(line);
                self.parse_line(&buffered)?;
            }
            data = &rest[1..];
        }

        self.pending.extend_from_slice(data);
        if self.pending.len() >= MAX_LINE_LEN {
            return Err(line_too_long());
        }
        Ok(())
    }

    /// Parses the trailing unterminated line, if any, and returns the map.
    pub fn finish(mut self) -> Result<ZoneRecords> {
        if !self.pending.is_empty() {
            let last = std::mem::take(&mut self.pending);
            self.parse_line(&last)?;
        }
        Ok(self.records)
    }

    fn parse_line(&mut self, line: &[u8]) -> Result<()> {
        if line.len() >= MAX_LINE_LEN {
            return Err(line_too_long());
        }
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if !line.contains(&(FIELD_SEPARATOR as u8)) {
            return Ok(());
        }

        // invalid UTF-8 is replaced, never rejected
        let line = String::from_utf8_lossy(line);
        let Some((domain, rest)) = line.split_once(FIELD_SEPARATOR) else {
            return Ok(());
        };
        let record = rest
            .split(FIELD_SEPARATOR)
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR);

        self.records
            .entry(domain.to_owned())
            .or_default()
            .push(record);
        Ok(())
    }
}

/// Parses a complete, uncompressed zone file.
pub fn parse_zone_records(data: &[u8]) -> Result<ZoneRecords> {
    let mut parser = ZoneFileParser::new();
    parser.feed(data)?;
    parser.finish()
}

fn line_too_long() -> Error {
    Error::Scan(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("line exceeds {} bytes", MAX_LINE_LEN),
    ))
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;
    use http::{HeaderMap, HeaderValue};

    use super::{is_gzip, parse_zone_records, ZoneFileParser, MAX_LINE_LEN};
    use crate::error::Error;

    const ZONE: &str = "a.com.\t10800\tin\tns\tx.\na.com.\t10800\tin\tns\ty.\nb.com.\t1\tin\tns\tz.";

    fn headers_with_content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accumulates_records_per_domain_in_order() {
        let records = parse_zone_records(ZONE.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records["a.com."], vec!["10800,in,ns,x.", "10800,in,ns,y."]);
        assert_eq!(records["b.com."], vec!["1,in,ns,z."]);
    }

    #[test]
    fn lines_without_tab_are_skipped() {
        let body = "; comment line\n\nno-tabs-here\nc.dev.\t300\tin\ta\t1.2.3.4\n";
        let records = parse_zone_records(body.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records["c.dev."], vec!["300,in,a,1.2.3.4"]);
    }

    #[test]
    fn domain_is_kept_verbatim() {
        let body = "Example.COM.\t1\tin\tns\tns1.\nexample.com\t1\tin\tns\tns2.\n";
        let records = parse_zone_records(body.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.contains_key("Example.COM."));
        assert!(records.contains_key("example.com"));
    }

    #[test]
    fn duplicate_lines_are_kept() {
        let body = "d.com.\t1\tin\tns\tx.\nd.com.\t1\tin\tns\tx.\n";
        let records = parse_zone_records(body.as_bytes()).unwrap();
        assert_eq!(records["d.com."].len(), 2);
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let body = "a.com.\t1\tin\tns\tx.\r\nb.com.\t1\tin\tns\ty.\r\n";
        let records = parse_zone_records(body.as_bytes()).unwrap();
        assert_eq!(records["a.com."], vec!["1,in,ns,x."]);
        assert_eq!(records["b.com."], vec!["1,in,ns,y."]);
    }

    #[test]
    fn empty_trailing_fields_are_preserved() {
        let records = parse_zone_records(b"e.com.\t\n").unwrap();
        assert_eq!(records["e.com."], vec![""]);
    }

    #[test]
    fn lines_split_across_chunks_are_joined() {
        let mut parser = ZoneFileParser::new();
        for chunk in ZONE.as_bytes().chunks(3) {
            parser.feed(chunk).unwrap();
        }
        let chunked = parser.finish().unwrap();

        assert_eq!(chunked, parse_zone_records(ZONE.as_bytes()).unwrap());
    }

    #[test]
    fn overlong_line_is_a_scan_error() {
        let mut body = vec![b'a'; MAX_LINE_LEN - 2];
        body.extend_from_slice(b"\t1\n");
        let err = parse_zone_records(&body).unwrap_err();
        assert!(matches!(err, Error::Scan(_)));
    }

    #[test]
    fn longest_line_fitting_the_buffer_is_accepted() {
        let mut body = vec![b'a'; MAX_LINE_LEN - 3];
        body.extend_from_slice(b"\t1\n");
        let records = parse_zone_records(&body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn carriage_return_counts_towards_line_length() {
        let mut body = vec![b'a'; MAX_LINE_LEN - 3];
        body.extend_from_slice(b"\t1\r\n");
        assert!(matches!(parse_zone_records(&body), Err(Error::Scan(_))));
    }

    #[test]
    fn overlong_unterminated_line_fails_while_streaming() {
        let mut parser = ZoneFileParser::new();
        parser.feed(&vec![b'a'; MAX_LINE_LEN - 1]).unwrap();
        assert!(matches!(parser.feed(b"a"), Err(Error::Scan(_))));
    }

    #[test]
    fn invalid_utf8_line_without_tab_is_skipped() {
        let records = parse_zone_records(b"a.com.\t1\tin\tns\tx.\n\xff\xfe comment\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records["a.com."], vec!["1,in,ns,x."]);
    }

    #[test]
    fn invalid_utf8_in_fields_is_replaced() {
        let records = parse_zone_records(b"a\xff.com.\t1\tin\ttxt\t\xfe\n").unwrap();
        assert_eq!(records["a\u{fffd}.com."], vec!["1,in,txt,\u{fffd}"]);
    }

    #[test]
    fn detects_gzip_content_types() {
        assert!(is_gzip(&headers_with_content_type("application/x-gzip")));
        assert!(is_gzip(&headers_with_content_type("application/gzip")));
        assert!(is_gzip(&headers_with_content_type("Application/X-Gzip; charset=binary")));
        assert!(!is_gzip(&headers_with_content_type("text/plain")));
        assert!(!is_gzip(&HeaderMap::new()));
    }
}
