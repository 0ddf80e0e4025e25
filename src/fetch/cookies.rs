use std::io;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Reads a text file line by line
#[cfg_attr(test, automock)]
pub trait LinesReader: Send + Sync {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads lines from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLinesReader;

impl LinesReader for FsLinesReader {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let content = fs_err::read_to_string(path)?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// Browsers export http-only cookies with this prefix on the domain column
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// A cookie from a Netscape `cookies.txt` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Expiry as a unix timestamp, 0 for session cookies
    pub expires: i64,
    pub name: String,
    pub value: String,
}

impl Cookie {
    /// Parse one tab separated line, `None` for comments and short lines
    pub fn parse_line(line: &str) -> Option<Self> {
        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') => return None,
            None => (line, false),
        };

        let parts: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if parts.len() < 7 {
            return None;
        }

        Some(Self {
            domain: parts[0].to_string(),
            include_subdomains: parse_flag(parts[1]),
            path: parts[2].to_string(),
            secure: parse_flag(parts[3]),
            http_only,
            expires: parts[4].trim().parse().unwrap_or(0),
            name: parts[5].to_string(),
            value: parts[6].to_string(),
        })
    }

    /// `name=value` pair as sent in a Cookie header
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Parse every cookie line of a file
pub fn parse_cookies(lines: &[String]) -> Vec<Cookie> {
    lines.iter().filter_map(|line| Cookie::parse_line(line)).collect()
}

/// Join cookies into a Cookie header value
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(Cookie::header_pair)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COOKIES: &str = "# Netscape HTTP Cookie File\n\
        # This is a generated file! Do not edit.\n\
        \n\
        .youtube.com\tTRUE\t/\tTRUE\t1735689600\tPREF\tf6=40000000\n\
        .youtube.com\tTRUE\t/\tFALSE\t0\tVISITOR_INFO1_LIVE\tabc123\n\
        #HttpOnly_.youtube.com\tTRUE\t/\tTRUE\t0\tLOGIN_INFO\txyz\n\
        .youtube.com\tTRUE\t/\n";

    fn lines() -> Vec<String> {
        COOKIES.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_cookies_skips_comments_and_short_lines() {
        let cookies = parse_cookies(&lines());

        assert_eq!(cookies.len(), 3);
        assert_eq!(
            cookies[0],
            Cookie {
                domain: ".youtube.com".to_string(),
                include_subdomains: true,
                path: "/".to_string(),
                secure: true,
                http_only: false,
                expires: 1735689600,
                name: "PREF".to_string(),
                value: "f6=40000000".to_string(),
            }
        );
        assert!(!cookies[1].secure);
        assert!(cookies[2].http_only);
        assert_eq!(cookies[2].domain, ".youtube.com");
    }

    #[test]
    fn test_http_only_prefix_is_not_a_comment() {
        let http_only = Cookie::parse_line("#HttpOnly_.youtube.com\tTRUE\t/\tTRUE\t0\tSID\tsecret").unwrap();
        assert!(http_only.http_only);
        assert_eq!(http_only.domain, ".youtube.com");
        assert_eq!(http_only.header_pair(), "SID=secret");

        assert!(Cookie::parse_line("#.youtube.com\tTRUE\t/\tTRUE\t0\tSID\tsecret").is_none());
        assert!(Cookie::parse_line("#HttpOnly_.youtube.com\tTRUE\t/").is_none());
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let header = cookie_header(&parse_cookies(&lines()));
        assert_eq!(header, "PREF=f6=40000000; VISITOR_INFO1_LIVE=abc123; LOGIN_INFO=xyz");
    }

    #[test]
    fn test_fs_reader_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COOKIES.as_bytes()).unwrap();

        let read = FsLinesReader.read_lines(file.path()).unwrap();
        assert_eq!(read, lines());
    }

    #[test]
    fn test_fs_reader_missing_file() {
        let err = FsLinesReader.read_lines(Path::new("/definitely/not/here/cookies.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
