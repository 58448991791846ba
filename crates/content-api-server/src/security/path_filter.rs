use once_cell::sync::Lazy;
use regex::RegexSet;

/// Probe patterns seen from routine internet scanning: credential files,
/// VCS metadata, backup suffixes, admin panels of unrelated stacks, and
/// plain traversal. Matched against the percent-decoded path.
static SUSPICIOUS_PATHS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\.env",
        r"(?i)\.git",
        r"(?i)\.svn",
        r"(?i)\.htaccess",
        r"(?i)\.htpasswd",
        r"(?i)id_rsa",
        r"(?i)\.ssh",
        r"(?i)\.aws",
        r"(?i)\.(bak|old|backup|sql|sqlite|swp)$",
        r"(?i)wp-(admin|login|content|includes)",
        r"(?i)phpmyadmin",
        r"(?i)/etc/passwd",
        r"(?i)web\.config",
        r"(?i)\.DS_Store",
        r"\.\./",
    ])
    .expect("suspicious path patterns are valid regexes")
});

pub fn is_suspicious(decoded_path: &str) -> bool {
    SUSPICIOUS_PATHS.is_match(decoded_path)
}

/// Percent-decode a request path (`%XX` escapes only; a malformed escape
/// keeps its `%` so the path still reaches the pattern match).
pub fn decode(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut bytes = path.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'%' => {
                let hi = bytes.next().and_then(hex_val);
                let lo = bytes.next().and_then(hex_val);
                if let (Some(h), Some(l)) = (hi, lo) {
                    result.push((h << 4 | l) as char);
                } else {
                    result.push('%');
                }
            }
            _ => result.push(b as char),
        }
    }
    result
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(decode("/%2e%2e/%2e%2e/etc/passwd"), "/../../etc/passwd");
        assert_eq!(decode("/models/1"), "/models/1");
        assert_eq!(decode("/a%2Fb"), "/a/b");
    }

    #[test]
    fn malformed_escapes_keep_the_percent() {
        assert_eq!(decode("/a%zz"), "/a%");
        assert_eq!(decode("/a%"), "/a%");
    }

    #[test]
    fn flags_scanner_probes() {
        assert!(is_suspicious("/.env"));
        assert!(is_suspicious("/../.env"));
        assert!(is_suspicious("/.git/config"));
        assert!(is_suspicious("/wp-admin/setup.php"));
        assert!(is_suspicious("/phpMyAdmin/index.php"));
        assert!(is_suspicious("/db.sql"));
        assert!(is_suspicious("/backup.old"));
        assert!(is_suspicious("/home/app/.ssh/id_rsa"));
        assert!(is_suspicious("/../../etc/passwd"));
    }

    #[test]
    fn flags_encoded_probes_after_decoding() {
        assert!(is_suspicious(&decode("/%2e%2e/.env")));
        assert!(is_suspicious(&decode("/%2e%67%69%74/config")));
    }

    #[test]
    fn allows_platform_routes() {
        assert!(!is_suspicious("/models"));
        assert!(!is_suspicious("/content/42"));
        assert!(!is_suspicious("/purchase"));
        assert!(!is_suspicious("/health"));
        assert!(!is_suspicious("/notifications/unread"));
    }
}
