/// Cheap bot deterrent, not a security boundary.
const BLOCKED_AGENTS: [&str; 4] = ["curl", "wget", "bot", "spider"];

/// Case-insensitive substring match against the blocked agent set.
pub fn is_blocked(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    BLOCKED_AGENTS.iter().any(|agent| ua.contains(agent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_known_agents_case_insensitively() {
        assert!(is_blocked("curl/8.4.0"));
        assert!(is_blocked("Wget/1.21"));
        assert!(is_blocked("Googlebot/2.1"));
        assert!(is_blocked("SPIDER-crawler"));
        assert!(is_blocked("CURL"));
    }

    #[test]
    fn allows_browsers() {
        assert!(!is_blocked(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36"
        ));
        assert!(!is_blocked(""));
    }
}
