/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the course API (default: `http://localhost:3000`).
    pub api_url: String,
    /// Bearer token sent with every request, if any.
    pub api_token: Option<String>,
    /// File the draft buffer is mirrored to (default: `.academy-drafts.json`).
    pub draft_path: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Send staged-module temp keys as insert idempotency keys (default: `true`).
    pub idempotent_inserts: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                  |
    /// |--------------------------------|--------------------------|
    /// | `ACADEMY_API_URL`              | `http://localhost:3000`  |
    /// | `ACADEMY_API_TOKEN`            | --                       |
    /// | `ACADEMY_DRAFT_PATH`           | `.academy-drafts.json`   |
    /// | `ACADEMY_REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `ACADEMY_IDEMPOTENT_INSERTS`   | `true`                   |
    pub fn from_env() -> Self {
        let api_url = std::env::var("ACADEMY_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let api_token = std::env::var("ACADEMY_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let draft_path =
            std::env::var("ACADEMY_DRAFT_PATH").unwrap_or_else(|_| ".academy-drafts.json".into());

        let request_timeout_secs: u64 = std::env::var("ACADEMY_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("ACADEMY_REQUEST_TIMEOUT_SECS must be a valid u64");

        let idempotent_inserts = parse_flag(
            &std::env::var("ACADEMY_IDEMPOTENT_INSERTS").unwrap_or_else(|_| "true".into()),
        )
        .expect("ACADEMY_IDEMPOTENT_INSERTS must be true or false");

        Self {
            api_url,
            api_token,
            draft_path,
            request_timeout_secs,
            idempotent_inserts,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
