use chrono::Duration;
use log::warn;
use std::env;

const DEFAULT_PREFIX: &str = "!";
// Idle window of a log viewer message (5 minutes)
const DEFAULT_LOG_VIEW_TIMEOUT_SECS: i64 = 5 * 60;

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub database_url: String,
    pub prefix: String,
    pub log_view_timeout: Duration,
}

impl Config {
    /// Reads the environment after loading `.env`, panicking on missing
    /// required values since the bot cannot start without them.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let token = env::var("DISCORD_TOKEN").expect("Expected a discord token in the environment");
        let database_url =
            env::var("DATABASE_URL").expect("Expected a sqlite DATABASE_URL in the environment");

        Self {
            token,
            database_url,
            prefix: parse_prefix(env::var("COMMAND_PREFIX").ok()),
            log_view_timeout: parse_timeout(env::var("LOG_VIEW_TIMEOUT_SECS").ok()),
        }
    }
}

fn parse_prefix(raw: Option<String>) -> String {
    match raw {
        Some(prefix) if !prefix.trim().is_empty() => prefix.trim().to_string(),
        Some(_) => {
            warn!("COMMAND_PREFIX is blank, using {}", DEFAULT_PREFIX);
            DEFAULT_PREFIX.to_string()
        }
        None => DEFAULT_PREFIX.to_string(),
    }
}

fn parse_timeout(raw: Option<String>) -> Duration {
    let secs = match raw.as_deref().map(str::parse::<i64>) {
        Some(Ok(secs)) if secs > 0 => secs,
        Some(_) => {
            warn!(
                "Invalid LOG_VIEW_TIMEOUT_SECS, using {} seconds",
                DEFAULT_LOG_VIEW_TIMEOUT_SECS
            );
            DEFAULT_LOG_VIEW_TIMEOUT_SECS
        }
        None => DEFAULT_LOG_VIEW_TIMEOUT_SECS,
    };
    Duration::seconds(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_defaults_when_unset_or_blank() {
        assert_eq!(parse_prefix(None), "!");
        assert_eq!(parse_prefix(Some("  ".to_string())), "!");
        assert_eq!(parse_prefix(Some("?".to_string())), "?");
    }

    #[test]
    fn timeout_falls_back_on_bad_values() {
        assert_eq!(parse_timeout(None), Duration::seconds(300));
        assert_eq!(parse_timeout(Some("abc".to_string())), Duration::seconds(300));
        assert_eq!(parse_timeout(Some("0".to_string())), Duration::seconds(300));
        assert_eq!(parse_timeout(Some("60".to_string())), Duration::seconds(60));
    }
}
