use rand::{distributions::Alphanumeric, Rng};

/// Deployment environment, read from `ENVIRONMENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("development") | Some("dev") => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    /// Key used to sign session tokens
    pub secret_key: String,
    /// Fixed seed for reproducible dice, random dice when unset
    pub dice_seed: Option<u64>,
    /// Origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the process environment (and `.env` if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = Environment::parse(lookup("ENVIRONMENT").as_deref());

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let secret_key = lookup("SECRET_KEY")
            .filter(|k| !k.is_empty())
            .unwrap_or_else(generate_secret_key);

        let dice_seed = lookup("DICE_SEED").and_then(|s| s.parse().ok());

        let allowed_origins = if environment.is_development() {
            vec![
                format!("http://localhost:{}", port),
                format!("http://127.0.0.1:{}", port),
            ]
        } else {
            lookup("PUBLIC_URL")
                .map(|url| vec![url])
                .unwrap_or_else(|| vec![format!("http://localhost:{}", port)])
        };

        Self {
            port,
            environment,
            secret_key,
            dice_seed,
            allowed_origins,
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self.environment {
            Environment::Development => "ludo_duel=debug,tower_http=info",
            Environment::Production => "ludo_duel=info,tower_http=warn",
        }
    }
}

/// Random 64-character signing key
fn generate_secret_key() -> String {
    rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));

        assert_eq!(config.port, 8000);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.secret_key.len(), 64);
        assert!(config.dice_seed.is_none());
        assert_eq!(config.default_log_filter(), "ludo_duel=info,tower_http=warn");
    }

    #[test]
    fn test_development_settings() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ENVIRONMENT", "dev"),
            ("PORT", "9000"),
            ("SECRET_KEY", "fixed"),
            ("DICE_SEED", "7"),
        ]));

        assert!(config.environment.is_development());
        assert_eq!(config.port, 9000);
        assert_eq!(config.secret_key, "fixed");
        assert_eq!(config.dice_seed, Some(7));
        assert!(config
            .allowed_origins
            .contains(&"http://localhost:9000".to_string()));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", "abc"), ("DICE_SEED", "-1")]));

        assert_eq!(config.port, 8000);
        assert!(config.dice_seed.is_none());
    }
}
