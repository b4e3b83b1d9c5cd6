use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Runtime configuration, read from `TRIVIA_*` environment variables (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_env(Environment::with_prefix("TRIVIA").try_parsing(true))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "sqlite:trivia.db")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use config::Map;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let source: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("TRIVIA")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn defaults_apply_without_env() {
        let settings = Settings::from_env(env_from(&[])).unwrap();
        assert_eq!(settings.database_url, "sqlite:trivia.db");
        assert_eq!(settings.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn env_overrides_defaults() {
        let settings = Settings::from_env(env_from(&[
            ("TRIVIA_DATABASE_URL", "sqlite::memory:"),
            ("TRIVIA_PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.host, "0.0.0.0");
    }
}
