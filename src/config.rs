use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_IDLE_MINUTES: i64 = 240;

/// Runtime settings, read from `LINEUP_*` environment variables.
/// A port given on the command line wins over `LINEUP_PORT`.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind: String,
    pub port: u16,
    pub session_idle_minutes: i64,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            session_idle_minutes: DEFAULT_IDLE_MINUTES,
            secure_cookies: false,
        }
    }
}

impl Config {
    pub fn from_env(port_arg: Option<&str>) -> Self {
        Self::from_lookup(port_arg, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(port_arg: Option<&str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let port = port_arg
            .map(str::to_string)
            .or_else(|| lookup("LINEUP_PORT"))
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let session_idle_minutes = lookup("LINEUP_SESSION_IDLE_MINUTES")
            .and_then(|m| m.trim().parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(defaults.session_idle_minutes);

        Config {
            data_dir: lookup("LINEUP_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            bind: lookup("LINEUP_BIND").unwrap_or(defaults.bind),
            port,
            session_idle_minutes,
            secure_cookies: lookup("LINEUP_SECURE_COOKIES")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.secure_cookies),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = Config::from_lookup(None, lookup_from(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.session_idle_minutes, 240);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn port_argument_overrides_env() {
        let env = lookup_from(&[
            ("LINEUP_PORT", "9000"),
            ("LINEUP_DATA_DIR", "/srv/club"),
            ("LINEUP_SECURE_COOKIES", "Yes"),
        ]);
        let config = Config::from_lookup(Some("9100"), env);
        assert_eq!(config.port, 9100);
        assert!(config.secure_cookies);
        assert_eq!(config.data_dir, PathBuf::from("/srv/club"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let env = lookup_from(&[("LINEUP_PORT", "http"), ("LINEUP_SESSION_IDLE_MINUTES", "-5")]);
        let config = Config::from_lookup(None, env);
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_idle_minutes, 240);
    }
}
