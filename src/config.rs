use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub notify_url: Option<Url>,
    pub notify_timeout: Duration,
    /// Zero disables the stale-reservation sweeper.
    pub sweep_interval: Duration,
    pub static_dir: PathBuf,
    pub bootstrap_user: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://spotbook.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "default_dev_secret".to_string());
        let token_ttl = Duration::from_secs(parse_var("TOKEN_TTL_SECS", 3600)?);

        let notify_url = match env::var("NOTIFY_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                Url::parse(raw.trim())
                    .map_err(|err| AppError::Config(format!("invalid NOTIFY_URL: {err}")))?,
            ),
            _ => None,
        };
        let notify_timeout = Duration::from_millis(parse_var("NOTIFY_TIMEOUT_MS", 1000)?);
        let sweep_interval = Duration::from_secs(parse_var("SWEEP_INTERVAL_SECS", 60)?);

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let bootstrap_user = match (env::var("BOOTSTRAP_USERNAME"), env::var("BOOTSTRAP_PASSWORD")) {
            (Ok(username), Ok(password)) => Some((username, password)),
            _ => None,
        };

        Ok(Self {
            database_url,
            listen_addr,
            jwt_secret,
            token_ttl,
            notify_url,
            notify_timeout,
            sweep_interval,
            static_dir,
            bootstrap_user,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://spotbook.db".into(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            jwt_secret: "default_dev_secret".into(),
            token_ttl: Duration::from_secs(3600),
            notify_url: None,
            notify_timeout: Duration::from_millis(1000),
            sweep_interval: Duration::from_secs(60),
            static_dir: PathBuf::from("static"),
            bootstrap_user: None,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {name}: {err}"))),
        Err(_) => Ok(default),
    }
}
