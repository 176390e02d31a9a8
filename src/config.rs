use std::env;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://caregiver-tools-dayclock.pages.dev";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub key_prefix: String,
    /// Ordered; the first entry is the fallback `Access-Control-Allow-Origin`.
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => parse_origins(&raw)?,
            Err(_) => vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            key_prefix: env::var("KV_KEY_PREFIX").unwrap_or_default(),
            allowed_origins,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "65536".into())
                .parse()?,
        })
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if origins.is_empty() {
        anyhow::bail!("ALLOWED_ORIGINS must list at least one origin");
    }
    Ok(origins)
}
