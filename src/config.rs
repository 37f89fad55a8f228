use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub reset_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
    pub debug: bool,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to touch the process env.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL")
            .or_else(|| get("MONGODB_URL"))
            .context("DATABASE_URL (or MONGODB_URL) must be set")?;

        let jwt = JwtConfig {
            secret: get("SECRET_KEY")
                .or_else(|| get("JWT_SECRET"))
                .context("SECRET_KEY must be set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "fleety".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "fleety-users".into()),
            ttl_minutes: parse_minutes(&get, "ACCESS_TOKEN_EXPIRE_MINUTES", 60 * 24)?,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => vec!["*".to_string()],
        };

        Ok(Self {
            database_url,
            jwt,
            reset_ttl_minutes: parse_minutes(&get, "RESET_TOKEN_EXPIRE_MINUTES", 60)?,
            cors_origins,
            debug: get("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false),
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "APP_PORT", 8000)?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

// one year
const MAX_TTL_MINUTES: i64 = 525_600;

fn parse_minutes<F>(get: &F, key: &str, default: i64) -> anyhow::Result<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let minutes = parse_or(get, key, default)?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("{key} must be between 1 and {MAX_TTL_MINUTES} minutes, got {minutes}");
    }
    Ok(minutes)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Accepts either `a,b,c` or a JSON array such as `["a","b"]`.
fn parse_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    let raw = raw.trim();
    let origins: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str(raw).context("CORS_ORIGINS is not a valid JSON array")?
    } else {
        raw.split(',').map(|s| s.trim().to_string()).collect()
    };
    let origins: Vec<String> = origins.into_iter().filter(|s| !s.is_empty()).collect();
    if origins.is_empty() {
        return Ok(vec!["*".to_string()]);
    }
    Ok(origins)
}
