use serde::Deserialize;

use crate::diagnosis::formulas::Formula;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Outbound mail settings. `smtp_host = None` selects the log-only mailer.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub diagnosis_formula: Formula,
    /// Archive requests check that the user row exists before snapshotting.
    pub enforce_user_fk: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "clinicare".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "clinicare-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_username: std::env::var("SMTP_USERNAME").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@clinicare.local".into()),
        };
        let diagnosis_formula = match std::env::var("DIAGNOSIS_FORMULA") {
            Ok(v) => v
                .parse::<Formula>()
                .map_err(|e| anyhow::anyhow!("DIAGNOSIS_FORMULA: {e}"))?,
            Err(_) => Formula::default(),
        };
        let enforce_user_fk = std::env::var("ENFORCE_USER_FK")
            .map(|v| parse_bool(&v))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            max_connections,
            jwt,
            mail,
            diagnosis_formula,
            enforce_user_fk,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn parse_bool(v: &str) -> bool {
    !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(" OFF "));
        assert!(!parse_bool("0"));
    }
}
