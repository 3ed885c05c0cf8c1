use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Recipe provider (Spoonacular-compatible) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub image_base_url: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Nutrition estimator (Nutritionix-compatible) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub provider: ProviderConfig,
    pub estimator: EstimatorConfig,
}

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://spoonacular.com/recipeImages/";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Prefixes are joined with a plain `format!`, so the base must end in `/`.
fn with_trailing_slash(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{url}/")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: env_or("JWT_ISSUER", "nutriplan"),
            audience: env_or("JWT_AUDIENCE", "nutriplan-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let provider = ProviderConfig {
            base_url: env_or("SPOON_BASE_URL", "https://api.spoonacular.com"),
            api_key: std::env::var("SPOON_API_KEY").context("SPOON_API_KEY is not set")?,
            image_base_url: with_trailing_slash(env_or("SPOON_IMAGE_BASE_URL", DEFAULT_IMAGE_BASE_URL)),
            timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS", 15),
        };
        let estimator = EstimatorConfig {
            base_url: env_or("NUTRITIONIX_BASE_URL", "https://trackapi.nutritionix.com"),
            app_id: env_or("NUTRITIONIX_APP_ID", ""),
            app_key: env_or("NUTRITIONIX_APP_KEY", ""),
        };
        Ok(Self {
            database_url,
            jwt,
            provider,
            estimator,
        })
    }
}
