use std::env;

use chrono::Duration;

use crate::onboarding::token::TokenScope;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the onboarding core.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    pub environment: AppEnvironment,
    pub tokens: TokenTtlConfig,
}

impl OnboardingConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        Ok(Self {
            environment,
            tokens: TokenTtlConfig::load()?,
        })
    }
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            tokens: TokenTtlConfig::default(),
        }
    }
}

/// Per-scope token validity windows, in hours. Each scope falls back to its
/// built-in default when the environment variable is absent.
#[derive(Debug, Clone, Default)]
pub struct TokenTtlConfig {
    upload_documents_hours: Option<i64>,
    sign_contract_hours: Option<i64>,
    cohf_signature_hours: Option<i64>,
    submit_quote_sheet_hours: Option<i64>,
    sign_work_order_hours: Option<i64>,
    upload_contract_hours: Option<i64>,
}

impl TokenTtlConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            upload_documents_hours: read_hours("ONBOARDING_UPLOAD_DOCUMENTS_TOKEN_TTL_HOURS")?,
            sign_contract_hours: read_hours("ONBOARDING_SIGN_CONTRACT_TOKEN_TTL_HOURS")?,
            cohf_signature_hours: read_hours("ONBOARDING_COHF_SIGNATURE_TOKEN_TTL_HOURS")?,
            submit_quote_sheet_hours: read_hours("ONBOARDING_SUBMIT_QUOTE_SHEET_TOKEN_TTL_HOURS")?,
            sign_work_order_hours: read_hours("ONBOARDING_SIGN_WORK_ORDER_TOKEN_TTL_HOURS")?,
            upload_contract_hours: read_hours("ONBOARDING_UPLOAD_CONTRACT_TOKEN_TTL_HOURS")?,
        })
    }

    pub fn ttl(&self, scope: TokenScope) -> Duration {
        let override_hours = match scope {
            TokenScope::UploadDocuments => self.upload_documents_hours,
            TokenScope::SignContract => self.sign_contract_hours,
            TokenScope::CohfSignature => self.cohf_signature_hours,
            TokenScope::SubmitQuoteSheet => self.submit_quote_sheet_hours,
            TokenScope::SignWorkOrder => self.sign_work_order_hours,
            TokenScope::UploadContract => self.upload_contract_hours,
        };
        override_hours.map_or_else(|| scope.default_ttl(), Duration::hours)
    }
}

fn read_hours(var: &'static str) -> Result<Option<i64>, ConfigError> {
    match env::var(var) {
        Ok(raw) => {
            let hours = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidTtl { var })?;
            if hours <= 0 {
                return Err(ConfigError::InvalidTtl { var });
            }
            Ok(Some(hours))
        }
        Err(_) => Ok(None),
    }
}

/// Configuration parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of hours")]
    InvalidTtl { var: &'static str },
}
