use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::domain::ContractorId;

const TOKEN_BYTES: usize = 32;

/// The single action a token authorizes for an unauthenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenScope {
    UploadDocuments,
    SignContract,
    CohfSignature,
    SubmitQuoteSheet,
    SignWorkOrder,
    UploadContract,
}

impl TokenScope {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UploadDocuments => "upload-documents",
            Self::SignContract => "sign-contract",
            Self::CohfSignature => "cohf-signature",
            Self::SubmitQuoteSheet => "submit-quote-sheet",
            Self::SignWorkOrder => "sign-work-order",
            Self::UploadContract => "upload-contract",
        }
    }

    /// Default validity window per scope: signature links are short, upload
    /// and submission links last a week.
    pub fn default_ttl(self) -> Duration {
        match self {
            Self::SignContract | Self::CohfSignature => Duration::hours(72),
            Self::UploadDocuments
            | Self::SubmitQuoteSheet
            | Self::SignWorkOrder
            | Self::UploadContract => Duration::hours(168),
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a token stopped being usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumedReason {
    /// The scoped action ran with this token.
    Used,
    /// A replacement token for the same owner and scope was issued.
    Superseded,
}

/// A scoped, expiring, single-use credential bound to one contractor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionToken {
    pub value: String,
    pub owner: ContractorId,
    pub scope: TokenScope,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: Option<ConsumedReason>,
}

impl ActionToken {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.consumed.is_none() && now <= self.expires_at
    }
}

/// Token subsystem failures. The surrounding layer collapses these into one
/// generic "link invalid or expired" message; the distinction exists for
/// operator logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token not found")]
    NotFound,
    #[error("token expired")]
    Expired,
    #[error("token already consumed")]
    AlreadyConsumed,
}

/// What a successful validation or consumption grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenGrant {
    pub contractor_id: ContractorId,
    pub scope: TokenScope,
}

/// Issues and validates action tokens, guaranteeing at most one live token per
/// `(owner, scope)` pair and at most one successful consumption per token.
///
/// Expiry is evaluated at read time; nothing sweeps expired entries.
#[derive(Default)]
pub struct TokenVault {
    tokens: Mutex<HashMap<String, ActionToken>>,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, owner: ContractorId, scope: TokenScope, ttl: Duration) -> ActionToken {
        self.issue_at(owner, scope, ttl, Utc::now())
    }

    /// Mints a fresh token and marks any prior live token for the same owner
    /// and scope as superseded, all under one lock so a stale link can never
    /// race a fresh one.
    pub fn issue_at(
        &self,
        owner: ContractorId,
        scope: TokenScope,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> ActionToken {
        let token = ActionToken {
            value: generate_value(),
            owner: owner.clone(),
            scope,
            issued_at: now,
            expires_at: now + ttl,
            consumed: None,
        };

        let mut guard = self.tokens.lock().expect("token vault mutex poisoned");
        for existing in guard.values_mut() {
            if existing.owner == owner && existing.scope == scope && existing.consumed.is_none() {
                existing.consumed = Some(ConsumedReason::Superseded);
            }
        }
        guard.insert(token.value.clone(), token.clone());
        token
    }

    /// Checks a token without consuming it, so a holder can e.g. preview a
    /// contract repeatedly before the one signing submission.
    pub fn validate(&self, value: &str) -> Result<TokenGrant, TokenError> {
        self.validate_at(value, Utc::now())
    }

    pub fn validate_at(&self, value: &str, now: DateTime<Utc>) -> Result<TokenGrant, TokenError> {
        let guard = self.tokens.lock().expect("token vault mutex poisoned");
        let token = guard.get(value).ok_or(TokenError::NotFound)?;
        check_usable(token, now)?;
        Ok(TokenGrant {
            contractor_id: token.owner.clone(),
            scope: token.scope,
        })
    }

    /// Same checks as validation, then flips the token to consumed while the
    /// vault lock is held: of N concurrent calls for one value, exactly one
    /// succeeds and the rest see `AlreadyConsumed`.
    pub fn consume(&self, value: &str) -> Result<TokenGrant, TokenError> {
        self.consume_at(value, Utc::now())
    }

    pub fn consume_at(&self, value: &str, now: DateTime<Utc>) -> Result<TokenGrant, TokenError> {
        let mut guard = self.tokens.lock().expect("token vault mutex poisoned");
        let token = guard.get_mut(value).ok_or(TokenError::NotFound)?;
        check_usable(token, now)?;
        token.consumed = Some(ConsumedReason::Used);
        Ok(TokenGrant {
            contractor_id: token.owner.clone(),
            scope: token.scope,
        })
    }

    /// Live token for an owner and scope, if one exists.
    pub fn live_token(&self, owner: &ContractorId, scope: TokenScope) -> Option<ActionToken> {
        self.live_token_at(owner, scope, Utc::now())
    }

    pub fn live_token_at(
        &self,
        owner: &ContractorId,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Option<ActionToken> {
        let guard = self.tokens.lock().expect("token vault mutex poisoned");
        guard
            .values()
            .find(|token| token.owner == *owner && token.scope == scope && token.is_live(now))
            .cloned()
    }
}

fn check_usable(token: &ActionToken, now: DateTime<Utc>) -> Result<(), TokenError> {
    // Expiry wins over consumption state: an expired token is never valid.
    if now > token.expires_at {
        return Err(TokenError::Expired);
    }
    if token.consumed.is_some() {
        return Err(TokenError::AlreadyConsumed);
    }
    Ok(())
}

fn generate_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
