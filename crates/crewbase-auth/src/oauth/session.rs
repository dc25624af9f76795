//! Authorization code sessions.
//!
//! A session tracks an authorization grant from code issuance through
//! exchange. Codes are single-use and short-lived.
//!
//! # Security
//!
//! - Authorization codes are cryptographically random (256 bits)
//! - Sessions expire after a short time (default 10 minutes)
//! - Codes are consumed atomically on exchange

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Authorization session stored in the database.
///
/// Binds the authorization code to the client, redirect URI, scope, and
/// the authenticated user, so that the token exchange can verify the code
/// is presented by the party it was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationSession {
    /// Unique session identifier.
    pub id: Uuid,

    /// Authorization code (one-time use).
    /// 256-bit random value, base64url-encoded.
    pub code: String,

    /// Client identifier that initiated the request.
    pub client_id: String,

    /// Redirect URI from the authorization request.
    /// Must match the redirect_uri in the token request.
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// State parameter from the authorization request.
    /// Stored for audit/debugging purposes.
    pub state: String,

    /// The user that approved the authorization.
    pub user_id: Uuid,

    /// Timestamp when the session was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp when the session expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Timestamp when the code was exchanged (consumed).
    /// None until the code is used.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub consumed_at: Option<OffsetDateTime>,
}

impl AuthorizationSession {
    /// Generates a new cryptographically secure authorization code.
    ///
    /// The code is 256 bits (32 bytes) of random data, encoded as
    /// base64url without padding (43 characters). This exceeds the
    /// OAuth 2.0 recommendation of at least 128 bits of entropy.
    #[must_use]
    pub fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the session has expired.
    ///
    /// Expired sessions must not be used for code exchange.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the authorization code has been consumed.
    ///
    /// Consumed codes cannot be used again.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the session is valid for code exchange.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn create_test_session(
        expires_at: OffsetDateTime,
        consumed_at: Option<OffsetDateTime>,
    ) -> AuthorizationSession {
        let now = OffsetDateTime::now_utc();
        AuthorizationSession {
            id: Uuid::new_v4(),
            code: AuthorizationSession::generate_code(),
            client_id: "dispatch-portal".to_string(),
            redirect_uri: "https://dispatch.example.com/callback".to_string(),
            scope: "profile fleet.read".to_string(),
            state: "test-state".to_string(),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at,
            consumed_at,
        }
    }

    #[test]
    fn test_generate_code_length() {
        let code = AuthorizationSession::generate_code();
        // 32 bytes = 256 bits, base64url encoded = 43 characters (no padding)
        assert_eq!(code.len(), 43);
    }

    #[test]
    fn test_generate_code_is_base64url() {
        let code = AuthorizationSession::generate_code();
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_code_uniqueness() {
        let codes: Vec<String> = (0..100)
            .map(|_| AuthorizationSession::generate_code())
            .collect();

        let mut unique = codes.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn test_session_is_expired() {
        let now = OffsetDateTime::now_utc();

        let session = create_test_session(now + Duration::minutes(10), None);
        assert!(!session.is_expired());

        let session = create_test_session(now - Duration::minutes(1), None);
        assert!(session.is_expired());
    }

    #[test]
    fn test_session_is_consumed() {
        let now = OffsetDateTime::now_utc();

        let session = create_test_session(now + Duration::minutes(10), None);
        assert!(!session.is_consumed());

        let session = create_test_session(now + Duration::minutes(10), Some(now));
        assert!(session.is_consumed());
    }

    #[test]
    fn test_session_is_valid() {
        let now = OffsetDateTime::now_utc();

        let session = create_test_session(now + Duration::minutes(10), None);
        assert!(session.is_valid());

        let session = create_test_session(now - Duration::minutes(1), None);
        assert!(!session.is_valid());

        let session = create_test_session(now + Duration::minutes(10), Some(now));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_session_serialization() {
        let now = OffsetDateTime::now_utc();
        let session = create_test_session(now + Duration::minutes(10), None);

        let json = serde_json::to_string(&session).unwrap();
        let deserialized: AuthorizationSession = serde_json::from_str(&json).unwrap();

        assert_eq!(session.id, deserialized.id);
        assert_eq!(session.code, deserialized.code);
        assert_eq!(session.client_id, deserialized.client_id);
        assert_eq!(session.user_id, deserialized.user_id);
        assert!(!json.contains("consumedAt"));
    }
}
