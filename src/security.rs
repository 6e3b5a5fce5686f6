use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::constants::BCRYPT_COST;
use crate::error::Result;
use crate::models::{Identity, RowId};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await??;
    Ok(hash)
}

/// Check a password against a stored bcrypt hash.
///
/// A malformed hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    let matches = tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).unwrap_or_else(|e| {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        })
    })
    .await?;
    Ok(matches)
}

// =============================================================================
// Identity Tokens
// =============================================================================

/// Signed claims of an identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: RowId,
    pub username: String,
    pub is_pro: bool,
    /// Expiry as a Unix timestamp
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(identity: Identity, ttl_secs: i64) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            is_pro: identity.is_pro,
            exp: Utc::now().timestamp() + ttl_secs,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            username: self.username.clone(),
            is_pro: self.is_pro,
        }
    }
}

/// Hex-encoded HMAC-SHA256 of `data`
fn sign(data: &str, secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(data.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify HMAC-SHA256 signature
///
/// The comparison runs in constant time.
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Encode and sign `claims` as `base64url(json).hex(hmac)`
pub fn issue_token(claims: &SessionClaims, secret: &str) -> Result<String> {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signature = sign(&payload, secret).ok_or_else(|| {
        crate::AppError::InvalidInput("Session secret is not usable".to_string())
    })?;
    Ok(format!("{payload}.{signature}"))
}

/// Decode a token, returning its claims when the signature holds and it has
/// not expired
pub fn verify_token(token: &str, secret: &str) -> Option<SessionClaims> {
    let (payload, signature) = token.split_once('.')?;

    if !verify_hmac(payload, signature, secret) {
        tracing::warn!("Identity token with invalid signature");
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: SessionClaims = serde_json::from_slice(&bytes).ok()?;

    if claims.exp <= Utc::now().timestamp() {
        tracing::debug!("Identity token for {} expired", claims.username);
        return None;
    }

    Some(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-session-secret";

    fn identity() -> Identity {
        Identity {
            id: RowId::Int(1),
            username: "alice".to_string(),
            is_pro: true,
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let hash = hash_password("secret123".to_string()).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$10$"));

        assert!(verify_password("secret123".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_password_with_malformed_hash() {
        assert!(!verify_password("secret123".to_string(), "not-a-hash".to_string())
            .await
            .unwrap());
    }

    #[test]
    fn test_verify_hmac_valid() {
        let signature = sign("data", SECRET).unwrap();
        assert!(verify_hmac("data", &signature, SECRET));
    }

    #[test]
    fn test_verify_hmac_invalid_signature() {
        assert!(!verify_hmac("data", "zz-not-hex", SECRET));
        assert!(!verify_hmac("data", &"00".repeat(32), SECRET));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let signature = sign("data", "other-secret").unwrap();
        assert!(!verify_hmac("data", &signature, SECRET));
    }

    #[test]
    fn test_token_round_trip_keeps_pro_flag() {
        let claims = SessionClaims::new(identity(), 60);
        let token = issue_token(&claims, SECRET).unwrap();

        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
        assert!(decoded.identity().is_pro);
    }

    #[test]
    fn test_token_rejects_tampering() {
        let token = issue_token(&SessionClaims::new(identity(), 60), SECRET).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = SessionClaims::new(identity(), 60);
        forged.username = "mallory".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        assert!(verify_token(&format!("{forged_payload}.{signature}"), SECRET).is_none());
        assert!(verify_token(&token, "other-secret").is_none());
        assert!(verify_token("garbage", SECRET).is_none());
    }

    #[test]
    fn test_token_rejects_expired() {
        let token = issue_token(&SessionClaims::new(identity(), -1), SECRET).unwrap();
        assert!(verify_token(&token, SECRET).is_none());
    }
}
