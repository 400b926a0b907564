//! Bearer-token verification for CIRS.
//!
//! Every protected handler goes through [`TokenVerifier`]: parse the
//! `Authorization: Bearer` header, match the token's `kid` against the
//! identity provider's published key set, verify the RS256 signature and
//! check issuer and audience. Key resolution is pluggable via [`KeyStore`];
//! the default [`RemoteJwks`] store fetches the JWKS over HTTP and caches
//! it with a TTL, [`StaticJwks`] serves a fixed set (tests, air-gapped
//! deployments).

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::Value;
use tokio::sync::RwLock;

use cirs_common::{AppError, AppResult};

/// Verified caller identity extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identity-provider subject (`sub`).
    pub sub: String,
    /// Primary email address, when the token carries one.
    pub email: Option<String>,
    /// Given name, when the token carries one.
    pub first_name: Option<String>,
    /// Family name, when the token carries one.
    pub last_name: Option<String>,
    /// Role from the token's public metadata, when present.
    pub role: Option<String>,
}

/// Key resolution strategy for token verification.
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    /// Resolve the decoding key for a key id.
    async fn key_for_kid(&self, kid: &str) -> AppResult<DecodingKey>;
}

/// JWKS fetched from the identity provider, cached with a TTL.
pub struct RemoteJwks {
    http: reqwest::Client,
    url: String,
    ttl: Duration,
    cache: RwLock<JwksCache>,
}

struct JwksCache {
    jwks: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl RemoteJwks {
    /// Create a remote JWKS store.
    pub fn new(url: impl Into<String>, ttl: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build JWKS HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
            ttl,
            cache: RwLock::new(JwksCache {
                jwks: None,
                fetched_at: None,
            }),
        })
    }

    async fn fetch(&self) -> AppResult<JwkSet> {
        self.http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to fetch JWKS: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::ExternalService(format!("JWKS endpoint error: {e}")))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid JWKS response: {e}")))
    }
}

#[async_trait::async_trait]
impl KeyStore for RemoteJwks {
    async fn key_for_kid(&self, kid: &str) -> AppResult<DecodingKey> {
        {
            let cache = self.cache.read().await;
            if let Some(jwk) = cache.jwks.as_ref().and_then(|set| set.find(kid)) {
                return DecodingKey::from_jwk(jwk).map_err(|_| AppError::Unauthorized);
            }
        }

        // Kid miss: refetch once the cached set has gone stale.
        let mut cache = self.cache.write().await;
        let stale = cache
            .fetched_at
            .is_none_or(|fetched| fetched.elapsed() > self.ttl);
        if stale {
            let jwks = self.fetch().await?;
            tracing::debug!(url = %self.url, keys = jwks.keys.len(), "Refreshed JWKS");
            cache.jwks = Some(jwks);
            cache.fetched_at = Some(Instant::now());
        }

        cache
            .jwks
            .as_ref()
            .and_then(|set| set.find(kid))
            .map_or(Err(AppError::Unauthorized), |jwk| {
                DecodingKey::from_jwk(jwk).map_err(|_| AppError::Unauthorized)
            })
    }
}

/// Fixed key set, resolved without any network access.
pub struct StaticJwks {
    jwks: JwkSet,
}

impl StaticJwks {
    /// Create a static store from JWKS JSON.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let jwks = serde_json::from_str::<JwkSet>(json)
            .map_err(|e| AppError::Config(format!("Invalid JWKS JSON: {e}")))?;
        Ok(Self { jwks })
    }
}

#[async_trait::async_trait]
impl KeyStore for StaticJwks {
    async fn key_for_kid(&self, kid: &str) -> AppResult<DecodingKey> {
        self.jwks
            .find(kid)
            .map_or(Err(AppError::Unauthorized), |jwk| {
                DecodingKey::from_jwk(jwk).map_err(|_| AppError::Unauthorized)
            })
    }
}

/// Verifies bearer tokens against the identity provider's key set.
#[derive(Clone)]
pub struct TokenVerifier {
    issuer: String,
    audience: Option<String>,
    keys: Arc<dyn KeyStore>,
    leeway_secs: u64,
}

impl TokenVerifier {
    /// Create a verifier with the given key store.
    #[must_use]
    pub fn new(issuer: impl Into<String>, audience: Option<String>, keys: Arc<dyn KeyStore>) -> Self {
        Self {
            issuer: issuer.into(),
            audience,
            keys,
            leeway_secs: 60,
        }
    }

    /// Verify a bearer token and extract the caller's claims.
    pub async fn verify(&self, token: &str) -> AppResult<Claims> {
        let header = decode_header(token).map_err(|_| AppError::Unauthorized)?;

        if header.alg != Algorithm::RS256 {
            tracing::debug!(alg = ?header.alg, "Rejected token with unsupported algorithm");
            return Err(AppError::Unauthorized);
        }

        let kid = header.kid.ok_or(AppError::Unauthorized)?;
        let key = self.keys.key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        // Audience is checked manually below: the identity provider's
        // session tokens may carry `azp` instead of `aud`.
        validation.validate_aud = false;
        validation.leeway = self.leeway_secs;

        let decoded = decode::<Value>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            AppError::Unauthorized
        })?;

        let claims = decoded.claims;
        self.check_audience(&claims)?;

        let sub = claim_str(&claims, "sub").ok_or(AppError::Unauthorized)?;

        Ok(Claims {
            sub,
            email: claim_str(&claims, "email"),
            first_name: claim_str(&claims, "first_name")
                .or_else(|| claim_str(&claims, "given_name")),
            last_name: claim_str(&claims, "last_name")
                .or_else(|| claim_str(&claims, "family_name")),
            role: claims
                .get("public_metadata")
                .or_else(|| claims.get("publicMetadata"))
                .and_then(|m| m.get("role"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// Verify the `Authorization` header of a request.
    pub async fn verify_headers(&self, headers: &HeaderMap) -> AppResult<Claims> {
        let token = bearer_token(headers)?;
        self.verify(&token).await
    }

    fn check_audience(&self, claims: &Value) -> AppResult<()> {
        let Some(expected) = self.audience.as_deref() else {
            return Ok(());
        };

        let matches = match claims.get("aud") {
            Some(Value::String(aud)) => aud == expected,
            Some(Value::Array(auds)) => auds.iter().any(|a| a.as_str() == Some(expected)),
            // Tokens without `aud` may identify the authorized party via `azp`.
            _ => claims.get("azp").and_then(Value::as_str) == Some(expected),
        };

        if matches {
            Ok(())
        } else {
            tracing::debug!(expected = expected, "Token audience mismatch");
            Err(AppError::Unauthorized)
        }
    }
}

/// Extract the bearer token from an `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<String> {
    let authz = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let token = authz
        .strip_prefix("Bearer ")
        .or_else(|| authz.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    Ok(token.to_string())
}

fn claim_str(claims: &Value, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::traits::PublicKeyParts;
    use rsa::{RsaPrivateKey, RsaPublicKey};
    use serde_json::json;

    const TEST_KID: &str = "test-key-1";
    const ISSUER: &str = "https://id.example.test";
    const AUDIENCE: &str = "https://cirs.example.test";

    struct TestKeys {
        encoding: EncodingKey,
        jwks_json: String,
    }

    fn test_keys() -> TestKeys {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public = RsaPublicKey::from(&private);

        let pem = private
            .to_pkcs1_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap()
            .to_string();
        let encoding = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();

        let n = URL_SAFE_NO_PAD.encode(public.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public.e().to_bytes_be());
        let jwks_json = json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": TEST_KID,
                "n": n,
                "e": e,
            }]
        })
        .to_string();

        TestKeys {
            encoding,
            jwks_json,
        }
    }

    fn sign(keys: &TestKeys, claims: Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(TEST_KID.to_string());
        encode(&header, &claims, &keys.encoding).unwrap()
    }

    fn verifier(keys: &TestKeys, audience: Option<&str>) -> TokenVerifier {
        let store = StaticJwks::from_json(&keys.jwks_json).unwrap();
        TokenVerifier::new(ISSUER, audience.map(str::to_string), Arc::new(store))
    }

    fn base_claims() -> Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "user_123",
            "iat": now,
            "exp": now + 3600,
            "email": "citizen@example.test",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "public_metadata": { "role": "admin" },
        })
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let keys = test_keys();
        let token = sign(&keys, base_claims());

        let claims = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email.as_deref(), Some("citizen@example.test"));
        assert_eq!(claims.role.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_issuer() {
        let keys = test_keys();
        let mut claims = base_claims();
        claims["iss"] = json!("https://evil.example.test");
        let token = sign(&keys, claims);

        let err = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_audience() {
        let keys = test_keys();
        let mut claims = base_claims();
        claims["aud"] = json!("https://other.example.test");
        let token = sign(&keys, claims);

        let err = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_accepts_azp_when_aud_missing() {
        let keys = test_keys();
        let mut claims = base_claims();
        claims.as_object_mut().unwrap().remove("aud");
        claims["azp"] = json!(AUDIENCE);
        let token = sign(&keys, claims);

        let claims = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap();
        assert_eq!(claims.sub, "user_123");
    }

    #[tokio::test]
    async fn test_verify_skips_audience_when_not_configured() {
        let keys = test_keys();
        let mut claims = base_claims();
        claims["aud"] = json!("https://whatever.example.test");
        let token = sign(&keys, claims);

        assert!(verifier(&keys, None).verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_token() {
        let keys = test_keys();
        let mut claims = base_claims();
        let now = chrono::Utc::now().timestamp();
        claims["exp"] = json!(now - 3600);
        let token = sign(&keys, claims);

        let err = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_rejects_missing_kid() {
        let keys = test_keys();
        let header = Header::new(Algorithm::RS256);
        let token = encode(&header, &base_claims(), &keys.encoding).unwrap();

        let err = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_kid() {
        let keys = test_keys();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("unknown-key".to_string());
        let token = encode(&header, &base_claims(), &keys.encoding).unwrap();

        let err = verifier(&keys, Some(AUDIENCE)).verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers).unwrap_err(),
            AppError::Unauthorized
        ));
    }

    #[test]
    fn test_bearer_token_strips_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }
}
