//! JWT identity verification
//!
//! Turns a signed local token into the address it was issued for.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::Value;
use std::collections::HashMap;

use super::IdentityVerifier;
use crate::binding::LocalIdentity;
use crate::config::AuthConfig;
use crate::error::Result;

/// HMAC-signed JWT verifier
pub struct JwtIdentityVerifier {
    /// Decoding key
    decoding_key: DecodingKey,
    /// Validation configuration
    validation: Validation,
    /// Claim carrying the address
    address_claim: String,
}

impl JwtIdentityVerifier {
    /// Create new verifier from the auth section
    pub fn new(config: &AuthConfig) -> Result<Self> {
        crate::ensure!(!config.jwt_secret.is_empty(), config, "JWT secret must not be empty");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Local tokens carry no registered claims beyond an optional exp
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = config.leeway;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            address_claim: config.address_claim.clone(),
        })
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<LocalIdentity> {
        let token_data = decode::<HashMap<String, Value>>(
            token.trim(),
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => crate::gateway_err!(authentication, "认证令牌已过期"),
            _ => crate::gateway_err!(authentication, "Token validation failed: {}", e),
        })?;

        let address = token_data
            .claims
            .get(&self.address_claim)
            .and_then(Value::as_str)
            .filter(|address| !address.trim().is_empty())
            .ok_or_else(|| {
                crate::gateway_err!(
                    authentication,
                    "Token has no usable `{}` claim",
                    self.address_claim
                )
            })?;

        LocalIdentity::new(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn verifier() -> JwtIdentityVerifier {
        JwtIdentityVerifier::new(&AuthConfig {
            jwt_secret: SECRET.to_string(),
            ..AuthConfig::default()
        })
        .unwrap()
    }

    fn sign(alg: Algorithm, secret: &str, claims: &Value) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_without_exp() {
        let token = sign(Algorithm::HS256, SECRET, &json!({"address": "0xABC"}));
        assert_eq!(verifier().verify(&token).unwrap().as_str(), "0xABC");
    }

    #[test]
    fn test_hs512_accepted() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = sign(
            Algorithm::HS512,
            SECRET,
            &json!({"address": "0xDEF", "exp": exp}),
        );
        assert_eq!(verifier().verify(&token).unwrap().as_str(), "0xDEF");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(Algorithm::HS256, "other", &json!({"address": "0xABC"}));
        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, GatewayError::Authentication { .. }));
    }

    #[test]
    fn test_expired_rejected() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = sign(
            Algorithm::HS256,
            SECRET,
            &json!({"address": "0xABC", "exp": exp}),
        );
        let err = verifier().verify(&token).unwrap_err();
        assert!(err.to_string().contains("过期"));
    }

    #[test]
    fn test_missing_or_blank_address_rejected() {
        let token = sign(Algorithm::HS256, SECRET, &json!({"sub": "0xABC"}));
        assert!(verifier().verify(&token).is_err());

        let token = sign(Algorithm::HS256, SECRET, &json!({"address": "  "}));
        assert!(verifier().verify(&token).is_err());

        let token = sign(Algorithm::HS256, SECRET, &json!({"address": 42}));
        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn test_custom_claim_name() {
        let verifier = JwtIdentityVerifier::new(&AuthConfig {
            jwt_secret: SECRET.to_string(),
            address_claim: "wallet".to_string(),
            leeway: 0,
        })
        .unwrap();
        let token = sign(Algorithm::HS256, SECRET, &json!({"wallet": "0x123"}));
        assert_eq!(verifier.verify(&token).unwrap().as_str(), "0x123");
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"address":"0xABC"}"#);
        let token = format!("{header}.{payload}.");
        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, GatewayError::Authentication { .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verifier().verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let err = JwtIdentityVerifier::new(&AuthConfig::default()).err().unwrap();
        assert!(matches!(err, GatewayError::Config { .. }));
    }
}
