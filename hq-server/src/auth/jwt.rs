//! JWT Token Service
//!
//! Token generation, validation and parsing for the HTTP API.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
///
/// Built by [`crate::core::Config`] from the environment; nothing in
/// this module reads env vars directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

/// Claims stored inside the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Employee ID (subject)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Role name ("admin" or "employee")
    pub role: String,
    /// Token type
    pub token_type: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a new token for an employee
    pub fn generate_token(&self, emp_id: &str, name: &str, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: emp_id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            token_type: "access".to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Current user context (parsed from JWT claims)
///
/// Created by the auth middleware and injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Employee ID
    pub emp_id: String,
    /// Display name
    pub name: String,
    /// Role name
    pub role: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            emp_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    /// Whether this user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Whether this user may read or act on the given employee's records
    ///
    /// Admins see everyone; regular employees only themselves.
    pub fn can_act_for(&self, emp_id: &str) -> bool {
        self.is_admin() || self.emp_id == emp_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(expiration_minutes: i64) -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long!".to_string(),
            expiration_minutes,
            issuer: "hq-server".to_string(),
            audience: "hq-clients".to_string(),
        })
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = test_service(60);

        let token = service
            .generate_token("EMP001", "Asha Verma", "employee")
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "EMP001");
        assert_eq!(claims.name, "Asha Verma");
        assert_eq!(claims.role, "employee");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Negative lifetime puts exp well past the default leeway
        let service = test_service(-10);

        let token = service
            .generate_token("EMP001", "Asha Verma", "employee")
            .expect("Failed to generate test token");

        match service.validate_token(&token) {
            Err(JwtError::ExpiredToken) => {}
            other => panic!("expected ExpiredToken, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = test_service(60);
        assert!(service.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_token_from_other_issuer_is_rejected() {
        let issuing = JwtService::with_config(JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long!".to_string(),
            expiration_minutes: 60,
            issuer: "someone-else".to_string(),
            audience: "hq-clients".to_string(),
        });
        let validating = test_service(60);

        let token = issuing
            .generate_token("EMP001", "Asha Verma", "employee")
            .expect("Failed to generate test token");

        assert!(validating.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_admin_can_act_for_anyone() {
        let admin = CurrentUser {
            emp_id: "EMP000".to_string(),
            name: "Admin".to_string(),
            role: "admin".to_string(),
        };
        assert!(admin.is_admin());
        assert!(admin.can_act_for("EMP042"));
    }

    #[test]
    fn test_employee_can_only_act_for_self() {
        let user = CurrentUser {
            emp_id: "EMP001".to_string(),
            name: "Asha Verma".to_string(),
            role: "employee".to_string(),
        };
        assert!(!user.is_admin());
        assert!(user.can_act_for("EMP001"));
        assert!(!user.can_act_for("EMP002"));
    }
}
