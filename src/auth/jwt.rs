use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn issue(
    token_type: TokenType,
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    (token, claims)
}

pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> String {
    issue(
        TokenType::Access,
        user_id,
        username,
        role,
        employee_id,
        secret,
        ttl,
    )
    .0
}

pub fn generate_refresh_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    issue(
        TokenType::Refresh,
        user_id,
        username,
        role,
        employee_id,
        secret,
        ttl,
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(42, "jane".into(), 2, Some(1000), "secret", 60);
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "jane");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.employee_id, Some(1000));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(42, "jane".into(), 2, None, "secret", 60);
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn refresh_tokens_get_unique_jtis() {
        let (_, a) = generate_refresh_token(42, "jane".into(), 2, None, "secret", 60);
        let (_, b) = generate_refresh_token(42, "jane".into(), 2, None, "secret", 60);
        assert_ne!(a.jti, b.jti);
    }
}
