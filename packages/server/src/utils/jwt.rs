use anyhow::{Result, anyhow};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // User ID
    pub email: String, // Email at issue time
    pub iat: usize,    // Issued-at timestamp
    pub exp: usize,    // Expiration timestamp
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Ok(Uuid::parse_str(&self.sub)?)
    }
}

/// Sign a new JWT token for a user.
pub fn sign(user_id: Uuid, email: &str, secret: &str, ttl_hours: i64) -> Result<String> {
    let ttl = TimeDelta::try_hours(ttl_hours)
        .ok_or_else(|| anyhow!("token ttl of {ttl_hours}h is out of range"))?;
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow!("token expiry out of range"))?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        iat: now.timestamp().max(0) as usize,
        exp: expiration.max(0) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature and expiry, then decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
