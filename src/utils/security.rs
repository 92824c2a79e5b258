use base64::Engine;
use base64::engine::general_purpose;
use hmac::Hmac;
use hmac::Mac;
use pbkdf2::pbkdf2_hmac;
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_PREFIX: &str = "OC ";
const ACCESS_TTL_SECS: u64 = 3600;
const REFRESH_TTL_SECS: u64 = 30 * 24 * 3600;

pub fn b64_encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

pub fn b64_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

pub fn generate_key(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.try_fill_bytes(&mut bytes).unwrap();
    b64_encode(&bytes)
}

pub fn generate_salt() -> [u8; 16] {
    let mut salt = [0u8; 16];
    OsRng.try_fill_bytes(&mut salt).unwrap();
    salt
}

pub fn hash_password(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut hash = vec![0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, 10_000, &mut hash);
    hash
}

pub fn store_password(password: &str) -> String {
    let salt = generate_salt();
    let hashed = hash_password(password, &salt);
    format!("{}${}", hex::encode(salt), hex::encode(hashed))
}

pub fn check_password(stored: &str, password: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 2 {
        return false;
    }
    let (Ok(salt), Ok(stored_hash)) = (hex::decode(parts[0]), hex::decode(parts[1])) else {
        return false;
    };
    let new_hash = hash_password(password, &salt);
    new_hash == stored_hash
}

// pbkdf2 is deliberately slow, keep it off the runtime threads

pub async fn store_password_async(password: String) -> String {
    tokio::task::spawn_blocking(move || store_password(&password))
        .await
        .expect("blocking task panicked")
}

pub async fn check_password_async(stored: String, password: String) -> bool {
    tokio::task::spawn_blocking(move || check_password(&stored, &password))
        .await
        .expect("blocking task panicked")
}

#[derive(Debug, Serialize)]
pub struct DecodedToken {
    pub user_id: String,
    pub is_expired: bool,
    pub expiration_timestamp: u64,
    pub secret: String,
    pub key_type: String,
    pub session_id: String,
}

fn hmac_sha256_b64(message: &str, signature_key: &str) -> anyhow::Result<String> {
    let mut mac = HmacSha256::new_from_slice(signature_key.as_bytes())
        .map_err(|e| anyhow::anyhow!("bad signature key: {}", e))?;
    mac.update(message.as_bytes());
    let result = mac.finalize().into_bytes();
    Ok(general_purpose::STANDARD.encode(result))
}

fn verify_hmac_b64(message: &str, sig_b64: &str, signature_key: &str) -> bool {
    hmac_sha256_b64(message, signature_key)
        .map(|expected| expected.eq(sig_b64))
        .unwrap_or(false)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Opaque signed token: "OC <b64 payload>.<b64 hmac>".
/// Payload fields are NUL-joined: user_id, expiration, secret, session_id, key_type.
pub fn generate_token(
    user_id: &str,
    key_type: &str,
    long_term: bool,
    secret: &str,
    session_id: &str,
    signature_key: &str,
) -> anyhow::Result<String> {
    let now = now_secs();
    let expiration = if long_term {
        now + REFRESH_TTL_SECS
    } else {
        now + ACCESS_TTL_SECS
    };

    let combined = format!(
        "{}\0{}\0{}\0{}\0{}",
        user_id, expiration, secret, session_id, key_type
    );
    let payload = b64_encode(combined.as_bytes());
    let signature = hmac_sha256_b64(&payload, signature_key)?;

    Ok(format!("{}{}.{}", TOKEN_PREFIX, payload, signature))
}

pub fn decode_token(
    token: &str,
    verify_type: Option<&str>,
    signature_key: &str,
) -> Result<DecodedToken, &'static str> {
    let t = token.strip_prefix(TOKEN_PREFIX).ok_or("INVALID_TOKEN")?;

    // split on the last '.', rsplitn yields [signature, payload]
    let parts_rev: Vec<&str> = t.rsplitn(2, '.').collect();
    if parts_rev.len() != 2 {
        return Err("INVALID_TOKEN_FORMAT");
    }
    let signature = parts_rev[0];
    let payload = parts_rev[1];

    if !verify_hmac_b64(payload, signature, signature_key) {
        return Err("INVALID_SIGNATURE");
    }

    let decoded_str = b64_decode(payload)
        .ok()
        .and_then(|b| String::from_utf8(b).ok())
        .ok_or("DECODE_ERROR")?;

    let parts: Vec<&str> = decoded_str.split('\0').collect();
    if parts.len() != 5 {
        return Err("DECODE_ERROR");
    }

    let expiration_ts = parts[1].parse::<u64>().map_err(|_| "DECODE_ERROR")?;
    let key_type = parts[4];

    if let Some(expected) = verify_type {
        if expected != key_type {
            return Err("INVALID_TOKEN");
        }
    }

    Ok(DecodedToken {
        user_id: parts[0].to_string(),
        is_expired: now_secs() > expiration_ts,
        expiration_timestamp: expiration_ts,
        secret: parts[2].to_string(),
        session_id: parts[3].to_string(),
        key_type: key_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "test-signature-key";

    #[test]
    fn token_round_trip() {
        let token = generate_token("42", "access", false, "secret", "7", KEY).unwrap();
        let decoded = decode_token(&token, Some("access"), KEY).unwrap();

        assert_eq!(decoded.user_id, "42");
        assert_eq!(decoded.secret, "secret");
        assert_eq!(decoded.session_id, "7");
        assert_eq!(decoded.key_type, "access");
        assert!(!decoded.is_expired);
    }

    #[test]
    fn token_wrong_type_rejected() {
        let token = generate_token("42", "refresh", true, "secret", "7", KEY).unwrap();
        let err = decode_token(&token, Some("access"), KEY).unwrap_err();
        assert_eq!(err, "INVALID_TOKEN");
    }

    #[test]
    fn token_tamper_rejected() {
        let token = generate_token("42", "access", false, "secret", "7", KEY).unwrap();
        let tampered = token.replace('a', "b");
        assert!(decode_token(&tampered, None, KEY).is_err());
    }

    #[test]
    fn token_wrong_key_rejected() {
        let token = generate_token("42", "access", false, "secret", "7", KEY).unwrap();
        let err = decode_token(&token, None, "other-key").unwrap_err();
        assert_eq!(err, "INVALID_SIGNATURE");
    }

    #[test]
    fn password_store_and_check() {
        let stored = store_password("hunter2");
        assert!(check_password(&stored, "hunter2"));
        assert!(!check_password(&stored, "hunter3"));
        assert!(!check_password("garbage", "hunter2"));
    }
}
