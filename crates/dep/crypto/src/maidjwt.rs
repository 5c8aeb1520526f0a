//! MAID access-management JWT.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::CryptoError;

/// Service type claim of a Managed Apple ID access-management JWT.
pub const MAID_JWT_SERVICE_TYPE: &str = "com.apple.maid";

#[derive(Serialize)]
struct MaidClaims<'a> {
    iss: &'a str,
    iat: i64,
    jti: &'a str,
    service_type: &'static str,
}

/// Generate a signed MAID JWT for an MDM client's CheckIn "GetToken"
/// message.
///
/// `key_pem` is the current token-PKI private key (the DEP name's MDM
/// server key) in PEM form. `server_uuid` is the UUID of the MDM server as
/// reported by the account-detail endpoint. No claim may be empty.
pub fn new_maid_jwt(
    key_pem: &[u8],
    server_uuid: &str,
    iat: DateTime<Utc>,
    jti: &str,
) -> Result<String, CryptoError> {
    if server_uuid.is_empty() || jti.is_empty() || iat.timestamp() == 0 {
        return Err(CryptoError::EmptyClaim);
    }
    let key = EncodingKey::from_rsa_pem(key_pem)?;
    let claims = MaidClaims {
        iss: server_uuid,
        iat: iat.timestamp(),
        jti,
        service_type: MAID_JWT_SERVICE_TYPE,
    };
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pem_rsa_private_key, test_pki};
    use base64::Engine as _;

    #[test]
    fn signs_rs256_with_expected_claims() {
        let (key, _) = test_pki();
        let key_pem = pem_rsa_private_key(key).unwrap();

        let iat = Utc::now();
        let jwt = new_maid_jwt(&key_pem, "677cab70-fe18", iat, "a-jti").unwrap();

        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header: serde_json::Value =
            serde_json::from_slice(&engine.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "RS256");

        let claims: serde_json::Value =
            serde_json::from_slice(&engine.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["iss"], "677cab70-fe18");
        assert_eq!(claims["jti"], "a-jti");
        assert_eq!(claims["service_type"], MAID_JWT_SERVICE_TYPE);
        assert_eq!(claims["iat"], iat.timestamp());
    }

    #[test]
    fn empty_claims_are_refused() {
        let (key, _) = test_pki();
        let key_pem = pem_rsa_private_key(key).unwrap();

        assert!(matches!(
            new_maid_jwt(&key_pem, "", Utc::now(), "a-jti"),
            Err(CryptoError::EmptyClaim)
        ));
        assert!(matches!(
            new_maid_jwt(&key_pem, "uuid", Utc::now(), ""),
            Err(CryptoError::EmptyClaim)
        ));
    }
}
