//! CMS enveloped-data handling for the Apple token bundle.
//!
//! After the staged certificate is uploaded, the ABM/ASM/ABE portal hands
//! back a `.p7m` S/MIME file: a CMS enveloped-data structure with the
//! uploaded certificate as recipient. Inside is a small JSON document with
//! the OAuth1 four-tuple and its expiry, wrapped in MIME headers and
//! `-----BEGIN MESSAGE-----` armor.
//!
//! The encryption direction is here too, for simulators and tests.

use base64::Engine as _;
use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _};
use cms::cert::IssuerAndSerialNumber;
use cms::content_info::{CmsVersion, ContentInfo};
use cms::enveloped_data::{
    EncryptedContentInfo, EnvelopedData, KeyTransRecipientInfo, RecipientIdentifier,
    RecipientInfo, RecipientInfos,
};
use der::asn1::{ObjectIdentifier, OctetString, SetOfVec};
use der::{Any, Decode as _, Encode as _};
use rand::RngCore as _;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use spki::AlgorithmIdentifierOwned;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_parser::prelude::*;

use crate::CryptoError;

const ID_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");
const ID_ENVELOPED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.3");
const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const DES_EDE3_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.3.7");
const AES_128_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.2");
const AES_256_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42");

const MESSAGE_BEGIN: &str = "-----BEGIN MESSAGE-----";
const MESSAGE_END: &str = "-----END MESSAGE-----";

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Decrypt the Apple-provided token bundle and return the token JSON bytes.
///
/// `envelope` is the uploaded file as-is: either the raw BER/DER CMS
/// structure or the full S/MIME entity wrapping it. `cert_der` and `key`
/// are the staged token-exchange certificate and private key.
pub fn decrypt_token_json(
    envelope: &[u8],
    cert_der: &[u8],
    key: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let der_bytes = match ContentInfo::from_der(envelope) {
        Ok(_) => envelope.to_vec(),
        Err(_) => unwrap_smime(envelope)?,
    };

    let content_info = ContentInfo::from_der(&der_bytes)?;
    if content_info.content_type != ID_ENVELOPED_DATA {
        return Err(CryptoError::UnsupportedContentType(
            content_info.content_type.to_string(),
        ));
    }
    let enveloped: EnvelopedData = content_info.content.decode_as()?;

    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| CryptoError::X509(e.to_string()))?;

    let cek = decrypt_content_key(&enveloped, &cert, key)?;

    let enc_content = &enveloped.encrypted_content;
    let ciphertext = enc_content
        .encrypted_content
        .as_ref()
        .ok_or(CryptoError::MissingContent)?
        .as_bytes();
    let iv = enc_content
        .content_enc_alg
        .parameters
        .as_ref()
        .ok_or(CryptoError::MissingContent)?
        .decode_as::<OctetString>()?;

    let plaintext = decrypt_content(
        &enc_content.content_enc_alg.oid,
        &cek,
        iv.as_bytes(),
        ciphertext,
    )?;

    Ok(unwrap_token_json(&plaintext))
}

/// Build a CMS enveloped-data message carrying `plaintext`, addressed to
/// `cert_der` (AES-256-CBC content, RSA key transport). This is what the
/// portal does to the token JSON; useful against simulators and in tests.
pub fn encrypt_token_json(plaintext: &[u8], cert_der: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| CryptoError::X509(e.to_string()))?;

    let mut cek = [0u8; 32];
    let mut iv = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut cek);
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new_from_slices(&cek, &iv)
        .map_err(|e| CryptoError::ContentDecrypt(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let public_key =
        RsaPublicKey::from_public_key_der(cert.tbs_certificate.subject_pki.raw)
            .map_err(|e| CryptoError::X509(e.to_string()))?;
    let enc_key = public_key.encrypt(&mut rand::rngs::OsRng, Pkcs1v15Encrypt, &cek)?;

    let rid = RecipientIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
        issuer: Name::from_der(cert.tbs_certificate.issuer.as_raw())?,
        serial_number: SerialNumber::new(cert.raw_serial())?,
    });
    let ktri = KeyTransRecipientInfo {
        version: CmsVersion::V0,
        rid,
        key_enc_alg: AlgorithmIdentifierOwned {
            oid: RSA_ENCRYPTION,
            parameters: Some(Any::null()),
        },
        enc_key: OctetString::new(enc_key)?,
    };

    let recip_infos = SetOfVec::try_from(vec![RecipientInfo::Ktri(ktri)])?;

    let enveloped = EnvelopedData {
        version: CmsVersion::V0,
        originator_info: None,
        recip_infos: RecipientInfos(recip_infos),
        encrypted_content: EncryptedContentInfo {
            content_type: ID_DATA,
            content_enc_alg: AlgorithmIdentifierOwned {
                oid: AES_256_CBC,
                parameters: Some(Any::encode_from(&OctetString::new(iv.to_vec())?)?),
            },
            encrypted_content: Some(OctetString::new(ciphertext)?),
        },
        unprotected_attrs: None,
    };

    let content_info = ContentInfo {
        content_type: ID_ENVELOPED_DATA,
        content: Any::encode_from(&enveloped)?,
    };
    Ok(content_info.to_der()?)
}

/// Find the recipient info matching the staged certificate by issuer and
/// serial number and recover the content-encryption key with our private
/// key.
fn decrypt_content_key(
    enveloped: &EnvelopedData,
    cert: &X509Certificate<'_>,
    key: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let issuer_der = cert.tbs_certificate.issuer.as_raw();
    let serial = cert.raw_serial();

    for info in enveloped.recip_infos.0.iter() {
        let RecipientInfo::Ktri(ktri) = info else {
            continue;
        };
        let RecipientIdentifier::IssuerAndSerialNumber(isn) = &ktri.rid else {
            continue;
        };
        if isn.issuer.to_der()? != issuer_der || isn.serial_number.as_bytes() != serial {
            continue;
        }
        if ktri.key_enc_alg.oid != RSA_ENCRYPTION {
            return Err(CryptoError::UnsupportedKeyAlgorithm(
                ktri.key_enc_alg.oid.to_string(),
            ));
        }
        return Ok(key.decrypt(Pkcs1v15Encrypt, ktri.enc_key.as_bytes())?);
    }

    Err(CryptoError::RecipientMismatch)
}

fn decrypt_content(
    alg: &ObjectIdentifier,
    cek: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let bad_key = |_| CryptoError::ContentDecrypt("invalid key or IV length".into());
    let bad_pad = |_| CryptoError::ContentDecrypt("bad padding".into());
    match *alg {
        AES_128_CBC => Aes128CbcDec::new_from_slices(cek, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
        AES_256_CBC => Aes256CbcDec::new_from_slices(cek, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
        DES_EDE3_CBC => TdesCbcDec::new_from_slices(cek, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
        _ => Err(CryptoError::UnsupportedContentAlgorithm(alg.to_string())),
    }
}

/// Extract the base64 payload of an S/MIME entity: everything after the
/// header block, decoded.
fn unwrap_smime(body: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let text = std::str::from_utf8(body).map_err(|_| CryptoError::Smime)?;
    let payload = match text.split_once("\r\n\r\n").or_else(|| text.split_once("\n\n")) {
        Some((_, rest)) => rest,
        // no header block at all; maybe it's bare base64
        None => text,
    };
    let b64: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|_| CryptoError::Smime)
}

/// Extract the token JSON from the decrypted plaintext. Apple wraps the
/// JSON document in MIME headers and BEGIN/END MESSAGE armor lines.
fn unwrap_token_json(plaintext: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(plaintext);
    if let Some((_, rest)) = text.split_once(MESSAGE_BEGIN) {
        if let Some((inner, _)) = rest.split_once(MESSAGE_END) {
            return inner.trim().as_bytes().to_vec();
        }
    }
    text.trim().as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pki;

    const TOKEN_JSON: &str = concat!(
        r#"{"consumer_key":"CK_9af2f5","consumer_secret":"CS_6ad30c","#,
        r#""access_token":"AT_O8477667","access_secret":"AS_meO14Cd","#,
        r#""access_token_expiry":"2024-12-11T00:00:00Z"}"#
    );

    fn armored_plaintext() -> Vec<u8> {
        format!(
            "Content-Type: text/plain;charset=UTF-8\r\n\
             Content-Transfer-Encoding: 7bit\r\n\r\n\
             {MESSAGE_BEGIN}\r\n{TOKEN_JSON}\r\n{MESSAGE_END}\r\n"
        )
        .into_bytes()
    }

    #[test]
    fn decrypts_raw_der_envelope() {
        let (key, cert_der) = test_pki();
        let envelope = encrypt_token_json(&armored_plaintext(), cert_der).unwrap();

        let json = decrypt_token_json(&envelope, cert_der, key).unwrap();
        assert_eq!(json, TOKEN_JSON.as_bytes());
        // and the payload parses
        let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(v["consumer_key"], "CK_9af2f5");
    }

    #[test]
    fn decrypts_smime_wrapped_envelope() {
        let (key, cert_der) = test_pki();
        let envelope = encrypt_token_json(&armored_plaintext(), cert_der).unwrap();

        let b64 = base64::engine::general_purpose::STANDARD.encode(&envelope);
        let mut smime = String::from(
            "Content-Type: application/pkcs7-mime; name=\"smime.p7m\"; smime-type=enveloped-data\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"smime.p7m\"\r\n\r\n",
        );
        for chunk in b64.as_bytes().chunks(64) {
            smime.push_str(std::str::from_utf8(chunk).unwrap());
            smime.push_str("\r\n");
        }

        let json = decrypt_token_json(smime.as_bytes(), cert_der, key).unwrap();
        assert_eq!(json, TOKEN_JSON.as_bytes());
    }

    #[test]
    fn unarmored_plaintext_passes_through() {
        let (key, cert_der) = test_pki();
        let envelope = encrypt_token_json(TOKEN_JSON.as_bytes(), cert_der).unwrap();
        let json = decrypt_token_json(&envelope, cert_der, key).unwrap();
        assert_eq!(json, TOKEN_JSON.as_bytes());
    }

    #[test]
    fn recipient_mismatch_is_detected() {
        let (key, cert_der) = test_pki();

        // a certificate with a different issuer/serial: not our recipient
        let (_, other_cert) = crate::self_signed_rsa_keypair("someone-else", 1).unwrap();
        let envelope = encrypt_token_json(&armored_plaintext(), &other_cert).unwrap();
        assert!(matches!(
            decrypt_token_json(&envelope, cert_der, key),
            Err(CryptoError::RecipientMismatch)
        ));
    }

    #[test]
    fn garbage_body_is_rejected() {
        let (key, cert_der) = test_pki();
        assert!(decrypt_token_json(b"\x00\x01\x02 not an envelope", cert_der, key).is_err());
        assert!(decrypt_token_json(b"", cert_der, key).is_err());
    }
}
