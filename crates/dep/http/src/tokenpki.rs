//! Token-PKI exchange handlers: certificate generation and token-bundle
//! decryption.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use dep_core::OAuth1Tokens;
use dep_crypto::{
    certificate_from_pem, decrypt_token_json, pem_certificate, pem_rsa_private_key,
    rsa_key_from_pem, self_signed_rsa_keypair, DEFAULT_CN, DEFAULT_VALIDITY_DAYS,
};
use dep_storage::AllStorage;

use crate::{ApiError, ApiState};

#[derive(Deserialize)]
pub(crate) struct CertQuery {
    cn: Option<String>,
    validity_days: Option<i64>,
}

/// Generate a fresh keypair for the token-PKI exchange with the
/// ABM/ASM/ABE portal, store it in the staging slot, and serve the
/// PEM certificate as a download. Every call generates a new keypair.
pub(crate) async fn get_cert<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
    Query(query): Query<CertQuery>,
) -> Result<Response, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let cn = query
        .cn
        .filter(|cn| !cn.is_empty())
        .unwrap_or_else(|| DEFAULT_CN.to_string());
    let validity_days = query.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS);

    // RSA generation is CPU-bound
    let (key, cert_der) =
        tokio::task::spawn_blocking(move || self_signed_rsa_keypair(&cn, validity_days))
            .await
            .map_err(|e| ApiError::internal("generating token keypair", e))?
            .map_err(|e| ApiError::internal("generating token keypair", e))?;

    let pem_cert = pem_certificate(cert_der);
    let pem_key =
        pem_rsa_private_key(&key).map_err(|e| ApiError::internal("encoding private key", e))?;

    state
        .store
        .store_token_pki(&name, &pem_cert, &pem_key)
        .map_err(|e| ApiError::internal("storing token keypair", e))?;
    tracing::debug!(name = %name, "staged new token keypair");

    Ok((
        [
            (header::CONTENT_TYPE, "application/x-pem-file".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}.pem\""),
            ),
        ],
        pem_cert,
    )
        .into_response())
}

/// Decrypt the Apple-provided encrypted token `.p7m` file in the request
/// body with the staged keypair, promote the staged PKI, and store the
/// decrypted OAuth1 tokens.
pub(crate) async fn decrypt_token_pki<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<OAuth1Tokens>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (cert_pem, key_pem) = state
        .store
        .retrieve_staging_token_pki(&name)
        .map_err(|e| ApiError::internal("retrieving token keypair", e))?;
    let cert_der = certificate_from_pem(&cert_pem)
        .map_err(|e| ApiError::internal("decoding retrieved certificate", e))?;
    let key = rsa_key_from_pem(&key_pem)
        .map_err(|e| ApiError::internal("decoding retrieved private key", e))?;

    let token_json =
        tokio::task::spawn_blocking(move || decrypt_token_json(&body, &cert_der, &key))
            .await
            .map_err(|e| ApiError::internal("decrypting auth tokens", e))?
            .map_err(|e| ApiError::internal("decrypting auth tokens", e))?;

    let tokens: OAuth1Tokens = serde_json::from_slice(&token_json)
        .map_err(|e| ApiError::internal("decoding decrypted auth tokens", e))?;
    if !tokens.valid() {
        return Err(ApiError::bad_request("invalid tokens"));
    }

    // promote the PKI before storing the tokens: if the store fails the
    // new keypair is already current and a re-post of the same bundle
    // will succeed without regenerating the certificate
    state
        .store
        .upstage_token_pki(&name)
        .map_err(|e| ApiError::internal("upstaging token keypair", e))?;
    state
        .store
        .store_auth_tokens(&name, &tokens)
        .map_err(|e| ApiError::internal("storing auth tokens", e))?;
    tracing::debug!(name = %name, "stored decrypted auth tokens");

    Ok(Json(tokens))
}
