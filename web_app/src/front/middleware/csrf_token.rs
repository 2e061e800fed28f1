use base64::{Engine, prelude::BASE64_STANDARD};
use csrf::{AesGcmCsrfProtection, CsrfProtection};

use crate::{consts, front::errors};

/// Token pair kept in the session. The token half is also rendered in the
/// forms as `csrfmiddlewaretoken`.
#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct CsrfToken {
    pub token_base64: String,
    pub cookie_base64: String,
}

impl CsrfToken {
    pub fn generate(csrf_protec: &AesGcmCsrfProtection) -> anyhow::Result<Self> {
        let (token, cookie) = csrf_protec
            .generate_token_pair(None, consts::MAX_AGE_COOKIES)
            .map_err(|e| anyhow::anyhow!("csrf token pair couldnt be generated: {e}"))?;

        Ok(Self {
            token_base64: token.b64_string(),
            cookie_base64: cookie.b64_string(),
        })
    }

    /// Checks `token_base64` against the cookie half of this pair
    pub fn accepts(&self, csrf_protec: &AesGcmCsrfProtection, token_base64: &str) -> bool {
        let token = BASE64_STANDARD
            .decode(token_base64.as_bytes())
            .map(|token| csrf_protec.parse_token(&token));
        let cookie = BASE64_STANDARD
            .decode(self.cookie_base64.as_bytes())
            .map(|cookie| csrf_protec.parse_cookie(&cookie));

        if let (Ok(Ok(token)), Ok(Ok(cookie))) = (token, cookie) {
            return csrf_protec.verify_token_pair(&token, &cookie).is_ok();
        }

        false
    }
}

fn stored_token(session: &ntex_session::Session) -> Option<CsrfToken> {
    session
        .get::<String>(consts::CSRF_TOKEN_COOKIE_NAME)
        .ok()
        .flatten()
        .and_then(|csrf| serde_json::from_str::<CsrfToken>(&csrf).ok())
}

/// Token to render in a form. The pair already in the session is reused
/// while it is still valid so several open tabs keep working.
pub fn issue_token(
    session: &ntex_session::Session,
    csrf_protec: &AesGcmCsrfProtection,
) -> Result<String, errors::ServerError> {
    if let Some(csrf) = stored_token(session) {
        if csrf.accepts(csrf_protec, &csrf.token_base64) {
            return Ok(csrf.token_base64);
        }
    }

    let csrf = CsrfToken::generate(csrf_protec)
        .map_err(|e| errors::ServerError::InternalServerError(e.to_string()))?;

    let serialized = serde_json::to_string(&csrf)
        .map_err(|e| errors::ServerError::InternalServerError(e.to_string()))?;

    session
        .set(consts::CSRF_TOKEN_COOKIE_NAME, serialized)
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "csrf token couldnt be stored in the session: {e}"
            ))
        })?;

    Ok(csrf.token_base64)
}

/// Fails with [InvalidCsrfToken](errors::ServerError::InvalidCsrfToken)
/// unless `form_token` belongs to the pair stored in the session
pub fn verify_form_token(
    session: &ntex_session::Session,
    csrf_protec: &AesGcmCsrfProtection,
    form_token: &str,
) -> Result<(), errors::ServerError> {
    match stored_token(session) {
        Some(csrf) if csrf.accepts(csrf_protec, form_token) => Ok(()),
        _ => Err(errors::ServerError::InvalidCsrfToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protection(seed: u8) -> AesGcmCsrfProtection {
        AesGcmCsrfProtection::from_key([seed; 32])
    }

    #[test]
    fn test_generated_pair_accepts_its_token() {
        let csrf_protec = protection(7);
        let csrf = CsrfToken::generate(&csrf_protec).unwrap();

        assert!(csrf.accepts(&csrf_protec, &csrf.token_base64));
    }

    #[test]
    fn test_token_of_another_pair_is_rejected() {
        let csrf_protec = protection(7);
        let csrf = CsrfToken::generate(&csrf_protec).unwrap();
        let other = CsrfToken::generate(&csrf_protec).unwrap();

        assert!(!csrf.accepts(&csrf_protec, &other.token_base64));
    }

    #[test]
    fn test_token_from_another_key_is_rejected() {
        let csrf = CsrfToken::generate(&protection(7)).unwrap();

        assert!(!csrf.accepts(&protection(8), &csrf.token_base64));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let csrf_protec = protection(7);
        let csrf = CsrfToken::generate(&csrf_protec).unwrap();

        assert!(!csrf.accepts(&csrf_protec, "not base64 !"));
        assert!(!csrf.accepts(&csrf_protec, ""));
        assert!(!CsrfToken::default().accepts(&csrf_protec, &csrf.token_base64));
    }
}
