//! Identity verification hook.
//!
//! Plaza doesn't implement credential validation itself — token issuance
//! and verification belong to the surrounding account system (JWT, session
//! cookies, an auth provider). The core only needs one answer during the
//! join handshake: "who is this token?".
//!
//! That question is the [`Authenticator`] trait. Implement it with real
//! JWT validation in production, and with a trivial stub in tests and
//! demos, without changing any handler code.

use plaza_protocol::UserId;

use crate::SessionError;

/// Validates an opaque credential and yields a stable user identity.
///
/// `Send + Sync + 'static` because the verifier is shared across all
/// connection tasks for the lifetime of the server.
///
/// The handler calls this exactly once per session, under a bounded
/// timeout; a failure (or timeout) terminates the connection with no
/// error frame — the close itself is the signal.
///
/// # Example
///
/// ```rust
/// use plaza_session::{Authenticator, SessionError};
/// use plaza_protocol::UserId;
///
/// /// Accepts any non-empty token and uses it as the user ID.
/// /// Development only — never deploy this.
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn verify(&self, token: &str) -> Result<UserId, SessionError> {
///         if token.is_empty() {
///             return Err(SessionError::InvalidCredential(
///                 "empty token".into(),
///             ));
///         }
///         Ok(UserId::from(token))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `token` and returns the user it identifies.
    ///
    /// # Errors
    /// - [`SessionError::InvalidCredential`] — expired, malformed, or
    ///   forged token.
    /// - [`SessionError::VerifierUnavailable`] — the backing verifier
    ///   could not be reached; treated the same as a rejection.
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<UserId, SessionError>> + Send;
}
