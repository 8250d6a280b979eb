use plaza::prelude::*;
use tracing::info;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Treats the bearer token itself as the user id. Fine for a demo;
/// a real deployment verifies the token against an identity service.
struct TokenIsUser;

impl Authenticator for TokenIsUser {
    async fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        if token.is_empty() {
            return Err(SessionError::InvalidCredential(
                "empty token".into(),
            ));
        }
        Ok(UserId::from(token))
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkabout=info,plaza=info".into()),
        )
        .init();

    let directory = MemorySpaceDirectory::new()
        .with_space("lobby", 50, 50)
        .with_space("garden", 200, 120);

    let server = PlazaServerBuilder::new()
        .bind("0.0.0.0:8080")
        .build(TokenIsUser, directory)
        .await?;

    info!(addr = %server.local_addr()?, "walkabout listening");
    server.run().await?;
    Ok(())
}
