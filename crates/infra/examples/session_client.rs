//! Example: calling the VoiceDash backend through the authenticated client
//!
//! Loads configuration (`VOICEDASH_*` variables or a config file), restores
//! a persisted session if one exists, and fetches a path.
//!
//! ```bash
//! export VOICEDASH_API_BASE_URL=http://localhost:8000
//! export VOICEDASH_SESSION_FILE=/tmp/voicedash/session.json
//! cargo run -p voicedash-infra --example session_client -- /assistants
//! ```
//!
//! Set `VOICEDASH_EMAIL` and `VOICEDASH_PASSWORD` to sign in when no
//! session is persisted.

use std::sync::Arc;

use voicedash_common::{BroadcastSessionTerminator, SessionEvent, SessionStore};
use voicedash_infra::api::{AuthService, AuthenticatedHttpClient};
use voicedash_infra::{config, observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load()?;
    observability::init_logging(&config.logging)?;

    let store = Arc::new(match config.auth.session_file.as_deref() {
        Some(path) => SessionStore::persistent(path),
        None => SessionStore::in_memory(),
    });
    let terminator = Arc::new(BroadcastSessionTerminator::default());
    let mut events = terminator.subscribe();

    let client =
        Arc::new(AuthenticatedHttpClient::from_config(&config, store.clone(), terminator)?);
    let auth = AuthService::new(Arc::clone(&client), store);

    if !auth.hydrate().await {
        if let (Ok(email), Ok(password)) =
            (std::env::var("VOICEDASH_EMAIL"), std::env::var("VOICEDASH_PASSWORD"))
        {
            auth.login(&email, &password).await?;
        }
    }

    tokio::spawn(async move {
        while let Ok(SessionEvent::Terminated { redirect_to }) = events.recv().await {
            tracing::warn!(%redirect_to, "Session ended, sign in again");
        }
    });

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let response = client.get(&path).await?;
    tracing::info!(status = %response.status(), bytes = response.body().len(), "Request finished");
    println!("{}", response.text());

    Ok(())
}
