use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;

use crate::errors::AppResult;
use crate::storage::TokenStore;

/// Process-wide authentication presence signal: a capability query backed by
/// the persisted token slot, plus a login/logout broadcast that other UI
/// components subscribe to.
///
/// `is_authenticated` re-reads the store on every call. Decision points in the
/// session engine must not cache the answer across transitions.
pub struct AuthPresence {
    tokens: Arc<dyn TokenStore>,
    changed: watch::Sender<bool>,
}

impl AuthPresence {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let initial = tokens.access_token().ok().flatten().is_some();
        let (changed, _) = watch::channel(initial);
        Self { tokens, changed }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().ok().flatten().is_some()
    }

    pub fn access_token(&self) -> AppResult<Option<SecretString>> {
        self.tokens.access_token()
    }

    /// Receiver that yields on every login/logout.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.changed.subscribe()
    }

    pub fn store_token(&self, token: SecretString) -> AppResult<()> {
        self.tokens.put_access_token(token)?;
        self.changed.send_replace(true);
        log::info!("User authenticated, login event published");
        Ok(())
    }

    pub fn clear_token(&self) -> AppResult<()> {
        self.tokens.clear()?;
        self.changed.send_replace(false);
        log::info!("User logged out, logout event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryTokenStore;

    #[test]
    fn presence_tracks_token_slot() {
        let presence = AuthPresence::new(Arc::new(InMemoryTokenStore::default()));

        assert!(!presence.is_authenticated());
        presence
            .store_token(SecretString::from("tok-1".to_string()))
            .unwrap();
        assert!(presence.is_authenticated());
        presence.clear_token().unwrap();
        assert!(!presence.is_authenticated());
    }

    #[tokio::test]
    async fn subscribers_observe_login_and_logout() {
        let presence = AuthPresence::new(Arc::new(InMemoryTokenStore::default()));
        let mut events = presence.subscribe();

        assert!(!*events.borrow());

        presence
            .store_token(SecretString::from("tok-1".to_string()))
            .unwrap();
        events.changed().await.expect("sender should be alive");
        assert!(*events.borrow());

        presence.clear_token().unwrap();
        events.changed().await.expect("sender should be alive");
        assert!(!*events.borrow());
    }

    #[test]
    fn presence_reflects_out_of_band_store_changes() {
        let store = Arc::new(InMemoryTokenStore::default());
        let presence = AuthPresence::new(store.clone());

        // Another component writes the token directly; the capability query
        // must pick it up because it never caches.
        store
            .put_access_token(SecretString::from("tok-2".to_string()))
            .unwrap();
        assert!(presence.is_authenticated());
    }
}
