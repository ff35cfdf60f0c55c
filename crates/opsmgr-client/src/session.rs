//! Shared session state.

use tokio::sync::{Mutex, MutexGuard};

use opsmgr_core::SessionTokens;

/// The single mutex-guarded holder of the current session tokens.
///
/// Populated by the first credential exchange before the client is
/// usable, replaced wholesale on re-authentication, never partially
/// mutated. Readers snapshot under the lock and release before any
/// network I/O; only the refresh path in the transport holds the lock
/// longer (see `AuthTransport::send`).
pub(crate) struct SessionState {
    tokens: Mutex<SessionTokens>,
}

impl SessionState {
    pub fn new(tokens: SessionTokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }

    /// Clone the current tokens, releasing the lock immediately.
    pub async fn snapshot(&self) -> SessionTokens {
        self.tokens.lock().await.clone()
    }

    /// Take the lock for the compare-and-refresh path.
    pub async fn lock(&self) -> MutexGuard<'_, SessionTokens> {
        self.tokens.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_returns_current_tokens() {
        let state = SessionState::new(SessionTokens::new("s1", "c1", "a1"));
        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.session_id(), "s1");

        {
            let mut guard = state.lock().await;
            *guard = SessionTokens::new("s2", "c2", "a2");
        }
        assert_eq!(state.snapshot().await.session_id(), "s2");
        // the earlier snapshot is unaffected by the swap
        assert_eq!(snapshot.session_id(), "s1");
    }
}
