//! Session-gated gallery state.
//!
//! [`Gallery`] owns the one piece of mutable state the system has: the
//! current [`LoadState`]. Runs are triggered by signing in or refreshing and
//! are gated on a session being present; without one nothing is fetched.
//!
//! ## Generations
//!
//! Every run start and every sign-out bumps a generation counter. A finished
//! run publishes its result only if the generation it started under is still
//! current, and a run in flight is abandoned (its requests dropped) as soon as
//! the generation moves on. The published result replaces the previous one
//! wholesale.
//!
//! The store handed to [`Gallery::sign_in`] and [`Gallery::refresh`] must
//! already read on behalf of the session (see
//! [`RestStore::for_session`](crate::store::RestStore::for_session)).

use crate::config::GalleryConfig;
use crate::pipeline::{self, PipelineOutput};
use crate::session::Session;
use crate::store::TableSource;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{error, info};

/// User-visible message for a failed load.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load images and captions.";

#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    SignedOut,
    Loading,
    Ready(Arc<PipelineOutput>),
    Failed(String),
}

pub struct Gallery {
    generation: watch::Sender<u64>,
    session: Mutex<Option<Session>>,
    state: Mutex<LoadState>,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Gallery {
    pub fn new() -> Self {
        Self {
            generation: watch::Sender::new(0),
            session: Mutex::new(None),
            state: Mutex::new(LoadState::SignedOut),
        }
    }

    pub fn state(&self) -> LoadState {
        self.lock_state().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Record `session` and load the gallery for it.
    ///
    /// Returns whether this run's result was published.
    pub async fn sign_in<S: TableSource>(
        &self,
        source: &S,
        config: &GalleryConfig,
        session: Session,
    ) -> bool {
        info!(user = %session.user.id, "Session started");
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
        self.refresh(source, config).await
    }

    /// Clear the session and any loaded gallery. Runs in flight are abandoned.
    pub fn sign_out(&self) {
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        let mut state = self.lock_state();
        self.generation.send_modify(|g| *g += 1);
        *state = LoadState::SignedOut;
        info!("Session ended");
    }

    /// Run the pipeline for the current session.
    ///
    /// Without a session this fetches nothing and returns `false`. Returns
    /// `true` only when this run's result (items or failure) was published.
    pub async fn refresh<S: TableSource>(&self, source: &S, config: &GalleryConfig) -> bool {
        let generation = {
            let mut state = self.lock_state();
            // Checked under the state lock so a concurrent sign-out cannot
            // land between the check and the generation bump.
            if self.session().is_none() {
                *state = LoadState::SignedOut;
                return false;
            }
            self.generation.send_modify(|g| *g += 1);
            *state = LoadState::Loading;
            self.generation()
        };
        let mut changes = self.generation.subscribe();

        let result = tokio::select! {
            result = pipeline::run(source, config) => result,
            _ = superseded(&mut changes, generation) => {
                info!(generation, "Run superseded, abandoning");
                return false;
            }
        };
        self.publish(generation, result)
    }

    fn publish(
        &self,
        generation: u64,
        result: Result<PipelineOutput, crate::store::RemoteReadError>,
    ) -> bool {
        let mut state = self.lock_state();
        if self.generation() != generation {
            info!(generation, "Discarding stale gallery result");
            return false;
        }
        *state = match result {
            Ok(output) => LoadState::Ready(Arc::new(output)),
            Err(e) => {
                error!("Error fetching gallery data: {e}");
                LoadState::Failed(LOAD_FAILED_MESSAGE.to_string())
            }
        };
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolves once the generation differs from `generation`.
async fn superseded(changes: &mut watch::Receiver<u64>, generation: u64) {
    while changes.changed().await.is_ok() {
        if *changes.borrow_and_update() != generation {
            return;
        }
    }
    // Sender gone: the gallery itself was dropped, nothing can supersede us.
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;
    use crate::test_helpers::*;
    use std::time::Duration;

    fn session() -> Session {
        Session {
            access_token: "jwt".to_string(),
            user: User {
                id: "u-1".to_string(),
                email: None,
            },
        }
    }

    fn store() -> MockStore {
        MockStore::new()
            .with_table("images", image_rows(4))
            .with_table(
                "captions",
                caption_rows(&[("x", Some(1)), ("y", Some(1)), ("z", Some(3))]),
            )
    }

    fn ready_items(gallery: &Gallery) -> usize {
        match gallery.state() {
            LoadState::Ready(out) => out.items.len(),
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn starts_signed_out() {
        let gallery = Gallery::new();
        assert!(matches!(gallery.state(), LoadState::SignedOut));
        assert!(gallery.session().is_none());
    }

    #[tokio::test]
    async fn refresh_without_session_fetches_nothing() {
        let gallery = Gallery::new();
        let store = store();

        assert!(!gallery.refresh(&store, &GalleryConfig::default()).await);
        assert_eq!(store.request_count(), 0);
        assert!(matches!(gallery.state(), LoadState::SignedOut));
    }

    #[tokio::test]
    async fn sign_in_loads_gallery() {
        let gallery = Gallery::new();
        let store = store();

        assert!(
            gallery
                .sign_in(&store, &GalleryConfig::default(), session())
                .await
        );
        assert_eq!(ready_items(&gallery), 5);
        assert_eq!(gallery.session().unwrap().user.id, "u-1");
    }

    #[tokio::test]
    async fn read_failure_publishes_failed_state() {
        let gallery = Gallery::new();
        let store = store().fail_at("images", 0);

        assert!(
            gallery
                .sign_in(&store, &GalleryConfig::default(), session())
                .await
        );
        match gallery.state() {
            LoadState::Failed(message) => assert_eq!(message, LOAD_FAILED_MESSAGE),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_previous_result() {
        let gallery = Gallery::new();
        let config = GalleryConfig::default();
        gallery.sign_in(&store(), &config, session()).await;
        assert_eq!(ready_items(&gallery), 5);

        let bigger = MockStore::new().with_table("images", image_rows(9));
        assert!(gallery.refresh(&bigger, &config).await);
        assert_eq!(ready_items(&gallery), 9);
    }

    #[tokio::test]
    async fn sign_out_clears_state() {
        let gallery = Gallery::new();
        gallery
            .sign_in(&store(), &GalleryConfig::default(), session())
            .await;
        gallery.sign_out();

        assert!(matches!(gallery.state(), LoadState::SignedOut));
        assert!(gallery.session().is_none());
    }

    #[tokio::test]
    async fn sign_out_mid_fetch_abandons_run() {
        let gallery = Gallery::new();
        let slow = store().with_delay(Duration::from_millis(200));
        let config = GalleryConfig::default();

        let (published, ()) = tokio::join!(gallery.sign_in(&slow, &config, session()), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            gallery.sign_out();
        });

        assert!(!published);
        assert!(matches!(gallery.state(), LoadState::SignedOut));
    }

    #[tokio::test]
    async fn newer_run_wins_over_older_one() {
        let gallery = Gallery::new();
        let config = GalleryConfig::default();
        *gallery.session.lock().unwrap() = Some(session());

        let slow = MockStore::new()
            .with_table("images", image_rows(2))
            .with_delay(Duration::from_millis(200));
        let fast = MockStore::new().with_table("images", image_rows(7));

        let (first, second) = tokio::join!(gallery.refresh(&slow, &config), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            gallery.refresh(&fast, &config).await
        });

        assert!(!first);
        assert!(second);
        assert_eq!(ready_items(&gallery), 7);
    }

    #[test]
    fn sign_out_racing_refresh_start_is_not_overwritten() {
        let gallery = Arc::new(Gallery::new());
        *gallery.session.lock().unwrap() = Some(session());

        // Hold the state lock so the refresh blocks on it, then sign out
        // underneath it before releasing.
        let mut state = gallery.lock_state();
        let handle = {
            let gallery = Arc::clone(&gallery);
            std::thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(gallery.refresh(&store(), &GalleryConfig::default()))
            })
        };
        std::thread::sleep(Duration::from_millis(50));
        *gallery.session.lock().unwrap() = None;
        gallery.generation.send_modify(|g| *g += 1);
        *state = LoadState::SignedOut;
        drop(state);

        assert!(!handle.join().unwrap());
        assert!(gallery.session().is_none());
        assert!(matches!(gallery.state(), LoadState::SignedOut));
    }

    #[test]
    fn stale_result_is_not_published() {
        let gallery = Gallery::new();
        gallery.generation.send_modify(|g| *g = 5);

        let published = gallery.publish(4, Ok(PipelineOutput::default()));
        assert!(!published);
        assert!(matches!(gallery.state(), LoadState::SignedOut));

        assert!(gallery.publish(5, Ok(PipelineOutput::default())));
        assert!(matches!(gallery.state(), LoadState::Ready(_)));
    }
}
