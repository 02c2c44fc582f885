//! Session lifecycle
//!
//! A session owns one conversation engine plus its metrics ticker. Hosts
//! construct sessions explicitly when the chat surface mounts and dispose of
//! them on unmount; nothing lives at module level.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use giftwise_recommend::{AffiliateLinks, Recommender};

use crate::controller::{ChatEngine, EngineConfig};
use crate::store::SessionStore;
use crate::EngineError;

pub struct Session {
    id: Uuid,
    engine: Arc<ChatEngine>,
    created_at: DateTime<Utc>,
    ticker_shutdown: watch::Sender<bool>,
}

impl Session {
    /// Create a session and start its duration ticker. Requires a running
    /// tokio runtime.
    pub fn create(
        config: EngineConfig,
        recommender: Arc<dyn Recommender>,
        affiliate: Arc<AffiliateLinks>,
    ) -> Result<Self, EngineError> {
        let engine = Arc::new(ChatEngine::new(config, recommender, affiliate)?);
        Ok(Self::from_engine(engine))
    }

    /// Create a session that persists its conversation after each turn
    pub fn create_with_store(
        config: EngineConfig,
        recommender: Arc<dyn Recommender>,
        affiliate: Arc<AffiliateLinks>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, EngineError> {
        let engine = Arc::new(ChatEngine::new(config, recommender, affiliate)?.with_store(store));
        Ok(Self::from_engine(engine))
    }

    fn from_engine(engine: Arc<ChatEngine>) -> Self {
        let ticker_shutdown = Arc::clone(engine.metrics()).start_ticker();
        let session = Self {
            id: Uuid::new_v4(),
            engine,
            created_at: Utc::now(),
            ticker_shutdown,
        };
        tracing::info!(session_id = %session.id, "Session created");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn engine(&self) -> &Arc<ChatEngine> {
        &self.engine
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Restart the conversation in place; the session itself survives
    pub async fn reset(&self) {
        self.engine.reset().await;
    }

    /// Stop the metrics ticker and drop the session
    pub fn dispose(self) {
        let _ = self.ticker_shutdown.send(true);
        tracing::info!(session_id = %self.id, "Session disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::EngineState;
    use giftwise_config::{AffiliateConfig, EngineSettings, StepId};
    use giftwise_recommend::CatalogRecommender;

    fn session() -> Session {
        let config = EngineConfig {
            settings: EngineSettings::instant(),
            ..Default::default()
        };
        let affiliate = AffiliateLinks::new(AffiliateConfig {
            telemetry_disabled: true,
            ..Default::default()
        });
        Session::create(
            config,
            Arc::new(CatalogRecommender::instant()),
            Arc::new(affiliate),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_session_starts_at_welcome() {
        let session = session();

        assert_eq!(
            session.engine().state(),
            EngineState::AwaitingChoice(StepId::Welcome)
        );
        assert_eq!(session.engine().transcript().len(), 1);

        session.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_ticks_until_disposed() {
        let session = session();
        let metrics = Arc::clone(session.engine().metrics());

        tokio::time::advance(std::time::Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        let while_alive = metrics.snapshot().session_duration_secs;
        assert!(while_alive >= 2);

        session.dispose();
        tokio::task::yield_now().await;
        tokio::time::advance(std::time::Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(metrics.snapshot().session_duration_secs, while_alive);
    }

    #[tokio::test]
    async fn test_reset_through_session() {
        let session = session();

        session.engine().select_choice("time_soon").await;
        session.reset().await;

        assert_eq!(session.engine().transcript().len(), 1);
        assert!(session.engine().answers().is_empty());

        session.dispose();
    }
}
