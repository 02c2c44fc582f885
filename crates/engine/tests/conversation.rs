//! End-to-end conversation scenarios

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use giftwise_config::{AffiliateConfig, EngineSettings, StepId};
use giftwise_core::{BudgetTier, MessageRole, Persona, Product};
use giftwise_engine::{ChatEngine, EngineConfig, EngineState, InMemorySessionStore, SessionStore};
use giftwise_recommend::{
    fallback_products, AffiliateLinks, CatalogRecommender, RecommendError, Recommender,
};

fn engine_config() -> EngineConfig {
    EngineConfig {
        settings: EngineSettings::instant(),
        ..Default::default()
    }
}

fn affiliate() -> Arc<AffiliateLinks> {
    Arc::new(AffiliateLinks::new(AffiliateConfig {
        telemetry_disabled: true,
        ..Default::default()
    }))
}

fn engine_with(recommender: Arc<dyn Recommender>) -> ChatEngine {
    ChatEngine::new(engine_config(), recommender, affiliate()).unwrap()
}

fn engine() -> ChatEngine {
    engine_with(Arc::new(CatalogRecommender::instant()))
}

async fn drive(engine: &ChatEngine, choices: &[&str]) {
    for choice in choices {
        engine.select_choice(choice).await;
    }
}

/// Always fails, like a recommendation backend that is down
struct FailingRecommender;

#[async_trait]
impl Recommender for FailingRecommender {
    async fn recommend(
        &self,
        _interests: &[String],
        _budget: Option<BudgetTier>,
    ) -> Result<Vec<Product>, RecommendError> {
        Err(RecommendError::Fetch("backend unavailable".to_string()))
    }
}

/// Responds after a delay, to race against reset
struct SlowRecommender;

#[async_trait]
impl Recommender for SlowRecommender {
    async fn recommend(
        &self,
        _interests: &[String],
        _budget: Option<BudgetTier>,
    ) -> Result<Vec<Product>, RecommendError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(fallback_products())
    }
}

#[tokio::test]
async fn urgent_path_resolves_to_last_minute_suggestions() {
    let engine = engine();

    drive(
        &engine,
        &[
            "time_urgent", // welcome
            "friend",      // recipient
            "birthday",    // occasion
            "regular",     // milestone
            "practical",   // gift preference
            "tech",        // interests
            "skip",        // detail question
            "budget_low",  // budget, targets suggestions
        ],
    )
    .await;

    // Urgency outranks the practical signal
    assert_eq!(engine.persona().0, Persona::LastMinute);

    let transcript = engine.transcript();
    let suggestions = &transcript[transcript.len() - 2];
    assert_eq!(suggestions.role, MessageRole::Assistant);
    assert!(suggestions.text.contains("quick delivery"));
    assert!(!suggestions.products.is_empty());

    // The follow-up question arrives automatically with its two choices
    let follow_up = transcript.last().unwrap();
    assert_eq!(follow_up.role, MessageRole::Assistant);
    assert_eq!(follow_up.choices.len(), 2);
    assert_eq!(
        engine.state(),
        EngineState::AwaitingChoice(StepId::FinalQuestion)
    );
}

#[tokio::test]
async fn failed_fetch_degrades_to_fallback_products() {
    let engine = engine_with(Arc::new(FailingRecommender));

    drive(
        &engine,
        &[
            "time_urgent",
            "friend",
            "just_because",
            "practical",
            "tech",
            "skip",
            "budget_low",
        ],
    )
    .await;

    let transcript = engine.transcript();
    let suggestions = &transcript[transcript.len() - 2];
    assert_eq!(suggestions.products, fallback_products());

    // The turn completed and the engine accepts input again
    assert_eq!(
        engine.state(),
        EngineState::AwaitingChoice(StepId::FinalQuestion)
    );
    engine.select_choice("no").await;
    assert_eq!(engine.state(), EngineState::Done);
    assert!(engine
        .transcript()
        .last()
        .unwrap()
        .text
        .contains("perfect gift"));
}

#[tokio::test]
async fn rapid_repeated_clicks_process_once() {
    let engine = engine();

    tokio::join!(
        engine.select_choice("time_urgent"),
        engine.select_choice("time_urgent"),
    );

    // welcome + one user message + one bot message
    assert_eq!(engine.transcript().len(), 3);
    assert_eq!(engine.answers().len(), 1);
}

#[tokio::test]
async fn memory_detour_acknowledges_and_advances() {
    let engine = engine();

    drive(
        &engine,
        &[
            "time_planning",
            "partner",
            "anniversary",
            "significant",
            "very_close",
            "memory_yes",
            "memory_described", // describe_memory, switches to free text
        ],
    )
    .await;
    assert_eq!(
        engine.state(),
        EngineState::AwaitingFreeText {
            origin: StepId::DescribeMemory
        }
    );

    // Empty input is ignored outright
    engine.submit_text("   ").await;
    assert_eq!(
        engine.state(),
        EngineState::AwaitingFreeText {
            origin: StepId::DescribeMemory
        }
    );

    let before = engine.transcript().len();
    engine
        .submit_text("Our trip to the coast means a lot to both of us")
        .await;

    let transcript = engine.transcript();
    assert_eq!(transcript.len(), before + 3);
    assert_eq!(transcript[before].role, MessageRole::User);
    assert_eq!(transcript[before + 1].role, MessageRole::Assistant);
    // The scripted detour resumes one step further along
    assert!(transcript[before + 2].has_choices());
    assert_eq!(
        engine.state(),
        EngineState::AwaitingChoice(StepId::GiftPreference)
    );
}

#[tokio::test]
async fn final_question_detour_returns_to_final_question() {
    let engine = engine();

    drive(
        &engine,
        &[
            "time_soon",
            "client",
            "other_occasion",
            "practical",
            "tech",
            "skip",
            "budget_high",
        ],
    )
    .await;
    assert_eq!(
        engine.state(),
        EngineState::AwaitingChoice(StepId::FinalQuestion)
    );

    engine.select_choice("yes").await;
    assert_eq!(
        engine.state(),
        EngineState::AwaitingFreeText {
            origin: StepId::FinalQuestion
        }
    );

    engine
        .submit_text("It is for an important business partner")
        .await;
    assert_eq!(
        engine.state(),
        EngineState::AwaitingChoice(StepId::FinalQuestion)
    );

    engine.select_choice("no").await;
    assert_eq!(engine.state(), EngineState::Done);
}

#[tokio::test]
async fn reset_is_idempotent() {
    let engine = engine();

    drive(&engine, &["time_urgent", "colleague", "holiday"]).await;
    assert!(engine.persona().0.is_known());

    engine.reset().await;
    let after_once = (
        engine.transcript().len(),
        engine.answers().len(),
        engine.persona(),
        engine.state(),
        engine.metrics().snapshot(),
    );

    engine.reset().await;
    let after_twice = (
        engine.transcript().len(),
        engine.answers().len(),
        engine.persona(),
        engine.state(),
        engine.metrics().snapshot(),
    );

    assert_eq!(after_once, after_twice);
    assert_eq!(after_once.0, 1);
    assert_eq!(after_once.1, 0);
    assert_eq!(after_once.2 .0, Persona::Unknown);
    assert_eq!(after_once.3, EngineState::AwaitingChoice(StepId::Welcome));
    assert_eq!(after_once.4.message_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_discards_in_flight_suggestions() {
    let engine = Arc::new(engine_with(Arc::new(SlowRecommender)));

    drive(
        &engine,
        &[
            "time_urgent",
            "friend",
            "just_because",
            "practical",
            "tech",
            "skip",
        ],
    )
    .await;
    assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Budget));

    let turn = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.select_choice("budget_low").await })
    };

    // Let the turn reach the slow fetch, then pull the rug
    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.reset().await;
    turn.await.unwrap();

    // The stale suggestion message never landed
    assert_eq!(engine.transcript().len(), 1);
    assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Welcome));
    assert_eq!(engine.metrics().snapshot().message_count, 0);

    // And the fresh conversation accepts input
    engine.select_choice("time_soon").await;
    assert_eq!(engine.transcript().len(), 3);
}

#[tokio::test]
async fn turns_are_persisted_and_reset_recreates_storage() {
    let store = Arc::new(InMemorySessionStore::new());
    let engine = ChatEngine::new(
        engine_config(),
        Arc::new(CatalogRecommender::instant()),
        affiliate(),
    )
    .unwrap()
    .with_store(store.clone());

    engine.select_choice("time_urgent").await;

    let stored = store
        .load(engine.conversation_id())
        .await
        .unwrap()
        .expect("conversation saved after the turn");
    assert_eq!(stored.messages.len(), 3);
    assert_eq!(stored.title, "As soon as possible (days)");

    engine.reset().await;

    let stored = store
        .load(engine.conversation_id())
        .await
        .unwrap()
        .expect("reset recreates the stored record");
    assert_eq!(stored.messages.len(), 1);
    assert!(stored.answers.is_empty());
}
