//! Flow controller
//!
//! `ChatEngine` walks the guided flow: it records the user's selections,
//! re-runs persona classification each turn, resolves the next step from the
//! flow table, and drives suggestions turns against the recommendation
//! collaborator. One turn runs at a time; input arriving while a turn is in
//! flight is ignored, and a reset mid-turn discards whatever the stale turn
//! produces afterwards.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::Rng;
use tokio::sync::broadcast;
use uuid::Uuid;

use giftwise_config::{
    AnswerMap, ChoiceTarget, EngineSettings, FallbackTemplates, FlowConfig, ProfileTable, StepId,
};
use giftwise_core::{BudgetTier, Confidence, Message, Persona, Product};
use giftwise_recommend::{fallback_products, AffiliateLinks, Recommender};

use crate::classifier::{FreeTextDetector, RuleClassifier};
use crate::history::{message_choices, ConversationHistory};
use crate::metrics::MetricsTracker;
use crate::store::{SessionStore, StoredConversation};
use crate::EngineError;

/// Engine configuration tables and knobs
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub flow: FlowConfig,
    pub profiles: ProfileTable,
    pub templates: FallbackTemplates,
    pub settings: EngineSettings,
}

/// Where the conversation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for a choice at this step
    AwaitingChoice(StepId),
    /// Waiting for typed text; `origin` is the step the detour started from
    AwaitingFreeText { origin: StepId },
    /// A suggestions turn is in progress
    Suggesting,
    /// The terminal step was reached
    Done,
}

/// Engine events, fanned out to any number of subscribers
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A message was appended to the transcript
    MessageAppended(Message),
    /// The simulated typing indicator switched
    Typing(bool),
    /// The classifier settled on a persona not announced before
    PersonaDetected {
        persona: Persona,
        confidence: Confidence,
    },
    /// A suggestions turn produced products
    SuggestionsReady(Vec<Product>),
    /// User-facing notice, e.g. the retry prompt after a failed fetch
    Toast(String),
    /// The conversation was reset
    Reset,
}

/// Current persona assignment for the session
#[derive(Debug, Default)]
pub struct PersonaState {
    pub persona: Persona,
    pub confidence: Confidence,
    /// Personas already announced; each is surfaced at most once
    notified: HashSet<Persona>,
}

/// The conversation engine
pub struct ChatEngine {
    config: EngineConfig,
    classifier: RuleClassifier,
    detector: FreeTextDetector,
    recommender: Arc<dyn Recommender>,
    affiliate: Arc<AffiliateLinks>,
    store: Option<Arc<dyn SessionStore>>,
    conversation_id: String,
    created_at: DateTime<Utc>,
    history: RwLock<ConversationHistory>,
    state: RwLock<EngineState>,
    persona: RwLock<PersonaState>,
    metrics: Arc<MetricsTracker>,
    event_tx: broadcast::Sender<EngineEvent>,
    /// One turn at a time; taken at turn start, released at turn end
    turn_in_flight: AtomicBool,
    /// Bumped by reset so in-flight turns can tell their output is stale
    generation: AtomicU64,
}

impl ChatEngine {
    /// Create an engine. Fails only on an invalid flow table, which a
    /// shipped configuration never has.
    pub fn new(
        config: EngineConfig,
        recommender: Arc<dyn Recommender>,
        affiliate: Arc<AffiliateLinks>,
    ) -> Result<Self, EngineError> {
        config.flow.validate()?;

        let (event_tx, _) = broadcast::channel(100);
        let classifier = RuleClassifier::new(
            config.profiles.clone(),
            config.settings.min_answers_for_persona,
        );
        let history = ConversationHistory::new(&config.flow);

        Ok(Self {
            classifier,
            detector: FreeTextDetector::new(),
            recommender,
            affiliate,
            store: None,
            conversation_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            history: RwLock::new(history),
            state: RwLock::new(EngineState::AwaitingChoice(StepId::Welcome)),
            persona: RwLock::new(PersonaState::default()),
            metrics: Arc::new(MetricsTracker::new()),
            event_tx,
            turn_in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            config,
        })
    }

    /// Attach a persistence store; the engine saves after each turn
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    pub fn persona(&self) -> (Persona, Confidence) {
        let state = self.persona.read();
        (state.persona, state.confidence)
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.history.read().transcript().to_vec()
    }

    pub fn answers(&self) -> AnswerMap {
        self.history.read().answers().clone()
    }

    /// Transcript revision, bumped on every wholesale replacement
    pub fn revision(&self) -> u64 {
        self.history.read().revision()
    }

    pub fn metrics(&self) -> &Arc<MetricsTracker> {
        &self.metrics
    }

    /// Serializable snapshot of the whole conversation
    pub fn snapshot(&self) -> StoredConversation {
        let history = self.history.read();
        StoredConversation {
            id: self.conversation_id.clone(),
            title: StoredConversation::title_from(history.transcript()),
            messages: history.transcript().to_vec(),
            answers: history.answers().clone(),
            persona: self.persona.read().persona,
            metrics: self.metrics.snapshot(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    /// Handle the user selecting a choice at the current step
    pub async fn select_choice(&self, choice_id: &str) {
        let Some(generation) = self.begin_turn() else {
            return;
        };
        self.run_choice_turn(generation, choice_id).await;
        self.end_turn(generation);
    }

    /// Handle the user submitting free text. Empty submissions are ignored
    /// without any state change.
    pub async fn submit_text(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(generation) = self.begin_turn() else {
            return;
        };
        self.run_text_turn(generation, text).await;
        self.end_turn(generation);
    }

    /// Restart the conversation wholesale: answers, persona, metrics, and
    /// transcript all return to their seeded state. Idempotent, and cancels
    /// the effect of any turn still in flight.
    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.turn_in_flight.store(false, Ordering::SeqCst);

        self.history.write().reset(&self.config.flow);
        *self.persona.write() = PersonaState::default();
        self.detector.reset();
        self.metrics.reset();
        self.set_state(EngineState::AwaitingChoice(StepId::Welcome));
        self.send_event(EngineEvent::Reset);

        if let Some(store) = &self.store {
            if let Err(e) = store.delete(&self.conversation_id).await {
                tracing::error!(component = "storage", error = %e, "Failed to discard stored conversation");
            }
        }
        self.persist().await;

        tracing::info!(conversation_id = %self.conversation_id, "Conversation reset");
    }

    async fn run_choice_turn(&self, generation: u64, choice_id: &str) {
        let started = Instant::now();

        let step_id = match self.state() {
            EngineState::AwaitingChoice(step) => step,
            other => {
                tracing::debug!(state = ?other, choice = choice_id, "Choice ignored in this state");
                return;
            }
        };

        let (choice_text, target) = {
            let Some(step) = self.config.flow.step(step_id) else {
                tracing::warn!(step = %step_id, "Current step missing from flow table");
                return;
            };
            match step.choice(choice_id) {
                Some(choice) => (choice.text.clone(), choice.target),
                None => {
                    tracing::debug!(step = %step_id, choice = choice_id, "Unknown choice ignored");
                    return;
                }
            }
        };

        self.append(Message::user(choice_text));
        self.history.write().record_answer(step_id, choice_id);
        self.reclassify();

        self.send_event(EngineEvent::Typing(true));
        self.typing_delay().await;
        if self.is_stale(generation) {
            return;
        }

        match target {
            ChoiceTarget::Step(next) => self.advance_to(next, started),
            ChoiceTarget::Suggestions => {
                self.set_state(EngineState::Suggesting);
                self.run_suggestions(generation, started).await;
                if self.is_stale(generation) {
                    return;
                }
            }
            ChoiceTarget::CustomInput => {
                self.set_state(EngineState::AwaitingFreeText { origin: step_id });
            }
        }

        self.send_event(EngineEvent::Typing(false));
        self.persist().await;
    }

    async fn run_text_turn(&self, generation: u64, text: &str) {
        let started = Instant::now();

        let origin = match self.state() {
            EngineState::AwaitingFreeText { origin } => origin,
            other => {
                tracing::debug!(state = ?other, "Text ignored in this state");
                return;
            }
        };

        self.append(Message::user(text));

        // Typed text is supplemental signal; only a confident detection
        // moves the persona.
        let (detected, confidence) = self.detector.detect(text);
        if detected.is_known() {
            self.apply_persona(detected, confidence);
        }

        self.send_event(EngineEvent::Typing(true));
        self.typing_delay().await;
        if self.is_stale(generation) {
            return;
        }

        let persona = self.persona.read().persona;
        self.metrics.record_latency(started.elapsed());
        self.append(
            Message::assistant(persona.acknowledgment())
                .with_latency(started.elapsed().as_millis() as u64),
        );

        // A scripted detour advances the flow after the acknowledgment; an
        // ad-hoc one returns to the step it came from.
        if origin == StepId::DescribeMemory {
            self.advance_to(StepId::GiftPreference, started);
        } else {
            self.set_state(EngineState::AwaitingChoice(origin));
        }

        self.send_event(EngineEvent::Typing(false));
        self.persist().await;
    }

    /// Append the next step's prompt and move there
    fn advance_to(&self, next: StepId, started: Instant) {
        let Some(step) = self.config.flow.step(next) else {
            tracing::warn!(step = %next, "Target step missing from flow table");
            return;
        };

        self.metrics.record_latency(started.elapsed());
        self.append(
            Message::assistant(step.prompt.clone())
                .with_choices(message_choices(step))
                .with_latency(started.elapsed().as_millis() as u64),
        );
        self.set_state(if step.is_terminal() {
            EngineState::Done
        } else {
            EngineState::AwaitingChoice(next)
        });
    }

    /// Run the suggestions turn: fetch products, emit the persona-flavored
    /// suggestion message, then the fixed follow-up question. Collaborator
    /// failure or timeout degrades to the fallback product list; the turn
    /// always completes.
    async fn run_suggestions(&self, generation: u64, started: Instant) {
        let (interests, budget, answers) = {
            let history = self.history.read();
            (
                interests_from(history.answers()),
                budget_from(history.answers()),
                history.answers().clone(),
            )
        };
        self.recommender.observe_answers(&answers);

        let timeout = Duration::from_secs(self.config.settings.recommendation_timeout_secs);
        let fetched: Result<Vec<Product>, EngineError> =
            match tokio::time::timeout(timeout, self.recommender.recommend(&interests, budget))
                .await
            {
                Ok(Ok(products)) => Ok(products),
                Ok(Err(e)) => Err(e.into()),
                Err(_) => Err(EngineError::Timeout),
            };

        if self.is_stale(generation) {
            tracing::debug!("Discarding recommendation fetch that finished after a reset");
            return;
        }

        let persona = self.persona.read().persona;
        let (text, products) = match fetched {
            Ok(products) if !products.is_empty() => {
                (persona.suggestion_text().to_string(), products)
            }
            Ok(_) => {
                tracing::warn!(interests = ?interests, "Recommendation fetch returned no products");
                (
                    self.config.templates.recommendation_fallback.clone(),
                    fallback_products(),
                )
            }
            Err(e) => {
                tracing::error!(component = "recommendations", error = %e, "Recommendation fetch failed");
                self.send_event(EngineEvent::Toast(self.config.templates.retry_prompt.clone()));
                (
                    self.config.templates.recommendation_fallback.clone(),
                    fallback_products(),
                )
            }
        };

        self.affiliate.record_impression(&products);
        self.metrics.record_latency(started.elapsed());
        self.append(
            Message::assistant(text)
                .with_products(products.clone())
                .with_latency(started.elapsed().as_millis() as u64),
        );
        self.send_event(EngineEvent::SuggestionsReady(products));

        if let Some(step) = self.config.flow.step(StepId::FinalQuestion) {
            self.append(Message::assistant(step.prompt.clone()).with_choices(message_choices(step)));
        }
        self.set_state(EngineState::AwaitingChoice(StepId::FinalQuestion));
    }

    /// Re-run the rule classifier over the recorded answers
    fn reclassify(&self) {
        let (persona, confidence) = {
            let history = self.history.read();
            self.classifier.classify(history.answers())
        };
        self.apply_persona(persona, confidence);
    }

    fn apply_persona(&self, persona: Persona, confidence: Confidence) {
        let notify = {
            let mut state = self.persona.write();
            let changed = state.persona != persona;
            state.persona = persona;
            state.confidence = confidence;
            changed && persona.is_known() && state.notified.insert(persona)
        };

        if notify {
            tracing::info!(persona = %persona, confidence = %confidence, "Persona detected");
            self.send_event(EngineEvent::PersonaDetected {
                persona,
                confidence,
            });
        }
    }

    fn append(&self, message: Message) {
        self.metrics.record_message();
        self.send_event(EngineEvent::MessageAppended(message.clone()));
        self.history.write().append(message);
    }

    fn set_state(&self, state: EngineState) {
        *self.state.write() = state;
    }

    fn send_event(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn typing_delay(&self) {
        let min_ms = self.config.settings.typing_delay_min_ms;
        let max_ms = self.config.settings.typing_delay_max_ms;
        if max_ms == 0 {
            return;
        }
        let delay = if max_ms > min_ms {
            rand::thread_rng().gen_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    fn begin_turn(&self) -> Option<u64> {
        if self
            .turn_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Input ignored while a turn is in flight");
            return None;
        }
        Some(self.generation.load(Ordering::SeqCst))
    }

    fn end_turn(&self, generation: u64) {
        // A reset mid-turn already reopened the latch for the new
        // conversation; a stale turn must not touch it.
        if self.generation.load(Ordering::SeqCst) == generation {
            self.turn_in_flight.store(false, Ordering::SeqCst);
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.snapshot()).await {
            tracing::error!(component = "storage", error = %e, "Failed to persist conversation");
        }
    }
}

fn interests_from(answers: &AnswerMap) -> Vec<String> {
    match answers.get(&StepId::Interests) {
        Some(choice) => vec![choice.clone()],
        None => vec!["tech".to_string(), "gardening".to_string()],
    }
}

fn budget_from(answers: &AnswerMap) -> Option<BudgetTier> {
    answers
        .get(&StepId::Budget)
        .and_then(|choice| BudgetTier::from_choice_id(choice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftwise_config::AffiliateConfig;
    use giftwise_core::MessageRole;
    use giftwise_recommend::CatalogRecommender;

    fn engine() -> ChatEngine {
        let config = EngineConfig {
            settings: EngineSettings::instant(),
            ..Default::default()
        };
        let affiliate = AffiliateLinks::new(AffiliateConfig {
            telemetry_disabled: true,
            ..Default::default()
        });
        ChatEngine::new(
            config,
            Arc::new(CatalogRecommender::instant()),
            Arc::new(affiliate),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_initial_state() {
        let engine = engine();

        assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Welcome));
        assert_eq!(engine.persona().0, Persona::Unknown);
        assert_eq!(engine.transcript().len(), 1);
        assert_eq!(engine.metrics().snapshot().message_count, 0);
    }

    #[tokio::test]
    async fn test_choice_appends_user_and_bot_message() {
        let engine = engine();

        engine.select_choice("time_urgent").await;

        let transcript = engine.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, MessageRole::User);
        assert_eq!(transcript[1].text, "As soon as possible (days)");
        assert_eq!(transcript[2].role, MessageRole::Assistant);
        assert!(transcript[2].has_choices());
        assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Recipient));
        assert_eq!(engine.metrics().snapshot().message_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_choice_is_ignored() {
        let engine = engine();

        engine.select_choice("no_such_choice").await;

        assert_eq!(engine.transcript().len(), 1);
        assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Welcome));
        // The latch was released; a valid choice still works
        engine.select_choice("time_soon").await;
        assert_eq!(engine.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_text_is_ignored() {
        let engine = engine();

        engine.submit_text("   ").await;
        assert_eq!(engine.transcript().len(), 1);

        // Text outside the free-text state is also a no-op
        engine.submit_text("hello there").await;
        assert_eq!(engine.transcript().len(), 1);
        assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Welcome));
    }

    #[tokio::test]
    async fn test_persona_announced_once() {
        let engine = engine();
        let mut events = engine.subscribe();

        // Three answers with the urgent time signal
        engine.select_choice("time_urgent").await;
        engine.select_choice("friend").await;
        engine.select_choice("just_because").await;
        // Further matching answers keep the same persona
        engine.select_choice("practical").await;
        engine.select_choice("tech").await;

        assert_eq!(engine.persona().0, Persona::LastMinute);

        let mut detections = 0;
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::PersonaDetected { persona, .. } = event {
                assert_eq!(persona, Persona::LastMinute);
                detections += 1;
            }
        }
        assert_eq!(detections, 1);
    }

    #[tokio::test]
    async fn test_reset_restores_seeded_state() {
        let engine = engine();

        engine.select_choice("time_urgent").await;
        engine.select_choice("colleague").await;
        engine.reset().await;
        engine.reset().await;

        assert_eq!(engine.transcript().len(), 1);
        assert!(engine.answers().is_empty());
        assert_eq!(engine.persona().0, Persona::Unknown);
        assert_eq!(engine.state(), EngineState::AwaitingChoice(StepId::Welcome));
        assert_eq!(engine.metrics().snapshot().message_count, 0);
        assert_eq!(engine.revision(), 2);
    }
}
