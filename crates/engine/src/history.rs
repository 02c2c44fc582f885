//! Conversation history
//!
//! Two views of the same conversation: the ordered transcript shown to the
//! user, and the step→choice answer map the classifier consumes. The
//! transcript is append-only; a reset replaces it wholesale and bumps the
//! revision so hosts that track identity see the change.

use giftwise_config::{AnswerMap, FlowConfig, Step, StepId};
use giftwise_core::{Message, MessageChoice};

/// Convert a flow step's choices into message attachments
pub fn message_choices(step: &Step) -> Vec<MessageChoice> {
    step.choices
        .iter()
        .map(|c| MessageChoice::new(c.id.clone(), c.text.clone()))
        .collect()
}

/// Transcript plus answer map for one conversation
#[derive(Debug)]
pub struct ConversationHistory {
    transcript: Vec<Message>,
    answers: AnswerMap,
    /// Bumped whenever the transcript is replaced wholesale
    revision: u64,
}

impl ConversationHistory {
    /// Create a history seeded with the welcome message
    pub fn new(flow: &FlowConfig) -> Self {
        Self {
            transcript: Self::seed(flow),
            answers: AnswerMap::new(),
            revision: 0,
        }
    }

    fn seed(flow: &FlowConfig) -> Vec<Message> {
        match flow.step(StepId::Welcome) {
            Some(step) => vec![
                Message::assistant(step.prompt.clone()).with_choices(message_choices(step)),
            ],
            None => Vec::new(),
        }
    }

    /// Append a message to the transcript
    pub fn append(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Record the choice selected at a step; a re-answer overwrites
    pub fn record_answer(&mut self, step: StepId, choice_id: impl Into<String>) {
        self.answers.insert(step, choice_id.into());
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Discard everything and reseed from the welcome step
    pub fn reset(&mut self, flow: &FlowConfig) {
        self.transcript = Self::seed(flow);
        self.answers = AnswerMap::new();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftwise_core::MessageRole;

    #[test]
    fn test_seeded_with_welcome() {
        let flow = FlowConfig::default();
        let history = ConversationHistory::new(&flow);

        assert_eq!(history.message_count(), 1);
        let welcome = &history.transcript()[0];
        assert_eq!(welcome.role, MessageRole::Assistant);
        assert!(welcome.has_choices());
    }

    #[test]
    fn test_answers_last_write_wins() {
        let flow = FlowConfig::default();
        let mut history = ConversationHistory::new(&flow);

        history.record_answer(StepId::Budget, "budget_low");
        history.record_answer(StepId::Budget, "budget_high");

        assert_eq!(
            history.answers().get(&StepId::Budget).map(String::as_str),
            Some("budget_high")
        );
        assert_eq!(history.answers().len(), 1);
    }

    #[test]
    fn test_reset_replaces_wholesale() {
        let flow = FlowConfig::default();
        let mut history = ConversationHistory::new(&flow);

        history.append(Message::user("hello"));
        history.record_answer(StepId::Recipient, "friend");
        let before = history.revision();

        history.reset(&flow);

        assert_eq!(history.message_count(), 1);
        assert!(history.answers().is_empty());
        assert_eq!(history.revision(), before + 1);
    }

    #[test]
    fn test_transcript_order_preserved() {
        let flow = FlowConfig::default();
        let mut history = ConversationHistory::new(&flow);

        history.append(Message::user("first"));
        history.append(Message::assistant("second"));

        let texts: Vec<&str> = history
            .transcript()
            .iter()
            .skip(1)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
