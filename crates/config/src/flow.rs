//! Conversation flow definition
//!
//! The guided question tree is a closed graph: step identifiers are an enum,
//! choice targets are a sum type, and `FlowConfig::validate` checks the whole
//! table once at load time. Prompts and choice labels remain data so a config
//! file can restyle the conversation without touching code.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Identifier of a step in the guided flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Entry point; also asks the time-urgency question
    Welcome,
    /// Standalone time-urgency step kept for re-asking the question
    TimeUrgency,
    Recipient,
    FamilyMember,
    Occasion,
    Milestone,
    RelationshipDepth,
    MemoryBased,
    DescribeMemory,
    GiftPreference,
    MessageInclusion,
    Interests,
    DetailQuestion,
    EmotionalImpact,
    Budget,
    /// "Anything else?" follow-up shown after suggestions
    FinalQuestion,
    /// Terminal step, no choices
    ThankYou,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Welcome => "welcome",
            StepId::TimeUrgency => "time_urgency",
            StepId::Recipient => "recipient",
            StepId::FamilyMember => "family_member",
            StepId::Occasion => "occasion",
            StepId::Milestone => "milestone",
            StepId::RelationshipDepth => "relationship_depth",
            StepId::MemoryBased => "memory_based",
            StepId::DescribeMemory => "describe_memory",
            StepId::GiftPreference => "gift_preference",
            StepId::MessageInclusion => "message_inclusion",
            StepId::Interests => "interests",
            StepId::DetailQuestion => "detail_question",
            StepId::EmotionalImpact => "emotional_impact",
            StepId::Budget => "budget",
            StepId::FinalQuestion => "final_question",
            StepId::ThankYou => "thank_you",
        }
    }

    /// Every step id, in flow order
    pub fn all() -> &'static [StepId] {
        &[
            StepId::Welcome,
            StepId::TimeUrgency,
            StepId::Recipient,
            StepId::FamilyMember,
            StepId::Occasion,
            StepId::Milestone,
            StepId::RelationshipDepth,
            StepId::MemoryBased,
            StepId::DescribeMemory,
            StepId::GiftPreference,
            StepId::MessageInclusion,
            StepId::Interests,
            StepId::DetailQuestion,
            StepId::EmotionalImpact,
            StepId::Budget,
            StepId::FinalQuestion,
            StepId::ThankYou,
        ]
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map from step to the choice id selected at that step. Re-answering a step
/// overwrites its entry, so the last answer wins.
pub type AnswerMap = BTreeMap<StepId, String>;

/// Where a choice leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceTarget {
    /// Continue the guided flow at this step
    Step(StepId),
    /// Produce product suggestions
    Suggestions,
    /// Switch to free-text input
    CustomInput,
}

/// A selectable choice within a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Id unique within the owning step
    pub id: String,
    /// Display label
    pub text: String,
    /// Transition target
    pub target: ChoiceTarget,
}

impl Choice {
    fn new(id: &str, text: &str, target: ChoiceTarget) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            target,
        }
    }
}

/// A node in the flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Prompt shown as the assistant message
    pub prompt: String,
    /// Choices offered, in display order
    pub choices: Vec<Choice>,
}

impl Step {
    fn new(prompt: &str, choices: Vec<Choice>) -> Self {
        Self {
            prompt: prompt.to_string(),
            choices,
        }
    }

    /// Look up a choice by id
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    /// Whether this step ends the conversation
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

/// The guided flow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub steps: HashMap<StepId, Step>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        use ChoiceTarget::{CustomInput, Step as Goto, Suggestions};

        let mut steps = HashMap::new();

        steps.insert(
            StepId::Welcome,
            Step::new(
                "Hi there! I'm your gift-finding assistant. Let's find the \
                 perfect gift together! How soon do you need it?",
                vec![
                    Choice::new("time_urgent", "As soon as possible (days)", Goto(StepId::Recipient)),
                    Choice::new("time_soon", "Within a couple weeks", Goto(StepId::Recipient)),
                    Choice::new("time_planning", "I'm planning ahead", Goto(StepId::Recipient)),
                ],
            ),
        );
        steps.insert(
            StepId::TimeUrgency,
            Step::new(
                "Great! How soon do you need this gift?",
                vec![
                    Choice::new("urgent", "As soon as possible (days)", Goto(StepId::Recipient)),
                    Choice::new("soon", "Within a couple weeks", Goto(StepId::Recipient)),
                    Choice::new("planning", "I'm planning ahead", Goto(StepId::Recipient)),
                ],
            ),
        );
        steps.insert(
            StepId::Recipient,
            Step::new(
                "Who are you buying this gift for?",
                vec![
                    Choice::new("family", "Family member", Goto(StepId::FamilyMember)),
                    Choice::new("friend", "Friend", Goto(StepId::Occasion)),
                    Choice::new("colleague", "Colleague/Co-worker", Goto(StepId::Occasion)),
                    Choice::new("partner", "Partner/Significant other", Goto(StepId::Occasion)),
                    Choice::new("client", "Client/Business contact", Goto(StepId::Occasion)),
                    Choice::new("other", "Someone else", Goto(StepId::Occasion)),
                ],
            ),
        );
        steps.insert(
            StepId::FamilyMember,
            Step::new(
                "Which family member?",
                vec![
                    Choice::new("parent", "Parent", Goto(StepId::Occasion)),
                    Choice::new("sibling", "Sibling", Goto(StepId::Occasion)),
                    Choice::new("child", "Child", Goto(StepId::Occasion)),
                    Choice::new("grandparent", "Grandparent", Goto(StepId::Occasion)),
                    Choice::new("other_family", "Other family member", Goto(StepId::Occasion)),
                ],
            ),
        );
        steps.insert(
            StepId::Occasion,
            Step::new(
                "What's the occasion?",
                vec![
                    Choice::new("birthday", "Birthday", Goto(StepId::Milestone)),
                    Choice::new("holiday", "Holiday", Goto(StepId::GiftPreference)),
                    Choice::new("anniversary", "Anniversary", Goto(StepId::Milestone)),
                    Choice::new("graduation", "Graduation", Goto(StepId::Milestone)),
                    Choice::new("just_because", "Just because", Goto(StepId::GiftPreference)),
                    Choice::new("other_occasion", "Other occasion", Goto(StepId::GiftPreference)),
                ],
            ),
        );
        steps.insert(
            StepId::Milestone,
            Step::new(
                "Is this a significant milestone or special occasion?",
                vec![
                    Choice::new("significant", "Yes, it's a significant milestone", Goto(StepId::RelationshipDepth)),
                    Choice::new("regular", "No, it's a regular celebration", Goto(StepId::GiftPreference)),
                ],
            ),
        );
        steps.insert(
            StepId::RelationshipDepth,
            Step::new(
                "How would you describe the relationship?",
                vec![
                    Choice::new("very_close", "Very close, with a deep connection", Goto(StepId::MemoryBased)),
                    Choice::new("good_friends", "Good and meaningful", Goto(StepId::GiftPreference)),
                    Choice::new("acquaintance", "More casual/professional", Goto(StepId::GiftPreference)),
                ],
            ),
        );
        steps.insert(
            StepId::MemoryBased,
            Step::new(
                "Would you like the gift to reference a shared memory or experience?",
                vec![
                    Choice::new("memory_yes", "Yes, I'd like something that recalls a memory", Goto(StepId::DescribeMemory)),
                    Choice::new("memory_no", "No, but I still want something meaningful", Goto(StepId::GiftPreference)),
                ],
            ),
        );
        steps.insert(
            StepId::DescribeMemory,
            Step::new(
                "Tell me a bit about this memory or experience you'd like to \
                 reference in the gift:",
                vec![Choice::new("memory_described", "I've shared the memory details", CustomInput)],
            ),
        );
        steps.insert(
            StepId::GiftPreference,
            Step::new(
                "Would you prefer the gift to be more practical or more sentimental?",
                vec![
                    Choice::new("practical", "Practical/Useful", Goto(StepId::Interests)),
                    Choice::new("sentimental", "Sentimental/Meaningful", Goto(StepId::MessageInclusion)),
                    Choice::new("fun", "Fun/Entertaining", Goto(StepId::Interests)),
                    Choice::new("both", "A mix of both", Goto(StepId::Interests)),
                ],
            ),
        );
        steps.insert(
            StepId::MessageInclusion,
            Step::new(
                "Would you like to include a personalized message or story with the gift?",
                vec![
                    Choice::new("message_yes", "Yes, that would make it special", Goto(StepId::Interests)),
                    Choice::new("message_no", "No, the gift should speak for itself", Goto(StepId::Interests)),
                ],
            ),
        );
        steps.insert(
            StepId::Interests,
            Step::new(
                "What are their interests or hobbies?",
                vec![
                    Choice::new("tech", "Technology/Gadgets", Goto(StepId::DetailQuestion)),
                    Choice::new("outdoor", "Outdoors/Nature", Goto(StepId::DetailQuestion)),
                    Choice::new("cooking", "Cooking/Food", Goto(StepId::DetailQuestion)),
                    Choice::new("reading", "Books/Reading", Goto(StepId::DetailQuestion)),
                    Choice::new("art", "Art/Creativity", Goto(StepId::DetailQuestion)),
                    Choice::new("fitness", "Fitness/Sports", Goto(StepId::DetailQuestion)),
                    Choice::new("music", "Music", Goto(StepId::DetailQuestion)),
                    Choice::new("gardening", "Gardening", Goto(StepId::DetailQuestion)),
                    Choice::new("not_sure", "I'm not sure", Goto(StepId::DetailQuestion)),
                ],
            ),
        );
        steps.insert(
            StepId::DetailQuestion,
            Step::new(
                "One more thing that would help me find the perfect gift...",
                vec![
                    Choice::new("past_gift", "Have you given them similar gifts before?", Goto(StepId::EmotionalImpact)),
                    Choice::new("mentioned", "Have they mentioned wanting anything specific?", Goto(StepId::EmotionalImpact)),
                    Choice::new("skip", "I'd rather just see suggestions", Goto(StepId::Budget)),
                ],
            ),
        );
        steps.insert(
            StepId::EmotionalImpact,
            Step::new(
                "How important is it that this gift creates an emotional impact?",
                vec![
                    Choice::new("very_important", "Very important - I want them to feel touched", Goto(StepId::Budget)),
                    Choice::new("somewhat", "Somewhat - I want them to be happy with it", Goto(StepId::Budget)),
                    Choice::new("not_focus", "Not my main focus", Goto(StepId::Budget)),
                ],
            ),
        );
        steps.insert(
            StepId::Budget,
            Step::new(
                "What's your budget range?",
                vec![
                    Choice::new("budget_low", "Under $25", Suggestions),
                    Choice::new("budget_medium", "Between $25-$50", Suggestions),
                    Choice::new("budget_high", "Between $50-$100", Suggestions),
                    Choice::new("budget_premium", "Over $100", Suggestions),
                ],
            ),
        );
        steps.insert(
            StepId::FinalQuestion,
            Step::new(
                "Anything else you want to add to help me find the perfect gift?",
                vec![
                    Choice::new("yes", "Yes, I'd like to add more details", CustomInput),
                    Choice::new("no", "No, these suggestions look great", Goto(StepId::ThankYou)),
                ],
            ),
        );
        steps.insert(
            StepId::ThankYou,
            Step::new(
                "Great! I hope you find the perfect gift from these \
                 suggestions. If you need more help, just let me know!",
                vec![],
            ),
        );

        Self { steps }
    }
}

impl FlowConfig {
    /// Look up a step by id
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(&id)
    }

    /// Validate the flow table. Run once at load time; a shipped table never
    /// fails this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let welcome = self
            .steps
            .get(&StepId::Welcome)
            .ok_or_else(|| ConfigError::MissingStep(StepId::Welcome))?;
        if welcome.is_terminal() {
            return Err(ConfigError::InvalidFlow {
                step: StepId::Welcome,
                message: "entry step must offer choices".to_string(),
            });
        }

        let thank_you = self
            .steps
            .get(&StepId::ThankYou)
            .ok_or_else(|| ConfigError::MissingStep(StepId::ThankYou))?;
        if !thank_you.is_terminal() {
            return Err(ConfigError::InvalidFlow {
                step: StepId::ThankYou,
                message: "terminal step must not offer choices".to_string(),
            });
        }

        for (id, step) in &self.steps {
            let mut seen = HashSet::new();
            for choice in &step.choices {
                if !seen.insert(choice.id.as_str()) {
                    return Err(ConfigError::InvalidFlow {
                        step: *id,
                        message: format!("duplicate choice id '{}'", choice.id),
                    });
                }
                if let ChoiceTarget::Step(target) = choice.target {
                    if !self.steps.contains_key(&target) {
                        return Err(ConfigError::DanglingTarget {
                            step: *id,
                            choice: choice.id.clone(),
                            target,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flow_validates() {
        let flow = FlowConfig::default();
        flow.validate().unwrap();
    }

    #[test]
    fn test_every_step_present() {
        let flow = FlowConfig::default();
        for id in StepId::all() {
            assert!(flow.step(*id).is_some(), "missing step {id}");
        }
    }

    #[test]
    fn test_choice_lookup() {
        let flow = FlowConfig::default();
        let budget = flow.step(StepId::Budget).unwrap();

        let low = budget.choice("budget_low").unwrap();
        assert_eq!(low.target, ChoiceTarget::Suggestions);
        assert!(budget.choice("nope").is_none());
    }

    #[test]
    fn test_terminal_step() {
        let flow = FlowConfig::default();
        assert!(flow.step(StepId::ThankYou).unwrap().is_terminal());
        assert!(!flow.step(StepId::Welcome).unwrap().is_terminal());
    }

    #[test]
    fn test_dangling_target_rejected() {
        let mut flow = FlowConfig::default();
        flow.steps.remove(&StepId::Budget);

        let err = flow.validate().unwrap_err();
        assert!(matches!(err, ConfigError::DanglingTarget { target: StepId::Budget, .. }));
    }

    #[test]
    fn test_duplicate_choice_rejected() {
        let mut flow = FlowConfig::default();
        let step = flow.steps.get_mut(&StepId::Milestone).unwrap();
        let dup = step.choices[0].clone();
        step.choices.push(dup);

        assert!(flow.validate().is_err());
    }

    #[test]
    fn test_step_id_round_trip() {
        let json = serde_json::to_string(&StepId::GiftPreference).unwrap();
        assert_eq!(json, "\"gift_preference\"");
        let back: StepId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StepId::GiftPreference);
    }
}
