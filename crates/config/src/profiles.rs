//! Persona profile rule table
//!
//! Each profile pairs a persona with a boolean rule over the answer map.
//! Profiles are evaluated in table order and the first match wins; the rules
//! are mutually exclusive for answer maps produced by the shipped flow, so
//! the ordering only matters for hand-built maps.

use serde::{Deserialize, Serialize};

use giftwise_core::Persona;

use crate::flow::{AnswerMap, StepId};

/// Boolean rule over recorded answers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The answer at `step` equals `choice`
    Answer { step: StepId, choice: String },
    /// The answer at `step` is one of `choices`
    OneOf { step: StepId, choices: Vec<String> },
    /// All sub-rules hold
    All(Vec<Rule>),
    /// At least one sub-rule holds
    Any(Vec<Rule>),
}

impl Rule {
    fn answer(step: StepId, choice: &str) -> Rule {
        Rule::Answer {
            step,
            choice: choice.to_string(),
        }
    }

    fn one_of(step: StepId, choices: &[&str]) -> Rule {
        Rule::OneOf {
            step,
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Evaluate the rule against an answer map
    pub fn eval(&self, answers: &AnswerMap) -> bool {
        match self {
            Rule::Answer { step, choice } => {
                answers.get(step).is_some_and(|a| a == choice)
            }
            Rule::OneOf { step, choices } => {
                answers.get(step).is_some_and(|a| choices.iter().any(|c| c == a))
            }
            Rule::All(rules) => rules.iter().all(|r| r.eval(answers)),
            Rule::Any(rules) => rules.iter().any(|r| r.eval(answers)),
        }
    }

    /// Count leaf predicates satisfied by the answer map, regardless of how
    /// they combine. Used to tier classifier confidence.
    pub fn matched_leaves(&self, answers: &AnswerMap) -> usize {
        match self {
            Rule::Answer { .. } | Rule::OneOf { .. } => usize::from(self.eval(answers)),
            Rule::All(rules) | Rule::Any(rules) => {
                rules.iter().map(|r| r.matched_leaves(answers)).sum()
            }
        }
    }
}

/// A persona and the rule that assigns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub persona: Persona,
    pub rule: Rule,
}

/// Ordered, first-match-wins profile table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTable {
    pub profiles: Vec<PersonaProfile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        // The time answer lives under `welcome` in the shipped flow, but a
        // re-asked time question records under `time_urgency`; the rules
        // accept either key.
        let sentimental = Rule::All(vec![
            Rule::Any(vec![
                Rule::answer(StepId::GiftPreference, "sentimental"),
                Rule::answer(StepId::RelationshipDepth, "very_close"),
                Rule::answer(StepId::Milestone, "significant"),
                Rule::answer(StepId::MemoryBased, "memory_yes"),
                Rule::answer(StepId::MessageInclusion, "message_yes"),
                Rule::answer(StepId::EmotionalImpact, "very_important"),
            ]),
            Rule::one_of(StepId::DetailQuestion, &["past_gift", "mentioned"]),
        ]);

        let busy_professional = Rule::All(vec![
            Rule::Any(vec![
                Rule::answer(StepId::TimeUrgency, "soon"),
                Rule::answer(StepId::Welcome, "time_soon"),
            ]),
            Rule::Any(vec![
                Rule::answer(StepId::GiftPreference, "practical"),
                Rule::answer(StepId::DetailQuestion, "skip"),
            ]),
        ]);

        let last_minute = Rule::Any(vec![
            Rule::answer(StepId::TimeUrgency, "urgent"),
            Rule::answer(StepId::Welcome, "time_urgent"),
        ]);

        let corporate = Rule::one_of(StepId::Recipient, &["colleague", "client"]);

        let budget_conscious = Rule::All(vec![
            Rule::one_of(StepId::Budget, &["budget_low", "budget_medium"]),
            Rule::Any(vec![
                Rule::answer(StepId::GiftPreference, "fun"),
                Rule::answer(StepId::Interests, "art"),
            ]),
        ]);

        Self {
            profiles: vec![
                PersonaProfile { persona: Persona::Sentimental, rule: sentimental },
                PersonaProfile { persona: Persona::BusyProfessional, rule: busy_professional },
                PersonaProfile { persona: Persona::LastMinute, rule: last_minute },
                PersonaProfile { persona: Persona::Corporate, rule: corporate },
                PersonaProfile { persona: Persona::BudgetConscious, rule: budget_conscious },
            ],
        }
    }
}

impl ProfileTable {
    /// First profile whose rule matches the answers, if any
    pub fn first_match(&self, answers: &AnswerMap) -> Option<&PersonaProfile> {
        self.profiles.iter().find(|p| p.rule.eval(answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(StepId, &str)]) -> AnswerMap {
        pairs
            .iter()
            .map(|(s, c)| (*s, c.to_string()))
            .collect()
    }

    #[test]
    fn test_urgent_is_last_minute() {
        let table = ProfileTable::default();

        let a = answers(&[(StepId::TimeUrgency, "urgent")]);
        assert_eq!(table.first_match(&a).unwrap().persona, Persona::LastMinute);

        let a = answers(&[(StepId::Welcome, "time_urgent")]);
        assert_eq!(table.first_match(&a).unwrap().persona, Persona::LastMinute);
    }

    #[test]
    fn test_sentimental_needs_detail_answer() {
        let table = ProfileTable::default();

        // Emotional signal alone is not enough
        let a = answers(&[(StepId::GiftPreference, "sentimental")]);
        assert!(table.first_match(&a).is_none());

        let a = answers(&[
            (StepId::GiftPreference, "sentimental"),
            (StepId::DetailQuestion, "past_gift"),
        ]);
        assert_eq!(table.first_match(&a).unwrap().persona, Persona::Sentimental);
    }

    #[test]
    fn test_urgent_beats_practical() {
        // busy_professional requires the "soon" signal, so urgent + practical
        // falls through to last_minute
        let table = ProfileTable::default();
        let a = answers(&[
            (StepId::Welcome, "time_urgent"),
            (StepId::GiftPreference, "practical"),
            (StepId::DetailQuestion, "skip"),
        ]);
        assert_eq!(table.first_match(&a).unwrap().persona, Persona::LastMinute);
    }

    #[test]
    fn test_busy_professional() {
        let table = ProfileTable::default();
        let a = answers(&[
            (StepId::Welcome, "time_soon"),
            (StepId::GiftPreference, "practical"),
        ]);
        assert_eq!(
            table.first_match(&a).unwrap().persona,
            Persona::BusyProfessional
        );
    }

    #[test]
    fn test_corporate_recipients() {
        let table = ProfileTable::default();
        for recipient in ["colleague", "client"] {
            let a = answers(&[(StepId::Recipient, recipient)]);
            assert_eq!(table.first_match(&a).unwrap().persona, Persona::Corporate);
        }
    }

    #[test]
    fn test_budget_conscious() {
        let table = ProfileTable::default();
        let a = answers(&[
            (StepId::Budget, "budget_low"),
            (StepId::GiftPreference, "fun"),
        ]);
        assert_eq!(
            table.first_match(&a).unwrap().persona,
            Persona::BudgetConscious
        );

        // High budget never qualifies
        let a = answers(&[
            (StepId::Budget, "budget_premium"),
            (StepId::GiftPreference, "fun"),
        ]);
        assert!(table.first_match(&a).is_none());
    }

    #[test]
    fn test_empty_answers_match_nothing() {
        let table = ProfileTable::default();
        assert!(table.first_match(&AnswerMap::new()).is_none());
    }

    #[test]
    fn test_matched_leaves_counts_support() {
        let rule = Rule::Any(vec![
            Rule::answer(StepId::MemoryBased, "memory_yes"),
            Rule::answer(StepId::MessageInclusion, "message_yes"),
        ]);
        let a = answers(&[
            (StepId::MemoryBased, "memory_yes"),
            (StepId::MessageInclusion, "message_yes"),
        ]);
        assert_eq!(rule.matched_leaves(&a), 2);
        assert!(rule.eval(&a));
    }
}
