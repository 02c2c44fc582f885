//! Persona classification
//!
//! Two classifiers share one output contract:
//! - `RuleClassifier` evaluates the ordered profile table against the
//!   recorded answers. Pure function of its input, never fails.
//! - `FreeTextDetector` scores typed text with weighted keywords and
//!   patterns, smoothing its output over the last few detections so the
//!   persona does not flip on a single message.

use std::collections::{HashMap, VecDeque};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;

use giftwise_config::{AnswerMap, ProfileTable};
use giftwise_core::{Confidence, Persona};

/// Rule classifier over the recorded answers
pub struct RuleClassifier {
    table: ProfileTable,
    /// Answers required before `classify` reports anything but `Unknown`
    min_answers: usize,
}

impl RuleClassifier {
    pub fn new(table: ProfileTable, min_answers: usize) -> Self {
        Self { table, min_answers }
    }

    /// Evaluate the profile table without the answer-count gate. First
    /// matching profile wins; confidence tiers on how many of its atoms the
    /// answers satisfy.
    pub fn evaluate(&self, answers: &AnswerMap) -> (Persona, Confidence) {
        match self.table.first_match(answers) {
            Some(profile) => {
                let support = profile.rule.matched_leaves(answers);
                let confidence = if support >= 2 {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                (profile.persona, confidence)
            }
            None => (Persona::Unknown, Confidence::Low),
        }
    }

    /// Classify the recorded answers, reporting `Unknown` until enough
    /// answers have accumulated to carry signal.
    pub fn classify(&self, answers: &AnswerMap) -> (Persona, Confidence) {
        if answers.len() < self.min_answers {
            return (Persona::Unknown, Confidence::Low);
        }
        self.evaluate(answers)
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(ProfileTable::default(), 3)
    }
}

/// Weight of a keyword hit
const KEYWORD_WEIGHT: f64 = 1.0;
/// Weight of a pattern hit; patterns are more specific than keywords
const PATTERN_WEIGHT: f64 = 1.5;
/// Minimum score to assign a persona
const ASSIGN_THRESHOLD: f64 = 2.0;
/// Score at which the assignment counts as high confidence
const HIGH_CONFIDENCE_THRESHOLD: f64 = 4.0;
/// Detections kept for smoothing
const HISTORY_LIMIT: usize = 3;

struct PersonaTraits {
    persona: Persona,
    keywords: &'static [&'static str],
    patterns: Vec<Regex>,
}

fn pattern(source: &str) -> Regex {
    // Trait patterns are fixed strings compiled once at first use
    Regex::new(source).expect("invalid persona pattern")
}

static PERSONA_TRAITS: Lazy<Vec<PersonaTraits>> = Lazy::new(|| {
    vec![
        PersonaTraits {
            persona: Persona::BusyProfessional,
            keywords: &[
                "busy",
                "work",
                "quick",
                "efficient",
                "professional",
                "career",
                "job",
                "time",
                "deadline",
            ],
            patterns: vec![
                pattern(r"(?i)no time"),
                pattern(r"(?i)too busy"),
                pattern(r"(?i)work(ing)? (\w+ ){0,3}(hours|late)"),
            ],
        },
        PersonaTraits {
            persona: Persona::LastMinute,
            keywords: &[
                "soon",
                "urgent",
                "tomorrow",
                "last minute",
                "hurry",
                "rush",
                "fast",
                "asap",
                "immediately",
            ],
            patterns: vec![
                pattern(
                    r"(?i)by (tomorrow|today|monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
                ),
                pattern(r"(?i)in \d+ days?"),
            ],
        },
        PersonaTraits {
            persona: Persona::Sentimental,
            keywords: &[
                "meaningful",
                "special",
                "memories",
                "emotional",
                "thoughtful",
                "personal",
                "memorable",
                "sentimental",
                "significance",
            ],
            patterns: vec![
                pattern(r"(?i)means? (a lot|the world) to"),
                pattern(r"(?i)special (occasion|moment|memory)"),
            ],
        },
        PersonaTraits {
            persona: Persona::Corporate,
            keywords: &[
                "client",
                "colleague",
                "boss",
                "business",
                "partner",
                "corporate",
                "company",
                "office",
                "professional",
                "team",
            ],
            patterns: vec![
                pattern(r"(?i)business (relationship|partner)"),
                pattern(r"(?i)corporate (gift|present)"),
                pattern(r"(?i)office (environment|setting)"),
            ],
        },
        PersonaTraits {
            persona: Persona::BudgetConscious,
            keywords: &[
                "cheap",
                "affordable",
                "budget",
                "cost",
                "price",
                "inexpensive",
                "saving",
                "deal",
                "bargain",
                "value",
            ],
            patterns: vec![
                pattern(r"(?i)under \$\d+"),
                pattern(r"(?i)not (too|very|that) expensive"),
                pattern(r"(?i)tight budget"),
                pattern(r"(?i)can'?t spend (too|that) much"),
            ],
        },
    ]
});

/// Keyword/pattern persona detector for free-text input
///
/// The rolling detection history is the only mutable state; `reset` clears
/// it along with the rest of the session.
pub struct FreeTextDetector {
    history: RwLock<VecDeque<Persona>>,
}

impl FreeTextDetector {
    pub fn new() -> Self {
        Self {
            history: RwLock::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    /// Score a message against every persona's traits. Pure: no history is
    /// consulted or recorded.
    pub fn score_text(text: &str) -> (Persona, Confidence) {
        let lower = text.to_lowercase();

        let mut best = Persona::Unknown;
        let mut best_score = 0.0f64;
        for traits in PERSONA_TRAITS.iter() {
            let mut score = 0.0;
            for keyword in traits.keywords {
                if lower.contains(keyword) {
                    score += KEYWORD_WEIGHT;
                }
            }
            for pattern in &traits.patterns {
                if pattern.is_match(&lower) {
                    score += PATTERN_WEIGHT;
                }
            }
            if score > best_score {
                best_score = score;
                best = traits.persona;
            }
        }

        if best_score < ASSIGN_THRESHOLD {
            (Persona::Unknown, Confidence::Low)
        } else if best_score < HIGH_CONFIDENCE_THRESHOLD {
            (best, Confidence::Medium)
        } else {
            (best, Confidence::High)
        }
    }

    /// Detect the persona for a message, smoothed by the most frequent value
    /// in the recent detection history.
    pub fn detect(&self, text: &str) -> (Persona, Confidence) {
        let (raw, confidence) = Self::score_text(text);

        let smoothed = {
            let mut history = self.history.write();
            history.push_back(raw);
            if history.len() > HISTORY_LIMIT {
                history.pop_front();
            }
            most_common(&history)
        };

        if smoothed == raw {
            (smoothed, confidence)
        } else {
            // The majority overrode this message's own signal
            (smoothed, Confidence::Medium)
        }
    }

    /// Clear the detection history
    pub fn reset(&self) {
        self.history.write().clear();
    }
}

impl Default for FreeTextDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn most_common(history: &VecDeque<Persona>) -> Persona {
    let mut counts: HashMap<Persona, usize> = HashMap::new();
    let mut max_count = 0;
    let mut most = Persona::Unknown;

    for persona in history {
        let count = counts.entry(*persona).or_insert(0);
        *count += 1;
        if *count > max_count {
            max_count = *count;
            most = *persona;
        }
    }

    most
}
