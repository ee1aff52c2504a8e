//! Rapid-fire quiz: a timed, scored free-text quiz over a shuffled snapshot
//! of the card set. Runs entirely in memory and never touches the store.
//!
//! The shell drives time by calling `tick` once per second; dropping the
//! session is all the cancellation there is, since no callback outlives it.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use super::Card;

/// Ticks allowed per question.
pub const QUESTION_SECONDS: u32 = 30;
/// Ticks the verdict stays on screen before advancing.
pub const REVEAL_SECONDS: u32 = 2;

/// One question: the prompt and its expected answer.
#[derive(Debug, Clone)]
pub struct QuizCard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Final results reported when the last card is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSummary {
    pub correct: usize,
    pub total: usize,
    pub elapsed_ms: i64,
    /// Rounded percentage of correct answers.
    pub accuracy: u32,
}

#[derive(Debug)]
enum Phase {
    /// The snapshot was empty; the quiz never starts.
    NoCards,
    Playing {
        cursor: usize,
        countdown: u32,
        /// Verdict on screen and ticks left before advancing.
        reveal: Option<(Verdict, u32)>,
    },
    Finished(QuizSummary),
}

pub struct QuizSession {
    cards: Vec<QuizCard>,
    correct: usize,
    started_at: DateTime<Utc>,
    phase: Phase,
}

impl QuizSession {
    /// Snapshots and shuffles the card set. An empty set short-circuits to
    /// the terminal no-cards phase.
    pub fn new(cards: &[Card], rng: &mut impl Rng, now: DateTime<Utc>) -> Self {
        let mut quiz_cards: Vec<QuizCard> = cards
            .iter()
            .map(|c| QuizCard {
                front: c.front.clone(),
                back: c.back.clone(),
            })
            .collect();
        quiz_cards.shuffle(rng);

        let phase = Self::entry_phase(&quiz_cards);
        Self {
            cards: quiz_cards,
            correct: 0,
            started_at: now,
            phase,
        }
    }

    fn entry_phase(cards: &[QuizCard]) -> Phase {
        if cards.is_empty() {
            Phase::NoCards
        } else {
            Phase::Playing {
                cursor: 0,
                countdown: QUESTION_SECONDS,
                reveal: None,
            }
        }
    }

    /// Reshuffles and starts over with a zeroed score.
    pub fn restart(&mut self, rng: &mut impl Rng, now: DateTime<Utc>) {
        self.cards.shuffle(rng);
        self.correct = 0;
        self.started_at = now;
        self.phase = Self::entry_phase(&self.cards);
    }

    /// One second of quiz time: counts the question down while answering,
    /// or the reveal hold once a verdict is showing.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let advance = match &mut self.phase {
            Phase::Playing {
                countdown,
                reveal: None,
                ..
            } => {
                *countdown = countdown.saturating_sub(1);
                // out of time: graded incorrect, no reveal hold
                *countdown == 0
            }
            Phase::Playing {
                reveal: Some((_, hold)),
                ..
            } => {
                *hold = hold.saturating_sub(1);
                *hold == 0
            }
            _ => false,
        };
        if advance {
            self.advance(now);
        }
    }

    /// Grades a non-empty answer against the current card and starts the
    /// reveal hold. Ignored while a verdict is already showing.
    pub fn submit(&mut self, answer: &str) {
        let answer = answer.trim();
        if answer.is_empty() {
            return;
        }
        let cursor = match &self.phase {
            Phase::Playing {
                cursor,
                reveal: None,
                ..
            } => *cursor,
            _ => return,
        };

        let verdict = if grade(&self.cards[cursor].back, answer) {
            self.correct += 1;
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };

        if let Phase::Playing { reveal, .. } = &mut self.phase {
            *reveal = Some((verdict, REVEAL_SECONDS));
        }
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        let cursor = match &self.phase {
            Phase::Playing { cursor, .. } => *cursor,
            _ => return,
        };

        if cursor + 1 == self.cards.len() {
            let total = self.cards.len();
            let accuracy = ((self.correct as f64 / total as f64) * 100.0).round() as u32;
            self.phase = Phase::Finished(QuizSummary {
                correct: self.correct,
                total,
                elapsed_ms: (now - self.started_at).num_milliseconds(),
                accuracy,
            });
        } else {
            self.phase = Phase::Playing {
                cursor: cursor + 1,
                countdown: QUESTION_SECONDS,
                reveal: None,
            };
        }
    }

    pub fn no_cards(&self) -> bool {
        matches!(self.phase, Phase::NoCards)
    }

    pub fn current(&self) -> Option<&QuizCard> {
        match &self.phase {
            Phase::Playing { cursor, .. } => self.cards.get(*cursor),
            _ => None,
        }
    }

    /// Seconds left on the current question, while one is being answered.
    pub fn countdown(&self) -> Option<u32> {
        match &self.phase {
            Phase::Playing {
                countdown,
                reveal: None,
                ..
            } => Some(*countdown),
            _ => None,
        }
    }

    /// Verdict currently on screen, if any.
    pub fn verdict(&self) -> Option<Verdict> {
        match &self.phase {
            Phase::Playing {
                reveal: Some((verdict, _)),
                ..
            } => Some(*verdict),
            _ => None,
        }
    }

    /// (1-based question number, total) while playing.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.phase {
            Phase::Playing { cursor, .. } => Some((cursor + 1, self.cards.len())),
            _ => None,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        match &self.phase {
            Phase::Finished(summary) => Some(*summary),
            _ => None,
        }
    }

    /// Playing order of the snapshot.
    pub fn cards(&self) -> &[QuizCard] {
        &self.cards
    }
}

/// Case-insensitive match on trimmed text: the answer is correct when it
/// equals the stored answer or the stored answer contains it, so partial
/// answers count. The reverse containment does not.
fn grade(stored: &str, answer: &str) -> bool {
    let stored = stored.trim().to_lowercase();
    let answer = answer.trim().to_lowercase();
    stored == answer || stored.contains(&answer)
}
