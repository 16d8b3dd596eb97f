//! Per-browser session state for the trainer.
//!
//! A session tracks which card is on screen and the last submission made for it.
//! Feedback lives in a single slot: moving to another card clears it.

mod cookie;
mod store;

pub use cookie::{BrowserSession, SESSION_COOKIE_NAME};
pub use store::{generate_session_id, is_valid_session_id, SessionStore};

use rand::seq::SliceRandom;

/// Navigation direction for `Session::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Prev,
  Next,
}

impl Step {
  fn delta(self) -> isize {
    match self {
      Step::Prev => -1,
      Step::Next => 1,
    }
  }
}

/// Coarse view state of the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// No graded submission for the current card
  Idle,
  /// Feedback is present for the current card
  Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
  /// Position in `order`, always `< order.len()`
  pub index: usize,
  /// Deck positions in the order this session walks them
  order: Vec<usize>,
  pub submitted_answer: Option<String>,
  /// Markdown feedback as returned by the grader (rendered at display time)
  pub feedback: Option<String>,
  /// Last grading failure, shown inline in place of feedback
  pub error: Option<String>,
  pub show_answer: bool,
}

impl Session {
  /// New session walking the deck in file order.
  pub fn new(deck_size: usize) -> Self {
    Self::with_order((0..deck_size).collect())
  }

  /// New session walking the deck in a random order.
  pub fn shuffled(deck_size: usize) -> Self {
    let mut order: Vec<usize> = (0..deck_size).collect();
    order.shuffle(&mut rand::rng());
    Self::with_order(order)
  }

  fn with_order(order: Vec<usize>) -> Self {
    Self {
      index: 0,
      order,
      submitted_answer: None,
      feedback: None,
      error: None,
      show_answer: false,
    }
  }

  /// Number of cards this session walks through.
  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Deck position of the card currently on screen.
  pub fn card_position(&self) -> usize {
    self.order.get(self.index).copied().unwrap_or(0)
  }

  pub fn phase(&self) -> Phase {
    if self.feedback.is_some() {
      Phase::Submitted
    } else {
      Phase::Idle
    }
  }

  pub fn is_first(&self) -> bool {
    self.index == 0
  }

  pub fn is_last(&self) -> bool {
    self.index + 1 >= self.order.len()
  }

  /// Move one card back or forward, clamped to the deck bounds.
  ///
  /// Returns true if the index changed; only then is the submission state reset.
  pub fn advance(&mut self, step: Step) -> bool {
    let last = self.order.len().saturating_sub(1);
    let target = self
      .index
      .saturating_add_signed(step.delta())
      .min(last);

    if target == self.index {
      return false;
    }

    self.index = target;
    self.submitted_answer = None;
    self.feedback = None;
    self.error = None;
    self.show_answer = false;
    true
  }

  /// Show or hide the reference answer.
  pub fn toggle_answer(&mut self) {
    self.show_answer = !self.show_answer;
  }

  /// Store a graded submission for the current card.
  pub fn record_submission(&mut self, answer: String, feedback: String) {
    self.submitted_answer = Some(answer);
    self.feedback = Some(feedback);
    self.error = None;
  }

  /// Keep the typed answer after a grading failure so it can be resubmitted.
  pub fn record_failure(&mut self, answer: String, message: String) {
    self.submitted_answer = Some(answer);
    self.feedback = None;
    self.error = Some(message);
  }
}
