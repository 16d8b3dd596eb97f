//! Deck loading - reads the question/answer deck once at startup.
//!
//! JSON decks may be a bare array of records or an object with a `cards` array.
//! Files ending in `.toml` are read as `[[cards]]` tables.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A single interview question with its reference answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Ordered, read-only collection of flashcards.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Flashcard>,
}

/// Record as it appears on disk; both fields are checked after parsing.
#[derive(Debug, Deserialize)]
struct RawCard {
    question: Option<String>,
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDeck {
    List(Vec<RawCard>),
    Wrapped { cards: Vec<RawCard> },
}

impl RawDeck {
    fn into_cards(self) -> Vec<RawCard> {
        match self {
            RawDeck::List(cards) | RawDeck::Wrapped { cards } => cards,
        }
    }
}

/// Deck loading errors.
#[derive(Debug, Error)]
pub enum DeckLoadError {
    #[error("Deck file not found: {0}")]
    FileNotFound(String),
    #[error("IO error reading {0}: {1}")]
    Io(String, String),
    #[error("Parse error in {0}: {1}")]
    Parse(String, String),
    #[error("Card #{index} in {path} is missing its {field}")]
    InvalidRecord {
        path: String,
        index: usize,
        field: &'static str,
    },
    #[error("Deck {0} contains no cards")]
    Empty(String),
}

impl DeckLoadError {
    /// Returns a user-facing error message without exposing filesystem paths.
    pub fn user_message(&self) -> &'static str {
        match self {
            DeckLoadError::FileNotFound(_) => "Deck file not found",
            DeckLoadError::Io(_, _) => "Failed to read deck file",
            DeckLoadError::Parse(_, _) => "Failed to parse deck file",
            DeckLoadError::InvalidRecord { .. } => "Deck contains an incomplete card",
            DeckLoadError::Empty(_) => "Deck contains no cards",
        }
    }
}

impl Deck {
    /// Load a deck from disk, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, DeckLoadError> {
        let path_str = path.display().to_string();

        if !path.exists() {
            return Err(DeckLoadError::FileNotFound(path_str));
        }

        let content =
            fs::read_to_string(path).map_err(|e| DeckLoadError::Io(path_str.clone(), e.to_string()))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let raw: RawDeck = if is_toml {
            toml::from_str(&content).map_err(|e| DeckLoadError::Parse(path_str.clone(), e.to_string()))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| DeckLoadError::Parse(path_str.clone(), e.to_string()))?
        };

        let deck = Self::from_raw(raw.into_cards(), &path_str)?;
        tracing::debug!("Loaded {} cards from {}", deck.len(), path_str);
        Ok(deck)
    }

    fn from_raw(raw: Vec<RawCard>, path: &str) -> Result<Self, DeckLoadError> {
        if raw.is_empty() {
            return Err(DeckLoadError::Empty(path.to_string()));
        }

        let invalid = |index: usize, field: &'static str| DeckLoadError::InvalidRecord {
            path: path.to_string(),
            index,
            field,
        };

        let cards = raw
            .into_iter()
            .enumerate()
            .map(|(index, card)| {
                let question = card
                    .question
                    .filter(|q| !q.trim().is_empty())
                    .ok_or_else(|| invalid(index, "question"))?;
                let answer = card.answer.ok_or_else(|| invalid(index, "answer"))?;
                Ok(Flashcard { question, answer })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cards })
    }

    /// Build a deck from in-memory cards. Fails on an empty list.
    pub fn from_cards(cards: Vec<Flashcard>) -> Result<Self, DeckLoadError> {
        if cards.is_empty() {
            return Err(DeckLoadError::Empty("<memory>".to_string()));
        }
        Ok(Self { cards })
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always false for a loaded deck; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flashcard> {
        self.cards.iter()
    }
}
