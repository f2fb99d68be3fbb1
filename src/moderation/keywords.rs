//! Keyword layer: case-insensitive substring search over a fixed term list.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Sexual,
    SelfHarm,
    Violence,
    BreakCharacter,
    AiDisclosure,
    /// Added through configuration.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    /// Stored lowercased.
    pub term: String,
    pub category: KeywordCategory,
}

const DEFAULT_KEYWORDS: &[(&str, KeywordCategory)] = &[
    ("nsfw", KeywordCategory::Sexual),
    ("porn", KeywordCategory::Sexual),
    ("nude", KeywordCategory::Sexual),
    ("naked", KeywordCategory::Sexual),
    ("explicit sex", KeywordCategory::Sexual),
    ("hentai", KeywordCategory::Sexual),
    ("kill myself", KeywordCategory::SelfHarm),
    ("suicide", KeywordCategory::SelfHarm),
    ("self harm", KeywordCategory::SelfHarm),
    ("self-harm", KeywordCategory::SelfHarm),
    ("cut myself", KeywordCategory::SelfHarm),
    ("end my life", KeywordCategory::SelfHarm),
    ("murder", KeywordCategory::Violence),
    ("make a bomb", KeywordCategory::Violence),
    ("shoot up", KeywordCategory::Violence),
    ("torture", KeywordCategory::Violence),
    ("break character", KeywordCategory::BreakCharacter),
    ("out of character", KeywordCategory::BreakCharacter),
    ("drop the act", KeywordCategory::BreakCharacter),
    ("stop roleplaying", KeywordCategory::BreakCharacter),
    ("jailbreak", KeywordCategory::BreakCharacter),
    ("system prompt", KeywordCategory::BreakCharacter),
    ("are you an ai", KeywordCategory::AiDisclosure),
    ("you are an ai", KeywordCategory::AiDisclosure),
    ("you're an ai", KeywordCategory::AiDisclosure),
    ("language model", KeywordCategory::AiDisclosure),
    ("chatgpt", KeywordCategory::AiDisclosure),
    ("openai", KeywordCategory::AiDisclosure),
];

#[derive(Debug, Clone)]
pub struct KeywordList {
    entries: Vec<Keyword>,
}

impl KeywordList {
    pub fn defaults() -> Self {
        let entries = DEFAULT_KEYWORDS
            .iter()
            .map(|(term, category)| Keyword {
                term: term.to_string(),
                category: *category,
            })
            .collect();
        Self { entries }
    }

    /// Append configured terms. Blank terms are skipped.
    pub fn with_extra<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() {
                self.entries.push(Keyword {
                    term,
                    category: KeywordCategory::Custom,
                });
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First keyword contained in `text`, ignoring case.
    pub fn first_match(&self, text: &str) -> Option<&Keyword> {
        let lowered = text.to_lowercase();
        self.entries.iter().find(|k| lowered.contains(&k.term))
    }
}

impl Default for KeywordList {
    fn default() -> Self {
        Self::defaults()
    }
}
