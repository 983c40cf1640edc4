// Bag-of-words language check: is this text Plat Vlaams or something else?
//
// Tokens are counted against the four lexicons. The strongest competing
// language is compared with the target count using fixed thresholds. Inbound
// (user) text is judged strictly; outbound (model) text uses the same two
// rules in the opposite order, which yields identical verdicts.

use super::lexicon;
use super::tokenizer::tokens;

/// Binary verdict of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Target,
    Other,
}

/// Which side of the model call the text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Lexicon hit counts for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageScore {
    pub target: usize,
    pub english: usize,
    pub french: usize,
    pub german: usize,
}

impl LanguageScore {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut score = Self::default();
        for token in tokens {
            let t = token.as_ref();
            if lexicon::TARGET.contains(t) {
                score.target += 1;
            }
            if lexicon::ENGLISH.contains(t) {
                score.english += 1;
            }
            if lexicon::FRENCH.contains(t) {
                score.french += 1;
            }
            if lexicon::GERMAN.contains(t) {
                score.german += 1;
            }
        }
        score
    }

    /// Count of the strongest non-target language.
    pub fn other(&self) -> usize {
        self.english.max(self.french).max(self.german)
    }

    fn outweighs_target(&self) -> bool {
        let other = self.other();
        other >= 2 && other > self.target
    }

    fn only_other(&self) -> bool {
        self.target == 0 && self.other() >= 1
    }

    /// Apply the threshold rules for `direction`.
    pub fn verdict(&self, direction: Direction) -> Language {
        let flagged = match direction {
            Direction::Inbound => self.outweighs_target() || self.only_other(),
            Direction::Outbound => self.only_other() || self.outweighs_target(),
        };
        if flagged {
            Language::Other
        } else {
            Language::Target
        }
    }
}

/// Classify `text`. Text without any recognised word gets the benefit of the
/// doubt.
pub fn classify(text: &str, direction: Direction) -> Language {
    let toks = tokens(text);
    if toks.is_empty() {
        return Language::Target;
    }
    LanguageScore::from_tokens(&toks).verdict(direction)
}

pub fn detect_user_language(text: &str) -> Language {
    classify(text, Direction::Inbound)
}

pub fn detect_output_language(text: &str) -> Language {
    classify(text, Direction::Outbound)
}
