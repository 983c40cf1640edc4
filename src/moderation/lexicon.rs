// Fixed word lists for the bag-of-words language check.
//
// Each list holds short function words and pronouns that are frequent in
// everyday chat. Overlaps between lists (e.g. "me", "je", "kann") are kept on
// purpose: a word counts for every language that claims it.

use std::collections::HashSet;
use std::sync::LazyLock;

const TARGET_WORDS: &[&str] = &[
    "de", "het", "een", "en", "maar", "niet", "nie", "wa", "wat", "hoe", "waar", "waarom", "ik",
    "me", "mij", "mijn", "jij", "je", "jouw", "u", "uw", "gij", "ge", "gulle", "wij", "ons",
    "kun", "kunt", "kan", "zal", "leg", "uit", "awel", "allee", "ziede", "da", "dat", "watte",
    "ne", "nen", "nene", "keer", "efkes",
];

const ENGLISH_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "you", "your", "yours", "can", "could", "would",
    "please", "help", "hello", "hi", "thanks", "thank", "what", "how", "why", "where", "here",
    "sure", "it", "its", "this", "that", "explain", "tell", "me", "about", "programming",
    "language",
];

const FRENCH_WORDS: &[&str] = &[
    "le", "la", "les", "des", "et", "ou", "mais", "vous", "tu", "je", "nous", "mon", "ma", "mes",
    "ton", "ta", "tes", "est", "suis", "peux", "pouvez", "bonjour", "merci", "aide", "expliquer",
];

const GERMAN_WORDS: &[&str] = &[
    "der", "die", "das", "und", "oder", "aber", "ich", "du", "sie", "wir", "mein", "meine",
    "bitte", "danke", "kann", "können", "erkläre", "erklären", "hallo",
];

fn build(words: &[&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

/// Plat Vlaams / Dutch hint words.
pub static TARGET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| build(TARGET_WORDS));
pub static ENGLISH: LazyLock<HashSet<&'static str>> = LazyLock::new(|| build(ENGLISH_WORDS));
pub static FRENCH: LazyLock<HashSet<&'static str>> = LazyLock::new(|| build(FRENCH_WORDS));
pub static GERMAN: LazyLock<HashSet<&'static str>> = LazyLock::new(|| build(GERMAN_WORDS));
