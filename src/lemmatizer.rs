//! Noun lemmatizer
//!
//! Maps plural nouns back to their dictionary form using an exception table
//! for irregular plurals followed by WordNet's noun detachment rules. Tokens
//! that are not recognisably plural are returned unchanged.

use std::collections::{HashMap, HashSet};

/// Irregular plurals and plurals the suffix rules would get wrong
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("crises", "crisis"),
    ("hypotheses", "hypothesis"),
    ("diagnoses", "diagnosis"),
    ("syllabi", "syllabus"),
    ("curricula", "curriculum"),
    ("alumni", "alumnus"),
    ("stimuli", "stimulus"),
    ("indices", "index"),
    ("appendices", "appendix"),
    ("matrices", "matrix"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("selves", "self"),
    ("quizzes", "quiz"),
    ("buses", "bus"),
    ("irises", "iris"),
    ("uses", "use"),
    ("excuses", "excuse"),
    ("abuses", "abuse"),
    ("fuses", "fuse"),
    ("muses", "muse"),
    ("refuses", "refuse"),
    ("ruses", "ruse"),
    ("recluses", "recluse"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("echoes", "echo"),
    ("niches", "niche"),
    ("avalanches", "avalanche"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("calories", "calorie"),
    ("rookies", "rookie"),
    ("brownies", "brownie"),
    ("hoodies", "hoodie"),
    ("selfies", "selfie"),
    ("freebies", "freebie"),
];

/// Base forms the suffix rules would otherwise change
const INVARIANT_WORDS: &[&str] = &[
    "specimen", "abdomen", "omen", "amen", "stamen", "regimen", "acumen", "semen", "hymen",
    "dolmen", "ramen",
    "always", "perhaps", "news", "series", "species", "means", "sometimes", "afterwards",
    "towards", "besides", "thanks", "yes", "whereas", "nowadays", "overseas", "lens",
    "chaos", "canvas", "bias", "atlas", "gas", "alias", "ethos", "pathos", "headquarters",
    "premises", "outskirts", "whereabouts", "mumps", "measles", "diabetes", "herpes",
];

/// Endings that mark a word as singular even though it ends in `s`
const SINGULAR_ENDINGS: &[&str] = &["ss", "us", "is", "ous", "ics"];

/// Rule-based noun lemmatizer
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    /// Build the lemmatizer tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            exceptions: NOUN_EXCEPTIONS.iter().copied().collect(),
            invariant: INVARIANT_WORDS.iter().copied().collect(),
        }
    }

    /// Reduce a lowercase token to its base noun form
    #[must_use]
    pub fn lemmatize(&self, token: &str) -> String {
        if let Some(base) = self.exceptions.get(token) {
            return (*base).to_string();
        }

        if self.invariant.contains(token) {
            return token.to_string();
        }

        // "freshmen", "chairmen"
        if let Some(stem) = token.strip_suffix("men").filter(|stem| stem.len() > 1) {
            return format!("{stem}man");
        }

        if token.len() <= 3
            || !token.ends_with('s')
            || SINGULAR_ENDINGS.iter().any(|end| token.ends_with(end))
        {
            return token.to_string();
        }

        Self::detach_suffix(token)
    }

    /// WordNet noun detachment rules, most specific suffix first
    fn detach_suffix(token: &str) -> String {
        if let Some(stem) = token.strip_suffix("ies") {
            // "ties", "pies": the singular keeps its "ie"
            if stem.len() <= 1 {
                return token[..token.len() - 1].to_string();
            }
            return format!("{stem}y");
        }

        if let Some(stem) = token.strip_suffix("uses") {
            // "causes", "houses" drop the s; "campuses", "viruses" come from -us
            if stem.ends_with(['a', 'o']) {
                return token[..token.len() - 1].to_string();
            }
            return format!("{stem}us");
        }

        if let Some(stem) = token.strip_suffix("aches") {
            // "coaches", "beaches" fall through to the -ches rule
            if !stem.ends_with(['e', 'o']) {
                return format!("{stem}ache");
            }
        }

        for (suffix, keep) in [("sses", 2), ("xes", 1), ("ches", 2), ("shes", 2)] {
            if token.ends_with(suffix) {
                let cut = suffix.len() - keep;
                return token[..token.len() - cut].to_string();
            }
        }

        token[..token.len() - 1].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(word: &str) -> String {
        Lemmatizer::new().lemmatize(word)
    }

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemma("teachers"), "teacher");
        assert_eq!(lemma("exams"), "exam");
        assert_eq!(lemma("hours"), "hour");
        assert_eq!(lemma("courses"), "course");
        assert_eq!(lemma("responses"), "response");
    }

    #[test]
    fn test_ies_plurals() {
        assert_eq!(lemma("facilities"), "facility");
        assert_eq!(lemma("policies"), "policy");
        assert_eq!(lemma("studies"), "study");
        assert_eq!(lemma("ties"), "tie");
    }

    #[test]
    fn test_sibilant_plurals() {
        assert_eq!(lemma("classes"), "class");
        assert_eq!(lemma("processes"), "process");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("churches"), "church");
        assert_eq!(lemma("wishes"), "wish");
        assert_eq!(lemma("sizes"), "size");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("women"), "woman");
        assert_eq!(lemma("criteria"), "criterion");
        assert_eq!(lemma("quizzes"), "quiz");
        assert_eq!(lemma("excuses"), "excuse");
        assert_eq!(lemma("uses"), "use");
    }

    #[test]
    fn test_us_plurals() {
        assert_eq!(lemma("campuses"), "campus");
        assert_eq!(lemma("bonuses"), "bonus");
        assert_eq!(lemma("viruses"), "virus");
        assert_eq!(lemma("statuses"), "status");
        assert_eq!(lemma("buses"), "bus");
        assert_eq!(lemma("causes"), "cause");
        assert_eq!(lemma("houses"), "house");
        assert_eq!(lemma("warehouses"), "warehouse");
        assert_eq!(lemma("clauses"), "clause");
    }

    #[test]
    fn test_men_plurals() {
        assert_eq!(lemma("freshmen"), "freshman");
        assert_eq!(lemma("chairmen"), "chairman");
        assert_eq!(lemma("men"), "man");
        assert_eq!(lemma("specimen"), "specimen");
        assert_eq!(lemma("abdomen"), "abdomen");
    }

    #[test]
    fn test_ache_plurals() {
        assert_eq!(lemma("aches"), "ache");
        assert_eq!(lemma("headaches"), "headache");
        assert_eq!(lemma("toothaches"), "toothache");
        assert_eq!(lemma("caches"), "cache");
        assert_eq!(lemma("coaches"), "coach");
        assert_eq!(lemma("beaches"), "beach");
        assert_eq!(lemma("approaches"), "approach");
    }

    #[test]
    fn test_singular_words_unchanged() {
        assert_eq!(lemma("class"), "class");
        assert_eq!(lemma("campus"), "campus");
        assert_eq!(lemma("analysis"), "analysis");
        assert_eq!(lemma("various"), "various");
        assert_eq!(lemma("statistics"), "statistics");
        assert_eq!(lemma("always"), "always");
        assert_eq!(lemma("grading"), "grading");
        assert_eq!(lemma("helpful"), "helpful");
    }
}
