use anyhow::Result;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use stop_words::{get, LANGUAGE};
use tracing::debug;

use crate::lemmatizer::Lemmatizer;
use crate::lexicon::{category_keywords, NEGATIVE_WORDS, POSITIVE_WORDS};
use crate::models::{Category, CategoryTally, Sentiment, SentimentTally, ThemeEntry};

/// Number of themes returned when the caller does not ask for a specific count
pub const DEFAULT_TOP_THEMES: usize = 20;

/// Shortest token kept after stop-word removal
const MIN_TOKEN_LEN: usize = 3;

/// Fused words the tokenizer splits in two, as `(pattern, replacement)`
///
/// "wanna" only splits when whitespace or the end of the text follows it.
const CONTRACTION_SPLITS: &[(&str, &str)] = &[
    (r"\b(can)(not)\b", "${1} ${2}"),
    (r"\b(gim)(me)\b", "${1} ${2}"),
    (r"\b(gon)(na)\b", "${1} ${2}"),
    (r"\b(got)(ta)\b", "${1} ${2}"),
    (r"\b(lem)(me)\b", "${1} ${2}"),
    (r"\b(wan)(na)(\s|$)", "${1} ${2}${3}"),
];

/// Themes, categories and sentiment computed over one corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusAnalysis {
    /// Most frequent normalized tokens
    pub themes: Vec<ThemeEntry>,
    /// Keyword-presence counts per category
    pub categories: CategoryTally,
    /// Majority-vote sentiment counts
    pub sentiment: SentimentTally,
}

/// Text analyzer for feedback corpora
pub struct TextAnalyzer {
    non_alpha_regex: Regex,
    word_regex: Regex,
    contraction_regexes: Vec<(Regex, &'static str)>,
    stopwords: HashSet<String>,
    lemmatizer: Lemmatizer,
    positive_words: HashSet<&'static str>,
    negative_words: HashSet<&'static str>,
}

impl TextAnalyzer {
    /// Create a new analyzer with the built-in English lexicons
    pub fn new() -> Result<Self> {
        // Anything that is not a lowercase ASCII letter or whitespace is deleted outright
        let non_alpha_regex = Regex::new(r"[^a-z\s]")
            .map_err(|e| anyhow::anyhow!("Failed to compile non-alpha regex: {e}"))?;
        let word_regex = Regex::new(r"\b[a-z]+\b")
            .map_err(|e| anyhow::anyhow!("Failed to compile word regex: {e}"))?;
        let contraction_regexes = CONTRACTION_SPLITS
            .iter()
            .map(|&(pattern, replacement)| {
                Regex::new(pattern)
                    .map(|regex| (regex, replacement))
                    .map_err(|e| anyhow::anyhow!("Failed to compile contraction regex: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        // Initialize stopwords for English (NLTK list)
        let stopwords: HashSet<String> = get(LANGUAGE::English)
            .iter()
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            non_alpha_regex,
            word_regex,
            contraction_regexes,
            stopwords,
            lemmatizer: Lemmatizer::new(),
            positive_words: POSITIVE_WORDS.iter().copied().collect(),
            negative_words: NEGATIVE_WORDS.iter().copied().collect(),
        })
    }

    /// Lowercase and delete every character outside `[a-z\s]`
    ///
    /// Characters are removed rather than replaced, so "well-organized"
    /// becomes "wellorganized".
    #[must_use]
    pub fn clean_text(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.non_alpha_regex.replace_all(&lowered, "").into_owned()
    }

    /// Split cleaned text into word tokens
    ///
    /// Fused forms such as "cannot" and "gonna" come out as two tokens
    /// ("can" "not", "gon" "na"), so their halves meet the stop-word filter.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut split = text.to_string();
        for (regex, replacement) in &self.contraction_regexes {
            split = regex.replace_all(&split, *replacement).into_owned();
        }
        self.word_regex
            .find_iter(&split)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Full normalization: clean, tokenize, drop stop words and short tokens, lemmatize
    ///
    /// Absent or empty input yields an empty string.
    #[must_use]
    pub fn normalize(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return String::new();
        };

        let cleaned = self.clean_text(text);
        self.tokenize(&cleaned)
            .into_iter()
            .filter(|token| token.len() >= MIN_TOKEN_LEN && !self.stopwords.contains(token))
            .map(|token| self.lemmatizer.lemmatize(&token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Most frequent normalized tokens across the corpus
    ///
    /// Ties keep the order in which tokens were first encountered.
    pub fn extract_themes<I, S>(&self, corpus: I, top_n: usize) -> Vec<ThemeEntry>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = corpus
            .into_iter()
            .flatten()
            .map(|text| self.normalize(Some(text.as_ref())))
            .collect();
        rank_themes(normalized.iter().map(String::as_str), top_n)
    }

    /// Count documents per category by keyword presence
    ///
    /// A document may count toward several categories, or none.
    pub fn categorize<I, S>(&self, corpus: I) -> CategoryTally
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut tally = CategoryTally::default();
        for text in corpus.into_iter().flatten() {
            let normalized = self.normalize(Some(text.as_ref()));
            tally_categories(&normalized, &mut tally);
        }
        tally
    }

    /// Tally majority-vote sentiment; absent documents vote Neutral
    pub fn score_sentiment<I, S>(&self, corpus: I) -> SentimentTally
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut tally = SentimentTally::default();
        for text in corpus {
            tally.record(self.classify(text.as_ref().map(|t| t.as_ref())));
        }
        tally
    }

    /// Sentiment vote of one document
    #[must_use]
    pub fn classify(&self, text: Option<&str>) -> Sentiment {
        match text {
            Some(text) => self.classify_normalized(&self.normalize(Some(text))),
            None => Sentiment::Neutral,
        }
    }

    /// Run themes, categories and sentiment in one pass, normalizing each document once
    pub fn analyze<S: AsRef<str>>(&self, corpus: &[Option<S>], top_n: usize) -> CorpusAnalysis {
        let normalized: Vec<Option<String>> = corpus
            .iter()
            .map(|text| text.as_ref().map(|t| self.normalize(Some(t.as_ref()))))
            .collect();

        let mut categories = CategoryTally::default();
        let mut sentiment = SentimentTally::default();
        for doc in &normalized {
            match doc {
                Some(doc) => {
                    tally_categories(doc, &mut categories);
                    sentiment.record(self.classify_normalized(doc));
                }
                None => sentiment.record(Sentiment::Neutral),
            }
        }

        let themes = rank_themes(normalized.iter().flatten().map(String::as_str), top_n);
        debug!(
            documents = corpus.len(),
            themes = themes.len(),
            "Analyzed feedback corpus"
        );

        CorpusAnalysis {
            themes,
            categories,
            sentiment,
        }
    }

    fn classify_normalized(&self, normalized: &str) -> Sentiment {
        let (mut positive, mut negative) = (0usize, 0usize);
        for word in normalized.split_whitespace() {
            if self.positive_words.contains(word) {
                positive += 1;
            }
            if self.negative_words.contains(word) {
                negative += 1;
            }
        }

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }
}

fn tally_categories(normalized: &str, tally: &mut CategoryTally) {
    let words: HashSet<&str> = normalized.split_whitespace().collect();
    for category in Category::ALL {
        if category_keywords(category).iter().any(|k| words.contains(*k)) {
            tally.increment(category);
        }
    }
}

/// Count tokens across documents and keep the `top_n` most frequent
fn rank_themes<'a>(docs: impl Iterator<Item = &'a str>, top_n: usize) -> Vec<ThemeEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for word in docs.flat_map(str::split_whitespace) {
        match index.get(word) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    // Stable sort keeps first-encountered order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(top_n)
        .map(|(token, frequency)| ThemeEntry {
            token: token.to_string(),
            frequency,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TextAnalyzer {
        TextAnalyzer::new().expect("Failed to create text analyzer")
    }

    #[test]
    fn test_clean_text() {
        let analyzer = analyzer();

        assert_eq!(analyzer.clean_text("Hello, World! 123"), "hello world ");
        assert_eq!(analyzer.clean_text("well-organized"), "wellorganized");
        assert_eq!(analyzer.clean_text("don't"), "dont");
    }

    #[test]
    fn test_normalize_drops_stopwords_and_short_tokens() {
        let analyzer = analyzer();

        let normalized = analyzer.normalize(Some("The lab is on an old floor"));
        assert_eq!(normalized, "lab old floor");
    }

    #[test]
    fn test_normalize_absent_and_empty() {
        let analyzer = analyzer();

        assert_eq!(analyzer.normalize(None), "");
        assert_eq!(analyzer.normalize(Some("")), "");
        assert_eq!(analyzer.normalize(Some("!!! 42 ??")), "");
    }

    #[test]
    fn test_tokenize_splits_fused_words() {
        let analyzer = analyzer();

        assert_eq!(analyzer.tokenize("i cannot come"), ["i", "can", "not", "come"]);
        assert_eq!(analyzer.tokenize("gonna gotta gimme lemme"), [
            "gon", "na", "got", "ta", "gim", "me", "lem", "me"
        ]);
        assert_eq!(analyzer.tokenize("wanna go"), ["wan", "na", "go"]);
        assert_eq!(analyzer.tokenize("i wanna"), ["i", "wan", "na"]);
        // Only whole words split
        assert_eq!(analyzer.tokenize("wannabe cannoted"), ["wannabe", "cannoted"]);
    }

    #[test]
    fn test_stop_words_are_the_nltk_list() {
        let analyzer = analyzer();

        assert_eq!(analyzer.stopwords.len(), 179);
        assert!(analyzer.stopwords.contains("can"));
        assert!(analyzer.stopwords.contains("not"));
        assert!(!analyzer.stopwords.contains("library"));
    }

    #[test]
    fn test_normalize_lemmatizes_plurals() {
        let analyzer = analyzer();

        assert_eq!(
            analyzer.normalize(Some("Classrooms and computers in the libraries")),
            "classroom computer library"
        );
    }

    #[test]
    fn test_rank_themes_tie_break_is_first_seen() {
        let themes = rank_themes(["beta alpha", "alpha beta gamma"].into_iter(), 10);
        let tokens: Vec<_> = themes.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(tokens, ["beta", "alpha", "gamma"]);
        assert_eq!(themes[0].frequency, 2);
    }

    #[test]
    fn test_classify() {
        let analyzer = analyzer();

        assert_eq!(analyzer.classify(Some("Great and helpful")), Sentiment::Positive);
        assert_eq!(analyzer.classify(Some("Rude and unfair")), Sentiment::Negative);
        assert_eq!(analyzer.classify(Some("Good but boring")), Sentiment::Neutral);
        assert_eq!(analyzer.classify(Some("The room is blue")), Sentiment::Neutral);
        assert_eq!(analyzer.classify(None), Sentiment::Neutral);
    }
}
