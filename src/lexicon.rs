//! Word lists driving normalization, categorization and sentiment scoring
//!
//! This is the single table of record for keywords and lexicons: the
//! analyzer, the dataset analyzer and the tests all read from here. Stop words
//! come from the NLTK English list in the `stop-words` crate.

use crate::models::Category;

const ACADEMIC_KEYWORDS: &[&str] = &[
    "grade", "grading", "exam", "test", "assignment", "homework", "difficult", "hard",
    "easy", "content", "material", "lecture", "teaching", "explain", "understand",
    "professor", "teacher", "class", "course",
];

const ADMINISTRATIVE_KEYWORDS: &[&str] = &[
    "registration", "enroll", "schedule", "office", "hour", "response", "email",
    "communication", "policy", "requirement", "staff", "service", "process",
];

const FACILITIES_KEYWORDS: &[&str] = &[
    "classroom", "room", "building", "equipment", "technology", "computer", "projector",
    "space", "environment", "library", "lab", "facility",
];

const WELFARE_KEYWORDS: &[&str] = &[
    "help", "support", "care", "concern", "stress", "mental", "health", "safety",
    "harassment", "discrimination", "welfare", "counseling",
];

/// Words that vote a document Positive
pub const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "love", "best", "fantastic",
    "wonderful", "helpful", "easy", "clear", "interesting", "fun", "recommend",
    "satisfied", "happy", "pleased",
];

/// Words that vote a document Negative
pub const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "worst", "boring", "difficult", "hard",
    "confusing", "unclear", "unhelpful", "rude", "unfair", "poor", "disappointed",
    "frustrated", "angry",
];

/// Keyword list that marks a document as belonging to `category`
#[must_use]
pub const fn category_keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::AcademicIssues => ACADEMIC_KEYWORDS,
        Category::AdministrativeIssues => ADMINISTRATIVE_KEYWORDS,
        Category::Facilities => FACILITIES_KEYWORDS,
        Category::StudentWelfare => WELFARE_KEYWORDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_keywords() {
        for category in Category::ALL {
            assert!(!category_keywords(category).is_empty());
        }
    }

    #[test]
    fn test_lexicons_are_lowercase_alpha() {
        for word in POSITIVE_WORDS.iter().chain(NEGATIVE_WORDS) {
            assert!(word.chars().all(|c| c.is_ascii_lowercase()), "{word}");
        }
    }
}
