use serde::{Deserialize, Serialize};

/// A question with its acceptable gold answers.
///
/// An empty answer list means "no acceptable answer annotated", which is not
/// the same as "every answer is wrong".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: String,
    text: String,
    answers: Vec<String>,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, answers: Vec<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            answers,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn has_annotated_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    /// Swap in answers from a secondary annotation pass.
    pub fn replace_answers(&mut self, answers: Vec<String>) {
        self.answers = answers;
    }
}

/// A candidate answer submitted for judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    question: Question,
    answer: String,
}

impl Candidate {
    pub fn new(question: Question, answer: impl Into<String>) -> Self {
        Self {
            question,
            answer: answer.into(),
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// The judge's decision for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    /// No rule recognised a yes/no in the response.
    Unparseable,
}

impl Verdict {
    /// Score reported for [`Verdict::Unparseable`]; outside {0, 1} so
    /// aggregation can tell it apart from an incorrect answer.
    pub const UNPARSEABLE_SCORE: i8 = -1;

    pub fn score(self) -> i8 {
        match self {
            Verdict::Correct => 1,
            Verdict::Incorrect => 0,
            Verdict::Unparseable => Self::UNPARSEABLE_SCORE,
        }
    }

    pub fn is_parseable(self) -> bool {
        !matches!(self, Verdict::Unparseable)
    }

    /// Maps a captured "yes"/"no" token (any case) to a verdict.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("yes") {
            Some(Verdict::Correct)
        } else if token.eq_ignore_ascii_case("no") {
            Some(Verdict::Incorrect)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
            Verdict::Unparseable => "unparseable",
        };
        f.write_str(s)
    }
}

/// Result of one successful completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    /// `usage.total_tokens` as reported by the service, if any.
    pub total_tokens: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_answers_keeps_identity() {
        let mut q = Question::new("q1", "who wrote hamlet", vec!["Shakespeare".into()]);
        q.replace_answers(vec!["William Shakespeare".into(), "Shakespeare".into()]);
        assert_eq!(q.id(), "q1");
        assert_eq!(q.text(), "who wrote hamlet");
        assert_eq!(q.answers(), ["William Shakespeare", "Shakespeare"]);
    }

    #[test]
    fn empty_answers_are_unannotated() {
        let q = Question::new("q2", "what is the answer", Vec::new());
        assert!(!q.has_annotated_answers());
    }

    #[test]
    fn verdict_scores_keep_unparseable_out_of_binary_range() {
        assert_eq!(Verdict::Correct.score(), 1);
        assert_eq!(Verdict::Incorrect.score(), 0);
        assert_eq!(Verdict::Unparseable.score(), -1);
        assert!(!Verdict::Unparseable.is_parseable());
    }

    #[test]
    fn verdict_tokens_are_case_insensitive() {
        assert_eq!(Verdict::from_token("YES"), Some(Verdict::Correct));
        assert_eq!(Verdict::from_token("No"), Some(Verdict::Incorrect));
        assert_eq!(Verdict::from_token("maybe"), None);
    }

    #[test]
    fn verdict_serializes_lowercase() {
        let json = serde_json::to_string(&Verdict::Unparseable).unwrap();
        assert_eq!(json, "\"unparseable\"");
    }
}
