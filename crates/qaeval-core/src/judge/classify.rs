//! Maps free-form judge responses to a [`Verdict`].
//!
//! Order matters: a yes/no prefix wins, then the pattern rules are tried in
//! sequence and the first match decides. A response nothing recognises is
//! [`Verdict::Unparseable`], never a silent "incorrect".

use crate::model::Verdict;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A regex that captures a yes/no token at `group`, anchored at the start of
/// the response. Compiled case-insensitive, multiline, dot-matches-newline.
#[derive(Debug)]
pub struct PatternRule {
    pub name: &'static str,
    regex: Regex,
    group: usize,
}

impl PatternRule {
    fn new(name: &'static str, body: &str, group: usize) -> Self {
        let regex = Regex::new(&format!(r"(?ims)\A{}", body)).unwrap();
        Self { name, regex, group }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn apply(&self, response: &str) -> Option<Verdict> {
        let caps = self.regex.captures(response)?;
        Verdict::from_token(caps.get(self.group)?.as_str())
    }
}

/// A lowercase phrase that decides the verdict when contained in the response.
#[derive(Debug, Clone, Copy)]
pub struct PhraseRule {
    pub phrase: &'static str,
    pub verdict: Verdict,
}

lazy_static! {
    static ref STANDARD_RULES: Vec<PatternRule> = vec![
        PatternRule::new("trailing_yes_no", r#".*['"]?(yes|no)\.?['"]?[.!]?$"#, 1),
        PatternRule::new(
            "my_judgment_is",
            r#".*my (final )?judgment is\s+['"]?(yes|no)['"]?[.!]?"#,
            2
        ),
        PatternRule::new(
            "would_judge_candidate_as",
            r#".*I would judge the candidate answer as\s+['"]?(yes|no)['"]?[.!]?"#,
            1
        ),
        PatternRule::new(
            "yes_no_the_candidate_is",
            r#".*\s+['"]?(yes|no)['"]?,? the candidate( answer)? is"#,
            1
        ),
        PatternRule::new("judgment_label", r#".*judgment:\s+['"]?(yes|no)\.?['"]?"#, 1),
    ];
}

const EXTENDED_PHRASES: &[PhraseRule] = &[
    PhraseRule {
        phrase: "candidate answer is correct",
        verdict: Verdict::Correct,
    },
    PhraseRule {
        phrase: "candidate answer is incorrect",
        verdict: Verdict::Incorrect,
    },
];

/// Rule set per judge deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProfile {
    /// Prefix check plus the five pattern rules.
    #[default]
    Standard,
    /// Standard, then the "candidate answer is (in)correct" phrases used by
    /// the locally hosted judge.
    Extended,
}

impl std::str::FromStr for ClassifierProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "extended" => Ok(Self::Extended),
            other => Err(format!(
                "unknown classifier profile '{}' (expected standard|extended)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseClassifier {
    profile: ClassifierProfile,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(ClassifierProfile::Standard)
    }
}

impl ResponseClassifier {
    pub fn new(profile: ClassifierProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> ClassifierProfile {
        self.profile
    }

    /// Pattern rules in priority order.
    pub fn rules(&self) -> &'static [PatternRule] {
        &STANDARD_RULES
    }

    /// Phrase rules tried after every pattern rule failed.
    pub fn phrases(&self) -> &'static [PhraseRule] {
        match self.profile {
            ClassifierProfile::Standard => &[],
            ClassifierProfile::Extended => EXTENDED_PHRASES,
        }
    }

    pub fn classify(&self, response: &str) -> Verdict {
        let lowered = response.to_lowercase();
        if lowered.starts_with("yes") {
            return Verdict::Correct;
        }
        if lowered.starts_with("no") {
            return Verdict::Incorrect;
        }

        if let Some(verdict) = self.rules().iter().find_map(|rule| rule.apply(response)) {
            return verdict;
        }

        self.phrases()
            .iter()
            .find(|rule| lowered.contains(rule.phrase))
            .map(|rule| rule.verdict)
            .unwrap_or(Verdict::Unparseable)
    }

    /// [`classify`](Self::classify), warning once when the response is unparseable.
    pub fn classify_logged(&self, response: &str, question: &str, candidate: &str) -> Verdict {
        let verdict = self.classify(response);
        if verdict == Verdict::Unparseable {
            warn!(
                question,
                candidate,
                response,
                "invalid judge response: no yes/no verdict recognised"
            );
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ResponseClassifier {
        ResponseClassifier::default()
    }

    #[test]
    fn prefix_rule_wins_regardless_of_tail() {
        let c = standard();
        assert_eq!(c.classify("Yes, but actually no."), Verdict::Correct);
        assert_eq!(c.classify("YES"), Verdict::Correct);
        assert_eq!(c.classify("no. The answer is yes"), Verdict::Incorrect);
        assert_eq!(c.classify("Nope"), Verdict::Incorrect);
    }

    #[test]
    fn trailing_answer_after_explanation() {
        let c = standard();
        let r = "Explanation: the pie tradition began in 1988. Answer based on explanation: yes.";
        assert_eq!(c.classify(r), Verdict::Correct);
        assert_eq!(c.rules()[0].apply(r), Some(Verdict::Correct));
    }

    #[test]
    fn judgment_label_is_incorrect() {
        assert_eq!(standard().classify("Judgment: No"), Verdict::Incorrect);
    }

    #[test]
    fn trailing_quoted_token() {
        let c = standard();
        assert_eq!(c.classify("The final answer is \"no\"!"), Verdict::Incorrect);
        assert_eq!(c.classify("After review:\n'Yes'."), Verdict::Correct);
    }

    #[test]
    fn final_judgment_phrase_uses_second_group() {
        let c = standard();
        let r = "Considering all aliases, my final judgment is \"yes\" since both match.";
        assert_eq!(c.rules()[0].apply(r), None);
        assert_eq!(c.rules()[1].apply(r), Some(Verdict::Correct));
        assert_eq!(c.classify(r), Verdict::Correct);
    }

    #[test]
    fn would_judge_phrase() {
        let r = "Given the evidence I would judge the candidate answer as no, as the date differs.";
        let c = standard();
        assert_eq!(c.rules()[2].apply(r), Some(Verdict::Incorrect));
        assert_eq!(c.classify(r), Verdict::Incorrect);
    }

    #[test]
    fn token_before_the_candidate_is() {
        let r = "I think yes, the candidate answer is a valid alias for the gold answer.";
        let c = standard();
        assert_eq!(c.rules()[3].apply(r), Some(Verdict::Correct));
        assert_eq!(c.classify(r), Verdict::Correct);
    }

    #[test]
    fn judgment_label_mid_response() {
        let r = "The gold answer is Paris.\nJudgment: yes. The candidate says Paris too";
        let c = standard();
        assert_eq!(c.rules()[4].apply(r), Some(Verdict::Correct));
        assert_eq!(c.classify(r), Verdict::Correct);
    }

    #[test]
    fn unrecognised_text_is_unparseable() {
        let c = standard();
        assert_eq!(
            c.classify("The candidate mentions a related film."),
            Verdict::Unparseable
        );
        assert_eq!(c.classify(""), Verdict::Unparseable);
    }

    #[test]
    fn extended_profile_adds_phrase_rules_last() {
        let r = "Having compared both, the candidate answer is correct given the context";
        assert_eq!(standard().classify(r), Verdict::Unparseable);

        let extended = ResponseClassifier::new(ClassifierProfile::Extended);
        assert_eq!(extended.classify(r), Verdict::Correct);
        assert_eq!(
            extended.classify("Overall the Candidate Answer is incorrect because of the year"),
            Verdict::Incorrect
        );
        // pattern rules still take priority
        assert_eq!(
            extended.classify("The candidate answer is correct. Judgment: no"),
            Verdict::Incorrect
        );
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = standard().rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "trailing_yes_no",
                "my_judgment_is",
                "would_judge_candidate_as",
                "yes_no_the_candidate_is",
                "judgment_label",
            ]
        );
        assert!(standard().rules()[0].pattern().starts_with(r"(?ims)\A"));
    }

    #[test]
    fn profile_parses_from_str() {
        assert_eq!(
            "Extended".parse::<ClassifierProfile>().unwrap(),
            ClassifierProfile::Extended
        );
        assert!("lenient".parse::<ClassifierProfile>().is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn yes_no_prefix_decides_whatever_follows(
                prefix in "[Yy][Ee][Ss]|[Nn][Oo]",
                tail in "(?s).{0,120}",
                extended in any::<bool>(),
            ) {
                let profile = if extended {
                    ClassifierProfile::Extended
                } else {
                    ClassifierProfile::Standard
                };
                let expected = if prefix.eq_ignore_ascii_case("yes") {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                };
                let response = format!("{}{}", prefix, tail);
                assert_eq!(ResponseClassifier::new(profile).classify(&response), expected);
            }
        }
    }
}
