use crate::report::VerdictTally;
use crate::stats::UsageSummary;

/// Human-readable batch summary for the terminal.
#[must_use]
pub fn format_summary(model: &str, tally: &VerdictTally, usage: &UsageSummary) -> String {
    let accuracy = tally
        .accuracy()
        .map_or_else(|| "n/a".to_string(), |a| format!("{:.2}%", a * 100.0));
    let mut out = format!(
        "model: {}\njudged: {} (correct {}, incorrect {}, unparseable {})\naccuracy: {}\nusage: {}",
        model,
        tally.total(),
        tally.correct,
        tally.incorrect,
        tally.unparseable,
        accuracy,
        usage
    );
    if tally.unparseable > 0 {
        out.push_str("\nnote: unparseable verdicts are excluded from accuracy");
    }
    out
}
