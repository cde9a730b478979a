//! Per-candidate results sink.

use crate::judge::Judgment;
use crate::model::{Candidate, Verdict};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: String,
    pub question: String,
    pub answers: Vec<String>,
    pub candidate_answer: String,
    pub verdict: Verdict,
    /// 1, 0, or -1 for unparseable.
    pub score: i8,
    pub response: String,
}

impl ResultRow {
    pub fn new(candidate: &Candidate, judgment: &Judgment) -> Self {
        let question = candidate.question();
        Self {
            id: question.id().to_string(),
            question: question.text().to_string(),
            answers: question.answers().to_vec(),
            candidate_answer: candidate.answer().to_string(),
            verdict: judgment.verdict,
            score: judgment.verdict.score(),
            response: judgment.response.clone(),
        }
    }
}

/// Writes one JSON object per line, flushed per row.
pub struct ResultWriter<W: Write> {
    out: W,
    rows: usize,
}

impl ResultWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, rows: 0 }
    }

    pub fn write_row(&mut self, row: &ResultRow) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, row)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Rows for a whole batch; `candidates` and `judgments` are paired by position.
    pub fn write_batch(
        &mut self,
        candidates: &[Candidate],
        judgments: &[Judgment],
    ) -> std::io::Result<()> {
        for (candidate, judgment) in candidates.iter().zip(judgments) {
            self.write_row(&ResultRow::new(candidate, judgment))?;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    #[test]
    fn rows_carry_sentinel_score() {
        let candidate = Candidate::new(
            Question::new("7", "who wrote hamlet", vec!["Shakespeare".into()]),
            "Marlowe",
        );
        let judgment = Judgment {
            verdict: Verdict::Unparseable,
            response: "hard to say".into(),
            cached: false,
        };

        let mut writer = ResultWriter::new(Vec::new());
        writer
            .write_batch(std::slice::from_ref(&candidate), std::slice::from_ref(&judgment))
            .unwrap();
        assert_eq!(writer.rows_written(), 1);

        let raw = String::from_utf8(writer.into_inner()).unwrap();
        let row: ResultRow = serde_json::from_str(raw.trim_end()).unwrap();
        assert_eq!(row.score, -1);
        assert_eq!(row.verdict, Verdict::Unparseable);
        assert_eq!(row.id, "7");
        assert_eq!(row.answers, vec!["Shakespeare".to_string()]);

        let value: serde_json::Value = serde_json::from_str(raw.trim_end()).unwrap();
        assert_eq!(value["verdict"], "unparseable");
    }
}
