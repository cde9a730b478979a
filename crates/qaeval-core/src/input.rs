//! Candidate input: one JSON object per line.
//!
//! ```text
//! {"id": "q1", "question": "who wrote hamlet", "answers": ["Shakespeare"], "candidate_answer": "Marlowe"}
//! ```
//!
//! `id` is optional and defaults to the zero-based record index.

use crate::errors::InputError;
use crate::model::{Candidate, Question};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CandidateRecord {
    #[serde(default)]
    id: Option<String>,
    question: String,
    #[serde(default)]
    answers: Vec<String>,
    candidate_answer: String,
}

pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_candidates(&raw, path)
}

fn parse_candidates(raw: &str, path: &Path) -> Result<Vec<Candidate>, InputError> {
    let mut out = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: CandidateRecord =
            serde_json::from_str(line).map_err(|source| InputError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        let id = record.id.unwrap_or_else(|| out.len().to_string());
        out.push(Candidate::new(
            Question::new(id, record.question, record.answers),
            record.candidate_answer,
        ));
    }
    Ok(out)
}
