use crate::errors::ConfigError;
use std::path::Path;

/// Separates the reusable instruction preamble from the per-example body.
pub const INSTRUCTION_DELIMITER: &str = "###";

/// Judgment prompt template with `{q}`/`{question}`, `{answers}` and
/// `{candidate_answer}` slots. `{{` and `}}` render as literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    raw: String,
}

/// A rendered prompt. `content` is also the response cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub content: String,
    pub instruction: Option<String>,
}

impl PromptTemplate {
    /// Surrounding whitespace of the template is dropped.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self {
            raw: raw.as_ref().trim().to_string(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PromptTemplate {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn render(
        &self,
        question: &str,
        gold_answers: &[String],
        candidate_answer: &str,
    ) -> RenderedPrompt {
        let question = format_question(question);
        let answers = format_answers(gold_answers);
        let rendered = substitute(&self.raw, |slot| match slot {
            "q" | "question" => Some(question.as_str()),
            "answers" => Some(answers.as_str()),
            "candidate_answer" => Some(candidate_answer),
            _ => None,
        });
        split_instruction(rendered)
    }
}

/// Question text with a trailing `?` guaranteed.
pub fn format_question(question: &str) -> String {
    if question.ends_with('?') {
        question.to_string()
    } else {
        format!("{}?", question)
    }
}

/// Gold answers as `"a", "b"` in input order, duplicates kept.
pub fn format_answers(answers: &[String]) -> String {
    answers
        .iter()
        .map(|a| format!("\"{}\"", a))
        .collect::<Vec<_>>()
        .join(", ")
}

// Single pass so substituted values are never re-scanned for slots.
fn substitute<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                if let Some(value) = lookup(&tail[1..end]) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        // Unknown slot or stray brace: keep verbatim.
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

fn split_instruction(rendered: String) -> RenderedPrompt {
    match rendered.rsplit_once(INSTRUCTION_DELIMITER) {
        Some((instruction, content)) => RenderedPrompt {
            content: content.trim().to_string(),
            instruction: if instruction.is_empty() {
                None
            } else {
                Some(instruction.to_string())
            },
        },
        None => RenderedPrompt {
            content: rendered,
            instruction: None,
        },
    }
}
