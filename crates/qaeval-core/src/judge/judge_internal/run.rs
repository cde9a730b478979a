use crate::cache::ResponseCache;
use crate::errors::JudgeError;
use crate::judge::{JudgeService, Judgment};
use crate::model::Candidate;
use crate::providers::llm::retry::CompletionClient;
use tracing::{debug, info};

pub(crate) async fn judge_batch_impl<F>(
    svc: &JudgeService,
    candidates: &[Candidate],
    client: &mut CompletionClient,
    cache: &mut ResponseCache,
    mut on_judgment: F,
) -> Result<Vec<Judgment>, JudgeError>
where
    F: FnMut(&Candidate, &Judgment) -> std::io::Result<()>,
{
    let mut judgments = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let judgment = judge_one_impl(svc, candidate, client, cache).await?;
        on_judgment(candidate, &judgment).map_err(JudgeError::Sink)?;
        judgments.push(judgment);
    }

    let hits = judgments.iter().filter(|j| j.cached).count();
    let unparseable = judgments
        .iter()
        .filter(|j| !j.verdict.is_parseable())
        .count();
    let usage = client.usage_summary(false);
    info!(
        model = client.model(),
        candidates = candidates.len(),
        cache_hits = hits,
        unparseable,
        num_calls = usage.num_calls,
        num_errors = usage.num_errors,
        total_tokens = usage.total_tokens,
        mean_call_secs = usage.mean_call_secs.unwrap_or(0.0),
        "judge batch finished"
    );

    Ok(judgments)
}

pub(crate) async fn judge_one_impl(
    svc: &JudgeService,
    candidate: &Candidate,
    client: &mut CompletionClient,
    cache: &mut ResponseCache,
) -> Result<Judgment, JudgeError> {
    let question = candidate.question();
    let prompt = svc
        .template
        .render(question.text(), question.answers(), candidate.answer());

    let (response, cached) = match cache.get(&prompt.content) {
        Some(hit) => {
            debug!(
                question_id = question.id(),
                cache_path = %cache.path().display(),
                "judge cache hit"
            );
            (hit.to_string(), true)
        }
        None => {
            let text = client
                .complete(&prompt.content, prompt.instruction.as_deref(), &svc.params)
                .await?;
            cache.put(&prompt.content, &text)?;
            (text, false)
        }
    };

    let verdict = svc
        .classifier
        .classify_logged(&response, question.text(), candidate.answer());

    Ok(Judgment {
        verdict,
        response,
        cached,
    })
}
