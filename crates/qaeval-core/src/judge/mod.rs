mod judge_internal;

pub mod classify;
pub mod prompt;

pub use classify::{ClassifierProfile, PatternRule, PhraseRule, ResponseClassifier};
pub use prompt::{PromptTemplate, RenderedPrompt, INSTRUCTION_DELIMITER};

use crate::cache::ResponseCache;
use crate::errors::JudgeError;
use crate::model::{Candidate, Verdict};
use crate::providers::llm::retry::CompletionClient;
use crate::providers::llm::SamplingParams;

/// Outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub verdict: Verdict,
    pub response: String,
    /// Served from the response cache without a network call.
    pub cached: bool,
}

/// Sequential judge over a batch of candidates.
#[derive(Debug, Clone)]
pub struct JudgeService {
    template: PromptTemplate,
    classifier: ResponseClassifier,
    params: SamplingParams,
}

impl JudgeService {
    pub fn new(
        template: PromptTemplate,
        classifier: ResponseClassifier,
        params: SamplingParams,
    ) -> Self {
        Self {
            template,
            classifier,
            params,
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn classifier(&self) -> &ResponseClassifier {
        &self.classifier
    }

    /// Judge every candidate in input order, one call at a time.
    ///
    /// Unparseable responses are logged and returned; the batch only fails on
    /// a terminal client error or a cache write failure. Responses cached
    /// before the failure stay on disk.
    pub async fn judge_batch(
        &self,
        candidates: &[Candidate],
        client: &mut CompletionClient,
        cache: &mut ResponseCache,
    ) -> Result<Vec<Judgment>, JudgeError> {
        judge_internal::run::judge_batch_impl(self, candidates, client, cache, |_, _| Ok(())).await
    }

    /// Like [`JudgeService::judge_batch`], handing each judgment to
    /// `on_judgment` as soon as it is produced. A sink error stops the batch.
    pub async fn judge_batch_with<F>(
        &self,
        candidates: &[Candidate],
        client: &mut CompletionClient,
        cache: &mut ResponseCache,
        on_judgment: F,
    ) -> Result<Vec<Judgment>, JudgeError>
    where
        F: FnMut(&Candidate, &Judgment) -> std::io::Result<()>,
    {
        judge_internal::run::judge_batch_impl(self, candidates, client, cache, on_judgment).await
    }

    pub async fn judge_one(
        &self,
        candidate: &Candidate,
        client: &mut CompletionClient,
        cache: &mut ResponseCache,
    ) -> Result<Judgment, JudgeError> {
        judge_internal::run::judge_one_impl(self, candidate, client, cache).await
    }
}
