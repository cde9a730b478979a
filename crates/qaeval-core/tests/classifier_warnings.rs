//! Warning capture: unparseable judgments surface as exactly one WARN event
//! and never abort a batch.

use std::sync::{Arc, Mutex};

use qaeval_core::cache::ResponseCache;
use qaeval_core::judge::{ClassifierProfile, JudgeService, PromptTemplate, ResponseClassifier};
use qaeval_core::providers::llm::fake::FakeClient;
use qaeval_core::providers::llm::retry::{CompletionClient, RetryPolicy};
use qaeval_core::providers::llm::SamplingParams;
use qaeval_core::{Candidate, ProviderError, Question, Verdict};
use proptest::prelude::*;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct MockWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MockWriter {
    type Writer = MockWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn setup_capture() -> (MockWriter, tracing::subscriber::DefaultGuard) {
    let writer = MockWriter {
        buf: Arc::new(Mutex::new(Vec::new())),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .json()
        .finish();

    (writer, tracing::subscriber::set_default(subscriber))
}

fn events(writer: &MockWriter) -> Vec<serde_json::Value> {
    let output = String::from_utf8(writer.buf.lock().unwrap().clone()).unwrap();
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn warnings(writer: &MockWriter) -> Vec<serde_json::Value> {
    events(writer)
        .into_iter()
        .filter(|e| e["level"] == "WARN")
        .collect()
}

#[test]
fn unparseable_emits_exactly_one_warning() {
    let (writer, _guard) = setup_capture();

    let verdict = ResponseClassifier::default().classify_logged(
        "The candidate mentions a related film.",
        "which film won best picture",
        "Titanic",
    );

    assert_eq!(verdict, Verdict::Unparseable);
    let warns = warnings(&writer);
    assert_eq!(warns.len(), 1, "expected one warning, got {:?}", warns);
    assert_eq!(
        warns[0]["fields"]["response"],
        "The candidate mentions a related film."
    );
    assert_eq!(warns[0]["fields"]["candidate"], "Titanic");
}

#[test]
fn parseable_responses_emit_no_warning() {
    let (writer, _guard) = setup_capture();

    let classifier = ResponseClassifier::default();
    for response in ["Yes", "no.", "Judgment: No", "my judgment is yes"] {
        assert!(classifier
            .classify_logged(response, "q", "c")
            .is_parseable());
    }

    assert!(warnings(&writer).is_empty());
}

proptest! {
    // Without an `n` or `y` no yes/no token, prefix or phrase can appear.
    #[test]
    fn text_without_verdict_tokens_is_unparseable_with_one_warning(
        response in r#"[a-mo-xzA-MO-XZ0-9 ,.:;!?'"\n-]{0,120}"#,
        extended in any::<bool>(),
    ) {
        let (writer, _guard) = setup_capture();
        let profile = if extended {
            ClassifierProfile::Extended
        } else {
            ClassifierProfile::Standard
        };

        let verdict = ResponseClassifier::new(profile).classify_logged(&response, "q", "c");

        assert_eq!(verdict, Verdict::Unparseable);
        assert_eq!(warnings(&writer).len(), 1);
    }
}

#[tokio::test]
async fn batch_continues_past_unparseable_and_logs_usage() {
    let (writer, _guard) = setup_capture();
    let tmp = tempfile::tempdir().unwrap();

    let fake = Arc::new(FakeClient::new("gpt-4").with_script(vec![
        Ok("maybe".into()),
        Err(ProviderError::RateLimited {
            message: "slow down".into(),
        }),
        Ok("yes".into()),
    ]));
    let mut client = CompletionClient::new(fake, RetryPolicy::immediate(3));
    let mut cache = ResponseCache::open(tmp.path(), "gpt-4", "warn", false).unwrap();
    let svc = JudgeService::new(
        PromptTemplate::new("Q: {q} A: {answers} C: {candidate_answer}"),
        ResponseClassifier::default(),
        SamplingParams::default(),
    );
    let batch = vec![
        Candidate::new(Question::new("a", "first", vec!["x".into()]), "x"),
        Candidate::new(Question::new("b", "second", vec!["y".into()]), "y"),
    ];

    let judgments = svc
        .judge_batch(&batch, &mut client, &mut cache)
        .await
        .unwrap();
    assert_eq!(judgments[0].verdict, Verdict::Unparseable);
    assert_eq!(judgments[1].verdict, Verdict::Correct);

    let warns = warnings(&writer);
    assert_eq!(warns.len(), 2, "one unparseable warning and one retry warning");
    assert_eq!(warns[0]["fields"]["response"], "maybe");
    assert_eq!(warns[1]["fields"]["attempt"], 1);

    let finished: Vec<_> = events(&writer)
        .into_iter()
        .filter(|e| e["level"] == "INFO" && e["fields"]["message"] == "judge batch finished")
        .collect();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0]["fields"]["num_errors"], 1);
    assert_eq!(finished[0]["fields"]["num_calls"], 2);
}
