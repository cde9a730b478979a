use super::super::args::JudgeArgs;
use super::client_builder::build_client;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use qaeval_core::cache::ResponseCache;
use qaeval_core::config::{load_config, JudgeConfig};
use qaeval_core::input::read_candidates;
use qaeval_core::judge::{JudgeService, PromptTemplate, ResponseClassifier};
use qaeval_core::report::console::format_summary;
use qaeval_core::report::jsonl::{ResultRow, ResultWriter};
use qaeval_core::report::VerdictTally;
use qaeval_core::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(args: JudgeArgs) -> anyhow::Result<i32> {
    let mut cfg = match &args.model.config {
        Some(path) => load_config(path)?,
        None => JudgeConfig::default(),
    };
    args.model.apply(&mut cfg);
    cfg.validate()?;

    let prompt_file = cfg.prompt_file.clone().ok_or_else(|| {
        ConfigError::Invalid("prompt_file is required (--prompt-file or config)".into())
    })?;
    let template = PromptTemplate::load(&prompt_file)?;

    let candidates = read_candidates(&args.input)?;
    let mut client = build_client(&cfg, &args)?;
    let mut cache =
        ResponseCache::open(&cfg.cache_dir, &cfg.model, &cfg.experiment, cfg.overwrite_cache)?;

    info!(
        model = %cfg.model,
        experiment = %cfg.experiment,
        candidates = candidates.len(),
        cached = cache.len(),
        cache_path = %cache.path().display(),
        "starting judge run"
    );

    let svc = JudgeService::new(
        template,
        ResponseClassifier::new(cfg.classifier),
        cfg.sampling(),
    );
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, &cfg.model));
    let mut writer = ResultWriter::create(&output)
        .with_context(|| format!("failed to create results file {}", output.display()))?;

    let judgments = svc
        .judge_batch_with(&candidates, &mut client, &mut cache, |candidate, judgment| {
            writer.write_row(&ResultRow::new(candidate, judgment))
        })
        .await
        .with_context(|| {
            format!(
                "judge run aborted after {} results (written to {}); responses so far are kept in {}",
                writer.rows_written(),
                output.display(),
                cache.path().display()
            )
        })?;

    let tally = VerdictTally::from_judgments(&judgments);
    let usage = client.usage_summary(true);
    if args.json {
        let summary = serde_json::json!({
            "model": cfg.model,
            "experiment": cfg.experiment,
            "output": output,
            "verdicts": tally,
            "accuracy": tally.accuracy(),
            "usage": usage,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", format_summary(&cfg.model, &tally, &usage));
        println!("results: {}", output.display());
    }

    Ok(SUCCESS)
}

/// `<dir>/<input stem>_eval-<model>.jsonl`
fn default_output_path(input: &Path, model: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "candidates".to_string());
    let name = format!("{}_eval-{}.jsonl", stem, model.replace(['/', '\\'], "-"));
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_lands_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("data/nq-dev.jsonl"), "gpt-4"),
            PathBuf::from("data/nq-dev_eval-gpt-4.jsonl")
        );
        assert_eq!(
            default_output_path(Path::new("in.jsonl"), "org/model"),
            PathBuf::from("in_eval-org-model.jsonl")
        );
    }
}
