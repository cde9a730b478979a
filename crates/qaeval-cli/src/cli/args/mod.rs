use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod common;
pub use common::*;

#[derive(Parser)]
#[command(
    name = "qaeval",
    version,
    about = "LLM-as-judge evaluation of open-domain QA answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Judge a JSONL file of candidate answers
    Judge(JudgeArgs),
    /// Classify a single judge response
    Classify(ClassifyArgs),
    /// Render the judgment prompt for one candidate
    Render(RenderArgs),
    Version,
}

#[derive(clap::Args, Clone, Debug)]
pub struct JudgeArgs {
    /// Candidates: one JSON object per line with question, answers, candidate_answer
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Results JSONL. Default: <input stem>_eval-<model>.jsonl next to the input
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Backend for completion calls
    /// - openai: live calls (OPENAI_API_KEY, or AZURE_OPENAI_KEY in alternate mode)
    /// - fake: canned response, no network (dry runs)
    #[arg(long, value_enum, default_value_t = Provider::Openai, env = "QAEVAL_PROVIDER")]
    pub provider: Provider,

    /// Response returned by --provider fake
    #[arg(long, default_value = "yes")]
    pub fake_response: String,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// Judge response text, classified as given. Read from stdin when
    /// omitted; only the final line ending of stdin is dropped
    pub response: Option<String>,

    #[arg(long, value_enum, default_value_t = ClassifierArg::Standard)]
    pub classifier: ClassifierArg,

    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct RenderArgs {
    #[arg(long)]
    pub prompt_file: PathBuf,

    #[arg(long, short = 'q')]
    pub question: String,

    /// Gold answer; repeat for several
    #[arg(long = "answer", short = 'a')]
    pub answers: Vec<String>,

    #[arg(long, short = 'c')]
    pub candidate: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn judge_args_parse_overrides() {
        let cli = Cli::try_parse_from([
            "qaeval",
            "judge",
            "--input",
            "in.jsonl",
            "--model",
            "gpt-4",
            "--experiment",
            "nq",
            "--overwrite-cache",
            "--max-attempts",
            "2",
            "--provider",
            "fake",
        ])
        .unwrap();
        match cli.cmd {
            Command::Judge(args) => {
                assert_eq!(args.input, PathBuf::from("in.jsonl"));
                assert_eq!(args.model.model.as_deref(), Some("gpt-4"));
                assert_eq!(args.model.experiment.as_deref(), Some("nq"));
                assert!(args.model.overwrite_cache);
                assert_eq!(args.model.max_attempts, Some(2));
                assert_eq!(args.provider, Provider::Fake);
            }
            _ => panic!("expected judge command"),
        }
    }

    #[test]
    fn render_collects_repeated_answers() {
        let cli = Cli::try_parse_from([
            "qaeval",
            "render",
            "--prompt-file",
            "p.txt",
            "-q",
            "who wrote hamlet",
            "-a",
            "Shakespeare",
            "-a",
            "William Shakespeare",
            "-c",
            "Marlowe",
        ])
        .unwrap();
        match cli.cmd {
            Command::Render(args) => {
                assert_eq!(args.answers, vec!["Shakespeare", "William Shakespeare"]);
            }
            _ => panic!("expected render command"),
        }
    }
}
