use super::super::args::ClassifyArgs;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use qaeval_core::judge::ResponseClassifier;
use std::io::Read;

pub fn run(args: ClassifyArgs) -> anyhow::Result<i32> {
    let response = match args.response {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read response from stdin")?;
            strip_line_ending(&mut buf);
            buf
        }
    };

    let verdict = ResponseClassifier::new(args.classifier.into()).classify(&response);
    if args.json {
        println!(
            "{}",
            serde_json::json!({ "verdict": verdict, "score": verdict.score() })
        );
    } else {
        println!("{}", verdict);
    }
    Ok(SUCCESS)
}

/// Drop the single line ending a pipe or heredoc appends; nothing else.
fn strip_line_ending(buf: &mut String) {
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
}
