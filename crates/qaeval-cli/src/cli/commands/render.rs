use super::super::args::RenderArgs;
use crate::exit_codes::SUCCESS;
use qaeval_core::judge::PromptTemplate;

pub fn run(args: RenderArgs) -> anyhow::Result<i32> {
    let template = PromptTemplate::load(&args.prompt_file)?;
    let rendered = template.render(&args.question, &args.answers, &args.candidate);

    if let Some(instruction) = &rendered.instruction {
        println!("--- instruction ---\n{}", instruction.trim_end());
    }
    println!("--- content ---\n{}", rendered.content);
    Ok(SUCCESS)
}
