/// File name of the cache for one (model, experiment) pair.
///
/// Path separators in either part are replaced so the name never escapes the
/// cache directory.
pub fn cache_file_name(model: &str, experiment: &str) -> String {
    let sanitize = |s: &str| s.replace(['/', '\\'], "-");
    format!("{}_{}.jsonl", sanitize(model), sanitize(experiment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_joins_model_and_experiment() {
        assert_eq!(cache_file_name("gpt-4", "test"), "gpt-4_test.jsonl");
    }

    #[test]
    fn separators_are_neutralised() {
        assert_eq!(
            cache_file_name("org/model", "../exp"),
            "org-model_..-exp.jsonl"
        );
    }
}
