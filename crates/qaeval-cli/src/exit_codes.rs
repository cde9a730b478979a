//! Process exit codes. Part of the public contract of `qaeval`.

use qaeval_core::JudgeError;

pub const SUCCESS: i32 = 0;
/// A batch was aborted by the completion service (fatal error or retries exhausted).
pub const PROVIDER_ABORT: i32 = 1;
/// Bad config, prompt template, credentials, input or cache file.
pub const CONFIG_ERROR: i32 = 2;

pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<JudgeError>() {
        Some(JudgeError::ExhaustedRetries { .. } | JudgeError::Provider(_)) => PROVIDER_ABORT,
        _ => CONFIG_ERROR,
    }
}
