//! LLM access: a retrying `awful_aj` client and the digest [`Summarizer`].
//!
//! - [`AskAsync`]: core trait for one async LLM round-trip
//! - [`AskFnWrapper`]: wraps `awful_aj::api::ask`
//! - [`RetryAsk`]: decorator adding exponential backoff with jitter
//! - [`LlmSummarizer`]: builds the digest prompt and returns the model's JSON text
//!
//! Backoff doubles from one second, is capped at 30 seconds and adds
//! 0-250 ms of random jitter per attempt.

use crate::models::ArticleRecord;
use crate::pipeline::Summarizer;
use crate::prompts::digest_prompt;
use crate::utils::{looks_truncated, strip_code_fence, truncate_for_log};
use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Trait for async LLM interaction.
///
/// Lets the retry decorator and the summarizer run against any backend.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let factor = 1u32
            .checked_shl((attempt - 1) as u32)
            .unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Wrapper around `awful_aj::api::ask` that implements [`AskAsync`].
#[derive(Debug)]
pub struct AskFnWrapper<'a> {
    /// LLM endpoint, model and credentials.
    pub config: &'a AwfulJadeConfig,
    /// Chat template defining the system prompt and conversation shape.
    pub template: &'a ChatTemplate,
}

impl<'a> AskAsync for AskFnWrapper<'a> {
    type Response = String;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = ask(self.config, text.to_string(), self.template, None, None).await;
        let dt = t0.elapsed();

        match &res {
            Ok(_) => debug!(elapsed_ms = dt.as_millis() as u128, "API call succeeded"),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u128, error = %e, "API call failed"),
        }
        res
    }
}

/// Ask for a JSON reply, re-asking once when the first reply looks cut off.
///
/// Code fences around the reply are stripped. The text is returned even when
/// it is not valid JSON; judging its shape is the summary validator's job.
#[instrument(level = "info", skip_all)]
pub async fn ask_for_json<A>(api: &A, prompt: &str) -> Result<String, Box<dyn Error>>
where
    A: AskAsync<Response = String>,
{
    let t0 = Instant::now();
    let first = api.ask(prompt).await?;
    let mut reply = strip_code_fence(&first).to_string();

    if let Err(e) = serde_json::from_str::<serde_json::Value>(&reply) {
        if looks_truncated(&e) {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(&reply, 300),
                "EOF while parsing; re-asking once"
            );
            match api.ask(prompt).await {
                Ok(second) => reply = strip_code_fence(&second).to_string(),
                Err(e2) => warn!(error = %e2, "Re-ask failed; keeping first reply"),
            }
        }
    }

    info!(
        elapsed_ms_total = t0.elapsed().as_millis() as u128,
        bytes = reply.len(),
        "Received digest reply"
    );
    Ok(reply)
}

/// [`Summarizer`] backed by an OpenAI-compatible endpoint through `awful_aj`.
#[derive(Debug)]
pub struct LlmSummarizer {
    config: AwfulJadeConfig,
    template: ChatTemplate,
    max_retries: usize,
}

impl LlmSummarizer {
    pub fn new(config: AwfulJadeConfig, template: ChatTemplate, max_retries: usize) -> Self {
        Self {
            config,
            template,
            max_retries,
        }
    }
}

impl Summarizer for LlmSummarizer {
    #[instrument(level = "info", skip_all, fields(topic = %topic, articles = articles.len()))]
    async fn summarize(
        &self,
        topic: &str,
        articles: &[ArticleRecord],
    ) -> Result<String, Box<dyn Error>> {
        let prompt = digest_prompt(topic, articles)?;
        debug!(prompt_bytes = prompt.len(), "Built digest prompt");

        let client = AskFnWrapper {
            config: &self.config,
            template: &self.template,
        };
        let api = RetryAsk::new(client, self.max_retries, StdDuration::from_secs(1));
        ask_for_json(&api, &prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Plays back a fixed list of replies, one per call.
    #[derive(Debug)]
    struct Scripted {
        replies: RefCell<VecDeque<Result<String, String>>>,
        calls: RefCell<usize>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: RefCell::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl AskAsync for Scripted {
        type Response = String;

        async fn ask(&self, _text: &str) -> Result<String, Box<dyn Error>> {
            *self.calls.borrow_mut() += 1;
            match self.replies.borrow_mut().pop_front() {
                Some(Ok(r)) => Ok(r),
                Some(Err(e)) => Err(e.into()),
                None => Err("script exhausted".into()),
            }
        }
    }

    #[tokio::test]
    async fn test_retry_ask_recovers_after_failures() {
        let inner = Scripted::new(vec![Err("503"), Err("timeout"), Ok("{}")]);
        let api = RetryAsk::new(inner, 3, StdDuration::from_millis(1));
        assert_eq!(api.ask("prompt").await.unwrap(), "{}");
        assert_eq!(api.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_ask_gives_up_after_max_retries() {
        let inner = Scripted::new(vec![Err("503"), Err("503"), Err("503")]);
        let api = RetryAsk::new(inner, 1, StdDuration::from_millis(1));
        let err = api.ask("prompt").await.unwrap_err();
        assert_eq!(err.to_string(), "503");
        assert_eq!(api.inner.calls(), 2);
    }

    #[test]
    fn test_backoff_is_capped() {
        let api = RetryAsk::new(Scripted::new(vec![]), 64, StdDuration::from_secs(1));
        let delay = api.backoff(40);
        assert!(delay >= StdDuration::from_secs(30));
        assert!(delay <= StdDuration::from_millis(30_250));
    }

    #[tokio::test]
    async fn test_ask_for_json_strips_fence() {
        let api = Scripted::new(vec![Ok("```json\n{\"topic\": \"T\"}\n```")]);
        let reply = ask_for_json(&api, "prompt").await.unwrap();
        assert_eq!(reply, "{\"topic\": \"T\"}");
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_ask_for_json_reasks_once_on_truncation() {
        let api = Scripted::new(vec![Ok("{\"topic\": \"T\", \"summ"), Ok("{\"topic\": \"T\"}")]);
        let reply = ask_for_json(&api, "prompt").await.unwrap();
        assert_eq!(reply, "{\"topic\": \"T\"}");
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_ask_for_json_keeps_non_json_without_reasking() {
        let api = Scripted::new(vec![Ok("I could not find any news.")]);
        let reply = ask_for_json(&api, "prompt").await.unwrap();
        assert_eq!(reply, "I could not find any news.");
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_ask_for_json_keeps_first_reply_when_reask_fails() {
        let api = Scripted::new(vec![Ok("{\"topic\": "), Err("503")]);
        let reply = ask_for_json(&api, "prompt").await.unwrap();
        assert_eq!(reply, "{\"topic\":");
    }
}
