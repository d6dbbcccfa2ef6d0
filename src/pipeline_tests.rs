//! Tests for the host-facing pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;
use crate::backend::{BackendError, GenerateRequest, GenerateResponse};
use crate::config::MapEnv;
use crate::engine::{Turn, TOTAL_FAILURE_NOTICE};

/// Fixed reply per seed; seeds listed in `failing` return HTTP 503.
struct SeededBackend {
    failing: Vec<u64>,
    calls: AtomicUsize,
}

impl SeededBackend {
    fn new(failing: Vec<u64>) -> Self {
        Self { failing, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl GenerationBackend for SeededBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let seed = request.options.seed;
        if self.failing.contains(&seed) {
            return Err(BackendError::Status { status: 503, body: "overloaded".into() });
        }
        // Seed 2 is the fastest path.
        let eval_count = if seed == 2 { 80 } else { 40 };
        Ok(GenerateResponse {
            response: format!("path {}", seed),
            done: true,
            eval_count: Some(eval_count),
            eval_duration: Some(1_000),
            ..Default::default()
        })
    }
}

fn overrides(k: usize, debug: bool) -> ConfigOverrides {
    ConfigOverrides { model: Some("llama3.2".into()), k: Some(k), debug: Some(debug), ..Default::default() }
}

fn pipeline(backend: SeededBackend, overrides: ConfigOverrides) -> Pipeline<SeededBackend> {
    Pipeline::with_env(backend, overrides, Arc::new(MapEnv::new()))
}

#[tokio::test]
async fn test_pipe_selects_highest_confidence() {
    let p = pipeline(SeededBackend::new(vec![]), overrides(4, false));
    let outcome = p.pipe("cot", &Conversation::single("What is 2+2?")).await.unwrap();

    assert_eq!(outcome.answer, "path 2");
    assert_eq!(outcome.winner_index, 2);
    assert!(outcome.trace.is_none());
    assert_eq!(outcome.render(), "path 2");
    assert_eq!(outcome.selection.candidates().len(), 4);
}

#[tokio::test]
async fn test_pipe_is_deterministic() {
    let p = pipeline(SeededBackend::new(vec![0]), overrides(5, false));
    let conversation = Conversation::new(vec![Turn::user("a"), Turn::assistant("b"), Turn::user("c")]);

    let first = p.pipe("cot", &conversation).await.unwrap();
    let second = p.pipe("cot", &conversation).await.unwrap();
    assert_eq!(first.answer, second.answer);
    assert_eq!(first.selection.winner(), second.selection.winner());
}

#[tokio::test]
async fn test_debug_attaches_trace_without_changing_answer() {
    let quiet = pipeline(SeededBackend::new(vec![1]), overrides(3, false));
    let verbose = pipeline(SeededBackend::new(vec![1]), overrides(3, true));
    let conversation = Conversation::single("q");

    let a = quiet.pipe("cot", &conversation).await.unwrap();
    let b = verbose.pipe("cot", &conversation).await.unwrap();
    assert_eq!(a.answer, b.answer);

    let trace = b.trace.as_ref().unwrap();
    assert_eq!(trace.prompt, "Q: q\nA:");
    assert_eq!(trace.candidates.len(), 3);
    assert!(b.render().starts_with("path 2\n\n--- Debug Info ---"));
}

#[tokio::test]
async fn test_total_failure_is_distinguished() {
    let p = pipeline(SeededBackend::new(vec![0, 1, 2]), overrides(3, false));
    let err = p.pipe("cot", &Conversation::single("q")).await.unwrap_err();

    match &err {
        DecodeError::TotalFailure { attempts, selection, .. } => {
            assert_eq!(*attempts, 3);
            assert!(selection.winner().is_none());
        }
        other => panic!("expected total failure, got {:?}", other),
    }
    let message = p.respond("cot", &Conversation::single("q")).await;
    assert!(message.starts_with(TOTAL_FAILURE_MESSAGE));
    assert!(!message.is_empty());
}

#[tokio::test]
async fn test_empty_model_fails_before_any_backend_call() {
    let p = pipeline(SeededBackend::new(vec![]), ConfigOverrides::default());
    let err = p.pipe("cot", &Conversation::single("q")).await.unwrap_err();

    assert_eq!(err, DecodeError::Config(ConfigError::MissingField("model")));
    assert_eq!(p.backend().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_env_supplies_model_when_not_explicit() {
    let env = MapEnv::new().with("COT_DECODING_MODEL", "mistral").with("COT_DECODING_K", "2");
    let p = Pipeline::with_env(SeededBackend::new(vec![]), ConfigOverrides::default(), Arc::new(env));

    let config = p.resolve_config().unwrap();
    assert_eq!(config.model, "mistral");
    let outcome = p.pipe("cot", &Conversation::single("q")).await.unwrap();
    assert_eq!(outcome.selection.candidates().len(), 2);
}

#[tokio::test]
async fn test_config_update_applies_to_next_invocation() {
    let mut p = pipeline(SeededBackend::new(vec![]), ConfigOverrides::default());
    assert!(p.pipe("cot", &Conversation::single("q")).await.is_err());

    p.on_config_updated(overrides(1, false)).await;
    let outcome = p.pipe("cot", &Conversation::single("q")).await.unwrap();
    assert_eq!(outcome.answer, "path 0");
}

#[test]
fn test_respond_reports_total_failure_as_text() {
    let p = pipeline(SeededBackend::new(vec![0, 1]), overrides(2, false));
    let reply = tokio_test::block_on(p.respond("cot", &Conversation::single("q")));
    assert!(reply.starts_with(TOTAL_FAILURE_MESSAGE));
    assert!(reply.contains("All 2 candidate generations failed."));
}

#[tokio::test]
async fn test_total_failure_with_debug_keeps_trace() {
    let p = pipeline(SeededBackend::new(vec![0, 1]), overrides(2, true));

    match p.pipe("cot", &Conversation::single("q")).await.unwrap_err() {
        DecodeError::TotalFailure { trace: Some(trace), .. } => {
            assert_eq!(trace.candidates.len(), 2);
            assert!(trace.winner.is_none());
        }
        other => panic!("expected total failure with trace, got {:?}", other),
    }

    let reply = p.respond("cot", &Conversation::single("q")).await;
    assert!(reply.starts_with(TOTAL_FAILURE_MESSAGE));
    assert!(reply.contains("--- Debug Info ---"));
    assert!(reply.contains("Error: HTTP 503 from backend: overloaded"));
    assert!(reply.ends_with(TOTAL_FAILURE_NOTICE));
}

#[tokio::test]
async fn test_total_failure_without_debug_has_no_trace() {
    let p = pipeline(SeededBackend::new(vec![0]), overrides(1, false));
    let err = p.pipe("cot", &Conversation::single("q")).await.unwrap_err();
    assert!(matches!(err, DecodeError::TotalFailure { trace: None, .. }));
    assert_eq!(err.render(), err.to_string());
}
