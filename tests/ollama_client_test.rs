// Copyright 2024-2026 CoT-Decoding Contributors
// SPDX-License-Identifier: Apache-2.0

//! OllamaClient against a canned HTTP/1.1 responder on loopback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cot_decoding::backend::{BackendError, GenerateOptions, GenerateRequest, GenerationBackend, OllamaClient};
use cot_decoding::config::DecodingConfig;
use cot_decoding::engine::{CandidateError, Conversation};
use cot_decoding::pipeline::decode;

/// One captured request: (request line, body).
type Captured = Arc<Mutex<Vec<(String, String)>>>;

/// Answer the n-th accepted connection with the n-th response.
async fn spawn_server(responses: Vec<(u16, String, u64)>) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        for (status, body, delay_ms) in responses {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let sink = sink.clone();
            tokio::spawn(async move {
                let (line, req_body) = read_request(&mut socket).await;
                sink.lock().unwrap().push((line, req_body));
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), captured)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> (String, String) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return (String::new(), String::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let line = head.lines().next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    (line, body)
}

fn request(seed: u64) -> GenerateRequest {
    GenerateRequest {
        model: "llama3.2".into(),
        prompt: "Q: What is 2+2?\nA:".into(),
        options: GenerateOptions { temperature: 0.7, num_predict: 256, seed },
        stream: false,
    }
}

#[tokio::test]
async fn generate_posts_json_and_parses_statistics() {
    let body = r#"{"model":"llama3.2","response":"4","done":true,"eval_count":12,"eval_duration":3000000,"total_duration":5000000}"#;
    let (base, captured) = spawn_server(vec![(200, body.to_string(), 0)]).await;
    let client = OllamaClient::new(format!("{}/api/generate", base), 5_000).unwrap();

    let response = client.generate(&request(3)).await.unwrap();
    assert_eq!(response.response, "4");
    assert_eq!(response.eval_count, Some(12));
    assert_eq!(response.eval_duration, Some(3_000_000));

    let captured = captured.lock().unwrap();
    let (line, sent) = &captured[0];
    assert!(line.starts_with("POST /api/generate "));
    let sent: serde_json::Value = serde_json::from_str(sent).unwrap();
    assert_eq!(sent["model"], "llama3.2");
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["options"]["seed"], 3);
    assert_eq!(sent["options"]["num_predict"], 256);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (base, _) = spawn_server(vec![(500, r#"{"error":"model not found"}"#.to_string(), 0)]).await;
    let client = OllamaClient::new(format!("{}/api/generate", base), 5_000).unwrap();

    let err = client.generate(&request(0)).await.unwrap_err();
    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("model not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let (base, _) = spawn_server(vec![(200, "not json".to_string(), 0)]).await;
    let client = OllamaClient::new(format!("{}/api/generate", base), 5_000).unwrap();
    assert!(matches!(client.generate(&request(0)).await, Err(BackendError::Malformed(_))));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OllamaClient::new(format!("http://{}/api/generate", addr), 2_000).unwrap();
    assert!(matches!(client.generate(&request(0)).await, Err(BackendError::Transport(_))));
}

#[tokio::test]
async fn health_check_uses_tags_endpoint() {
    let (base, captured) = spawn_server(vec![(200, r#"{"models":[]}"#.to_string(), 0)]).await;
    let client = OllamaClient::new(format!("{}/api/generate", base), 5_000).unwrap();
    assert_eq!(client.base_url(), base);

    assert!(client.health_check().await.unwrap());
    assert!(captured.lock().unwrap()[0].0.starts_with("GET /api/tags "));
}

#[tokio::test]
async fn slow_candidate_times_out_without_sinking_batch() {
    let ok = |text: &str| {
        format!(r#"{{"response":"{}","done":true,"eval_count":10,"eval_duration":1000}}"#, text)
    };
    let (base, _) = spawn_server(vec![(200, ok("slow"), 400), (200, ok("fast"), 0)]).await;
    let client = OllamaClient::new(format!("{}/api/generate", base), 5_000).unwrap();
    let config = DecodingConfig {
        backend_url: format!("{}/api/generate", base),
        model: "llama3.2".into(),
        k: 2,
        request_timeout_ms: 100,
        debug: false,
        ..Default::default()
    };

    let outcome = decode(&client, &config, &Conversation::single("q")).await.unwrap();
    assert_eq!(outcome.answer, "fast");
    assert_eq!(
        outcome.selection.candidates()[0].error(),
        Some(&CandidateError::Timeout { timeout_ms: 100 })
    );
}
