use magpie_core::{LlmConfig, MagpieError};
use magpie_review::llm::{ChatMessage, LlmClient, Role};
use mockito::Matcher;
use serde_json::json;

fn config_for(server: &mockito::Server) -> LlmConfig {
    LlmConfig {
        api_key: Some("sk-test".into()),
        base_url: Some(server.url()),
        model: "gpt-3.5-turbo".into(),
    }
}

fn review_conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: Role::System,
            content: "You are a code reviewer.".into(),
        },
        ChatMessage {
            role: Role::User,
            content: "Review this diff.".into(),
        },
    ]
}

#[tokio::test]
async fn completions_returns_first_choice_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({ "model": "gpt-3.5-turbo" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "Looks correct." } },
                    { "message": { "role": "assistant", "content": "second opinion" } },
                ],
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = LlmClient::new(&config_for(&server)).unwrap();
    let reply = client.completions(review_conversation(), None).await.unwrap();

    assert_eq!(reply, "Looks correct.");
    mock.assert_async().await;
}

#[tokio::test]
async fn completions_honors_model_override() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({ "model": "deepseek-chat" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{ "message": { "content": "ok" } }],
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = LlmClient::new(&config_for(&server)).unwrap();
    let reply = client
        .completions(review_conversation(), Some("deepseek-chat"))
        .await
        .unwrap();

    assert_eq!(reply, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn completions_sends_the_full_conversation() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "messages": [
                { "role": "system", "content": "You are a code reviewer." },
                { "role": "user", "content": "Review this diff." },
            ],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{ "message": { "content": "done" } }],
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = LlmClient::new(&config_for(&server)).unwrap();
    client
        .completions(review_conversation(), None)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn provider_error_propagates_to_the_caller() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = LlmClient::new(&config_for(&server)).unwrap();
    let err = client
        .completions(review_conversation(), None)
        .await
        .unwrap_err();

    match err {
        MagpieError::Llm(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("expected LLM error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choice_list_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let client = LlmClient::new(&config_for(&server)).unwrap();
    let err = client
        .completions(review_conversation(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MagpieError::Llm(_)));
}

#[tokio::test]
async fn unreachable_provider_is_an_error_not_a_default() {
    let config = LlmConfig {
        api_key: Some("sk-test".into()),
        base_url: Some("http://127.0.0.1:1".into()),
        model: "gpt-3.5-turbo".into(),
    };
    let client = LlmClient::new(&config).unwrap();

    let err = client
        .completions(review_conversation(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MagpieError::Llm(_)));
}
