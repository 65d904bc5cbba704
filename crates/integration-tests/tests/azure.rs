mod harness;

use cachet_config::ApiType;
use cachet_core::CallContext;
use cachet_llm::{Client, LlmError};
use harness::config::ConfigBuilder;
use harness::mock_llm::{MockLlm, Reply};
use harness::{complete, user_request};

#[tokio::test]
async fn default_model_routes_to_deployment() {
    let mock = MockLlm::start(Reply::Text("hello from azure".into())).await.unwrap();
    let config = ConfigBuilder::new(&mock.root_url())
        .with_azure(ApiType::Azure, "gpt4-prod")
        .with_default_model("gpt-4")
        .build();
    let client = Client::from_config(&config).unwrap();

    let (result, _) = complete(&client, &CallContext::new(), user_request("Hello")).await;
    assert_eq!(result.unwrap().text_content(), "hello from azure");

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.path, "/openai/deployments/gpt4-prod/chat/completions");
    assert_eq!(recorded.query.as_deref(), Some("api-version=2024-02-01"));
    assert_eq!(recorded.headers["api-key"], "test-key");
    assert!(!recorded.headers.contains_key("authorization"));
    assert_eq!(recorded.body["model"], "gpt-4");
}

#[tokio::test]
async fn azure_ad_sends_bearer_token() {
    let mock = MockLlm::start(Reply::Text("ok".into())).await.unwrap();
    let config = ConfigBuilder::new(&mock.root_url())
        .with_azure(ApiType::AzureAd, "gpt4-prod")
        .build();
    let client = Client::from_config(&config).unwrap();

    complete(&client, &CallContext::new(), user_request("Hello")).await.0.unwrap();

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.headers["authorization"], "Bearer test-key");
    assert!(!recorded.headers.contains_key("api-key"));
}

#[tokio::test]
async fn without_deployment_model_name_is_the_deployment() {
    let mock = MockLlm::start(Reply::Text("ok".into())).await.unwrap();
    let mut config = ConfigBuilder::new(&mock.root_url())
        .with_azure(ApiType::Azure, "unused")
        .with_default_model("gpt-4")
        .build();
    config.openai.azure_deployment = None;
    let client = Client::from_config(&config).unwrap();

    complete(&client, &CallContext::new(), user_request("Hello")).await.0.unwrap();

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.path, "/openai/deployments/gpt-4/chat/completions");
    assert_eq!(mock.completion_count(), 1);
}

#[tokio::test]
async fn unmapped_model_is_rejected_before_any_request() {
    let mock = MockLlm::start(Reply::Text("unused".into())).await.unwrap();
    let config = ConfigBuilder::new(&mock.root_url())
        .with_azure(ApiType::Azure, "gpt4-prod")
        .with_default_model("gpt-4")
        .build();
    let client = Client::from_config(&config).unwrap();

    let mut request = user_request("Hello");
    request.model = "gpt-4o".into();
    let (result, _) = complete(&client, &CallContext::new(), request).await;

    assert!(matches!(result, Err(LlmError::ModelNotFound { model }) if model == "gpt-4o"));
    assert_eq!(mock.completion_count(), 0);
}

#[tokio::test]
async fn models_are_listed_from_azure_route() {
    let mock = MockLlm::start(Reply::Text("unused".into())).await.unwrap();
    let config = ConfigBuilder::new(&mock.root_url())
        .with_azure(ApiType::Azure, "gpt4-prod")
        .build();
    let client = Client::from_config(&config).unwrap();

    let models = client.list_models(&CallContext::new(), &[]).await.unwrap();

    assert_eq!(models.len(), 3);
    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.path, "/openai/models");
    assert_eq!(recorded.query.as_deref(), Some("api-version=2024-02-01"));
}
