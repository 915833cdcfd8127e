use polyglot_translate::providers::AzurePairProvider;
use polyglot_translate::TranslationProvider;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn translates_via_mocked_azure_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "translations": [
                    {"text": "bonjour le monde.", "to": "fr-CA"},
                    {"text": "hallo welt.", "to": "de-DE"}
                ]
            }
        ])))
        .mount(&server)
        .await;

    let provider = AzurePairProvider::new(reqwest::Client::new(), server.uri(), "test-key");
    let targets = vec!["fr-CA".to_string(), "de-DE".to_string()];
    let result = provider
        .translate_batch("hello world.", "en-US", &targets)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.iter().any(|t| t.lang == "fr-CA" && t.text == "bonjour le monde."));
    assert!(result.iter().any(|t| t.lang == "de-DE" && t.text == "hallo welt."));
}

#[tokio::test]
async fn surfaces_auth_errors_distinctly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider = AzurePairProvider::new(reqwest::Client::new(), server.uri(), "bad-key");
    let targets = vec!["fr-CA".to_string()];
    let err = provider
        .translate_batch("hello.", "en-US", &targets)
        .await
        .unwrap_err();

    assert!(err.is_auth());
}
