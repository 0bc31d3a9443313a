//! End-to-end pipeline tests over an in-repo capture fixture.

use std::sync::Arc;
use std::time::Duration;

use harlog::{ExtractionPipeline, HarError, MockClassifier};

/// A small capture: an HTML page, two API calls, and an image.
const FIXTURE: &str = r#"{
  "log": {
    "version": "1.2",
    "entries": [
      {
        "request": {"method": "GET", "url": "https://shop.example.com/", "headers": []},
        "response": {
          "status": 200,
          "headers": [{"name": "Content-Type", "value": "text/html; charset=utf-8"}],
          "content": {"mimeType": "text/html", "size": 5120}
        }
      },
      {
        "request": {
          "method": "GET",
          "url": "https://shop.example.com/api/products?page=1",
          "headers": [{"name": "Accept", "value": "application/json"}]
        },
        "response": {
          "status": 200,
          "headers": [{"name": "Content-Type", "value": "application/json"}],
          "content": {"mimeType": "application/json", "size": 2048}
        }
      },
      {
        "request": {
          "method": "POST",
          "url": "https://shop.example.com/api/cart",
          "headers": [
            {"name": "Content-Type", "value": "application/json"},
            {"name": "X-Note", "value": "O'Brien"}
          ],
          "postData": {"text": "{\"sku\": \"A-1\"}"}
        },
        "response": {
          "status": 201,
          "headers": [{"name": "Content-Type", "value": "application/json; charset=utf-8"}],
          "content": {"mimeType": "application/json", "size": 64}
        }
      },
      {
        "request": {"method": "GET", "url": "https://shop.example.com/logo.png", "headers": []},
        "response": {
          "status": 200,
          "headers": [{"name": "Content-Type", "value": "image/png"}],
          "content": {"mimeType": "image/png", "size": 9000}
        }
      }
    ]
  }
}"#;

#[tokio::test]
async fn selects_the_classified_entry_and_renders_it() {
    let classifier = MockClassifier::selecting(1, "the cart POST adds an item");
    let pipeline = ExtractionPipeline::new(Arc::new(classifier));

    let result = pipeline
        .run(FIXTURE.as_bytes(), "add an item to the cart", "test-model")
        .await
        .unwrap();

    // Index 1 of the *filtered* list is the cart POST (the HTML page
    // and the image never reach the classifier).
    let details = &result.request_details;
    assert_eq!(details.method, "POST");
    assert_eq!(details.url, "https://shop.example.com/api/cart");
    assert_eq!(details.content_type, "application/json; charset=utf-8");
    assert_eq!(details.response_status, 201);
    assert_eq!(details.response_size, 64);

    assert!(result.curl_command.starts_with("curl -X POST 'https://shop.example.com/api/cart'"));
    assert!(result.curl_command.contains(r"-H 'X-Note: O'\''Brien'"));
    assert!(result.curl_command.ends_with(r#"-d '{"sku": "A-1"}'"#));
}

#[tokio::test]
async fn classifier_outage_still_produces_a_command() {
    let pipeline = ExtractionPipeline::new(Arc::new(MockClassifier::failing()))
        .with_classifier_deadline(Duration::from_millis(100));

    let result = pipeline
        .run(FIXTURE.as_bytes(), "anything", "test-model")
        .await
        .unwrap();

    // Fallback: first filtered entry, the products GET.
    assert_eq!(
        result.request_details.url,
        "https://shop.example.com/api/products?page=1"
    );
}

#[tokio::test]
async fn capture_without_api_calls_is_not_found() {
    let raw = br#"{"log": {"entries": [
        {"request": {"method": "GET", "url": "https://a.com/"},
         "response": {"status": 200, "content": {"mimeType": "text/html"}}}
    ]}}"#;

    let classifier = MockClassifier::new();
    let pipeline = ExtractionPipeline::new(Arc::new(classifier.clone()));

    let error = pipeline.run(raw, "anything", "test-model").await.unwrap_err();
    assert!(matches!(error, HarError::NoCandidates));

    // The classifier is never consulted for an empty candidate list.
    assert!(classifier.prompts().is_empty());
}

#[tokio::test]
async fn malformed_capture_is_invalid_format() {
    let pipeline = ExtractionPipeline::new(Arc::new(MockClassifier::new()));

    let error = pipeline
        .run(b"<html>not a har</html>", "anything", "test-model")
        .await
        .unwrap_err();
    assert!(matches!(error, HarError::InvalidFormat { .. }));

    let error = pipeline
        .run(br#"{"log": {"pages": []}}"#, "anything", "test-model")
        .await
        .unwrap_err();
    assert!(matches!(error, HarError::InvalidFormat { .. }));
}
