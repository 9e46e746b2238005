use avatar_generator::{
    ai::MockImageGenerationClient,
    app::{App, AppServices, GenerationState},
    composer::PromptComposer,
    config::Config,
    models::{InputImage, Mode},
    vocabulary::FeatureVocabulary,
    ErrorKind,
};
use base64::Engine as _;
use std::io::Cursor;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AVATAR_MODEL: &str = "imagen-4.0-generate-001";
const TRANSFORM_MODEL: &str = "gemini-2.5-flash-image";

fn test_config(base_url: &str) -> Config {
    Config {
        api_key: "test-key".to_string(),
        avatar_model: AVATAR_MODEL.to_string(),
        transform_model: TRANSFORM_MODEL.to_string(),
        base_url: base_url.to_string(),
        request_timeout: None,
        vocabulary_path: None,
    }
}

fn photo_png() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::from_pixel(4, 4, image::Rgb([200, 150, 100]))
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[tokio::test]
async fn test_avatar_round_trip_against_imagen() {
    let server = MockServer::start().await;
    let generated: Vec<u8> = vec![0x89, 0x50, 0x4E, 0x47, 1, 2, 3];

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:predict", AVATAR_MODEL)))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "1:1",
                "outputOptions": { "mimeType": "image/png" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "predictions": [{ "bytesBase64Encoded": b64(&generated), "mimeType": "image/png" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::from_config(&test_config(&server.uri()), Some(11)).unwrap();
    let image = app.generate(Mode::RandomAvatar, None).await.unwrap();

    assert_eq!(image.bytes, generated);
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(app.state(), GenerationState::Succeeded);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["instances"][0]["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("A unique, random Notion Faces style avatar"));
    assert!(prompt.contains("pure black and pure white"));
}

#[tokio::test]
async fn test_transform_round_trip_with_data_url() {
    let server = MockServer::start().await;
    let photo = photo_png();
    let generated: Vec<u8> = vec![0xFF, 0xD8, 0xFF, 0xE0, 9, 9];

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", TRANSFORM_MODEL)))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "parts": [{ "inlineData": { "mimeType": "image/png", "data": b64(&photo) } }]
            }],
            "generationConfig": { "responseModalities": ["IMAGE"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here you go" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": b64(&generated) } }
                    ]
                },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input =
        InputImage::from_data_url(&format!("data:image/png;base64,{}", b64(&photo))).unwrap();
    let app = App::from_config(&test_config(&server.uri()), None).unwrap();
    let image = app
        .generate(Mode::StyleTransform, Some(input))
        .await
        .unwrap();

    assert_eq!(image.bytes, generated);
    assert_eq!(image.extension(), "jpg");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["contents"][0]["parts"][1]["text"].as_str().unwrap();
    assert!(text.contains("Studio Ghibli"));
}

#[tokio::test]
async fn test_rejected_inputs_never_reach_the_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = App::from_config(&test_config(&server.uri()), None).unwrap();

    let err = app.generate(Mode::StyleTransform, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);

    let pdf = InputImage::new(b"%PDF-1.4 not a photo".to_vec(), "application/pdf");
    let err = app
        .generate(Mode::StyleTransform, Some(pdf))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let truncated = InputImage::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png");
    let err = app
        .generate(Mode::StyleTransform, Some(truncated))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!app.is_busy());
}

#[tokio::test]
async fn test_empty_responses_are_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r":predict$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r":generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "No image for you" }] } }]
        })))
        .mount(&server)
        .await;

    let app = App::from_config(&test_config(&server.uri()), None).unwrap();

    let err = app.generate(Mode::RandomAvatar, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);

    let input = InputImage::new(photo_png(), "image/png");
    let err = app
        .generate(Mode::StyleTransform, Some(input))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
    assert!(err.to_string().contains("No image for you"));
}

#[tokio::test]
async fn test_server_error_is_service_error_with_cause() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r":predict$"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal quota exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::from_config(&test_config(&server.uri()), None).unwrap();
    let err = app.generate(Mode::RandomAvatar, None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert!(err.to_string().contains("internal quota exploded"));
    assert_eq!(app.state(), GenerationState::Failed);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_service_error() {
    // Port 9 (discard) is not expected to accept HTTP connections
    let app = App::from_config(&test_config("http://127.0.0.1:9"), None).unwrap();
    let err = app.generate(Mode::RandomAvatar, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Service);
}

#[tokio::test]
async fn test_app_with_mock_services() {
    let avatar = MockImageGenerationClient::new().with_image_response(vec![1, 1, 2, 3, 5]);
    let transform = MockImageGenerationClient::new();
    let app = App::with_services(AppServices {
        composer: PromptComposer::with_seed(FeatureVocabulary::builtin(), 42),
        avatar_gen: Box::new(avatar.clone()),
        transform_gen: Box::new(transform.clone()),
        avatar_model: "mock-imagen".to_string(),
        transform_model: "mock-gemini".to_string(),
    });

    let image = app.generate(Mode::RandomAvatar, None).await.unwrap();
    assert_eq!(image.bytes, vec![1, 1, 2, 3, 5]);
    assert_eq!(avatar.get_call_count(), 1);
    assert_eq!(transform.get_call_count(), 0);

    let dir = tempfile::tempdir().unwrap();
    let saved = image.save_to(dir.path()).unwrap();
    assert_eq!(std::fs::read(saved).unwrap(), vec![1, 1, 2, 3, 5]);
}

#[test]
fn test_missing_credential_is_configuration_error() {
    let err = Config::from_lookup(|key| match key {
        "AVATAR_MODEL" => Some("imagen-4.0-generate-001".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_custom_vocabulary_file_drives_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let vocab_path = dir.path().join("vocabulary.json");
    std::fs::write(
        &vocab_path,
        serde_json::json!({
            "head_shape": { "descriptors": ["a hexagonal head"] },
            "eye_style": { "descriptors": ["starry eyes"] },
            "mouth_style": { "descriptors": ["a zigzag mouth"] },
            "top_accessory": { "descriptors": ["nothing on top"], "none": "nothing on top" },
            "unique_detail": { "descriptors": ["a tiny scar"] }
        })
        .to_string(),
    )
    .unwrap();

    let vocabulary = FeatureVocabulary::from_file(&vocab_path).unwrap();
    let composer = PromptComposer::with_seed(vocabulary, 1);
    let prompt = composer.compose(Mode::RandomAvatar, None).unwrap();

    assert!(prompt
        .text
        .contains("featuring a hexagonal head, starry eyes, and a zigzag mouth."));
    assert!(prompt.text.contains("It also has a tiny scar."));
    assert!(!prompt.text.contains("nothing on top"));

    let mut config = test_config("http://localhost");
    config.vocabulary_path = Some(vocab_path);
    assert!(App::from_config(&config, Some(1)).is_ok());
}
