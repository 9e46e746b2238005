use super::ImageGenerationService;
use crate::models::{GeneratedImage, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum MockResponse {
    Image(Vec<u8>),
    Empty,
    Failure(String),
}

/// In-memory [`ImageGenerationService`] that records every request it sees.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    delay: Option<Duration>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.push(MockResponse::Image(response))
    }

    /// Queue a response in which the model produced no image.
    pub fn with_empty_response(self) -> Self {
        self.push(MockResponse::Empty)
    }

    /// Queue a transport/service failure carrying `message`.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(MockResponse::Failure(message.into()))
    }

    /// Hold each call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(MockResponse::Image(bytes)) => Ok(GeneratedImage {
                bytes,
                mime_type: "image/png".to_string(),
            }),
            Some(MockResponse::Empty) => Err(Error::EmptyResult(
                "mock returned no image data".to_string(),
            )),
            Some(MockResponse::Failure(message)) => Err(Error::Service(message)),
            // Default: PNG signature only
            None => Ok(GeneratedImage {
                bytes: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
                mime_type: "image/png".to_string(),
            }),
        }
    }
}
