use super::TextExtractionService;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory [`TextExtractionService`] for tests and local harnesses.
pub struct MockTextExtractor {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<(usize, String)>>>,
    panic_message: Option<String>,
}

impl MockTextExtractor {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            panic_message: None,
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Make every call panic, to exercise the server's panic handling.
    pub fn panicking(mut self, message: &str) -> Self {
        self.panic_message = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `(byte length, mime type)` of each call, in order.
    pub fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractionService for MockTextExtractor {
    async fn extract_text(&self, image_bytes: &[u8], mime_type: &str) -> String {
        if let Some(message) = &self.panic_message {
            panic!("{}", message);
        }

        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((image_bytes.len(), mime_type.to_string()));
            calls.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            String::new()
        } else {
            let index = (count - 1) % responses.len();
            responses[index].clone()
        }
    }
}
