//! Scripted in-memory transport
//!
//! Replays queued responses in order and records every request it saw.
//! When the queue runs dry it answers with the fallback response, if any.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{HttpError, HttpRequest, HttpResponse, Transport};

#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, HttpError>>>,
    fallback: Option<HttpResponse>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request beyond the script with `response`
    pub fn with_fallback(mut self, response: HttpResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.push(HttpResponse::new(status, body));
    }

    pub fn push_error(&self, error: HttpError) {
        self.responses.borrow_mut().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.url.clone();
        self.requests.borrow_mut().push(request);

        match self.responses.borrow_mut().pop_front() {
            Some(next) => next,
            None => self.fallback.clone().ok_or(HttpError::RequestFailed {
                message: format!("no scripted response left for {}", url),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order_then_fallback() {
        let transport = ScriptedTransport::new().with_fallback(HttpResponse::new(404, ""));
        transport.push_status(200, "first");
        transport.push_status(204, "");

        let a = transport.execute(HttpRequest::get("https://a")).unwrap();
        let b = transport.execute(HttpRequest::get("https://b")).unwrap();
        let c = transport.execute(HttpRequest::get("https://c")).unwrap();

        assert_eq!((a.status, a.body.as_str()), (200, "first"));
        assert_eq!(b.status, 204);
        assert_eq!(c.status, 404);
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.last_request().unwrap().url, "https://c");
    }

    #[test]
    fn test_exhausted_script_without_fallback_errors() {
        let transport = ScriptedTransport::new();
        assert!(transport.execute(HttpRequest::get("https://a")).is_err());
    }
}
