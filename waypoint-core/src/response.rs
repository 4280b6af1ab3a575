// Single-write response slot shared between a controller and the dispatcher

use crate::{HttpResponse, ResponseError};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Slot {
    response: Option<HttpResponse>,
    sent_status: Option<u16>,
}

/// Accepts exactly one terminal response per request.
///
/// Clones share the same slot. The first [`send`](ResponseWriter::send)
/// wins; every later call returns [`ResponseError::AlreadySent`] and leaves
/// the first response untouched.
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    slot: Arc<Mutex<Slot>>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete the request with `response`.
    pub fn send(&self, response: HttpResponse) -> Result<(), ResponseError> {
        let mut slot = self.slot.lock();
        if let Some(status) = slot.sent_status {
            return Err(ResponseError::AlreadySent { status });
        }
        slot.sent_status = Some(response.status);
        slot.response = Some(response);
        Ok(())
    }

    /// Complete the request with a JSON body.
    pub fn send_json<T: Serialize>(&self, status: u16, value: &T) -> Result<(), ResponseError> {
        let response = HttpResponse::new(status)
            .with_json(value)
            .unwrap_or_else(|_| HttpResponse::internal_server_error());
        self.send(response)
    }

    pub fn is_sent(&self) -> bool {
        self.slot.lock().sent_status.is_some()
    }

    /// Status of the response that was sent, if any.
    pub fn sent_status(&self) -> Option<u16> {
        self.slot.lock().sent_status
    }

    /// Hand the sent response to the transport. The writer stays "sent".
    pub(crate) fn take(&self) -> Option<HttpResponse> {
        self.slot.lock().response.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let writer = ResponseWriter::new();
        assert!(!writer.is_sent());

        writer.send(HttpResponse::new(201)).unwrap();
        let second = writer.send(HttpResponse::ok());

        assert_eq!(second, Err(ResponseError::AlreadySent { status: 201 }));
        assert_eq!(writer.take().map(|r| r.status), Some(201));
    }

    #[test]
    fn test_clones_share_slot() {
        let writer = ResponseWriter::new();
        let controller_side = writer.clone();

        controller_side
            .send_json(202, &serde_json::json!({"queued": true}))
            .unwrap();

        assert!(writer.is_sent());
        assert_eq!(writer.sent_status(), Some(202));
    }

    #[test]
    fn test_take_keeps_sent_state() {
        let writer = ResponseWriter::new();
        writer.send(HttpResponse::ok()).unwrap();

        assert!(writer.take().is_some());
        assert!(writer.take().is_none());
        assert!(writer.send(HttpResponse::ok()).is_err());
    }
}
