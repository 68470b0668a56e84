//! Recording interaction double for tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rivet_core::{
    ApiError, ApiResult, Interaction, InteractionData, InteractionResponse, MessagePayload,
    ResponseType,
};

/// Interaction that records everything sent through it.
///
/// Mirrors the host contract: a second initial response is rejected.
#[derive(Debug)]
pub(crate) struct MockInteraction {
    data: InteractionData,
    responses: Mutex<Vec<InteractionResponse>>,
    followups: Mutex<Vec<MessagePayload>>,
    edits: Mutex<Vec<MessagePayload>>,
}

impl MockInteraction {
    pub(crate) fn new(data: InteractionData) -> Arc<Self> {
        Arc::new(Self {
            data,
            responses: Mutex::new(Vec::new()),
            followups: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn response_kinds(&self) -> Vec<ResponseType> {
        self.responses.lock().iter().map(|r| r.kind).collect()
    }

    pub(crate) fn followups(&self) -> Vec<MessagePayload> {
        self.followups.lock().clone()
    }

    pub(crate) fn edits(&self) -> Vec<MessagePayload> {
        self.edits.lock().clone()
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    fn data(&self) -> &InteractionData {
        &self.data
    }

    async fn create_response(&self, response: InteractionResponse) -> ApiResult<()> {
        let mut responses = self.responses.lock();
        if !responses.is_empty() {
            return Err(ApiError::rejected(40060, "Interaction has already been acknowledged"));
        }
        responses.push(response);
        Ok(())
    }

    async fn create_followup(&self, message: MessagePayload) -> ApiResult<()> {
        self.followups.lock().push(message);
        Ok(())
    }

    async fn edit_original(&self, message: MessagePayload) -> ApiResult<()> {
        self.edits.lock().push(message);
        Ok(())
    }
}
