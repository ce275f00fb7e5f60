//! Bidirectional message channel

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::Result;

/// One text message in, one text message out. The WebSocket server and
/// the tests each provide an implementation.
#[async_trait]
pub trait MessageChannel: Send {
    /// Next inbound message, `None` once the peer has gone.
    async fn recv(&mut self) -> Result<Option<String>>;

    async fn send(&mut self, text: String) -> Result<()>;
}

/// Channel backed by in-memory queues.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    inbound: VecDeque<String>,
    sent: Vec<String>,
}

impl MemoryChannel {
    pub fn new<I, S>(inbound: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inbound: inbound.into_iter().map(Into::into).collect(),
            sent: Vec::new(),
        }
    }

    /// Everything sent so far, oldest first.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    async fn recv(&mut self) -> Result<Option<String>> {
        Ok(self.inbound.pop_front())
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.sent.push(text);
        Ok(())
    }
}
