//! The established data channel.
//!
//! A [`Transport`] carries opaque text frames in order, each at most once.
//! Once either side closes, the link is gone for good.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::error::TransportError;

/// Bidirectional frame channel between host and peer.
#[async_trait]
pub trait Transport: Send {
    /// Queue a frame for the other side. Never waits for delivery.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Next frame, or `None` once the link is closed.
    async fn recv(&mut self) -> Option<String>;

    /// Tear the link down. The other side sees `recv` return `None`.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

#[async_trait]
impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        (**self).send(frame).await
    }

    async fn recv(&mut self) -> Option<String> {
        (**self).recv().await
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// In-process link backed by tokio channels.
#[derive(Debug)]
pub struct MemoryLink {
    tx: Option<UnboundedSender<String>>,
    rx: UnboundedReceiver<String>,
}

impl MemoryLink {
    /// Two connected ends.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(a_tx),
                rx: b_rx,
            },
            Self {
                tx: Some(b_tx),
                rx: a_rx,
            },
        )
    }
}

#[async_trait]
impl Transport for MemoryLink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    fn close(&mut self) {
        self.tx = None;
        self.rx.close();
    }

    fn is_open(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}
