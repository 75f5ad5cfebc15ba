// SPDX-License-Identifier: MPL-2.0
//! Single-resolution image slots.
//!
//! Each asynchronously loaded image (the source photo, the overlay template)
//! lives in an [`ImageSlot`]. A slot is resolved exactly once through its
//! [`SlotSender`], either with a fully decoded value or with an error. A failed
//! load never leaves a partial value behind.
//!
//! The receiving side can be polled from an event loop without blocking
//! ([`ImageSlot::poll`]) or awaited ([`ImageSlot::resolve`]).

use crate::error::{AcquisitionError, Error, Result};
use std::sync::Arc;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Observable state of an [`ImageSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Nothing was requested.
    Empty,
    /// A loader is running.
    Pending,
    /// The value is available.
    Ready,
    /// The loader failed; the slot holds no value.
    Failed,
}

enum SlotInner<T> {
    Empty,
    Pending(oneshot::Receiver<Result<T>>),
    Ready(Arc<T>),
    Failed(Error),
}

/// Holder for one asynchronously produced image.
pub struct ImageSlot<T> {
    inner: SlotInner<T>,
}

/// Producer half of a pending [`ImageSlot`].
///
/// Dropping it without calling [`SlotSender::resolve`] fails the slot with
/// [`AcquisitionError::Cancelled`].
pub struct SlotSender<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> SlotSender<T> {
    /// Delivers the load result. Ignored if the slot was dropped meanwhile.
    pub fn resolve(self, result: Result<T>) {
        let _ = self.tx.send(result);
    }
}

impl<T> ImageSlot<T> {
    /// A slot with no load requested.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: SlotInner::Empty,
        }
    }

    /// A slot that is already resolved.
    #[must_use]
    pub fn ready(value: T) -> Self {
        Self {
            inner: SlotInner::Ready(Arc::new(value)),
        }
    }

    /// A slot that already failed.
    #[must_use]
    pub fn failed(error: Error) -> Self {
        Self {
            inner: SlotInner::Failed(error),
        }
    }

    /// A pending slot together with the sender that will resolve it.
    #[must_use]
    pub fn pending() -> (Self, SlotSender<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                inner: SlotInner::Pending(rx),
            },
            SlotSender { tx },
        )
    }

    #[must_use]
    pub fn status(&self) -> SlotStatus {
        match self.inner {
            SlotInner::Empty => SlotStatus::Empty,
            SlotInner::Pending(_) => SlotStatus::Pending,
            SlotInner::Ready(_) => SlotStatus::Ready,
            SlotInner::Failed(_) => SlotStatus::Failed,
        }
    }

    /// Checks for a delivered result without blocking.
    pub fn poll(&mut self) -> SlotStatus {
        let received = match &mut self.inner {
            SlotInner::Pending(rx) => rx.try_recv(),
            _ => return self.status(),
        };

        match received {
            Ok(result) => self.settle(result),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => self.settle(Err(AcquisitionError::Cancelled.into())),
        }
        self.status()
    }

    /// Waits until a pending slot resolves.
    pub async fn resolve(&mut self) -> SlotStatus {
        let received = match &mut self.inner {
            SlotInner::Pending(rx) => rx.await,
            _ => return self.status(),
        };

        self.settle(received.unwrap_or_else(|_| Err(AcquisitionError::Cancelled.into())));
        self.status()
    }

    fn settle(&mut self, result: Result<T>) {
        self.inner = match result {
            Ok(value) => SlotInner::Ready(Arc::new(value)),
            Err(error) => SlotInner::Failed(error),
        };
    }

    /// The value, if the slot is ready.
    #[must_use]
    pub fn get(&self) -> Option<&Arc<T>> {
        match &self.inner {
            SlotInner::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The load error, if the slot failed.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match &self.inner {
            SlotInner::Failed(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.inner, SlotInner::Ready(_))
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.inner, SlotInner::Pending(_))
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.inner, SlotInner::Failed(_))
    }
}

impl<T> Default for ImageSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> std::fmt::Debug for ImageSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSlot")
            .field("status", &self.status())
            .finish()
    }
}
