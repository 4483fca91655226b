//! Background asset loads

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::error::{AssetError, AssetResult};
use super::handle::AssetHandle;

/// Progress of a background load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Still decoding on the worker thread
    Pending,
    /// Published to the registry
    Ready,
    /// Decoding failed, or the worker went away
    Failed,
}

pub(crate) type LoadSender<T> = Sender<AssetResult<AssetHandle<T>>>;

/// An asset being decoded on a worker thread
pub struct PendingAsset<T> {
    receiver: Receiver<AssetResult<AssetHandle<T>>>,
    outcome: Option<AssetResult<AssetHandle<T>>>,
}

impl<T> PendingAsset<T> {
    pub(crate) fn channel() -> (Self, LoadSender<T>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                receiver,
                outcome: None,
            },
            sender,
        )
    }

    /// Check for completion without blocking
    pub fn poll(&mut self) -> LoadState {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(result) => self.outcome = Some(result),
                Err(TryRecvError::Empty) => return LoadState::Pending,
                Err(TryRecvError::Disconnected) => self.outcome = Some(Err(AssetError::WorkerLost)),
            }
        }
        match self.outcome {
            Some(Ok(_)) => LoadState::Ready,
            Some(Err(_)) => LoadState::Failed,
            None => LoadState::Pending,
        }
    }

    /// The loaded handle, once [`PendingAsset::poll`] has reported `Ready`
    #[must_use]
    pub fn handle(&self) -> Option<AssetHandle<T>> {
        match &self.outcome {
            Some(Ok(handle)) => Some(handle.clone()),
            _ => None,
        }
    }

    /// The failure, once [`PendingAsset::poll`] has reported `Failed`
    #[must_use]
    pub fn error(&self) -> Option<&AssetError> {
        match &self.outcome {
            Some(Err(err)) => Some(err),
            _ => None,
        }
    }

    /// Block until the load finishes
    ///
    /// # Errors
    ///
    /// Returns the load error, or [`AssetError::WorkerLost`] if the worker
    /// exited without reporting.
    pub fn wait(self) -> AssetResult<AssetHandle<T>> {
        match self.outcome {
            Some(result) => result,
            None => self.receiver.recv().unwrap_or(Err(AssetError::WorkerLost)),
        }
    }
}

impl<T> std::fmt::Debug for PendingAsset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.outcome {
            None => "pending",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("PendingAsset").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assets::guid::Guid;

    #[test]
    fn test_poll_transitions() {
        let (mut pending, sender) = PendingAsset::<u32>::channel();
        assert_eq!(pending.poll(), LoadState::Pending);

        let guid = Guid::new();
        sender.send(Ok(AssetHandle::from_arc(guid, Arc::new(7)))).unwrap();
        assert_eq!(pending.poll(), LoadState::Ready);
        assert_eq!(pending.handle().map(|h| *h.asset()), Some(7));
        assert_eq!(pending.wait().unwrap().guid(), guid);
    }

    #[test]
    fn test_dropped_sender_is_worker_lost() {
        let (mut pending, sender) = PendingAsset::<u32>::channel();
        drop(sender);
        assert_eq!(pending.poll(), LoadState::Failed);
        assert!(matches!(pending.error(), Some(AssetError::WorkerLost)));
    }
}
