//! A named broadcast scope and its membership set.
//!
//! Membership changes take the write lock; broadcast enumerates under the read
//! lock and only ever calls `try_send`, so no lock is held across I/O and a slow
//! member cannot stall the sender or the other members.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

use crate::protocol::ClientId;

/// A room member's delivery handle: its username and the sending half of its
/// bounded outbound queue.
///
/// The room holds the only sender for a client's queue, so removing the member
/// is what closes the queue.
#[derive(Debug, Clone)]
pub struct Member {
    username: Arc<str>,
    outbound: mpsc::Sender<Bytes>,
}

impl Member {
    pub fn new(username: impl Into<Arc<str>>, outbound: mpsc::Sender<Bytes>) -> Self {
        Self {
            username: username.into(),
            outbound,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Outcome of a single fan-out, for metrics only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct Room {
    name: Arc<str>,
    members: RwLock<HashMap<ClientId, Member>>,
}

impl Room {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            members: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member. Returns `false` (and keeps the existing handle) if the
    /// client was already a member.
    pub async fn join(&self, client_id: ClientId, member: Member) -> bool {
        let mut members = self.members.write().await;
        if members.contains_key(&client_id) {
            return false;
        }
        tracing::debug!(
            room = %self.name,
            %client_id,
            username = member.username(),
            "Member joined room"
        );
        members.insert(client_id, member);
        true
    }

    /// Remove a member, dropping its queue sender. No-op if absent.
    pub async fn leave(&self, client_id: &ClientId) -> bool {
        let removed = self.members.write().await.remove(client_id);
        if let Some(member) = &removed {
            tracing::debug!(
                room = %self.name,
                %client_id,
                username = member.username(),
                "Member left room"
            );
        }
        removed.is_some()
    }

    /// Offer `frame` to every member except `sender`; with no sender every
    /// member receives it.
    ///
    /// A full (or already closed) queue drops the frame for that member only.
    pub async fn broadcast(&self, sender: Option<&ClientId>, frame: Bytes) -> FanoutReport {
        let members = self.members.read().await;
        let mut report = FanoutReport::default();

        for (client_id, member) in members.iter() {
            if sender == Some(client_id) {
                continue;
            }
            match member.outbound.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    tracing::trace!(
                        room = %self.name,
                        %client_id,
                        "Outbound queue full, dropping frame"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    report.dropped += 1;
                }
            }
        }

        report
    }

    pub async fn member_count(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn contains(&self, client_id: &ClientId) -> bool {
        self.members.read().await.contains_key(client_id)
    }
}
