use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// Tracks which conversations have a request in flight.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    // NOTE: std::sync::Mutex since the lock is never held across .await.
    by_conversation: Arc<Mutex<HashSet<String>>>,
}

/// Marks a conversation busy until dropped.
pub struct InFlightGuard {
    registry: InFlightRegistry,
    conversation_id: String,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the conversation is already busy.
    pub fn try_acquire(&self, conversation_id: &str) -> Option<InFlightGuard> {
        let Ok(mut busy) = self.by_conversation.lock() else {
            log::warn!("In-flight registry lock poisoned");
            return None;
        };
        if !busy.insert(conversation_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            registry: self.clone(),
            conversation_id: conversation_id.to_string(),
        })
    }

    pub fn is_busy(&self, conversation_id: &str) -> bool {
        self.by_conversation
            .lock()
            .map(|busy| busy.contains(conversation_id))
            .unwrap_or(true)
    }
}

impl InFlightGuard {
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut busy) = self.registry.by_conversation.lock() {
            busy.remove(&self.conversation_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight_per_conversation() {
        let registry = InFlightRegistry::new();

        let guard = registry.try_acquire("conv_a").unwrap();
        assert_eq!(guard.conversation_id(), "conv_a");
        assert!(registry.is_busy("conv_a"));
        assert!(registry.try_acquire("conv_a").is_none());

        // Other conversations are independent.
        let other = registry.try_acquire("conv_b");
        assert!(other.is_some());

        drop(guard);
        assert!(!registry.is_busy("conv_a"));
        assert!(registry.try_acquire("conv_a").is_some());
    }
}
