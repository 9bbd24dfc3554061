//! A name-keyed, non-owning registry of WebSocket sessions.
//!
//! Sessions are owned by their connection task; the pool only holds
//! [`Weak`] references, so a dropped session can never leave a
//! dangling entry behind (see [`crate::ws::session::WebSocketSession`]'s
//! `Drop` impl, which calls [`WebSocketPool::erase`]).
use crate::ws::session::WebSocketSession;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

#[derive(Default)]
pub struct WebSocketPool {
    sessions: Mutex<HashMap<String, Weak<WebSocketSession>>>,
}

impl WebSocketPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<String>, session: &Arc<WebSocketSession>) {
        self.sessions
            .lock()
            .unwrap()
            .insert(key.into(), Arc::downgrade(session));
    }

    /// Looks up a live session by key, dropping the entry if its
    /// session has already gone away.
    pub fn get(&self, key: &str) -> Option<Arc<WebSocketSession>> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(key).and_then(Weak::upgrade) {
            Some(session) => Some(session),
            None => {
                sessions.remove(key);
                None
            }
        }
    }

    pub fn erase(&self, key: &str) {
        self.sessions.lock().unwrap().remove(key);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
