//! Per-socket WebSocket session. Framing, the handshake, and masking
//! are ceded entirely to `tokio-tungstenite`; this module owns only
//! the ordered send queue, the receive dispatch, close handling, and
//! pool registration.
use crate::logger::Logger;
use crate::server::worker_pool::WorkerPool;
use crate::ws::pool::WebSocketPool;
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex, Weak};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

type OnReceive = Box<dyn Fn(String) + Send + Sync>;
type OnClose = Box<dyn Fn() + Send + Sync>;

/// A live (or soon-to-be-live) WebSocket connection.
///
/// Writes issued through [`WebSocketSession::send`] are handed to an
/// mpsc channel drained by a single dedicated writer task, which is
/// the Rust analogue of "append to a queue, write only if nothing was
/// already in flight": the channel already guarantees FIFO order and
/// that at most one write is outstanding at a time.
pub struct WebSocketSession {
    key: Mutex<String>,
    sender: mpsc::UnboundedSender<Message>,
    pool: Mutex<Weak<WebSocketPool>>,
    on_receive: Mutex<Option<OnReceive>>,
    on_close: Mutex<Option<OnClose>>,
}

impl WebSocketSession {
    /// Completes the server-side handshake on an already-accepted TCP
    /// stream and spawns the reader/writer tasks.
    pub async fn upgrade(
        stream: TcpStream,
        pool: Arc<WebSocketPool>,
        workers: Arc<WorkerPool>,
        logger: Arc<Logger>,
    ) -> Result<Arc<Self>, tokio_tungstenite::tungstenite::Error> {
        let ws_stream = tokio_tungstenite::accept_async(stream).await?;
        Ok(Self::spawn(ws_stream, pool, workers, logger))
    }

    fn spawn(
        stream: WebSocketStream<TcpStream>,
        pool: Arc<WebSocketPool>,
        workers: Arc<WorkerPool>,
        logger: Arc<Logger>,
    ) -> Arc<Self> {
        let (mut sink, mut source) = stream.split();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Message>();

        let session = Arc::new(Self {
            key: Mutex::new("empty key".to_string()),
            sender,
            pool: Mutex::new(Arc::downgrade(&pool)),
            on_receive: Mutex::new(None),
            on_close: Mutex::new(None),
        });

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                if sink.send(message).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_session = session.clone();
        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let has_callback = reader_session.on_receive.lock().unwrap().is_some();
                        if has_callback {
                            let session = reader_session.clone();
                            workers.submit(move || {
                                if let Some(cb) = session.on_receive.lock().unwrap().as_ref() {
                                    cb(text.to_string());
                                }
                            });
                        }
                    }
                    Ok(Message::Close(_)) => {
                        logger.log("websocket session closed by peer");
                        break;
                    }
                    Err(_) => break,
                    _ => {}
                }
            }
            if let Some(cb) = reader_session.on_close.lock().unwrap().take() {
                cb();
            }
        });

        session
    }

    /// Appends `text` to the send queue. Ordering across calls is
    /// guaranteed: the underlying channel is FIFO and a single writer
    /// task drains it.
    pub fn send(&self, text: impl Into<String>) {
        let _ = self.sender.send(Message::Text(text.into()));
    }

    pub fn close(&self) {
        let _ = self.sender.send(Message::Close(None));
    }

    pub fn register_key(self: &Arc<Self>, key: impl Into<String>, pool: &Arc<WebSocketPool>) {
        let key = key.into();
        *self.key.lock().unwrap() = key.clone();
        pool.put(key, self);
    }

    pub fn key(&self) -> String {
        self.key.lock().unwrap().clone()
    }

    pub fn set_on_receive(&self, cb: impl Fn(String) + Send + Sync + 'static) {
        *self.on_receive.lock().unwrap() = Some(Box::new(cb));
    }

    pub fn set_on_close(&self, cb: impl Fn() + Send + Sync + 'static) {
        *self.on_close.lock().unwrap() = Some(Box::new(cb));
    }

    #[cfg(test)]
    pub(crate) fn for_test(key: &str) -> Self {
        let (sender, _receiver) = mpsc::unbounded_channel();
        Self {
            key: Mutex::new(key.to_string()),
            sender,
            pool: Mutex::new(Weak::new()),
            on_receive: Mutex::new(None),
            on_close: Mutex::new(None),
        }
    }
}

impl Drop for WebSocketSession {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.lock().unwrap().upgrade() {
            pool.erase(&self.key());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_is_empty_key() {
        let session = WebSocketSession::for_test("empty key");
        assert_eq!(session.key(), "empty key");
    }

    #[test]
    fn send_after_close_does_not_panic() {
        let session = WebSocketSession::for_test("k");
        session.close();
        session.send("too late");
    }
}
