use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::CorpusFilter;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A TF-IDF model fitted on one exact catalog snapshot
    FittedModel {
        filter: CorpusFilter,
        fingerprint: String,
    },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::FittedModel {
                filter,
                fingerprint,
            } => write!(f, "tfidf:{}:{}", filter, fingerprint),
        }
    }
}

/// Opens a Redis client for the fitted-model cache
///
/// Connections are established lazily, so an unreachable server only shows
/// up as cache errors on first use.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// A serialized value waiting to be written
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed store for fitted models
///
/// Values are written whole under their key and never mutated in place, so a
/// reader sees either a complete value or nothing. Writes go through a
/// background task so ranking never waits on Redis.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Owns the background writer; `shutdown` stops it after draining the queue
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    writer: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer and waits until every queued write has been
    /// attempted.
    pub async fn shutdown(self) {
        // The writer may already be gone if every sender was dropped
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.writer.await {
            tracing::error!(error = %e, "Cache writer task failed");
            return;
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let writer = tokio::spawn(Self::cache_writer_task(
            redis_client.clone(),
            write_rx,
            shutdown_rx,
        ));

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, writer })
    }

    /// Writes queued models until shutdown, then drains what is left
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        tracing::debug!("Cache writer started");

        loop {
            tokio::select! {
                msg = write_rx.recv() => match msg {
                    Some(msg) => Self::write_logged(&client, msg).await,
                    None => return,
                },
                _ = &mut shutdown_rx => break,
            }
        }

        // Clones of `Cache` keep senders alive; closing stops new writes
        // so the drain below terminates.
        write_rx.close();
        let mut flushed = 0usize;
        while let Some(msg) = write_rx.recv().await {
            Self::write_logged(&client, msg).await;
            flushed += 1;
        }
        tracing::debug!(flushed, "Cache writer drained pending writes");
    }

    async fn write_logged(client: &Client, msg: CacheWriteMessage) {
        let key = msg.key.clone();
        if let Err(e) = Self::write_to_redis(client, msg).await {
            tracing::warn!(key = %key, error = %e, "Failed to write fitted model to cache");
        }
    }

    /// Writes a single message to Redis
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Reads and deserializes the value under `key`, `None` on a miss.
    /// Connection and decoding failures are returned to the caller.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Serializes `value` and queues it for the writer. Never blocks and
    /// never fails; problems are only logged.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
