//! `ChessClockServer` builder, accept loop and global ticker.
//!
//! Ties the layers together: transport → protocol → session → room, with
//! one ticker task sweeping every room at a fixed rate.

use std::sync::{Arc, Weak};

use chessclock_game::{Clock, SystemClock};
use chessclock_protocol::{Codec, JsonCodec, RoomId};
use chessclock_room::{RoomConfig, RoomRegistry};
use chessclock_tick::{TickConfig, TickScheduler};
use chessclock_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::ChessClockError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection task and the ticker.
///
/// The registry sits behind one lock: a client action and a tick sweep
/// never touch rooms at the same time.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Builder for configuring and starting a chessclock server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ChessClockServer::builder()
///     .bind("0.0.0.0:8080")
///     .tick_config(TickConfig::with_rate(20))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ChessClockServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    tick_config: TickConfig,
    clock: Arc<dyn Clock>,
}

impl ChessClockServerBuilder {
    /// Creates a builder with default settings: `127.0.0.1:8080`, 5 minute
    /// clocks, 10 Hz ticks, system time.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            tick_config: TickConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the settings new rooms are created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the tick scheduler configuration.
    pub fn tick_config(mut self, config: TickConfig) -> Self {
        self.tick_config = config;
        self
    }

    /// Replaces the time source. Tests pass a `ManualClock`.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Binds the listener and builds the server with the JSON codec.
    ///
    /// # Errors
    /// `ChessClockError::Transport` if the address can't be bound.
    pub async fn build(self) -> Result<ChessClockServer<JsonCodec>, ChessClockError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.room_config)),
            codec: JsonCodec,
            clock: self.clock,
        });

        Ok(ChessClockServer {
            transport,
            state,
            tick_config: self.tick_config,
        })
    }
}

impl Default for ChessClockServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A chessclock server, bound and ready to accept.
///
/// Call [`run()`](Self::run) to start the ticker and the accept loop.
pub struct ChessClockServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    tick_config: TickConfig,
}

impl ChessClockServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ChessClockServerBuilder {
        ChessClockServerBuilder::new()
    }
}

impl<C: Codec> ChessClockServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A read-only view of the room registry, usable while the server runs.
    pub fn handle(&self) -> ServerHandle<C> {
        ServerHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Starts the ticker, then accepts connections until the process ends.
    ///
    /// Each connection gets its own task. A failed accept is logged and
    /// the loop carries on.
    pub async fn run(mut self) -> Result<(), ChessClockError> {
        tokio::spawn(run_ticker(
            Arc::downgrade(&self.state),
            self.tick_config.clone(),
        ));
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            tick_rate_hz = self.tick_config.tick_rate_hz,
            "chessclock server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Sweeps every running room once per tick.
///
/// Holds only a `Weak` reference; stops once the server state is gone.
async fn run_ticker<C: Codec>(weak: Weak<ServerState<C>>, config: TickConfig) {
    let mut scheduler = TickScheduler::new(config);

    loop {
        let info = scheduler.wait_for_tick().await;
        let Some(state) = weak.upgrade() else {
            tracing::debug!(tick = info.tick, "server state dropped, ticker stopping");
            break;
        };

        let report = {
            let mut registry = state.registry.lock().await;
            registry.sweep(state.clock.now_millis(), &state.codec)
        };
        scheduler.record_tick_end();

        tracing::trace!(
            tick = info.tick,
            rooms = report.rooms_swept,
            finished = report.games_finished,
            frames = report.frames_sent,
            "sweep done"
        );
    }
}

/// Read-only window onto a running server's rooms.
pub struct ServerHandle<C: Codec> {
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Clone for ServerHandle<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<C: Codec> ServerHandle<C> {
    /// Number of rooms in the registry.
    pub async fn room_count(&self) -> usize {
        self.state.registry.lock().await.room_count()
    }

    /// All room ids, sorted.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.state.registry.lock().await.room_ids()
    }

    /// Ids of rooms whose clock is running, sorted.
    pub async fn running_room_ids(&self) -> Vec<RoomId> {
        self.state.registry.lock().await.running_room_ids()
    }

    /// Connections subscribed to `room_id`, or `None` if it doesn't exist.
    pub async fn subscriber_count(&self, room_id: &RoomId) -> Option<usize> {
        self.state
            .registry
            .lock()
            .await
            .get(room_id)
            .map(|room| room.subscriber_count())
    }
}
