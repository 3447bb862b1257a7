//! Connection lifecycle state machine.
//!
//! ```text
//! Advertising --connect--> Connected --disconnect--> Disconnecting
//!      ^                                                  |
//!      +------ request advertising <-- Recycled <--recycle-+
//! ```
//!
//! Events that don't match a transition from the current state are
//! ignored (and logged); the stack doesn't promise ordering and a stray
//! event must not trigger a second advertising start.

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::advertising::AdvertisingScheduler;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    Advertising,
    Connected,
    Disconnecting,
    Recycled,
}

/// Connection events delivered by the radio stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleEvent {
    /// A central connected.
    Connected,
    /// A connection attempt failed with the given HCI status.
    ConnectFailed(u8),
    /// The link dropped. Not every stack reports the HCI reason.
    Disconnected { reason: Option<u8> },
    /// The stack released the connection object.
    Recycled,
}

/// Next state for `event` in `state`, or `None` if the event is not a
/// valid transition.
pub fn transition(state: ConnectionState, event: LifecycleEvent) -> Option<ConnectionState> {
    use ConnectionState as S;
    use LifecycleEvent as E;

    match (state, event) {
        (S::Advertising, E::Connected) => Some(S::Connected),
        (S::Advertising, E::ConnectFailed(_)) => Some(S::Advertising),
        (S::Connected, E::Disconnected { .. }) => Some(S::Disconnecting),
        (S::Disconnecting, E::Recycled) => Some(S::Recycled),
        _ => None,
    }
}

/// Drives the advertising scheduler from connection events.
pub struct ConnectionLifecycleManager<'a, M: RawMutex> {
    state: ConnectionState,
    scheduler: &'a AdvertisingScheduler<M>,
}

impl<'a, M: RawMutex> ConnectionLifecycleManager<'a, M> {
    /// Request the first advertising start and begin in `Advertising`.
    pub fn start(scheduler: &'a AdvertisingScheduler<M>) -> Self {
        scheduler.request_start();
        Self {
            state: ConnectionState::Advertising,
            scheduler,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Apply one event; returns the resulting state.
    ///
    /// `Recycled` is transient: the manager requests advertising and
    /// settles in `Advertising` before returning.
    pub fn handle(&mut self, event: LifecycleEvent) -> Result<ConnectionState, Error> {
        let Some(next) = transition(self.state, event) else {
            warn!("Ignoring {} in state {}", event, self.state);
            return Err(Error::InvalidTransition);
        };

        match event {
            LifecycleEvent::Connected => info!("Connected"),
            LifecycleEvent::ConnectFailed(err) => error!("Connection failed (err {})", err),
            LifecycleEvent::Disconnected { reason: Some(reason) } => {
                info!("Disconnected (reason {})", reason)
            }
            LifecycleEvent::Disconnected { reason: None } => info!("Disconnected"),
            LifecycleEvent::Recycled => info!("Connection object recycled"),
        }

        self.state = next;
        if next == ConnectionState::Recycled {
            self.scheduler.request_start();
            self.state = ConnectionState::Advertising;
        }
        Ok(self.state)
    }
}
