//! Session state: who is signed in, whether writes are in flight, the basket
//! and the edit-window countdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use grocer_core::User;

use super::{BasketState, Countdown};

#[derive(Debug, Default)]
pub struct AppState {
    current_user: RwLock<Option<User>>,
    in_flight: AtomicUsize,
    basket: BasketState,
    countdown: Mutex<Option<Countdown>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn current_user(&self) -> Option<User> {
        self.current_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sign_in(&self, user: User) {
        *self.current_user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Clears the current user. Basket and countdown are left alone.
    pub fn sign_out(&self) -> Option<User> {
        self.current_user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    // =========================================================================
    // Syncing Flag
    // =========================================================================

    /// True while at least one store write is in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Marks a write in flight until the guard drops.
    pub fn begin_sync(&self) -> SyncingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        SyncingGuard { state: self }
    }

    // =========================================================================
    // Basket & Countdown
    // =========================================================================

    pub fn basket(&self) -> &BasketState {
        &self.basket
    }

    /// Replaces the running countdown (dropping the old one stops it).
    pub fn set_countdown(&self, countdown: Option<Countdown>) {
        *self.countdown.lock().unwrap_or_else(PoisonError::into_inner) = countdown;
    }

    pub fn with_countdown<R>(&self, f: impl FnOnce(Option<&Countdown>) -> R) -> R {
        let countdown = self.countdown.lock().unwrap_or_else(PoisonError::into_inner);
        f(countdown.as_ref())
    }

    /// Stops the countdown if it belongs to `order_id`.
    pub fn stop_countdown_for(&self, order_id: &str) {
        let mut countdown = self.countdown.lock().unwrap_or_else(PoisonError::into_inner);
        if countdown.as_ref().is_some_and(|c| c.order_id() == order_id) {
            *countdown = None;
        }
    }
}

/// Decrements the in-flight counter on drop.
#[derive(Debug)]
pub struct SyncingGuard<'a> {
    state: &'a AppState,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
