//! # Edit-Window Countdown
//!
//! Seconds left to modify the most recently placed order, published on a
//! `watch` channel for display.
//!
//! ```text
//! place_order ──► Countdown::start ──► interval(tick) ──► seconds_remaining(now)
//!                                           │                    │
//!                                           │            changed? send
//!                                           │                    │
//!                                           └──── until 0 ◄──────┘
//! ```
//!
//! The countdown is display only. `modify_order` re-checks `editableUntil`
//! against the clock when it runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use grocer_core::Order;

use super::Clock;

#[derive(Debug)]
pub struct Countdown {
    order_id: String,
    remaining: watch::Receiver<i64>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawns the ticker for `order`. Must be called inside a Tokio runtime.
    pub fn start(order: &Order, clock: Arc<dyn Clock>, tick: Duration) -> Self {
        let initial = order.seconds_remaining(clock.now_ms());
        let (sender, remaining) = watch::channel(initial);
        let ticking = order.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let seconds = ticking.seconds_remaining(clock.now_ms());
                sender.send_if_modified(|current| {
                    if *current == seconds {
                        return false;
                    }
                    *current = seconds;
                    true
                });

                if seconds == 0 {
                    debug!(order_id = %ticking.id, "Edit window closed");
                    break;
                }
            }
        });

        Countdown {
            order_id: order.id.clone(),
            remaining,
            handle,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Latest published value.
    pub fn seconds_remaining(&self) -> i64 {
        *self.remaining.borrow()
    }

    /// Receiver for a display that wants to await changes.
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.remaining.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ManualClock;
    use grocer_core::OrderStatus;

    const T0: i64 = 1_700_000_000_000;

    fn order(window_secs: i64) -> Order {
        Order {
            id: "ORD-1".to_string(),
            customer_id: "u1".to_string(),
            items: Vec::new(),
            subtotal: 0,
            delivery_charges: 0,
            total: 0,
            status: OrderStatus::Pending,
            created_at: T0,
            editable_until: Some(T0 + window_secs * 1000),
            estimated_delivery_time: None,
            assigned_purchaser_id: None,
            assigned_rider_id: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_and_stops() {
        let clock = Arc::new(ManualClock::new(T0));
        let countdown = Countdown::start(&order(45), clock.clone(), Duration::from_secs(1));
        let mut rx = countdown.subscribe();
        assert_eq!(countdown.order_id(), "ORD-1");
        assert_eq!(countdown.seconds_remaining(), 45);

        clock.advance_secs(44);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);

        clock.advance_secs(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!countdown.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_window_starts_at_zero() {
        let clock = Arc::new(ManualClock::new(T0 + 60_000));
        let countdown = Countdown::start(&order(45), clock, Duration::from_secs(1));
        assert_eq!(countdown.seconds_remaining(), 0);
    }
}
