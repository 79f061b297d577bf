//! # State Module
//!
//! Session state owned by the [`crate::Storefront`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │    AppState      │  │   BasketState    │  │     Countdown        │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  current user    │  │  Arc<Mutex<      │  │  interval task +     │  │
//! │  │  in-flight count │  │    Basket        │  │  watch::Receiver     │  │
//! │  │                  │  │  >>              │  │                      │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────┐                                                  │
//! │  │     Clock        │  SystemClock in production, ManualClock in tests │
//! │  └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod basket;
mod clock;
mod countdown;
mod session;

pub use basket::BasketState;
pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::Countdown;
pub use session::{AppState, SyncingGuard};
