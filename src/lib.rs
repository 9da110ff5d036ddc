//! # vestnik
//!
//! Lightweight in-process typed publish/subscribe bus.
//!
//! Callers register event listeners scoped to an opaque *context* handle and
//! post events that are routed to listeners keyed by event type. Two kinds of
//! keys share one routing table:
//!
//! - **type keys** ([`TypeTag`]) derived from an event's concrete type, with a
//!   hierarchy walk over an explicitly declared dispatch chain;
//! - **opaque tokens** (interned strings) for plain named channels.
//!
//! Dispatch is synchronous on the caller's thread: no queues, no background
//! tasks, no back-pressure. A single mutex owned by the bus serializes all
//! registration and table access, while listener callbacks run outside of it,
//! so listeners may re-enter the bus.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use vestnik::{Event, EventBus, TypeTag};
//!
//! struct Tick(u64);
//!
//! impl Event for Tick {
//!     fn dispatch_chain(&self) -> Vec<TypeTag> {
//!         vec![TypeTag::of::<Tick>()]
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let ctx = Arc::new("main".to_string());
//!
//! bus.connect(&ctx)
//!     .listen_typed(|tick: &Tick| {
//!         println!("tick #{}", tick.0);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert!(bus.post(&Tick(1)).unwrap());
//! bus.disconnect(&ctx).unwrap();
//! assert!(!bus.post(&Tick(2)).unwrap());
//! ```

/// Bus core: registry, connections, listeners, dispatch.
pub mod bus;
/// Common error types.
pub mod error;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Bus, builder and the connection handle.
pub use bus::{BusBuilder, Connection, EventBus};
/// Event contract and routing keys.
pub use bus::{ContextId, Event, EventKey, TypeTag};
/// Listener contract, rejection signal and adapters.
pub use bus::{reject, sink, FnListener, Listener, ListenerId, ListenerRef, Rejected};
/// Connection-lifecycle observer.
pub use bus::{ConnectionHandler, StubHandler, TraceHandler};
/// Bus errors.
pub use error::BusError;
