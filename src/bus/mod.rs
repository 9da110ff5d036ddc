//! Ядро шины событий.
//!
//! Этот модуль реализует внутрипроцессную типизированную шину
//! publish/subscribe: регистрацию слушателей в рамках соединения и
//! синхронную доставку событий по ключу типа:
//!
//! - `key`: ключи маршрутизации (`TypeTag`, `EventKey`), контракт события
//!   и идентичность контекста.
//! - `intern` (приватный): пул повторного использования токенов-строк.
//! - `listener`: контракт слушателя, сигнал отказа и адаптеры-замыкания.
//! - `compound` (приватный): составная цель для нескольких регистраций
//!   одного ключа.
//! - `handler`: наблюдатель жизненного цикла подписок.
//! - `connection`: хэндл регистраций, привязанный к одному контексту.
//! - `core`: реестр — connect/disconnect/post и таблицы шины.
//!
//! Публичный API переэкспортирует:
//! - `core::*`
//! - `connection::*`
//! - `key::*`
//! - `listener::*`
//! - `handler::*`

mod compound;
pub mod connection;
pub mod core;
pub mod handler;
mod intern;
pub mod key;
pub mod listener;

pub use connection::Connection;
pub use core::{BusBuilder, EventBus};
pub use handler::{ConnectionHandler, StubHandler, TraceHandler};
pub use key::{Context, ContextId, Event, EventKey, TypeTag};
pub use listener::{reject, sink, FnListener, Listener, ListenerId, ListenerRef, Rejected};
