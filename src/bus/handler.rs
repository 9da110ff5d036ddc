use std::any::Any;

use tracing::{debug, warn};

use super::{key::EventKey, listener::ListenerId};

/// Наблюдатель жизненного цикла подписок.
///
/// Шина зовёт его в трёх точках:
/// - `on_start_listen` — ключ появился в таблице (первая регистрация);
/// - `on_end_listen` — ключ исчез из таблицы (снята последняя);
/// - `on_event_rejected` — слушатель отказался от события.
///
/// Первые две нотификации приходят под мьютексом реестра, поэтому из них
/// нельзя обращаться обратно к шине. `on_event_rejected` приходит во
/// время доставки, вне мьютекса.
pub trait ConnectionHandler: Send + Sync {
    /// Для ключа появился первый слушатель.
    fn on_start_listen(&self, key: &EventKey) {
        let _ = key;
    }

    /// Для ключа снят последний слушатель.
    fn on_end_listen(&self, key: &EventKey) {
        let _ = key;
    }

    /// Слушатель отказался от события.
    fn on_event_rejected(&self, key: &EventKey, event: &dyn Any, listener: ListenerId) {
        let _ = (key, event, listener);
    }
}

/// Наблюдатель-заглушка для тех, кому сигналы не нужны.
pub struct StubHandler;

impl ConnectionHandler for StubHandler {}

/// Наблюдатель, пишущий жизненный цикл подписок в `tracing`.
pub struct TraceHandler;

impl ConnectionHandler for TraceHandler {
    fn on_start_listen(&self, key: &EventKey) {
        debug!(key = %key, "listen started");
    }

    fn on_end_listen(&self, key: &EventKey) {
        debug!(key = %key, "listen ended");
    }

    fn on_event_rejected(&self, key: &EventKey, _event: &dyn Any, listener: ListenerId) {
        warn!(key = %key, listener = %listener, "event rejected by listener");
    }
}
