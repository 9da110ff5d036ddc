use thiserror::Error;

use crate::bus::ContextId;

/// Ошибки операций шины.
///
/// Отказ слушателя сюда не входит: это управляющий сигнал пути доставки,
/// а не ошибка вызывающего.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// Ключ непригоден для регистрации или диспетчеризации: trait-объект
    /// (включая `dyn Any`) либо событие без цепочки диспетчеризации.
    #[error("unsupported event type: {0}")]
    UnsupportedType(&'static str),

    /// Операция над контекстом без живого соединения.
    #[error("context {0} is not connected")]
    NotConnected(ContextId),
}
