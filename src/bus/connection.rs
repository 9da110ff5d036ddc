use std::{any::Any, fmt, sync::Arc};

use super::{
    core::BusCore,
    key::{ContextId, EventKey},
    listener::{FnListener, ListenerRef, Rejected},
};
use crate::error::BusError;

/// Хэндл регистраций, привязанный к одному контексту.
///
/// Живёт от `connect` до `disconnect`; все регистрации, сделанные через
/// него, снимаются одним `disconnect` атомарно. Повторный `connect` того
/// же контекста возвращает хэндл того же соединения.
pub struct Connection {
    pub(crate) core: Arc<BusCore>,
    pub(crate) context: ContextId,
}

impl Connection {
    /// Регистрирует слушателя на ключ и возвращает `&self` для цепочки
    /// вызовов.
    ///
    /// Типовые ключи с trait-объектным дескриптором (включая `dyn Any`)
    /// отвергаются до какого-либо изменения таблицы. Для уже
    /// отключённого контекста возвращает [`BusError::NotConnected`].
    pub fn listen(&self, key: impl Into<EventKey>, listener: ListenerRef) -> Result<&Self, BusError> {
        let key = key.into();
        if let EventKey::Type(tag) = &key {
            if !tag.is_dispatchable() {
                return Err(BusError::UnsupportedType(tag.name()));
            }
        }
        self.core.add_pair(self.context, key, listener)?;
        Ok(self)
    }

    /// Регистрирует типизированное замыкание на ключ типа `E`.
    pub fn listen_typed<E, F>(&self, callback: F) -> Result<&Self, BusError>
    where
        E: Any,
        F: Fn(&E) -> Result<(), Rejected> + Send + Sync + 'static,
    {
        self.listen(EventKey::of::<E>(), FnListener::arc(callback))
    }

    /// Идентичность контекста этого соединения.
    pub fn context_id(&self) -> ContextId {
        self.context
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core) && self.context == other.context
    }
}

impl Eq for Connection {}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection({})", self.context)
    }
}
