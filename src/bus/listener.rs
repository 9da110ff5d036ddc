use std::{
    any::{type_name, Any},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

/// Сигнал отказа слушателя.
///
/// Это не ошибка и не диагностика, а лёгкий управляющий сигнал: «не
/// считать этот вызов успешной доставкой». Стека вызовов и сообщения у
/// него нет намеренно.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected;

/// Удобный способ отказаться от события изнутри слушателя:
/// `return reject();`
#[inline]
pub fn reject() -> Result<(), Rejected> {
    Err(Rejected)
}

/// Контракт слушателя: один метод на одно событие.
///
/// Событие приходит как `&dyn Any`; типизированные адаптеры
/// ([`FnListener`], [`sink`]) выполняют downcast за вызывающего.
pub trait Listener: Send + Sync {
    /// Обрабатывает событие либо возвращает [`Rejected`].
    fn on_event(&self, event: &dyn Any) -> Result<(), Rejected>;
}

/// Разделяемая ссылка на слушателя. Идентичность регистрации — это
/// идентичность `Arc`-аллокации.
pub type ListenerRef = Arc<dyn Listener>;

/// Идентичность слушателя, сообщаемая наблюдателю при отказе.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    pub(crate) fn of(listener: &ListenerRef) -> Self {
        ListenerId(Arc::as_ptr(listener) as *const () as usize)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId(0x{:x})", self.0)
    }
}

/// Типизированный слушатель из замыкания.
///
/// Downcast'ит событие к `E` и передаёт в замыкание. Несовпадение типа —
/// это ошибка на стороне публикующего (токен-каналы не несут типовой
/// дисциплины), поэтому она всплывает паникой в точке вызова.
pub struct FnListener<E, F> {
    callback: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    E: Any,
    F: Fn(&E) -> Result<(), Rejected> + Send + Sync + 'static,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _event: PhantomData,
        }
    }

    /// Сразу упаковывает слушателя в [`ListenerRef`].
    pub fn arc(callback: F) -> ListenerRef {
        Arc::new(Self::new(callback))
    }
}

impl<E, F> Listener for FnListener<E, F>
where
    E: Any,
    F: Fn(&E) -> Result<(), Rejected> + Send + Sync + 'static,
{
    fn on_event(&self, event: &dyn Any) -> Result<(), Rejected> {
        match event.downcast_ref::<E>() {
            Some(event) => (self.callback)(event),
            None => panic!(
                "listener for {} received an event of a different type",
                type_name::<E>()
            ),
        }
    }
}

/// Безотказный слушатель из замыкания: всегда считается успешной
/// доставкой.
pub fn sink<E, F>(callback: F) -> ListenerRef
where
    E: Any,
    F: Fn(&E) + Send + Sync + 'static,
{
    FnListener::arc(move |event: &E| {
        callback(event);
        Ok(())
    })
}
