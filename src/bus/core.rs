use std::{
    any::Any,
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{
    compound::CompoundListener,
    connection::Connection,
    handler::{ConnectionHandler, StubHandler},
    key::{Context, ContextId, Event, EventKey},
    listener::{ListenerId, ListenerRef, Rejected},
};
use crate::error::BusError;

/// Цель диспетчеризации одного ключа таблицы.
enum Target {
    Single(ListenerRef),
    Compound(CompoundListener),
}

/// Снимок цели, снятый под мьютексом для вызова вне его.
enum Dispatch {
    Single(ListenerRef),
    Fanout(Vec<ListenerRef>),
}

/// Как реестр удерживает контекст соединения.
enum ContextHold {
    /// Обычный режим: реестр сам владеет контекстом, поэтому пока запись
    /// существует, контекст жив и его адрес не может быть переиспользован
    /// другой аллокацией.
    Strong { _keepalive: Context },
    /// Слабый режим: запись подлежит утилизации, когда контекст стал
    /// недостижим снаружи.
    Weak(Weak<dyn Any + Send + Sync>),
}

impl ContextHold {
    /// `false` только для слабого удержания с недостижимым контекстом;
    /// сильное удержание живо по построению.
    fn alive(&self) -> bool {
        match self {
            ContextHold::Strong { .. } => true,
            ContextHold::Weak(context) => context.strong_count() > 0,
        }
    }
}

/// Запись соединения: удержание контекста плюс список пар
/// (ключ, слушатель), зарегистрированных через него.
struct ConnEntry {
    context: ContextHold,
    pairs: Vec<(EventKey, ListenerRef)>,
}

/// Состояние реестра под одним мьютексом: таблица слушателей и таблица
/// соединений. Обе принадлежат исключительно шине.
struct Inner {
    listeners: HashMap<EventKey, Target>,
    connections: HashMap<ContextId, ConnEntry>,
}

pub(crate) struct BusCore {
    inner: Mutex<Inner>,
    handler: Arc<dyn ConnectionHandler>,
    weak_connections: bool,
}

impl BusCore {
    /// Регистрирует пару на соединении и в таблице. Зовётся хэндлом
    /// [`Connection`] с уже проверенным ключом.
    pub(crate) fn add_pair(
        &self,
        context: ContextId,
        key: EventKey,
        listener: ListenerRef,
    ) -> Result<(), BusError> {
        let mut inner = self.inner.lock();
        let entry = inner
            .connections
            .get_mut(&context)
            .ok_or(BusError::NotConnected(context))?;
        entry.pairs.push((key.clone(), listener.clone()));
        if add_listener(&mut inner.listeners, key.clone(), listener) {
            trace!(key = %key, "listen started");
            self.handler.on_start_listen(&key);
        }
        Ok(())
    }

    /// Снимает все пары соединения с таблицы. Вызывается под мьютексом.
    fn teardown(&self, inner: &mut Inner, entry: ConnEntry) {
        for (key, listener) in entry.pairs {
            if remove_listener(&mut inner.listeners, &key, &listener) {
                trace!(key = %key, "listen ended");
                self.handler.on_end_listen(&key);
            }
        }
    }

    /// Утилизирует соединения с недостижимыми контекстами (слабый
    /// режим). Снятые записи проходят обычный teardown.
    fn purge_dead(&self, inner: &mut Inner) {
        let dead: Vec<ContextId> = inner
            .connections
            .iter()
            .filter(|(_, entry)| !entry.context.alive())
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            if let Some(entry) = inner.connections.remove(&id) {
                debug!(context = %id, "unreachable context reclaimed");
                self.teardown(inner, entry);
            }
        }
    }
}

/// Вставляет слушателя в таблицу. Возвращает `true`, если ключ появился
/// в таблице впервые.
fn add_listener(table: &mut HashMap<EventKey, Target>, key: EventKey, listener: ListenerRef) -> bool {
    match table.entry(key) {
        Entry::Vacant(vacant) => {
            vacant.insert(Target::Single(listener));
            true
        }
        Entry::Occupied(mut occupied) => {
            let target = occupied.get_mut();
            match target {
                Target::Single(current) => {
                    let current = Arc::clone(current);
                    *target = Target::Compound(CompoundListener::wrap(current, listener));
                }
                Target::Compound(compound) => compound.add(listener),
            }
            false
        }
    }
}

/// Убирает регистрацию из таблицы. Возвращает `true`, если ключ исчез из
/// таблицы (последняя регистрация снята).
fn remove_listener(
    table: &mut HashMap<EventKey, Target>,
    key: &EventKey,
    listener: &ListenerRef,
) -> bool {
    let remove_entry = match table.get_mut(key) {
        None => false,
        Some(Target::Single(current)) => Arc::ptr_eq(current, listener),
        // Составная цель остаётся составной и с одним участником.
        Some(Target::Compound(compound)) => !compound.remove(listener),
    };
    if remove_entry {
        table.remove(key);
    }
    remove_entry
}

/// Внутрипроцессная типизированная шина событий.
///
/// Клонирование дёшево и даёт ещё одну ссылку на тот же реестр.
#[derive(Clone)]
pub struct EventBus {
    core: Arc<BusCore>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EventBus {
    /// Шина с наблюдателем-заглушкой и обычными (сильными) соединениями.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> BusBuilder {
        BusBuilder::default()
    }

    /// Возвращает соединение для контекста, создавая его при первом
    /// обращении. Повторный вызов с тем же контекстом до `disconnect`
    /// возвращает то же самое соединение и не трогает наблюдателя.
    pub fn connect<C: Any + Send + Sync>(&self, context: &Arc<C>) -> Connection {
        let id = ContextId::of(context);
        {
            let mut inner = self.core.inner.lock();
            if self.core.weak_connections {
                self.core.purge_dead(&mut inner);
            }
            inner.connections.entry(id).or_insert_with(|| {
                trace!(context = %id, "context connected");
                let erased: Context = Arc::clone(context) as Context;
                let hold = if self.core.weak_connections {
                    ContextHold::Weak(Arc::downgrade(&erased))
                } else {
                    ContextHold::Strong { _keepalive: erased }
                };
                ConnEntry {
                    context: hold,
                    pairs: Vec::new(),
                }
            });
        }
        Connection {
            core: Arc::clone(&self.core),
            context: id,
        }
    }

    /// Закрывает соединение контекста и атомарно снимает все его
    /// регистрации. Для неподключённого контекста —
    /// [`BusError::NotConnected`].
    pub fn disconnect<C: Any + Send + Sync>(&self, context: &Arc<C>) -> Result<(), BusError> {
        let id = ContextId::of(context);
        let mut inner = self.core.inner.lock();
        if self.core.weak_connections {
            self.core.purge_dead(&mut inner);
        }
        let entry = inner
            .connections
            .remove(&id)
            .ok_or(BusError::NotConnected(id))?;
        self.core.teardown(&mut inner, entry);
        debug!(context = %id, "context disconnected");
        Ok(())
    }

    /// Публикует событие по его цепочке диспетчеризации: от конкретного
    /// типа вверх по предкам. Возвращает `true`, если хотя бы один
    /// уровень доставил событие.
    ///
    /// Пустая цепочка и trait-объектные дескрипторы в ней отвергаются до
    /// какой-либо доставки.
    pub fn post(&self, event: &dyn Event) -> Result<bool, BusError> {
        let chain = event.dispatch_chain();
        if chain.is_empty() {
            return Err(BusError::UnsupportedType("<empty dispatch chain>"));
        }
        for tag in &chain {
            if !tag.is_dispatchable() {
                return Err(BusError::UnsupportedType(tag.name()));
            }
        }
        let payload: &dyn Any = event;
        let mut delivered = false;
        for tag in chain {
            delivered |= self.post_to(tag, payload);
        }
        Ok(delivered)
    }

    /// Публикует событие на один ключ, без обхода иерархии. Возвращает
    /// `false`, если слушателей нет или одиночный слушатель отказался.
    ///
    /// Одиночный отказ гасит доставку; отказ участника составной цели
    /// лишь пропускает этого участника, сам вызов считается доставкой.
    /// Слушатели вызываются вне мьютекса реестра, так что изнутри
    /// слушателя можно снова обращаться к шине.
    pub fn post_to(&self, key: impl Into<EventKey>, event: &dyn Any) -> bool {
        let key = key.into();
        let target = {
            let inner = self.core.inner.lock();
            match inner.listeners.get(&key) {
                None => None,
                Some(Target::Single(listener)) => Some(Dispatch::Single(Arc::clone(listener))),
                Some(Target::Compound(compound)) => {
                    Some(Dispatch::Fanout(compound.members().to_vec()))
                }
            }
        };
        match target {
            None => false,
            Some(Dispatch::Single(listener)) => match listener.on_event(event) {
                Ok(()) => true,
                Err(Rejected) => {
                    trace!(key = %key, "event rejected");
                    self.core
                        .handler
                        .on_event_rejected(&key, event, ListenerId::of(&listener));
                    false
                }
            },
            Some(Dispatch::Fanout(members)) => {
                for listener in members {
                    if listener.on_event(event).is_err() {
                        trace!(key = %key, "event rejected by compound member");
                        self.core
                            .handler
                            .on_event_rejected(&key, event, ListenerId::of(&listener));
                    }
                }
                true
            }
        }
    }

    /// Количество живых соединений (диагностика).
    pub fn connections_count(&self) -> usize {
        self.core.inner.lock().connections.len()
    }

    /// Количество ключей в таблице слушателей (диагностика).
    pub fn listeners_count(&self) -> usize {
        self.core.inner.lock().listeners.len()
    }
}

/// Построитель шины.
///
/// Распознаваемые опции: наблюдатель жизненного цикла подписок
/// (по умолчанию заглушка) и слабые соединения (по умолчанию выключены).
#[derive(Default)]
pub struct BusBuilder {
    handler: Option<Arc<dyn ConnectionHandler>>,
    weak_connections: bool,
}

impl BusBuilder {
    pub fn with_connection_handler(mut self, handler: Arc<dyn ConnectionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Контекст удерживается слабо: его соединение подлежит утилизации
    /// при следующем `connect`/`disconnect` после того, как контекст
    /// стал недостижим. Утилизация снимает и регистрации соединения.
    pub fn with_weak_connections(mut self) -> Self {
        self.weak_connections = true;
        self
    }

    pub fn build(self) -> EventBus {
        EventBus {
            core: Arc::new(BusCore {
                inner: Mutex::new(Inner {
                    listeners: HashMap::new(),
                    connections: HashMap::new(),
                }),
                handler: self.handler.unwrap_or_else(|| Arc::new(StubHandler)),
                weak_connections: self.weak_connections,
            }),
        }
    }
}
