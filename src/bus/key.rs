use std::{
    any::{type_name, Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use super::intern::intern_token;

/// Контекст соединения: произвольное значение, сравниваемое по адресу
/// аллокации. Шина никогда не заглядывает внутрь контекста.
pub type Context = Arc<dyn Any + Send + Sync>;

/// Идентичность контекста в таблице соединений.
///
/// Получается из адреса `Arc`-аллокации, поэтому два разных `Arc` с
/// одинаковым содержимым — это два разных контекста, а клоны одного
/// `Arc` — один и тот же.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

impl ContextId {
    /// Возвращает идентичность для данного контекста.
    pub fn of<C: ?Sized>(context: &Arc<C>) -> Self {
        ContextId(Arc::as_ptr(context) as *const () as usize)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId(0x{:x})", self.0)
    }
}

/// Дескриптор типа события: `TypeId` плюс имя типа для диагностики.
///
/// Сравнение и хеширование — только по `TypeId`.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Дескриптор для типа `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Имя типа (как его видит `std::any::type_name`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Пригоден ли дескриптор как цель регистрации и диспетчеризации.
    ///
    /// Универсальная база (`dyn Any`) и любые trait-объекты исключены:
    /// по ним обход цепочки диспетчеризации не имеет смысла.
    pub(crate) fn is_dispatchable(&self) -> bool {
        self.id != TypeId::of::<dyn Any>() && !self.name.starts_with("dyn ")
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name)
    }
}

/// Ключ маршрутизации события.
///
/// Два вида ключей живут в одной таблице:
/// - `Type` — дескриптор типа события, участвует в обходе иерархии;
/// - `Token` — непрозрачный именованный канал без типовой дисциплины.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum EventKey {
    /// Ключ-дескриптор типа.
    Type(TypeTag),
    /// Непрозрачный токен (interned строка).
    Token(Arc<str>),
}

impl EventKey {
    /// Типовой ключ для `T`.
    pub fn of<T: Any>() -> Self {
        EventKey::Type(TypeTag::of::<T>())
    }

    /// Токен-ключ. Одинаковые строки делят одну `Arc<str>`-аллокацию.
    pub fn token(token: impl AsRef<str>) -> Self {
        EventKey::Token(intern_token(token))
    }
}

impl From<TypeTag> for EventKey {
    fn from(tag: TypeTag) -> Self {
        EventKey::Type(tag)
    }
}

impl From<&str> for EventKey {
    fn from(token: &str) -> Self {
        EventKey::token(token)
    }
}

impl From<String> for EventKey {
    fn from(token: String) -> Self {
        EventKey::token(token)
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Type(tag) => f.write_str(tag.name()),
            EventKey::Token(token) => write!(f, "\"{token}\""),
        }
    }
}

/// Контракт события с объявленной цепочкой диспетчеризации.
///
/// Цепочка перечисляет дескрипторы от конкретного типа вверх к предкам,
/// универсальная база в неё не входит. `EventBus::post` проходит цепочку
/// по порядку и доставляет событие на каждом уровне, где есть слушатели.
///
/// ```rust
/// use vestnik::{Event, TypeTag};
///
/// struct Quantity; // маркер-предок
/// struct Litres(f64);
///
/// impl Event for Litres {
///     fn dispatch_chain(&self) -> Vec<TypeTag> {
///         vec![TypeTag::of::<Litres>(), TypeTag::of::<Quantity>()]
///     }
/// }
/// ```
pub trait Event: Any {
    /// Цепочка диспетчеризации: конкретный тип, затем предки по порядку.
    fn dispatch_chain(&self) -> Vec<TypeTag>;
}
