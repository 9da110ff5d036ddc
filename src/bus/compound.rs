use std::sync::Arc;

use super::listener::ListenerRef;

/// Составная цель: несколько регистраций одного ключа таблицы.
///
/// Появляется со второй регистрацией и остаётся составной даже с одним
/// оставшимся участником — обратно в одиночную запись она не
/// схлопывается, чтобы не порождать повторных переходов
/// «ключ появился в таблице».
pub(crate) struct CompoundListener {
    members: Vec<ListenerRef>,
}

impl CompoundListener {
    /// Собирает составную цель из текущей и новой регистрации.
    pub(crate) fn wrap(current: ListenerRef, second: ListenerRef) -> Self {
        let mut compound = Self {
            members: Vec::with_capacity(2),
        };
        compound.add(current);
        compound.add(second);
        compound
    }

    /// Добавляет участника. Повторная регистрация того же экземпляра —
    /// нарушение инварианта, паника.
    pub(crate) fn add(&mut self, listener: ListenerRef) {
        if self.members.iter().any(|member| Arc::ptr_eq(member, &listener)) {
            panic!("same listener instance registered twice for one event key");
        }
        self.members.push(listener);
    }

    /// Убирает участника (по идентичности). Возвращает `true`, если
    /// остался хотя бы один.
    pub(crate) fn remove(&mut self, listener: &ListenerRef) -> bool {
        self.members.retain(|member| !Arc::ptr_eq(member, listener));
        !self.members.is_empty()
    }

    /// Текущие участники, в порядке регистрации.
    pub(crate) fn members(&self) -> &[ListenerRef] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::listener::sink;

    /// Тест проверяет, что составная цель собирает обе регистрации.
    #[test]
    fn test_wrap_collects_both_members() {
        let compound = CompoundListener::wrap(sink(|_: &u8| {}), sink(|_: &u8| {}));
        assert_eq!(compound.members().len(), 2);
    }

    /// Тест проверяет, что тот же экземпляр дважды — паника.
    #[test]
    #[should_panic(expected = "same listener instance registered twice")]
    fn test_duplicate_member_panics() {
        let listener = sink(|_: &u8| {});
        let _ = CompoundListener::wrap(Arc::clone(&listener), listener);
    }

    /// Тест проверяет, что после удаления одного участника цель остаётся
    /// составной, а после удаления последнего — пустой.
    #[test]
    fn test_remove_down_to_empty() {
        let first = sink(|_: &u8| {});
        let second = sink(|_: &u8| {});
        let mut compound = CompoundListener::wrap(Arc::clone(&first), Arc::clone(&second));

        assert!(compound.remove(&first));
        assert_eq!(compound.members().len(), 1);
        assert!(!compound.remove(&second));
        assert!(compound.members().is_empty());
    }

    /// Тест проверяет, что удаление незнакомого участника ничего не
    /// меняет.
    #[test]
    fn test_remove_unknown_member_is_noop() {
        let member = sink(|_: &u8| {});
        let stranger = sink(|_: &u8| {});
        let mut compound = CompoundListener::wrap(Arc::clone(&member), sink(|_: &u8| {}));

        assert!(compound.remove(&stranger));
        assert_eq!(compound.members().len(), 2);
    }
}
