use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Пул повторного использования `Arc<str>` для одинаковых токенов.
/// Crate-private: наружу токены выходят только внутри `EventKey`.
static TOKEN_INTERN: Lazy<DashMap<String, Arc<str>>> = Lazy::new(DashMap::new);

/// Возвращает interned `Arc<str>` для данного токена.
/// При первом обращении с новым текстом создаёт запись в пуле.
#[inline(always)]
pub(crate) fn intern_token<S: AsRef<str>>(token: S) -> Arc<str> {
    let key = token.as_ref();
    if let Some(existing) = TOKEN_INTERN.get(key) {
        return existing.clone();
    }
    TOKEN_INTERN
        .entry(key.to_owned())
        .or_insert_with(|| Arc::from(key))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что повторный вызов с тем же текстом возвращает
    /// тот же самый `Arc<str>` (zero-copy).
    #[test]
    fn test_intern_reuses_allocation() {
        let first = intern_token("orders.created");
        assert_eq!(&*first, "orders.created");

        let second = intern_token("orders.created".to_string());
        assert!(Arc::ptr_eq(&first, &second));
    }

    /// Тест проверяет, что разные токены получают разные аллокации.
    #[test]
    fn test_intern_distinct_tokens() {
        let a = intern_token("alpha");
        let b = intern_token("beta");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(&*a, "alpha");
        assert_eq!(&*b, "beta");
    }
}
