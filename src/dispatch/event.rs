use std::sync::Arc;

use serde_json::Value;

/// Событие, которое получает каждый обработчик при доставке.
///
/// Аргументы разделяются между всеми обработчиками одной доставки через
/// `Arc<[Value]>`, поэтому клонирование события дешёвое.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: Arc<str>,
    pub args: Arc<[Value]>,
}

impl Event {
    pub fn new(
        name: impl Into<Arc<str>>,
        args: impl IntoIterator<Item = Value>,
    ) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Аргумент по индексу.
    pub fn arg(
        &self,
        index: usize,
    ) -> Option<&Value> {
        self.args.get(index)
    }

    /// Первый аргумент: самый частый случай для обработчиков вида
    /// `fn add(&self, user)`.
    pub fn first(&self) -> Option<&Value> {
        self.arg(0)
    }
}

/// Преобразование в имя события для `trigger`.
///
/// `None` служит аналогом `null`/`undefined`: такое имя отвергается брокером.
/// Любая строка, включая пустую, считается валидным именем.
pub trait IntoEventName {
    fn into_event_name(self) -> Option<Arc<str>>;
}

impl IntoEventName for &str {
    fn into_event_name(self) -> Option<Arc<str>> {
        Some(Arc::from(self))
    }
}

impl IntoEventName for String {
    fn into_event_name(self) -> Option<Arc<str>> {
        Some(Arc::from(self))
    }
}

impl IntoEventName for &String {
    fn into_event_name(self) -> Option<Arc<str>> {
        Some(Arc::from(self.as_str()))
    }
}

impl IntoEventName for Arc<str> {
    fn into_event_name(self) -> Option<Arc<str>> {
        Some(self)
    }
}

impl<T: IntoEventName> IntoEventName for Option<T> {
    fn into_event_name(self) -> Option<Arc<str>> {
        self.and_then(IntoEventName::into_event_name)
    }
}

/// Разбивает список событий, разделённых пробелами (`"a b c"`).
///
/// Строка без разделимых частей (в том числе `""`) возвращается как есть:
/// пустое имя тоже является событием.
pub(crate) fn split_event_names(events: &str) -> Vec<&str> {
    let names: Vec<&str> = events.split_whitespace().collect();
    if names.is_empty() {
        vec![events]
    } else {
        names
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_creation_and_args() {
        let event = Event::new("users:add", [json!({"id": "123"}), json!(7)]);

        assert_eq!(&*event.name, "users:add");
        assert_eq!(event.first(), Some(&json!({"id": "123"})));
        assert_eq!(event.arg(1), Some(&json!(7)));
        assert_eq!(event.arg(2), None);
    }

    #[test]
    fn test_event_without_args() {
        let event = Event::new("tick", []);
        assert!(event.args.is_empty());
        assert_eq!(event.first(), None);
    }

    #[test]
    fn test_into_event_name() {
        assert_eq!("x".into_event_name().as_deref(), Some("x"));
        assert_eq!(String::from("y").into_event_name().as_deref(), Some("y"));
        assert_eq!(Some("z").into_event_name().as_deref(), Some("z"));
        assert_eq!("".into_event_name().as_deref(), Some(""));
        assert_eq!(None::<&str>.into_event_name(), None);
        assert_eq!(None::<String>.into_event_name(), None);
    }

    #[test]
    fn test_split_event_names() {
        assert_eq!(split_event_names("a"), vec!["a"]);
        assert_eq!(split_event_names("a b  c"), vec!["a", "b", "c"]);
        assert_eq!(split_event_names(" users:add\tusers:delete "), vec![
            "users:add",
            "users:delete"
        ]);
        assert_eq!(split_event_names(""), vec![""]);
    }
}
