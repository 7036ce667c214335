//! User-facing strings.
//!
//! Core code only deals in message keys (`errorsMessages.invalidURL`, ...);
//! a [`Translator`] turns them into text for the active locale.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub trait Translator {
    fn t(&self, key: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(format!("Unsupported locale: {}. Use 'en' or 'ru'", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Ru => write!(f, "ru"),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("errorsMessages.invalidURL", "The link must be a valid URL"),
    ("errorsMessages.duplicateRSS", "RSS already exists"),
    ("errorsMessages.networkError", "Network error"),
    ("errorsMessages.invalidRSS", "The resource does not contain valid RSS"),
    ("errorsMessages.notEmpty", "Must not be empty"),
    ("errorsMessages.unexpected", "Unexpected error"),
    ("successMessages.loadedRSS", "RSS loaded successfully"),
    ("statusMessages.loading", "Loading..."),
    ("statusMessages.parsing", "Parsing..."),
    ("actions.look", "View"),
    ("titles.feeds", "Feeds"),
    ("titles.posts", "Posts"),
    ("titles.preview", "Preview"),
    ("titles.input", "RSS link"),
];

const RU: &[(&str, &str)] = &[
    ("errorsMessages.invalidURL", "Ссылка должна быть валидным URL"),
    ("errorsMessages.duplicateRSS", "RSS уже существует"),
    ("errorsMessages.networkError", "Ошибка сети"),
    ("errorsMessages.invalidRSS", "Ресурс не содержит валидный RSS"),
    ("errorsMessages.notEmpty", "Не должно быть пустым"),
    ("errorsMessages.unexpected", "Непредвиденная ошибка"),
    ("successMessages.loadedRSS", "RSS успешно загружен"),
    ("statusMessages.loading", "Загрузка..."),
    ("statusMessages.parsing", "Обработка..."),
    ("actions.look", "Просмотреть"),
    ("titles.feeds", "Фиды"),
    ("titles.posts", "Посты"),
    ("titles.preview", "Просмотр"),
    ("titles.input", "Ссылка RSS"),
];

/// Built-in string tables. Lookups fall back to English, then to the key.
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: Locale,
    strings: HashMap<&'static str, &'static str>,
    fallback: HashMap<&'static str, &'static str>,
}

impl Catalog {
    pub fn new(locale: Locale) -> Self {
        let table = match locale {
            Locale::En => EN,
            Locale::Ru => RU,
        };
        Self {
            locale,
            strings: table.iter().copied().collect(),
            fallback: EN.iter().copied().collect(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl Translator for Catalog {
    fn t(&self, key: &str) -> String {
        self.strings
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translates_error_keys() {
        let ru = Catalog::new(Locale::Ru);
        assert_eq!(ru.t("errorsMessages.duplicateRSS"), "RSS уже существует");

        let en = Catalog::new(Locale::En);
        assert_eq!(en.t("errorsMessages.notEmpty"), "Must not be empty");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let catalog = Catalog::default();
        assert_eq!(catalog.t("errorsMessages.nope"), "errorsMessages.nope");
    }

    #[test]
    fn test_default_locale_is_english() {
        assert_eq!(Locale::default(), Locale::En);
        assert_eq!(Catalog::default().t("errorsMessages.notEmpty"), "Must not be empty");
    }

    #[test]
    fn test_tables_have_same_keys() {
        let mut en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        let mut ru: Vec<_> = RU.iter().map(|(k, _)| *k).collect();
        en.sort_unstable();
        ru.sort_unstable();
        assert_eq!(en, ru);
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("ru".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!(" EN ".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
        assert_eq!(Locale::Ru.to_string(), "ru");
    }
}
