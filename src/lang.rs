// src/lang.rs

use std::collections::HashMap;

/// Component the rule's strings are registered under.
pub const COMPONENT: &str = "quizaccess_failgrade";

pub const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("pluginname", "Block attempts after pass grade"),
    (
        "failgradedescription",
        "You cannot start a new attempt once you have reached the pass grade for this quiz.",
    ),
    (
        "preventmoreattempts",
        "You have already passed this quiz, so you cannot start another attempt.",
    ),
    ("failgradeenabled", "Block attempts after pass grade"),
    (
        "failgradeenabled_help",
        "If enabled, a student who has reached the pass grade for this quiz will not be allowed to start a new attempt. This option is unavailable when the grading method is \"Average grade\".",
    ),
    (
        "privacy:metadata",
        "The block attempts after pass grade rule does not store any personal data.",
    ),
];

const PT_BR: &[(&str, &str)] = &[
    ("pluginname", "Bloquear tentativas após nota de aprovação"),
    (
        "failgradedescription",
        "Você não pode iniciar uma nova tentativa depois de atingir a nota de aprovação deste questionário.",
    ),
    (
        "preventmoreattempts",
        "Você já foi aprovado neste questionário e não pode iniciar outra tentativa.",
    ),
    ("failgradeenabled", "Bloquear tentativas após nota de aprovação"),
    (
        "failgradeenabled_help",
        "Se ativado, o estudante que atingir a nota de aprovação deste questionário não poderá iniciar uma nova tentativa. Esta opção fica indisponível quando o método de avaliação é \"Nota média\".",
    ),
];

/// Localized string tables for one language, with English as fallback.
#[derive(Debug, Clone)]
pub struct Strings {
    lang: String,
    table: HashMap<&'static str, &'static str>,
    fallback: HashMap<&'static str, &'static str>,
}

impl Strings {
    /// Builds the tables for `lang`. Unknown languages resolve everything from English.
    pub fn for_lang(lang: &str) -> Self {
        let table = match lang {
            "pt_br" => PT_BR,
            "en" => EN,
            other => {
                tracing::warn!("Unknown language '{}', falling back to '{}'", other, DEFAULT_LANG);
                EN
            }
        };

        Self {
            lang: lang.to_string(),
            table: table.iter().copied().collect(),
            fallback: EN.iter().copied().collect(),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Looks up `key` in `component`.
    /// Keys from other components, and keys missing from both tables, render as `[[key]]`.
    pub fn get_string(&self, key: &str, component: &str) -> String {
        if component != COMPONENT {
            return format!("[[{}]]", key);
        }

        self.table
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("[[{}]]", key))
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::for_lang(DEFAULT_LANG)
    }
}
