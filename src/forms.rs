// src/forms.rs

use serde::Serialize;

use crate::lang::Strings;

/// Kind of a form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A select with "No" (0) and "Yes" (1).
    SelectYesNo,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormElement {
    pub kind: ElementKind,
    pub name: String,
    pub label: String,
    pub options: Vec<(i64, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Eq,
    Neq,
}

/// `field` is greyed out while `depends_on` satisfies `condition` against `value`.
#[derive(Debug, Clone, Serialize)]
pub struct DisabledIf {
    pub field: String,
    pub depends_on: String,
    pub condition: Condition,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelpButton {
    pub field: String,
    pub title: String,
    pub text: String,
}

/// Serializable description of the quiz settings form.
/// Access rules add their own fields to it.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SettingsForm {
    pub elements: Vec<FormElement>,
    pub disabled_if: Vec<DisabledIf>,
    pub help_buttons: Vec<HelpButton>,
}

impl SettingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_select_yes_no(&mut self, name: &str, label: String) {
        self.elements.push(FormElement {
            kind: ElementKind::SelectYesNo,
            name: name.to_string(),
            label,
            options: vec![(0, "No".to_string()), (1, "Yes".to_string())],
        });
    }

    pub fn disabled_if(&mut self, field: &str, depends_on: &str, condition: Condition, value: i64) {
        self.disabled_if.push(DisabledIf {
            field: field.to_string(),
            depends_on: depends_on.to_string(),
            condition,
            value,
        });
    }

    /// Attaches help to `field`. Title is `identifier`, text is `identifier_help`, both from `component`.
    pub fn add_help_button(&mut self, field: &str, identifier: &str, component: &str, strings: &Strings) {
        self.help_buttons.push(HelpButton {
            field: field.to_string(),
            title: strings.get_string(identifier, component),
            text: strings.get_string(&format!("{}_help", identifier), component),
        });
    }

    pub fn element(&self, name: &str) -> Option<&FormElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Whether `field` is disabled given the current value of the fields it depends on.
    pub fn is_disabled(&self, field: &str, current: impl Fn(&str) -> Option<i64>) -> bool {
        self.disabled_if
            .iter()
            .filter(|d| d.field == field)
            .any(|d| match (current(&d.depends_on), d.condition) {
                (Some(v), Condition::Eq) => v == d.value,
                (Some(v), Condition::Neq) => v != d.value,
                (None, _) => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::COMPONENT;

    #[test]
    fn test_disabled_if_eq() {
        let mut form = SettingsForm::new();
        form.disabled_if("a", "b", Condition::Eq, 2);

        assert!(form.is_disabled("a", |_| Some(2)));
        assert!(!form.is_disabled("a", |_| Some(1)));
        assert!(!form.is_disabled("a", |_| None));
        assert!(!form.is_disabled("b", |_| Some(2)));
    }

    #[test]
    fn test_help_button_resolves_help_text() {
        let strings = Strings::default();
        let mut form = SettingsForm::new();
        form.add_help_button("failgradeenabled", "failgradeenabled", COMPONENT, &strings);

        let help = &form.help_buttons[0];
        assert_eq!(help.title, strings.get_string("failgradeenabled", COMPONENT));
        assert_eq!(help.text, strings.get_string("failgradeenabled_help", COMPONENT));
    }
}
