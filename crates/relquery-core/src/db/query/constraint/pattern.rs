use crate::db::query::constraint::{Constraint, TextMode};

///
/// Pattern
///
/// Factories for `LIKE` constraints.
///
/// `*` acts as a wildcard unless the text already contains a literal `%`.
/// Patterns always match as a prefix; the `anywhere` forms also match
/// inside the value. Empty or wildcard-only text matches everything and
/// therefore renders nothing.
///

pub struct Pattern;

impl Pattern {
    /// Prefix match: `"john"` binds `"john%"`.
    #[must_use]
    pub fn on(field: impl Into<String>, text: impl Into<String>) -> Constraint {
        Constraint::Pattern(PatternPredicate::new(field, text, false, TextMode::Cs))
    }

    /// Substring match: `"john"` binds `"%john%"`.
    #[must_use]
    pub fn anywhere(field: impl Into<String>, text: impl Into<String>) -> Constraint {
        Constraint::Pattern(PatternPredicate::new(field, text, true, TextMode::Cs))
    }

    #[must_use]
    pub fn on_ignoring_case(field: impl Into<String>, text: impl Into<String>) -> Constraint {
        Constraint::Pattern(PatternPredicate::new(field, text, false, TextMode::Ci))
    }

    #[must_use]
    pub fn anywhere_ignoring_case(
        field: impl Into<String>,
        text: impl Into<String>,
    ) -> Constraint {
        Constraint::Pattern(PatternPredicate::new(field, text, true, TextMode::Ci))
    }
}

///
/// PatternPredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatternPredicate {
    pub field: String,
    /// Caller text before wildcard normalization.
    pub text: String,
    pub anywhere: bool,
    pub text_mode: TextMode,
}

impl PatternPredicate {
    fn new(
        field: impl Into<String>,
        text: impl Into<String>,
        anywhere: bool,
        text_mode: TextMode,
    ) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            anywhere,
            text_mode,
        }
    }

    #[must_use]
    pub fn normalized(&self) -> String {
        normalize_pattern(&self.text, self.anywhere)
    }

    /// False when the normalized pattern is wildcards only.
    #[must_use]
    pub fn contributes(&self) -> bool {
        self.normalized().chars().any(|c| c != '%')
    }
}

/// Normalize caller text into a `LIKE` pattern.
#[must_use]
pub fn normalize_pattern(text: &str, anywhere: bool) -> String {
    if text.is_empty() {
        return "%".to_string();
    }

    let mut pattern = if text.contains('%') {
        text.to_string()
    } else {
        text.replace('*', "%")
    };

    if !pattern.ends_with('%') {
        pattern.push('%');
    }
    if anywhere && !pattern.starts_with('%') {
        pattern.insert(0, '%');
    }

    pattern
}
