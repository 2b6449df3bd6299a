/// One item of the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub title: String,
    /// `$$<tex>$$`, ready for a math typesetter; `None` for errors
    pub rendered_math: Option<String>,
    /// plain text shown instead of math for errors
    pub message: Option<String>,
    pub is_error: bool,
}

impl ResultEntry {
    pub fn math(title: &str, tex: &str) -> Self {
        ResultEntry {
            title: title.to_string(),
            rendered_math: Some(format!("$${}$$", tex)),
            message: None,
            is_error: false,
        }
    }

    pub fn error(message: &str) -> Self {
        ResultEntry {
            title: "Error".to_string(),
            rendered_math: None,
            message: Some(message.to_string()),
            is_error: true,
        }
    }

    /// The TeX without the `$$` delimiters.
    pub fn tex(&self) -> Option<&str> {
        self.rendered_math
            .as_deref()
            .and_then(|m| m.strip_prefix("$$"))
            .and_then(|m| m.strip_suffix("$$"))
    }
}

/// Ordered list of results of the last submission.
#[derive(Debug, Clone, Default)]
pub struct ResultPanel {
    entries: Vec<ResultEntry>,
}

impl ResultPanel {
    pub fn new() -> Self {
        ResultPanel::default()
    }

    pub fn show_result(&mut self, title: &str, tex: &str) {
        log::info!("{}: {}", title, tex);
        self.entries.push(ResultEntry::math(title, tex));
    }

    pub fn show_error(&mut self, message: &str) {
        log::error!("{}", message);
        self.entries.push(ResultEntry::error(message));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_order() {
        let mut panel = ResultPanel::new();
        panel.show_result("Order 1", "2x");
        panel.show_error("Unable to find derivative: boom");
        assert_eq!(panel.len(), 2);
        let first = &panel.entries()[0];
        assert_eq!(first.rendered_math.as_deref(), Some("$$2x$$"));
        assert_eq!(first.tex(), Some("2x"));
        assert!(!first.is_error);
        let second = &panel.entries()[1];
        assert_eq!(second.title, "Error");
        assert!(second.is_error);
        assert_eq!(second.tex(), None);
        assert_eq!(second.message.as_deref(), Some("Unable to find derivative: boom"));
        panel.clear();
        assert!(panel.is_empty());
    }
}
