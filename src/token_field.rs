//! Buffer and popup state behind a placeholder-aware text field.
//!
//! `TokenField` is the single owner of a field's text. Both mutation paths go through
//! it: native input (`apply_input`) and a confirmed token edit (`confirm`). Each method
//! that changes the text returns the new value so the view can emit exactly one change
//! event per edit.

use crate::placeholder::{self, Segment, TokenMatch};
use crate::popup_geometry::Point;

/// State of an open token editor popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupState {
    pub token_name: String,
    pub edit_value: String,
    pub anchor: Point,
    pub match_index: usize,
    /// The clicked match as scanned at open time, used to re-validate on confirm.
    clicked: TokenMatch,
    /// Select the prefilled name once the popup has been drawn.
    select_pending: bool,
}

/// How a popup was closed without saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Cancel,
    Escape,
    OutsideClick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The token was replaced; carries the complete new text.
    Applied(String),
    /// The text changed underneath the popup and the clicked token is gone.
    Stale,
    /// No popup was open.
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct TokenField {
    text: String,
    popup: Option<PopupState>,
}

impl TokenField {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            popup: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Matches for the current text. Recomputed on every call.
    pub fn matches(&self) -> Vec<TokenMatch> {
        placeholder::scan(&self.text)
    }

    pub fn segments<'a>(&'a self, matches: &[TokenMatch]) -> Vec<Segment<'a>> {
        placeholder::render(&self.text, matches)
    }

    pub fn popup(&self) -> Option<&PopupState> {
        self.popup.as_ref()
    }

    /// Replace the text on behalf of the field's owner. Never reported back as a change.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Take a value from the native input.
    ///
    /// Returns the new text when it differs from the buffer. An identical value is the
    /// native surface echoing a write made by this field and is not a user edit.
    pub fn apply_input(&mut self, text: &str) -> Option<String> {
        if text == self.text {
            return None;
        }
        self.text = text.to_string();
        Some(self.text.clone())
    }

    /// Open the editor for the match at `match_index`, replacing any open popup.
    pub fn open_popup(&mut self, match_index: usize, anchor: Point) -> Option<&PopupState> {
        let Some(clicked) = self.matches().into_iter().nth(match_index) else {
            log::debug!("ignoring click on missing token #{match_index}");
            return None;
        };

        log::debug!("opening token editor for {{{{{}}}}}", clicked.name);
        self.popup = Some(PopupState {
            token_name: clicked.name.clone(),
            edit_value: clicked.name.clone(),
            anchor,
            match_index,
            clicked,
            select_pending: true,
        });
        self.popup.as_ref()
    }

    /// True exactly once per opened popup: the first time the view asks after drawing it.
    pub fn take_select_request(&mut self) -> bool {
        self.popup
            .as_mut()
            .map(|popup| std::mem::take(&mut popup.select_pending))
            .unwrap_or(false)
    }

    pub fn set_edit_value(&mut self, value: impl Into<String>) {
        if let Some(popup) = self.popup.as_mut() {
            popup.edit_value = value.into();
        }
    }

    /// Save the popup's value into the text and close the popup.
    ///
    /// The whole `{{name}}` literal is replaced by the edit value, even when the value
    /// is still the prefilled name.
    pub fn confirm(&mut self) -> ConfirmOutcome {
        let Some(popup) = self.popup.take() else {
            return ConfirmOutcome::Closed;
        };

        let current = self.matches().into_iter().nth(popup.match_index);
        let Some(token) = current.filter(|token| *token == popup.clicked) else {
            log::warn!(
                "discarding edit of {{{{{}}}}}: the token moved or was removed",
                popup.token_name
            );
            return ConfirmOutcome::Stale;
        };

        self.text = placeholder::splice(&self.text, &token, &popup.edit_value);
        ConfirmOutcome::Applied(self.text.clone())
    }

    /// Close the popup without touching the text. Returns false if nothing was open.
    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        match self.popup.take() {
            Some(popup) => {
                log::debug!("token editor for {{{{{}}}}} dismissed ({reason:?})", popup.token_name);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: Point = Point { x: 10.0, y: 20.0 };

    /// Mirrors a field owner: records every reported change.
    struct Owner {
        field: TokenField,
        changes: Vec<String>,
    }

    impl Owner {
        fn new(text: &str) -> Self {
            Self {
                field: TokenField::new(text),
                changes: vec![],
            }
        }

        fn confirm(&mut self) -> ConfirmOutcome {
            let outcome = self.field.confirm();
            if let ConfirmOutcome::Applied(text) = &outcome {
                self.changes.push(text.clone());
            }
            outcome
        }

        fn type_text(&mut self, text: &str) {
            if let Some(text) = self.field.apply_input(text) {
                self.changes.push(text);
            }
        }
    }

    // ============ popup confirm tests ============

    #[test]
    fn test_bearer_token_end_to_end() {
        let mut owner = Owner::new("Bearer {{token}}");
        let matches = owner.field.matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "token");
        assert_eq!(matches[0].start, 7);

        let popup = owner.field.open_popup(0, ANCHOR).unwrap();
        assert_eq!(popup.edit_value, "token");
        assert_eq!(popup.token_name, "token");

        owner.field.set_edit_value("abc123");
        assert_eq!(
            owner.confirm(),
            ConfirmOutcome::Applied("Bearer abc123".to_string())
        );
        assert_eq!(owner.changes, vec!["Bearer abc123".to_string()]);
        assert_eq!(owner.field.text(), "Bearer abc123");
        assert!(owner.field.popup().is_none());
    }

    #[test]
    fn test_confirm_prefilled_name_replaces_token() {
        let mut owner = Owner::new("Bearer {{token}}");
        owner.field.open_popup(0, ANCHOR);
        assert_eq!(
            owner.confirm(),
            ConfirmOutcome::Applied("Bearer token".to_string())
        );
        assert_eq!(owner.field.text(), "Bearer token");
        assert_eq!(owner.changes, vec!["Bearer token".to_string()]);

        // Writing the same value back from the surface is not a second edit.
        owner.type_text("Bearer token");
        assert_eq!(owner.changes.len(), 1);
    }

    #[test]
    fn test_confirm_with_literal_value_is_idempotent() {
        let mut owner = Owner::new("Bearer {{token}}");
        owner.field.open_popup(0, ANCHOR);
        owner.field.set_edit_value("{{token}}");
        assert_eq!(
            owner.confirm(),
            ConfirmOutcome::Applied("Bearer {{token}}".to_string())
        );
        assert_eq!(owner.field.text(), "Bearer {{token}}");
        assert_eq!(owner.changes.len(), 1);
    }

    #[test]
    fn test_duplicate_tokens_edit_only_clicked_one() {
        let mut owner = Owner::new("A {{x}} B {{x}} C");
        owner.field.open_popup(1, ANCHOR);
        owner.field.set_edit_value("y");
        owner.confirm();
        assert_eq!(owner.field.text(), "A {{x}} B y C");
    }

    #[test]
    fn test_adjacent_tokens_edit_independently() {
        let mut field = TokenField::new("{{a}}{{b}}");
        field.open_popup(1, ANCHOR);
        field.set_edit_value("2");
        assert_eq!(field.confirm(), ConfirmOutcome::Applied("{{a}}2".to_string()));

        field.open_popup(0, ANCHOR);
        field.set_edit_value("1");
        assert_eq!(field.confirm(), ConfirmOutcome::Applied("12".to_string()));
    }

    #[test]
    fn test_token_at_end_of_buffer() {
        let mut field = TokenField::new("https://api.example.com/users/{{id}}");
        field.open_popup(0, ANCHOR);
        field.set_edit_value("42");
        field.confirm();
        assert_eq!(field.text(), "https://api.example.com/users/42");
    }

    // ============ stale match tests ============

    #[test]
    fn test_stale_match_after_typing_is_discarded() {
        let mut owner = Owner::new("{{a}} and {{b}}");
        owner.field.open_popup(1, ANCHOR);
        owner.field.set_edit_value("B");

        // Typing shifts the second token while the popup is open.
        owner.type_text("xx {{a}} and {{b}}");
        assert_eq!(owner.changes.len(), 1);

        assert_eq!(owner.confirm(), ConfirmOutcome::Stale);
        assert_eq!(owner.field.text(), "xx {{a}} and {{b}}");
        assert_eq!(owner.changes.len(), 1);
        assert!(owner.field.popup().is_none());
    }

    #[test]
    fn test_stale_match_when_token_removed() {
        let mut field = TokenField::new("{{a}}");
        field.open_popup(0, ANCHOR);
        field.apply_input("plain");
        assert_eq!(field.confirm(), ConfirmOutcome::Stale);
        assert_eq!(field.text(), "plain");
    }

    #[test]
    fn test_stale_match_when_name_changed_in_place() {
        let mut field = TokenField::new("{{ab}}");
        field.open_popup(0, ANCHOR);
        field.apply_input("{{cd}}");
        assert_eq!(field.confirm(), ConfirmOutcome::Stale);
        assert_eq!(field.text(), "{{cd}}");
    }

    #[test]
    fn test_confirm_without_popup() {
        let mut field = TokenField::new("{{a}}");
        assert_eq!(field.confirm(), ConfirmOutcome::Closed);
    }

    // ============ dismissal tests ============

    #[test]
    fn test_dismissal_paths_leave_text_unchanged() {
        for reason in [
            DismissReason::Escape,
            DismissReason::Cancel,
            DismissReason::OutsideClick,
        ] {
            let mut owner = Owner::new("Bearer {{token}}");
            owner.field.open_popup(0, ANCHOR);
            owner.field.set_edit_value("changed");
            assert!(owner.field.dismiss(reason));
            assert_eq!(owner.field.text(), "Bearer {{token}}");
            assert!(owner.field.popup().is_none());
            assert!(owner.changes.is_empty());
        }
    }

    #[test]
    fn test_dismiss_when_closed() {
        let mut field = TokenField::new("text");
        assert!(!field.dismiss(DismissReason::Escape));
    }

    // ============ open tests ============

    #[test]
    fn test_open_out_of_range_is_ignored() {
        let mut field = TokenField::new("{{a}}");
        assert!(field.open_popup(3, ANCHOR).is_none());
        assert!(field.popup().is_none());
    }

    #[test]
    fn test_only_one_popup_at_a_time() {
        let mut field = TokenField::new("{{a}} {{b}}");
        field.open_popup(0, ANCHOR);
        field.open_popup(1, Point { x: 50.0, y: 60.0 });
        let popup = field.popup().unwrap();
        assert_eq!(popup.token_name, "b");
        assert_eq!(popup.match_index, 1);
        assert_eq!(popup.anchor, Point { x: 50.0, y: 60.0 });
    }

    #[test]
    fn test_select_request_fires_once_per_open() {
        let mut field = TokenField::new("{{a}} {{b}}");
        assert!(!field.take_select_request());

        field.open_popup(0, ANCHOR);
        assert!(field.take_select_request());
        assert!(!field.take_select_request());

        // Re-targeting the popup asks for a fresh selection.
        field.open_popup(1, ANCHOR);
        assert!(field.take_select_request());

        field.open_popup(0, ANCHOR);
        field.dismiss(DismissReason::Escape);
        assert!(!field.take_select_request());
    }

    #[test]
    fn test_set_text_is_not_reported() {
        let mut field = TokenField::new("");
        field.set_text("{{host}}/path");
        assert_eq!(field.apply_input("{{host}}/path"), None);
        assert_eq!(
            field.apply_input("{{host}}/paths"),
            Some("{{host}}/paths".to_string())
        );
    }
}
