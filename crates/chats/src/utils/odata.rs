//! OData query helpers.

use crate::entities::graph::GROUP_CHAT_TYPE;

/// Escape a value for use inside a single-quoted OData string literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `$filter` expression selecting group chats with exactly this topic.
///
/// ```
/// use incontact_chats::utils::group_chat_filter;
///
/// assert_eq!(
///     group_chat_filter("O'Brien's sync"),
///     "chatType eq 'group' and topic eq 'O''Brien''s sync'"
/// );
/// ```
pub fn group_chat_filter(topic: &str) -> String {
    format!(
        "chatType eq '{}' and topic eq '{}'",
        GROUP_CHAT_TYPE,
        escape_literal(topic)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every quote in the literal body must be part of a doubled pair.
    fn literal_is_balanced(literal_body: &str) -> bool {
        let mut chars = literal_body.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' && chars.next() != Some('\'') {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_plain_topic_is_unchanged() {
        assert_eq!(
            group_chat_filter("Shift sync"),
            "chatType eq 'group' and topic eq 'Shift sync'"
        );
    }

    #[test]
    fn test_quotes_are_doubled() {
        let escaped = escape_literal("O'Brien's sync");
        assert_eq!(escaped, "O''Brien''s sync");
        assert!(literal_is_balanced(&escaped));
    }

    #[test]
    fn test_filter_with_quotes_keeps_literal_closed() {
        let filter = group_chat_filter("'''");
        let body = filter
            .strip_prefix("chatType eq 'group' and topic eq '")
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap();
        assert!(literal_is_balanced(body));
    }
}
