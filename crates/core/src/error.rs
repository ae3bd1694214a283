use crate::types::Token;

/// Domain error shared by every bulkmail crate.
///
/// Transport failures never appear here; the delivery trigger records them on
/// the message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Token },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] on the given entity.
    pub fn not_found(entity: &'static str, id: Token) -> Self {
        CoreError::NotFound { entity, id }
    }

    /// `true` for errors that must abort an in-progress dispatch run.
    pub fn is_fatal_to_dispatch(&self) -> bool {
        matches!(self, CoreError::Persistence(_) | CoreError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_includes_entity_and_token() {
        let id = Token::nil();
        let err = CoreError::not_found("Message", id);
        assert_eq!(
            err.to_string(),
            format!("Entity not found: Message with id {id}")
        );
    }

    #[test]
    fn only_persistence_and_configuration_are_fatal() {
        assert!(CoreError::Persistence("down".into()).is_fatal_to_dispatch());
        assert!(CoreError::Configuration("missing".into()).is_fatal_to_dispatch());
        assert!(!CoreError::Validation("bad".into()).is_fatal_to_dispatch());
        assert!(!CoreError::not_found("Batch", Token::nil()).is_fatal_to_dispatch());
    }
}
