//! Message contract

use hr_core::error::ValidationErrors;
use hr_models::NewMessage;

use crate::base::{validate_text, Contract, ValidationResult};

pub struct MessageContract;

impl Contract<NewMessage> for MessageContract {
    fn validate(&self, entity: &NewMessage) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("content", &entity.content, 5000, &mut errors);
        if entity.recipient_id == entity.sender_id {
            errors.add("recipientId", "can't be yourself");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannot_message_self() {
        let input = NewMessage {
            sender_id: 4,
            recipient_id: 4,
            content: "hello".into(),
        };
        let errors = MessageContract.validate(&input).unwrap_err();
        assert!(errors.has_error("recipientId"));
    }

    #[test]
    fn test_valid_message() {
        let input = NewMessage {
            sender_id: 4,
            recipient_id: 5,
            content: "Shift swap on Friday?".into(),
        };
        assert!(MessageContract.validate(&input).is_ok());
    }
}
