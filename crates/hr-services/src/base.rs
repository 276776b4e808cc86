//! Helpers shared by the services

use hr_contracts::Contract;
use hr_core::traits::Id;
use hr_core::{HrError, HrResult};

/// Run a contract, turning its errors into a 422
pub fn validate<T, C: Contract<T>>(contract: &C, entity: &T) -> HrResult<()> {
    contract.validate(entity).map_err(HrError::from)
}

/// Unwrap a lookup or report the record as missing
pub fn found<T>(entity: &'static str, id: Id, value: Option<T>) -> HrResult<T> {
    value.ok_or_else(|| HrError::not_found(entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found() {
        assert_eq!(found("complaint", 1, Some(5)).unwrap(), 5);
        let err = found::<i32>("complaint", 9, None).unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("complaint"));
    }
}
