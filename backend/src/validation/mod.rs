//! Single validation framework for every form and JSON payload.
//!
//! HTML forms and JSON bodies both go through [`form::FormValidator`] with the
//! rule sets from [`rules`], so a registration is judged the same way no
//! matter which route received it.

pub mod form;
pub mod rules;
pub mod sanitize;

use crate::error::AppError;
use form::{FormData, FormValidator};

/// Payloads that can be viewed as a flat field → value map.
pub trait FormInput {
    fn form_data(&self) -> FormData;
}

/// Runs `validator` over `input`, turning any messages into [`AppError::Validation`].
pub fn validate_input<T: FormInput>(input: &T, validator: &FormValidator) -> Result<(), AppError> {
    let errors = validator.validate(&input.form_data());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
