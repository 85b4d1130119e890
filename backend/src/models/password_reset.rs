//! Request bodies for the forgot/reset password flow.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{form::FormData, FormInput};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl FormInput for ForgotPasswordRequest {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([("email", self.email.as_str())])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

impl FormInput for ResetPasswordRequest {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("token", self.token.as_str()),
            ("password", self.password.as_str()),
            ("password_confirm", self.password_confirm.as_str()),
        ])
    }
}
