//! Submission request DTOs

use axum::extract::Multipart;
use validator::Validate;

use crate::{
    constants::{MAX_ANSWER_CHARS, MAX_LANGUAGE_NAME_LENGTH},
    error::{AppError, AppResult},
};

/// Submission form
///
/// Code tasks carry `language` and a `code` file; answer tasks carry `answer` only.
#[derive(Debug, Default, Validate)]
pub struct SubmitForm {
    #[validate(length(min = 1, max = MAX_LANGUAGE_NAME_LENGTH))]
    pub language: Option<String>,

    pub code: Option<String>,

    #[validate(length(max = MAX_ANSWER_CHARS))]
    pub answer: Option<String>,
}

impl SubmitForm {
    /// Read the form from a multipart body
    ///
    /// Unknown fields are skipped. Code larger than `max_code_bytes` is rejected.
    pub async fn from_multipart(mut multipart: Multipart, max_code_bytes: usize) -> AppResult<Self> {
        let mut form = SubmitForm::default();

        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("language") => form.language = Some(field.text().await?),
                Some("answer") => form.answer = Some(field.text().await?),
                Some("code") => {
                    let bytes = field.bytes().await?;
                    if bytes.len() > max_code_bytes {
                        return Err(AppError::PayloadTooLarge(format!(
                            "code exceeds {} bytes",
                            max_code_bytes
                        )));
                    }
                    let code = String::from_utf8(bytes.to_vec())
                        .map_err(|_| AppError::InvalidInput("code must be UTF-8 text".to_string()))?;
                    form.code = Some(code);
                }
                _ => {}
            }
        }

        form.validate()?;
        Ok(form)
    }
}
