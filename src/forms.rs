//! Borrow, return and clear actions.
//!
//! Each action is validated first and confirmed second; a request is only sent when both pass.

use crate::{
    api::{ApiClient, ApiTransport},
    error::CatalogError,
    model::{id_from_uri, ApiMessage, BorrowRequest, ReturnRequest},
    ui::Prompter,
};

pub const MISSING_FIELDS: &str = "Please fill in all fields.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowForm {
    pub book_id: String,
    pub borrower_name: String,
    pub borrower_type: String,
    pub borrow_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnForm {
    pub book_id: String,
    /// Required by the form but not transmitted; the backend records the return itself.
    pub return_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Borrow(BorrowForm),
    Return(ReturnForm),
    Clear,
}

/// How a form submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A required field was empty; nothing was sent.
    Invalid,
    /// The user declined the confirmation; nothing was sent.
    Declined,
    /// The backend accepted the change. Carries the message shown to the user.
    Accepted(String),
    /// The backend refused with a structured error, shown verbatim.
    Rejected(String),
    /// Transport or unexpected failure; a generic message was shown.
    Failed,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl FormAction {
    pub fn validate(&self) -> Result<(), CatalogError> {
        let complete = match self {
            FormAction::Borrow(form) => ![
                &form.book_id,
                &form.borrower_name,
                &form.borrower_type,
                &form.borrow_date,
            ]
            .into_iter()
            .any(|v| blank(v)),
            FormAction::Return(form) => !blank(&form.book_id) && !blank(&form.return_date),
            FormAction::Clear => true,
        };
        if complete {
            Ok(())
        } else {
            Err(CatalogError::Validation(MISSING_FIELDS.to_string()))
        }
    }

    pub fn confirmation(&self) -> String {
        match self {
            FormAction::Borrow(form) => format!(
                "Are you sure you want to borrow Book ID {}?",
                id_from_uri(&form.book_id)
            ),
            FormAction::Return(form) => format!(
                "Are you sure you want to return Book ID {}?",
                id_from_uri(&form.book_id)
            ),
            FormAction::Clear => {
                "Are you sure you want to clear all borrowing data? This action cannot be undone."
                    .to_string()
            }
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            FormAction::Borrow(_) => "Failed to borrow the book. Please try again.",
            FormAction::Return(_) => "Failed to return the book. Please try again.",
            FormAction::Clear => "Failed to clear borrowing data. Please try again.",
        }
    }

    pub fn default_success(&self) -> &'static str {
        match self {
            FormAction::Borrow(_) => "Book borrowed successfully!",
            FormAction::Return(_) => "Book returned successfully!",
            FormAction::Clear => "All borrowing data cleared successfully!",
        }
    }

    async fn submit<T: ApiTransport>(
        &self,
        client: &ApiClient<T>,
    ) -> Result<ApiMessage, CatalogError> {
        match self {
            FormAction::Borrow(form) => {
                client
                    .borrow(&BorrowRequest {
                        book_id: form.book_id.clone(),
                        borrower_name: form.borrower_name.trim().to_string(),
                        borrower_type: form.borrower_type.clone(),
                        borrow_date: form.borrow_date.clone(),
                    })
                    .await
            }
            FormAction::Return(form) => {
                client
                    .return_book(&ReturnRequest {
                        book_id: form.book_id.clone(),
                    })
                    .await
            }
            FormAction::Clear => client.clear_borrowing_data().await,
        }
    }

    /// Validates, confirms, submits and reports the outcome through `prompter`.
    pub async fn run<T, P>(&self, client: &ApiClient<T>, prompter: &P) -> Submission
    where
        T: ApiTransport,
        P: Prompter + ?Sized,
    {
        if let Err(err) = self.validate() {
            tracing::debug!("Form rejected before submission: {err}");
            prompter.alert(MISSING_FIELDS);
            return Submission::Invalid;
        }
        if !prompter.confirm(&self.confirmation()) {
            return Submission::Declined;
        }
        match self.submit(client).await {
            Ok(ack) => {
                let message = ack
                    .message
                    .unwrap_or_else(|| self.default_success().to_string());
                prompter.alert(&message);
                Submission::Accepted(message)
            }
            Err(CatalogError::Server { error, .. }) => {
                prompter.alert(&format!("Error: {error}"));
                Submission::Rejected(error)
            }
            Err(err) => {
                tracing::error!("Error: {err}");
                prompter.alert(self.failure_message());
                Submission::Failed
            }
        }
    }
}
