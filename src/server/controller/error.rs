use crate::server::database::error::DbError;
use crate::server::model::InputError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{error, HttpResponse};
use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq)]
pub(crate) enum CustomError {
    #[display("server is busy")]
    ServerIsBusy,
    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),
    #[display("Invalid username or password.")]
    Unauthorized,
    #[display("admin login required")]
    SessionRequired,
    #[display("{_0}")]
    ResourceNotFound(#[error(not(source))] String),
    #[display("database error")]
    DbError,
    #[display("timeout occurred")]
    Timeout,
    /// a write may or may not have been applied
    #[display("{_0}")]
    Unconfirmed(#[error(not(source))] String),
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ServerIsBusy | CustomError::DbError | CustomError::Unconfirmed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CustomError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CustomError::Unauthorized | CustomError::SessionRequired => StatusCode::UNAUTHORIZED,
            CustomError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}

impl From<InputError> for CustomError {
    fn from(e: InputError) -> Self {
        match e {
            InputError::NotInCart(_) => CustomError::ResourceNotFound(e.to_string()),
            _ => CustomError::BadRequest(e.to_string()),
        }
    }
}

impl From<DbError> for CustomError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Busy(_) => CustomError::ServerIsBusy,
            DbError::Timeout => CustomError::Timeout,
            DbError::NoRowsAffected => CustomError::ResourceNotFound("resource not found".to_string()),
            DbError::BillUnconfirmed(bill_id) => CustomError::Unconfirmed(format!(
                "Bill #{bill_id} may have been saved. Check it in the admin portal before finalizing again."
            )),
            DbError::CommitUnconfirmed => {
                CustomError::Unconfirmed("The change may have been saved. Reload before trying again.".to_string())
            }
            DbError::MissingGeneratedKey | DbError::PartialInsert { .. } | DbError::Postgres(_) => CustomError::DbError,
        }
    }
}
