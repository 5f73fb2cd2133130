use std::str::FromStr;

use api_types::{Decimal, ErrorBody};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Hours, Money, Quantity};

pub use server::{ServerState, router, run_with_listener};

mod customers;
mod health;
mod insights;
mod inventory;
mod projects;
mod sales;
mod search;
mod server;
mod shop;
mod templates;
mod workflows;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::InvalidInput(_)
        | EngineError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parses a wire decimal into one of the engine's fixed-point types.
pub(crate) fn parse_decimal<T>(value: &Decimal, field: &str) -> Result<T, ServerError>
where
    T: FromStr<Err = EngineError>,
{
    value
        .as_str()
        .parse::<T>()
        .map_err(|err| ServerError::Generic(format!("{field}: {err}")))
}

pub(crate) fn parse_optional<T>(value: Option<&Decimal>, field: &str) -> Result<Option<T>, ServerError>
where
    T: FromStr<Err = EngineError>,
{
    value.map(|v| parse_decimal(v, field)).transpose()
}

/// Same as [`parse_optional`] for nullable fields, keeping explicit `null`.
pub(crate) fn parse_nullable<T>(
    value: Option<Option<&Decimal>>,
    field: &str,
) -> Result<Option<Option<T>>, ServerError>
where
    T: FromStr<Err = EngineError>,
{
    value.map(|v| parse_optional(v, field)).transpose()
}

pub(crate) fn money(minor: i64) -> Decimal {
    Decimal::new(Money::new(minor))
}

pub(crate) fn hours(hundredths: i64) -> Decimal {
    Decimal::new(Hours::new(hundredths))
}

pub(crate) fn quantity(milli: i64) -> Decimal {
    Decimal::new(Quantity::new(milli))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        for err in [
            EngineError::ExistingKey("x".to_string()),
            EngineError::InvalidInput("x".to_string()),
            EngineError::InvalidTransition("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn database_errors_are_500() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("boom".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn decimals_parse_with_field_name() {
        let money: Money = parse_decimal(&Decimal::from("12.5"), "price").unwrap();
        assert_eq!(money.minor(), 1250);

        let Err(ServerError::Generic(message)) =
            parse_decimal::<Money>(&Decimal::from("twelve"), "price")
        else {
            panic!("expected a validation error");
        };
        assert_eq!(message, "price: invalid amount");

        let cleared: Option<Option<Money>> = parse_nullable(Some(None), "fees").unwrap();
        assert_eq!(cleared, Some(None));
    }
}
