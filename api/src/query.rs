use axum::{
    extract::{FromRequestParts, rejection::QueryRejection},
    http::request::Parts,
};

use crate::error::AppError;

// Like `crate::json::Json`, rejections become our error body instead of plain text
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    axum::extract::Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err((rejection.body_text(), rejection.status()).into()),
        }
    }
}
