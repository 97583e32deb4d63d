//! Schema-validated JSON body extraction.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use quire_core::{Validate, ValidationError};

use crate::error::ApiError;

/// JSON body that has been deserialized and passed [`Validate`].
///
/// Shape errors (missing content type, bad JSON, missing fields, wrong
/// types) and invariant failures both reject with
/// [`ApiError::Validation`], so handlers only ever see valid payloads.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::Malformed(rejection.body_text()))
        })?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string deserialized into `T`.
///
/// Rejects with [`ApiError::Validation`] so bad parameters get the same JSON
/// error body as bad payloads.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(ValidationError::Malformed(rejection.body_text()))
            })?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use quire_core::{EntryFilter, EntryQuery, QueryBody};

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ValidatedJson(body) =
            ValidatedJson::<QueryBody>::from_request(json_request(r#"{"username":"ada"}"#), &())
                .await
                .unwrap();
        assert_eq!(body.username, "ada");
    }

    #[tokio::test]
    async fn test_missing_field_rejected() {
        let err = ValidatedJson::<QueryBody>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ValidationError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_wrong_type_rejected() {
        let err = ValidatedJson::<QueryBody>::from_request(json_request(r#"{"username":1}"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let err =
            ValidatedJson::<QueryBody>::from_request(json_request(r#"{"username":" "}"#), &())
                .await
                .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::Empty("username"))
        ));
    }

    #[tokio::test]
    async fn test_missing_content_type_rejected() {
        let request = Request::builder()
            .body(Body::from(r#"{"username":"ada"}"#))
            .unwrap();
        let err = ValidatedJson::<QueryBody>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ValidationError::Malformed(_))));
    }

    async fn query_from(uri: &str) -> Result<EntryQuery, ApiError> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (mut parts, _) = request.into_parts();
        ValidatedQuery::<EntryQuery>::from_request_parts(&mut parts, &())
            .await
            .map(|ValidatedQuery(query)| query)
    }

    #[tokio::test]
    async fn test_query_defaults_and_filter() {
        assert_eq!(query_from("/entries").await.unwrap().filter, EntryFilter::All);
        assert_eq!(
            query_from("/entries?filter=titled").await.unwrap().filter,
            EntryFilter::Titled
        );
    }

    #[tokio::test]
    async fn test_unknown_query_value_rejected() {
        let err = query_from("/entries?filter=bogus").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ValidationError::Malformed(_))));
    }
}
