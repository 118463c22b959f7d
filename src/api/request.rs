//! API request helpers

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::rejection::FormRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::Error;

/// Parse a lenient offset, anything but a non-negative integer is `0`
///
/// ```rust
/// # use jotter::api::parse_offset;
/// assert_eq!(40, parse_offset(Some("40")));
/// assert_eq!(0, parse_offset(Some("-5")));
/// assert_eq!(0, parse_offset(None));
/// ```
pub fn parse_offset(offset: Option<&str>) -> u64 {
    offset
        .and_then(|offset| offset.trim().parse::<u64>().ok())
        .unwrap_or_default()
}

fn parse_form<F>(form: Result<axum::Form<F>, FormRejection>) -> Result<F, Error> {
    match form {
        Ok(axum::Form(form)) => Ok(form),
        Err(err) => match err {
            FormRejection::InvalidFormContentType(_err) => Err(Error::bad_request(
                "Missing `application/x-www-form-urlencoded` content type",
            )),
            FormRejection::FailedToDeserializeForm(err) => {
                Err(Error::bad_request("Invalid form data").with_description(err))
            }
            FormRejection::FailedToDeserializeFormBody(err) => {
                Err(Error::bad_request("Invalid form data").with_description(err))
            }
            FormRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in form").with_description(err))
            }
            err => Err(Error::bad_request("Unknown form error").with_description(err)),
        },
    }
}

/// Wrapper for the form extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let form = axum::Form::<F>::from_request(req, state).await;

        parse_form(form).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_description(err))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}

fn parse_query<Q>(query: Result<Query<Q>, QueryRejection>) -> Result<Q, Error> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(err) => Err(Error::bad_request("Invalid query parameters").with_description(err)),
    }
}

/// Wrapper for the query extractor
pub struct QueryParameters<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryParameters<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<Q>::from_request_parts(parts, state).await;

        parse_query(query).map(QueryParameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(20, parse_offset(Some("20")));
        assert_eq!(20, parse_offset(Some(" 20 ")));
        assert_eq!(0, parse_offset(Some("-20")));
        assert_eq!(0, parse_offset(Some("twenty")));
        assert_eq!(0, parse_offset(Some("")));
        assert_eq!(0, parse_offset(None));
    }
}
