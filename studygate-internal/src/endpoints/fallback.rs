use axum::http::{Method, Uri};

use crate::error::{Error, ErrorDetails};

/// Fallback handler for unmatched routes. Returns the same JSON error shape
/// as every other failure.
pub async fn handle_404(method: Method, uri: Uri) -> Error {
    Error::new(ErrorDetails::RouteNotFound {
        path: uri.path().to_string(),
        method: method.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_handle_404() {
        let error = handle_404(Method::GET, Uri::from_static("/nope")).await;
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
