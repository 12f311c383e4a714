/// HTTP middleware utilities for blog-service
///
/// Provides optional bearer-token authentication and per-request metrics.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage};
use crypto_core::jwt::JwtValidator;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::app::AppState;
use crate::auth::SessionUser;
use crate::error::{AppError, DEFAULT_SIGN_IN_PATH};
use crate::metrics::http::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

// =====================================================================
// JWT Authentication
// =====================================================================

/// Validates an optional `Authorization: Bearer` token.
///
/// Requests without the header pass through anonymously. A header that is
/// present but unusable is rejected with 401.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    validator: Option<Arc<JwtValidator>>,
}

impl JwtAuthMiddleware {
    pub fn new(validator: Option<Arc<JwtValidator>>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    validator: Option<Arc<JwtValidator>>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let validator = self.validator.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get("Authorization")
                .map(|h| h.to_str().map(str::to_owned));

            if let Some(header) = header {
                let sign_in_path = req
                    .app_data::<web::Data<AppState>>()
                    .map(|state| state.config.auth.sign_in_path.clone())
                    .unwrap_or_else(|| DEFAULT_SIGN_IN_PATH.to_string());
                let user = authenticate(validator.as_deref(), header.ok().as_deref())
                    .map_err(|message| AppError::unauthorized(message, sign_in_path))?;
                req.extensions_mut().insert(user);
            }

            service.call(req).await
        })
    }
}

/// Resolve the bearer token to a user; the error is the client-facing reason
fn authenticate(
    validator: Option<&JwtValidator>,
    header: Option<&str>,
) -> Result<SessionUser, &'static str> {
    let validator = validator.ok_or("Token validation is not configured")?;

    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or("Invalid Authorization scheme")?;

    let data = validator
        .validate(token)
        .map_err(|_| "Invalid or expired token")?;

    let id = data.claims.user_id().map_err(|_| "Invalid user ID")?;

    Ok(SessionUser {
        id,
        email: data.claims.email,
    })
}

// =====================================================================
// Metrics middleware
// =====================================================================

/// Counts requests by method, route pattern and status, and times them.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed();

            let (route, status) = match &res {
                Ok(r) => (
                    r.request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string()),
                    r.status().as_u16(),
                ),
                Err(e) => (
                    "unmatched".to_string(),
                    e.as_response_error().status_code().as_u16(),
                ),
            };
            let status_label = status.to_string();

            HTTP_REQUESTS_TOTAL
                .with_label_values(&[method.as_str(), route.as_str(), status_label.as_str()])
                .inc();
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[method.as_str(), route.as_str()])
                .observe(elapsed.as_secs_f64());

            tracing::debug!(%method, %route, %status, elapsed_ms = %elapsed.as_millis(), "request completed");
            res
        })
    }
}
