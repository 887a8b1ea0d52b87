use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    errors::{AppError, RateLimitScope},
    limiter::rate_limiter::FixedWindowLimiterStore,
    utils::get_client_ip::get_client_ip,
};

/// Counts every request that reaches it against a per-client fixed window.
#[derive(Clone)]
pub struct RateLimit {
    store: FixedWindowLimiterStore,
    scope: RateLimitScope,
    trust_forwarded_for: bool,
    exempt_paths: Vec<&'static str>,
}

impl RateLimit {
    pub fn new(store: FixedWindowLimiterStore, scope: RateLimitScope, trust_forwarded_for: bool) -> Self {
        RateLimit {
            store,
            scope,
            trust_forwarded_for,
            exempt_paths: Vec::new(),
        }
    }

    /// Requests to `path` bypass this limiter entirely.
    pub fn exempt(mut self, path: &'static str) -> Self {
        self.exempt_paths.push(path);
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitService {
            service: Rc::new(service),
            config: self.clone(),
        })
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    config: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if self.config.exempt_paths.iter().any(|path| *path == req.path()) {
            return Box::pin(async move {
                let res = service.call(req).await?;
                Ok(res.map_into_left_body())
            });
        }

        let key = get_client_ip(req.request(), self.config.trust_forwarded_for);
        let decision = self.config.store.check(&key);
        let scope = self.config.scope;

        if !decision.allowed {
            tracing::warn!(%scope, client = %key, path = %req.path(), "Rate limit exceeded");
            let response = AppError::RateLimited {
                scope,
                retry_after: decision.retry_after,
            }
            .error_response();
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        Box::pin(async move {
            let mut res = service.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(decision.limit));
            headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(decision.remaining));
            Ok(res.map_into_left_body())
        })
    }
}
