use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, sync::Arc, task::{Context, Poll}};

use crate::errors::AppError;

/// Rejects requests whose `Origin` header is present and not on the allow-list.
/// Requests without an `Origin` (same-origin, curl, monitors) pass.
#[derive(Clone)]
pub struct OriginGuard {
    allowed: Arc<[String]>,
}

impl OriginGuard {
    pub fn new(allowed: Vec<String>) -> Self {
        OriginGuard { allowed: allowed.into() }
    }

    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allowed.iter().any(|o| o == origin),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OriginGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = OriginGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(OriginGuardService {
            service: Rc::new(service),
            guard: self.clone(),
        })
    }
}

pub struct OriginGuardService<S> {
    service: Rc<S>,
    guard: OriginGuard,
}

impl<S, B> Service<ServiceRequest> for OriginGuardService<S>
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

        let origin = req
            .headers()
            .get(header::ORIGIN)
            .map(|value| value.to_str().unwrap_or("<non-ascii>").to_string());

        if !self.guard.is_allowed(origin.as_deref()) {
            let origin = origin.unwrap_or_default();
            tracing::warn!(%origin, path = %req.path(), "Rejected request from disallowed origin");
            let response = AppError::OriginRejected(origin).error_response();
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
