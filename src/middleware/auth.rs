use crate::{
    models::Role,
    services::UserStore,
    utils::{time, AppError},
};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Header carrying the caller's API key. Header names are case-insensitive,
/// clients send it as `apiKey`.
pub const API_KEY_HEADER: &str = "apikey";

/// Identity of the caller, available to handlers through `web::ReqData`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
    pub role: String,
}

/// API key filter. Wraps a resource and only lets callers whose stored role
/// is in `allowed` through.
pub struct ApiKeyAuth {
    allowed: &'static [Role],
}

impl ApiKeyAuth {
    pub fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthService {
            service: Rc::new(service),
            allowed: self.allowed,
        }))
    }
}

pub struct ApiKeyAuthService<S> {
    service: Rc<S>,
    allowed: &'static [Role],
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let allowed = self.allowed;

        Box::pin(async move {
            let api_key = match extract_api_key(&req) {
                Some(key) => key,
                None => {
                    log::warn!("🔒 {} {} - missing API key", req.method(), req.path());
                    return Ok(reject(req, AppError::MissingCredential));
                }
            };

            let store = match req.app_data::<web::Data<dyn UserStore>>() {
                Some(store) => store.clone(),
                None => {
                    log::error!("❌ User store is not registered as app data");
                    return Ok(reject(req, AppError::Internal("user store unavailable".into())));
                }
            };

            let user = match store.authenticate_user(&api_key, allowed).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    log::warn!("🚫 {} {} - API key rejected", req.method(), req.path());
                    return Ok(reject(req, AppError::Forbidden));
                }
                Err(e) => {
                    log::error!("❌ API key lookup failed: {}", e);
                    return Ok(reject(req, e));
                }
            };

            // Best effort: a failed timestamp update never blocks the request
            if let Err(e) = store.update_last_access(&api_key, time::now()).await {
                log::warn!("⚠️  Could not update last access for {}: {}", user.email, e);
            }

            req.extensions_mut().insert(AuthenticatedUser {
                email: user.email,
                role: user.role,
            });

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Reads the API key header and strips any surrounding braces.
/// `None` when the header is absent or not valid visible ASCII.
fn extract_api_key(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(API_KEY_HEADER)?.to_str().ok()?;
    Some(strip_braces(value).to_string())
}

pub fn strip_braces(raw: &str) -> &str {
    raw.trim_matches(|c| c == '{' || c == '}')
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}
