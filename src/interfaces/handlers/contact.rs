use actix_web::{http::header, web, HttpRequest, HttpResponse};

use crate::{
    entities::contact::{ContactSubmission, SubmissionMeta},
    errors::AppError,
    utils::get_client_ip::{forwarded_for, get_client_ip},
    AppState,
};

pub async fn submit_contact(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Json<ContactSubmission>,
) -> Result<HttpResponse, AppError> {
    let meta = submission_meta(&req);

    state.contact_handler
        .submit(&form, &meta)
        .await
        .map_err(|e| state.client_error(e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Metadata for the operator's mail. The forwarded address is reported when
/// present, independent of whether limiter keys trust it.
fn submission_meta(req: &HttpRequest) -> SubmissionMeta {
    let client_ip = forwarded_for(req).unwrap_or_else(|| get_client_ip(req, false));
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    SubmissionMeta { client_ip, user_agent }
}
