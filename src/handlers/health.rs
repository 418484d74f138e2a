use actix_web::HttpResponse;

use super::MessageBody;

/// GET /ping
#[utoipa::path(
    get,
    path = "/ping",
    responses((status = 200, description = "Service is up", body = MessageBody)),
    tag = "health"
)]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(MessageBody::new("pong"))
}
