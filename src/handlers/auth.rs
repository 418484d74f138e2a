use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth_service::SignUp;
use crate::domain::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;

use super::customers::CustomerResponse;
use super::{bearer_token, blocking, require_customer, ErrorBody, MessageBody};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSessionResponse {
    /// Bearer token for the `Authorization` header.
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub customer: CustomerResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionResponse {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for AdminSessionResponse {
    fn from(s: Session) -> Self {
        AdminSessionResponse {
            token: s.token,
            expires_at: s.expires_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created or claimed", body = CustomerSessionResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 409, description = "Email exists", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = SignUp {
        name: body.name,
        email: body.email,
        phone: body.phone,
        password: body.password,
    };

    let (session, customer) = blocking(move || state.auth.signup(request)).await?;

    Ok(HttpResponse::Created().json(CustomerSessionResponse {
        token: session.token,
        expires_at: session.expires_at,
        customer: customer.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = CustomerSessionResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = body.into_inner();

    let (session, customer) = blocking(move || state.auth.login(&email, &password)).await?;

    Ok(HttpResponse::Ok().json(CustomerSessionResponse {
        token: session.token,
        expires_at: session.expires_at,
        customer: customer.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The logged in customer", body = CustomerResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let customer = require_customer(&state, &req).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

/// POST /auth/logout and POST /admin/logout
///
/// Revokes the bearer token. Revoking an unknown token is not an error.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = MessageBody),
        (status = 401, description = "Missing token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req)?;

    blocking(move || state.auth.logout(token)).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Logged out")))
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AdminSessionResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn admin_login(
    state: web::Data<AppState>,
    body: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let AdminLoginRequest { username, password } = body.into_inner();

    let session = blocking(move || state.auth.admin_login(&username, &password)).await?;

    Ok(HttpResponse::Ok().json(AdminSessionResponse::from(session)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::handlers::test_support::{api, state, ADMIN_PASSWORD};

    fn signup_body() -> Value {
        json!({
            "name": "Jane Smith",
            "email": "jane@example.com",
            "phone": "9876543211",
            "password": "s3cret-pass"
        })
    }

    #[actix_web::test]
    async fn signup_login_me_logout() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "JANE@example.com", "password": "s3cret-pass"}))
            .to_request();
        let login: Value = test::call_and_read_body_json(&app, req).await;
        let bearer = format!("Bearer {}", login["token"].as_str().unwrap());
        assert_eq!(login["customer"]["hasAccount"], true);

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let me: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["email"], "jane@example.com");

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(("Authorization", bearer))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn duplicate_signup_conflicts() {
        let (state, _store) = state();
        let app = api!(state);

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/auth/signup")
                .set_json(signup_body())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn wrong_password_is_401_and_blank_is_400() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_json(json!({"username": "admin", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid credentials");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "jane@example.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn customer_token_cannot_reach_admin_routes() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_body())
            .to_request();
        let signup: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/admin/api/analytics")
            .insert_header((
                "Authorization",
                format!("Bearer {}", signup["token"].as_str().unwrap()),
            ))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_json(json!({"username": "admin", "password": ADMIN_PASSWORD}))
            .to_request();
        let admin: Value = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::get()
            .uri("/admin/api/analytics")
            .insert_header((
                "Authorization",
                format!("Bearer {}", admin["token"].as_str().unwrap()),
            ))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
