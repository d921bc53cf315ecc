/// User collection routes
///
/// Creation is public; every other route sits behind the access-token
/// guard. Reads are served through the collection cache, mutations
/// invalidate it before answering.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::{CreateUserRequest, UpdateUserRequest, UsersService};

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// GET /users
pub async fn list_users(service: web::Data<UsersService>) -> Result<HttpResponse, AppError> {
    let users = service.find_all().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /users/{id}
pub async fn get_user(
    path: web::Path<Uuid>,
    service: web::Data<UsersService>,
) -> Result<HttpResponse, AppError> {
    let user = service.find_one(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /users
///
/// # Errors
/// - 400: validation error (name, email, birthdate, or password strength)
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    service: web::Data<UsersService>,
) -> Result<HttpResponse, AppError> {
    let user = service.create(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// PUT /users/{id}
pub async fn update_user(
    path: web::Path<Uuid>,
    form: web::Json<UpdateUserRequest>,
    service: web::Data<UsersService>,
) -> Result<HttpResponse, AppError> {
    let user = service.update(path.into_inner(), form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /users/{id}
pub async fn delete_user(
    path: web::Path<Uuid>,
    service: web::Data<UsersService>,
) -> Result<HttpResponse, AppError> {
    service.remove(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User removed successfully".to_string(),
    }))
}
