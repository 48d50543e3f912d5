use super::api::{Confirmation, EmailList, ListQuery};
use super::http_error::HttpError;
use super::with_db;
use crate::database::{Database, EmailDraft, EmailFilter, EmailPatch};
use actix_web::web::{Data, Form, Json, Path, Query, ServiceConfig};
use actix_web::{delete, get, post, put, Either, Responder, Result};
use chrono::Utc;

/// Fields supplied as a JSON or form-encoded body or, failing that, as query string parameters
type Payload<T> = Either<Either<Json<T>, Form<T>>, Query<T>>;

fn into_inner<T>(payload: Payload<T>) -> T {
    match payload {
        Either::Left(Either::Left(Json(inner)))
        | Either::Left(Either::Right(Form(inner)))
        | Either::Right(Query(inner)) => inner,
    }
}

#[get("")]
async fn list_emails(query: Query<ListQuery>, db: Data<Database>) -> Result<impl Responder> {
    let filter = EmailFilter::from(query.into_inner());
    let emails = with_db(&db, move |db| db.list_emails(filter)).await?;
    Ok(Json(EmailList::from(emails)))
}

#[get("/{id}")]
async fn get_email(id: Path<i32>, db: Data<Database>) -> Result<impl Responder> {
    let id = id.into_inner();
    let email = with_db(&db, move |db| db.get_email(id))
        .await?
        .ok_or(HttpError::NotFound { id })?;
    Ok(Json(email))
}

#[post("")]
async fn create_email(draft: Payload<EmailDraft>, db: Data<Database>) -> Result<impl Responder> {
    let draft = into_inner(draft);
    let email = with_db(&db, move |db| db.create_email(draft, &Utc::now())).await?;
    Ok(Json(email))
}

#[put("/{id}")]
async fn update_email(
    id: Path<i32>,
    patch: Payload<EmailPatch>,
    db: Data<Database>,
) -> Result<impl Responder> {
    let id = id.into_inner();
    let patch = into_inner(patch);
    let email = with_db(&db, move |db| db.update_email(id, patch, &Utc::now()))
        .await?
        .ok_or(HttpError::NotFound { id })?;
    Ok(Json(email))
}

#[delete("/{id}")]
async fn delete_email(id: Path<i32>, db: Data<Database>) -> Result<impl Responder> {
    let id = id.into_inner();
    if !with_db(&db, move |db| db.delete_email(id)).await? {
        return Err(HttpError::NotFound { id }.into());
    }
    Ok(Json(Confirmation {
        message: format!("Email {id} deleted successfully"),
    }))
}

/// Register the email routes, relative to the `/emails` scope
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(list_emails)
        .service(get_email)
        .service(create_email)
        .service(update_email)
        .service(delete_email);
}
