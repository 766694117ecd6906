//! Book record endpoints

use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    Json,
};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery},
    services::books::BookForm,
    services::storage::FileUpload,
};

/// Multipart form fields accepted by the create and update endpoints.
/// All text fields plus an optional `document` file field.
#[derive(ToSchema)]
pub struct BookFormPayload {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<f64>,
    pub tag: Option<String>,
    /// Attached document file
    #[schema(value_type = Option<String>, format = Binary)]
    pub document: Option<String>,
}

/// List book records with optional filters.
///
/// Multiple filters return the union of their matches.
#[utoipa::path(
    get,
    path = "/book",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 500, description = "Listing failed")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list(&query).await?;
    Ok(Json(books))
}

/// Get a single book record by id
#[utoipa::path(
    get,
    path = "/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 500, description = "Book record not existing")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create a book record, optionally attaching an uploaded document
#[utoipa::path(
    post,
    path = "/book",
    tag = "books",
    request_body(content = BookFormPayload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Created book", body = Book),
        (status = 500, description = "Validation or upload failed")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    let form = read_book_form(multipart).await?;
    let created = state.services.books.create(form).await?;
    Ok(Json(created))
}

/// Update a book record; only supplied fields are changed
#[utoipa::path(
    put,
    path = "/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = BookFormPayload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 500, description = "Book record not existing or upload failed")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    let form = read_book_form(multipart).await?;
    let updated = state.services.books.update(id, form).await?;
    Ok(Json(updated))
}

/// Remove a book record
#[utoipa::path(
    delete,
    path = "/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Record removed", body = String),
        (status = 500, description = "Book record not existing")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<&'static str> {
    state.services.books.destroy(id).await?;
    Ok("Ok")
}

/// Decode the multipart form shared by create and update.
///
/// Unknown fields are ignored. The `document` field is buffered in full
/// so that validation can run before anything touches storage.
async fn read_book_form(mut multipart: Multipart) -> AppResult<BookForm> {
    let mut form = BookForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "name" => form.name = text_field(field).await?,
            "author" => form.author = text_field(field).await?,
            "price" => form.price = text_field(field).await?,
            "tag" => form.tag = text_field(field).await?,
            "document" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Upload(format!("Failed to read document field: {}", e))
                })?;

                form.document = Some(FileUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Read a text field, mapping an empty value to absent.
async fn text_field(field: Field<'_>) -> AppResult<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {}", e)))?;

    Ok(if text.is_empty() { None } else { Some(text) })
}
