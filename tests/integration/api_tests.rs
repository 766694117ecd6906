//! API integration tests
//!
//! These run against a live server started with default configuration.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

fn book_form(name: &str, author: &str, price: &str) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("author", author.to_string())
        .text("price", price.to_string())
}

/// Helper to create a book and return its JSON representation
async fn create_book(client: &Client, form: Form) -> Value {
    let response = client
        .post(format!("{}/book", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send create request");

    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse created book")
}

async fn delete_book(client: &Client, id: i64) {
    let response = client
        .delete(format!("{}/book/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send delete request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_requires_all_fields() {
    let client = Client::new();

    let response = client
        .post(format!("{}/book", BASE_URL))
        .multipart(Form::new().text("name", "Incomplete"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 500);

    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, "Missing required fields!");
}

#[tokio::test]
#[ignore]
async fn test_create_rejects_empty_required_fields() {
    let client = Client::new();

    // an empty author field counts as missing
    let response = client
        .post(format!("{}/book", BASE_URL))
        .multipart(book_form("Dune", "", "9.99"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 500);
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_book_fails() {
    let client = Client::new();

    let response = client
        .get(format!("{}/book/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 500);

    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, "Book record not existing!");
}

#[tokio::test]
#[ignore]
async fn test_destroy_unknown_book_fails() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/book/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 500);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();

    // create
    let created = create_book(&client, book_form("Dune", "Herbert", "9.99")).await;
    let id = created["id"].as_i64().expect("No id in created book");
    assert_eq!(created["name"], "Dune");
    assert_eq!(created["author"], "Herbert");
    assert!(created["createdAt"].is_string());

    // read back
    let response = client
        .get(format!("{}/book/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send get request");
    assert!(response.status().is_success());

    let fetched: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(fetched["name"], "Dune");
    assert_eq!(fetched["author"], "Herbert");

    // partial update: only price changes
    let response = client
        .put(format!("{}/book/{}", BASE_URL, id))
        .multipart(Form::new().text("price", "12.5"))
        .send()
        .await
        .expect("Failed to send update request");
    assert!(response.status().is_success());

    let updated: Value = response.json().await.expect("Failed to parse updated book");
    assert_eq!(updated["price"], 12.5);
    assert_eq!(updated["name"], "Dune");
    assert_eq!(updated["author"], "Herbert");

    // destroy
    let response = client
        .delete(format!("{}/book/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send delete request");
    assert!(response.status().is_success());
    assert_eq!(response.text().await.expect("Failed to read body"), "Ok");

    // gone
    let response = client
        .get(format!("{}/book/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send get request");
    assert_eq!(response.status(), 500);
}

#[tokio::test]
#[ignore]
async fn test_list_filters_are_a_union() {
    let client = Client::new();

    let by_tag = create_book(
        &client,
        book_form("Neuromancer", "Gibson", "7.50").text("tag", "cyberpunk-union-test"),
    )
    .await;
    let by_author = create_book(&client, book_form("Exhalation", "Chiang-union-test", "11.00")).await;

    // tag matches one record, author the other; both must be returned
    let response = client
        .get(format!(
            "{}/book?tag=cyberpunk-union-test&author=Chiang-union-test",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send list request");
    assert!(response.status().is_success());

    let books: Vec<Value> = response.json().await.expect("Failed to parse list");
    let ids: Vec<i64> = books.iter().filter_map(|b| b["id"].as_i64()).collect();
    assert!(ids.contains(&by_tag["id"].as_i64().unwrap()));
    assert!(ids.contains(&by_author["id"].as_i64().unwrap()));

    delete_book(&client, by_tag["id"].as_i64().unwrap()).await;
    delete_book(&client, by_author["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore]
async fn test_list_date_filter_matches_creation_day() {
    let client = Client::new();

    let created = create_book(&client, book_form("Today's Book", "Nobody", "1.00")).await;
    let id = created["id"].as_i64().unwrap();

    let today = chrono::Utc::now().format("%d-%m-%Y").to_string();
    let response = client
        .get(format!("{}/book?date={}", BASE_URL, today))
        .send()
        .await
        .expect("Failed to send list request");
    assert!(response.status().is_success());

    let books: Vec<Value> = response.json().await.expect("Failed to parse list");
    assert!(books.iter().any(|b| b["id"].as_i64() == Some(id)));

    delete_book(&client, id).await;
}

#[tokio::test]
#[ignore]
async fn test_list_ordering_and_limit() {
    let client = Client::new();

    let first = create_book(&client, book_form("Older", "Order-Test", "1.00")).await;
    let second = create_book(&client, book_form("Newer", "Order-Test", "2.00")).await;

    let response = client
        .get(format!("{}/book?author=Order-Test&limit=1", BASE_URL))
        .send()
        .await
        .expect("Failed to send list request");
    assert!(response.status().is_success());

    // newest first, capped by limit
    let books: Vec<Value> = response.json().await.expect("Failed to parse list");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["id"].as_i64(), second["id"].as_i64());

    delete_book(&client, first["id"].as_i64().unwrap()).await;
    delete_book(&client, second["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore]
async fn test_document_upload_and_replacement() {
    let client = Client::new();

    let form = book_form("Documented", "Uploader", "5.00").part(
        "document",
        Part::bytes(b"first file".to_vec())
            .file_name("first.txt")
            .mime_str("text/plain")
            .expect("Invalid mime type"),
    );

    let created = create_book(&client, form).await;
    let id = created["id"].as_i64().unwrap();

    let document = &created["document"];
    assert_eq!(document["name"], "first.txt");
    assert_eq!(document["type"], "text/plain");
    assert_eq!(document["size"], 10);
    let first_url = document["url"].as_str().expect("No document url").to_string();

    // the stored file is served under its descriptor URL
    let response = client
        .get(&first_url)
        .send()
        .await
        .expect("Failed to fetch document");
    assert!(response.status().is_success());

    // uploading a new document replaces the old descriptor
    let response = client
        .put(format!("{}/book/{}", BASE_URL, id))
        .multipart(Form::new().part(
            "document",
            Part::bytes(b"second file".to_vec())
                .file_name("second.txt")
                .mime_str("text/plain")
                .expect("Invalid mime type"),
        ))
        .send()
        .await
        .expect("Failed to send update request");
    assert!(response.status().is_success());

    let updated: Value = response.json().await.expect("Failed to parse updated book");
    assert_eq!(updated["document"]["name"], "second.txt");
    assert_ne!(updated["document"]["url"].as_str().unwrap(), first_url);

    // the replaced file is gone from storage
    let response = client
        .get(&first_url)
        .send()
        .await
        .expect("Failed to fetch old document");
    assert_eq!(response.status(), 404);

    delete_book(&client, id).await;
}
