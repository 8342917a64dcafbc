//! End-to-end tests for the books routes against an in-memory database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::App;
use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

const SEED_ISBN: &str = "123432122";

async fn seeded_app() -> App {
    let settings = Settings {
        database: DatabaseSettings::in_memory(),
        ..Settings::default()
    };
    let app = bookshelf_app::bootstrap(settings).await.unwrap();

    sqlx::query(
        "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
         VALUES ('123432122', 'https://amazon.com/taco', 'Elie', 'English', 100,
                 'Nothing publishers', 'my first book', 2008)",
    )
    .execute(&app.pool)
    .await
    .unwrap();

    app
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn book_count(app: &App) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    count
}

fn new_book() -> Value {
    json!({
        "isbn": "32794782",
        "amazon_url": "https://taco.com",
        "author": "mctest",
        "language": "english",
        "pages": 1000,
        "publisher": "yeah right",
        "title": "amazing times",
        "year": 2000
    })
}

fn book_update() -> Value {
    json!({
        "author": "mctest",
        "language": "english",
        "pages": 1000,
        "title": "amazing times",
        "year": 2000
    })
}

#[tokio::test]
async fn get_all_books() {
    let app = seeded_app().await;
    let (status, body) = send(&app.router(), Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"][0]["isbn"], SEED_ISBN);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_on_empty_table_is_empty() {
    let app = seeded_app().await;
    sqlx::query("DELETE FROM books").execute(&app.pool).await.unwrap();

    let (status, body) = send(&app.router(), Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"], json!([]));
}

#[tokio::test]
async fn list_is_ordered_by_title() {
    let app = seeded_app().await;
    let router = app.router();
    let mut other = new_book();
    other["title"] = json!("a tale first");
    send(&router, Method::POST, "/books", Some(other)).await;

    let (_, body) = send(&router, Method::GET, "/books", None).await;
    let titles: Vec<&str> = body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["a tale first", "my first book"]);
}

#[tokio::test]
async fn get_a_single_book() {
    let app = seeded_app().await;
    let (status, body) = send(&app.router(), Method::GET, "/books/123432122", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["book"],
        json!({
            "isbn": "123432122",
            "amazon_url": "https://amazon.com/taco",
            "author": "Elie",
            "language": "English",
            "pages": 100,
            "publisher": "Nothing publishers",
            "title": "my first book",
            "year": 2008
        })
    );
}

#[tokio::test]
async fn get_unknown_isbn_is_not_found() {
    let app = seeded_app().await;
    let (status, body) = send(&app.router(), Method::GET, "/books/99999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "isbn not found");
}

#[tokio::test]
async fn overlong_isbn_is_a_bad_request() {
    let app = seeded_app().await;
    let uri = format!("/books/{}", "9".repeat(65));
    let (status, body) = send(&app.router(), Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn create_then_fetch_returns_same_values() {
    let app = seeded_app().await;
    let router = app.router();

    let (status, body) = send(&router, Method::POST, "/books", Some(new_book())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["isbn"], "32794782");

    let (status, fetched) = send(&router, Method::GET, "/books/32794782", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["book"], new_book());

    let (_, listed) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(listed["books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_with_free_form_isbn_can_be_fetched() {
    let app = seeded_app().await;
    let router = app.router();
    let mut payload = new_book();
    payload["isbn"] = json!("abc-123");

    let (status, body) = send(&router, Method::POST, "/books", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["isbn"], "abc-123");

    let (status, fetched) = send(&router, Method::GET, "/books/abc-123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["book"], payload);
}

#[tokio::test]
async fn create_with_float_pages_names_the_field() {
    let app = seeded_app().await;
    let mut payload = new_book();
    payload["pages"] = json!(1000.0);

    let (status, body) = send(&app.router(), Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "pages");
    assert_eq!(book_count(&app).await, 1);
}

#[tokio::test]
async fn create_with_missing_field_is_rejected_without_write() {
    let app = seeded_app().await;
    let mut payload = new_book();
    payload.as_object_mut().unwrap().remove("year");

    let (status, body) = send(&app.router(), Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"][0]["field"], "year");
    assert_eq!(book_count(&app).await, 1);
}

#[tokio::test]
async fn create_lists_every_violation() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app.router(),
        Method::POST,
        "/books",
        Some(json!({ "isbn": "1", "pages": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    // six missing fields plus pages below the minimum
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn create_duplicate_isbn_is_a_conflict() {
    let app = seeded_app().await;
    let mut payload = new_book();
    payload["isbn"] = json!(SEED_ISBN);

    let (status, body) = send(&app.router(), Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(book_count(&app).await, 1);
}

#[tokio::test]
async fn create_with_invalid_json_is_a_bad_request() {
    let app = seeded_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(book_count(&app).await, 1);
}

#[tokio::test]
async fn update_a_book() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app.router(),
        Method::PUT,
        "/books/123432122",
        Some(book_update()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["isbn"], SEED_ISBN);
    assert_eq!(body["book"]["author"], "mctest");
    assert_eq!(body["book"]["title"], "amazing times");
    // optional fields left out of the payload keep their stored values
    assert_eq!(body["book"]["amazon_url"], "https://amazon.com/taco");
    assert_eq!(body["book"]["publisher"], "Nothing publishers");
}

#[tokio::test]
async fn update_with_missing_field_is_rejected() {
    let app = seeded_app().await;
    let mut payload = book_update();
    payload.as_object_mut().unwrap().remove("year");

    let (status, _) =
        send(&app.router(), Method::PUT, "/books/123432122", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app.router(), Method::GET, "/books/123432122", None).await;
    assert_eq!(body["book"]["author"], "Elie");
}

#[tokio::test]
async fn update_may_not_change_isbn() {
    let app = seeded_app().await;
    let mut payload = book_update();
    payload["isbn"] = json!("999");

    let (status, body) =
        send(&app.router(), Method::PUT, "/books/123432122", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "isbn");
}

#[tokio::test]
async fn update_unknown_isbn_creates_nothing() {
    let app = seeded_app().await;
    let (status, _) =
        send(&app.router(), Method::PUT, "/books/9999", Some(book_update())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(book_count(&app).await, 1);
}

#[tokio::test]
async fn delete_a_book() {
    let app = seeded_app().await;
    let router = app.router();

    let (status, body) = send(&router, Method::DELETE, "/books/123432122", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = send(&router, Method::GET, "/books/123432122", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_isbn_is_not_found() {
    let app = seeded_app().await;
    let (status, _) = send(&app.router(), Method::DELETE, "/books/9999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(book_count(&app).await, 1);
}

#[tokio::test]
async fn books_health_and_openapi_are_served() {
    let app = seeded_app().await;
    let router = app.router();

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/books/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, spec) = send(&router, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/books/{isbn}"]["put"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
}
