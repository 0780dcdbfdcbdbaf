//! End-to-end exercises against a running server with a real database.
//! Start the server locally, then: `cargo test -- --ignored`.

use serde_json::{Value, json};

const BASE_URL: &str = "http://localhost:3000/api/v1";

#[tokio::test]
#[ignore = "requires server running"]
async fn test_book_lifecycle_with_isbn_conflict() {
    let client = reqwest::Client::new();

    // Create a book
    let create_request = json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": "9780441013593",
        "genre": "Science Fiction",
        "pageCount": 412
    });

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&create_request)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert!(response.headers().contains_key("location"));

    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["title"], "Dune");
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_null());

    // Same ISBN again conflicts
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": "Dune copy", "isbn": "9780441013593" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Lookup by ISBN resolves to the first book
    let response = client
        .get(format!("{}/books/isbn/9780441013593", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let by_isbn: Value = response.json().await.unwrap();
    assert_eq!(by_isbn["id"].as_i64().unwrap(), id);

    // Full-replace update stamps updatedAt
    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .json(&json!({
            "id": id,
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "9780441013593",
            "genre": "Science Fiction",
            "pageCount": 412,
            "rating": 4.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    let updated: Value = response.json().await.unwrap();
    assert!(updated["updatedAt"].is_string());

    // Delete, then the record is gone
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore = "requires server running"]
async fn test_cover_image_workflow() {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": "Cover test book" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    // Deleting a cover that does not exist is a bad request
    let response = client
        .delete(format!("{}/books/{}/image", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Upload a tiny PNG
    let png: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    let part = reqwest::multipart::Part::bytes(png.to_vec())
        .file_name("cover.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("image", part);

    let response = client
        .post(format!("{}/books/{}/image", BASE_URL, id))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let image_url = body["imageUrl"].as_str().unwrap().to_string();

    // The stored cover is publicly served
    let response = client.get(&image_url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), png);

    // The record carries the reference
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["coverImageUrl"].as_str().unwrap(), image_url);

    // A bad extension is rejected
    let part = reqwest::multipart::Part::bytes(b"BM".to_vec()).file_name("cover.bmp");
    let form = reqwest::multipart::Form::new().part("image", part);
    let response = client
        .post(format!("{}/books/{}/image", BASE_URL, id))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Detach the cover, then the blob stops being served
    let response = client
        .delete(format!("{}/books/{}/image", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client.get(&image_url).send().await.unwrap();
    assert_eq!(response.status(), 404);

    // Cleanup
    client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires server running"]
async fn test_filters_and_count() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/books/recent?count=5", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let books: Value = response.json().await.unwrap();
    assert!(books.as_array().unwrap().len() <= 5);

    let response = client
        .get(format!("{}/books/recent?count=101", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/books/top-rated?count=3", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let books: Value = response.json().await.unwrap();
    for book in books.as_array().unwrap() {
        assert!(!book["rating"].is_null());
    }

    let response = client
        .get(format!("{}/books/count", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["count"].is_i64() || body["count"].is_u64());
}
