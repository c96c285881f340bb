use super::*;
use crate::storage::{MemoryStorage, TOKEN_KEY};

fn client_with(storage: SharedStorage) -> ApiClient {
    ApiClient::new(&ClientConfig::new("http://127.0.0.1:8000/").unwrap(), storage).unwrap()
}

#[test]
fn endpoint_url_joins_without_double_slash() {
    assert_eq!(endpoint_url("http://h:1/", "/products/"), "http://h:1/products/");
    assert_eq!(endpoint_url("http://h:1", "/users/me"), "http://h:1/users/me");
}

#[test]
fn resource_paths_format_ids() {
    assert_eq!(product_path(42), "/products/42");
    assert_eq!(product_type_path(3), "/product_types/3");
    assert_eq!(review_path(9), "/reviews/9");
}

#[test]
fn bearer_header_prefixes_token() {
    assert_eq!(bearer_header("abc.def"), "Bearer abc.def");
}

#[test]
fn parse_body_reports_decode_errors() {
    let err = parse_body::<Vec<Product>>("{\"oops\":true}").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn request_without_token_has_no_authorization_header() {
    let client = client_with(MemoryStorage::shared());
    let request = client.request(Method::GET, "/products/").unwrap().build().unwrap();
    assert_eq!(request.url().as_str(), "http://127.0.0.1:8000/products/");
    assert!(request.headers().get(AUTHORIZATION).is_none());
}

#[test]
fn request_with_token_carries_bearer_header() {
    let storage = MemoryStorage::shared();
    storage.set_item(TOKEN_KEY, "tok-123").unwrap();
    let client = client_with(storage);

    let request = client.request(Method::POST, "/reviews/").unwrap().build().unwrap();
    let header = request.headers().get(AUTHORIZATION).unwrap();
    assert_eq!(header.to_str().unwrap(), "Bearer tok-123");
    assert!(header.is_sensitive());
}

#[test]
fn token_is_read_at_request_time() {
    let storage = MemoryStorage::shared();
    let client = client_with(storage.clone());
    let before = client.request(Method::GET, "/users/me").unwrap().build().unwrap();
    assert!(before.headers().get(AUTHORIZATION).is_none());

    storage.set_item(TOKEN_KEY, "late").unwrap();
    let request = client.request(Method::GET, "/users/me").unwrap().build().unwrap();
    assert_eq!(request.headers().get(AUTHORIZATION).unwrap().to_str().unwrap(), "Bearer late");
}

#[test]
fn invalid_token_is_rejected_before_sending() {
    let storage = MemoryStorage::shared();
    storage.set_item(TOKEN_KEY, "bad\ntoken").unwrap();
    let err = client_with(storage).request(Method::GET, "/users/me").unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[test]
fn cart_and_session_share_client_storage() {
    let storage = MemoryStorage::shared();
    let client = client_with(storage.clone());
    client.session().set_token("shared").unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("shared"));
    assert!(client.cart().get_items().unwrap().is_empty());
}
