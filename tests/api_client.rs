//! End-to-end client tests against an in-process backend.
//!
//! The fake backend mirrors the shop API's routes and error bodies closely
//! enough to exercise token injection, status mapping, and the sign-in flow.

use axum::extract::Path;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use shopfront::net::types::{ProductCreate, ProductUpdate, ReviewCreate};
use shopfront::router::{ADMIN_PATH, LOGIN_PATH, SHOP_PATH};
use shopfront::services::auth;
use shopfront::{ApiClient, ApiError, ClientConfig, MemoryStorage, Navigation, RouteGuard, SharedStorage};

const TOKEN: &str = "test-token";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn require_token(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if bearer == Some(TOKEN) {
        Ok(())
    } else {
        Err(reject(StatusCode::UNAUTHORIZED, "Not authenticated"))
    }
}

fn product_json(id: i64) -> Value {
    json!({
        "id": id,
        "product_type_id": 1,
        "name": format!("Product {id}"),
        "description": null,
        "price": 2.5,
        "image": null
    })
}

fn review_json(id: i64) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "rating": 5,
        "text": "fresh",
        "created_at": "2025-03-01T12:00:00",
        "user_login": "alice"
    })
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["login"] == "alice" && body["password"] == "secret" {
        Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
    } else {
        Err(reject(StatusCode::UNAUTHORIZED, "Incorrect login or password"))
    }
}

async fn register(Json(body): Json<Value>) -> Reply {
    if body["login"] == "alice" {
        return Err(reject(StatusCode::BAD_REQUEST, "Login already registered"));
    }
    Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
}

async fn me(headers: HeaderMap) -> Reply {
    require_token(&headers)?;
    Ok(Json(json!({ "id": 1, "login": "alice", "is_superuser": true })))
}

async fn list_products() -> Json<Value> {
    Json(json!([product_json(1), product_json(2)]))
}

async fn get_product(Path(id): Path<i64>) -> Reply {
    if id > 2 {
        return Err(reject(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(Json(product_json(id)))
}

async fn create_product(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    require_token(&headers)?;
    let mut created = body;
    created["id"] = json!(3);
    created["description"] = created.get("description").cloned().unwrap_or(Value::Null);
    created["image"] = Value::Null;
    Ok(Json(created))
}

async fn update_product(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Reply {
    require_token(&headers)?;
    let mut product = product_json(id);
    if let (Some(target), Some(changes)) = (product.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Ok(Json(product))
}

async fn delete_product(headers: HeaderMap, Path(_id): Path<i64>) -> Reply {
    require_token(&headers)?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

async fn list_product_types() -> Json<Value> {
    Json(json!([{ "id": 1, "name": "Fruit" }]))
}

async fn get_product_type(Path(id): Path<i64>) -> Reply {
    if id != 1 {
        return Err(reject(StatusCode::NOT_FOUND, "Product type not found"));
    }
    Ok(Json(json!({ "id": 1, "name": "Fruit" })))
}

async fn list_reviews() -> Json<Value> {
    Json(json!([review_json(1), review_json(2)]))
}

async fn latest_reviews() -> Json<Value> {
    Json(json!([review_json(2)]))
}

async fn get_review(Path(id): Path<i64>) -> Json<Value> {
    Json(review_json(id))
}

async fn create_review(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    require_token(&headers)?;
    let mut review = review_json(9);
    review["rating"] = body["rating"].clone();
    review["text"] = body["text"].clone();
    Ok(Json(review))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/me", get(me))
        .route("/products/", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product).delete(delete_product))
        .route("/product_types/", get(list_product_types))
        .route("/product_types/{id}", get(get_product_type))
        .route("/reviews/", get(list_reviews).post(create_review))
        .route("/reviews/latest", get(latest_reviews))
        .route("/reviews/{id}", get(get_review));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{addr}")
}

fn client(base_url: &str) -> (ApiClient, SharedStorage) {
    let storage = MemoryStorage::shared();
    let config = ClientConfig::new(base_url).expect("config");
    (ApiClient::new(&config, storage.clone()).expect("client"), storage)
}

#[tokio::test]
async fn sign_in_persists_session_and_unlocks_admin() {
    let (api, storage) = client(&spawn_backend().await);
    let guard = RouteGuard::new(api.session());
    assert_eq!(guard.navigate(ADMIN_PATH), Navigation::Redirect(LOGIN_PATH));

    let user = auth::sign_in(&api, "alice", "secret").await.expect("sign in");
    assert!(user.is_superuser);
    assert_eq!(storage.get_item("token").unwrap().as_deref(), Some(TOKEN));
    assert_eq!(api.session().user().unwrap(), Some(user));
    assert_eq!(guard.navigate(ADMIN_PATH), Navigation::Allow);
    assert_eq!(guard.navigate(SHOP_PATH), Navigation::Allow);

    auth::sign_out(&api).expect("sign out");
    assert_eq!(guard.navigate(SHOP_PATH), Navigation::Redirect(LOGIN_PATH));
}

#[tokio::test]
async fn wrong_password_is_401_and_leaves_no_session() {
    let (api, _) = client(&spawn_backend().await);
    let err = auth::sign_in(&api, "alice", "nope").await.unwrap_err();
    let api_err = match err {
        auth::AuthError::Api(e) => e,
        other => panic!("expected API error, got {other:?}"),
    };
    assert_eq!(api_err.status(), Some(401));
    assert!(api_err.is_unauthorized());
    assert_eq!(api_err.detail().as_deref(), Some("Incorrect login or password"));
    assert!(!api.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn register_new_login_signs_in_and_taken_login_is_400() {
    let (api, _) = client(&spawn_backend().await);
    let err = auth::register(&api, "alice", "secret").await.unwrap_err();
    assert!(matches!(err, auth::AuthError::Api(ref e) if e.status() == Some(400)));

    let user = auth::register(&api, "bob", "pw").await.expect("register");
    assert!(api.session().is_authenticated().unwrap());
    assert_eq!(api.session().user().unwrap(), Some(user));
}

#[tokio::test]
async fn current_user_without_token_is_unauthorized() {
    let (api, _) = client(&spawn_backend().await);
    let err = api.auth().current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn catalog_reads_need_no_token() {
    let (api, _) = client(&spawn_backend().await);

    let products = api.products().list().await.expect("products");
    assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(api.products().get(2).await.expect("product").name, "Product 2");

    let types = api.product_types().list().await.expect("types");
    assert_eq!(types.len(), 1);
    assert_eq!(api.product_types().get(1).await.expect("type").name, "Fruit");

    assert_eq!(api.reviews().list().await.expect("reviews").len(), 2);
    assert_eq!(api.reviews().latest().await.expect("latest")[0].id, 2);
    assert_eq!(api.reviews().get(7).await.expect("review").id, 7);
}

#[tokio::test]
async fn missing_resource_maps_to_status_error() {
    let (api, _) = client(&spawn_backend().await);
    let err = api.products().get(404).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail().as_deref(), Some("Product not found"));

    let err = api.product_types().get(5).await.unwrap_err();
    assert_eq!(err.detail().as_deref(), Some("Product type not found"));
}

#[tokio::test]
async fn writes_are_rejected_without_token_and_accepted_with_it() {
    let (api, _) = client(&spawn_backend().await);
    let draft = ProductCreate {
        product_type_id: 1,
        name: "Mango".to_owned(),
        description: Some("ripe".to_owned()),
        price: 4.0,
        image: None,
    };

    let err = api.products().create(&draft).await.unwrap_err();
    assert!(err.is_unauthorized());

    api.session().set_token(TOKEN).unwrap();
    let created = api.products().create(&draft).await.expect("create");
    assert_eq!(created.id, 3);
    assert_eq!(created.description.as_deref(), Some("ripe"));

    let update = ProductUpdate { price: Some(5.5), ..ProductUpdate::default() };
    let updated = api.products().update(1, &update).await.expect("update");
    assert!((updated.price - 5.5).abs() < f64::EPSILON);
    assert_eq!(updated.name, "Product 1");

    let deleted = api.products().delete(1).await.expect("delete");
    assert_eq!(deleted.message, "Product deleted successfully");

    let review = api
        .reviews()
        .create(&ReviewCreate { rating: 4, text: "good".to_owned() })
        .await
        .expect("review");
    assert_eq!((review.rating, review.text.as_str()), (4, "good"));
}

#[tokio::test]
async fn fetched_products_go_into_the_cart() {
    let (api, _) = client(&spawn_backend().await);
    let products = api.products().list().await.expect("products");
    let cart = api.cart();

    cart.add_one(&products[0]).unwrap();
    cart.add_item(&products[0], 2).unwrap();
    let items = cart.add_one(&products[1]).unwrap();

    assert_eq!(items.iter().map(|i| (i.id, i.quantity)).collect::<Vec<_>>(), vec![(1, 3), (2, 1)]);
    assert!((cart.total().unwrap() - 10.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let (api, _) = client(&format!("http://{addr}"));
    let err = api.products().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
    assert_eq!(err.status(), None);
}
