use uuid::Uuid;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn listing_without_filters_returns_every_product() {
    let app = TestApp::spawn().await;
    app.create_product("linen-shirt", "shirts", "Acme").await;
    app.create_product("chinos", "trousers", "Acme").await;
    app.create_product("oxford", "shirts", "Globex").await;

    let res = app.get_without_token(routes::PRODUCTS).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["products"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn category_filter_matches_exactly() {
    let app = TestApp::spawn().await;
    app.create_product("linen-shirt", "shirts", "Acme").await;
    app.create_product("oxford", "shirts", "Globex").await;
    app.create_product("tee", "t-shirts", "Acme").await;
    app.create_product("polo", "Shirts", "Acme").await;

    let res = app.get_without_token(&routes::products_in("shirts")).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let products = res.body["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p["category"] == "shirts"));
}

#[tokio::test]
async fn category_and_brand_filters_are_combined() {
    let app = TestApp::spawn().await;
    app.create_product("linen-shirt", "shirts", "Acme").await;
    app.create_product("oxford", "shirts", "Globex").await;
    app.create_product("chinos", "trousers", "Globex").await;

    let res = app
        .get_without_token("/api/products?category=shirts&brand=Globex")
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let products = res.body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "oxford");
}

#[tokio::test]
async fn empty_filter_values_are_ignored() {
    let app = TestApp::spawn().await;
    app.create_product("linen-shirt", "shirts", "Acme").await;
    app.create_product("chinos", "trousers", "Acme").await;

    let res = app.get_without_token("/api/products?category=&brand=").await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["products"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_detail_includes_sizes() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("linen-shirt", "shirts", "Acme").await;
    let small = app.create_size("S").await;
    let medium = app.create_size("M").await;
    app.create_size("XL").await;
    app.link_size(product_id, small).await;
    app.link_size(product_id, medium).await;

    let res = app.get_without_token(&routes::product(product_id)).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["product"]["id"], product_id.to_string());
    assert_eq!(res.body["product"]["name"], "linen-shirt");
    let mut sizes: Vec<&str> = res.body["product"]["sizes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec!["M", "S"]);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::product(Uuid::new_v4())).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_product_id_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token("/api/products/not-a-uuid").await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
