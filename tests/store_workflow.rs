mod helpers;

use helpers::{send_store, FakeBackend};
use onimix_dashboard::models::{ProductCategory, ProductType};
use onimix_dashboard::state::{EditPhase, NoticeKind};
use onimix_dashboard::store::{ProductField, ProductValue, Store, StoreMsg};
use onimix_dashboard::ApiError;

fn mounted() -> (FakeBackend, Store) {
    let backend = FakeBackend::new();
    let mut store = Store::new();
    send_store(&backend, &mut store, StoreMsg::Mounted);
    (backend, store)
}

fn fill(store: &mut Store, field: ProductField, text: &str) {
    store.update(StoreMsg::FieldChanged(
        field,
        ProductValue::Text(text.to_string()),
    ));
}

#[test]
fn coerced_numbers_reach_the_backend() {
    let (backend, mut store) = mounted();
    store.update(StoreMsg::StartCreate);
    fill(&mut store, ProductField::Name, "Sample Pack");
    fill(&mut store, ProductField::Description, "Forty drum loops");
    fill(&mut store, ProductField::Price, "19.99");
    fill(&mut store, ProductField::StockQuantity, "5");
    store.update(StoreMsg::FieldChanged(
        ProductField::ProductType,
        ProductValue::Type(ProductType::Physical),
    ));

    let notices = send_store(&backend, &mut store, StoreMsg::SubmitRequested);

    let payload = backend.state().last_product_payload.clone().unwrap();
    let body = serde_json::to_value(&payload).unwrap();
    assert_eq!(body["price"], serde_json::json!(19.99));
    assert_eq!(body["stock_quantity"], serde_json::json!(5));
    assert_eq!(body["product_type"], serde_json::json!("physical"));
    assert_eq!(body["category"], serde_json::json!("tech_tools"));

    assert!(store.editor().is_idle());
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.products()[0].category, ProductCategory::TechTools);
    assert_eq!(
        backend.calls(),
        vec!["GET /products", "POST /products", "GET /products"]
    );
    assert!(notices
        .iter()
        .any(|notice| notice.text == "Added \"Sample Pack\"."));
}

#[test]
fn empty_stock_is_sent_as_zero() {
    let (backend, mut store) = mounted();
    store.update(StoreMsg::StartCreate);
    fill(&mut store, ProductField::Name, "Lyric Book");
    fill(&mut store, ProductField::Description, "Hardcover");
    fill(&mut store, ProductField::Price, "25");
    fill(&mut store, ProductField::StockQuantity, "");
    send_store(&backend, &mut store, StoreMsg::SubmitRequested);

    let payload = backend.state().last_product_payload.clone().unwrap();
    assert_eq!(payload.stock_quantity, 0);
    assert_eq!(payload.price, 25.0);
}

#[test]
fn missing_required_fields_send_nothing() {
    let (backend, mut store) = mounted();
    store.update(StoreMsg::StartCreate);
    fill(&mut store, ProductField::Name, "No Price");
    fill(&mut store, ProductField::Description, "Something");

    let outcome = store.update(StoreMsg::SubmitRequested);
    assert!(outcome.requests.is_empty());
    assert_eq!(outcome.notice.map(|n| n.kind), Some(NoticeKind::Error));
    assert_eq!(backend.calls(), vec!["GET /products"]);
}

#[test]
fn unparseable_price_is_a_local_error() {
    let (backend, mut store) = mounted();
    store.update(StoreMsg::StartCreate);
    fill(&mut store, ProductField::Name, "Beat Lease");
    fill(&mut store, ProductField::Description, "MP3 lease");
    fill(&mut store, ProductField::Price, "1.2.3");

    let outcome = store.update(StoreMsg::SubmitRequested);
    assert!(outcome.requests.is_empty());
    let EditPhase::Editing(edit) = store.editor() else {
        panic!("form should stay open");
    };
    assert!(edit.error.is_some());
    assert_eq!(backend.calls(), vec!["GET /products"]);
}

#[test]
fn backend_rejection_keeps_the_draft() {
    let (backend, mut store) = mounted();
    store.update(StoreMsg::StartCreate);
    fill(&mut store, ProductField::Name, "Hoodie");
    fill(&mut store, ProductField::Description, "Black, embroidered");
    fill(&mut store, ProductField::Price, "45");

    backend.fail_next(ApiError::Status {
        status: 422,
        body: "{\"detail\":\"price out of range\"}".to_string(),
    });
    send_store(&backend, &mut store, StoreMsg::SubmitRequested);

    let EditPhase::Editing(edit) = store.editor() else {
        panic!("failed create should return to editing");
    };
    assert_eq!(edit.draft.name, "Hoodie");
    assert!(edit.error.is_some());
    assert!(store.products().is_empty());
}

#[test]
fn cancel_discards_the_draft() {
    let (_backend, mut store) = mounted();
    store.update(StoreMsg::StartCreate);
    fill(&mut store, ProductField::Name, "Throwaway");
    store.update(StoreMsg::CancelCreate);
    assert!(store.editor().is_idle());

    store.update(StoreMsg::StartCreate);
    let EditPhase::Editing(edit) = store.editor() else {
        panic!("form should open");
    };
    assert!(edit.draft.name.is_empty());
    assert_eq!(edit.draft.stock_quantity, "0");
}
