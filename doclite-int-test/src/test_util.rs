use chrono::{DateTime, TimeZone, Utc};
use doclite::collection::{DocId, Document};
use doclite::doc;
use doclite::errors::{DocliteError, DocliteResult, ErrorKind};
use doclite::filter::{and, field};
use doclite::Store;
use std::panic::{self, AssertUnwindSafe};

pub const ITEM_1: &str = "552bc0f7bbcdf26a32e99954";
pub const ITEM_2: &str = "552bc285bbcdf26a32e99957";
pub const ITEM_3: &str = "552bc0f7bbcdf26a32e99958";
pub const ITEM_4: &str = "552bc285bbcdf26a32e99959";

/// Runs `test` against the context built by `before`, then hands the context
/// to `after`.
///
/// `after` runs even when the test body fails or panics. Every test gets a
/// fresh in-memory store, so a failure is reported on the first attempt.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: FnOnce(TestContext) -> DocliteResult<()>,
    B: FnOnce() -> DocliteResult<TestContext>,
    A: FnOnce(TestContext) -> DocliteResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| test(ctx.clone())));
    let cleanup = after(ctx);

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(payload) => panic::resume_unwind(payload),
    }
    if let Err(e) = cleanup {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    store: Store,
}

impl TestContext {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Store {
        self.store.clone()
    }
}

pub fn create_test_context() -> DocliteResult<TestContext> {
    Ok(TestContext::new(Store::new()))
}

/// A context whose store already holds the shop `items` and `orders`.
pub fn create_shop_context() -> DocliteResult<TestContext> {
    let ctx = create_test_context()?;
    seed_items(&ctx.store())?;
    seed_orders(&ctx.store())?;
    Ok(ctx)
}

pub fn cleanup(ctx: TestContext) -> DocliteResult<()> {
    let store = ctx.store();
    for name in store.list_collection_names() {
        store.drop_collection(&name);
    }
    Ok(())
}

pub fn item_id(hex: &str) -> DocliteResult<DocId> {
    DocId::from_hex(hex)
}

pub fn date(year: i32, month: u32, day: u32) -> DocliteResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            DocliteError::new(
                &format!("Invalid date {}-{}-{}", year, month, day),
                ErrorKind::InvalidOperation,
            )
        })
}

pub fn shop_items() -> Vec<Document> {
    vec![
        doc! { "category": "Phone", "model": "iPhone 6", "producer": "Apple", "price": 600 },
        doc! { "category": "TV", "model": "Samsung QLED", "producer": "Samsung", "price": 1200 },
        doc! { "category": "Smart Watch", "model": "Apple Watch", "producer": "Apple", "price": 400 },
        doc! { "category": "Phone", "model": "Xiaomi T11", "producer": "Xiaomi", "price": 400 },
        doc! { "category": "Laptop", "model": "MacBook Air", "producer": "Apple", "price": 1000 },
        doc! { "category": "Headphones", "model": "Marshall Major IV", "producer": "Marshall", "price": 250 },
        doc! { "category": "Smart Watch", "model": "Samsung Galaxy Fit 3", "producer": "Samsung", "price": 70 },
    ]
}

/// Upserts every shop item keyed by category and model, so seeding twice
/// leaves the collection unchanged.
pub fn seed_items(store: &Store) -> DocliteResult<Vec<DocId>> {
    let mut ids = Vec::new();
    for item in shop_items() {
        let key = and(vec![
            field("category").eq(item_string(&item, "category")?),
            field("model").eq(item_string(&item, "model")?),
        ]);
        ids.push(store.upsert_by_key("items", key, item)?);
    }
    Ok(ids)
}

pub fn shop_orders() -> DocliteResult<Vec<Document>> {
    Ok(vec![
        doc! {
            "order_number": 201513,
            "date": (date(2023, 1, 15)?),
            "total_sum": 1200,
            "customer": {
                "name": "Andrii",
                "surname": "Rodinov",
                "phones": [9876543, 1234567],
                "address": "PTI, Peremohy 37, Kyiv, UA"
            },
            "payment": {
                "card_owner": "Andrii Rodionov",
                "cardId": 12345678
            },
            "items_id": [(item_id(ITEM_1)?), (item_id(ITEM_2)?)]
        },
        doc! {
            "order_number": 201514,
            "date": (date(2023, 1, 16)?),
            "total_sum": 400,
            "customer": {
                "name": "Oleg",
                "surname": "Ivanov",
                "phones": [9876543, 1234567],
                "address": "PTI, Peremohy 37, Kyiv, UA"
            },
            "payment": {
                "card_owner": "Oleg Ivanov",
                "cardId": 12345679
            },
            "items_id": [(item_id(ITEM_2)?), (item_id(ITEM_3)?)]
        },
    ])
}

pub fn seed_orders(store: &Store) -> DocliteResult<()> {
    store.insert_many("orders", shop_orders()?)?;
    Ok(())
}

pub fn reviews() -> Vec<Document> {
    vec![
        doc! { "review": "Review 1", "rating": 5 },
        doc! { "review": "Review 2", "rating": 4 },
        doc! { "review": "Review 3", "rating": 3 },
        doc! { "review": "Review 4", "rating": 2 },
        doc! { "review": "Review 5", "rating": 1 },
        doc! { "review": "Review 6", "rating": 5 },
    ]
}

fn item_string(item: &Document, key: &str) -> DocliteResult<String> {
    item.get(key)
        .and_then(|v| v.as_string())
        .cloned()
        .ok_or_else(|| {
            DocliteError::new(&format!("Item has no {} field", key), ErrorKind::NotFound)
        })
}
