use doclite::collection::Projection;
use doclite::common::Value;
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{all, and, field, not, or};
use doclite_int_test::test_util::{
    cleanup, create_shop_context, create_test_context, date, item_id, run_test, ITEM_2, ITEM_4,
};

fn models(documents: &[doclite::collection::Document]) -> Vec<String> {
    documents
        .iter()
        .filter_map(|d| d.get("model").and_then(|v| v.as_string()).cloned())
        .collect()
}

#[test]
fn test_find_all_in_storage_order() {
    run_test(
        create_shop_context,
        |ctx| {
            let mut cursor = ctx.store().find("items", all())?;
            assert_eq!(cursor.size(), 7);
            let items = cursor.to_vec()?;
            assert_eq!(
                models(&items),
                vec![
                    "iPhone 6",
                    "Samsung QLED",
                    "Apple Watch",
                    "Xiaomi T11",
                    "MacBook Air",
                    "Marshall Major IV",
                    "Samsung Galaxy Fit 3",
                ]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_phone_in_price_range() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert("items", doc! { "category": "Phone", "price": 600 })?;
            store.insert("items", doc! { "category": "Phone", "price": 400 })?;

            let result = store
                .find(
                    "items",
                    and(vec![field("category").eq("Phone"), field("price").between(500, 700)]),
                )?
                .to_vec()?;
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].get("price"), Some(&Value::from(600)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_or_and_in() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store
                .find(
                    "items",
                    or(vec![field("model").eq("iPhone 6"), field("model").eq("Samsung QLED")]),
                )?
                .to_vec()?;
            assert_eq!(models(&result), vec!["iPhone 6", "Samsung QLED"]);

            let mut cursor =
                store.find("items", field("producer").in_array(vec!["Apple", "Samsung"]))?;
            assert_eq!(cursor.size(), 5);

            let mut cursor = store.find("items", not(field("producer").eq("Apple")))?;
            assert_eq!(cursor.size(), 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_count_and_distinct() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            assert_eq!(store.count("items", field("category").eq("Phone"))?, 2);
            assert_eq!(store.distinct("items", "category")?.len(), 5);
            assert_eq!(
                store.distinct("items", "producer")?,
                vec![
                    Value::from("Apple"),
                    Value::from("Samsung"),
                    Value::from("Xiaomi"),
                    Value::from("Marshall"),
                ]
            );

            let ids = store.distinct("orders", "items_id")?;
            assert_eq!(ids.len(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_nested_field() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store
                .find(
                    "orders",
                    and(vec![
                        field("customer.name").eq("Andrii"),
                        field("customer.surname").eq("Rodinov"),
                    ]),
                )?
                .to_vec()?;
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].get("order_number"), Some(&Value::from(201513)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_array_element() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let mut cursor = store.find("orders", field("items_id").eq(item_id(ITEM_2)?))?;
            assert_eq!(cursor.size(), 2);

            let mut cursor = store.find("orders", field("items_id").eq(item_id(ITEM_4)?))?;
            assert_eq!(cursor.size(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_date_range() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let mut cursor = store.find(
                "orders",
                field("date").between(date(2023, 1, 1)?, date(2023, 1, 15)?),
            )?;
            assert_eq!(cursor.size(), 1);

            let mut cursor = store.find("orders", field("total_sum").gt(500))?;
            assert_eq!(cursor.size(), 1);

            // a timestamp never compares with a number
            let mut cursor = store.find("orders", field("date").gt(0))?;
            assert_eq!(cursor.size(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_projection() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store
                .find_with_projection(
                    "orders",
                    field("total_sum").gt(500),
                    Projection::including(&["customer", "payment.cardId"]).without_id(),
                )?
                .to_vec()?;
            assert_eq!(result.len(), 1);
            let projected = &result[0];
            assert!(!projected.has_id());
            assert!(projected.contains_field("customer.phones"));
            assert_eq!(projected.get("payment.cardId"), Some(&Value::from(12345678)));
            assert!(!projected.contains_field("payment.card_owner"));
            assert!(!projected.contains_field("total_sum"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_mixed_projection() {
    run_test(
        create_shop_context,
        |ctx| {
            let result = ctx.store().find_with_projection(
                "orders",
                all(),
                Projection::new().include("customer").exclude("payment"),
            );
            assert_eq!(result.err().map(|e| e.kind().clone()), Some(ErrorKind::InvalidStage));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_is_restartable_snapshot() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let mut cursor = store.find("items", field("category").eq("Phone"))?;
            store.insert("items", doc! { "category": "Phone", "model": "Pixel" })?;

            assert_eq!(cursor.size(), 2);
            let first = cursor.first().unwrap()?;
            assert_eq!(first.get("model"), Some(&Value::from("iPhone 6")));

            cursor.reset();
            assert_eq!(cursor.by_ref().count(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_malformed_filter() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let err = store.count("items", field("").eq(1)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidFilter);

            let err = store.count("items", or(vec![])).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidFilter);

            let err = store.count("items", field("price").gte(Value::from_vec(vec![1, 2]))).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidFilter);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_on_unknown_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx.store().find("nothing", all()).err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::NotFound);
            Ok(())
        },
        cleanup,
    )
}
