use doclite::aggregate::{Lookup, Stage};
use doclite::collection::Projection;
use doclite::common::Value;
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{and, field};
use doclite::update::UpdateSpec;
use doclite_int_test::test_util::{
    cleanup, create_shop_context, create_test_context, item_id, run_test, ITEM_1, ITEM_2,
};

#[test]
fn test_lookup_skips_dangling_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert(
                "items",
                doc! { "_id": (item_id(ITEM_1)?), "model": "iPhone 6", "price": 600 },
            )?;
            store.insert(
                "orders",
                doc! { "order_number": 201513, "items_id": [(item_id(ITEM_1)?), (item_id(ITEM_2)?)] },
            )?;

            let result = store.aggregate(
                "orders",
                vec![Stage::lookup(Lookup::new("items", "items_id", "items"))],
            )?;
            assert_eq!(result.len(), 1);
            let items = result[0].get("items").and_then(|v| v.as_array()).unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(
                items[0].as_document().and_then(|d| d.get("model")),
                Some(&Value::from("iPhone 6"))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_lookup_without_matches_attaches_empty_array() {
    run_test(
        create_shop_context,
        |ctx| {
            let result = ctx.store().aggregate(
                "orders",
                vec![Stage::lookup(Lookup::new("items", "items_id", "items"))],
            )?;
            assert_eq!(result.len(), 2);
            for order in result {
                assert_eq!(order.get("items"), Some(&Value::Array(vec![])));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_lookup_on_custom_foreign_field() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            store.update_many(
                "orders",
                field("order_number").eq(201513),
                UpdateSpec::new().set("models", Value::from_vec(vec!["MacBook Air", "iPhone 6"])),
            )?;

            let result = store.aggregate(
                "orders",
                vec![
                    Stage::matching(field("order_number").eq(201513)),
                    Stage::lookup(Lookup::new("items", "models", "items").foreign_field("model")),
                    Stage::project(Projection::including(&["items.model", "items.price"]).without_id()),
                ],
            )?;
            // foreign storage order, not the order of the local array
            assert_eq!(
                result,
                vec![doc! {
                    "items": [
                        { "model": "iPhone 6", "price": 600 },
                        { "model": "MacBook Air", "price": 1000 }
                    ]
                }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_match_lookup_project() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert("items", doc! { "_id": (item_id(ITEM_1)?), "model": "iPhone 6", "price": 670 })?;
            store.insert("items", doc! { "_id": (item_id(ITEM_2)?), "model": "Samsung QLED", "price": 1200 })?;
            store.insert(
                "orders",
                doc! {
                    "order_number": 201513,
                    "customer": { "name": "Andrii", "surname": "Rodionov" },
                    "items_id": [(item_id(ITEM_1)?), (item_id(ITEM_2)?)]
                },
            )?;
            store.insert(
                "orders",
                doc! {
                    "order_number": 201514,
                    "customer": { "name": "Oleg", "surname": "Ivanov" },
                    "items_id": [(item_id(ITEM_2)?)]
                },
            )?;

            let result = store.aggregate(
                "orders",
                vec![
                    Stage::matching(and(vec![
                        field("customer.name").eq("Andrii"),
                        field("customer.surname").eq("Rodionov"),
                    ])),
                    Stage::lookup(Lookup::new("items", "items_id", "items")),
                    Stage::project(
                        Projection::including(&["customer", "items.model", "items.price"])
                            .without_id(),
                    ),
                ],
            )?;
            assert_eq!(
                result,
                vec![doc! {
                    "customer": { "name": "Andrii", "surname": "Rodionov" },
                    "items": [
                        { "model": "iPhone 6", "price": 670 },
                        { "model": "Samsung QLED", "price": 1200 }
                    ]
                }]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_lookup_unknown_foreign_collection() {
    run_test(
        create_shop_context,
        |ctx| {
            let err = ctx
                .store()
                .aggregate(
                    "orders",
                    vec![Stage::lookup(Lookup::new("products", "items_id", "items"))],
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);
            Ok(())
        },
        cleanup,
    )
}
