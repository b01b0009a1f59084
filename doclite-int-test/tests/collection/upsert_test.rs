use doclite::collection::{max_count, DocId};
use doclite::common::Value;
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{all, and, field};
use doclite_int_test::test_util::{cleanup, create_test_context, run_test, seed_items};

#[test]
fn test_upsert_inserts_when_nothing_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let id = store.upsert_by_key(
                "items",
                field("model").eq("iPhone 6"),
                doc! { "category": "Phone", "model": "iPhone 6", "price": 600 },
            )?;
            assert_eq!(store.count("items", all())?, 1);
            assert!(store.get_by_id("items", &id)?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_twice_leaves_one_document() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let key = and(vec![field("category").eq("Phone"), field("model").eq("iPhone 6")]);
            let first = store.upsert_by_key(
                "items",
                key.clone(),
                doc! { "category": "Phone", "model": "iPhone 6", "price": 600 },
            )?;
            let second = store.upsert_by_key(
                "items",
                key.clone(),
                doc! { "category": "Phone", "model": "iPhone 6", "price": 550, "color": "gold" },
            )?;
            assert_eq!(first, second);
            assert_eq!(store.count("items", key)?, 1);

            let item = store.get_by_id("items", &first)?.unwrap();
            assert_eq!(item.get("price"), Some(&Value::from(550)));
            assert_eq!(item.get("color"), Some(&Value::from("gold")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_replaces_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let id = store.insert("items", doc! { "model": "iPhone 6", "warranty": "2 years" })?;
            store.upsert_by_key("items", field("model").eq("iPhone 6"), doc! { "model": "iPhone 6" })?;

            let item = store.get_by_id("items", &id)?.unwrap();
            assert!(!item.contains_field("warranty"));
            assert_eq!(item.keys().next().map(|k| k.as_str()), Some("_id"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_seeding_twice_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let first = seed_items(&store)?;
            let second = seed_items(&store)?;
            assert_eq!(first, second);
            assert_eq!(store.count("items", all())?, 7);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_cannot_change_id() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert("items", doc! { "model": "iPhone 6" })?;
            let err = store
                .upsert_by_key(
                    "items",
                    field("model").eq("iPhone 6"),
                    doc! { "_id": (DocId::new()), "model": "iPhone 6" },
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_on_capped_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.create_collection("reviews", Some(max_count(5)))?;
            let err = store
                .upsert_by_key("reviews", all(), doc! { "review": "Review 1" })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        cleanup,
    )
}
