use doclite::collection::{DocId, Document};
use doclite::common::{Value, DOC_ID};
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{all, by_id, field};
use doclite::Store;
use doclite_int_test::test_util::{cleanup, create_test_context, run_test, shop_items};

#[test]
fn test_insert_assigns_id() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let id = store.insert("items", doc! { "category": "Phone", "price": 600 })?;

            let stored = store.get_by_id("items", &id)?;
            assert!(stored.is_some());
            let stored = stored.unwrap();
            assert_eq!(stored.get_id(), Some(id));
            assert_eq!(stored.keys().next().map(|k| k.as_str()), Some(DOC_ID));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_keeps_supplied_id() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let id = DocId::from_hex("552bc0f7bbcdf26a32e99954")?;
            let returned = store.insert("items", doc! { "model": "iPhone 6", "_id": id })?;
            assert_eq!(returned, id);

            let mut cursor = store.find("items", by_id(id))?;
            assert_eq!(cursor.size(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_duplicate_id() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let id = store.insert("items", doc! { "model": "iPhone 6" })?;
            let result = store.insert("items", doc! { "_id": id, "model": "Xiaomi T11" });
            assert!(result.is_err());
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::DuplicateId);

            assert_eq!(store.count("items", all())?, 1);
            let stored = store.get_by_id("items", &id)?.unwrap();
            assert_eq!(stored.get("model"), Some(&Value::from("iPhone 6")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_many() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let result = store.insert_many("items", shop_items())?;
            assert_eq!(result.len(), 7);
            assert_eq!(store.count("items", all())?, 7);

            let ids: Vec<DocId> = result.into_iter().collect();
            let first = store.get_by_id("items", &ids[0])?.unwrap();
            assert_eq!(first.get("model"), Some(&Value::from("iPhone 6")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_many_is_atomic() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let existing = store.insert("items", doc! { "model": "iPhone 6" })?;

            let batch = vec![
                doc! { "model": "Samsung QLED" },
                doc! { "_id": existing, "model": "Apple Watch" },
            ];
            let err = store.insert_many("items", batch).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateId);
            assert_eq!(store.count("items", all())?, 1);

            let id = DocId::new();
            let batch = vec![doc! { "_id": id, "a": 1 }, doc! { "_id": id, "a": 2 }];
            let err = store.insert_many("items", batch).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateId);
            assert_eq!(store.count("items", all())?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_inserted_document_is_found_iff_filter_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let docs: Vec<Document> = vec![
                doc! { "category": "Phone", "price": 600 },
                doc! { "category": "Phone", "price": 400 },
                doc! { "category": "TV" },
                doc! { "category": "TV", "price": (()) },
            ];
            let filters = vec![
                field("category").eq("Phone"),
                field("price").gte(500),
                field("price").exists(true),
                field("price").exists(false),
                field("price").in_array(vec![400, 1200]),
            ];

            for document in docs {
                let id = store.insert("items", document)?;
                let stored = store.get_by_id("items", &id)?.unwrap();
                for filter in &filters {
                    let found = store
                        .find("items", filter.clone())?
                        .to_vec()?
                        .iter()
                        .any(|d| d.get_id() == Some(id));
                    assert_eq!(found, filter.apply(&stored)?, "filter {}", filter);
                }
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_without_auto_create() {
    let store = Store::builder()
        .auto_create_collections(false)
        .open()
        .unwrap();
    let err = store.insert("items", doc! { "a": 1 }).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);
    assert!(!store.has_collection("items"));

    store.create_collection("items", None).unwrap();
    store.insert("items", doc! { "a": 1 }).unwrap();
    assert_eq!(store.count("items", all()).unwrap(), 1);
}

#[test]
fn test_insert_through_collection_handle() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let items = store.collection("items")?;
            items.insert(doc! { "model": "iPhone 6" })?;
            assert_eq!(store.count("items", all())?, 1);
            assert_eq!(items.size()?, 1);
            assert_eq!(items.name(), "items");
            Ok(())
        },
        cleanup,
    )
}
