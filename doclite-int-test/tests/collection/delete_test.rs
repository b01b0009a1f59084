use doclite::collection::max_count;
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{all, field};
use doclite_int_test::test_util::{cleanup, create_shop_context, create_test_context, run_test};

#[test]
fn test_delete_many() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store.delete_many("items", field("producer").eq("Apple"))?;
            assert_eq!(result.len(), 3);
            assert_eq!(store.count("items", all())?, 4);
            assert_eq!(store.count("items", field("producer").eq("Apple"))?, 0);

            for id in result.affected_ids() {
                assert!(store.get_by_id("items", id)?.is_none());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_nothing_matches() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store.delete_many("items", field("producer").eq("Nokia"))?;
            assert!(result.is_empty());
            assert_eq!(store.count("items", all())?, 7);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_keeps_order_of_survivors() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            for n in 1..=5 {
                store.insert("numbers", doc! { "n": n })?;
            }
            store.delete_many("numbers", field("n").in_array(vec![2, 4]))?;

            let remaining: Vec<i64> = store
                .find("numbers", all())?
                .to_vec()?
                .iter()
                .filter_map(|d| d.get("n").and_then(|v| v.as_i64()).copied())
                .collect();
            assert_eq!(remaining, vec![1, 3, 5]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_on_capped_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.create_collection("reviews", Some(max_count(5)))?;
            store.insert("reviews", doc! { "review": "Review 1" })?;

            let err = store.delete_many("reviews", all()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert_eq!(store.count("reviews", all())?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_collection() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let items = store.collection("items")?;
            assert!(store.drop_collection("items"));
            assert!(!store.has_collection("items"));
            assert_eq!(items.size().unwrap_err().kind(), &ErrorKind::NotFound);
            assert_eq!(
                store.count("items", all()).unwrap_err().kind(),
                &ErrorKind::NotFound
            );
            assert_eq!(store.list_collection_names(), vec!["orders"]);
            Ok(())
        },
        cleanup,
    )
}
