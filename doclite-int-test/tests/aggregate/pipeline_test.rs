use doclite::aggregate::Stage;
use doclite::collection::Projection;
use doclite::common::Value;
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{all, field};
use doclite::Store;
use doclite_int_test::test_util::{cleanup, create_shop_context, run_test};

#[test]
fn test_match_then_size() {
    run_test(
        create_shop_context,
        |ctx| {
            let result = ctx.store().aggregate(
                "orders",
                vec![
                    Stage::matching(field("order_number").eq(201513)),
                    Stage::size("items_id", "number_of_items"),
                ],
            )?;
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].get("number_of_items"), Some(&Value::from(2)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_size_then_project() {
    run_test(
        create_shop_context,
        |ctx| {
            let result = ctx.store().aggregate(
                "orders",
                vec![
                    Stage::size("items_id", "number_of_items"),
                    Stage::project(Projection::including(&["order_number", "number_of_items"]).without_id()),
                ],
            )?;
            assert_eq!(
                result,
                vec![
                    doc! { "order_number": 201513, "number_of_items": 2 },
                    doc! { "order_number": 201514, "number_of_items": 2 },
                ]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_pipeline_does_not_modify_source() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let before = store.find("orders", all())?.to_vec()?;
            store.aggregate(
                "orders",
                vec![
                    Stage::size("items_id", "number_of_items"),
                    Stage::project(Projection::excluding(&["customer"])),
                ],
            )?;
            assert_eq!(store.find("orders", all())?.to_vec()?, before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_pipeline() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store.aggregate("orders", vec![])?;
            assert_eq!(result, store.find("orders", all())?.to_vec()?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failing_stage_aborts_pipeline() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let err = store
                .aggregate("orders", vec![Stage::size("customer", "n")])
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::TypeMismatch);

            let err = store
                .aggregate(
                    "orders",
                    vec![Stage::project(Projection::new().include("customer").exclude("payment"))],
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidStage);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_source_collection() {
    let store = Store::new();
    let err = store
        .aggregate("orders", vec![Stage::matching(all())])
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);
}

#[test]
fn test_pipeline_stage_limit() {
    let store = Store::builder().max_pipeline_stages(2).open().unwrap();
    store.insert("orders", doc! { "order_number": 1 }).unwrap();

    let stages = vec![Stage::matching(all()); 3];
    let err = store.aggregate("orders", stages).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidStage);

    let stages = vec![Stage::matching(all()); 2];
    assert_eq!(store.aggregate("orders", stages).unwrap().len(), 1);
}
