use doclite::common::Value;
use doclite::doc;
use doclite::errors::ErrorKind;
use doclite::filter::{all, field};
use doclite::update::UpdateSpec;
use doclite_int_test::test_util::{
    cleanup, create_shop_context, create_test_context, date, item_id, run_test, ITEM_1, ITEM_2,
    ITEM_3, ITEM_4,
};

fn prices(ctx: &doclite_int_test::test_util::TestContext) -> doclite::errors::DocliteResult<Vec<Value>> {
    let mut prices = Vec::new();
    for item in ctx.store().find("items", all())? {
        prices.push(item?.get("price").cloned().unwrap_or(Value::Null));
    }
    Ok(prices)
}

#[test]
fn test_inc_matched_documents_only() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let before = prices(&ctx)?;

            let result = store.update_many(
                "items",
                field("category").eq("Phone"),
                UpdateSpec::new().inc("price", 50),
            )?;
            assert_eq!(result.len(), 2);

            let after = prices(&ctx)?;
            let expected: Vec<Value> = vec![650, 1200, 400, 450, 1000, 250, 70]
                .into_iter()
                .map(Value::from)
                .collect();
            assert_eq!(after, expected);
            assert_ne!(before, after);

            // inc is applied again on every call
            store.update_many(
                "items",
                field("category").eq("Phone"),
                UpdateSpec::new().inc("price", 50),
            )?;
            let phones = store.find("items", field("category").eq("Phone"))?.to_vec()?;
            assert_eq!(phones[0].get("price"), Some(&Value::from(700)));
            assert_eq!(phones[1].get("price"), Some(&Value::from(500)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_and_inc_together() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            store.update_many(
                "items",
                field("category").eq("Phone"),
                UpdateSpec::new().set("warranty", "2 years").inc("price", 50),
            )?;
            assert_eq!(store.count("items", field("warranty").exists(true))?, 2);

            store.update_many(
                "items",
                field("warranty").exists(true),
                UpdateSpec::new().inc("price", 20),
            )?;
            let phones = store.find("items", field("warranty").eq("2 years"))?.to_vec()?;
            assert_eq!(phones[0].get("price"), Some(&Value::from(670)));
            assert_eq!(phones[1].get("price"), Some(&Value::from(470)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_inc_with_float_delta() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            let id = store.insert("items", doc! { "price": 600 })?;
            store.update_many("items", all(), UpdateSpec::new().inc("price", 0.5))?;
            let item = store.get_by_id("items", &id)?.unwrap();
            assert_eq!(item.get("price"), Some(&Value::F64(600.5)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_push_and_pull() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store.update_many(
                "orders",
                field("items_id").eq(item_id(ITEM_2)?),
                UpdateSpec::new()
                    .push("items_id", item_id(ITEM_4)?)
                    .inc("total_sum", 100),
            )?;
            assert_eq!(result.len(), 2);
            assert_eq!(store.count("orders", field("items_id").eq(item_id(ITEM_4)?))?, 2);
            assert_eq!(store.count("orders", field("total_sum").eq(1300))?, 1);
            assert_eq!(store.count("orders", field("total_sum").eq(500))?, 1);

            let result = store.update_many(
                "orders",
                field("date").between(date(2023, 1, 1)?, date(2023, 1, 31)?),
                UpdateSpec::new().pull("items_id", item_id(ITEM_2)?),
            )?;
            assert_eq!(result.len(), 2);

            let orders = store.find("orders", all())?.to_vec()?;
            assert_eq!(
                orders[0].get("items_id"),
                Some(&Value::Array(vec![
                    Value::from(item_id(ITEM_1)?),
                    Value::from(item_id(ITEM_4)?),
                ]))
            );
            assert_eq!(
                orders[1].get("items_id"),
                Some(&Value::Array(vec![
                    Value::from(item_id(ITEM_3)?),
                    Value::from(item_id(ITEM_4)?),
                ]))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_pull_absent_value_is_noop() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let before = store.find("orders", all())?.to_vec()?;
            let result = store.update_many(
                "orders",
                all(),
                UpdateSpec::new().pull("items_id", item_id(ITEM_4)?),
            )?;
            assert!(result.is_empty());
            assert_eq!(store.find("orders", all())?.to_vec()?, before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_nested_field() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store.update_many(
                "orders",
                field("customer.surname").eq("Rodinov"),
                UpdateSpec::new().set("customer.surname", "Rodionov"),
            )?;
            assert_eq!(result.len(), 1);
            assert_eq!(store.count("orders", field("customer.surname").eq("Rodinov"))?, 0);

            let order = store
                .find("orders", field("customer.surname").eq("Rodionov"))?
                .first()
                .unwrap()?;
            assert_eq!(order.get("customer.name"), Some(&Value::from("Andrii")));
            assert_eq!(order.get("customer.phones").and_then(|v| v.as_array()).map(|a| a.len()), Some(2));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_batch_rolls_back_on_type_mismatch() {
    run_test(
        create_test_context,
        |ctx| {
            let store = ctx.store();
            store.insert("items", doc! { "model": "iPhone 6", "price": 600 })?;
            store.insert("items", doc! { "model": "Samsung QLED", "price": "1200" })?;
            store.insert("items", doc! { "model": "Apple Watch", "price": 400 })?;
            let before = store.find("items", all())?.to_vec()?;

            let err = store
                .update_many("items", all(), UpdateSpec::new().inc("price", 50))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::TypeMismatch);
            assert_eq!(store.find("items", all())?.to_vec()?, before);

            let err = store
                .update_many("items", all(), UpdateSpec::new().push("model", "x"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::TypeMismatch);
            assert_eq!(store.find("items", all())?.to_vec()?, before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unchanged_documents_are_not_reported() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let result = store.update_many(
                "items",
                field("category").eq("Phone"),
                UpdateSpec::new().set("price", 600),
            )?;
            assert_eq!(result.len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_update_specs() {
    run_test(
        create_shop_context,
        |ctx| {
            let store = ctx.store();
            let err = store.update_many("items", all(), UpdateSpec::new()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let err = store
                .update_many("items", all(), UpdateSpec::new().set("_id", 1))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let err = store
                .update_many("items", all(), UpdateSpec::new().inc("price", "ten"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        cleanup,
    )
}
