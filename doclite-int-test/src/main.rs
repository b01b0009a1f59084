use doclite::aggregate::{Lookup, Stage};
use doclite::collection::{max_count, DocumentCursor, Projection};
use doclite::errors::DocliteResult;
use doclite::filter::{all, and, field, or};
use doclite::update::UpdateSpec;
use doclite::Store;
use doclite_int_test::test_util::{
    date, item_id, reviews, seed_items, seed_orders, ITEM_2, ITEM_4,
};

fn main() -> DocliteResult<()> {
    colog::init();
    let store = Store::new();

    // items
    seed_items(&store)?;

    println!("all items are:");
    print_cursor(store.find("items", all())?)?;

    let phone_count = store.count("items", field("category").eq("Phone"))?;
    println!("a number of items in Phone category: {}", phone_count);

    let categories = store.distinct("items", "category")?;
    println!("a number of all categories: {}", categories.len());

    let producers = store.distinct("items", "producer")?;
    println!("a list of all producers: {:?}", producers);

    println!("items of category Phone with price in between 500 and 700:");
    print_cursor(store.find(
        "items",
        and(vec![field("category").eq("Phone"), field("price").between(500, 700)]),
    )?)?;

    println!("items of models iPhone 6 or Samsung QLED:");
    print_cursor(store.find(
        "items",
        or(vec![field("model").eq("iPhone 6"), field("model").eq("Samsung QLED")]),
    )?)?;

    println!("items of producers Apple or Samsung:");
    print_cursor(store.find("items", field("producer").in_array(vec!["Apple", "Samsung"]))?)?;

    store.update_many(
        "items",
        field("category").eq("Phone"),
        UpdateSpec::new().set("warranty", "2 years").inc("price", 50),
    )?;

    println!("items that have warranty:");
    print_cursor(store.find("items", field("warranty").exists(true))?)?;

    store.update_many(
        "items",
        field("warranty").exists(true),
        UpdateSpec::new().inc("price", 20),
    )?;

    // orders
    seed_orders(&store)?;

    println!("all orders:");
    print_cursor(store.find("orders", all())?)?;

    println!("orders with total of more than 500:");
    print_cursor(store.find("orders", field("total_sum").gt(500))?)?;

    println!("orders made by Andrii Rodinov:");
    print_cursor(store.find(
        "orders",
        and(vec![
            field("customer.name").eq("Andrii"),
            field("customer.surname").eq("Rodinov"),
        ]),
    )?)?;

    println!("Orders with item (ID {}):", ITEM_2);
    print_cursor(store.find("orders", field("items_id").eq(item_id(ITEM_2)?))?)?;

    store.update_many(
        "orders",
        field("items_id").eq(item_id(ITEM_2)?),
        UpdateSpec::new()
            .push("items_id", item_id(ITEM_4)?)
            .inc("total_sum", 100),
    )?;

    println!("a number of items in order 201513:");
    let counts = store.aggregate(
        "orders",
        vec![
            Stage::matching(field("order_number").eq(201513)),
            Stage::size("items_id", "number_of_items"),
            Stage::project(Projection::including(&["number_of_items"])),
        ],
    )?;
    for count in counts {
        println!("{}", count);
    }

    println!("customers and card numbers for orders with total of more than 500:");
    print_cursor(store.find_with_projection(
        "orders",
        field("total_sum").gt(500),
        Projection::including(&["customer", "payment.cardId"]).without_id(),
    )?)?;

    store.update_many(
        "orders",
        field("date").between(date(2023, 1, 1)?, date(2023, 1, 31)?),
        UpdateSpec::new().pull("items_id", item_id(ITEM_2)?),
    )?;

    store.update_many(
        "orders",
        field("customer.surname").eq("Rodinov"),
        UpdateSpec::new().set("customer.surname", "Rodionov"),
    )?;

    println!("Customer information and items for orders of Andrii Rodionov:");
    let orders = store.aggregate(
        "orders",
        vec![
            Stage::matching(and(vec![
                field("customer.name").eq("Andrii"),
                field("customer.surname").eq("Rodionov"),
            ])),
            Stage::lookup(Lookup::new("items", "items_id", "items")),
            Stage::project(
                Projection::including(&["customer", "items.model", "items.price"]).without_id(),
            ),
        ],
    )?;
    for order in orders {
        println!("{}", order);
    }

    // reviews
    if store.has_collection("reviews") {
        store.drop_collection("reviews");
    }
    store.create_collection("reviews", Some(max_count(5).max_bytes(5000)))?;
    store.insert_many("reviews", reviews())?;

    println!("reviews:");
    print_cursor(store.find("reviews", all())?)?;

    Ok(())
}

fn print_cursor(cursor: DocumentCursor) -> DocliteResult<()> {
    for document in cursor {
        println!("{}", document?);
    }
    Ok(())
}
