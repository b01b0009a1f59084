mod delete_test;
mod find_test;
mod insert_test;
mod update_test;
mod upsert_test;
