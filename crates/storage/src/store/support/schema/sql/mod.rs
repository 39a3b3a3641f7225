#![forbid(unsafe_code)]

mod contents;
mod core;
mod indexes;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(core::SQL);
    sql.push_str(contents::SQL);
    sql.push_str(indexes::SQL);
    sql
}
