//! Repository layer: one module per derived entity family, following a
//! one-repo-per-table split, each using plain `sqlx::query` against a
//! shared `Transaction`/`PgPool`.

pub mod check_info;
pub mod claimed;
pub mod class_info;
pub mod define;
pub mod hold;
pub mod invalid_data;
pub mod issuer_info;
pub mod register;
pub mod script;
pub mod withdraw;
