//! Diesel table definitions for the PostgreSQL schema.
//!
//! Kept in step with `backend/migrations` by hand; `diesel print-schema`
//! against a migrated database regenerates it.

diesel::table! {
    /// Published snippets. Rows are never deleted; reads filter on `expires`.
    snippets (id) {
        /// Primary key, assigned by the `BIGSERIAL` sequence.
        id -> Int8,
        /// Title, at most 100 characters.
        title -> Varchar,
        content -> Text,
        created -> Timestamptz,
        /// Instant after which the snippet is no longer served.
        expires -> Timestamptz,
    }
}

diesel::table! {
    /// Registered accounts. `email` carries the `users_uc_email` constraint.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        /// Argon2id PHC string.
        hashed_password -> Varchar,
        created -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(snippets, users);
