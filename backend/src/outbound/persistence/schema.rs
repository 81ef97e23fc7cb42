//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// User accounts.
    ///
    /// `email` carries the unique index `users_email_key`; `role` stores the
    /// hierarchy ordinal (0 = admin, 1 = manager, 2 = user).
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login email, unique and case-sensitive.
        email -> Varchar,
        /// Argon2id hash in PHC string format.
        password_hash -> Text,
        /// Role ordinal.
        role -> SmallInt,
        /// Given name.
        first_name -> Varchar,
        /// Family name.
        last_name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Records owned by users.
    records (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Day the record refers to.
        recorded_on -> Date,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(records -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(records, users);
