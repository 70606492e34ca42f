//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the DDL in [`super::bootstrap`] exactly; the bootstrap
//! module is the source of truth for column types and defaults.

diesel::table! {
    /// Discovered sales leads.
    leads (id) {
        id -> Varchar,
        company_name -> Varchar,
        website -> Varchar,
        industry -> Varchar,
        contact_email -> Nullable<Varchar>,
        contact_name -> Nullable<Varchar>,
        estimated_size -> Varchar,
        source -> Varchar,
        status -> Varchar,
        metadata -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Paid orders; `payment_intent_id` is the unique natural key.
    orders (id) {
        id -> Varchar,
        customer_email -> Varchar,
        package_id -> Varchar,
        amount -> Int8,
        status -> Varchar,
        payment_intent_id -> Varchar,
        metadata -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Generated ads; immutable after insert.
    ads (id) {
        id -> Varchar,
        payment_intent_id -> Nullable<Varchar>,
        html -> Text,
        css -> Text,
        javascript -> Text,
        preview -> Text,
        metadata -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only interaction log.
    analytics_events (id) {
        id -> Varchar,
        ad_id -> Varchar,
        event_type -> Varchar,
        timestamp -> Timestamptz,
        url -> Varchar,
        referrer -> Nullable<Varchar>,
        user_agent -> Nullable<Text>,
        ip_address -> Nullable<Varchar>,
        metadata -> Jsonb,
    }
}

diesel::table! {
    /// Append-only payment failure log.
    payment_failures (id) {
        id -> Int4,
        payment_intent_id -> Varchar,
        amount -> Int8,
        currency -> Varchar,
        failure_reason -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Processed provider webhook event ids (replay dedup).
    webhook_events (id) {
        id -> Varchar,
        event_type -> Varchar,
        received_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(orders, ads);
