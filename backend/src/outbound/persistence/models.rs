//! Row structs mapping Diesel tables to domain aggregates.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{ads, analytics_events, leads, orders, payment_failures, webhook_events};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LeadRow {
    pub id: String,
    pub company_name: String,
    pub website: String,
    pub industry: String,
    pub contact_email: Option<String>,
    pub contact_name: Option<String>,
    pub estimated_size: String,
    pub source: String,
    pub status: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = leads)]
pub struct NewLeadRow<'a> {
    pub id: &'a str,
    pub company_name: &'a str,
    pub website: &'a str,
    pub industry: &'a str,
    pub contact_email: Option<&'a str>,
    pub contact_name: Option<&'a str>,
    pub estimated_size: &'a str,
    pub source: &'a str,
    pub status: &'a str,
    pub metadata: &'a Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: String,
    pub customer_email: String,
    pub package_id: String,
    pub amount: i64,
    pub status: String,
    pub payment_intent_id: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: &'a str,
    pub customer_email: &'a str,
    pub package_id: &'a str,
    pub amount: i64,
    pub status: &'a str,
    pub payment_intent_id: &'a str,
    pub metadata: &'a Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = ads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AdRow {
    pub id: String,
    pub payment_intent_id: Option<String>,
    pub html: String,
    pub css: String,
    pub javascript: String,
    pub preview: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ads)]
pub struct NewAdRow<'a> {
    pub id: &'a str,
    pub payment_intent_id: Option<&'a str>,
    pub html: &'a str,
    pub css: &'a str,
    pub javascript: &'a str,
    pub preview: &'a str,
    pub metadata: &'a Value,
    pub created_at: DateTime<Utc>,
}

/// Listing projection: everything but the blobs.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = ads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AdSummaryRow {
    pub id: String,
    pub payment_intent_id: Option<String>,
    pub preview: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = analytics_events)]
pub struct NewEventRow<'a> {
    pub id: &'a str,
    pub ad_id: &'a str,
    pub event_type: &'a str,
    pub timestamp: DateTime<Utc>,
    pub url: &'a str,
    pub referrer: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub ip_address: Option<&'a str>,
    pub metadata: &'a Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = payment_failures)]
pub struct NewPaymentFailureRow<'a> {
    pub payment_intent_id: &'a str,
    pub amount: i64,
    pub currency: &'a str,
    pub failure_reason: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = webhook_events)]
pub struct NewWebhookEventRow<'a> {
    pub id: &'a str,
    pub event_type: &'a str,
    pub received_at: DateTime<Utc>,
}
