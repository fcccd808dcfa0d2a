use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::{
    model::organization::{Plan, SubscriptionStatus},
    server::{
        config::StripeConfig,
        data::organization::OrganizationRepository,
        error::AppError,
        model::organization::UpdateBillingParams,
        service::billing::BillingService,
    },
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook payload.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Deserialize)]
struct StripeEventData {
    object: Value,
}

impl<'a> BillingService<'a> {
    /// Verifies and applies a Stripe webhook event.
    ///
    /// Events other than completed checkouts and subscription updates or
    /// deletions are acknowledged without effect.
    ///
    /// # Arguments
    /// - `signature` - Value of the `Stripe-Signature` header
    /// - `payload` - Raw request body
    ///
    /// # Returns
    /// - `Ok(())` - Event verified and handled
    /// - `Err(AppError::BadRequest)` - Billing not configured, bad signature or body
    pub async fn handle_webhook(&self, signature: &str, payload: &[u8]) -> Result<(), AppError> {
        let config = self.config()?;

        verify_signature(config, signature, payload, Utc::now().timestamp())?;

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;
        let object = &event.data.object;

        match event.event_type.as_str() {
            "checkout.session.completed" => self.checkout_completed(object).await,
            "customer.subscription.updated" => {
                let status = object
                    .get("status")
                    .and_then(Value::as_str)
                    .map(subscription_status)
                    .unwrap_or(SubscriptionStatus::None);
                let plan = plan_of_subscription(config, object);
                self.update_by_customer(object, plan, status).await
            }
            "customer.subscription.deleted" => {
                self.update_by_customer(object, None, SubscriptionStatus::Canceled)
                    .await
            }
            other => {
                tracing::debug!("Ignoring Stripe event {}", other);
                Ok(())
            }
        }
    }

    async fn checkout_completed(&self, session: &Value) -> Result<(), AppError> {
        let Some(organization_id) = session
            .get("client_reference_id")
            .and_then(Value::as_str)
            .and_then(|id| id.parse::<i32>().ok())
        else {
            tracing::warn!("Checkout session without organization reference");
            return Ok(());
        };

        let repo = OrganizationRepository::new(self.db);
        if repo.find_by_id(organization_id).await?.is_none() {
            tracing::warn!(
                "Checkout completed for unknown organization {}",
                organization_id
            );
            return Ok(());
        }

        let plan = session
            .pointer("/metadata/plan")
            .and_then(Value::as_str)
            .and_then(|p| p.parse::<Plan>().ok());

        repo.update_billing(
            organization_id,
            UpdateBillingParams {
                plan,
                subscription_status: Some(SubscriptionStatus::Active),
                stripe_customer_id: string_field(session, "customer"),
                stripe_subscription_id: string_field(session, "subscription"),
            },
        )
        .await?;

        tracing::info!(
            "Organization {} subscribed to {}",
            organization_id,
            plan.map(|p| p.as_str()).unwrap_or("unknown plan")
        );

        Ok(())
    }

    async fn update_by_customer(
        &self,
        subscription: &Value,
        plan: Option<Plan>,
        status: SubscriptionStatus,
    ) -> Result<(), AppError> {
        let Some(customer) = string_field(subscription, "customer") else {
            return Ok(());
        };

        let repo = OrganizationRepository::new(self.db);
        let Some(organization) = repo.find_by_stripe_customer(&customer).await? else {
            tracing::warn!("Subscription event for unknown customer {}", customer);
            return Ok(());
        };

        repo.update_billing(
            organization.id,
            UpdateBillingParams {
                plan,
                subscription_status: Some(status),
                stripe_customer_id: None,
                stripe_subscription_id: string_field(subscription, "id"),
            },
        )
        .await?;

        tracing::info!(
            "Organization {} subscription is now {}",
            organization.id,
            status.as_str()
        );

        Ok(())
    }
}

/// Checks a `Stripe-Signature` header of the form `t=<unix>,v1=<hex>[,v1=<hex>]`.
///
/// The signed content is `<t>.<payload>`; any `v1` entry may match.
///
/// # Returns
/// - `Ok(())` - A signature matches and the timestamp is within tolerance
/// - `Err(AppError::BadRequest)` - Malformed header, stale timestamp or no match
pub fn verify_signature(
    config: &StripeConfig,
    header: &str,
    payload: &[u8],
    now: i64,
) -> Result<(), AppError> {
    let invalid = || AppError::BadRequest("Invalid Stripe signature".to_string());

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(invalid)?;
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(invalid());
    }

    let matches = signatures.iter().any(|signature| {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(config.webhook_secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    });

    if matches {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn subscription_status(status: &str) -> SubscriptionStatus {
    match status {
        "trialing" => SubscriptionStatus::Trialing,
        "active" => SubscriptionStatus::Active,
        "past_due" | "unpaid" => SubscriptionStatus::PastDue,
        "canceled" | "incomplete_expired" => SubscriptionStatus::Canceled,
        _ => SubscriptionStatus::None,
    }
}

/// Plan of a subscription from its metadata, falling back to the first price.
fn plan_of_subscription(config: &StripeConfig, subscription: &Value) -> Option<Plan> {
    if let Some(plan) = subscription
        .pointer("/metadata/plan")
        .and_then(Value::as_str)
        .and_then(|p| p.parse::<Plan>().ok())
    {
        return Some(plan);
    }

    let price = subscription
        .pointer("/items/data/0/price/id")
        .and_then(Value::as_str)?;
    if price == config.price_pro {
        Some(Plan::Pro)
    } else if price == config.price_business {
        Some(Plan::Business)
    } else {
        None
    }
}

fn string_field(object: &Value, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> StripeConfig {
        StripeConfig {
            secret_key: "sk_test".into(),
            webhook_secret: "whsec_test".into(),
            price_pro: "price_pro".into(),
            price_business: "price_business".into(),
        }
    }

    fn sign(timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(b"whsec_test").unwrap();
        mac.update(format!("{}.", timestamp).as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Expected: valid signature accepted, also among several v1 entries
    #[test]
    fn accepts_valid_signature() {
        let payload = br#"{"type":"ping"}"#;
        let header = format!("t=1700000000,v1=deadbeef,v1={}", sign(1_700_000_000, payload));

        assert!(verify_signature(&config(), &header, payload, 1_700_000_100).is_ok());
    }

    #[test]
    fn rejects_tampered_payload() {
        let header = format!("t=1700000000,v1={}", sign(1_700_000_000, b"original"));

        assert!(verify_signature(&config(), &header, b"tampered", 1_700_000_000).is_err());
    }

    /// Expected: signatures older than five minutes rejected
    #[test]
    fn rejects_stale_timestamp() {
        let payload = b"{}";
        let header = format!("t=1700000000,v1={}", sign(1_700_000_000, payload));

        assert!(verify_signature(&config(), &header, payload, 1_700_000_301).is_err());
        assert!(verify_signature(&config(), "v1=abc", payload, 1_700_000_000).is_err());
    }

    #[test]
    fn resolves_subscription_plan() {
        let by_metadata = json!({"metadata": {"plan": "business"}});
        let by_price = json!({"items": {"data": [{"price": {"id": "price_pro"}}]}});
        let unknown = json!({"items": {"data": [{"price": {"id": "price_other"}}]}});

        assert_eq!(plan_of_subscription(&config(), &by_metadata), Some(Plan::Business));
        assert_eq!(plan_of_subscription(&config(), &by_price), Some(Plan::Pro));
        assert_eq!(plan_of_subscription(&config(), &unknown), None);
    }

    #[test]
    fn maps_subscription_status() {
        assert_eq!(subscription_status("active"), SubscriptionStatus::Active);
        assert_eq!(subscription_status("unpaid"), SubscriptionStatus::PastDue);
        assert_eq!(subscription_status("canceled"), SubscriptionStatus::Canceled);
        assert_eq!(subscription_status("incomplete"), SubscriptionStatus::None);
    }
}
