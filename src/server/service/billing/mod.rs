//! Stripe subscription billing
//!
//! Checkout and customer portal sessions are created through Stripe's form
//! encoded REST API; subscription changes arrive through the signed webhook
//! handled in [`webhook`].

use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::{
    model::organization::Plan,
    server::{config::StripeConfig, error::AppError, model::organization::Organization},
};

pub mod webhook;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

#[derive(Deserialize)]
struct StripeSession {
    url: String,
}

pub struct BillingService<'a> {
    pub db: &'a DatabaseConnection,
    pub http_client: &'a reqwest::Client,
    pub stripe: Option<&'a StripeConfig>,
    pub app_url: &'a str,
}

impl<'a> BillingService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        http_client: &'a reqwest::Client,
        stripe: Option<&'a StripeConfig>,
        app_url: &'a str,
    ) -> Self {
        Self {
            db,
            http_client,
            stripe,
            app_url,
        }
    }

    fn config(&self) -> Result<&'a StripeConfig, AppError> {
        self.stripe
            .ok_or_else(|| AppError::BadRequest("Billing is not configured".to_string()))
    }

    /// Creates a Stripe Checkout session subscribing the organization to `plan`.
    ///
    /// # Returns
    /// - `Ok(url)` - Checkout page to redirect the user to
    /// - `Err(AppError::BadRequest)` - Billing not configured or free plan requested
    /// - `Err(AppError::ExternalService)` - Stripe rejected the request
    pub async fn checkout(&self, organization: &Organization, plan: Plan) -> Result<String, AppError> {
        let config = self.config()?;
        let price = match plan {
            Plan::Free => {
                return Err(AppError::BadRequest(
                    "The free plan does not require checkout".to_string(),
                ))
            }
            Plan::Pro => config.price_pro.as_str(),
            Plan::Business => config.price_business.as_str(),
        };

        let organization_id = organization.id.to_string();
        let success_url = format!(
            "{}/organizations/{}/billing?checkout=success",
            self.app_url, organization.id
        );
        let cancel_url = format!(
            "{}/organizations/{}/billing?checkout=canceled",
            self.app_url, organization.id
        );

        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "subscription"),
            ("line_items[0][price]", price),
            ("line_items[0][quantity]", "1"),
            ("client_reference_id", organization_id.as_str()),
            ("metadata[plan]", plan.as_str()),
            ("subscription_data[metadata][plan]", plan.as_str()),
            ("success_url", success_url.as_str()),
            ("cancel_url", cancel_url.as_str()),
        ];
        if let Some(customer) = &organization.stripe_customer_id {
            form.push(("customer", customer.as_str()));
        }

        let session = self.post_form(config, "checkout/sessions", &form).await?;

        tracing::info!(
            "Created {} checkout session for organization {}",
            plan.as_str(),
            organization.id
        );

        Ok(session.url)
    }

    /// Creates a customer portal session for managing the subscription.
    ///
    /// # Returns
    /// - `Ok(url)` - Portal page to redirect the user to
    /// - `Err(AppError::BadRequest)` - Billing not configured or no Stripe customer yet
    pub async fn portal(&self, organization: &Organization) -> Result<String, AppError> {
        let config = self.config()?;
        let customer = organization.stripe_customer_id.as_deref().ok_or_else(|| {
            AppError::BadRequest("Organization has no billing account yet".to_string())
        })?;

        let return_url = format!("{}/organizations/{}/billing", self.app_url, organization.id);
        let session = self
            .post_form(
                config,
                "billing_portal/sessions",
                &[("customer", customer), ("return_url", return_url.as_str())],
            )
            .await?;

        Ok(session.url)
    }

    async fn post_form(
        &self,
        config: &StripeConfig,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<StripeSession, AppError> {
        let response = self
            .http_client
            .post(format!("{}/{}", STRIPE_API_URL, path))
            .bearer_auth(&config.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Stripe request to {} failed: {}", path, e);
                AppError::ExternalService("Payment provider request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Stripe returned {} for {}: {}", status, path, detail);
            return Err(AppError::ExternalService(format!(
                "Payment provider returned {}",
                status
            )));
        }

        response.json::<StripeSession>().await.map_err(|e| {
            tracing::warn!("Unexpected Stripe response for {}: {}", path, e);
            AppError::ExternalService("Unexpected payment provider response".to_string())
        })
    }
}
