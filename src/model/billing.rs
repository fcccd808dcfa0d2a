use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::organization::Plan;

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct CheckoutDto {
    pub plan: Plan,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct BillingUrlDto {
    pub url: String,
}
