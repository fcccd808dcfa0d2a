use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct DmarcRecordDto {
    pub raw: String,
    pub policy: Option<String>,
    pub subdomain_policy: Option<String>,
    pub pct: Option<u8>,
    pub rua: Vec<String>,
    pub ruf: Vec<String>,
    pub adkim: Option<String>,
    pub aspf: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct DkimSelectorDto {
    pub selector: String,
    pub record: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct DnsCheckDto {
    pub domain: String,
    pub dmarc: Option<DmarcRecordDto>,
    pub spf: Option<String>,
    pub dkim: Vec<DkimSelectorDto>,
    pub warnings: Vec<String>,
}
