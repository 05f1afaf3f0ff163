//! Usage (UDR) DTOs

use serde::{Deserialize, Serialize};
use teleusage_core::models::UsageSummary;

/// Optional month filter for a single subscriber's usage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageQuery {
    pub month: Option<u32>,
}

/// Total talk time in one direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    /// `HH:MM:SS`
    pub total_time: String,
}

/// Usage summary as exposed over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UdrResponse {
    pub msisdn: String,
    pub incoming_call: CallStats,
    #[serde(rename = "outcomingCall")]
    pub outgoing_call: CallStats,
}

impl From<UsageSummary> for UdrResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            incoming_call: CallStats {
                total_time: summary.incoming_total_time(),
            },
            outgoing_call: CallStats {
                total_time: summary.outgoing_total_time(),
            },
            msisdn: summary.msisdn.into(),
        }
    }
}
