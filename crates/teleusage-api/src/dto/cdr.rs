//! CDR report DTOs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for a CDR report
///
/// Every field is optional on the wire so that missing values surface as
/// domain validation errors rather than JSON parse failures.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Subscriber number
    #[serde(default)]
    pub msisdn: Option<String>,

    /// Range start, ISO local date-time (`2024-03-01T00:00:00`)
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,

    /// Range end, ISO local date-time
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
}

/// Response to an accepted report request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Id embedded in the report file name
    pub request_id: Uuid,
}

impl From<Uuid> for ReportResponse {
    fn from(request_id: Uuid) -> Self {
        Self { request_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_request_deserialization() {
        let request: ReportRequest = serde_json::from_str(
            r#"{"msisdn":"79001112233","startDate":"2024-03-01T00:00:00","endDate":"2024-03-31T23:59:59"}"#,
        )
        .unwrap();

        assert_eq!(request.msisdn.as_deref(), Some("79001112233"));
        assert_eq!(
            request.start_date.unwrap().to_string(),
            "2024-03-01 00:00:00"
        );
        assert!(request.end_date.is_some());
    }

    #[test]
    fn test_report_request_missing_fields() {
        let request: ReportRequest = serde_json::from_str("{}").unwrap();
        assert!(request.msisdn.is_none());
        assert!(request.start_date.is_none());
    }

    #[test]
    fn test_report_response_wire_name() {
        let json = serde_json::to_value(ReportResponse::from(Uuid::nil())).unwrap();
        assert_eq!(json["requestId"], "00000000-0000-0000-0000-000000000000");
    }
}
