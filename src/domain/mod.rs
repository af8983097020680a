//! Domain layer: message envelopes and validated values (no I/O).

mod charset;
mod request;
mod response;
mod validation;
mod value;

pub use charset::Charset;
pub use request::{DEFAULT_MAX_LENGTH_OF_ONE_SMS, MessageDefaults, ResolvedMessage, SendRequest};
pub use response::{Extension, GoyyaResponse, ParseFailure, SUCCESS_PREFIX, SendResult};
pub use validation::ValidationError;
pub use value::{MessageType, Password, RequestId, SendTimePattern, Username};

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;

    fn sample_request() -> SendRequest {
        SendRequest::new()
            .with_sender("bremersee")
            .with_receiver("0123456789")
            .with_message("Hello")
            .with_send_time(Utc::now() + TimeDelta::seconds(30))
    }

    #[test]
    fn send_request_json_round_trip() {
        let request = sample_request();
        let json = serde_json::to_string_pretty(&request).unwrap();
        assert!(json.contains("\"requestId\""));
        assert!(json.contains("\"sendTime\""));

        let read: SendRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(read, request);
    }

    #[test]
    fn send_request_with_extension_json_round_trip() {
        let extension = Extension::GoyyaResponse(GoyyaResponse {
            response: "OK(12345, 1 message queued)".to_owned(),
            id: Some("12345".to_owned()),
            count: Some(1),
            parse_error: None,
        });
        let request = sample_request().with_extension(extension.clone());

        let json = serde_json::to_string(&request).unwrap();
        let read: SendRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(read, request);
        assert_eq!(read.extension(), Some(&extension));
    }

    #[test]
    fn send_result_json_round_trip_resolves_goyya_extension() {
        let response = GoyyaResponse {
            response: "OK".to_owned(),
            ..Default::default()
        };
        let result = SendResult::from_goyya(sample_request(), response);

        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("\"successfullySent\": true"));
        assert!(json.contains("\"goyyaResponse\""));
        assert!(json.contains("\"ID\": null"));

        let read: SendResult = serde_json::from_str(&json).unwrap();
        assert_eq!(read, result);
        assert_eq!(read.goyya_response().map(|it| it.response.as_str()), Some("OK"));
    }

    #[test]
    fn send_result_mirrors_gateway_success() {
        let failed = SendResult::from_goyya(
            SendRequest::new(),
            GoyyaResponse {
                response: "ERROR 0010".to_owned(),
                ..Default::default()
            },
        );
        assert!(!failed.successfully_sent);

        let accepted = SendResult::accepted(SendRequest::new());
        assert!(accepted.successfully_sent);
        assert!(accepted.goyya_response().is_none());
    }

    #[test]
    fn parse_failure_json_uses_stack_trace_key() {
        let failure = ParseFailure {
            message: "invalid digit found in string".to_owned(),
            trace: "ParseIntError { kind: InvalidDigit }".to_owned(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["message"], "invalid digit found in string");
        assert_eq!(json["stackTrace"], "ParseIntError { kind: InvalidDigit }");
    }

    #[test]
    fn send_request_decodes_with_missing_optional_fields() {
        let read: SendRequest = serde_json::from_str(r#"{ "requestId": "r-1" }"#).unwrap();
        assert_eq!(read.request_id().as_str(), "r-1");
        assert_eq!(read.sender(), None);
        assert_eq!(read.send_time(), None);
    }

    #[test]
    fn fixed_send_time_serializes_as_rfc3339() {
        let time = Utc.with_ymd_and_hms(2026, 7, 1, 10, 30, 0).unwrap();
        let request = SendRequest::new()
            .with_request_id(RequestId::new("r-1").unwrap())
            .with_send_time(time);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sendTime"], "2026-07-01T10:30:00Z");
        assert_eq!(json["requestId"], "r-1");
    }
}
