use std::fmt::Write as _;
use std::num::ParseIntError;

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Europe::Berlin;
use url::form_urlencoded;

use crate::domain::{
    Charset, GoyyaResponse, MessageDefaults, MessageType, ParseFailure, ResolvedMessage,
    SendTimePattern, ValidationError,
};

/// Requested send times less than this far ahead are sent immediately.
pub const SEND_NOW_THRESHOLD_SECS: i64 = 60;

// The gateway reads query keys case-insensitively; `getId` and `getID` are the same flag.
const FLAGS: [(&str, &str); 4] = [
    ("getId", "1"),
    ("countMsg", "1"),
    ("getLimit", "1"),
    ("getStatus", "1"),
];

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid message count {input:?}: {source}")]
    InvalidCount {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

pub fn encode_send_sms_params(
    message: &ResolvedMessage<'_>,
    message_type: MessageType,
    time: Option<String>,
) -> Vec<(String, String)> {
    let mut params = vec![
        (
            MessageDefaults::SENDER_FIELD.to_owned(),
            message.sender.to_owned(),
        ),
        (
            MessageDefaults::RECEIVER_FIELD.to_owned(),
            message.receiver.to_owned(),
        ),
        (
            MessageDefaults::MESSAGE_FIELD.to_owned(),
            message.message.to_owned(),
        ),
        (
            MessageType::FIELD.to_owned(),
            message_type.code().to_owned(),
        ),
    ];
    if let Some(time) = time {
        params.push((SendTimePattern::FIELD.to_owned(), time));
    }
    params.extend(
        FLAGS
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned())),
    );
    params
}

/// Render `send_time` for the `time` parameter, in gateway local time.
///
/// Returns `None` (send now) when no time is given or when it is less than
/// [`SEND_NOW_THRESHOLD_SECS`] after `now`.
pub fn encode_send_time(
    send_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    pattern: &SendTimePattern,
) -> Result<Option<String>, ValidationError> {
    let Some(send_time) = send_time else {
        return Ok(None);
    };
    if send_time < now + TimeDelta::seconds(SEND_NOW_THRESHOLD_SECS) {
        return Ok(None);
    }

    let mut rendered = String::new();
    write!(
        rendered,
        "{}",
        send_time.with_timezone(&Berlin).format(pattern.as_str())
    )
    .map_err(|_| ValidationError::InvalidSendTimePattern {
        pattern: pattern.as_str().to_owned(),
    })?;
    Ok(Some(rendered))
}

/// Append `params` to `endpoint`, percent-encoding each value in `charset`.
pub fn encode_query_url(endpoint: &str, params: &[(String, String)], charset: Charset) -> String {
    let mut url = String::from(endpoint);
    let mut separator = if endpoint.contains('?') { '&' } else { '?' };
    for (key, value) in params {
        url.push(separator);
        url.extend(form_urlencoded::byte_serialize(key.as_bytes()));
        url.push('=');
        url.extend(form_urlencoded::byte_serialize(&charset.encode(value)));
        separator = '&';
    }
    url
}

pub fn decode_send_sms_response(body: &str) -> GoyyaResponse {
    let mut response = GoyyaResponse {
        response: body.to_owned(),
        ..Default::default()
    };
    if !response.is_ok() {
        return response;
    }
    let Some(payload) = payload(body) else {
        return response;
    };

    let mut fields = payload.split(',');
    response.id = fields
        .next()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);

    if let Some(count) = fields.next().map(str::trim).filter(|it| !it.is_empty()) {
        match parse_count(count) {
            Ok(count) => response.count = Some(count),
            Err(err) => response.parse_error = Some(ParseFailure::new(&err)),
        }
    }

    response
}

// `OK(<id>, <count> <text>)`; anything without a closing paren after the opening one has no payload.
fn payload(body: &str) -> Option<&str> {
    let open = body.find('(')?;
    let close = body.find(')')?;
    (0 < open && open < close).then(|| &body[open + 1..close])
}

// A count with no trailing text (`OK(987,3)`) is read from the whole field instead of being
// dropped.
fn parse_count(field: &str) -> Result<i32, TransportError> {
    let digits = field.split(' ').next().unwrap_or(field).trim();
    digits
        .parse::<i32>()
        .map_err(|source| TransportError::InvalidCount {
            input: digits.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn resolved<'a>(message: &'a str) -> ResolvedMessage<'a> {
        ResolvedMessage {
            sender: "bremersee",
            receiver: "0123456789",
            message,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn encode_params_in_gateway_order() {
        let params = encode_send_sms_params(
            &resolved("Hello"),
            MessageType::Text,
            Some("120501072026".to_owned()),
        );

        assert_eq!(
            params,
            vec![
                ("sender".to_owned(), "bremersee".to_owned()),
                ("receiver".to_owned(), "0123456789".to_owned()),
                ("msg".to_owned(), "Hello".to_owned()),
                ("msgtype".to_owned(), "t".to_owned()),
                ("time".to_owned(), "120501072026".to_owned()),
                ("getId".to_owned(), "1".to_owned()),
                ("countMsg".to_owned(), "1".to_owned()),
                ("getLimit".to_owned(), "1".to_owned()),
                ("getStatus".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn encode_params_omits_time_for_immediate_send() {
        let params = encode_send_sms_params(&resolved("Hello"), MessageType::Flash, None);
        assert!(!params.iter().any(|(k, _)| k == "time"));
        assert!(params.iter().any(|(k, v)| k == "msgtype" && v == "f"));
    }

    #[test]
    fn send_time_within_threshold_means_send_now() {
        let pattern = SendTimePattern::default();
        assert_eq!(encode_send_time(None, now(), &pattern).unwrap(), None);

        let soon = now() + TimeDelta::seconds(30);
        assert_eq!(encode_send_time(Some(soon), now(), &pattern).unwrap(), None);

        let just_short = now() + TimeDelta::seconds(59);
        assert_eq!(encode_send_time(Some(just_short), now(), &pattern).unwrap(), None);

        let past = now() - TimeDelta::hours(1);
        assert_eq!(encode_send_time(Some(past), now(), &pattern).unwrap(), None);
    }

    #[test]
    fn send_time_exactly_at_threshold_is_scheduled() {
        let boundary = now() + TimeDelta::seconds(SEND_NOW_THRESHOLD_SECS);
        assert_eq!(
            encode_send_time(Some(boundary), now(), &SendTimePattern::default()).unwrap(),
            Some("120101072026".to_owned())
        );
    }

    #[test]
    fn send_time_is_rendered_in_berlin_time() {
        let pattern = SendTimePattern::default();

        let summer = now() + TimeDelta::minutes(5);
        assert_eq!(
            encode_send_time(Some(summer), now(), &pattern).unwrap(),
            Some("120501072026".to_owned())
        );

        let winter_now = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        let winter = winter_now + TimeDelta::minutes(5);
        assert_eq!(
            encode_send_time(Some(winter), winter_now, &pattern).unwrap(),
            Some("090515012026".to_owned())
        );
    }

    #[test]
    fn send_time_uses_custom_pattern() {
        let pattern = SendTimePattern::new("%d.%m.%Y %H:%M").unwrap();
        let later = now() + TimeDelta::hours(2);
        assert_eq!(
            encode_send_time(Some(later), now(), &pattern).unwrap(),
            Some("01.07.2026 14:00".to_owned())
        );
    }

    #[test]
    fn query_url_encodes_latin1_values() {
        let params = vec![
            ("msg".to_owned(), "Grüße aus Berlin".to_owned()),
            ("sender".to_owned(), "5 €".to_owned()),
        ];
        let url = encode_query_url("https://example.invalid/sms", &params, Charset::Iso8859_1);
        assert_eq!(
            url,
            "https://example.invalid/sms?msg=Gr%FC%DFe+aus+Berlin&sender=5+%3F"
        );
    }

    #[test]
    fn query_url_encodes_utf8_values() {
        let params = vec![("msg".to_owned(), "Grüße".to_owned())];
        let url = encode_query_url("https://example.invalid/sms", &params, Charset::Utf8);
        assert_eq!(url, "https://example.invalid/sms?msg=Gr%C3%BC%C3%9Fe");
    }

    #[test]
    fn query_url_extends_existing_query() {
        let params = vec![("getId".to_owned(), "1".to_owned())];
        let url = encode_query_url(
            "https://example.invalid/sms?lang=de",
            &params,
            Charset::Iso8859_1,
        );
        assert_eq!(url, "https://example.invalid/sms?lang=de&getId=1");
    }

    #[test]
    fn decode_reads_id_and_count() {
        let response = decode_send_sms_response("OK(12345, 1 message queued)");
        assert!(response.is_ok());
        assert_eq!(response.id.as_deref(), Some("12345"));
        assert_eq!(response.count, Some(1));
        assert_eq!(response.parse_error, None);
    }

    #[test]
    fn decode_plain_ok_has_no_payload() {
        let response = decode_send_sms_response("OK");
        assert!(response.is_ok());
        assert_eq!(response.id, None);
        assert_eq!(response.count, None);
        assert_eq!(response.parse_error, None);
    }

    #[test]
    fn decode_skips_unbalanced_payload_silently() {
        let response = decode_send_sms_response("OK(bad");
        assert!(response.is_ok());
        assert_eq!(response.id, None);
        assert_eq!(response.count, None);
        assert_eq!(response.parse_error, None);

        let response = decode_send_sms_response("OK)1, 2 x(");
        assert!(response.is_ok());
        assert_eq!(response.id, None);
        assert_eq!(response.parse_error, None);
    }

    #[test]
    fn decode_records_non_numeric_count() {
        let response = decode_send_sms_response("OK(1, abc queued)");
        assert!(response.is_ok());
        assert_eq!(response.id.as_deref(), Some("1"));
        assert_eq!(response.count, None);

        let failure = response.parse_error.expect("parse error");
        assert!(failure.message.contains("abc"), "{failure:?}");
        assert!(failure.trace.contains("InvalidCount"), "{failure:?}");
    }

    #[test]
    fn decode_count_without_trailing_text() {
        let response = decode_send_sms_response("OK(987,3)");
        assert_eq!(response.id.as_deref(), Some("987"));
        assert_eq!(response.count, Some(3));
    }

    #[test]
    fn decode_id_only_payload() {
        let response = decode_send_sms_response("OK(987)");
        assert_eq!(response.id.as_deref(), Some("987"));
        assert_eq!(response.count, None);
        assert_eq!(response.parse_error, None);
    }

    #[test]
    fn decode_failure_leaves_fields_unset() {
        for body in ["", "ERROR(12345, 1 message)", "ok(1, 1 x)", " OK(1, 1 x)"] {
            let response = decode_send_sms_response(body);
            assert!(!response.is_ok(), "{body:?}");
            assert_eq!(response.id, None, "{body:?}");
            assert_eq!(response.count, None, "{body:?}");
            assert_eq!(response.parse_error, None, "{body:?}");
            assert_eq!(response.response, body);
        }
    }
}
