//! Transport layer: gateway wire-format details (query encoding, reply parsing).

mod send_sms;

pub use send_sms::{
    decode_send_sms_response, encode_query_url, encode_send_sms_params, encode_send_time,
};
