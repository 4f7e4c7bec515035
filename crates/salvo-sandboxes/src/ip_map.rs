//! Decoding of the build ID to IP address maps Terraform reports.

use crate::error::DecodeError;
use crate::types::BuildId;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Build IDs mapped to the IP addresses of one VM slot, in Terraform's order.
pub type BuildIpMap = BTreeMap<BuildId, Vec<IpAddr>>;

/// Decode a JSON object mapping build ID strings to lists of IP strings.
///
/// Every ID must be a positive base-10 integer with at least one address,
/// and every address must be valid IPv4 or IPv6 text. Address order is
/// preserved and duplicates are kept.
pub fn decode_build_ip_map(raw: &str) -> Result<BuildIpMap, DecodeError> {
    let build_ips: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;

    let mut res = BuildIpMap::new();
    for (key, ips) in build_ips {
        let id: i64 = key
            .parse()
            .map_err(|source| DecodeError::InvalidKey { key: key.clone(), source })?;
        let build_id = BuildId::new(id).map_err(|_| DecodeError::NonPositiveId(id))?;
        if ips.is_empty() {
            return Err(DecodeError::NoAddresses(id));
        }

        let addrs = res.entry(build_id).or_default();
        for value in ips {
            let ip = value
                .parse::<IpAddr>()
                .map_err(|_| DecodeError::InvalidAddress { id, value: value.clone() })?;
            addrs.push(ip);
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> BuildId {
        BuildId::new(n).unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_decode_preserves_order() {
        let got = decode_build_ip_map(r#"{"1": ["1.1.1.1", "1.1.1.2"], "2": ["2.2.2.2"]}"#).unwrap();

        let mut want = BuildIpMap::new();
        want.insert(id(1), vec![ip("1.1.1.1"), ip("1.1.1.2")]);
        want.insert(id(2), vec![ip("2.2.2.2")]);
        assert_eq!(got, want);
    }

    #[test]
    fn test_decode_keeps_duplicates_and_ipv6() {
        let got = decode_build_ip_map(r#"{"7": ["fd00::1", "10.0.0.1", "10.0.0.1"]}"#).unwrap();
        assert_eq!(got[&id(7)], vec![ip("fd00::1"), ip("10.0.0.1"), ip("10.0.0.1")]);
    }

    #[test]
    fn test_decode_empty_object() {
        assert!(decode_build_ip_map("{}").unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed_json() {
        for raw in [r#"{"1": ["1.1.1.1"]"#, "[]", r#"{"1": "1.1.1.1"}"#, r#"{"1": [1]}"#, ""] {
            let err = decode_build_ip_map(raw).unwrap_err();
            assert!(matches!(err, DecodeError::Json(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn test_decode_non_integer_key() {
        let err = decode_build_ip_map(r#"{"abc": ["1.1.1.1"]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidKey { ref key, .. } if key == "abc"));
    }

    #[test]
    fn test_decode_zero_key() {
        let err = decode_build_ip_map(r#"{"0": ["1.1.1.1"]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NonPositiveId(0)));
    }

    #[test]
    fn test_decode_negative_key() {
        let err = decode_build_ip_map(r#"{"-5": ["1.1.1.1"]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NonPositiveId(-5)));
    }

    #[test]
    fn test_decode_empty_list() {
        let err = decode_build_ip_map(r#"{"1": ["1.1.1.1"], "2": []}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NoAddresses(2)));
    }

    #[test]
    fn test_decode_bad_address() {
        let err = decode_build_ip_map(r#"{"1": ["1.1.1.1", "1.1.1"]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAddress { id: 1, ref value } if value == "1.1.1"));
    }
}
