use femtosocket::{ConnectionString, HandlerError, Scheme};
use proptest::prelude::*;

fn host() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}(\\.[a-z][a-z0-9]{0,8}){0,2}"
}

fn scheme() -> impl Strategy<Value = Option<Scheme>> {
    prop_oneof![Just(None), Just(Some(Scheme::Tcp)), Just(Some(Scheme::Udp))]
}

fn render(scheme: Option<Scheme>, host: &str, port: u16) -> String {
    match scheme {
        Some(scheme) => format!("{}://{host}:{port}", scheme.as_str()),
        None => format!("{host}:{port}"),
    }
}

proptest! {
    #[test]
    fn host_and_port_are_recovered(scheme in scheme(), host in host(), port in any::<u16>()) {
        let raw = render(scheme, &host, port);
        let parsed = ConnectionString::parse(&raw).expect("generated input is valid");
        prop_assert_eq!(parsed.scheme(), scheme);
        prop_assert_eq!(parsed.host(), host.as_str());
        prop_assert_eq!(parsed.port(), Some(port));
        prop_assert_eq!(parsed.as_str(), raw.as_str());
        prop_assert_eq!(parsed.to_string(), raw);
    }

    #[test]
    fn inputs_without_host_are_rejected(scheme in scheme(), port in any::<u16>()) {
        let raw = match scheme {
            Some(scheme) => format!("{}://:{port}", scheme.as_str()),
            None => format!(":{port}"),
        };
        let err = ConnectionString::parse(&raw).expect_err("host is missing");
        let is_invalid = matches!(err, HandlerError::InvalidConnectionString { .. });
        prop_assert!(is_invalid);
    }

    #[test]
    fn non_numeric_ports_are_rejected(host in host(), port in "[a-z]{1,5}") {
        let raw = format!("{host}:{port}");
        prop_assert!(ConnectionString::parse(&raw).is_err());
    }
}
