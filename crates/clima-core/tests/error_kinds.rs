#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use clima_core::{ClimaError, ErrorKind, FetchError};

#[test]
fn fetch_errors_map_to_client_categories() {
    let cases = [
        (FetchError::Connection("refused".into()), ErrorKind::ConnectionError, 502),
        (FetchError::BadPayload("eof".into()), ErrorKind::InvalidResponse, 502),
        (FetchError::NotFound { status: 401 }, ErrorKind::NotFound, 404),
    ];

    for (fetch, kind, status) in cases {
        let err = ClimaError::from(fetch);
        assert_eq!(err.kind(), kind);
        assert_eq!(err.kind().http_status(), status);
    }
}

#[test]
fn missing_city_is_a_fixed_400() {
    let kind = ClimaError::MissingCity.kind();
    assert_eq!(kind.http_status(), 400);
    assert_eq!(kind.as_str(), "missing_city");
    assert_eq!(kind.public_message(), "Debe ingresar una ciudad");
}

#[test]
fn connection_and_payload_messages_differ() {
    assert_ne!(
        ErrorKind::ConnectionError.public_message(),
        ErrorKind::InvalidResponse.public_message()
    );
    assert_eq!(ErrorKind::NotFound.public_message(), "Ciudad no encontrada");
}
