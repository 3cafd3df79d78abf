//! `amikopay://<host>:<port>/<requestID>` payment URLs (§6).
use std::fmt;

use amikopay_primitives::{
	constants::URL_SCHEME,
	types::RequestId,
};
use thiserror::Error;

/// Errors parsing a payment URL.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum PaymentUrlError {
	#[error("expected scheme `{URL_SCHEME}://`, got `{0}`")]
	WrongScheme(String),
	#[error("payment URL is missing a host:port authority")]
	MissingAuthority,
	#[error("payment URL is missing a requestID path segment")]
	MissingRequestId,
	#[error("payment URL authority `{0}` is not in host:port form")]
	MalformedAuthority(String),
	#[error("payment URL port `{0}` is not a valid number")]
	MalformedPort(String),
}

/// A parsed `amikopay://host:port/requestID` URL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentUrl {
	pub host: String,
	pub port: u16,
	pub request_id: RequestId,
}

impl PaymentUrl {
	pub fn new(host: impl Into<String>, port: u16, request_id: RequestId) -> Self {
		PaymentUrl { host: host.into(), port, request_id }
	}

	pub fn parse(url: &str) -> Result<Self, PaymentUrlError> {
		let prefix = format!("{}://", URL_SCHEME);
		let rest = url.strip_prefix(&prefix).ok_or_else(|| PaymentUrlError::WrongScheme(url.to_string()))?;

		let (authority, path) = rest.split_once('/').ok_or(PaymentUrlError::MissingRequestId)?;
		if authority.is_empty() {
			return Err(PaymentUrlError::MissingAuthority)
		}
		if path.is_empty() {
			return Err(PaymentUrlError::MissingRequestId)
		}

		let (host, port_str) = authority
			.rsplit_once(':')
			.ok_or_else(|| PaymentUrlError::MalformedAuthority(authority.to_string()))?;
		let port: u16 = port_str
			.parse()
			.map_err(|_| PaymentUrlError::MalformedPort(port_str.to_string()))?;

		Ok(PaymentUrl { host: host.to_string(), port, request_id: RequestId(path.to_string()) })
	}
}

impl fmt::Display for PaymentUrl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}://{}:{}/{}", URL_SCHEME, self.host, self.port, self.request_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_display_and_parse() {
		let url = PaymentUrl::new("node.example.org", 4321, RequestId("deadbeefcafebabe".into()));
		let rendered = url.to_string();
		assert_eq!(rendered, "amikopay://node.example.org:4321/deadbeefcafebabe");
		assert_eq!(PaymentUrl::parse(&rendered).unwrap(), url);
	}

	#[test]
	fn rejects_wrong_scheme() {
		assert_eq!(
			PaymentUrl::parse("http://host:1/abc"),
			Err(PaymentUrlError::WrongScheme("http://host:1/abc".to_string()))
		);
	}

	#[test]
	fn rejects_missing_request_id() {
		assert_eq!(PaymentUrl::parse("amikopay://host:1"), Err(PaymentUrlError::MissingRequestId));
	}

	#[test]
	fn rejects_malformed_port() {
		assert_eq!(
			PaymentUrl::parse("amikopay://host:notaport/abc"),
			Err(PaymentUrlError::MalformedPort("notaport".to_string()))
		);
	}
}
