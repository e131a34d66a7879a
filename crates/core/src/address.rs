// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service addresses: `happy://<host>/<instance>[/service/<service-name>]`.
//!
//! Two addresses refer to the same service iff their canonical string forms
//! (produced by [`Address::to_string`]) are identical.

use crate::error::Error;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

const SCHEME: &str = "happy";

/// A parsed, canonical handle identifying the process instance and,
/// optionally, a service running within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    host: String,
    instance: String,
    service: Option<String>,
}

impl Address {
    /// Construct the address of the instance itself (no service component).
    pub fn instance(host: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            instance: instance.into(),
            service: None,
        }
    }

    /// Derive the address of a named service under this instance.
    pub fn service(&self, name: impl Into<String>) -> Self {
        Self {
            host: self.host.clone(),
            instance: self.instance.clone(),
            service: Some(name.into()),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn instance_id(&self) -> &str {
        &self.instance
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn is_service(&self) -> bool {
        self.service.is_some()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{}/{}", self.host, self.instance)?;
        if let Some(service) = &self.service {
            write!(f, "/service/{service}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| Error::Address(format!("{s}: {e}")))?;

        if url.scheme() != SCHEME {
            return Err(Error::Address(format!(
                "{s}: expected scheme '{SCHEME}', got '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| Error::Address(format!("{s}: missing host")))?
            .to_string();

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let decode_segment = |segment: &str| -> Result<String, Error> {
            percent_decode_str(segment)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .map_err(|e| Error::Address(format!("{s}: invalid percent-encoding: {e}")))
        };

        let instance = decode_segment(
            segments
                .first()
                .ok_or_else(|| Error::Address(format!("{s}: missing instance segment")))?,
        )?;

        let service = match segments.as_slice() {
            [_instance] => None,
            [_instance, "service", name] => Some(decode_segment(name)?),
            _ => {
                return Err(Error::Address(format!(
                    "{s}: expected /<instance> or /<instance>/service/<name>"
                )))
            }
        };

        Ok(Self {
            host,
            instance,
            service,
        })
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
