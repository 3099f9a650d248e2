use std::net::Ipv4Addr;

use crate::domain::errors::{BucketNameRule, ValidationError};

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 63;
const RESERVED_PREFIXES: &[&str] = &["sthree-"];
const RESERVED_SUFFIXES: &[&str] = &["-s3alias"];

/// Name of the bucket a store is bound to, checked against S3 naming rules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let name = value.into();
        match Self::broken_rule(&name) {
            Some(rule) => Err(ValidationError::InvalidBucketName { name, rule }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn broken_rule(name: &str) -> Option<BucketNameRule> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&name.len()) {
            return Some(BucketNameRule::Length);
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
        {
            return Some(BucketNameRule::Character(c));
        }

        let alphanumeric = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        if !alphanumeric(name.chars().next()) || !alphanumeric(name.chars().last()) {
            return Some(BucketNameRule::Edge);
        }
        if ["--", "..", ".-", "-."].iter().any(|pair| name.contains(pair)) {
            return Some(BucketNameRule::AdjacentSeparators);
        }
        if name.parse::<Ipv4Addr>().is_ok() {
            return Some(BucketNameRule::IpAddress);
        }
        if RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
            || RESERVED_SUFFIXES.iter().any(|s| name.ends_with(s))
        {
            return Some(BucketNameRule::ReservedAffix);
        }
        None
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BucketName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
