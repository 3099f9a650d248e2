/// Validation errors for caller-supplied keys, bucket names and batches
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyObjectKey,
    ObjectKeyTooLong { actual: usize, max: usize },
    InvalidObjectKeyCharacter(char),
    ObjectKeyStartsWithSlash,
    ObjectKeyEndsWithSlash,
    ObjectKeyContainsDoubleSlash,
    ObjectKeyRelativeSegment,
    /// Rejected by the backend's path model
    UnaddressableObjectKey { key: String, reason: String },

    InvalidBucketName { name: String, rule: BucketNameRule },

    /// A batch operation was given no keys
    EmptyKeyBatch,
}

/// The bucket naming rule a rejected name broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketNameRule {
    Length,
    Edge,
    Character(char),
    AdjacentSeparators,
    IpAddress,
    ReservedAffix,
}

impl std::fmt::Display for BucketNameRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketNameRule::Length => write!(f, "must be 3 to 63 characters long"),
            BucketNameRule::Edge => {
                write!(f, "must begin and end with a lowercase letter or digit")
            }
            BucketNameRule::Character(c) => write!(f, "contains forbidden character {:?}", c),
            BucketNameRule::AdjacentSeparators => {
                write!(f, "cannot contain '--', '..', '.-' or '-.'")
            }
            BucketNameRule::IpAddress => write!(f, "cannot look like an IPv4 address"),
            BucketNameRule::ReservedAffix => write!(f, "uses a reserved prefix or suffix"),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object key is {} bytes, limit is {}", actual, max)
            }
            ValidationError::InvalidObjectKeyCharacter(c) => {
                write!(f, "Object key contains control character {:?}", c)
            }
            ValidationError::ObjectKeyStartsWithSlash => {
                write!(f, "Object key cannot start with '/'")
            }
            ValidationError::ObjectKeyEndsWithSlash => {
                write!(f, "Object key cannot end with '/'")
            }
            ValidationError::ObjectKeyContainsDoubleSlash => {
                write!(f, "Object key cannot contain an empty segment")
            }
            ValidationError::ObjectKeyRelativeSegment => {
                write!(f, "Object key cannot contain '.' or '..' segments")
            }
            ValidationError::UnaddressableObjectKey { key, reason } => {
                write!(f, "Object key '{}' cannot be stored: {}", key, reason)
            }
            ValidationError::InvalidBucketName { name, rule } => {
                write!(f, "Invalid bucket name '{}': {}", name, rule)
            }
            ValidationError::EmptyKeyBatch => {
                write!(f, "Batch delete requires at least one key")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
