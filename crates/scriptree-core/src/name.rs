//! Node name validation.

use crate::error::TreeError;

/// Default upper bound on a node name, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Validate a node name.
///
/// Names are single path segments, so they may not contain the separator.
pub fn validate_name(name: &str, max_len: usize) -> Result<(), TreeError> {
    let reject = |reason: String| {
        Err(TreeError::InvalidName {
            name: name.into(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("name cannot be empty".into());
    }

    if name.len() > max_len {
        return reject(format!("name is too long (max {max_len} bytes)"));
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return reject(format!("name cannot contain {c:?}"));
        }
    }

    if name == "." || name == ".." {
        return reject("'.' and '..' are reserved names".into());
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return reject("name cannot start or end with spaces".into());
    }

    Ok(())
}
