//! Slot name and server address validation for session identities.

/// Validation errors with helpful messages
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Slot name cannot be empty")]
    EmptySlot,

    #[error("Slot name is too long (maximum {max} characters)")]
    SlotTooLong { max: usize },

    #[error("Slot name contains control characters")]
    ControlCharacters,

    #[error("Server address cannot be empty")]
    EmptyAddress,

    #[error("Server address contains whitespace")]
    AddressWhitespace,

    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

/// Maximum slot name length accepted by the coordination server.
pub const MAX_SLOT_NAME: usize = 16;

/// Validate a slot name, returning the trimmed form.
pub fn validate_slot_name(slot: &str) -> Result<String, IdentityError> {
    let trimmed = slot.trim();
    if trimmed.is_empty() {
        return Err(IdentityError::EmptySlot);
    }
    if trimmed.chars().count() > MAX_SLOT_NAME {
        return Err(IdentityError::SlotTooLong { max: MAX_SLOT_NAME });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(IdentityError::ControlCharacters);
    }
    Ok(trimmed.to_string())
}

/// Normalize a server address so that `WSS://Host.example/` and `host.example`
/// compare equal. Scheme prefixes and trailing slashes are stripped and the host
/// is lowercased. A `:port` suffix is kept as given.
pub fn normalize_server_address(address: &str) -> Result<String, IdentityError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(IdentityError::EmptyAddress);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(IdentityError::AddressWhitespace);
    }
    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = ["wss://", "ws://", "tcp://"]
        .iter()
        .find_map(|scheme| lower.strip_prefix(scheme))
        .unwrap_or(&lower);
    let host = without_scheme.trim_end_matches('/');
    if host.is_empty() {
        return Err(IdentityError::EmptyAddress);
    }
    Ok(host.to_string())
}

/// Split a configured address into the host and port to dial. A `:port` suffix
/// overrides `default_port`.
pub fn split_server_address(address: &str, default_port: u16) -> Result<(String, u16), IdentityError> {
    let host = normalize_server_address(address)?;
    match host.rsplit_once(':') {
        Some((name, port)) => {
            if name.is_empty() {
                return Err(IdentityError::EmptyAddress);
            }
            Ok((name.to_string(), parse_port(port)?))
        }
        None => Ok((host, default_port)),
    }
}

/// Parse a port number, rejecting zero.
pub fn parse_port(raw: &str) -> Result<u16, IdentityError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(IdentityError::InvalidPort(raw.to_string())),
        Ok(p) => Ok(p),
    }
}
