pub mod claims;
pub mod expiry;

/// Opaque signed bearer token. The value is carried as issued and attached
/// to outgoing calls verbatim; only the payload claims are ever decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
}

impl Token {
    pub fn new(value: String) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
