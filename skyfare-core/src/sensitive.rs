use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps a credential so it never shows up in `Debug`/`Display` output
/// (request logging, `tracing::debug!("{:?}", req)` and friends).
///
/// Serialization is transparent: the client still has to put the real
/// password on the wire.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T: Serialize> Serialize for Sensitive<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_masked() {
        let secret = Sensitive::new("hunter22".to_string());
        assert_eq!(format!("{:?}", secret), "********");
        assert_eq!(secret.to_string(), "********");
        assert_eq!(secret.expose(), "hunter22");
    }

    #[test]
    fn test_serde_is_transparent() {
        let secret: Sensitive<String> = serde_json::from_str(r#""hunter22""#).unwrap();
        assert_eq!(secret.expose(), "hunter22");
        assert_eq!(serde_json::to_string(&secret).unwrap(), r#""hunter22""#);
    }
}
