use std::fmt;

use base64::Engine;

/// Detached CMS signature: DER-encoded `ContentInfo` wrapping `SignedData`.
///
/// The signed content is not embedded; the blob only verifies against the
/// exact bytes that were signed.
#[derive(Clone, Eq, PartialEq)]
pub struct SignatureBlob {
    bytes: Box<[u8]>,
}

impl SignatureBlob {
    #[must_use]
    pub fn from_der(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Ok(Self::from_der(bytes))
    }
}

impl AsRef<[u8]> for SignatureBlob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for SignatureBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_der(bytes)
    }
}

impl fmt::Debug for SignatureBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureBlob(len={})", self.bytes.len())
    }
}
