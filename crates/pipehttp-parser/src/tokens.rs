//! Known-token recognition for HTTP methods, versions, and URI schemes.
//!
//! Method and version recognition sit on the hottest path of every
//! request, so the matcher compares fixed-width integers instead of
//! walking bytes: each known token is precomputed as an 8-byte
//! little-endian constant padded with NUL, paired with a mask covering
//! only its real bytes (including the required trailing delimiter).
//!
//! The packing is purely an optimization. [`known_method_bytewise`] is
//! the canonical comparison; the fast path is required to agree with it
//! on every input, and the test suite holds the two to that.

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method.
    Get,
    /// PUT method.
    Put,
    /// POST method.
    Post,
    /// DELETE method.
    Delete,
    /// HEAD method.
    Head,
    /// TRACE method.
    Trace,
    /// PATCH method.
    Patch,
    /// CONNECT method.
    Connect,
    /// OPTIONS method.
    Options,
    /// Any other token; the raw bytes are reported separately.
    Custom,
}

impl Method {
    /// Look up an exact method token (no trailing delimiter).
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"GET" => Some(Self::Get),
            b"PUT" => Some(Self::Put),
            b"POST" => Some(Self::Post),
            b"DELETE" => Some(Self::Delete),
            b"HEAD" => Some(Self::Head),
            b"TRACE" => Some(Self::Trace),
            b"PATCH" => Some(Self::Patch),
            b"CONNECT" => Some(Self::Connect),
            b"OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Canonical uppercase method name; `None` for [`Method::Custom`].
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Get => Some("GET"),
            Self::Put => Some("PUT"),
            Self::Post => Some("POST"),
            Self::Delete => Some("DELETE"),
            Self::Head => Some("HEAD"),
            Self::Trace => Some("TRACE"),
            Self::Patch => Some("PATCH"),
            Self::Connect => Some("CONNECT"),
            Self::Options => Some("OPTIONS"),
            Self::Custom => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str().unwrap_or("<custom>"))
    }
}

/// HTTP version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// HTTP/1.0.
    Http10,
    /// HTTP/1.1.
    Http11,
    /// Anything else.
    Unknown,
}

impl Version {
    /// Canonical version string; `None` for [`Version::Unknown`].
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Http10 => Some("HTTP/1.0"),
            Self::Http11 => Some("HTTP/1.1"),
            Self::Unknown => None,
        }
    }
}

/// URI scheme of an absolute-form target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `http://`
    Http,
    /// `https://`
    Https,
    /// Anything else.
    Unknown,
}

impl Scheme {
    /// Canonical scheme prefix; `None` for [`Scheme::Unknown`].
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Http => Some("http://"),
            Self::Https => Some("https://"),
            Self::Unknown => None,
        }
    }
}

/// An ASCII token NUL-padded to 8 bytes, as a little-endian integer.
const fn token8(token: &str) -> u64 {
    let bytes = token.as_bytes();
    assert!(bytes.len() <= 8);
    let mut raw = [0u8; 8];
    let mut i = 0;
    while i < bytes.len() {
        raw[i] = bytes[i];
        i += 1;
    }
    u64::from_le_bytes(raw)
}

/// Mask covering the first `len` bytes of a little-endian 8-byte load.
const fn mask(len: usize) -> u64 {
    if len == 8 { u64::MAX } else { (1u64 << (len * 8)) - 1 }
}

const GET_SPACE: u32 = u32::from_le_bytes(*b"GET ");
const HTTP_10: u64 = u64::from_le_bytes(*b"HTTP/1.0");
const HTTP_11: u64 = u64::from_le_bytes(*b"HTTP/1.1");
const HTTP_SCHEME: u64 = token8("http://");
const HTTPS_SCHEME: u64 = u64::from_le_bytes(*b"https://");

/// (mask, token incl. trailing space, method, method length).
/// GET is handled by the 4-byte fast path and is not in the table.
const KNOWN_METHODS: [(u64, u64, Method, usize); 8] = [
    (mask(4), token8("PUT "), Method::Put, 3),
    (mask(5), token8("POST "), Method::Post, 4),
    (mask(5), token8("HEAD "), Method::Head, 4),
    (mask(6), token8("TRACE "), Method::Trace, 5),
    (mask(6), token8("PATCH "), Method::Patch, 5),
    (mask(7), token8("DELETE "), Method::Delete, 6),
    (mask(8), token8("CONNECT "), Method::Connect, 7),
    (mask(8), token8("OPTIONS "), Method::Options, 7),
];

fn load_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

fn load_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(raw)
}

/// Recognize a known method followed by its required space.
///
/// Returns the method and its byte length (without the space).
/// `(Method::Custom, 0)` when the leading bytes match no known method or
/// fewer than 8 bytes are available to decide (4 suffice for `GET `,
/// which dominates and is checked with a single `u32` compare).
#[must_use]
pub fn known_method(bytes: &[u8]) -> (Method, usize) {
    if bytes.len() < 4 {
        return (Method::Custom, 0);
    }
    if load_u32(bytes) == GET_SPACE {
        return (Method::Get, 3);
    }
    if bytes.len() < 8 {
        return (Method::Custom, 0);
    }
    let loaded = load_u64(bytes);
    for &(mask, token, method, length) in &KNOWN_METHODS {
        if loaded & mask == token {
            return (method, length);
        }
    }
    (Method::Custom, 0)
}

/// The canonical byte-wise equivalent of [`known_method`].
///
/// Same contract, including the availability rule: fewer than 8 bytes
/// (4 for GET) is `Custom` regardless of content. The fast path must
/// produce identical results for all inputs.
#[must_use]
pub fn known_method_bytewise(bytes: &[u8]) -> (Method, usize) {
    const TABLE: [(&[u8], Method); 8] = [
        (b"PUT ", Method::Put),
        (b"POST ", Method::Post),
        (b"HEAD ", Method::Head),
        (b"TRACE ", Method::Trace),
        (b"PATCH ", Method::Patch),
        (b"DELETE ", Method::Delete),
        (b"CONNECT ", Method::Connect),
        (b"OPTIONS ", Method::Options),
    ];
    if bytes.len() < 4 {
        return (Method::Custom, 0);
    }
    if bytes.starts_with(b"GET ") {
        return (Method::Get, 3);
    }
    if bytes.len() < 8 {
        return (Method::Custom, 0);
    }
    for &(token, method) in &TABLE {
        if bytes.starts_with(token) {
            return (method, token.len() - 1);
        }
    }
    (Method::Custom, 0)
}

/// Recognize `HTTP/1.0` or `HTTP/1.1` followed by the required CR.
///
/// Needs at least 9 bytes: the 8-byte version token and the CR.
#[must_use]
pub fn known_version(bytes: &[u8]) -> Version {
    if bytes.len() < 9 || bytes[8] != b'\r' {
        return Version::Unknown;
    }
    known_version_token(bytes)
}

/// Recognize a bare 8-byte `HTTP/1.x` token with no delimiter
/// requirement (status lines delimit with a space instead of CR).
#[must_use]
pub fn known_version_token(bytes: &[u8]) -> Version {
    if bytes.len() < 8 {
        return Version::Unknown;
    }
    match load_u64(bytes) {
        HTTP_11 => Version::Http11,
        HTTP_10 => Version::Http10,
        _ => Version::Unknown,
    }
}

/// Recognize an `http://` or `https://` prefix.
///
/// Needs at least 8 bytes available, even for the 7-byte `http://`.
#[must_use]
pub fn known_scheme(bytes: &[u8]) -> Scheme {
    if bytes.len() < 8 {
        return Scheme::Unknown;
    }
    let loaded = load_u64(bytes);
    if loaded & mask(7) == HTTP_SCHEME {
        return Scheme::Http;
    }
    if loaded == HTTPS_SCHEME {
        return Scheme::Https;
    }
    Scheme::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [(&str, Method); 9] = [
        ("GET", Method::Get),
        ("PUT", Method::Put),
        ("POST", Method::Post),
        ("DELETE", Method::Delete),
        ("HEAD", Method::Head),
        ("TRACE", Method::Trace),
        ("PATCH", Method::Patch),
        ("CONNECT", Method::Connect),
        ("OPTIONS", Method::Options),
    ];

    #[test]
    fn known_methods_recognized_with_length() {
        for (name, expected) in KNOWN {
            let input = format!("{name} /index.html HTTP/1.1\r\n");
            let (method, length) = known_method(input.as_bytes());
            assert_eq!(method, expected, "method {name}");
            assert_eq!(length, name.len(), "length of {name}");
        }
    }

    #[test]
    fn fast_path_agrees_with_bytewise_reference() {
        let mut inputs: Vec<Vec<u8>> = Vec::new();
        for (name, _) in KNOWN {
            inputs.push(format!("{name} / HTTP/1.1\r\n").into_bytes());
        }
        for custom in ["LOCK", "MKCOL", "PROPFIND", "FOO", "gEt", "GETT", "G"] {
            inputs.push(format!("{custom} / HTTP/1.1\r\n").into_bytes());
        }
        // Short inputs exercising the 4-byte and 8-byte availability rules.
        for short in ["", "G", "GE", "GET", "GET ", "PUT /", "OPTIONS", "DELETE "] {
            inputs.push(short.as_bytes().to_vec());
        }
        for input in &inputs {
            assert_eq!(
                known_method(input),
                known_method_bytewise(input),
                "fast path diverged on {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn method_needs_its_trailing_space() {
        assert_eq!(known_method(b"GETT / HTTP/1.1\r\n"), (Method::Custom, 0));
        assert_eq!(known_method(b"PUTX / HTTP/1.1\r\n"), (Method::Custom, 0));
        // Case-sensitive.
        assert_eq!(known_method(b"get / HTTP/1.1\r\n"), (Method::Custom, 0));
    }

    #[test]
    fn short_input_is_custom_even_when_a_prefix_matches() {
        assert_eq!(known_method(b"PUT "), (Method::Custom, 0));
        assert_eq!(known_method(b"GET"), (Method::Custom, 0));
        assert_eq!(known_method(b"GET "), (Method::Get, 3));
    }

    #[test]
    fn versions_require_the_trailing_cr() {
        assert_eq!(known_version(b"HTTP/1.1\r\n"), Version::Http11);
        assert_eq!(known_version(b"HTTP/1.0\r\n"), Version::Http10);
        assert_eq!(known_version(b"HTTP/1.1\n"), Version::Unknown);
        assert_eq!(known_version(b"HTTP/1.1"), Version::Unknown);
        assert_eq!(known_version(b"HTTP/2.0\r\n"), Version::Unknown);
        assert_eq!(known_version(b"http/1.1\r\n"), Version::Unknown);
    }

    #[test]
    fn bare_version_tokens() {
        assert_eq!(known_version_token(b"HTTP/1.1 200"), Version::Http11);
        assert_eq!(known_version_token(b"HTTP/1.0 301"), Version::Http10);
        assert_eq!(known_version_token(b"HTTP/3.0 200"), Version::Unknown);
        assert_eq!(known_version_token(b"HTTP/1."), Version::Unknown);
    }

    #[test]
    fn schemes() {
        assert_eq!(known_scheme(b"http://example.com"), Scheme::Http);
        assert_eq!(known_scheme(b"https://example.com"), Scheme::Https);
        assert_eq!(known_scheme(b"httpx://example.com"), Scheme::Unknown);
        assert_eq!(known_scheme(b"ftp://example.com/"), Scheme::Unknown);
        // A 7-byte `http://` with nothing after it cannot be decided.
        assert_eq!(known_scheme(b"http://"), Scheme::Unknown);
    }

    #[test]
    fn exact_token_lookup() {
        assert_eq!(Method::from_bytes(b"GET"), Some(Method::Get));
        assert_eq!(Method::from_bytes(b"CONNECT"), Some(Method::Connect));
        assert_eq!(Method::from_bytes(b"GET "), None);
        assert_eq!(Method::from_bytes(b"BREW"), None);
        assert_eq!(Method::Get.as_str(), Some("GET"));
        assert_eq!(Method::Custom.as_str(), None);
    }
}
