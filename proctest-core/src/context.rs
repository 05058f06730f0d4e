//! The type-erasure boundary between the driver, which only knows byte slices
//! tagged by name, and a test body, which decodes the bytes itself.

/// A name-tagged, untyped byte slice handed to a test that declared a
/// non-empty `context_name` at registration. The protocol never interprets
/// `data`; only the test function does.
#[derive(Debug, Clone, Copy)]
pub struct OpaqueContext<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

impl<'a> OpaqueContext<'a> {
    pub const EMPTY: OpaqueContext<'static> = OpaqueContext { name: "", data: &[] };

    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}
