//! The single-exchange handshake that enumerates every test the client binary
//! has registered. A protocol violation here is fatal to the whole run: there
//! is nothing sensible left to execute if the catalogue itself can't be read.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use proctest_core::OpaqueContext;
use proctest_proto::{read_data, read_data_u32, write_query_test_info, LittleEndian};
use proctest_transport::ChildProcess;
use tracing::debug;

/// One discovered test: its name and, if any, the context tag it expects.
/// Name and context slices borrow out of [`TestCatalogue::names`].
#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub test_name_range: (usize, usize),
    pub context_name_range: (usize, usize),
}

/// Every test the client registered, as read from its `QueryTestInfo`
/// response. Byte ranges index into a single backing string arena so the
/// catalogue is one allocation rather than `N` small ones.
pub struct TestCatalogue {
    pub entries: Vec<CatalogueEntry>,
    names: String,
}

impl TestCatalogue {
    pub fn test_name(&self, i: usize) -> &str {
        let (start, end) = self.entries[i].test_name_range;
        &self.names[start..end]
    }

    pub fn context_name(&self, i: usize) -> &str {
        let (start, end) = self.entries[i].context_name_range;
        &self.names[start..end]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spawns a throwaway child, asks it what tests it has, and builds the
/// catalogue. The child is torn down (via `ChildProcess::drop`) before this
/// returns.
pub fn discover(client_exe: &Path, timeout: Duration) -> Result<TestCatalogue> {
    let mut child = ChildProcess::spawn(client_exe, &[], timeout)
        .context("failed to spawn the client for test discovery")?;

    write_query_test_info::<LittleEndian>(child.channel_mut());

    let count = read_data_u32::<LittleEndian>(child.channel_mut())
        .context("test count message invalid")?;
    let strings_size = read_data_u32::<LittleEndian>(child.channel_mut())
        .context("strings size message invalid")?;

    let mut names = String::with_capacity(strings_size as usize);
    let mut entries = Vec::with_capacity(count as usize);

    for i in 0..count {
        let test_name = read_data::<LittleEndian>(child.channel_mut())
            .with_context(|| format!("invalid test_name frame for test {i}"))?;
        let test_name = String::from_utf8(test_name)
            .with_context(|| format!("test_name for test {i} was not valid UTF-8"))?;
        if test_name.is_empty() {
            bail!("test {i} reported an empty test_name");
        }

        let context_name = read_data::<LittleEndian>(child.channel_mut())
            .with_context(|| format!("invalid context_name frame for test {i}"))?;
        let context_name = String::from_utf8(context_name)
            .with_context(|| format!("context_name for test {i} was not valid UTF-8"))?;

        let test_start = names.len();
        names.push_str(&test_name);
        let test_end = names.len();

        let context_start = names.len();
        names.push_str(&context_name);
        let context_end = names.len();

        entries.push(CatalogueEntry {
            test_name_range: (test_start, test_end),
            context_name_range: (context_start, context_end),
        });
    }

    debug!(count, "discovered tests");
    Ok(TestCatalogue { entries, names })
}

/// Finds the caller-supplied context whose name matches `context_name`
/// exactly, by byte equality — the same rule the runner uses to decide
/// whether a test should receive a context payload.
pub fn find_context<'a>(
    contexts: &'a [OpaqueContext<'a>],
    context_name: &str,
) -> Option<&'a OpaqueContext<'a>> {
    contexts.iter().find(|c| c.name == context_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_match() {
        let data = [0x12, 0x34];
        let contexts = [OpaqueContext::new("Int", &data)];
        let found = find_context(&contexts, "Int").expect("expected a match");
        assert_eq!(found.data, &data);
    }

    #[test]
    fn is_case_sensitive() {
        let data = [0x12];
        let contexts = [OpaqueContext::new("Int", &data)];
        assert!(find_context(&contexts, "int").is_none());
        assert!(find_context(&contexts, "INT").is_none());
    }

    #[test]
    fn missing_name_returns_none() {
        let data = [0x12];
        let contexts = [OpaqueContext::new("Int", &data)];
        assert!(find_context(&contexts, "Other").is_none());
    }

    #[test]
    fn empty_context_list_returns_none() {
        let contexts: [OpaqueContext<'_>; 0] = [];
        assert!(find_context(&contexts, "Int").is_none());
    }
}
