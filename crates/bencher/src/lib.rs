//! Shared fixtures for the weft benchmarks.

/// A named benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub const fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    pub const fn header(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Header, file)
    }

    pub const fn body(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Body, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file.file_name
    }
}

/// A raw request captured under `resources/request`.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.content.as_bytes()
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// The request repeated `count` times back to back, as a pipelining client would send it.
    pub fn pipelined(&self, count: usize) -> Vec<u8> {
        self.content.repeat(count).into_bytes()
    }
}

/// Whether a case mostly stresses header parsing or body framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestGroup {
    Header,
    Body,
}
