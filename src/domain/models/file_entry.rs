use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "dir",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "dir" | "tree" | "directory" => EntryKind::Directory,
            _ => EntryKind::File,
        }
    }
}

/// One item of a directory listing. Ordered as returned by the upstream
/// listing call; not persisted beyond the fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    name: String,
    path: String,
    kind: EntryKind,
    size: u64,
    html_url: String,
}

impl FileEntry {
    pub fn new(name: String, path: String, kind: EntryKind, size: u64, html_url: String) -> Self {
        Self {
            name,
            path,
            kind,
            size,
            html_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn html_url(&self) -> &str {
        &self.html_url
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_parses_upstream_labels() {
        assert_eq!(EntryKind::parse("dir"), EntryKind::Directory);
        assert_eq!(EntryKind::parse("tree"), EntryKind::Directory);
        assert_eq!(EntryKind::parse("file"), EntryKind::File);
        assert_eq!(EntryKind::parse("blob"), EntryKind::File);
    }
}
