use crate::error::InstallError;
use crate::platform::ProfileSyntax;
use anyhow::Result;
use std::fs;
use std::io;
use std::path::Path;

pub const BEGIN_MARKER: &str = "# >>> spark-installer >>>";
pub const END_MARKER: &str = "# <<< spark-installer <<<";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvEntry {
    Set { name: String, value: String },
    PrependPath(String),
    AppendPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    Appended,
    Replaced,
    Unchanged,
}

pub fn render_line(entry: &EnvEntry, syntax: ProfileSyntax) -> String {
    let body = match entry {
        EnvEntry::Set { name, value } => format!("{}={}", name, value),
        EnvEntry::PrependPath(dir) => format!("PATH={}:$PATH", dir),
        EnvEntry::AppendPath(dir) => format!("PATH=$PATH:{}", dir),
    };
    match syntax {
        ProfileSyntax::Export => format!("export {}", body),
        ProfileSyntax::Environment => body,
    }
}

pub fn render_block(entries: &[EnvEntry], syntax: ProfileSyntax) -> String {
    let mut block = String::from(BEGIN_MARKER);
    block.push('\n');
    for entry in entries {
        block.push_str(&render_line(entry, syntax));
        block.push('\n');
    }
    block.push_str(END_MARKER);
    block.push('\n');
    block
}

/// Replaces the marked block in `content` with `block`, or appends it. Any
/// duplicate blocks left over from earlier runs are dropped. Lines outside the
/// block keep their original endings, and the block follows the file's CRLF
/// convention when it has one.
///
/// A begin marker with no matching end marker is an error: everything after it
/// would otherwise be taken for part of the block.
pub fn upsert_block(content: &str, block: &str) -> io::Result<(String, ProfileUpdate)> {
    let crlf = content.contains("\r\n");
    let newline = if crlf { "\r\n" } else { "\n" };
    let block = if crlf {
        block.replace("\r\n", "\n").replace('\n', "\r\n")
    } else {
        block.to_string()
    };

    let mut kept = Vec::new();
    let mut inside = false;
    let mut seen = false;

    for line in content.split_inclusive('\n') {
        if line.trim_end() == BEGIN_MARKER {
            inside = true;
            if !seen {
                kept.push(None);
                seen = true;
            }
            continue;
        }
        if inside {
            if line.trim_end() == END_MARKER {
                inside = false;
            }
            continue;
        }
        kept.push(Some(line));
    }

    if inside {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("'{}' has no matching '{}'", BEGIN_MARKER, END_MARKER),
        ));
    }

    if !seen {
        let mut out = content.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push_str(newline);
        }
        if !out.is_empty() {
            out.push_str(newline);
        }
        out.push_str(&block);
        return Ok((out, ProfileUpdate::Appended));
    }

    let mut out = String::new();
    for line in kept {
        match line {
            Some(line) => out.push_str(line),
            None => out.push_str(&block),
        }
    }

    let update = if out == content {
        ProfileUpdate::Unchanged
    } else {
        ProfileUpdate::Replaced
    };
    Ok((out, update))
}

/// Writes the environment block into `path`, creating the file and its parent
/// directory when needed.
pub fn apply(path: &Path, entries: &[EnvEntry], syntax: ProfileSyntax) -> Result<ProfileUpdate> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(InstallError::environment(path, e).into()),
    };

    let block = render_block(entries, syntax);
    let (updated, outcome) =
        upsert_block(&existing, &block).map_err(|e| InstallError::environment(path, e))?;
    if outcome == ProfileUpdate::Unchanged {
        return Ok(outcome);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| InstallError::environment(path, e))?;
        }
    }
    fs::write(path, updated).map_err(|e| InstallError::environment(path, e))?;
    Ok(outcome)
}
