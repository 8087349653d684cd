//! `meta<id>` files: one `<absolute path>\n<fingerprint>\n\n` record per
//! versioned file.
//!
//! Files written by the original tool quote each path (`"/abs/path"`, with
//! `\"` and `\\` escapes). The parser accepts quoted and bare paths; the
//! encoder writes bare paths.

use std::path::{Path, PathBuf};

use boo_types::{Fingerprint, FingerprintMap};

use crate::error::{StoreError, StoreResult};

/// Encode a fingerprint map as metadata records.
pub fn encode(files: &FingerprintMap) -> String {
    let mut out = String::new();
    for (path, fp) in files {
        out.push_str(&path.to_string_lossy());
        out.push('\n');
        out.push_str(&fp.to_string());
        out.push_str("\n\n");
    }
    out
}

/// Decode metadata records. `source` is only used in error messages.
pub fn decode(text: &str, source: &Path) -> StoreResult<FingerprintMap> {
    let mut files = FingerprintMap::new();
    let mut lines = text.split('\n').enumerate().peekable();

    loop {
        // Blank separators between records are not significant.
        while matches!(lines.peek(), Some((_, l)) if l.is_empty()) {
            lines.next();
        }
        let Some((path_line, raw_path)) = lines.next() else {
            break;
        };

        let corrupt = |line: usize, reason: String| StoreError::CorruptMetadata {
            path: source.to_path_buf(),
            line: line + 1,
            reason,
        };

        let (fp_line, raw_fp) = lines
            .next()
            .ok_or_else(|| corrupt(path_line, format!("missing fingerprint for {raw_path}")))?;
        let fingerprint: Fingerprint = raw_fp
            .parse()
            .map_err(|e| corrupt(fp_line, format!("{e}")))?;

        let path = unquote(raw_path).map_err(|reason| corrupt(path_line, reason))?;
        files.insert(path, fingerprint);
    }

    Ok(files)
}

/// Undo C++ `std::quoted` if the line is quoted; otherwise return it as-is.
fn unquote(raw: &str) -> Result<PathBuf, String> {
    let Some(inner) = raw.strip_prefix('"') else {
        return Ok(PathBuf::from(raw));
    };
    let inner = inner
        .strip_suffix('"')
        .ok_or_else(|| format!("unterminated quoted path: {raw}"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err(format!("dangling escape in path: {raw}")),
            }
        } else {
            out.push(c);
        }
    }
    Ok(PathBuf::from(out))
}
