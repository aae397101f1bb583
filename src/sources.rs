use crate::error::{Error, Result};
use crate::report::Record;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Map a Gradle task path to the source set it compiles.
///
/// `:a:b:compileJava` is `a/b/src/main`; any other final task (in practice
/// `compileTestJava`) is `a/b/src/test`.
pub fn source_dir(project: &Path, task: &str) -> Option<PathBuf> {
    let mut parts: Vec<&str> =
        task.trim_start_matches(':').split(':').collect();
    let last = parts.pop().filter(|t| !t.is_empty())?;

    let mut dir = project.to_owned();
    dir.extend(parts.iter().filter(|p| !p.is_empty()));
    dir.push(if last == "compileJava" {
        "src/main"
    } else {
        "src/test"
    });
    Some(dir)
}

/// Whether the directory tree at `path` holds at least one java file.
/// Symlinks are not followed. A missing directory holds nothing.
pub fn has_java_sources(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let entries = std::fs::read_dir(path).map_err(|source| Error::File {
        path: path.to_owned(),
        source,
    })?;
    for entry in entries {
        let e = entry?;
        let ft = e.file_type()?;
        if ft.is_symlink() {
            continue;
        } else if ft.is_dir() {
            if has_java_sources(&e.path())? {
                return Ok(true);
            }
        } else if e.path().extension().is_some_and(|x| x == "java") {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Keep only the records whose task compiles sources that exist in
/// `project`, preserving order.
pub fn retain_with_sources(
    project: &Path,
    records: Vec<Record>,
) -> Result<Vec<Record>> {
    // each check is a directory walk, so fan them out
    let checked = records
        .into_par_iter()
        .map(|r| -> Result<(Record, bool)> {
            let keep = match source_dir(project, &r.name) {
                Some(dir) => has_java_sources(&dir)?,
                None => false,
            };
            Ok((r, keep))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(checked
        .into_iter()
        .filter_map(|(r, keep)| {
            if !keep {
                debug!(task = %r.name, "no java sources for task");
            }
            keep.then_some(r)
        })
        .collect())
}
