use crate::config::{self, Config};
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

/// Run Gradle once per configured task and return the stdout of each run.
///
/// The project's wrapper is preferred over a `gradle` on the path. Parallel
/// execution is switched off since task output is paired by adjacency.
pub fn gradle(project: &Path, config: &config::Gradle) -> Result<Vec<String>> {
    let program = gradle_program(project);
    let mut outputs = Vec::new();
    for task in &config.tasks {
        info!(%task, project = %project.display(), "running gradle");
        let result = Command::new(&program)
            .args(gradle_args(task))
            .current_dir(project)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        check_status(&program, result.status);
        outputs.push(String::from_utf8_lossy(&result.stdout).into_owned());
    }
    Ok(outputs)
}

fn gradle_program(project: &Path) -> PathBuf {
    let wrapper = project.join("gradlew");
    if wrapper.is_file() {
        wrapper
    } else {
        PathBuf::from("gradle")
    }
}

fn gradle_args(task: &str) -> Vec<String> {
    ["--debug", "--no-build-cache", "--no-parallel", task]
        .iter()
        .map(|a| a.to_string())
        .collect()
}

/// Run `mvn clean install` on `project` with stdout going to a capture file
/// under the configured root, then read the capture back.
///
/// `parallel` builds with a thread per core; only formats that do not rely
/// on line adjacency should ask for it.
pub fn maven(project: &Path, config: &Config, parallel: bool) -> Result<String> {
    let path = capture_path(&config.root(), project)?;
    info!(
        project = %project.display(),
        capture = %path.display(),
        "running maven"
    );

    // a piped stdout can stall on very large builds, so write to a file
    let file = File::create(&path).map_err(|source| Error::File {
        path: path.clone(),
        source,
    })?;
    let status = Command::new("mvn")
        .args(maven_args(&config.maven.flags, parallel))
        .current_dir(project)
        .stdin(Stdio::null())
        .stdout(file)
        .status()
        .map_err(|source| Error::Spawn {
            program: "mvn".to_owned(),
            source,
        })?;
    check_status(Path::new("mvn"), status);

    let data = fs::read(&path).map_err(|source| Error::File {
        path: path.clone(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn maven_args(flags: &[String], parallel: bool) -> Vec<String> {
    let mut args = vec!["-X".to_owned(), "-e".to_owned()];
    if parallel {
        args.push("-T".to_owned());
        args.push("1C".to_owned());
    }
    args.push("clean".to_owned());
    args.push("install".to_owned());
    args.extend(flags.iter().cloned());
    args
}

/// Path of the capture file for `project`:
/// `<root>/build_outputs/<project name>/stdout_<commit>`.
///
/// The project directory is created if needed, but `build_outputs` itself
/// must already exist.
pub fn capture_path(root: &Path, project: &Path) -> Result<PathBuf> {
    let project = project.canonicalize().map_err(|source| Error::File {
        path: project.to_owned(),
        source,
    })?;
    let name = project
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "project".into());

    let dir = root.join("build_outputs").join(name);
    match fs::create_dir(&dir) {
        Ok(()) => debug!(dir = %dir.display(), "created capture directory"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(source) => return Err(Error::File { path: dir, source }),
    }

    let id = current_commit(&project).unwrap_or_else(|| {
        let id = uuid::Uuid::new_v4().simple().to_string();
        debug!(%id, "no commit found, using random capture id");
        id
    });
    Ok(dir.join(format!("stdout_{}", id)))
}

/// Abbreviated hash of the commit checked out in `project`.
pub fn current_commit(project: &Path) -> Option<String> {
    let result = Command::new("git")
        .args(["log", "-1", "--oneline"])
        .current_dir(project)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !result.status.success() {
        return None;
    }
    let out = String::from_utf8_lossy(&result.stdout);
    out.split_whitespace().next().map(|s| s.to_owned())
}

/// A failed build still leaves output worth scanning, so this only warns.
fn check_status(program: &Path, status: ExitStatus) {
    if !status.success() {
        warn!(
            program = %program.display(),
            %status,
            "build exited unsuccessfully, scanning its output anyway"
        );
    }
}
