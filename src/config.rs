use crate::error::{Error, Result};
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

/// Capture root used when neither `ROOT` nor the config file names one.
pub const DEFAULT_ROOT: &str = "/tmp/javac-args";

/// Scraper configuration, read from an optional TOML file.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `build_outputs/`.
    pub root: Option<PathBuf>,
    /// Tasks whose name contains any of these are not reported.
    pub skip_tasks: Vec<String>,
    pub gradle: Gradle,
    pub maven: Maven,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            root: None,
            skip_tasks: vec!["compileTestFixturesJava".to_owned()],
            gradle: Gradle::default(),
            maven: Maven::default(),
        }
    }
}

impl Config {
    /// Where captured build output is stored. `ROOT` from the environment
    /// wins over the config file.
    pub fn root(&self) -> PathBuf {
        self.root_with(std::env::var_os("ROOT").map(PathBuf::from))
    }

    fn root_with(&self, env: Option<PathBuf>) -> PathBuf {
        env.or_else(|| self.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT))
    }
}

/// Gradle invocation settings.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Gradle {
    /// Tasks to run, each in its own build.
    pub tasks: Vec<String>,
}

impl Default for Gradle {
    fn default() -> Gradle {
        Gradle {
            tasks: vec!["classes".to_owned(), "testClasses".to_owned()],
        }
    }
}

/// Maven invocation settings.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Maven {
    /// Properties appended to `clean install` to skip everything but
    /// compilation.
    pub flags: Vec<String>,
}

impl Default for Maven {
    fn default() -> Maven {
        Maven {
            flags: [
                "-Dmaven.javadoc.skip=true",
                "-DskipTests",
                "-Dcheckstyle.skip=true",
                "-Drat.skip=true",
                "-Dcheckbugs.skip=true",
                "-Dspotbugs.skip=true",
                "-Denforcer.skip=true",
                "-Dmaven.checkstyle.skip=true",
                "-Dguice.with.jarjar=false",
                "-Dtidy.skip=true",
            ]
            .iter()
            .map(|f| f.to_string())
            .collect(),
        }
    }
}

/// Read the given file into a config.
pub fn read_config(path: &Path) -> Result<Config> {
    let data = std::fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_owned(),
        message: e.to_string(),
    })?;
    toml::from_str(&data).map_err(|e| Error::Config {
        path: path.to_owned(),
        message: e.to_string(),
    })
}
