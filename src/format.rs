use crate::error::{Error, Result};
use crate::report::Record;
use crate::scan;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Task description printed by Gradle around each `compileJava` task.
static GRADLE_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*'Compile Java for (.*)'")
        .expect("constant regex pattern is valid")
});

/// Maven's per-plugin banner, e.g.
/// `[INFO] --- maven-compiler-plugin:3.8.1:compile (default-compile) @ core ---`
static MAVEN_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*\[.*INFO.*\].* @ .*")
        .expect("constant regex pattern is valid")
});

static MAVEN_PROJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[INFO\] (?:---|>>>) .* \((.*)\) @ (\S+)")
        .expect("constant regex pattern is valid")
});

/// Gradle prefixes the javac argument list with this phrase.
const ARGS_MARKER: &str = "arguments:";

/// Width of the log level prefix on Maven debug output. This is the width of
/// `[INFO] `; the extra column of `[DEBUG] ` is whitespace and gets trimmed.
pub const GUTTER_WIDTH: usize = 7;

/// A log layout: which lines carry compiler arguments and how to recover the
/// task they belong to.
///
/// Every assumption about the text of one build tool's log lives in a single
/// implementation, so a change in the tool's output touches one variant.
pub trait LogFormat {
    /// Indices of the lines that announce a compiler invocation.
    fn scan(&self, lines: &[String]) -> Vec<usize>;

    /// Pull the record for the marker at `index`. `Ok(None)` means the marker
    /// turned out not to be a compiler invocation.
    fn extract(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<Option<Record>>;

    /// Whether records are recovered by pairing neighbouring lines, which only
    /// holds when the build tool does not interleave task output.
    fn serialized(&self) -> bool {
        true
    }
}

/// Known log layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// `gradle --debug`, arguments logged by `NormalizingJavaCompiler`.
    Gradle,
    /// Older Gradle logs where the task line directly precedes
    /// `Compiler arguments:`.
    GradleLegacy,
    /// `mvn -X`, one self-contained javac command line per line.
    Maven,
    /// `mvn -X`, arguments on the line after `Command line options:`.
    MavenOptions,
}

impl Format {
    pub fn build(self) -> Box<dyn LogFormat> {
        match self {
            Format::Gradle => Box::new(Gradle),
            Format::GradleLegacy => Box::new(GradleLegacy),
            Format::Maven => Box::new(MavenBlob::default()),
            Format::MavenOptions => Box::new(MavenOptions),
        }
    }
}

/// Run `format` over every marker in `lines`, dropping tasks whose name
/// contains one of the `skip` substrings.
pub fn extract_all(
    format: &mut dyn LogFormat,
    lines: &[String],
    skip: &[String],
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for index in format.scan(lines) {
        let Some(record) = format.extract(lines, index)? else {
            continue;
        };
        if let Some(pattern) =
            skip.iter().find(|s| record.name.contains(s.as_str()))
        {
            debug!(task = %record.name, %pattern, "skipping task");
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

pub struct Gradle;

impl LogFormat for Gradle {
    fn scan(&self, lines: &[String]) -> Vec<usize> {
        scan::find_markers(lines, &["NormalizingJavaCompiler"])
    }

    fn extract(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<Option<Record>> {
        // the compiler logs other messages under the same logger name
        if !lines[index].contains(ARGS_MARKER) {
            debug!(line = index + 1, "compiler log line without arguments");
            return Ok(None);
        }
        let name_line = scan::rfind(lines, index, |l| GRADLE_TASK.is_match(l))
            .ok_or(Error::MissingTaskName { line: index + 1 })?;
        let name = gradle_task_name(&lines[name_line])
            .ok_or(Error::MissingTaskName { line: index + 1 })?;
        let args = gradle_args(&lines[index], index)?;
        Ok(Some(Record::new(name, args)))
    }
}

pub struct GradleLegacy;

impl LogFormat for GradleLegacy {
    fn scan(&self, lines: &[String]) -> Vec<usize> {
        scan::find_markers(lines, &["Compiler arguments:"])
    }

    fn extract(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<Option<Record>> {
        let name = index
            .checked_sub(1)
            .and_then(|prev| gradle_task_name(&lines[prev]))
            .ok_or(Error::MissingTaskName { line: index + 1 })?;
        let args = gradle_args(&lines[index], index)?;
        Ok(Some(Record::new(name, args)))
    }
}

fn gradle_task_name(line: &str) -> Option<&str> {
    GRADLE_TASK
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Everything after `arguments:` and its separator.
fn gradle_args(line: &str, index: usize) -> Result<&str> {
    let at = line
        .find(ARGS_MARKER)
        .ok_or(Error::MissingArguments { line: index + 1 })?;
    let mut rest = line[at + ARGS_MARKER.len()..].chars();
    rest.next();
    Ok(rest.as_str().trim())
}

/// Drop the fixed-width log level prefix from a Maven line.
fn strip_gutter(line: &str, index: usize) -> Result<&str> {
    let len = line.chars().count();
    if len < GUTTER_WIDTH {
        return Err(Error::ShortLine {
            line: index + 1,
            width: GUTTER_WIDTH,
            len,
        });
    }
    let at = line
        .char_indices()
        .nth(GUTTER_WIDTH)
        .map_or(line.len(), |(at, _)| at);
    Ok(line[at..].trim())
}

/// Maven compiler plugin command lines, recognised by content alone. Maven
/// does not name the module on the same line, so blobs are numbered.
#[derive(Default)]
pub struct MavenBlob {
    count: usize,
}

impl LogFormat for MavenBlob {
    fn scan(&self, lines: &[String]) -> Vec<usize> {
        scan::find_markers(lines, &[" -d "])
            .into_iter()
            .filter(|&i| lines[i].contains("-parameters"))
            .collect()
    }

    fn extract(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<Option<Record>> {
        let args = strip_gutter(&lines[index], index)?;
        let name = blob_name(self.count);
        self.count += 1;
        Ok(Some(Record::new(name, args)))
    }

    fn serialized(&self) -> bool {
        false
    }
}

fn blob_name(n: usize) -> String {
    format!("blob {}", n)
}

/// Number blob records consecutively across several logs, each of which was
/// numbered from zero on its own.
pub fn renumber_blobs(records: &mut [Record]) {
    for (n, r) in records.iter_mut().enumerate() {
        r.name = blob_name(n);
    }
}

pub struct MavenOptions;

impl LogFormat for MavenOptions {
    fn scan(&self, lines: &[String]) -> Vec<usize> {
        scan::find_markers(lines, &["Command line options:"])
    }

    fn extract(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<Option<Record>> {
        let next = lines
            .get(index + 1)
            .ok_or(Error::MissingArguments { line: index + 1 })?;
        if !next.contains("-d") {
            debug!(line = index + 2, "options without an output directory");
            return Ok(None);
        }
        let args = strip_gutter(next, index + 1)?;

        let project = scan::rfind(lines, index, |l| MAVEN_PROJECT.is_match(l))
            .ok_or(Error::MissingTaskName { line: index + 1 })?;
        let text = lines[project].trim();
        let caps = MAVEN_PROJECT_NAME.captures(text).ok_or_else(|| {
            Error::MalformedProjectLine {
                line: project + 1,
                text: text.to_owned(),
            }
        })?;
        let name = format!("{} {}", &caps[1], &caps[2]);
        Ok(Some(Record::new(name, args)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn run(format: Format, text: &[&str]) -> Result<Vec<Record>> {
        let skip = vec!["compileTestFixturesJava".to_owned()];
        extract_all(format.build().as_mut(), &lines(text), &skip)
    }

    #[test]
    fn legacy_pairs_adjacent_lines() {
        let got = run(
            Format::GradleLegacy,
            &[
                "... 'Compile Java for core' ...",
                "Compiler arguments: -d out -parameters",
            ],
        )
        .unwrap();
        assert_eq!(got, vec![Record::new("core", "-d out -parameters")]);
    }

    #[test]
    fn legacy_needs_a_preceding_task_line() {
        let err = run(Format::GradleLegacy, &["Compiler arguments: -g"])
            .unwrap_err();
        assert!(matches!(err, Error::MissingTaskName { line: 1 }));

        let err =
            run(Format::GradleLegacy, &["noise", "Compiler arguments: -g"])
                .unwrap_err();
        assert!(matches!(err, Error::MissingTaskName { line: 2 }));
    }

    #[test]
    fn gradle_walks_back_to_task() {
        let got = run(
            Format::Gradle,
            &[
                "Build operation 'Compile Java for :core:compileJava' started",
                "[DEBUG] some unrelated line",
                "[DEBUG] [org.gradle.api.internal.tasks.compile.\
                 NormalizingJavaCompiler] Compiler arguments: -source 8 -g",
            ],
        )
        .unwrap();
        assert_eq!(got, vec![Record::new(":core:compileJava", "-source 8 -g")]);
    }

    #[test]
    fn gradle_fails_without_task_line() {
        let err = run(
            Format::Gradle,
            &["noise", "NormalizingJavaCompiler Compiler arguments: -g"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingTaskName { line: 2 }));
    }

    #[test]
    fn gradle_ignores_compiler_lines_without_arguments() {
        let got = run(
            Format::Gradle,
            &["'Compile Java for :a:compileJava'", "NormalizingJavaCompiler"],
        )
        .unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn gradle_keeps_arguments_next_to_other_compiler_messages() {
        let got = run(
            Format::Gradle,
            &[
                "Build operation 'Compile Java for :core:compileJava' started",
                "[DEBUG] [org.gradle.api.internal.tasks.compile.\
                 NormalizingJavaCompiler] Source files to be compiled:",
                "[DEBUG] [org.gradle.api.internal.tasks.compile.\
                 NormalizingJavaCompiler] Compiler arguments: -d /out -g",
                "[DEBUG] [org.gradle.api.internal.tasks.compile.\
                 NormalizingJavaCompiler] Ignoring compilation failure.",
            ],
        )
        .unwrap();
        assert_eq!(got, vec![Record::new(":core:compileJava", "-d /out -g")]);
    }

    #[test]
    fn legacy_fails_without_arguments() {
        let mut format = GradleLegacy;
        let lines = lines(&["'Compile Java for :a:compileJava'", "Compiler"]);
        let err = format.extract(&lines, 1).unwrap_err();
        assert!(matches!(err, Error::MissingArguments { line: 2 }));
    }

    #[test]
    fn renumbers_blobs_across_logs() {
        let mut records = vec![
            Record::new("blob 0", "-d /a"),
            Record::new("blob 0", "-d /b"),
            Record::new("blob 1", "-d /c"),
        ];
        renumber_blobs(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["blob 0", "blob 1", "blob 2"]);
        assert_eq!(records[2].args, "-d /c");
    }

    #[test]
    fn skips_test_fixture_tasks() {
        let got = run(
            Format::GradleLegacy,
            &[
                "'Compile Java for compileTestFixturesJava'",
                "Compiler arguments: -g",
            ],
        )
        .unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn maven_blobs_are_numbered() {
        let got = run(
            Format::Maven,
            &[
                "[DEBUG] -d /p/a/target/classes -parameters -g",
                "[DEBUG] -d without the other flag",
                "[INFO] -d /p/b/target/classes -parameters",
            ],
        )
        .unwrap();
        assert_eq!(
            got,
            vec![
                Record::new("blob 0", "-d /p/a/target/classes -parameters -g"),
                Record::new("blob 1", "-d /p/b/target/classes -parameters"),
            ]
        );
    }

    #[test]
    fn maven_options_names_execution_and_module() {
        let got = run(
            Format::MavenOptions,
            &[
                "[INFO] --- maven-compiler-plugin:3.8.1:compile \
                 (default-compile) @ guava ---",
                "[DEBUG] Command line options:",
                "[DEBUG] -d /src/guava/target/classes -parameters",
                "[DEBUG] Command line options:",
                "[DEBUG] -nowarn",
            ],
        )
        .unwrap();
        assert_eq!(
            got,
            vec![Record::new(
                "default-compile guava",
                "-d /src/guava/target/classes -parameters"
            )]
        );
    }

    #[test]
    fn maven_options_rejects_short_lines() {
        let err = run(
            Format::MavenOptions,
            &["[INFO] x (y) @ z", "Command line options:", "-d x"],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ShortLine {
                line: 3,
                width: GUTTER_WIDTH,
                len: 4
            }
        ));
    }

    #[test]
    fn maven_options_needs_a_project_line() {
        let err = run(
            Format::MavenOptions,
            &["Command line options:", "[DEBUG] -d out"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingTaskName { line: 1 }));

        let err = run(
            Format::MavenOptions,
            &[
                "[INFO] building @ somewhere",
                "Command line options:",
                "[DEBUG] -d out",
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedProjectLine { line: 1, .. }));
    }

    #[test]
    fn only_maven_blobs_tolerate_interleaving() {
        assert!(Format::Gradle.build().serialized());
        assert!(Format::GradleLegacy.build().serialized());
        assert!(Format::MavenOptions.build().serialized());
        assert!(!Format::Maven.build().serialized());
    }
}
