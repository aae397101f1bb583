use crate::error::Result;
use std::io::Write;

/// A compilation task and the raw javac arguments it was invoked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Task or target name as the build tool printed it.
    pub name: String,
    /// Unparsed argument string.
    pub args: String,
}

impl Record {
    pub fn new(name: impl Into<String>, args: impl Into<String>) -> Record {
        Record {
            name: name.into(),
            args: args.into(),
        }
    }

    /// Emit this record in text form: the name, then the arguments.
    fn emit(&self) -> String {
        format!("{}\n{}\n", self.name, self.args)
    }
}

/// Records in discovery order.
#[derive(Debug, Default)]
pub struct Report {
    pub records: Vec<Record>,
}

impl Report {
    /// Emit every record in text form.
    pub fn emit(&self) -> String {
        let mut s = String::new();
        for r in &self.records {
            s += &r.emit();
        }
        s
    }

    /// Emit this report to standard output.
    pub fn print(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(self.emit().as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
