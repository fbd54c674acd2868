//! C source writer.
//!
//! [`CFile`] accumulates a test file line by line; [`write_file`] puts the
//! result on disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Line-oriented buffer for one generated C file.
#[derive(Debug, Default)]
pub struct CFile {
    /// The text written so far.
    pub buf: String,
}

impl CFile {
    /// Starts a file with the standard two-line header naming the test.
    pub fn new(test_stem: &str, generator: &str) -> Self {
        let mut f = Self {
            buf: String::with_capacity(512),
        };
        f.comment(&format!("Test the `{test_stem}' ARM Neon intrinsic."));
        f.comment(&format!("This file was autogenerated by {generator}."));
        f.blank();
        f
    }

    /// Appends one line.
    pub fn line(&mut self, s: &str) {
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Appends a `/* ... */` comment in GNU style (two spaces before `*/`).
    pub fn comment(&mut self, text: &str) {
        self.line(&format!("/* {text}  */"));
    }

    /// Appends a DejaGnu directive: `/* { dg-<name> <args> } */`.
    pub fn directive(&mut self, name: &str, args: &str) {
        if args.is_empty() {
            self.line(&format!("/* {{ dg-{name} }} */"));
        } else {
            self.line(&format!("/* {{ dg-{name} {args} }} */"));
        }
    }

    /// Appends `#include "<header>"`.
    pub fn include(&mut self, header: &str) {
        self.line(&format!("#include \"{header}\""));
    }

    /// Returns the finished text.
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Writes `content` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if directories cannot be created or the file cannot be written.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_testsuite_style() {
        let f = CFile::new("vorns64", "neon-testgen");
        assert_eq!(
            f.finish(),
            "/* Test the `vorns64' ARM Neon intrinsic.  */\n\
             /* This file was autogenerated by neon-testgen.  */\n\n"
        );
    }

    #[test]
    fn directives_with_and_without_arguments() {
        let mut f = CFile::default();
        f.directive("do", "assemble");
        f.directive("final", "{ cleanup-saved-temps }");
        f.directive("bogus", "");
        assert_eq!(
            f.finish(),
            "/* { dg-do assemble } */\n\
             /* { dg-final { cleanup-saved-temps } } */\n\
             /* { dg-bogus } */\n"
        );
    }
}
