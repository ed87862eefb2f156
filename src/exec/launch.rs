// src/exec/launch.rs

//! What to run: program + arguments for the supervised child.

use std::fmt;
use std::path::{Path, PathBuf};

/// Program and arguments used to launch the supervised child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build the launch spec for a target script.
    ///
    /// - An explicit `exec` interpreter wins: `exec target extra_args...`.
    /// - Otherwise the interpreter is inferred from the target's extension
    ///   (see [`infer_interpreter`]).
    /// - Otherwise the target is executed directly. A bare file name is
    ///   prefixed with `./` so it is not looked up on `PATH`.
    pub fn for_target(target: &Path, exec: Option<&str>, extra_args: &[String]) -> Self {
        let target_str = target.to_string_lossy().into_owned();

        let interpreter = exec
            .map(|s| s.trim().to_string())
            .or_else(|| infer_interpreter(target).map(str::to_string));

        match interpreter {
            Some(program) => {
                let mut args = Vec::with_capacity(extra_args.len() + 1);
                args.push(target_str);
                args.extend(extra_args.iter().cloned());
                Self::new(program, args)
            }
            None => {
                let program = if target.is_relative() && target.components().count() == 1 {
                    PathBuf::from(".").join(target).to_string_lossy().into_owned()
                } else {
                    target_str
                };
                Self::new(program, extra_args.to_vec())
            }
        }
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Interpreter conventionally used for a script, by extension.
pub fn infer_interpreter(target: &Path) -> Option<&'static str> {
    let ext = target.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "js" | "mjs" | "cjs" => Some("node"),
        "py" => Some("python3"),
        "sh" => Some("sh"),
        "rb" => Some("ruby"),
        _ => None,
    }
}
