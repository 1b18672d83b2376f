//! Engine client
//!
//! All queries and mutations go through AppleScript run by `osascript`;
//! imports go through the editor application via `open`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use km_actions::{ephemeral_macro_from, VirtualAction};
use km_config::EngineSettings;

use crate::error::EngineResult;
use crate::process::{ProcessRunner, SystemRunner};

/// Program used to hand import files to the editor
const OPEN_PROGRAM: &str = "/usr/bin/open";

/// What to do when the engine cannot be reached or a call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the error
    #[default]
    Raise,
    /// Log a warning and carry on with no result
    Warn,
}

/// Options for [`EngineClient::run_actions`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Variable whose value the macro returns
    pub return_variable: Option<String>,
    pub policy: ErrorPolicy,
}

/// Quote text as an AppleScript string literal
pub fn applescript_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Talks to the editor and engine applications
#[derive(Debug, Clone)]
pub struct EngineClient<R = SystemRunner> {
    runner: R,
    settings: EngineSettings,
}

impl EngineClient<SystemRunner> {
    /// Client launching real processes
    pub fn system(settings: EngineSettings) -> Self {
        Self::new(SystemRunner, settings)
    }
}

impl<R: ProcessRunner> EngineClient<R> {
    pub fn new(runner: R, settings: EngineSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run an AppleScript and return its trimmed output
    pub fn osascript(&self, script: &str) -> EngineResult<String> {
        let program = &self.settings.osascript;
        let output = self.runner.run(program, &["-"], Some(script))?.check(program)?;
        Ok(output.stdout.trim().to_string())
    }

    fn tell_editor(&self, body: &str) -> EngineResult<String> {
        let app = applescript_string(&self.settings.editor_app);
        self.osascript(&format!("tell application {app}\n{body}\nend tell\n"))
    }

    /// Create the macro group unless it exists
    pub fn ensure_group(&self, group: &str) -> EngineResult<()> {
        debug!("Ensuring macro group {}", group);
        let group = applescript_string(group);
        self.tell_editor(&format!(
            "if not (exists macro group {group}) then\n\
             make new macro group with properties {{name:{group}}}\n\
             end if"
        ))
        .map(drop)
    }

    /// Delete the macro group and everything in it, if it exists
    pub fn delete_group(&self, group: &str) -> EngineResult<()> {
        debug!("Deleting macro group {}", group);
        let group = applescript_string(group);
        self.tell_editor(&format!(
            "if exists macro group {group} then\n\
             delete macro group {group}\n\
             end if"
        ))
        .map(drop)
    }

    /// Hand a macros file to the editor without bringing it forward
    pub fn import_file(&self, path: &Path) -> EngineResult<()> {
        debug!("Importing {}", path.display());
        let program = PathBuf::from(OPEN_PROGRAM);
        let path = path.to_string_lossy();
        self.runner
            .run(&program, &["-g", "-a", &self.settings.editor_app, &path], None)?
            .check(&program)
            .map(drop)
    }

    /// Exported XML of a macro, or `None` while it does not exist
    pub fn macro_xml(&self, group: &str, name: &str) -> EngineResult<Option<String>> {
        let group = applescript_string(group);
        let name = applescript_string(name);
        let xml = self.tell_editor(&format!(
            "if exists macro {name} of macro group {group} then\n\
             return xml of macro {name} of macro group {group}\n\
             end if\n\
             return \"\""
        ))?;
        Ok(Some(xml).filter(|x| !x.is_empty()))
    }

    /// Delete one macro from a group, if it exists
    pub fn delete_macro(&self, group: &str, name: &str) -> EngineResult<()> {
        let group = applescript_string(group);
        let name = applescript_string(name);
        self.tell_editor(&format!(
            "if exists macro {name} of macro group {group} then\n\
             delete macro {name} of macro group {group}\n\
             end if"
        ))
        .map(drop)
    }

    /// Execute macro XML once in the engine and return its result text
    pub fn execute_xml(&self, xml: &str) -> EngineResult<String> {
        let app = applescript_string(&self.settings.engine_app);
        let xml = applescript_string(xml);
        self.osascript(&format!("tell application {app} to do script {xml}\n"))
    }

    /// Execute actions as an ephemeral macro
    ///
    /// Returns `None` when the policy downgraded a failure to a warning.
    pub fn run_actions(
        &self,
        actions: &[VirtualAction],
        options: &RunOptions,
    ) -> EngineResult<Option<String>> {
        let xml = ephemeral_macro_from(actions, options.return_variable.as_deref());
        match (self.execute_xml(&xml), options.policy) {
            (Ok(result), _) => Ok(Some(result)),
            (Err(e), ErrorPolicy::Warn) => {
                warn!("Engine call failed, continuing: {}", e);
                Ok(None)
            }
            (Err(e), ErrorPolicy::Raise) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::process::ProcessOutput;
    use std::cell::RefCell;

    /// Records scripts and replays canned outputs
    struct Scripted {
        scripts: RefCell<Vec<String>>,
        reply: ProcessOutput,
    }

    impl Scripted {
        fn new(reply: ProcessOutput) -> Self {
            Self {
                scripts: RefCell::new(Vec::new()),
                reply,
            }
        }
    }

    impl ProcessRunner for Scripted {
        fn run(&self, _: &Path, args: &[&str], stdin: Option<&str>) -> EngineResult<ProcessOutput> {
            self.scripts
                .borrow_mut()
                .push(stdin.map_or_else(|| args.join(" "), str::to_string));
            Ok(self.reply.clone())
        }
    }

    fn client(reply: ProcessOutput) -> EngineClient<Scripted> {
        EngineClient::new(Scripted::new(reply), EngineSettings::default())
    }

    #[test]
    fn test_applescript_quoting() {
        assert_eq!(applescript_string(r#"say "hi" \ bye"#), r#""say \"hi\" \\ bye""#);
    }

    #[test]
    fn test_ensure_group_script() {
        let client = client(ProcessOutput::ok(""));
        client.ensure_group("Scratch").unwrap();
        let scripts = client.runner().scripts.borrow();
        assert!(scripts[0].starts_with("tell application \"Keyboard Maestro\"\n"));
        assert!(scripts[0].contains("make new macro group with properties {name:\"Scratch\"}"));
    }

    #[test]
    fn test_missing_macro_is_none() {
        let client = client(ProcessOutput::ok("\n"));
        assert_eq!(client.macro_xml("Scratch", "case").unwrap(), None);
    }

    #[test]
    fn test_import_uses_open_in_background() {
        let client = client(ProcessOutput::ok(""));
        client.import_file(Path::new("/tmp/case.kmmacros")).unwrap();
        let scripts = client.runner().scripts.borrow();
        assert_eq!(scripts[0], "-g -a Keyboard Maestro /tmp/case.kmmacros");
    }

    #[test]
    fn test_execute_xml_escapes_quotes() {
        let client = client(ProcessOutput::ok("42\n"));
        let result = client.execute_xml("<?xml version=\"1.0\"?>").unwrap();
        assert_eq!(result, "42");
        let scripts = client.runner().scripts.borrow();
        assert!(scripts[0].contains(r#"do script "<?xml version=\"1.0\"?>""#));
        assert!(scripts[0].starts_with("tell application \"Keyboard Maestro Engine\""));
    }

    #[test]
    fn test_run_actions_policy() {
        let failing = client(ProcessOutput::failed(1, "engine not running"));
        let raise = failing.run_actions(&[], &RunOptions::default());
        assert!(matches!(raise, Err(EngineError::Failed { .. })));

        let warn = failing.run_actions(
            &[],
            &RunOptions {
                return_variable: Some("Out".into()),
                policy: ErrorPolicy::Warn,
            },
        );
        assert_eq!(warn.unwrap(), None);
    }
}
