//! Template substitution
//!
//! Expands a fixed, closed vocabulary of `${...}` placeholders against a
//! current-file / current-workspace context. Expansion repeats whole
//! passes until the text stops changing (a fixed point), so a placeholder
//! whose resolution produces further placeholders is handled without a
//! parse tree, and an unknown placeholder simply makes the pass a no-op.
//!
//! Resolution failures never abort a template: they are reported through
//! the notification sink and degrade to the `Unknown` sentinel.

pub mod matcher;

use regex::Regex;

use crate::actions::NotificationSink;
use crate::paths::{self, FileParts, SEPARATOR, UNKNOWN};
use crate::workspace::{WorkspaceFolder, WorkspaceRoots};

/// Read-only bundle the whole expansion resolves against. Built fresh per
/// expansion call, never cached across events.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionContext<'a> {
    pub roots: &'a WorkspaceRoots,
    pub current_file: Option<&'a str>,
}

impl<'a> SubstitutionContext<'a> {
    pub fn new(roots: &'a WorkspaceRoots, current_file: Option<&'a str>) -> Self {
        Self {
            roots,
            current_file,
        }
    }
}

/// Environment reads behind a seam so expansion is testable without
/// touching process state.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Production environment reader.
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderKind {
    PathSeparator,
    UserHome,
    Env,
    WorkspaceFolder,
    NamedWorkspaceFolder,
    WorkspaceFolderBasename,
    File,
    RelativeFile,
    FileBasename,
    FileBasenameNoExtension,
    FileExtname,
    FileDirname,
    RelativeFileDirname,
}

struct Placeholder {
    kind: PlaceholderKind,
    regex: Regex,
}

impl Placeholder {
    fn new(kind: PlaceholderKind, name_pattern: &str) -> Self {
        // Table patterns are fixed at compile time.
        let regex = matcher::placeholder_regex(name_pattern).expect("valid placeholder pattern");
        Self { kind, regex }
    }
}

pub struct SubstitutionEngine {
    table: Vec<Placeholder>,
    env: Box<dyn EnvSource>,
}

impl SubstitutionEngine {
    pub fn new(env: Box<dyn EnvSource>) -> Self {
        use PlaceholderKind::*;
        // Registration order is resolution order within a pass. It only
        // matters where one resolution feeds another (userHome -> env).
        let table = vec![
            Placeholder::new(PathSeparator, "pathSeparator"),
            Placeholder::new(UserHome, "userHome"),
            Placeholder::new(Env, "env:(.+?)"),
            Placeholder::new(WorkspaceFolder, "workspaceFolder"),
            Placeholder::new(NamedWorkspaceFolder, "workspaceFolder:(.+?)"),
            Placeholder::new(WorkspaceFolderBasename, "workspaceFolderBasename"),
            Placeholder::new(File, "file"),
            Placeholder::new(RelativeFile, "relativeFile"),
            Placeholder::new(FileBasename, "fileBasename"),
            Placeholder::new(FileBasenameNoExtension, "fileBasenameNoExtension"),
            Placeholder::new(FileExtname, "fileExtname"),
            Placeholder::new(FileDirname, "fileDirname"),
            Placeholder::new(RelativeFileDirname, "relativeFileDirname"),
        ];
        Self { table, env }
    }

    /// Expands `text` to its fixed point. Each pass rewrites every known
    /// placeholder once; the loop stops when a pass makes no progress or
    /// no opening token remains. `None` signals a hard failure and the
    /// caller must treat the result as "no message".
    pub fn expand(
        &self,
        text: &str,
        ctx: &SubstitutionContext<'_>,
        notifier: &dyn NotificationSink,
    ) -> Option<String> {
        let mut text = text.to_string();
        while text.contains("${") {
            let pass = self.expand_once(&text, ctx, notifier)?;
            if pass == text {
                break;
            }
            text = pass;
        }
        Some(text)
    }

    fn expand_once(
        &self,
        text: &str,
        ctx: &SubstitutionContext<'_>,
        notifier: &dyn NotificationSink,
    ) -> Option<String> {
        let parts = ctx
            .current_file
            .map(|file| self.file_parts(file, ctx, notifier));
        let mut result = text.to_string();
        for placeholder in &self.table {
            result = matcher::replace_all(&placeholder.regex, &result, |full, capture| {
                self.resolve(placeholder.kind, capture, ctx, parts.as_ref(), notifier)
                    .unwrap_or_else(|| full.to_string())
            });
        }
        Some(result)
    }

    /// `None` leaves the occurrence unexpanded for this pass (missing file
    /// context or underivable path component). Reported errors resolve to
    /// the sentinel instead.
    fn resolve(
        &self,
        kind: PlaceholderKind,
        capture: Option<&str>,
        ctx: &SubstitutionContext<'_>,
        parts: Option<&FileParts>,
        notifier: &dyn NotificationSink,
    ) -> Option<String> {
        use PlaceholderKind::*;
        match kind {
            PathSeparator => Some(SEPARATOR.to_string()),
            UserHome => {
                let template = if cfg!(windows) {
                    "${env:HOMEDRIVE}${env:HOMEPATH}"
                } else {
                    "${env:HOME}"
                };
                self.expand(template, ctx, notifier)
            }
            Env => Some(self.env.var(capture?).unwrap_or_default()),
            WorkspaceFolder => Some(self.folder_or_unknown(ctx, notifier, |w| w.root_path.clone())),
            NamedWorkspaceFolder => match ctx.roots.named(capture?) {
                Ok(folder) => Some(folder.root_path.clone()),
                Err(err) => {
                    notifier.error(&err.to_string());
                    Some(UNKNOWN.to_string())
                }
            },
            WorkspaceFolderBasename => {
                Some(self.folder_or_unknown(ctx, notifier, |w| w.basename().to_string()))
            }
            File => parts.map(|p| p.file.clone()),
            RelativeFile => parts.map(|p| p.relative_file.clone()),
            FileBasename => parts.and_then(|p| p.basename.clone()),
            FileBasenameNoExtension => parts.and_then(|p| p.basename_no_extension.clone()),
            FileExtname => parts.and_then(|p| p.extname.clone()),
            FileDirname => parts.and_then(|p| p.dirname.clone()),
            RelativeFileDirname => parts.and_then(|p| p.relative_dirname.clone()),
        }
    }

    fn folder_or_unknown(
        &self,
        ctx: &SubstitutionContext<'_>,
        notifier: &dyn NotificationSink,
        project: impl Fn(&WorkspaceFolder) -> String,
    ) -> String {
        match ctx.roots.folder_for(ctx.current_file) {
            Ok(folder) => project(folder),
            Err(err) => {
                notifier.error(&err.to_string());
                UNKNOWN.to_string()
            }
        }
    }

    fn file_parts(
        &self,
        file: &str,
        ctx: &SubstitutionContext<'_>,
        notifier: &dyn NotificationSink,
    ) -> FileParts {
        let relative = match ctx.roots.folder_for(Some(file)) {
            Ok(folder) => paths::relative_to(file, &folder.root_path),
            Err(err) => {
                notifier.error(&err.to_string());
                UNKNOWN.to_string()
            }
        };
        FileParts::derive(file, relative)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::workspace::WorkspaceFolder;

    #[derive(Default)]
    struct RecordingNotifier {
        infos: RefCell<Vec<String>>,
        errors: RefCell<Vec<String>>,
    }

    impl NotificationSink for RecordingNotifier {
        fn info(&self, message: &str) {
            self.infos.borrow_mut().push(message.to_string());
        }
        fn error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }
    }

    struct MapEnv(HashMap<String, String>);

    impl MapEnv {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl EnvSource for MapEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    fn engine(pairs: &[(&str, &str)]) -> SubstitutionEngine {
        SubstitutionEngine::new(Box::new(MapEnv::new(pairs)))
    }

    fn single_root() -> WorkspaceRoots {
        WorkspaceRoots::new(vec![WorkspaceFolder::new("ws", "/ws")])
    }

    #[test]
    fn literal_text_is_untouched() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("no placeholders here", &ctx, &notifier),
            Some("no placeholders here".to_string())
        );
        assert!(notifier.errors.borrow().is_empty());
    }

    #[test]
    fn unknown_placeholder_halts_without_looping() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("keep ${bogus} as is", &ctx, &notifier),
            Some("keep ${bogus} as is".to_string())
        );
    }

    #[test]
    fn env_placeholder() {
        let engine = engine(&[("GREETING", "hello")]);
        let roots = WorkspaceRoots::default();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${env:GREETING} world", &ctx, &notifier),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn unset_env_is_empty_string() {
        let engine = engine(&[]);
        let roots = WorkspaceRoots::default();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("[${env:NOT_SET}]", &ctx, &notifier),
            Some("[]".to_string())
        );
    }

    #[test]
    fn nested_env_reaches_fixed_point() {
        let engine = engine(&[("OUTER", "${env:INNER}!"), ("INNER", "deep")]);
        let roots = WorkspaceRoots::default();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${env:OUTER}", &ctx, &notifier),
            Some("deep!".to_string())
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn user_home_expands_through_env() {
        let engine = engine(&[("HOME", "/home/alice")]);
        let roots = WorkspaceRoots::default();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${userHome}/bin", &ctx, &notifier),
            Some("/home/alice/bin".to_string())
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn path_separator_constant() {
        let engine = engine(&[]);
        let roots = WorkspaceRoots::default();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("a${pathSeparator}b", &ctx, &notifier),
            Some("a/b".to_string())
        );
    }

    #[test]
    fn workspace_folder_single_root() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${workspaceFolder}", &ctx, &notifier),
            Some("/ws".to_string())
        );
    }

    #[test]
    fn workspace_folder_without_roots_reports_and_degrades() {
        let engine = engine(&[]);
        let roots = WorkspaceRoots::default();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${workspaceFolder}", &ctx, &notifier),
            Some(UNKNOWN.to_string())
        );
        assert_eq!(notifier.errors.borrow().as_slice(), ["No folder open"]);
    }

    #[test]
    fn workspace_folder_ambiguous_without_file_context() {
        let engine = engine(&[]);
        let roots = WorkspaceRoots::new(vec![
            WorkspaceFolder::new("A", "/a"),
            WorkspaceFolder::new("B", "/b"),
        ]);
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${workspaceFolder}", &ctx, &notifier),
            Some(UNKNOWN.to_string())
        );
        assert_eq!(
            notifier.errors.borrow().as_slice(),
            ["Use the name of the Workspace Folder"]
        );
    }

    #[test]
    fn workspace_folder_picks_root_containing_file() {
        let engine = engine(&[]);
        let roots = WorkspaceRoots::new(vec![
            WorkspaceFolder::new("A", "/a"),
            WorkspaceFolder::new("B", "/b"),
        ]);
        let ctx = SubstitutionContext::new(&roots, Some("/b/x.txt"));
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${workspaceFolder}", &ctx, &notifier),
            Some("/b".to_string())
        );
    }

    #[test]
    fn named_workspace_folder() {
        let engine = engine(&[]);
        let roots = WorkspaceRoots::new(vec![
            WorkspaceFolder::new("A", "/a"),
            WorkspaceFolder::new("B", "/b"),
        ]);
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${workspaceFolder:B}", &ctx, &notifier),
            Some("/b".to_string())
        );
        assert_eq!(
            engine.expand("${workspaceFolder:nope}", &ctx, &notifier),
            Some(UNKNOWN.to_string())
        );
        assert_eq!(
            notifier.errors.borrow().as_slice(),
            ["Workspace not found with name: nope"]
        );
    }

    #[test]
    fn file_placeholders_follow_decomposition() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, Some("/ws/src/app.test.js"));
        let notifier = RecordingNotifier::default();
        let template = "${relativeFile}|${fileBasename}|${fileBasenameNoExtension}|${fileExtname}|${fileDirname}|${relativeFileDirname}";
        assert_eq!(
            engine.expand(template, &ctx, &notifier),
            Some("src/app.test.js|app.test.js|app.test|.js|/ws/src|src".to_string())
        );
    }

    #[test]
    fn file_placeholders_without_context_stay_unexpanded() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, None);
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("x ${file} y", &ctx, &notifier),
            Some("x ${file} y".to_string())
        );
    }

    #[test]
    fn directory_placeholders_skipped_without_separator() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, Some("orphan.txt"));
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand("${file}:${relativeFile}:${fileBasename}", &ctx, &notifier),
            Some("orphan.txt:Unknown:${fileBasename}".to_string())
        );
    }

    #[test]
    fn end_to_end_change_message() {
        let engine = engine(&[]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, Some("/ws/a/b.txt"));
        let notifier = RecordingNotifier::default();
        assert_eq!(
            engine.expand(
                "Changed ${relativeFile} in ${workspaceFolderBasename}",
                &ctx,
                &notifier
            ),
            Some("Changed a/b.txt in ws".to_string())
        );
    }

    #[test]
    fn expansion_is_idempotent_at_fixed_point() {
        let engine = engine(&[("HOME", "/home/alice")]);
        let roots = single_root();
        let ctx = SubstitutionContext::new(&roots, Some("/ws/a/b.txt"));
        let notifier = RecordingNotifier::default();
        let once = engine
            .expand("done: ${relativeFile}", &ctx, &notifier)
            .unwrap();
        let twice = engine.expand(&once, &ctx, &notifier).unwrap();
        assert_eq!(once, twice);
    }
}
