use std::collections::BTreeMap;
use std::path::{Component, Path};

use ms_core::{MsValue, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Conditional,
    Loop,
    Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeFrame {
    pub kind: ScopeKind,
    bindings: BTreeMap<String, MsValue>,
}

impl ScopeFrame {
    pub fn bindings(&self) -> &BTreeMap<String, MsValue> {
        &self.bindings
    }
}

/// Mutable state of one script run.
///
/// Top-level bindings live in the globals; each nested block the engine
/// enters pushes a [`ScopeFrame`], so `depth()` always equals the current
/// block nesting and is zero at top level. `X` carries whatever extra state
/// a dialect needs (queued INI edits, installed file lists, ...).
#[derive(Debug, Clone)]
pub struct InterpreterContext<X = ()> {
    case_insensitive: bool,
    globals: BTreeMap<String, MsValue>,
    scopes: Vec<ScopeFrame>,
    current_dir: String,
    warnings: Vec<Warning>,
    extension: X,
}

impl<X: Default> Default for InterpreterContext<X> {
    fn default() -> Self {
        Self::new(true, X::default())
    }
}

impl<X> InterpreterContext<X> {
    pub fn new(case_insensitive: bool, extension: X) -> Self {
        Self {
            case_insensitive,
            globals: BTreeMap::new(),
            scopes: Vec::new(),
            current_dir: String::new(),
            warnings: Vec::new(),
            extension,
        }
    }

    fn key(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&MsValue> {
        let key = self.key(name);
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(&key))
            .or_else(|| self.globals.get(&key))
    }

    /// Binds in the innermost scope, shadowing outer bindings of the name.
    pub fn bind(&mut self, name: &str, value: MsValue) {
        let key = self.key(name);
        match self.scopes.last_mut() {
            Some(frame) => frame.bindings.insert(key, value),
            None => self.globals.insert(key, value),
        };
    }

    /// Updates the nearest existing binding. Returns `false` when the name is
    /// not bound anywhere.
    pub fn rebind(&mut self, name: &str, value: MsValue) -> bool {
        let key = self.key(name);
        for frame in self.scopes.iter_mut().rev() {
            if let Some(slot) = frame.bindings.get_mut(&key) {
                *slot = value;
                return true;
            }
        }
        match self.globals.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(ScopeFrame {
            kind,
            bindings: BTreeMap::new(),
        });
    }

    pub fn pop_scope(&mut self) -> Option<ScopeFrame> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn scopes(&self) -> &[ScopeFrame] {
        &self.scopes
    }

    pub fn globals(&self) -> &BTreeMap<String, MsValue> {
        &self.globals
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    /// Moves the cursor; `path` is resolved against the current directory.
    pub fn set_current_dir(&mut self, path: &str) -> Result<(), String> {
        self.current_dir = normalize_path(&self.current_dir, path)?;
        Ok(())
    }

    pub fn resolve_path(&self, path: &str) -> Result<String, String> {
        normalize_path(&self.current_dir, path)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning::new(message));
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn extension(&self) -> &X {
        &self.extension
    }

    pub fn extension_mut(&mut self) -> &mut X {
        &mut self.extension
    }

    pub fn into_extension(self) -> X {
        self.extension
    }
}

fn is_plain_component(part: &str) -> bool {
    let mut components = Path::new(part).components();
    !part.contains(':')
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
}

fn is_separator(ch: char) -> bool {
    ch == '/' || ch == '\\'
}

/// Joins `path` onto `base` inside a virtual tree rooted at `""`.
///
/// Both `/` and `\` separate components, a leading separator restarts at the
/// root, `.` is dropped and `..` climbs. Climbing above the root, UNC
/// (`//server`) forms and drive or stream components (`C:`) are errors.
pub fn normalize_path(base: &str, path: &str) -> Result<String, String> {
    let mut leading = path.chars().take_while(|ch| is_separator(*ch));
    if leading.next().is_some() && leading.next().is_some() {
        return Err(format!("Path \"{}\" is not relative to the root directory.", path));
    }
    let is_rooted = path.starts_with('/') || path.starts_with('\\');
    let mut parts: Vec<&str> = if is_rooted {
        Vec::new()
    } else {
        base.split(is_separator)
            .filter(|part| !part.is_empty())
            .collect()
    };

    for part in path.split(is_separator) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(format!("Path \"{}\" escapes the root directory.", path));
                }
            }
            other if is_plain_component(other) => parts.push(other),
            other => {
                return Err(format!(
                    "Path \"{}\" contains the component \"{}\" which is not a plain name.",
                    path, other
                ))
            }
        }
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_binding_shadows_and_disappears_on_pop() {
        let mut context = InterpreterContext::new(true, ());
        context.bind("Target", MsValue::from("outer"));
        context.push_scope(ScopeKind::Conditional);
        context.bind("target", MsValue::from("inner"));
        assert_eq!(context.lookup("TARGET"), Some(&MsValue::from("inner")));
        context.pop_scope();
        assert_eq!(context.lookup("target"), Some(&MsValue::from("outer")));
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn globals_are_visible_in_nested_scopes() {
        let mut context = InterpreterContext::new(false, ());
        context.bind("count", MsValue::from(1.0));
        context.push_scope(ScopeKind::Loop);
        context.push_scope(ScopeKind::Block);
        assert_eq!(context.lookup("count"), Some(&MsValue::from(1.0)));
        assert_eq!(context.lookup("Count"), None);
        assert_eq!(context.depth(), 2);
    }

    #[test]
    fn rebind_updates_nearest_binding_only() {
        let mut context = InterpreterContext::new(true, ());
        context.bind("i", MsValue::from(0.0));
        context.push_scope(ScopeKind::Loop);
        assert!(context.rebind("i", MsValue::from(1.0)));
        assert!(!context.rebind("missing", MsValue::from(1.0)));
        context.pop_scope();
        assert_eq!(context.lookup("i"), Some(&MsValue::from(1.0)));
    }

    #[test]
    fn path_cursor_resolves_relative_paths() {
        let mut context = InterpreterContext::new(true, ());
        context.set_current_dir("optional\\textures").expect("cd");
        assert_eq!(context.current_dir(), "optional/textures");
        assert_eq!(context.resolve_path("hd/a.dds"), Ok("optional/textures/hd/a.dds".to_string()));
        assert_eq!(context.resolve_path("../b.dds"), Ok("optional/b.dds".to_string()));
        assert_eq!(context.resolve_path("/core/c.pak"), Ok("core/c.pak".to_string()));
    }

    #[test]
    fn path_cannot_escape_root() {
        assert!(normalize_path("", "../outside.txt").is_err());
        assert!(normalize_path("a", "../../x").is_err());
        assert_eq!(normalize_path("a", "./b/./c"), Ok("a/b/c".to_string()));
    }

    #[test]
    fn drive_and_unc_forms_are_not_inside_the_root() {
        for path in [
            "C:/Windows/System32/evil.dll",
            "Data/C:/x",
            "c:x",
            "file.pak:stream",
            "//server/share/x",
            "\\\\server\\share",
            "\\\\?\\C:\\x",
        ] {
            let error = normalize_path("", path).expect_err(path);
            assert!(error.contains(path), "{}", error);
        }
        assert_eq!(normalize_path("", "/Data/x.pak"), Ok("Data/x.pak".to_string()));
        assert_eq!(normalize_path("mods", "hd/x.pak"), Ok("mods/hd/x.pak".to_string()));
    }

    #[test]
    fn warnings_accumulate_in_order() {
        let mut context = InterpreterContext::new(true, ());
        context.warn("first");
        context.push_warning(Warning::new("second"));
        let messages = context
            .warnings()
            .iter()
            .map(|warning| warning.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
