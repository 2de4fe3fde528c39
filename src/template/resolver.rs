//! Dotted-path variable resolution with loop-scoped shadow bindings.

use super::value::{Context, Value};

/// A view over the root [`Context`] plus any loop variables bound above it.
///
/// Binding a loop variable yields a new scope; the outer context is never
/// cloned or mutated. A binding is visible only to lookups made through the
/// scope that holds it.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    root: &'a Context,
    bindings: Vec<(&'a str, &'a Value)>,
}

impl<'a> Scope<'a> {
    /// Top-level scope over the caller's context.
    pub fn new(root: &'a Context) -> Self {
        Self {
            root,
            bindings: Vec::new(),
        }
    }

    /// Child scope binding `name` to `value`, shadowing any outer `name`.
    pub fn bind<'b>(&self, name: &'b str, value: &'b Value) -> Scope<'b>
    where
        'a: 'b,
    {
        let mut bindings: Vec<(&'b str, &'b Value)> = self.bindings.clone();
        bindings.push((name, value));
        Scope {
            root: self.root,
            bindings,
        }
    }

    /// Resolve a dotted path such as `commits.count`.
    ///
    /// Returns `None` when any segment is missing or when an intermediate
    /// value is not a map.
    pub fn resolve(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let mut current = self.lookup_head(head)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Resolve and render for interpolation; absent paths render as `""`.
    pub fn resolve_display(&self, path: &str) -> String {
        self.resolve(path).map(Value::to_string).unwrap_or_default()
    }

    /// Resolve and evaluate truthiness; absent paths are falsy.
    pub fn is_truthy(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(Value::is_truthy)
    }

    fn lookup_head(&self, head: &str) -> Option<&'a Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(name, _)| *name == head)
            .map(|(_, value)| *value)
            .or_else(|| self.root.get(head))
    }
}

/// Resolve `path` against `context` with no loop bindings.
pub fn resolve<'a>(context: &'a Context, path: &str) -> Option<&'a Value> {
    Scope::new(context).resolve(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Context {
        Context::new()
            .with("title", "Weekly")
            .with("commits", Context::new().with("count", 3))
            .with("items", vec![1, 2])
    }

    #[test]
    fn test_resolve_top_level() {
        let ctx = sample();
        assert_eq!(resolve(&ctx, "title"), Some(&Value::from("Weekly")));
    }

    #[test]
    fn test_resolve_nested_path() {
        let ctx = sample();
        assert_eq!(resolve(&ctx, "commits.count"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_resolve_missing_segment_is_absent() {
        let ctx = sample();
        assert_eq!(resolve(&ctx, "commits.missing"), None);
        assert_eq!(resolve(&ctx, "nope"), None);
    }

    #[test]
    fn test_resolve_through_non_map_is_absent() {
        let ctx = sample();
        assert_eq!(resolve(&ctx, "title.length"), None);
        assert_eq!(resolve(&ctx, "items.0"), None);
    }

    #[test]
    fn test_resolve_empty_path_is_absent() {
        let ctx = sample();
        assert_eq!(resolve(&ctx, ""), None);
    }

    #[test]
    fn test_binding_shadows_root_only_in_child() {
        let ctx = sample();
        let root = Scope::new(&ctx);
        let shadow = Value::from("shadowed");
        let child = root.bind("title", &shadow);

        assert_eq!(child.resolve_display("title"), "shadowed");
        assert_eq!(root.resolve_display("title"), "Weekly");
        assert_eq!(ctx.get("title"), Some(&Value::from("Weekly")));
    }

    #[test]
    fn test_nested_bindings_resolve_innermost_first() {
        let ctx = sample();
        let root = Scope::new(&ctx);
        let outer = Value::Map(Context::new().with("name", "outer"));
        let inner = Value::Map(Context::new().with("name", "inner"));
        let other = Value::Int(7);

        let s1 = root.bind("x", &outer);
        let s2 = s1.bind("y", &other);
        let s3 = s2.bind("x", &inner);

        assert_eq!(s3.resolve_display("x.name"), "inner");
        assert_eq!(s3.resolve_display("y"), "7");
        assert_eq!(s2.resolve_display("x.name"), "outer");
    }

    #[test]
    fn test_truthiness_through_scope() {
        let ctx = Context::new().with("flag", true).with("empty", "");
        let scope = Scope::new(&ctx);
        assert!(scope.is_truthy("flag"));
        assert!(!scope.is_truthy("empty"));
        assert!(!scope.is_truthy("absent"));
    }
}
