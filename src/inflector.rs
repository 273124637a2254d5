//! Symbol name to relative source path inflection.

use crate::symbol::split_namespace;
use std::path::{MAIN_SEPARATOR, PathBuf};

pub const DEFAULT_NAMESPACE_SEPARATOR: &str = ".";
pub const DEFAULT_WORD_SEPARATOR: char = '_';
pub const DEFAULT_EXTENSION: &str = "svs";

/// Maps a symbol name onto the relative path of the file expected to define it.
///
/// Namespace segments become directories. Inside the leaf segment the word
/// separator also becomes a directory boundary, so `ns.Baz_Dib` maps to
/// `ns/Baz/Dib.svs`. Underscores in namespace segments are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflector {
    namespace_separator: String,
    word_separator: char,
    extension: String,
}

impl Default for Inflector {
    fn default() -> Self {
        Self {
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR.to_string(),
            word_separator: DEFAULT_WORD_SEPARATOR,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Inflector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace_separator(mut self, separator: impl Into<String>) -> Self {
        self.namespace_separator = separator.into();
        self
    }

    pub fn with_word_separator(mut self, separator: char) -> Self {
        self.word_separator = separator;
        self
    }

    /// Sets the source file extension, with or without a leading dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn namespace_separator(&self) -> &str {
        &self.namespace_separator
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Always inflects the full name; prefix matching never truncates it.
    pub fn to_relative_path(&self, name: &str) -> PathBuf {
        let mut file = String::with_capacity(name.len() + self.extension.len() + 1);
        let (namespace, leaf) = split_namespace(name, &self.namespace_separator);
        if let Some(namespace) = namespace {
            let separator = MAIN_SEPARATOR.to_string();
            file.push_str(&namespace.replace(self.namespace_separator.as_str(), &separator));
            file.push(MAIN_SEPARATOR);
        }
        file.extend(leaf.chars().map(|ch| {
            if ch == self.word_separator {
                MAIN_SEPARATOR
            } else {
                ch
            }
        }));
        if !self.extension.is_empty() {
            file.push('.');
            file.push_str(&self.extension);
        }
        PathBuf::from(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(path: &str) -> PathBuf {
        PathBuf::from(path.replace('/', &MAIN_SEPARATOR.to_string()))
    }

    #[test]
    fn inflects_names() {
        let inflector = Inflector::new().with_extension("ext");
        let cases = [
            ("Foo", "Foo.ext"),
            ("Foo_Bar", "Foo/Bar.ext"),
            ("foo.Bar", "foo/Bar.ext"),
            ("foo_bar.Baz", "foo_bar/Baz.ext"),
            ("ns.Baz_Dib", "ns/Baz/Dib.ext"),
            ("foo_bar.baz_dib.Zim_Gir", "foo_bar/baz_dib/Zim/Gir.ext"),
        ];
        for (name, expect) in cases {
            assert_eq!(inflector.to_relative_path(name), native(expect), "{name}");
        }
    }

    #[test]
    fn unqualified_names_have_no_directory() {
        let path = Inflector::new().to_relative_path("Widget");
        assert_eq!(path.parent(), Some(std::path::Path::new("")));
        assert_eq!(path, PathBuf::from("Widget.svs"));
    }

    #[test]
    fn backslash_namespaces() {
        let inflector = Inflector::new()
            .with_namespace_separator("\\")
            .with_extension(".php");
        assert_eq!(
            inflector.to_relative_path("Aura\\Autoload\\Loader_Test"),
            native("Aura/Autoload/Loader/Test.php")
        );
    }

    #[test]
    fn is_deterministic() {
        let inflector = Inflector::new();
        let first = inflector.to_relative_path("a.b.C_D");
        let second = inflector.to_relative_path("a.b.C_D");
        assert_eq!(first, second);
    }
}
