//==================================================
// File: symbol.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Symbolic names used as load keys
// Objective: Provide SymbolName and namespace/leaf splitting
//==================================================

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// A hierarchical symbol identifier such as `Vendor.Package.Widget`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolName(String);

impl SymbolName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Splits at the last `separator`, returning the namespace portion (if any)
    /// and the leaf.
    pub fn split_namespace<'a>(&'a self, separator: &str) -> (Option<&'a str>, &'a str) {
        split_namespace(&self.0, separator)
    }
}

pub(crate) fn split_namespace<'a>(name: &'a str, separator: &str) -> (Option<&'a str>, &'a str) {
    if separator.is_empty() {
        return (None, name);
    }
    match name.rfind(separator) {
        Some(pos) => (Some(&name[..pos]), &name[pos + separator.len()..]),
        None => (None, name),
    }
}

impl From<String> for SymbolName {
    fn from(value: String) -> Self {
        SymbolName(value)
    }
}

impl From<&str> for SymbolName {
    fn from(value: &str) -> Self {
        SymbolName(value.to_string())
    }
}

impl From<SymbolName> for String {
    fn from(name: SymbolName) -> Self {
        name.0
    }
}

impl Deref for SymbolName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SymbolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SymbolName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_last_separator() {
        let name = SymbolName::from("Vendor.Package.Widget");
        assert_eq!(name.split_namespace("."), (Some("Vendor.Package"), "Widget"));
    }

    #[test]
    fn unqualified_name_has_no_namespace() {
        let name = SymbolName::from("Widget_Button");
        assert_eq!(name.split_namespace("."), (None, "Widget_Button"));
    }

    #[test]
    fn multi_char_separator() {
        assert_eq!(split_namespace("a::b::C", "::"), (Some("a::b"), "C"));
    }

    #[test]
    fn borrows_as_str_for_map_lookups() {
        let mut map = std::collections::HashMap::new();
        map.insert(SymbolName::from("pkg.Widget"), 1);
        assert_eq!(map.get("pkg.Widget"), Some(&1));
    }
}

//==================================================
// End of file
//==================================================
