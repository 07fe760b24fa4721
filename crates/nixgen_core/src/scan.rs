//! Keyword scanning over `CMakeLists.txt` text.
//!
//! Feature predicates never parse CMake properly; they look for command names and, for `add_library`, the
//! type keywords inside the call's argument list. This module holds the small amount of lexical work that
//! requires: normalization and a tolerant `add_library(...)` call scanner.
//!
//! ## Notes
//! - All helpers expect text that already went through [`normalize`].
//! - Scanning is lenient: unterminated calls consume the rest of the text, quoting is ignored.

/// Normalize configuration text for case-insensitive matching.
///
/// ## Examples
/// ```rust
/// use nixgen_core::scan::normalize;
///
/// assert_eq!(normalize("ADD_Executable(App)"), "add_executable(app)");
/// ```
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Library type keyword found in an `add_library(...)` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryKind {
    Static,
    Shared,
    Module,
    Interface,
    Object,
    Imported,
    Alias,
}

impl LibraryKind {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "static" => Some(LibraryKind::Static),
            "shared" => Some(LibraryKind::Shared),
            "module" => Some(LibraryKind::Module),
            "interface" => Some(LibraryKind::Interface),
            "object" => Some(LibraryKind::Object),
            "imported" => Some(LibraryKind::Imported),
            "alias" => Some(LibraryKind::Alias),
            _ => None,
        }
    }
}

/// One `add_library(...)` call.
///
/// `kind` is `None` when the call names no type keyword, in which case CMake builds the library with its
/// default type (static unless the project flips `BUILD_SHARED_LIBS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDecl<'a> {
    pub name: Option<&'a str>,
    pub kind: Option<LibraryKind>,
}

impl LibraryDecl<'_> {
    /// Whether this call declares a library that the project itself compiles.
    pub fn is_built(&self) -> bool {
        !matches!(
            self.kind,
            Some(LibraryKind::Imported | LibraryKind::Alias | LibraryKind::Interface)
        )
    }
}

/// Offsets where `needle` occurs as a standalone command name (not glued to identifier characters, so
/// `my_add_library` is not `add_library`).
fn command_offsets<'t>(text: &'t str, needle: &'t str) -> impl Iterator<Item = usize> + 't {
    text.match_indices(needle).filter_map(move |(offset, _)| {
        let glued = text[..offset]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        let continues = text[offset + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if glued || continues { None } else { Some(offset) }
    })
}

/// Collect every `add_library(...)` call in normalized text, in source order.
///
/// ## Examples
/// ```rust
/// use nixgen_core::scan::{library_declarations, LibraryKind};
///
/// let decls = library_declarations("add_library(core static a.c)\nadd_library (plugin module p.c)");
/// assert_eq!(decls.len(), 2);
/// assert_eq!(decls[0].kind, Some(LibraryKind::Static));
/// assert_eq!(decls[1].name, Some("plugin"));
/// ```
pub fn library_declarations(text: &str) -> Vec<LibraryDecl<'_>> {
    let mut decls = Vec::new();

    for offset in command_offsets(text, "add_library") {
        let rest = text[offset + "add_library".len()..].trim_start();
        let Some(args) = rest.strip_prefix('(') else {
            continue;
        };
        let args = match args.find(')') {
            Some(end) => &args[..end],
            None => args,
        };

        let mut tokens = args.split_whitespace();
        let name = tokens.next();
        let kinds: Vec<LibraryKind> = tokens.filter_map(LibraryKind::from_token).collect();

        // IMPORTED and ALIAS change what the call means no matter which type keyword precedes them.
        let kind = if kinds.contains(&LibraryKind::Imported) {
            Some(LibraryKind::Imported)
        } else if kinds.contains(&LibraryKind::Alias) {
            Some(LibraryKind::Alias)
        } else {
            kinds.first().copied()
        };

        decls.push(LibraryDecl { name, kind });
    }

    decls
}
