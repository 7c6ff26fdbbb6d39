//! Static table of unqualified standard-library call names to their owning
//! import path, consulted by the unqualified-call rewriter once a call site
//! has survived the local-declaration exclusion check.

use fnv::FnvHashMap;
use std::sync::OnceLock;

/// One resolvable call name: `ReadFile` is bare (resolves on its own),
/// `Get` needs the receiver package name (`http.Get`) to disambiguate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdlibEntry {
    pub package: &'static str,
    pub import_path: &'static str,
}

pub struct StdlibRegistry {
    bare: FnvHashMap<&'static str, Vec<StdlibEntry>>,
    qualified: FnvHashMap<(&'static str, &'static str), StdlibEntry>,
}

fn table() -> &'static StdlibRegistry {
    static TABLE: OnceLock<StdlibRegistry> = OnceLock::new();
    TABLE.get_or_init(StdlibRegistry::build)
}

impl StdlibRegistry {
    fn build() -> Self {
        let mut bare: FnvHashMap<&'static str, Vec<StdlibEntry>> = FnvHashMap::default();
        let mut qualified: FnvHashMap<(&'static str, &'static str), StdlibEntry> =
            FnvHashMap::default();

        let mut add_bare = |name: &'static str, package: &'static str, path: &'static str| {
            bare.entry(name).or_default().push(StdlibEntry {
                package,
                import_path: path,
            });
        };
        let mut add_qualified =
            |package: &'static str, name: &'static str, path: &'static str| {
                qualified.insert(
                    (package, name),
                    StdlibEntry {
                        package,
                        import_path: path,
                    },
                );
            };

        add_bare("ReadFile", "os", "os");
        add_bare("WriteFile", "os", "os");
        add_bare("Open", "os", "os");
        add_bare("Create", "os", "os");
        add_bare("Getenv", "os", "os");
        add_bare("Exit", "os", "os");
        add_bare("Println", "fmt", "fmt");
        add_bare("Printf", "fmt", "fmt");
        add_bare("Sprintf", "fmt", "fmt");
        add_bare("Errorf", "fmt", "fmt");
        add_bare("Sprint", "fmt", "fmt");
        add_bare("Join", "strings", "strings");
        add_bare("Split", "strings", "strings");
        add_bare("TrimSpace", "strings", "strings");
        add_bare("Contains", "strings", "strings");
        add_bare("Marshal", "json", "encoding/json");
        add_bare("Unmarshal", "json", "encoding/json");
        add_bare("Sort", "sort", "sort");
        add_bare("Now", "time", "time");

        add_qualified("http", "Get", "net/http");
        add_qualified("http", "Post", "net/http");
        add_qualified("http", "ListenAndServe", "net/http");
        add_qualified("json", "NewEncoder", "encoding/json");
        add_qualified("json", "NewDecoder", "encoding/json");
        add_qualified("strconv", "Itoa", "strconv");
        add_qualified("strconv", "Atoi", "strconv");
        add_qualified("filepath", "Join", "path/filepath");

        Self { bare, qualified }
    }

    /// Unqualified candidates for a bare call like `ReadFile(...)`. More
    /// than one entry means the call is ambiguous without a receiver.
    pub fn candidates(name: &str) -> &'static [StdlibEntry] {
        table()
            .bare
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolution for a receiver-qualified call like `http.Get(...)`.
    pub fn resolve_qualified(package: &str, name: &str) -> Option<&'static StdlibEntry> {
        table().qualified.iter().find_map(|((p, n), entry)| {
            if *p == package && *n == name {
                Some(entry)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_unambiguous_bare_call() {
        let candidates = StdlibRegistry::candidates("ReadFile");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].import_path, "os");
    }

    #[test]
    fn resolves_qualified_call() {
        let entry = StdlibRegistry::resolve_qualified("http", "Get").unwrap();
        assert_eq!(entry.import_path, "net/http");
    }

    #[test]
    fn unknown_call_has_no_candidates() {
        assert!(StdlibRegistry::candidates("FrobnicateWidget").is_empty());
    }
}
