//! File eligibility by name suffix.

use std::path::Path;

/// Recognized suffixes and conventional bare file names.
///
/// Matching is a plain suffix test on the whole path, so an entry also
/// matches any longer name ending with it (`notMakefile`, `a.b.terraform`).
pub const ELIGIBLE_SUFFIXES: &[&str] = &[
    ".asm", ".bat", ".bash", ".c", ".cc", ".cfg", ".clj", ".cljc", ".cljs", ".cmd",
    ".conf", ".cpp", ".cjs", ".cxx", ".dart", ".dockerfile", ".editorconfig", ".ejs",
    ".env", ".env.example", ".erb", ".erl", ".ex", ".exs", ".feature", ".go", ".gradle",
    ".groovy", ".h", ".hbs", ".hcl", ".hpp", ".hrl", ".htm", ".html", ".ini", ".java",
    ".js", ".json", ".jsonc", ".jsx", ".ksh", ".kt", ".kts", ".less", ".lisp", ".lsp",
    ".m", ".make", ".markdown", ".md", ".mk", ".mm", ".mjs", ".mustache", ".nomad",
    ".php", ".php5", ".plist", ".properties", ".ps1", ".psql", ".py", ".pyi", ".pyx",
    ".rb", ".rs", ".rst", ".s", ".sass", ".scala", ".scss", ".sh", ".spec.js",
    ".spec.ts", ".sql", ".swift", ".test.go", ".test.js", ".test.ts", ".tf", ".tfvars",
    ".toml", ".ts", ".tsx", ".tsv", ".twig", ".txt", ".xhtml", ".xml", ".yaml",
    ".yml", ".zsh", "Dockerfile", "Makefile", ".gitignore", ".gitattributes", ".terraform",
];

/// Check whether a file should be ingested.
///
/// Pure function of the path text; the filesystem is never consulted.
#[must_use]
pub fn is_eligible(path: &Path) -> bool {
    is_eligible_str(&path.to_string_lossy())
}

/// String form of [`is_eligible`].
#[must_use]
pub fn is_eligible_str(path: &str) -> bool {
    ELIGIBLE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert!(is_eligible(Path::new("src/main.go")));
        assert!(is_eligible(Path::new("app/models.py")));
        assert!(is_eligible(Path::new("src/lib.rs")));
        assert!(is_eligible(Path::new("web/index.tsx")));
        assert!(is_eligible(Path::new("README.md")));
        assert!(is_eligible(Path::new("deploy/values.yaml")));
    }

    #[test]
    fn test_bare_names() {
        assert!(is_eligible(Path::new("/repo/Makefile")));
        assert!(is_eligible(Path::new("/repo/docker/Dockerfile")));
        assert!(is_eligible(Path::new("/repo/.gitignore")));
        assert!(is_eligible(Path::new("/repo/.gitattributes")));
    }

    #[test]
    fn test_rejected() {
        assert!(!is_eligible(Path::new("logo.png")));
        assert!(!is_eligible(Path::new("archive.tar.gz")));
        assert!(!is_eligible(Path::new("LICENSE")));
        assert!(!is_eligible(Path::new("/repo/.git/HEAD")));
        assert!(!is_eligible(Path::new("Cargo.lock")));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!is_eligible(Path::new("MAIN.GO")));
        assert!(!is_eligible(Path::new("makefile")));
    }

    #[test]
    fn test_suffix_not_component_match() {
        // suffix semantics, not extension semantics
        assert!(is_eligible(Path::new("plan.old.terraform")));
        assert!(is_eligible(Path::new("notMakefile")));
        assert!(is_eligible(Path::new("settings.env")));
        assert!(!is_eligible(Path::new("foo.terraform.bak")));
    }

    #[test]
    fn test_independent_of_filesystem() {
        let path = "/definitely/not/present/handler.ts";
        assert_eq!(is_eligible_str(path), is_eligible_str(path));
        assert!(is_eligible_str(path));
    }
}
