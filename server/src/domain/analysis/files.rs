//! Code file collection for analysis submission
//!
//! Globs for code files under a target path, respects common ignore
//! patterns, and enforces size limits so payloads stay bounded.

use std::fs;
use std::path::Path;

use super::AnalysisError;
use super::types::AnalysisFile;
use crate::core::constants::{
    MAX_ANALYSIS_FILE_SIZE, MAX_ANALYSIS_FILES, MAX_ANALYSIS_TOTAL_SIZE,
};

const CODE_EXTENSIONS: &[&str] = &[
    "py", "ts", "tsx", "js", "jsx", "mjs", "cjs", "go", "java", "rs", "rb", "php", "kt", "kts",
    "swift", "scala", "cs", "cpp", "c", "h", "hpp", "lua", "ex", "exs", "clj", "zig", "nim", "r",
    "yaml", "yml", "toml", "json", "jsonc",
];

const IGNORE_DIRS: &[&str] = &[
    "node_modules",
    "__pycache__",
    "dist",
    "build",
    "venv",
    "env",
    "target",
    "out",
    "bin",
    "vendor",
    "coverage",
];

const IGNORE_FILES: &[&str] = &[
    ".env",
    ".env.local",
    ".env.production",
    ".env.development",
    "credentials.json",
    "secrets.yaml",
    "secrets.json",
    ".DS_Store",
    "Thumbs.db",
];

fn should_ignore_dir(name: &str) -> bool {
    name.starts_with('.') || IGNORE_DIRS.contains(&name)
}

fn should_ignore_file(name: &str) -> bool {
    IGNORE_FILES.contains(&name)
}

fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CODE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collect code files from a file or directory, bounded by
/// [`MAX_ANALYSIS_FILES`], [`MAX_ANALYSIS_FILE_SIZE`] and
/// [`MAX_ANALYSIS_TOTAL_SIZE`]. Unreadable entries are skipped.
pub fn read_code_files(target: &Path) -> Result<Vec<AnalysisFile>, AnalysisError> {
    if !target.exists() {
        return Err(AnalysisError::PathNotFound(target.display().to_string()));
    }

    let metadata = fs::metadata(target)
        .map_err(|e| AnalysisError::PathNotFound(format!("{}: {}", target.display(), e)))?;

    let mut files: Vec<AnalysisFile> = Vec::new();

    if metadata.is_file() {
        if metadata.len() > MAX_ANALYSIS_FILE_SIZE {
            return Err(AnalysisError::FileTooLarge {
                path: target.display().to_string(),
                size: metadata.len(),
                max: MAX_ANALYSIS_FILE_SIZE,
            });
        }
        let content = fs::read_to_string(target)
            .map_err(|e| AnalysisError::PathNotFound(format!("{}: {}", target.display(), e)))?;
        files.push(AnalysisFile {
            path: target.display().to_string(),
            content,
        });
    } else if metadata.is_dir() {
        let mut total_size = 0u64;
        walk_dir(target, target, &mut files, &mut total_size);
    }

    if files.is_empty() {
        return Err(AnalysisError::NoCodeFiles(target.display().to_string()));
    }

    Ok(files)
}

fn walk_dir(dir: &Path, base: &Path, files: &mut Vec<AnalysisFile>, total_size: &mut u64) {
    if files.len() >= MAX_ANALYSIS_FILES || *total_size >= MAX_ANALYSIS_TOTAL_SIZE {
        return;
    }

    // unreadable directories are skipped, not fatal
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        if files.len() >= MAX_ANALYSIS_FILES || *total_size >= MAX_ANALYSIS_TOTAL_SIZE {
            break;
        }

        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_ignore_dir(&name) {
                walk_dir(&path, base, files, total_size);
            }
        } else if file_type.is_file() {
            if should_ignore_file(&name) || !is_code_file(&path) {
                continue;
            }
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            if metadata.len() > MAX_ANALYSIS_FILE_SIZE {
                continue;
            }
            if *total_size + metadata.len() > MAX_ANALYSIS_TOTAL_SIZE {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let relative = path.strip_prefix(base).unwrap_or(&path);
            files.push(AnalysisFile {
                path: relative.display().to_string(),
                content,
            });
            *total_size += metadata.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collects_code_files_with_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.py", "import openai\n");
        write(dir.path(), "lib/client.ts", "export const x = 1;\n");
        write(dir.path(), "README.md", "# not code\n");

        let mut files = read_code_files(dir.path()).unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "lib/client.ts");
        assert_eq!(files[1].path, "main.py");
    }

    #[test]
    fn test_ignores_dependency_and_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.js", "const a = 1;\n");
        write(dir.path(), "node_modules/dep/index.js", "ignored\n");
        write(dir.path(), ".git/hooks/pre-commit.py", "ignored\n");
        write(dir.path(), "target/debug/build.rs", "ignored\n");

        let files = read_code_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "app.js");
    }

    #[test]
    fn test_ignores_secret_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", "x = 1\n");
        write(dir.path(), "credentials.json", "{}\n");

        let files = read_code_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "app.py");
    }

    #[test]
    fn test_oversized_file_skipped_in_directory_walk() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "small.py", "x = 1\n");
        let big = "a".repeat((MAX_ANALYSIS_FILE_SIZE + 1) as usize);
        write(dir.path(), "big.py", &big);

        let files = read_code_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "small.py");
    }

    #[test]
    fn test_single_file_too_large_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let big = "a".repeat((MAX_ANALYSIS_FILE_SIZE + 1) as usize);
        write(dir.path(), "big.py", &big);

        let err = read_code_files(&dir.path().join("big.py")).unwrap_err();
        assert!(matches!(err, AnalysisError::FileTooLarge { .. }));
    }

    #[test]
    fn test_single_file_target() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "only.rs", "fn main() {}\n");

        let files = read_code_files(&dir.path().join("only.rs")).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("only.rs"));
    }

    #[test]
    fn test_missing_path() {
        let err = read_code_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, AnalysisError::PathNotFound(_)));
    }

    #[test]
    fn test_no_code_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "plain text\n");
        let err = read_code_files(dir.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::NoCodeFiles(_)));
    }

    #[test]
    fn test_file_count_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..(MAX_ANALYSIS_FILES + 10) {
            write(dir.path(), &format!("f{:03}.py", i), "x = 1\n");
        }
        let files = read_code_files(dir.path()).unwrap();
        assert_eq!(files.len(), MAX_ANALYSIS_FILES);
    }
}
