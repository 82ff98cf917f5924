//! Placeholder expansion for command templates

use crate::matcher::FileCandidate;

/// Placeholder replaced by a file's stem (name without extension).
pub const FILENAME_TOKEN: &str = "${filename}";
/// Placeholder replaced by a file's absolute, symlink-resolved path.
pub const FILEPATH_TOKEN: &str = "${filepath}";

/// Expands recognized placeholders in a command template against one file.
///
/// The token strings are owned by the expander rather than read from module
/// globals at expansion time, so a stricter or differently-tokenized mode
/// can be constructed without touching the expansion logic.
#[derive(Debug, Clone)]
pub struct TokenExpander {
    filename_token: &'static str,
    filepath_token: &'static str,
}

impl Default for TokenExpander {
    fn default() -> Self {
        Self {
            filename_token: FILENAME_TOKEN,
            filepath_token: FILEPATH_TOKEN,
        }
    }
}

impl TokenExpander {
    /// Replace every occurrence of the recognized placeholders in each
    /// argument independently. An argument may contain zero, one, or many
    /// occurrences of either token. Unrecognized `${...}` tokens pass
    /// through untouched.
    ///
    /// Pure: same template and file always produce the same output.
    #[must_use]
    pub fn expand(&self, template: &[String], file: &FileCandidate) -> Vec<String> {
        let filepath = file.resolved.to_string_lossy();
        template
            .iter()
            .map(|arg| {
                arg.replace(self.filename_token, &file.stem)
                    .replace(self.filepath_token, &filepath)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn candidate(stem: &str, resolved: &str) -> FileCandidate {
        FileCandidate {
            path: PathBuf::from(format!("{stem}.txt")),
            stem: stem.to_string(),
            resolved: PathBuf::from(resolved),
        }
    }

    fn template(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_replaces_filename_and_filepath() {
        let expander = TokenExpander::default();
        let file = candidate("report", "/data/report.txt");
        let out = expander.expand(
            &template(&["convert", "${filepath}", "${filename}.png"]),
            &file,
        );
        assert_eq!(out, vec!["convert", "/data/report.txt", "report.png"]);
    }

    #[test]
    fn test_multiple_occurrences_in_one_argument() {
        let expander = TokenExpander::default();
        let file = candidate("a", "/d/a.txt");
        let out = expander.expand(&template(&["${filename}-${filename}:${filepath}"]), &file);
        assert_eq!(out, vec!["a-a:/d/a.txt"]);
    }

    #[test]
    fn test_unrecognized_tokens_pass_through() {
        let expander = TokenExpander::default();
        let file = candidate("a", "/d/a.txt");
        let out = expander.expand(&template(&["${output}", "${filename}"]), &file);
        assert_eq!(out, vec!["${output}", "a"]);
    }

    #[test]
    fn test_expansion_is_idempotent_without_placeholders() {
        let expander = TokenExpander::default();
        let file = candidate("a", "/d/a.txt");
        let once = expander.expand(&template(&["echo", "a", "/d/a.txt"]), &file);
        let twice = expander.expand(&once, &file);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_placeholders_unchanged() {
        let expander = TokenExpander::default();
        let file = candidate("a", "/d/a.txt");
        let args = template(&["gzip", "-k", "--best"]);
        assert_eq!(expander.expand(&args, &file), args);
    }
}
