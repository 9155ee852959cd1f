//! Template rendering and atomic file output.
//!
//! Templates are rendered with [`minijinja`] with auto-escaping off (the
//! output is Go source, not HTML). Block tags on their own line leave no
//! trace in the output.
//!
//! Writes go to a temporary file in the destination directory, which is then
//! renamed over the destination. A failed render or write never leaves a
//! partial file behind.

use crate::error::{Error, Result};
use log::debug;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Permission bits of generated files on Unix.
pub const FILE_MODE: u32 = 0o644;

/// Renders templates and writes the results atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateWriter;

impl TemplateWriter {
    /// Creates a writer.
    pub fn new() -> Self {
        Self
    }

    /// Renders `template_text` with `data` and returns the text.
    pub fn render<S: Serialize>(&self, name: &str, template_text: &str, data: S) -> Result<String> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        env.add_template(name, template_text)?;
        let tmpl = env.get_template(name)?;
        Ok(tmpl.render(data)?)
    }

    /// Renders `template_text` with `data` into `dest`.
    ///
    /// The template is rendered before anything touches the file system.
    pub fn render_to_file<S: Serialize>(
        &self,
        template_text: &str,
        data: S,
        dest: &Path,
    ) -> Result<()> {
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());
        let content = self.render(&name, template_text, data)?;
        write_atomic(&content, dest)
    }
}

/// Convenience wrapper around [`TemplateWriter::render_to_file`].
pub fn render<S: Serialize>(template_text: &str, data: S, dest: &Path) -> Result<()> {
    TemplateWriter::new().render_to_file(template_text, data, dest)
}

/// Replaces `path` with `content` atomically, creating parent directories.
pub fn write_atomic(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    if let Err(e) = tmp.write_all(content.as_bytes()).and_then(|_| tmp.flush()) {
        return Err(Error::io(tmp.path(), e));
    }
    set_file_mode(&tmp)?;

    // Dropping the temp file on any error above removes it.
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(unix)]
fn set_file_mode(tmp: &NamedTempFile) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(FILE_MODE))
        .map_err(|e| Error::io(tmp.path(), e))
}

#[cfg(not(unix))]
fn set_file_mode(_tmp: &NamedTempFile) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Greeting<'a> {
        name: &'a str,
        items: Vec<&'a str>,
    }

    #[test]
    fn test_render_keeps_go_syntax_and_trailing_newline() {
        let text = "func New{{ name }}() *{{ name }} {\n\treturn &{{ name }}{}\n}\n";
        let out = TemplateWriter::new()
            .render("t", text, Greeting { name: "UserController", items: vec![] })
            .unwrap();
        assert_eq!(
            out,
            "func NewUserController() *UserController {\n\treturn &UserController{}\n}\n"
        );
    }

    #[test]
    fn test_block_tags_leave_no_blank_lines() {
        let text = "a\n{% for item in items %}\n\t\"{{ item }}\"\n{% endfor %}\nb\n";
        let out = TemplateWriter::new()
            .render("t", text, Greeting { name: "", items: vec!["x", "<y>"] })
            .unwrap();
        assert_eq!(out, "a\n\t\"x\"\n\t\"<y>\"\nb\n");
    }

    #[test]
    fn test_render_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("internal/router/router.go");

        render("package {{ name }}\n", Greeting { name: "router", items: vec![] }, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "package router\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, FILE_MODE);
        }
    }

    #[test]
    fn test_failed_render_leaves_destination_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("router.go");
        fs::write(&dest, "original").unwrap();

        let result = render("{% for %}", Greeting { name: "x", items: vec![] }, &dest);

        assert!(matches!(result, Err(Error::Template(_))));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "original");
        let leftovers = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("user.go");
        fs::write(&dest, "old").unwrap();

        write_atomic("new", &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
