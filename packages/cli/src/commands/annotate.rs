use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pinpoint_annotator::{try_annotate, AnnotateError, AnnotateOptions, Annotation};
use pinpoint_common::{FileSystem, RealFileSystem};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Source file or directory to annotate
    pub path: PathBuf,

    /// Attribute namespace (overrides attributePrefix from config)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Rewrite files in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

pub fn annotate(args: AnnotateArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let options = config.annotate_options(args.prefix.as_deref());
    let root = config.get_root_dir(cwd);
    let path = cwd.join(&args.path);

    if path.is_file() {
        let annotation = annotate_file(&path, &root, &options, args.write)?;
        if args.write {
            println!(
                "{} {} ({} elements)",
                "✓".green(),
                path.display(),
                annotation.elements.len()
            );
        } else {
            print!("{}", annotation.code);
        }
        return Ok(());
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let files = find_sources(&path, &config);
    if files.is_empty() {
        println!("{} No matching files in {}", "!".yellow(), path.display());
        return Ok(());
    }

    println!("{} {} files...", "Annotating".green().bold(), files.len());

    let mut failed = 0;
    for file in &files {
        match annotate_file(file, &root, &options, args.write) {
            Ok(annotation) => println!(
                "  {} {} ({} elements)",
                "✓".green(),
                file.display(),
                annotation.elements.len()
            ),
            Err(err) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), file.display(), err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be annotated", failed, files.len());
    }

    if !args.write {
        println!("{}", "Dry run, pass --write to rewrite files".dimmed());
    }
    Ok(())
}

/// Name recorded in element ids: the path relative to `root`, with `/`
/// separators, or the full path for files outside it
fn source_name(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Annotate one file, rewriting it when `write` is set
fn annotate_file(path: &Path, root: &Path, options: &AnnotateOptions, write: bool) -> Result<Annotation> {
    let source = std::fs::read_to_string(path)?;
    let name = source_name(path, root);
    let annotation = try_annotate(&source, &name, options).map_err(|err| match err {
        AnnotateError::Parse(failure) => anyhow::anyhow!(failure.message()),
        other => other.into(),
    })?;
    if write {
        write_if_changed(path, &source, &annotation.code)?;
    }
    Ok(annotation)
}

fn write_if_changed(path: &Path, before: &str, after: &str) -> Result<()> {
    if before != after {
        RealFileSystem.write(path, after)?;
    } else {
        tracing::debug!("{} already up to date", path.display());
    }
    Ok(())
}

/// Source files under `dir` whose extension is configured, sorted
fn find_sources(dir: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name.starts_with('.') || name == "node_modules")
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && config.matches_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sources_filters_extensions_and_skips_vendor_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/components")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::write(root.join("src/App.jsx"), "<App />").unwrap();
        std::fs::write(root.join("src/components/Card.tsx"), "<Card />").unwrap();
        std::fs::write(root.join("src/util.ts"), "export {}").unwrap();
        std::fs::write(root.join("node_modules/pkg/index.jsx"), "<x />").unwrap();

        let files = find_sources(root, &Config::default());

        assert_eq!(
            files,
            vec![root.join("src/App.jsx"), root.join("src/components/Card.tsx")]
        );
    }

    #[test]
    fn test_annotate_file_writes_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("App.jsx");
        std::fs::write(&path, "const App = () => <div className=\"a\">Hi</div>;\n").unwrap();

        let annotation = annotate_file(&path, dir.path(), &AnnotateOptions::default(), true).unwrap();

        assert_eq!(annotation.elements.len(), 1);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("data-pinpoint-element-id=\""));
        assert!(written.contains("data-pinpoint-static-content=\"true\""));

        // A second pass is a no-op
        annotate_file(&path, dir.path(), &AnnotateOptions::default(), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn test_ids_use_paths_relative_to_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let path = dir.path().join("src/Card.jsx");
        std::fs::write(&path, "const Card = () => <p>Hi</p>;\n").unwrap();

        let annotation = annotate_file(&path, dir.path(), &AnnotateOptions::default(), false).unwrap();

        assert_eq!(annotation.elements[0].location.file, "src/Card.jsx");
        assert!(annotation.elements[0].element_id.starts_with("src/Card.jsx:1:19_p"));
        assert!(annotation.code.contains("data-pinpoint-file=\"src/Card.jsx\""));
        assert!(!annotation.code.contains(&*dir.path().to_string_lossy()));
    }

    #[test]
    fn test_source_name_outside_root_keeps_full_path() {
        let name = source_name(Path::new("/elsewhere/App.jsx"), Path::new("/project"));
        assert_eq!(name, "/elsewhere/App.jsx");
        assert_eq!(source_name(Path::new("/project/./a/B.tsx"), Path::new("/project/.")), "a/B.tsx");
    }

    #[test]
    fn test_annotate_file_reports_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Broken.jsx");
        std::fs::write(&path, "const A = () => <div>;").unwrap();

        let err = annotate_file(&path, dir.path(), &AnnotateOptions::default(), true).unwrap_err();

        assert!(err.to_string().contains("Broken.jsx"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "const A = () => <div>;");
    }
}
