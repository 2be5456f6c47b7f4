//! `kiln build` — repeated build passes over a set of templates.
//!
//! Each pass signals a build start, loads every template and then every
//! module its header imports, the way a bundler walks the graph. Cache
//! statistics are reported per pass, so a second pass over unchanged files
//! shows only hits.

use std::error::Error;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use kiln_diagnostics::{Diagnostic, DiagnosticCode, Severity, TerminalRenderer};
use kiln_loader::{LoadError, Loader, Session};

use crate::load::render;
use crate::options::resolve_options;
use crate::{BuildArgs, GlobalArgs};

/// Runs the `kiln build` command.
///
/// Files without a template extension are skipped with a warning. Returns
/// exit code 1 if any load failed in any pass.
pub async fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let session = Session::new(resolve_options(global)?);
    let cwd = std::env::current_dir()?;
    let files = template_files(&session, &cwd, &args.files);
    let renderer = TerminalRenderer::new(global.color);
    let mut failures = 0usize;

    for pass in 1..=args.passes {
        let started = Instant::now();
        let before = session.stats();
        if args.cold {
            session.clear_caches();
        }
        session.build_start().await?;
        if !global.quiet {
            eprintln!("   Building pass {pass}/{} ({} template(s))", args.passes, files.len());
        }

        let mut modules = 0usize;
        let mut diagnostics = Vec::new();
        for file in &files {
            match load_graph(&session, file, &mut diagnostics).await {
                Ok(count) => modules += count,
                Err(e) => {
                    diagnostics.push(
                        Diagnostic::error(DiagnosticCode::LOAD_FAILED, e.to_string()).in_file(file),
                    );
                    failures += 1;
                }
            }
        }
        diagnostics.extend(session.take_diagnostics());

        for diag in &diagnostics {
            eprintln!("{}", render(&renderer, diag));
        }
        let delta = session.stats().since(before);
        if !global.quiet {
            let warnings = diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .count();
            eprintln!(
                "   Finished pass {pass}: {modules} module(s), {} hit(s), {} miss(es), {warnings} warning(s) in {:.2?}",
                delta.hits,
                delta.misses,
                started.elapsed()
            );
        }
    }

    Ok(if failures > 0 { 1 } else { 0 })
}

/// Loads a template and every module its header imports. Returns the number
/// of modules produced.
async fn load_graph(
    session: &Session,
    template: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<usize, LoadError> {
    let Some(result) = session.load(&template.display().to_string()).await? else {
        return Ok(0);
    };
    diagnostics.extend(result.diagnostics);
    let mut modules = 1;
    if result.loader != Loader::Script {
        return Ok(modules);
    }

    for specifier in header_imports(&result.contents) {
        let id = resolve_specifier(template, &specifier);
        if let Some(sub) = session.load(&id).await? {
            diagnostics.extend(sub.diagnostics);
            modules += 1;
        }
    }
    Ok(modules)
}

/// Absolute paths of the `files` that carry a template extension.
fn template_files(session: &Session, cwd: &Path, files: &[String]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|f| normalize(&cwd.join(f)))
        .filter(|path| {
            let keep = session.options().is_template(path);
            if !keep {
                tracing::warn!(file = %path.display(), "skipping file without a template extension");
            }
            keep
        })
        .collect()
}

/// Extracts the specifiers of side-effect imports and star re-exports.
fn header_imports(code: &str) -> Vec<String> {
    code.lines()
        .filter_map(|line| {
            let rest = line
                .strip_prefix("import ")
                .or_else(|| line.strip_prefix("export * from "))?;
            let literal = rest.trim_end().strip_suffix(';')?;
            serde_json::from_str::<String>(literal).ok()
        })
        .collect()
}

/// Resolves a relative specifier against the importing template's directory,
/// keeping its parameters.
fn resolve_specifier(template: &Path, specifier: &str) -> String {
    let (path, query) = match specifier.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (specifier, None),
    };
    let path = Path::new(path);
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize(&template.parent().unwrap_or_else(|| Path::new(".")).join(path))
    };
    match query {
        Some(query) => format!("{}?{query}", resolved.display()),
        None => resolved.display().to_string(),
    }
}

/// Removes `.` components and folds `..` into the preceding component.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_specifiers() {
        let code = "export * from \"/p/a.html?type=componentScript&i=0\";\n\
                    import \"./a.scss?type=componentStylesheet&scope=s1\";\n\
                    import { fmt } from \"/p/helpers.js\";\n\
                    const template = \"<p/>\";\n";
        assert_eq!(
            header_imports(code),
            vec![
                "/p/a.html?type=componentScript&i=0",
                "./a.scss?type=componentStylesheet&scope=s1"
            ]
        );
    }

    #[test]
    fn specifiers_resolve_against_template_dir() {
        let template = Path::new("/p/components/card.html");
        assert_eq!(
            resolve_specifier(template, "./card.scss?type=componentStylesheet&scope=s1"),
            "/p/components/card.scss?type=componentStylesheet&scope=s1"
        );
        assert_eq!(
            resolve_specifier(template, "../theme.css"),
            "/p/theme.css"
        );
        assert_eq!(
            resolve_specifier(template, "/abs/x.css?type=componentStylesheet"),
            "/abs/x.css?type=componentStylesheet"
        );
    }

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }

    #[tokio::test]
    async fn second_pass_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kiln.toml"), "").unwrap();
        std::fs::write(dir.path().join("card.scss"), ".c { x: 1; }\n").unwrap();
        std::fs::write(
            dir.path().join("card.html"),
            "<p/>\n<style lang=\"scss\">.a{}</style>\n<style href=\"./card.scss\"></style>\n<script>export {};</script>\n",
        )
        .unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.path().join("kiln.toml").display().to_string()),
            root: None,
        };
        let session = Session::new(resolve_options(&global).unwrap());
        let template = dir.path().join("card.html");

        session.build_start().await.unwrap();
        let mut diagnostics = Vec::new();
        assert_eq!(load_graph(&session, &template, &mut diagnostics).await.unwrap(), 4);
        let first = session.stats();
        assert_eq!((first.hits, first.misses), (0, 3));

        session.build_start().await.unwrap();
        assert_eq!(load_graph(&session, &template, &mut diagnostics).await.unwrap(), 4);
        let second = session.stats().since(first);
        assert_eq!((second.hits, second.misses), (3, 0));
        assert!(diagnostics.is_empty());

        let args = BuildArgs {
            files: vec![template.display().to_string()],
            passes: 2,
            cold: false,
        };
        assert_eq!(run(&args, &global).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cold_passes_and_non_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kiln.toml"), "").unwrap();
        std::fs::write(dir.path().join("card.html"), "<p/>\n").unwrap();
        std::fs::write(dir.path().join("theme.css"), "h1 {}\n").unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.path().join("kiln.toml").display().to_string()),
            root: None,
        };
        let session = Session::new(resolve_options(&global).unwrap());
        let files = vec![
            dir.path().join("card.html").display().to_string(),
            dir.path().join("theme.css").display().to_string(),
        ];
        assert_eq!(
            template_files(&session, dir.path(), &files),
            vec![dir.path().join("card.html")]
        );

        let args = BuildArgs {
            files,
            passes: 2,
            cold: true,
        };
        assert_eq!(run(&args, &global).await.unwrap(), 0);
    }
}
