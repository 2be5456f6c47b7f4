//! `kiln load` — resolve module identifiers one by one.

use std::error::Error;

use kiln_diagnostics::{Diagnostic, DiagnosticRenderer, TerminalRenderer};
use kiln_loader::{LoadResult, Session};
use serde::Serialize;

use crate::options::resolve_options;
use crate::{GlobalArgs, LoadArgs, ReportFormat};

/// One entry of the JSON report.
#[derive(Serialize)]
struct LoadedModule<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<LoadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct LoadReport<'a> {
    modules: Vec<LoadedModule<'a>>,
    diagnostics: Vec<Diagnostic>,
}

/// Runs the `kiln load` command.
///
/// Identifiers are loaded in order within one build pass, so a template
/// listed before its sub-resources makes them loadable. Returns exit code 1
/// if any load failed.
pub async fn run(args: &LoadArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let session = Session::new(resolve_options(global)?);
    session.build_start().await?;

    let mut modules = Vec::with_capacity(args.ids.len());
    for id in &args.ids {
        let module = match session.load(id).await {
            Ok(result) => LoadedModule {
                id,
                result,
                error: None,
            },
            Err(e) => LoadedModule {
                id,
                result: None,
                error: Some(e.to_string()),
            },
        };
        modules.push(module);
    }
    let failed = modules.iter().any(|m| m.error.is_some());
    let diagnostics = session.take_diagnostics();

    match args.format {
        ReportFormat::Text => print_text(&modules, &diagnostics, global),
        ReportFormat::Json => {
            let report = LoadReport { modules, diagnostics };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(if failed { 1 } else { 0 })
}

fn print_text(modules: &[LoadedModule<'_>], session_diagnostics: &[Diagnostic], global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for module in modules {
        match (&module.result, &module.error) {
            (_, Some(error)) => eprintln!("error: {}: {error}", module.id),
            (Some(result), None) => {
                println!("// {} ({})", module.id, result.loader);
                println!("{}", result.contents.trim_end());
                for diag in &result.diagnostics {
                    eprintln!("{}", render(&renderer, diag));
                }
            }
            (None, None) => {
                if !global.quiet {
                    eprintln!("    Skipped {} (not handled)", module.id);
                }
            }
        }
    }
    for diag in session_diagnostics {
        eprintln!("{}", render(&renderer, diag));
    }
}

/// Renders `diag`, quoting its source line when the file is readable.
pub fn render(renderer: &TerminalRenderer, diag: &Diagnostic) -> String {
    let source = diag
        .file
        .as_ref()
        .and_then(|file| std::fs::read_to_string(file).ok());
    renderer.render(diag, source.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn global(config: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(config.display().to_string()),
            root: None,
        }
    }

    fn project() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("kiln.toml");
        std::fs::write(&config, "[css]\nstrategy = \"attribute\"\n").unwrap();
        std::fs::write(
            dir.path().join("card.html"),
            "<p/>\n<style>.a{}</style>\n<script>export const x = 1;</script>\n",
        )
        .unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn loads_template_and_sub_resources() {
        let (dir, config) = project();
        let card = dir.path().join("card.html").display().to_string();
        let args = LoadArgs {
            ids: vec![
                card.clone(),
                format!("{card}?type=componentScript&i=0"),
                format!("{card}?type=componentStylesheet&i=0"),
            ],
            format: ReportFormat::Json,
        };
        assert_eq!(run(&args, &global(&config)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sub_resource_first_fails() {
        let (dir, config) = project();
        let card = dir.path().join("card.html").display().to_string();
        let args = LoadArgs {
            ids: vec![format!("{card}?type=componentScript&i=0")],
            format: ReportFormat::Text,
        };
        assert_eq!(run(&args, &global(&config)).await.unwrap(), 1);
    }

    #[test]
    fn report_omits_empty_fields() {
        let report = LoadReport {
            modules: vec![LoadedModule {
                id: "x.js",
                result: None,
                error: None,
            }],
            diagnostics: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["modules"][0], serde_json::json!({ "id": "x.js" }));
    }
}
