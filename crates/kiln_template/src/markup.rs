//! A minimal built-in template parser and generator.
//!
//! Templates are HTML-like markup. Top-level `<style>` and `<script>`
//! elements are lifted out as resources; everything else is the component's
//! markup and is exported as a string.

use std::path::Path;

use kiln_source::{extension_of, LineIndex};

use crate::error::TemplateError;
use crate::parser::{CompileConfig, Generated, ParsedTemplate, ResourceNode, TemplateParser, MODULE_FORMAT};

/// Parser option selecting whitespace handling of the exported markup.
const WHITESPACE_OPTION: &str = "whitespace";

/// Extracts style and script elements and exports the remaining markup.
///
/// Generated modules export `name`, `scope` and `template`, import external
/// scripts for their side effects, and import every configured helper the
/// markup calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkupParser;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Element {
    Style,
    Script,
}

impl Element {
    fn tag(self) -> &'static str {
        match self {
            Element::Style => "style",
            Element::Script => "script",
        }
    }
}

struct Attribute {
    name: String,
    value: Option<String>,
    offset: usize,
}

impl TemplateParser for MarkupParser {
    fn parse(
        &self,
        source: &str,
        file: &Path,
        _config: &CompileConfig,
        warn: &mut dyn FnMut(&str, usize),
    ) -> Result<ParsedTemplate, TemplateError> {
        let lower = source.to_ascii_lowercase();
        let mut parsed = ParsedTemplate::default();
        let mut pos = 0;

        while let Some((start, element)) = next_element(&lower, pos) {
            parsed.body.push_str(&source[pos..start]);
            let tag = element.tag();
            let attrs_start = start + 1 + tag.len();
            let Some(open_end) = lower[attrs_start..].find('>').map(|i| attrs_start + i) else {
                return Err(parse_error(source, file, start, format!("unterminated <{tag}> start tag")));
            };
            let self_closing = source[..open_end].ends_with('/');
            let attr_text = &source[attrs_start..if self_closing { open_end - 1 } else { open_end }];
            let attrs = parse_attributes(attr_text, attrs_start);

            let (content, after) = if self_closing {
                (String::new(), open_end + 1)
            } else {
                let closing = format!("</{tag}");
                let Some(close) = lower[open_end..].find(&closing).map(|i| open_end + i) else {
                    return Err(parse_error(source, file, start, format!("unclosed <{tag}> element")));
                };
                let after = lower[close..].find('>').map_or(source.len(), |i| close + i + 1);
                (source[open_end + 1..close].to_string(), after)
            };

            let node = match element {
                Element::Style => style_node(&attrs, content, warn),
                Element::Script => script_node(&attrs, content, warn),
            };
            match element {
                Element::Style => parsed.stylesheets.push(node),
                Element::Script => parsed.scripts.push(node),
            }
            pos = after;
        }
        parsed.body.push_str(&source[pos..]);
        Ok(parsed)
    }

    fn generate(&self, parsed: &ParsedTemplate, config: &CompileConfig) -> Result<Generated, TemplateError> {
        if config.module_format != MODULE_FORMAT {
            return Err(TemplateError::Generate {
                file: config.file.clone(),
                message: format!("unsupported module format '{}'", config.module_format),
            });
        }
        let quote = |text: &str| {
            serde_json::to_string(text).map_err(|e| TemplateError::Generate {
                file: config.file.clone(),
                message: e.to_string(),
            })
        };

        let markup = match config.options.get(WHITESPACE_OPTION).and_then(toml::Value::as_str) {
            Some("condense") => parsed.body.split_whitespace().collect::<Vec<_>>().join(" "),
            _ => parsed.body.trim().to_string(),
        };

        let mut code = String::new();
        for script in parsed.scripts.iter().filter(|s| !s.is_inline()) {
            if let Some(href) = &script.href {
                code.push_str(&format!("import {};\n", quote(href.as_str())?));
            }
        }
        for (name, path) in &config.helpers {
            if calls(&markup, name) {
                let from = path.to_string_lossy().replace('\\', "/");
                code.push_str(&format!("import {{ {name} }} from {};\n", quote(from.as_str())?));
            }
        }
        code.push_str(&format!("const template = {};\n", quote(markup.as_str())?));
        code.push_str(&format!("export const name = {};\n", quote(config.component_name.as_str())?));
        code.push_str(&format!("export const scope = {};\n", quote(config.scope.as_str())?));
        code.push_str("export default { name, scope, template };\n");
        Ok(Generated { code, map: None })
    }
}

fn style_node(attrs: &[Attribute], content: String, warn: &mut dyn FnMut(&str, usize)) -> ResourceNode {
    if let Some(attr) = find(attrs, "scoped") {
        warn("the `scoped` attribute is deprecated; component styles are always scoped", attr.offset);
    }
    let href = value(attrs, "href").or_else(|| value(attrs, "src"));
    let lang = value(attrs, "lang")
        .or_else(|| href.as_deref().map(Path::new).and_then(extension_of))
        .unwrap_or_else(|| "css".to_string());
    ResourceNode {
        content: href.is_none().then_some(content),
        href,
        lang,
    }
}

fn script_node(attrs: &[Attribute], content: String, warn: &mut dyn FnMut(&str, usize)) -> ResourceNode {
    if let Some(attr) = find(attrs, "language") {
        warn("the `language` attribute is deprecated; use `lang`", attr.offset);
    }
    let href = value(attrs, "src");
    let lang = value(attrs, "lang")
        .or_else(|| {
            value(attrs, "type").and_then(|t| match t.as_str() {
                "ts" | "text/typescript" | "application/typescript" => Some("ts".to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            href.as_deref()
                .map(Path::new)
                .and_then(extension_of)
                .filter(|ext| ext == "ts" || ext == "tsx")
        })
        .unwrap_or_else(|| "js".to_string());
    ResourceNode {
        content: href.is_none().then_some(content),
        href,
        lang,
    }
}

fn find<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.name == name)
}

fn value(attrs: &[Attribute], name: &str) -> Option<String> {
    find(attrs, name).and_then(|a| a.value.clone())
}

/// Finds the next `<style` or `<script` start tag at or after `from`.
fn next_element(lower: &str, from: usize) -> Option<(usize, Element)> {
    let mut pos = from;
    while let Some(i) = lower[pos..].find('<') {
        let start = pos + i;
        for element in [Element::Style, Element::Script] {
            let after = start + 1 + element.tag().len();
            if lower[start + 1..].starts_with(element.tag()) {
                match lower[after..].chars().next() {
                    Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/' => {
                        return Some((start, element));
                    }
                    _ => {}
                }
            }
        }
        pos = start + 1;
    }
    None
}

/// Parses `name`, `name=value`, `name="value"` and `name='value'` pairs.
/// `base` is the offset of `text` in the template.
fn parse_attributes(text: &str, base: usize) -> Vec<Attribute> {
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = text[start..i].to_ascii_lowercase();
        let mut value = None;
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            match bytes.get(i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let end = text[i + 1..].find(quote as char).map_or(text.len(), |e| i + 1 + e);
                    value = Some(text[i + 1..end].to_string());
                    i = (end + 1).min(text.len());
                }
                _ => {
                    let vstart = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    value = Some(text[vstart..i].to_string());
                }
            }
        }
        attrs.push(Attribute {
            name,
            value,
            offset: base + start,
        });
    }
    attrs
}

/// Returns `true` if `markup` contains a call `name(` not preceded by an
/// identifier character.
fn calls(markup: &str, name: &str) -> bool {
    let needle = format!("{name}(");
    markup.match_indices(&needle).any(|(i, _)| {
        markup[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
    })
}

fn parse_error(source: &str, file: &Path, offset: usize, message: String) -> TemplateError {
    TemplateError::Parse {
        file: file.to_path_buf(),
        message,
        location: LineIndex::new(source).locate(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config() -> CompileConfig {
        CompileConfig {
            file: PathBuf::from("/app/card.html"),
            module_format: MODULE_FORMAT.to_string(),
            scope: "sAbC".to_string(),
            component_name: "card".to_string(),
            helpers: BTreeMap::new(),
            options: toml::Table::new(),
        }
    }

    fn parse(source: &str) -> (ParsedTemplate, Vec<(String, usize)>) {
        let mut warnings = Vec::new();
        let parsed = MarkupParser
            .parse(source, Path::new("/app/card.html"), &config(), &mut |msg, offset| {
                warnings.push((msg.to_string(), offset))
            })
            .unwrap();
        (parsed, warnings)
    }

    #[test]
    fn extracts_resources_in_order() {
        let source = "<div>{{ title }}</div>\n<style lang=\"scss\">.a { color: $c; }</style>\n<link>\n<style href='theme.css'></style>\n<script lang=ts>export const n: number = 1;</script>\n<script src=\"./vendor.js\"></script>\n";
        let (parsed, warnings) = parse(source);
        assert!(warnings.is_empty());

        assert_eq!(
            parsed.stylesheets,
            vec![
                ResourceNode {
                    href: None,
                    content: Some(".a { color: $c; }".to_string()),
                    lang: "scss".to_string(),
                },
                ResourceNode {
                    href: Some("theme.css".to_string()),
                    content: None,
                    lang: "css".to_string(),
                },
            ]
        );
        assert_eq!(parsed.scripts.len(), 2);
        assert_eq!(parsed.scripts[0].lang, "ts");
        assert_eq!(parsed.scripts[0].content.as_deref(), Some("export const n: number = 1;"));
        assert_eq!(parsed.scripts[1].href.as_deref(), Some("./vendor.js"));
        assert_eq!(parsed.scripts[1].lang, "js");
        assert_eq!(parsed.body, "<div>{{ title }}</div>\n\n<link>\n\n\n\n");
    }

    #[test]
    fn uppercase_tags_and_type_attribute() {
        let (parsed, _) = parse("<SCRIPT type=\"text/typescript\">let a = 1;</SCRIPT><p>x</p>");
        assert_eq!(parsed.scripts[0].lang, "ts");
        assert_eq!(parsed.body, "<p>x</p>");
    }

    #[test]
    fn similar_tag_names_are_markup() {
        let (parsed, _) = parse("<styles></styles><scripted/>");
        assert!(parsed.stylesheets.is_empty());
        assert!(parsed.scripts.is_empty());
        assert_eq!(parsed.body, "<styles></styles><scripted/>");
    }

    #[test]
    fn self_closing_external_style() {
        let (parsed, _) = parse("<style src=\"./card.scss\" /><p/>");
        assert_eq!(parsed.stylesheets[0].href.as_deref(), Some("./card.scss"));
        assert_eq!(parsed.stylesheets[0].lang, "scss");
        assert_eq!(parsed.body, "<p/>");
    }

    #[test]
    fn deprecated_attributes_warn_at_offset() {
        let source = "<p/>\n<style scoped>.a{}</style><script language=\"js\"></script>";
        let (_, warnings) = parse(source);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].0.contains("scoped"));
        assert_eq!(warnings[0].1, source.find("scoped").unwrap());
        assert!(warnings[1].0.contains("language"));
        assert_eq!(warnings[1].1, source.find("language").unwrap());
    }

    #[test]
    fn unclosed_element_is_a_parse_error() {
        let err = MarkupParser
            .parse("<p/>\n  <style>.a{}", Path::new("card.html"), &config(), &mut |_, _| {})
            .unwrap_err();
        match err {
            TemplateError::Parse { message, location, .. } => {
                assert_eq!(message, "unclosed <style> element");
                assert_eq!(location.map(|l| (l.line, l.column)), Some((1, 2)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn generates_module() {
        let (parsed, _) = parse("<p>{{ fmt(date) }}</p><script src=\"./v.js\"></script>");
        let mut cfg = config();
        cfg.helpers.insert("fmt".to_string(), PathBuf::from("/app/helpers.js"));
        cfg.helpers.insert("unused".to_string(), PathBuf::from("/app/helpers.js"));
        let out = MarkupParser.generate(&parsed, &cfg).unwrap();
        assert_eq!(
            out.code,
            "import \"./v.js\";\n\
             import { fmt } from \"/app/helpers.js\";\n\
             const template = \"<p>{{ fmt(date) }}</p>\";\n\
             export const name = \"card\";\n\
             export const scope = \"sAbC\";\n\
             export default { name, scope, template };\n"
        );
        assert!(out.map.is_none());
    }

    #[test]
    fn condense_whitespace_option() {
        let (parsed, _) = parse("<p>\n  a\n  b\n</p>\n");
        let mut cfg = config();
        cfg.options
            .insert(WHITESPACE_OPTION.to_string(), toml::Value::String("condense".to_string()));
        let out = MarkupParser.generate(&parsed, &cfg).unwrap();
        assert!(out.code.contains("const template = \"<p> a b </p>\";"));
    }

    #[test]
    fn rejects_other_module_formats() {
        let mut cfg = config();
        cfg.module_format = "cjs".to_string();
        let err = MarkupParser.generate(&ParsedTemplate::default(), &cfg).unwrap_err();
        assert!(matches!(err, TemplateError::Generate { .. }));
    }

    #[test]
    fn helper_call_detection() {
        assert!(calls("{{ fmt(x) }}", "fmt"));
        assert!(!calls("{{ myfmt(x) }}", "fmt"));
        assert!(!calls("{{ obj.fmt(x) }}", "fmt"));
        assert!(!calls("{{ fmt }}", "fmt"));
    }
}
