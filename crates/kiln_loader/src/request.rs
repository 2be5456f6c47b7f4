//! Classification of load requests.

use kiln_config::ResolvedOptions;
use kiln_source::{SubResource, VirtualId};

/// Extensions served by the stylesheet pipeline when requested directly.
const STYLESHEET_EXTENSIONS: &[&str] = &["css", "scss"];

/// What a module identifier asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// The compiled template module.
    Template,
    /// An inline script of a template.
    InlineScript {
        /// Position in the template's script list.
        index: usize,
    },
    /// An inline stylesheet of a template.
    InlineStyle {
        /// Scope token from the identifier.
        scope: Option<String>,
        /// Position in the template's style list; an identifier without an
        /// index addresses no inline style.
        index: Option<usize>,
    },
    /// A stylesheet file.
    Stylesheet {
        /// Scope token from the identifier; unscoped when absent.
        scope: Option<String>,
    },
}

impl Request {
    /// Classifies `id`, or returns `None` if the file type is not handled.
    pub fn classify(id: &VirtualId, options: &ResolvedOptions) -> Option<Self> {
        let ext = id.extension()?;
        if options.is_template_extension(&ext) {
            return Some(match &id.sub {
                None => Request::Template,
                Some(SubResource::Script { index }) => Request::InlineScript { index: *index },
                Some(SubResource::Stylesheet { scope, index }) => Request::InlineStyle {
                    scope: scope.clone(),
                    index: *index,
                },
            });
        }
        if is_stylesheet_extension(&ext) {
            let scope = match &id.sub {
                Some(SubResource::Stylesheet { scope, .. }) => scope.clone(),
                _ => None,
            };
            return Some(Request::Stylesheet { scope });
        }
        None
    }
}

/// Returns `true` for extensions the stylesheet pipeline serves.
pub fn is_stylesheet_extension(ext: &str) -> bool {
    STYLESHEET_EXTENSIONS.contains(&ext)
}
