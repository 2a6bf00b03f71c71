//! `outline`: navigation list for a rendered document.

use tracing::{info, warn};

use crate::cli::args::{OutlineArgs, OutlineFormat};
use crate::config::NavConfig;
use crate::error::{DocumentError, Result};
use crate::nav::NavigationBuilder;
use crate::page::{HtmlDocument, PageModel, render_nav_items};

// Geometry is irrelevant to building the list; any layout will do.
const OUTLINE_VIEWPORT: f64 = 800.0;
const OUTLINE_SECTION_HEIGHT: f64 = 400.0;

/// Builds and prints the navigation list for `args.document`.
///
/// # Errors
///
/// Returns an error if the document cannot be read or tokenised.
pub fn run(args: &OutlineArgs, settings: &NavConfig) -> Result<()> {
    let html = std::fs::read_to_string(&args.document).map_err(|source| DocumentError::Io {
        path: args.document.clone(),
        source,
    })?;
    let doc = HtmlDocument::parse(&html)?;

    let selectors = &settings.selectors;
    for (role, id) in [
        ("navigation container", &selectors.nav_container),
        ("back-to-top button", &selectors.back_to_top),
    ] {
        if !doc.has_element(id) {
            warn!(id = %id, "{role} not found in document");
        }
    }

    let mut page = PageModel::from_document(&doc, OUTLINE_VIEWPORT, OUTLINE_SECTION_HEIGHT, |_| None);
    let list = NavigationBuilder::new(&selectors.marker_class).build(&mut page);
    info!(
        document = %args.document.display(),
        marked = doc.marked(&selectors.marker_class).count(),
        entries = list.len(),
        "outline built"
    );

    match args.format {
        OutlineFormat::Human => {
            if list.is_empty() {
                println!("no navigable sections (marker class '{}')", selectors.marker_class);
            }
            for (i, entry) in list.iter().enumerate() {
                println!("{:>3}. {}  #{}", i + 1, entry.label(), entry.scroll_target_id());
            }
        }
        OutlineFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutlineFormat::Html => {
            print!("{}", render_nav_items(page.nav_items(), &settings.highlight.active_class));
        }
    }
    Ok(())
}
