//! # Load Parts Demo
//!
//! Loads geometry files into a fresh part tree on background workers, then
//! prints the resulting hierarchy and scene statistics.
//!
//! ## Usage:
//! ```bash
//! cargo run --example load_parts -- [--config partview.toml] part.stl other.obj
//! ```

use anyhow::{bail, Context, Result};
use partview::prelude::*;

fn main() -> Result<()> {
    partview::logging::init();

    let mut args = std::env::args().skip(1).peekable();
    let config = if args.peek().map(String::as_str) == Some("--config") {
        args.next();
        let path = args.next().context("--config needs a file path")?;
        AppConfig::from_file(&path).with_context(|| format!("loading {path}"))?
    } else {
        AppConfig::default()
    };

    let files: Vec<String> = args.collect();
    if files.is_empty() {
        bail!("usage: load_parts [--config FILE] FILE...");
    }

    let mut app = PartViewApp::with_engine(&config, ActorRegistry::new())?;
    let group = app.insert_group("Loaded", None);
    app.load_files(&files, Some(group));
    app.wait_for_loads();

    for message in app.drain_status() {
        println!("[status] {}", message.text);
    }

    let tree = app.tree();
    println!(
        "{} | {} | {}",
        tree.header_data(Column::Label),
        tree.header_data(Column::Visible),
        tree.header_data(Column::Color)
    );
    print_subtree(tree, None, 0);

    let stats = app.engine().statistics();
    println!(
        "{} actors, {} triangles, {} vertices",
        stats.actor_count, stats.total_triangles, stats.total_vertices
    );
    if let Some(bounds) = stats.bounds {
        let size = bounds.size();
        println!("extent: {:.2} x {:.2} x {:.2}", size.x, size.y, size.z);
    }
    Ok(())
}

fn print_subtree(tree: &PartTree, parent: Option<PartIndex>, depth: usize) {
    for row in 0..tree.row_count(parent) {
        let Some(index) = tree.child_at(parent, row) else {
            continue;
        };
        println!(
            "{:indent$}{} | {} | {}",
            "",
            tree.data(index),
            tree.data(index.sibling(Column::Visible)),
            tree.data(index.sibling(Column::Color)),
            indent = depth * 2
        );
        print_subtree(tree, Some(index), depth + 1);
    }
}
