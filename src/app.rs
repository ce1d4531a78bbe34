use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use futures::channel::mpsc::UnboundedReceiver;

use crate::config::AppConfig;
use crate::error::{IndexError, LoaderError, StructuralError};
use crate::gfx::{GeometryParser, MeshParser, RenderEngine, Rgb};
use crate::loader::{AsyncLoader, Completion};
use crate::status::{self, StatusBar, StatusMessage, LONG_MESSAGE_MS, SHORT_MESSAGE_MS};
use crate::sync::{propagate, SceneSync};
use crate::tree::{Column, PartData, PartIndex, PartTree, TreeObserver};

/// The mutation context: owns the tree and turns user intents into tree
/// operations, render resyncs and status messages
///
/// Background loads only ever reach the tree through
/// [`PartViewApp::process_pending`] or [`PartViewApp::wait_for_loads`], both of
/// which run on the thread that owns the app.
pub struct PartViewApp<E: RenderEngine + 'static> {
    tree: PartTree,
    sync: Rc<RefCell<SceneSync<E>>>,
    loader: AsyncLoader,
    status: StatusBar,
    status_messages: UnboundedReceiver<StatusMessage>,
    selection: Option<PartIndex>,
}

impl<E: RenderEngine + 'static> PartViewApp<E> {
    /// Create an app around `engine`, decoding files with `parser`
    pub fn new(
        config: &AppConfig,
        engine: E,
        parser: Arc<dyn GeometryParser>,
    ) -> Result<Self, LoaderError> {
        let headers = &config.headers;
        let mut tree = PartTree::with_headers(&headers.part, &headers.visible, &headers.colour);

        let mut sync = SceneSync::new(engine);
        if config.show_floor {
            sync = sync.with_floor(config.floor_extent, config.floor_color);
        }
        let sync = Rc::new(RefCell::new(sync));
        tree.subscribe(sync.clone());

        let loader = AsyncLoader::new(parser, config.worker_count())?;
        let (status, status_messages) = status::status_channel();

        let mut app = Self {
            tree,
            sync,
            loader,
            status,
            status_messages,
            selection: None,
        };
        // Draw the floor (if any) before the first part arrives
        app.sync.borrow_mut().resync(&app.tree);
        Ok(app)
    }

    /// Create an app that decodes files with the built-in STL/OBJ parser
    pub fn with_engine(config: &AppConfig, engine: E) -> Result<Self, LoaderError> {
        Self::new(config, engine, Arc::new(MeshParser::new()))
    }

    pub fn tree(&self) -> &PartTree {
        &self.tree
    }

    pub fn engine(&self) -> Ref<'_, E> {
        Ref::map(self.sync.borrow(), |sync| sync.engine())
    }

    pub fn resync_count(&self) -> u64 {
        self.sync.borrow().resync_count()
    }

    /// Attach a view that mirrors the tree
    pub fn subscribe_view(&mut self, view: Rc<RefCell<dyn TreeObserver>>) {
        self.tree.subscribe(view);
    }

    /// Current selection, if it still refers to a live part
    pub fn selection(&self) -> Option<PartIndex> {
        self.selection.filter(|&index| self.tree.is_valid(index))
    }

    pub fn select(&mut self, index: PartIndex) -> Result<(), IndexError> {
        if !self.tree.is_valid(index) {
            return Err(IndexError::Stale);
        }
        let label = self.tree.try_part(index)?.label().to_string();
        self.selection = Some(index.sibling(Column::Label));
        self.status
            .show(format!("The selected item is: {label}"), SHORT_MESSAGE_MS);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Select the first part whose label contains `term`, ignoring case
    pub fn search(&mut self, term: &str) -> Option<PartIndex> {
        let found = self.tree.find(term);
        match found {
            Some(index) => {
                // Found indices are always live
                let _ = self.select(index);
            }
            None => log::info!("no part matches '{term}'"),
        }
        found
    }

    /// Append an empty group under `parent` (the root if `None`)
    ///
    /// Groups carry no geometry, so the render set is left alone.
    pub fn insert_group(&mut self, label: &str, parent: Option<PartIndex>) -> PartIndex {
        self.tree.insert_child(parent, PartData::new(label))
    }

    /// Rename `index` (if `name` is given) and push visibility and colour
    /// onto it and every descendant
    pub fn apply_properties(
        &mut self,
        index: PartIndex,
        name: Option<&str>,
        visible: bool,
        color: Rgb,
    ) -> Result<usize, StructuralError> {
        if !self.tree.is_valid(index) {
            return Err(IndexError::Stale.into());
        }
        if let Some(name) = name {
            self.tree.set_data(index.sibling(Column::Label), name.into());
        }
        let written = propagate(&mut self.tree, index, visible, color);
        self.flush();

        self.status
            .show("Item and its children updated.", SHORT_MESSAGE_MS);
        Ok(written)
    }

    /// Toggle one part's visibility; descendants keep theirs
    pub fn set_visible(&mut self, index: PartIndex, visible: bool) -> bool {
        let changed = self
            .tree
            .set_data(index.sibling(Column::Visible), visible.into());
        self.flush();
        changed
    }

    /// Recolour one part; descendants keep theirs
    pub fn set_color(&mut self, index: PartIndex, color: Rgb) -> bool {
        let changed = self.tree.set_data(index.sibling(Column::Color), color.into());
        self.flush();
        changed
    }

    /// Remove `index` and its subtree
    pub fn delete(&mut self, index: PartIndex) -> Result<(), StructuralError> {
        if index.node() == self.tree.root_key() {
            log::warn!("refusing to delete the root item");
            return Err(StructuralError::RootNotDeletable);
        }
        let Some(row) = self.tree.row(index) else {
            log::warn!("delete: index is stale");
            self.status.show("Error deleting item.", LONG_MESSAGE_MS);
            return Err(IndexError::Stale.into());
        };
        let parent = self.tree.parent_of(index);

        if !self.tree.remove_rows(parent, row, 1) {
            self.status.show("Error deleting item.", LONG_MESSAGE_MS);
            return Err(StructuralError::RowsOutOfRange {
                start: row,
                end: row + 1,
                count: self.tree.row_count(parent),
            });
        }
        self.flush();

        self.status.show("Item deleted successfully.", LONG_MESSAGE_MS);
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<(), StructuralError> {
        let index = self.selection().ok_or(StructuralError::NoSelection)?;
        self.delete(index)?;
        self.selection = None;
        Ok(())
    }

    /// Start loading each file in the background
    ///
    /// Results land under `target` (the root if `None`, or if `target` is gone
    /// by the time the load finishes).
    pub fn load_files<I, P>(&mut self, paths: I, target: Option<PartIndex>)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.loader.submit(path, target);
        }
    }

    /// Load into the current selection, like a file-open action would
    pub fn open_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let target = self.selection();
        self.load_files(paths, target);
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.outstanding()
    }

    /// Merge every load that has already finished; never blocks
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.loader.try_next_completion() {
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Block until every submitted load has been merged
    pub fn wait_for_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.loader.wait_next_completion() {
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Status messages queued since the last call
    pub fn drain_status(&mut self) -> Vec<StatusMessage> {
        status::drain(&mut self.status_messages)
    }

    fn apply_completion(&mut self, completion: Completion) {
        let Completion {
            path,
            target,
            outcome,
        } = completion;

        match outcome {
            Ok(node) => {
                let parent = target.filter(|&index| self.tree.is_valid(index));
                if target.is_some() && parent.is_none() {
                    log::debug!(
                        "target of {} was removed while loading, using the root",
                        path.display()
                    );
                }
                self.tree.insert_node(parent, node);
                self.flush();
                self.status.show(
                    format!("Loaded {} file: {}", format_name(&path), path.display()),
                    LONG_MESSAGE_MS,
                );
            }
            Err(err) => {
                log::warn!("load of {} failed: {err}", path.display());
                self.status.show(
                    format!("Failed to load {}: {err}", path.display()),
                    LONG_MESSAGE_MS,
                );
            }
        }
    }

    fn flush(&mut self) -> bool {
        self.sync.borrow_mut().flush(&self.tree)
    }
}

/// Upper-cased extension for status text (`STL`, `OBJ`), or `geometry`
fn format_name(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| "geometry".to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::GeometryLoadError;
    use crate::gfx::formats::stl;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::{ActorRegistry, RenderHandle};
    use crate::tree::{PartValue, TreeEvent, TreeEventLog};

    fn app() -> PartViewApp<ActorRegistry> {
        let config = AppConfig {
            loader_threads: 2,
            ..AppConfig::default()
        };
        PartViewApp::with_engine(&config, ActorRegistry::new()).unwrap()
    }

    fn write_cube(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, stl::to_binary_bytes(&generate_cube())).unwrap();
        path
    }

    #[test]
    fn test_load_group_delete_scenario() {
        let dir = TempDir::new().unwrap();
        let cube = write_cube(dir.path(), "cube.stl");
        let mut app = app();
        assert_eq!(app.tree().row_count(None), 0);

        app.load_files([&cube], None);
        assert_eq!(app.wait_for_loads(), 1);
        assert_eq!(app.tree().row_count(None), 1);
        assert_eq!(app.engine().active_count(), 1);

        let loaded = app.tree().child_at(None, 0).unwrap();
        assert_eq!(app.tree().data(loaded), PartValue::from("cube.stl"));

        let resyncs = app.resync_count();
        app.insert_group("Assembly", None);
        assert_eq!(app.tree().row_count(None), 2);
        assert_eq!(app.engine().active_count(), 1);
        assert_eq!(app.resync_count(), resyncs);

        app.delete(loaded).unwrap();
        assert_eq!(app.tree().row_count(None), 1);
        assert_eq!(app.engine().active_count(), 0);

        let texts: Vec<_> = app.drain_status().into_iter().map(|m| m.text).collect();
        assert_eq!(
            texts,
            vec![
                format!("Loaded STL file: {}", cube.display()),
                "Item deleted successfully.".to_string(),
            ]
        );
    }

    #[test]
    fn test_concurrent_loads_yield_two_parts() {
        let dir = TempDir::new().unwrap();
        let a = write_cube(dir.path(), "a.stl");
        let b = write_cube(dir.path(), "b.stl");
        let mut app = app();

        app.load_files([a, b], None);
        assert_eq!(app.pending_loads(), 2);
        assert_eq!(app.wait_for_loads(), 2);

        assert_eq!(app.tree().row_count(None), 2);
        assert_eq!(app.engine().active_count(), 2);
        let mut labels: Vec<_> = (0..2)
            .map(|row| app.tree().data(app.tree().child_at(None, row).unwrap()).to_string())
            .collect();
        labels.sort();
        assert_eq!(labels, ["a.stl", "b.stl"]);
    }

    /// Child count of the root and of every part, in pre-order
    fn row_counts(app: &PartViewApp<ActorRegistry>) -> Vec<usize> {
        let tree = app.tree();
        tree.walk(None)
            .into_iter()
            .map(|key| tree.row_count(tree.index_of(key)))
            .collect()
    }

    #[test]
    fn test_failed_loads_leave_tree_untouched() {
        let dir = TempDir::new().unwrap();
        let cube = write_cube(dir.path(), "cube.stl");
        let corrupt = dir.path().join("corrupt.stl");
        fs::write(&corrupt, b"\x01\x02 definitely not geometry").unwrap();
        let missing = dir.path().join("missing.stl");

        for path in [corrupt, missing] {
            let mut app = app();
            let group = app.insert_group("Assembly", None);
            app.insert_group("Fasteners", Some(group));
            app.load_files([&cube], Some(group));
            app.wait_for_loads();
            app.drain_status();

            let before = row_counts(&app);
            assert_eq!(before, vec![1, 2, 0, 0]);

            app.load_files([&path], Some(group));
            app.load_files([&path], None);
            assert_eq!(app.wait_for_loads(), 2);

            assert_eq!(row_counts(&app), before);
            assert_eq!(app.tree().len(), 3);
            assert_eq!(app.engine().active_count(), 1);

            let messages = app.drain_status();
            assert_eq!(messages.len(), 2);
            for message in &messages {
                assert!(message
                    .text
                    .starts_with(&format!("Failed to load {}", path.display())));
                assert_eq!(message.duration_ms, LONG_MESSAGE_MS);
            }
        }
    }

    struct PanickingParser;

    impl GeometryParser for PanickingParser {
        fn parse(&self, path: &Path) -> Result<RenderHandle, GeometryLoadError> {
            panic!("backend crashed on {}", path.display());
        }
    }

    #[test]
    fn test_parser_panic_reports_one_failure() {
        let config = AppConfig {
            loader_threads: 1,
            ..AppConfig::default()
        };
        let mut app =
            PartViewApp::new(&config, ActorRegistry::new(), Arc::new(PanickingParser)).unwrap();

        app.load_files(["broken.stl"], None);
        assert_eq!(app.wait_for_loads(), 1);
        assert_eq!(app.pending_loads(), 0);
        assert_eq!(app.tree().row_count(None), 0);

        let messages = app.drain_status();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.starts_with("Failed to load broken.stl"));
    }

    #[test]
    fn test_load_message_names_the_format() {
        let dir = TempDir::new().unwrap();
        let triangle = dir.path().join("triangle.obj");
        fs::write(&triangle, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mut app = app();

        app.load_files([&triangle], None);
        app.wait_for_loads();

        let messages = app.drain_status();
        assert_eq!(
            messages[0].text,
            format!("Loaded OBJ file: {}", triangle.display())
        );
        assert_eq!(format_name(Path::new("noext")), "geometry");
    }

    #[test]
    fn test_stale_target_falls_back_to_root() {
        let dir = TempDir::new().unwrap();
        let cube = write_cube(dir.path(), "cube.stl");
        let mut app = app();

        let group = app.insert_group("doomed", None);
        app.load_files([&cube], Some(group));
        app.delete(group).unwrap();
        app.wait_for_loads();

        assert_eq!(app.tree().row_count(None), 1);
        let part = app.tree().child_at(None, 0).unwrap();
        assert_eq!(app.tree().data(part), PartValue::from("cube.stl"));
        assert_eq!(app.engine().active_count(), 1);
    }

    #[test]
    fn test_open_files_targets_selection() {
        let dir = TempDir::new().unwrap();
        let cube = write_cube(dir.path(), "cube.stl");
        let mut app = app();

        let group = app.insert_group("Assembly", None);
        app.select(group).unwrap();
        app.open_files([&cube]);
        app.wait_for_loads();

        assert_eq!(app.tree().row_count(None), 1);
        assert_eq!(app.tree().row_count(Some(group)), 1);
    }

    #[test]
    fn test_delete_rejections() {
        let mut app = app();
        let root = PartIndex::new(app.tree().root_key(), Column::Label);
        assert_eq!(app.delete(root), Err(StructuralError::RootNotDeletable));
        assert_eq!(app.delete_selected(), Err(StructuralError::NoSelection));

        let group = app.insert_group("group", None);
        app.select(group).unwrap();
        app.delete_selected().unwrap();
        app.drain_status();
        assert_eq!(
            app.delete(group),
            Err(StructuralError::Index(IndexError::Stale))
        );
        assert_eq!(app.selection(), None);

        let messages = app.drain_status();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Error deleting item.");
        assert_eq!(messages[0].duration_ms, LONG_MESSAGE_MS);
    }

    #[test]
    fn test_apply_properties_renames_only_target() {
        let dir = TempDir::new().unwrap();
        let cube = write_cube(dir.path(), "cube.stl");
        let mut app = app();

        let group = app.insert_group("group", None);
        app.load_files([&cube], Some(group));
        app.wait_for_loads();
        app.drain_status();
        assert_eq!(app.engine().active_count(), 1);

        let grey = Rgb::new(10, 20, 30);
        let written = app
            .apply_properties(group, Some("renamed"), false, grey)
            .unwrap();
        assert_eq!(written, 2);

        let part = app.tree().child_at(Some(group), 0).unwrap();
        assert_eq!(app.tree().data(group), PartValue::from("renamed"));
        assert_eq!(app.tree().data(part), PartValue::from("cube.stl"));
        assert_eq!(
            app.tree().data(part.sibling(Column::Color)),
            PartValue::Color(grey)
        );
        assert_eq!(app.engine().active_count(), 0);

        let messages = app.drain_status();
        assert_eq!(messages[0].text, "Item and its children updated.");
        assert_eq!(messages[0].duration_ms, SHORT_MESSAGE_MS);

        assert!(app.set_visible(part, true));
        assert_eq!(app.engine().active_count(), 1);
        assert!(app.set_color(part, Rgb::WHITE));
        assert_eq!(app.engine().actors()[0].color(), Rgb::WHITE);
    }

    #[test]
    fn test_search_selects_and_echoes() {
        let mut app = app();
        let group = app.insert_group("Assembly", None);
        let bolt = app.insert_group("M6 Bolt", Some(group));

        assert_eq!(app.search("bolt"), Some(bolt));
        assert_eq!(app.selection(), Some(bolt));
        assert_eq!(app.search("washer"), None);

        let messages = app.drain_status();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "The selected item is: M6 Bolt");
    }

    #[test]
    fn test_view_sees_bracketed_events() {
        let mut app = app();
        let view = Rc::new(RefCell::new(TreeEventLog::new()));
        app.subscribe_view(view.clone());

        let group = app.insert_group("group", None);
        app.delete(group).unwrap();

        let events = view.borrow_mut().take();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], TreeEvent::RowsAboutToBeInserted { .. }));
        assert!(matches!(events[3], TreeEvent::RowsRemoved { .. }));
    }

    #[test]
    fn test_floor_is_drawn_from_the_start() {
        let config = AppConfig {
            loader_threads: 1,
            show_floor: true,
            ..AppConfig::default()
        };
        let app = PartViewApp::with_engine(&config, ActorRegistry::new()).unwrap();
        assert_eq!(app.engine().active_count(), 1);
        assert_eq!(app.engine().actors()[0].color(), Rgb::FLOOR_GREY);
    }
}
