//! Background geometry loading
//!
//! Parsing runs on a worker pool. A worker only ever builds a standalone
//! [`PartNode`]; it never sees the tree. The finished node travels back to the
//! mutation context as a [`Completion`] over an unbounded channel, and the
//! mutation context inserts it.
//!
//! There is no cancellation, timeout or retry: once submitted, a load runs to
//! success or failure.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::executor::{block_on, ThreadPool};
use futures::StreamExt;

use crate::error::{GeometryLoadError, LoaderError};
use crate::gfx::GeometryParser;
use crate::tree::{PartIndex, PartNode};

/// Result of one load, delivered to the mutation context
#[derive(Debug)]
pub struct Completion {
    pub path: PathBuf,
    /// Parent the load was aimed at; may be stale by the time it arrives
    pub target: Option<PartIndex>,
    pub outcome: Result<PartNode, GeometryLoadError>,
}

/// Submits geometry loads to worker threads and collects their results
pub struct AsyncLoader {
    pool: ThreadPool,
    parser: Arc<dyn GeometryParser>,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    outstanding: usize,
}

impl std::fmt::Debug for AsyncLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncLoader")
            .field("outstanding", &self.outstanding)
            .finish_non_exhaustive()
    }
}

impl AsyncLoader {
    /// Starts a pool of `workers` threads (at least one)
    pub fn new(parser: Arc<dyn GeometryParser>, workers: usize) -> Result<Self, LoaderError> {
        let pool = ThreadPool::builder()
            .pool_size(workers.max(1))
            .name_prefix("part-loader-")
            .create()?;
        let (sender, receiver) = mpsc::unbounded();

        Ok(Self {
            pool,
            parser,
            sender,
            receiver,
            outstanding: 0,
        })
    }

    /// Loads `path` in the background, aimed at `target` (the root if `None`)
    pub fn submit(&mut self, path: impl Into<PathBuf>, target: Option<PartIndex>) {
        let path = path.into();
        let parser = Arc::clone(&self.parser);
        let sender = self.sender.clone();

        log::debug!("submitting load of {}", path.display());
        self.outstanding += 1;

        self.pool.spawn_ok(async move {
            // A panicking parser still owes the mutation context a completion
            let parsed = panic::catch_unwind(AssertUnwindSafe(|| parser.parse(&path)))
                .unwrap_or_else(|_| {
                    Err(GeometryLoadError::ParserPanicked { path: path.clone() })
                });
            let outcome = parsed.map(|handle| PartNode::loaded(file_label(&path), handle));
            // The receiver only goes away with the loader itself
            let _ = sender.unbounded_send(Completion {
                path,
                target,
                outcome,
            });
        });
    }

    /// Loads submitted but not yet handed back
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Next finished load, if one is ready; never blocks
    pub fn try_next_completion(&mut self) -> Option<Completion> {
        match self.receiver.try_next() {
            Ok(Some(completion)) => {
                self.outstanding -= 1;
                Some(completion)
            }
            _ => None,
        }
    }

    /// Blocks until the next load finishes; `None` when nothing is outstanding
    pub fn wait_next_completion(&mut self) -> Option<Completion> {
        if self.outstanding == 0 {
            return None;
        }
        let completion = block_on(self.receiver.next())?;
        self.outstanding -= 1;
        Some(completion)
    }
}

/// Label for a loaded part: the file's base name
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::{MeshParser, RenderHandle};

    /// Parser that sleeps per file so completions arrive out of order
    struct SlowParser;

    impl GeometryParser for SlowParser {
        fn parse(&self, path: &Path) -> Result<RenderHandle, GeometryLoadError> {
            let millis: u64 = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            thread::sleep(Duration::from_millis(millis));
            Ok(RenderHandle::new(Arc::new(generate_cube())))
        }
    }

    struct PanickingParser;

    impl GeometryParser for PanickingParser {
        fn parse(&self, path: &Path) -> Result<RenderHandle, GeometryLoadError> {
            panic!("cannot decode {}", path.display());
        }
    }

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(Path::new("/models/cube.stl")), "cube.stl");
        assert_eq!(file_label(Path::new("part.obj")), "part.obj");
    }

    #[test]
    fn test_completions_arrive_independently() {
        let mut loader = AsyncLoader::new(Arc::new(SlowParser), 2).unwrap();
        loader.submit("200.stl", None);
        loader.submit("0.stl", None);
        assert_eq!(loader.outstanding(), 2);

        let first = loader.wait_next_completion().unwrap();
        assert_eq!(first.path, PathBuf::from("0.stl"));
        let node = first.outcome.unwrap();
        assert_eq!(node.label(), "0.stl");
        assert!(node.is_visible());
        assert!(node.render_handle().is_some());

        let second = loader.wait_next_completion().unwrap();
        assert_eq!(second.path, PathBuf::from("200.stl"));
        assert_eq!(loader.outstanding(), 0);
        assert!(loader.wait_next_completion().is_none());
        assert!(loader.try_next_completion().is_none());
    }

    #[test]
    fn test_failure_builds_no_node() {
        let mut loader = AsyncLoader::new(Arc::new(MeshParser), 1).unwrap();
        loader.submit("/no/such/file.stl", None);

        let completion = loader.wait_next_completion().unwrap();
        assert!(matches!(
            completion.outcome,
            Err(GeometryLoadError::Io { .. })
        ));
    }

    #[test]
    fn test_parser_panic_becomes_failure() {
        let mut loader = AsyncLoader::new(Arc::new(PanickingParser), 1).unwrap();
        loader.submit("x.stl", None);

        let completion = loader.wait_next_completion().unwrap();
        assert_eq!(completion.path, PathBuf::from("x.stl"));
        assert!(matches!(
            completion.outcome,
            Err(GeometryLoadError::ParserPanicked { ref path }) if path == Path::new("x.stl")
        ));
        assert_eq!(loader.outstanding(), 0);

        // The worker pool survives and keeps serving loads
        loader.submit("y.stl", None);
        assert!(loader.wait_next_completion().unwrap().outcome.is_err());
    }
}
