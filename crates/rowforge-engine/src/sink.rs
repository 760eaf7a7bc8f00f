//! Ordered output delivery

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{EngineError, EngineResult};

/// Write capabilities of the host environment
///
/// The sink chain drives these in order until one succeeds. Implementations
/// must release any file handle on every exit path.
pub trait SaveHost {
    /// Write `bytes` as `name` inside a previously chosen directory
    fn write_to_directory(&self, dir: &Path, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Write `bytes` as `name` next to the template file
    fn write_beside_template(&self, template: &Path, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Last-resort save, e.g. into a downloads directory
    fn interactive_save(&self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// One delivery strategy in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// A directory the user chose for this run
    Directory,
    /// The directory containing the template file
    BesideTemplate,
    /// The host's interactive fallback
    Interactive,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SinkKind::Directory => "output directory",
            SinkKind::BesideTemplate => "template directory",
            SinkKind::Interactive => "interactive save",
        };
        f.write_str(label)
    }
}

/// The ordered delivery strategies for one run
///
/// Strategies are fixed in priority order: chosen output directory first,
/// then beside the template, then the host's interactive fallback. A sink
/// only participates when its prerequisite (a chosen directory, a known
/// template path) is present; failures demote to the next sink with a
/// warning.
#[derive(Debug, Clone, Default)]
pub struct SinkChain {
    output_dir: Option<PathBuf>,
    template_path: Option<PathBuf>,
}

impl SinkChain {
    /// Build the chain from the current configuration
    pub fn resolve(output_dir: Option<&Path>, template_path: Option<&Path>) -> Self {
        SinkChain {
            output_dir: output_dir.map(Path::to_path_buf),
            template_path: template_path.map(Path::to_path_buf),
        }
    }

    /// The strategies this chain will try, in order
    pub fn strategies(&self) -> Vec<SinkKind> {
        let mut kinds = Vec::new();
        if self.output_dir.is_some() {
            kinds.push(SinkKind::Directory);
        }
        if self.template_path.is_some() {
            kinds.push(SinkKind::BesideTemplate);
        }
        kinds.push(SinkKind::Interactive);
        kinds
    }

    /// Deliver one output through the chain
    ///
    /// Returns the sink that accepted the bytes. Fails only when the
    /// terminal interactive sink fails.
    pub fn deliver(&self, host: &dyn SaveHost, name: &str, bytes: &[u8]) -> EngineResult<SinkKind> {
        if let Some(dir) = &self.output_dir {
            match host.write_to_directory(dir, name, bytes) {
                Ok(()) => return Ok(SinkKind::Directory),
                Err(err) => {
                    warn!("Could not save '{}' to the output directory: {}", name, err);
                }
            }
        }

        if let Some(template) = &self.template_path {
            match host.write_beside_template(template, name, bytes) {
                Ok(()) => return Ok(SinkKind::BesideTemplate),
                Err(err) => {
                    warn!("Could not save '{}' beside the template: {}", name, err);
                }
            }
        }

        match host.interactive_save(name, bytes) {
            Ok(()) => Ok(SinkKind::Interactive),
            Err(err) => Err(EngineError::AllSinksFailed {
                name: name.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Filesystem implementation of [`SaveHost`]
///
/// The interactive fallback writes into a configured downloads directory.
#[derive(Debug, Clone)]
pub struct FsHost {
    downloads_dir: PathBuf,
}

impl FsHost {
    pub fn new<P: Into<PathBuf>>(downloads_dir: P) -> Self {
        FsHost {
            downloads_dir: downloads_dir.into(),
        }
    }
}

impl Default for FsHost {
    fn default() -> Self {
        FsHost::new(".")
    }
}

impl SaveHost for FsHost {
    fn write_to_directory(&self, dir: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
        write_bytes(&dir.join(name), bytes)
    }

    fn write_beside_template(&self, template: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
        let dir = match template.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        write_bytes(&dir.join(name), bytes)
    }

    fn interactive_save(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        write_bytes(&self.downloads_dir.join(name), bytes)
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Host whose sinks fail on demand, recording every attempt
    struct FlakyHost {
        fail_dir: bool,
        fail_beside: bool,
        fail_interactive: bool,
        attempts: RefCell<Vec<SinkKind>>,
    }

    impl FlakyHost {
        fn new(fail_dir: bool, fail_beside: bool, fail_interactive: bool) -> Self {
            FlakyHost {
                fail_dir,
                fail_beside,
                fail_interactive,
                attempts: RefCell::new(Vec::new()),
            }
        }

        fn outcome(&self, kind: SinkKind, fail: bool) -> io::Result<()> {
            self.attempts.borrow_mut().push(kind);
            if fail {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                Ok(())
            }
        }
    }

    impl SaveHost for FlakyHost {
        fn write_to_directory(&self, _dir: &Path, _name: &str, _bytes: &[u8]) -> io::Result<()> {
            self.outcome(SinkKind::Directory, self.fail_dir)
        }

        fn write_beside_template(
            &self,
            _template: &Path,
            _name: &str,
            _bytes: &[u8],
        ) -> io::Result<()> {
            self.outcome(SinkKind::BesideTemplate, self.fail_beside)
        }

        fn interactive_save(&self, _name: &str, _bytes: &[u8]) -> io::Result<()> {
            self.outcome(SinkKind::Interactive, self.fail_interactive)
        }
    }

    fn full_chain() -> SinkChain {
        SinkChain::resolve(Some(Path::new("/out")), Some(Path::new("/tpl/template.json")))
    }

    #[test]
    fn test_directory_sink_wins() {
        let host = FlakyHost::new(false, false, false);
        let kind = full_chain().deliver(&host, "a.xlsx", b"x").unwrap();
        assert_eq!(kind, SinkKind::Directory);
        assert_eq!(*host.attempts.borrow(), vec![SinkKind::Directory]);
    }

    #[test]
    fn test_failure_demotes_to_next_sink() {
        let host = FlakyHost::new(true, false, false);
        let kind = full_chain().deliver(&host, "a.xlsx", b"x").unwrap();
        assert_eq!(kind, SinkKind::BesideTemplate);
        assert_eq!(
            *host.attempts.borrow(),
            vec![SinkKind::Directory, SinkKind::BesideTemplate]
        );
    }

    #[test]
    fn test_terminal_failure_is_an_error() {
        let host = FlakyHost::new(true, true, true);
        let err = full_chain().deliver(&host, "a.xlsx", b"x").unwrap_err();
        assert!(matches!(err, EngineError::AllSinksFailed { .. }));
        assert_eq!(host.attempts.borrow().len(), 3);
    }

    #[test]
    fn test_absent_prerequisites_skip_sinks() {
        let host = FlakyHost::new(false, false, false);
        let chain = SinkChain::resolve(None, None);
        assert_eq!(chain.strategies(), vec![SinkKind::Interactive]);

        let kind = chain.deliver(&host, "a.xlsx", b"x").unwrap();
        assert_eq!(kind, SinkKind::Interactive);
        assert_eq!(*host.attempts.borrow(), vec![SinkKind::Interactive]);
    }

    #[test]
    fn test_fs_host_writes_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let host = FsHost::default();
        host.write_to_directory(dir.path(), "out.xlsx", b"content")
            .unwrap();
        assert_eq!(fs::read(dir.path().join("out.xlsx")).unwrap(), b"content");
    }

    #[test]
    fn test_fs_host_writes_beside_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.json");
        fs::write(&template, b"{}").unwrap();

        let host = FsHost::default();
        host.write_beside_template(&template, "out.xlsx", b"content")
            .unwrap();
        assert_eq!(fs::read(dir.path().join("out.xlsx")).unwrap(), b"content");
    }

    #[test]
    fn test_fs_host_interactive_uses_downloads_dir() {
        let dir = tempfile::tempdir().unwrap();
        let host = FsHost::new(dir.path());
        host.interactive_save("out.xlsx", b"content").unwrap();
        assert_eq!(fs::read(dir.path().join("out.xlsx")).unwrap(), b"content");
    }

    #[test]
    fn test_fs_host_reports_missing_directory() {
        let host = FsHost::default();
        let err = host
            .write_to_directory(Path::new("/no/such/dir"), "out.xlsx", b"x")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
