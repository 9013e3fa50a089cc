//! Document compiler — turns rendered LaTeX into a PDF artifact.
//!
//! # Chain
//! 1. Prepare a fresh workspace (fails fast when the temp root is unwritable).
//! 2. Write the source, then try each configured compiler in order under the
//!    configured timeout. An attempt fails on spawn error, timeout, non-zero exit,
//!    or a missing/empty PDF.
//! 3. The first successful artifact is moved into the output directory.
//! 4. When every compiler failed, a minimal PDF is drawn directly instead, so a
//!    caller always gets an artifact unless the environment itself is broken.
//!
//! The workspace is closed on every normal exit path; its drop guard covers
//! request cancellation (compiler children are killed on drop as well).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::render::artifacts::{
    generate_file_name, relocate, store_bytes, ArtifactSource, CompiledArtifact,
};
use crate::render::fallback_pdf::render_minimal_pdf;
use crate::render::process::{ProcessError, ProcessRunner, ProcessSpec};
use crate::render::workspace::Workspace;
use crate::render::RenderError;

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Availability of one configured compiler binary.
#[derive(Debug, Clone, Serialize)]
pub struct CompilerStatus {
    pub name: String,
    pub available: bool,
    /// First line of `--version` output when available.
    pub version: Option<String>,
}

pub struct DocumentCompiler {
    runner: Arc<dyn ProcessRunner>,
    /// Tried in order: primary first, then the alternate.
    compilers: Vec<String>,
    timeout: Duration,
    temp_dir: PathBuf,
    output_dir: PathBuf,
    cleanup_temp: bool,
}

impl DocumentCompiler {
    pub fn new(config: &RenderConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let mut compilers = vec![config.primary_compiler.clone()];
        if config.fallback_compiler != config.primary_compiler {
            compilers.push(config.fallback_compiler.clone());
        }
        Self {
            runner,
            compilers,
            timeout: Duration::from_secs(config.timeout_secs),
            temp_dir: config.temp_dir.clone(),
            output_dir: config.output_dir.clone(),
            cleanup_temp: config.cleanup_temp,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Compiles a résumé; the minimal PDF is titled `"<name> - Resume"`.
    pub async fn compile(
        &self,
        latex: &str,
        candidate_name: &str,
    ) -> Result<CompiledArtifact, RenderError> {
        let title = format!("{} - Resume", candidate_name.trim());
        self.compile_document(latex, &title, candidate_name).await
    }

    /// Compiles any document. `file_label` is sanitized into the artifact name,
    /// `title` heads the minimal PDF if every compiler fails.
    pub async fn compile_document(
        &self,
        latex: &str,
        title: &str,
        file_label: &str,
    ) -> Result<CompiledArtifact, RenderError> {
        let workspace = Workspace::prepare(&self.temp_dir, self.cleanup_temp)?;
        let file_name = generate_file_name(file_label, Local::now().naive_local());

        let compiled = self.compile_in(&workspace, latex, &file_name).await;
        workspace.close().await;
        if let Some(artifact) = compiled? {
            return Ok(artifact);
        }

        warn!(file = %file_name, "All compilers failed, generating minimal PDF");
        self.write_fallback(latex, title, &file_name).await
    }

    /// Runs the compilers in order inside `workspace`. `Ok(None)` means every
    /// attempt failed and the caller should fall back.
    async fn compile_in(
        &self,
        workspace: &Workspace,
        latex: &str,
        file_name: &str,
    ) -> Result<Option<CompiledArtifact>, RenderError> {
        let stem = workspace.write_source(latex)?;

        for compiler in &self.compilers {
            match self.attempt(workspace, &stem, compiler).await {
                Ok(pdf) => {
                    let (path, file_name) = relocate(&pdf, &self.output_dir, file_name).await?;
                    info!(compiler = %compiler, file = %file_name, "Compiled PDF");
                    return Ok(Some(CompiledArtifact::new(
                        path,
                        file_name,
                        ArtifactSource::Compiler(compiler.clone()),
                    )));
                }
                Err(e) => warn!(compiler = %compiler, error = %e, "LaTeX compilation attempt failed"),
            }
        }
        Ok(None)
    }

    async fn attempt(
        &self,
        workspace: &Workspace,
        stem: &str,
        compiler: &str,
    ) -> Result<PathBuf, RenderError> {
        let spec = ProcessSpec {
            program: compiler.to_string(),
            args: vec![
                "-interaction=nonstopmode".to_string(),
                format!("{stem}.tex"),
            ],
            cwd: workspace.path().to_path_buf(),
            timeout: self.timeout,
        };

        let output = self.runner.run(&spec).await.map_err(|e| match e {
            ProcessError::TimedOut { program, timeout } => RenderError::Timeout {
                compiler: program,
                timeout,
            },
            ProcessError::Spawn { program, source } => RenderError::CompilerFailed {
                compiler: program,
                message: source.to_string(),
            },
        })?;
        debug!(compiler = %compiler, exit_code = ?output.exit_code, "Compiler finished");

        if !output.success() {
            return Err(RenderError::CompilerFailed {
                compiler: compiler.to_string(),
                message: format!("exit code {:?}: {}", output.exit_code, output.tail(5)),
            });
        }
        workspace
            .artifact(stem)
            .ok_or_else(|| RenderError::CompilerFailed {
                compiler: compiler.to_string(),
                message: "no PDF was produced".to_string(),
            })
    }

    async fn write_fallback(
        &self,
        latex: &str,
        title: &str,
        file_name: &str,
    ) -> Result<CompiledArtifact, RenderError> {
        let bytes = render_minimal_pdf(title, latex, Local::now().naive_local())?;
        let (path, file_name) = store_bytes(&self.output_dir, file_name, &bytes).await?;
        info!(file = %file_name, "Wrote minimal fallback PDF");
        Ok(CompiledArtifact::new(path, file_name, ArtifactSource::Fallback))
    }

    /// Probes `<compiler> --version` for every configured compiler.
    pub async fn compiler_status(&self) -> Vec<CompilerStatus> {
        let mut statuses = Vec::with_capacity(self.compilers.len());
        for name in &self.compilers {
            let spec = ProcessSpec {
                program: name.clone(),
                args: vec!["--version".to_string()],
                cwd: std::env::temp_dir(),
                timeout: VERSION_PROBE_TIMEOUT,
            };
            let status = match self.runner.run(&spec).await {
                Ok(output) if output.success() => CompilerStatus {
                    name: name.clone(),
                    available: true,
                    version: output
                        .stdout
                        .lines()
                        .find(|l| !l.trim().is_empty())
                        .map(|l| l.trim().to_string()),
                },
                Ok(_) | Err(_) => CompilerStatus {
                    name: name.clone(),
                    available: false,
                    version: None,
                },
            };
            statuses.push(status);
        }
        statuses
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::process::ProcessOutput;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Copy)]
    pub(crate) enum Behavior {
        /// Exits 0 and writes `<stem>.pdf` into the working directory.
        Succeed,
        /// Exits 0 without producing a PDF.
        SucceedWithoutPdf,
        ExitWith(i32),
        TimeOut,
        Missing,
        /// Never finishes; only useful when the caller is cancelled.
        Hang,
    }

    /// Scripted compilers keyed by program name; unknown programs are missing.
    pub(crate) struct FakeRunner {
        behaviors: HashMap<String, Behavior>,
        pub(crate) calls: Mutex<Vec<(String, PathBuf)>>,
    }

    impl FakeRunner {
        pub(crate) fn new(behaviors: &[(&str, Behavior)]) -> Self {
            Self {
                behaviors: behaviors
                    .iter()
                    .map(|(name, b)| (name.to_string(), *b))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn programs(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
            self.calls
                .lock()
                .push((spec.program.clone(), spec.cwd.clone()));
            let behavior = self
                .behaviors
                .get(&spec.program)
                .copied()
                .unwrap_or(Behavior::Missing);
            match behavior {
                Behavior::Succeed => {
                    if let Some(source) = spec.args.iter().find(|a| a.ends_with(".tex")) {
                        let pdf = source.trim_end_matches(".tex").to_string() + ".pdf";
                        std::fs::write(spec.cwd.join(pdf), b"%PDF-1.4 compiled").unwrap();
                    }
                    Ok(ProcessOutput {
                        exit_code: Some(0),
                        stdout: format!("{} 3.14159265 (TeX Live 2024)\nmore", spec.program),
                        stderr: String::new(),
                    })
                }
                Behavior::SucceedWithoutPdf => Ok(ProcessOutput {
                    exit_code: Some(0),
                    ..Default::default()
                }),
                Behavior::ExitWith(code) => Ok(ProcessOutput {
                    exit_code: Some(code),
                    stdout: "! Undefined control sequence.".into(),
                    stderr: String::new(),
                }),
                Behavior::TimeOut => Err(ProcessError::TimedOut {
                    program: spec.program.clone(),
                    timeout: spec.timeout,
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(ProcessOutput::default())
                }
                Behavior::Missing => Err(ProcessError::Spawn {
                    program: spec.program.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                }),
            }
        }
    }

    pub(crate) fn render_config(root: &Path) -> RenderConfig {
        RenderConfig {
            timeout_secs: 30,
            primary_compiler: "pdflatex".into(),
            fallback_compiler: "xelatex".into(),
            output_dir: root.join("out"),
            temp_dir: root.join("tmp"),
            cleanup_temp: true,
            template_path: root.join("template.tex"),
            cover_letter_template_path: root.join("cover_letter.tex"),
        }
    }

    fn compiler_with(root: &Path, runner: Arc<FakeRunner>) -> DocumentCompiler {
        DocumentCompiler::new(&render_config(root), runner)
    }

    fn workspace_count(root: &Path) -> usize {
        std::fs::read_dir(root.join("tmp"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_primary_success() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::Succeed)]));
        let compiler = compiler_with(root.path(), runner.clone());

        let artifact = compiler.compile("\\documentclass{article}", "Ada Lovelace").await.unwrap();
        assert_eq!(artifact.generator, ArtifactSource::Compiler("pdflatex".into()));
        assert!(artifact.file_name.starts_with("Ada_Lovelace_"));
        assert!(artifact.file_name.ends_with(".pdf"));
        assert_eq!(artifact.path, root.path().join("out").join(&artifact.file_name));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"%PDF-1.4 compiled");
        assert_eq!(runner.programs(), vec!["pdflatex"]);
        assert_eq!(workspace_count(root.path()), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary_and_cleans_workspace() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[
            ("pdflatex", Behavior::ExitWith(1)),
            ("xelatex", Behavior::Succeed),
        ]));
        let compiler = compiler_with(root.path(), runner.clone());

        let artifact = compiler.compile("x", "Ada").await.unwrap();
        assert_eq!(artifact.generator, ArtifactSource::Compiler("xelatex".into()));
        assert_eq!(runner.programs(), vec!["pdflatex", "xelatex"]);

        // Both attempts ran in the same workspace, which is now gone.
        let calls = runner.calls.lock().clone();
        assert_eq!(calls[0].1, calls[1].1);
        assert!(!calls[0].1.exists());
        assert_eq!(workspace_count(root.path()), 0);
    }

    #[tokio::test]
    async fn test_timeout_and_missing_pdf_trigger_fallback() {
        for primary in [Behavior::TimeOut, Behavior::SucceedWithoutPdf, Behavior::Missing] {
            let root = tempfile::tempdir().unwrap();
            let runner = Arc::new(FakeRunner::new(&[
                ("pdflatex", primary),
                ("xelatex", Behavior::Succeed),
            ]));
            let artifact = compiler_with(root.path(), runner)
                .compile("x", "Ada")
                .await
                .unwrap();
            assert_eq!(artifact.generator, ArtifactSource::Compiler("xelatex".into()));
        }
    }

    #[tokio::test]
    async fn test_minimal_pdf_when_no_compiler_works() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[("xelatex", Behavior::ExitWith(2))]));
        let compiler = compiler_with(root.path(), runner.clone());

        let artifact = compiler.compile("\\section{Experience}", "Ada").await.unwrap();
        assert_eq!(artifact.generator, ArtifactSource::Fallback);
        let bytes = std::fs::read(&artifact.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(runner.programs(), vec!["pdflatex", "xelatex"]);
        assert_eq!(workspace_count(root.path()), 0);
    }

    #[tokio::test]
    async fn test_unwritable_temp_root_fails_before_any_compiler() {
        let root = tempfile::tempdir().unwrap();
        // A file where the temp root directory should be.
        std::fs::write(root.path().join("tmp"), "blocker").unwrap();
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::Succeed)]));
        let compiler = compiler_with(root.path(), runner.clone());

        let err = compiler.compile("x", "Ada").await.unwrap_err();
        assert!(matches!(err, RenderError::WorkspaceUnwritable { .. }));
        assert!(runner.programs().is_empty());
        assert!(!root.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_cancelled_compile_leaves_no_workspace() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::Hang)]));
        let compiler = compiler_with(root.path(), runner.clone());

        let cancelled = tokio::time::timeout(
            Duration::from_millis(200),
            compiler.compile("x", "Ada"),
        )
        .await;
        assert!(cancelled.is_err());

        // The compiler was running inside a workspace when the future was dropped.
        let calls = runner.calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].1.exists());
        assert_eq!(workspace_count(root.path()), 0);
        assert!(!root.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_repeated_fallbacks_keep_every_artifact() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[]));
        let compiler = compiler_with(root.path(), runner);

        let first = compiler.compile("first", "Ada").await.unwrap();
        let second = compiler.compile("second", "Ada").await.unwrap();
        assert_ne!(first.file_name, second.file_name);
        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    #[tokio::test]
    async fn test_compile_document_uses_label_for_file_name() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::Succeed)]));
        let compiler = compiler_with(root.path(), runner);

        let artifact = compiler
            .compile_document("x", "Ada - Cover Letter", "Ada_Initech_CoverLetter")
            .await
            .unwrap();
        assert!(artifact.file_name.starts_with("Ada_Initech_CoverLetter_"));
    }

    #[tokio::test]
    async fn test_cleanup_disabled_keeps_workspace() {
        let root = tempfile::tempdir().unwrap();
        let mut config = render_config(root.path());
        config.cleanup_temp = false;
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::Succeed)]));
        let compiler = DocumentCompiler::new(&config, runner);

        compiler.compile("x", "Ada").await.unwrap();
        assert_eq!(workspace_count(root.path()), 1);
    }

    #[tokio::test]
    async fn test_same_compiler_configured_twice_runs_once() {
        let root = tempfile::tempdir().unwrap();
        let mut config = render_config(root.path());
        config.fallback_compiler = "pdflatex".into();
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::ExitWith(1))]));
        let compiler = DocumentCompiler::new(&config, runner.clone());

        let artifact = compiler.compile("x", "Ada").await.unwrap();
        assert_eq!(artifact.generator, ArtifactSource::Fallback);
        assert_eq!(runner.programs(), vec!["pdflatex"]);
    }

    #[tokio::test]
    async fn test_compiler_status() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new(&[("pdflatex", Behavior::Succeed)]));
        let compiler = compiler_with(root.path(), runner);

        let statuses = compiler.compiler_status().await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].available);
        assert_eq!(statuses[0].version.as_deref(), Some("pdflatex 3.14159265 (TeX Live 2024)"));
        assert!(!statuses[1].available);
        assert!(statuses[1].version.is_none());
    }
}
