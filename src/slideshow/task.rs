//! Running a build off the calling thread.

use super::assembler::{BuildReport, build};
use super::error::{BuildError, Result};
use super::options::DeckOptions;
use super::progress::SlideQueued;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// Inputs of one background build.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub output: PathBuf,
    pub template: PathBuf,
    pub images: Vec<PathBuf>,
    pub options: DeckOptions,
}

/// Run a build on tokio's blocking pool.
///
/// The returned future resolves to the build's own result, so callers see
/// both completion and any fatal error. Progress messages, if a sender is
/// given, arrive on the channel while the build runs. There is no way to
/// cancel a build once it has started; dropping the future detaches it.
///
/// # Examples
///
/// ```rust,no_run
/// use picdeck::slideshow::{BuildJob, DeckOptions, build_in_background};
///
/// # async fn run() -> Result<(), picdeck::slideshow::BuildError> {
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let job = BuildJob {
///     output: "deck.pptx".into(),
///     template: "template.pptx".into(),
///     images: vec!["a.png".into(), "b.png".into()],
///     options: DeckOptions::default(),
/// };
/// let handle = tokio::spawn(build_in_background(job, Some(tx)));
/// while rx.recv().await.is_some() {
///     println!("one more slide");
/// }
/// let report = handle.await.expect("join")?;
/// println!("{} slides", report.slides.len());
/// # Ok(())
/// # }
/// ```
pub async fn build_in_background(
    job: BuildJob,
    progress: Option<UnboundedSender<SlideQueued>>,
) -> Result<BuildReport> {
    tokio::task::spawn_blocking(move || {
        let BuildJob {
            output,
            template,
            images,
            options,
        } = job;
        match progress {
            Some(mut tx) => build(&output, &template, &images, &options, &mut tx),
            None => build(&output, &template, &images, &options, &mut ()),
        }
    })
    .await
    .map_err(|e| BuildError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::write_starter_template;
    use crate::slideshow::image::tests::encode;

    #[tokio::test]
    async fn test_background_build_reports_progress_and_result() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.pptx");
        write_starter_template(&template).unwrap();

        let mut images = Vec::new();
        for i in 0..4 {
            let path = dir.path().join(format!("{}.png", i));
            std::fs::write(&path, encode(12, 9, image::ImageFormat::Png)).unwrap();
            images.push(path);
        }

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let job = BuildJob {
            output: dir.path().join("deck.pptx"),
            template,
            images,
            options: DeckOptions::default(),
        };
        let report = build_in_background(job, Some(tx)).await.unwrap();
        assert_eq!(report.slides.len(), 4);
        assert!(report.is_clean());

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 4);
    }

    #[tokio::test]
    async fn test_background_build_surfaces_errors() {
        let dir = tempfile::tempdir().unwrap();
        let job = BuildJob {
            output: dir.path().join("deck.pptx"),
            template: dir.path().join("missing.pptx"),
            images: Vec::new(),
            options: DeckOptions::default(),
        };
        let err = build_in_background(job, None).await.unwrap_err();
        assert!(matches!(err, BuildError::Template(_)));
    }
}
