//! Assembling a slide deck from images.
//!
//! The template is copied to the output path and opened; every image then
//! becomes one slide that reuses the template's first slide layout. Slides
//! are registered in input order and the deck is saved once at the end.
//!
//! The first image that cannot be used stops the build. The slides queued
//! before it are still saved to the output file, which must then be treated
//! as incomplete.

use super::error::{BuildError, Result};
use super::geometry::{Geometry, compute_geometry};
use super::ids::SlideIdAllocator;
use super::image::{ProbedImage, probe};
use super::options::DeckOptions;
use super::progress::Progress;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::validate::{ValidationFinding, validate_package};
use crate::ooxml::pptx::writer::SlideFragment;
use crate::ooxml::pptx::{LayoutReference, NewSlide, Package};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One slide added by a build.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideRecord {
    pub slide_id: u32,
    /// Relationship id of the slide in the presentation part
    pub rel_id: String,
    pub source: PathBuf,
    pub slide_part: PackURI,
    pub image_part: PackURI,
    pub geometry: Geometry,
}

/// Outcome of a finished build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Slides in presentation order
    pub slides: Vec<SlideRecord>,
    /// Structural problems found in the saved deck; empty when validation is off
    pub findings: Vec<ValidationFinding>,
}

impl BuildReport {
    /// True when the validator found nothing.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// A deck being built into one output file.
///
/// # Examples
///
/// ```rust,no_run
/// use picdeck::slideshow::{DeckOptions, SlideShowBuilder};
///
/// let mut deck = SlideShowBuilder::create("holiday.pptx", "template.pptx", DeckOptions::default())?;
/// deck.add_image("photos/beach.jpg".as_ref())?;
/// deck.add_image("photos/dunes.png".as_ref())?;
/// let report = deck.finish()?;
/// assert_eq!(report.slides.len(), 2);
/// # Ok::<(), picdeck::slideshow::BuildError>(())
/// ```
pub struct SlideShowBuilder {
    package: Package,
    output: PathBuf,
    layout: LayoutReference,
    ids: SlideIdAllocator,
    options: DeckOptions,
    slides: Vec<SlideRecord>,
}

impl SlideShowBuilder {
    /// Copy `template` to `output` and open the copy.
    ///
    /// Fails with [`BuildError::Template`] when the template is missing, is
    /// not a presentation, or has no slide master or layout. Nothing is
    /// written to `output` in that case.
    pub fn create<O, T>(output: O, template: T, options: DeckOptions) -> Result<Self>
    where
        O: AsRef<Path>,
        T: AsRef<Path>,
    {
        let output = output.as_ref();
        let template = template.as_ref();

        let bytes = std::fs::read(template).map_err(|e| {
            BuildError::Template(format!("cannot read template {}: {}", template.display(), e))
        })?;
        let package = Package::from_bytes(&bytes).map_err(|e| template_error(template, e))?;
        let layout = package
            .layout_reference()
            .map_err(|e| template_error(template, e))?;
        let ids = SlideIdAllocator::seeded(package.slide_ids().map_err(|e| template_error(template, e))?);

        std::fs::write(output, &bytes)?;

        debug!(
            template = %template.display(),
            output = %output.display(),
            layout = %layout.layout,
            "opened template copy"
        );

        Ok(Self {
            package,
            output: output.to_path_buf(),
            layout,
            ids,
            options,
            slides: Vec::new(),
        })
    }

    /// Add one slide showing the image at `path`.
    pub fn add_image(&mut self, path: &Path) -> Result<&SlideRecord> {
        let image = probe(path, self.options.fallback_dpi)?;
        self.add_probed(image)
    }

    /// Add one slide for an image that has already been read.
    pub fn add_probed(&mut self, image: ProbedImage) -> Result<&SlideRecord> {
        let geometry = compute_geometry(
            image.width,
            image.height,
            image.resolution,
            self.options.scale_policy(),
        )
        .map_err(|e| BuildError::InvalidImage {
            path: image.path.clone(),
            reason: e.to_string(),
        })?;

        let slide_id = self.ids.next_id()?;
        let rel_id = SlideIdAllocator::rel_id(slide_id);
        if self.package.has_presentation_rel(&rel_id)? {
            return Err(BuildError::RelationshipCollision { r_id: rel_id });
        }

        let name = image.display_name();
        let slide_xml = SlideFragment::new(&name, &name, geometry.cx, geometry.cy)
            .with_offset(self.options.picture_offset_emu)
            .to_xml()?;

        let added = self.package.add_picture_slide(NewSlide {
            slide_id,
            rel_id: &rel_id,
            slide_xml,
            layout: &self.layout.layout,
            image_format: image.format,
            image_bytes: image.bytes,
        })?;
        self.ids.advance();

        info!(
            slide_id,
            image = %image.path.display(),
            format = %image.format,
            cx = geometry.cx,
            cy = geometry.cy,
            "added slide"
        );

        self.slides.push(SlideRecord {
            slide_id,
            rel_id,
            source: image.path,
            slide_part: added.slide_part,
            image_part: added.image_part,
            geometry,
        });
        Ok(&self.slides[self.slides.len() - 1])
    }

    /// Slides added so far.
    #[inline]
    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    #[inline]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Save the deck and, if enabled, validate the saved file.
    pub fn finish(mut self) -> Result<BuildReport> {
        self.package.save(&self.output)?;

        let findings = if self.options.validate {
            let findings = validate_package(&self.output)?;
            for finding in &findings {
                warn!(location = %finding.location, "{}", finding.description);
            }
            findings
        } else {
            Vec::new()
        };

        info!(
            output = %self.output.display(),
            slides = self.slides.len(),
            findings = findings.len(),
            "saved slide deck"
        );

        Ok(BuildReport {
            slides: self.slides,
            findings,
        })
    }

    /// Save whatever has been added, after a failure. Errors are only logged.
    fn save_partial(&mut self) {
        let pending = self.package.pending_slide_count();
        match self.package.save(&self.output) {
            Ok(()) => warn!(
                output = %self.output.display(),
                slides = pending,
                "saved incomplete slide deck"
            ),
            Err(e) => warn!(
                output = %self.output.display(),
                error = %e,
                "could not save incomplete slide deck"
            ),
        }
    }
}

fn template_error(template: &Path, err: OoxmlError) -> BuildError {
    BuildError::Template(format!("{}: {}", template.display(), err))
}

/// Build a deck at `output` from `template`, one slide per image in order.
///
/// `progress` is notified once after each slide is queued. On the first
/// failing image the slides queued so far are saved and the error returned.
///
/// # Examples
///
/// ```rust,no_run
/// use picdeck::slideshow::{DeckOptions, build, discover_images};
///
/// let images = discover_images("photos")?;
/// let mut done = 0;
/// let report = build("deck.pptx", "template.pptx", &images, &DeckOptions::default(), &mut || done += 1)?;
/// for finding in &report.findings {
///     eprintln!("{}", finding);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build<O, T, I, P>(
    output: O,
    template: T,
    images: I,
    options: &DeckOptions,
    progress: &mut P,
) -> Result<BuildReport>
where
    O: AsRef<Path>,
    T: AsRef<Path>,
    I: IntoIterator,
    I::Item: AsRef<Path>,
    P: Progress + ?Sized,
{
    let mut deck = SlideShowBuilder::create(output, template, options.clone())?;

    for image in images {
        if let Err(e) = deck.add_image(image.as_ref()) {
            deck.save_partial();
            return Err(e);
        }
        progress.slide_queued();
    }

    deck.finish()
}
