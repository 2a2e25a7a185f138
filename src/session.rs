use crate::{
    captions::CaptionOrchestrator,
    compositing::{Compositor, ExportArtifact, Surface},
    error::{MemeError, Result},
    imaging::ImageNormalizer,
    models::{Band, CaptionRequest, CaptionResult, CaptionSet, ImagePayload, MemeDocument, TextStyle},
};
use image::RgbaImage;

/// In-memory editing state for one meme: image, two text bands and the
/// latest caption suggestions.
#[derive(Debug, Clone, Default)]
pub struct MemeSession {
    image: Option<ImagePayload>,
    top_text: String,
    bottom_text: String,
    top_style: TextStyle,
    bottom_style: TextStyle,
    captions: CaptionSet,
}

impl MemeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes `raw` and makes it the working image. Old suggestions are
    /// dropped because they described the previous image.
    pub fn load_image(&mut self, normalizer: &ImageNormalizer, raw: &[u8]) -> Result<&ImagePayload> {
        let payload = normalizer.normalize(raw)?;
        self.captions = CaptionSet::default();
        Ok(&*self.image.insert(payload))
    }

    pub fn clear_image(&mut self) {
        *self = Self::default();
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn text(&self, band: Band) -> &str {
        match band {
            Band::Top => &self.top_text,
            Band::Bottom => &self.bottom_text,
        }
    }

    pub fn set_text(&mut self, band: Band, text: impl Into<String>) {
        match band {
            Band::Top => self.top_text = text.into(),
            Band::Bottom => self.bottom_text = text.into(),
        }
    }

    pub fn style(&self, band: Band) -> &TextStyle {
        match band {
            Band::Top => &self.top_style,
            Band::Bottom => &self.bottom_style,
        }
    }

    pub fn style_mut(&mut self, band: Band) -> &mut TextStyle {
        match band {
            Band::Top => &mut self.top_style,
            Band::Bottom => &mut self.bottom_style,
        }
    }

    /// Exchanges the two texts; styles stay with their band.
    pub fn swap_text(&mut self) {
        std::mem::swap(&mut self.top_text, &mut self.bottom_text);
    }

    pub fn reset_styles(&mut self) {
        self.top_style.reset();
        self.bottom_style.reset();
    }

    pub fn captions(&self) -> &CaptionSet {
        &self.captions
    }

    /// Copies suggestion `index` into both bands. Returns false if there is
    /// no such suggestion.
    pub fn apply_caption(&mut self, index: usize) -> bool {
        let Some(CaptionResult { top, bottom }) = self.captions.get(index).cloned() else {
            return false;
        };
        self.top_text = top;
        self.bottom_text = bottom;
        true
    }

    /// Requests new suggestions for the current image. The existing set is
    /// only replaced when generation succeeds.
    pub async fn generate_captions(
        &mut self,
        orchestrator: &CaptionOrchestrator,
        prompt: &str,
        reasoning_mode: bool,
    ) -> Result<&CaptionSet> {
        let image = self.image.clone().ok_or(MemeError::NoImage)?;
        let request = CaptionRequest::new(image, prompt, reasoning_mode);
        self.captions = orchestrator.generate_captions(request).await?;
        Ok(&self.captions)
    }

    pub fn document(&self) -> Result<MemeDocument> {
        let image = self.image.clone().ok_or(MemeError::NoImage)?;
        Ok(MemeDocument::new(image)
            .with_text(self.top_text.clone(), self.bottom_text.clone())
            .with_styles(self.top_style, self.bottom_style))
    }

    pub fn preview(&self, compositor: &Compositor, viewport: Surface) -> Result<RgbaImage> {
        compositor.preview(&self.document()?, viewport)
    }

    pub fn export(&self, compositor: &Compositor) -> Result<ExportArtifact> {
        compositor.export(&self.document()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Alignment, ChatRequest, HexColor, ModelCandidate, ModelRoster};
    use crate::provider::ChatProvider;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Arc;

    struct FixedProvider(Option<&'static str>);

    #[async_trait]
    impl ChatProvider for FixedProvider {
        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            self.0.map(str::to_string).ok_or_else(|| {
                MemeError::Provider(crate::error::FailureReason::Transport("down".into()))
            })
        }
    }

    fn orchestrator(reply: Option<&'static str>) -> CaptionOrchestrator {
        CaptionOrchestrator::new(
            Arc::new(FixedProvider(reply)),
            ModelRoster::new(
                ModelCandidate::reasoning("thinker"),
                vec![ModelCandidate::fast("fast-1")],
            ),
        )
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn loaded_session() -> MemeSession {
        let mut session = MemeSession::new();
        session
            .load_image(&ImageNormalizer::default(), &png(40, 20))
            .unwrap();
        session
    }

    #[test]
    fn swap_exchanges_text_but_not_styles() {
        let mut session = MemeSession::new();
        session.set_text(Band::Top, "up");
        session.set_text(Band::Bottom, "down");
        session.style_mut(Band::Top).alignment = Alignment::Left;

        session.swap_text();

        assert_eq!(session.text(Band::Top), "down");
        assert_eq!(session.text(Band::Bottom), "up");
        assert_eq!(session.style(Band::Top).alignment, Alignment::Left);
        assert_eq!(session.style(Band::Bottom).alignment, Alignment::Center);
    }

    #[test]
    fn clear_image_resets_everything() {
        let mut session = loaded_session();
        session.set_text(Band::Top, "x");
        session.style_mut(Band::Bottom).set_font_size(90);

        session.clear_image();

        assert!(session.image().is_none());
        assert_eq!(session.text(Band::Top), "");
        assert_eq!(session.style(Band::Bottom), &TextStyle::default());
        assert!(matches!(session.document(), Err(MemeError::NoImage)));
    }

    #[test]
    fn reset_styles_keeps_text() {
        let mut session = MemeSession::new();
        session.set_text(Band::Top, "keep me");
        session.style_mut(Band::Top).color = HexColor::BLACK;
        session.reset_styles();
        assert_eq!(session.style(Band::Top).color, HexColor::WHITE);
        assert_eq!(session.text(Band::Top), "keep me");
    }

    #[test]
    fn load_image_rejects_non_images() {
        let mut session = MemeSession::new();
        let err = session
            .load_image(&ImageNormalizer::default(), b"plain text")
            .unwrap_err();
        assert!(matches!(err, MemeError::UnsupportedMedia(_)));
        assert!(session.image().is_none());
    }

    #[tokio::test]
    async fn generate_without_image_is_no_image() {
        let mut session = MemeSession::new();
        let err = session
            .generate_captions(&orchestrator(None), "", false)
            .await
            .unwrap_err();
        assert!(matches!(err, MemeError::NoImage));
    }

    #[tokio::test]
    async fn captions_are_replaced_on_success_and_kept_on_failure() {
        let mut session = loaded_session();
        let ok = orchestrator(Some(r#"[{"top":"t1","bottom":"b1"},{"top":"t2","bottom":"b2"}]"#));
        session.generate_captions(&ok, "", false).await.unwrap();
        assert_eq!(session.captions().len(), 2);

        let failing = orchestrator(None);
        assert!(session.generate_captions(&failing, "", true).await.is_err());
        assert_eq!(session.captions().len(), 2);

        assert!(session.apply_caption(1));
        assert_eq!(session.text(Band::Top), "t2");
        assert_eq!(session.text(Band::Bottom), "b2");
        assert!(!session.apply_caption(7));
    }

    #[tokio::test]
    async fn loading_a_new_image_drops_suggestions() {
        let mut session = loaded_session();
        let ok = orchestrator(Some(r#"[{"top":"t","bottom":"b"}]"#));
        session.generate_captions(&ok, "", false).await.unwrap();

        session
            .load_image(&ImageNormalizer::default(), &png(10, 10))
            .unwrap();
        assert!(session.captions().is_empty());
        assert_eq!(session.image().unwrap().width(), 10);
    }

    #[test]
    fn document_reflects_session_state() {
        let mut session = loaded_session();
        session.set_text(Band::Bottom, "bottom");
        session.style_mut(Band::Bottom).set_font_size(30);

        let doc = session.document().unwrap();
        assert_eq!(doc.bottom_text, "bottom");
        assert_eq!(doc.bottom_style.font_size(), 30);
        assert_eq!(doc.image.width(), 40);
    }
}
