use actix_web::{
    error::InternalError,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    compositing::EXPORT_MIME,
    error::{MemeError, Result},
    imaging::decode_image_field,
    models::{Alignment, CaptionRequest, MemeDocument, TextStyle},
    server::state::AppState,
};

/// Base64 data URIs of phone photos run to several megabytes.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionBody {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Absent and `null` both mean off.
    #[serde(default)]
    pub use_reasoning: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleBody {
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub text_align: Option<Alignment>,
}

impl StyleBody {
    fn into_style(self) -> Result<TextStyle> {
        let mut style = TextStyle::default();
        if let Some(size) = self.font_size {
            style.set_font_size(size.round().max(0.0) as u32);
        }
        if let Some(color) = self.color {
            style.set_color(&color)?;
        }
        if let Some(alignment) = self.text_align {
            style.alignment = alignment;
        }
        Ok(style)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBody {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub top_text: String,
    #[serde(default)]
    pub bottom_text: String,
    #[serde(default)]
    pub top_style: Option<StyleBody>,
    #[serde(default)]
    pub bottom_style: Option<StyleBody>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health))
        .route("/api/meme-ai", web::post().to(generate_captions))
        .route("/api/meme/export", web::post().to(export_meme));
}

/// JSON extractor settings; malformed bodies still get a JSON error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            log::warn!("Rejected request body: {}", err);
            let response =
                HttpResponse::BadRequest().json(json!({ "error": "Invalid request body" }));
            InternalError::from_response(err, response).into()
        })
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn generate_captions(
    state: web::Data<AppState>,
    body: web::Json<CaptionBody>,
) -> Result<HttpResponse> {
    let CaptionBody {
        image,
        file_type,
        prompt,
        use_reasoning,
    } = body.into_inner();

    let use_reasoning = use_reasoning.unwrap_or(false);
    let decoded = decode_image_field(image.as_deref().unwrap_or_default(), file_type.as_deref())?;
    log::info!(
        "Caption request: {} bytes of {} | reasoning mode: {}",
        decoded.bytes.len(),
        decoded.mime_type,
        use_reasoning
    );

    let normalizer = state.normalizer;
    let payload = web::block(move || normalizer.normalize(&decoded.bytes))
        .await
        .map_err(|e| MemeError::InternalError(e.to_string()))??;

    let request = CaptionRequest::new(payload, prompt.unwrap_or_default(), use_reasoning);
    let captions = state.orchestrator.generate_captions(request).await?;

    Ok(HttpResponse::Ok().json(json!({ "captions": captions })))
}

async fn export_meme(
    state: web::Data<AppState>,
    body: web::Json<ExportBody>,
) -> Result<HttpResponse> {
    let compositor = state.compositor()?;
    let body = body.into_inner();

    let decoded = decode_image_field(
        body.image.as_deref().unwrap_or_default(),
        body.file_type.as_deref(),
    )?;
    let top_style = body.top_style.unwrap_or_default().into_style()?;
    let bottom_style = body.bottom_style.unwrap_or_default().into_style()?;

    let normalizer = state.normalizer;
    let (top_text, bottom_text) = (body.top_text, body.bottom_text);
    let artifact = web::block(move || {
        let image = normalizer.normalize(&decoded.bytes).map_err(|e| match e {
            MemeError::UnsupportedMedia(detail) => MemeError::RenderSourceUnavailable(detail),
            other => other,
        })?;
        let document = MemeDocument::new(image)
            .with_text(top_text, bottom_text)
            .with_styles(top_style, bottom_style);
        compositor.export(&document)
    })
    .await
    .map_err(|e| MemeError::InternalError(e.to_string()))??;

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(artifact.filename.clone())],
    };
    Ok(HttpResponse::Ok()
        .content_type(EXPORT_MIME)
        .insert_header(disposition)
        .body(artifact.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        captions::CaptionOrchestrator,
        compositing::{font::test_font, Compositor},
        error::FailureReason,
        imaging::ImageNormalizer,
        models::{ChatRequest, ModelCandidate, ModelRoster},
        provider::ChatProvider,
    };
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Arc;

    struct FixedProvider(Option<&'static str>);

    #[async_trait]
    impl ChatProvider for FixedProvider {
        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            self.0.map(str::to_string).ok_or_else(|| {
                MemeError::Provider(FailureReason::Status {
                    code: 500,
                    body: "down".into(),
                })
            })
        }
    }

    fn state(reply: Option<&'static str>, compositor: Option<Compositor>) -> web::Data<AppState> {
        let orchestrator = CaptionOrchestrator::new(
            Arc::new(FixedProvider(reply)),
            ModelRoster::new(
                ModelCandidate::reasoning("thinker"),
                vec![ModelCandidate::fast("fast-1"), ModelCandidate::fast("fast-2")],
            ),
        );
        web::Data::new(AppState::new(
            orchestrator,
            ImageNormalizer::default(),
            compositor,
        ))
    }

    fn png_data_uri(width: u32, height: u32) -> String {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(out.into_inner()))
    }

    async fn post_json(
        data: web::Data<AppState>,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;
        let req = test::TestRequest::post().uri(path).set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state(None, None)).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn captions_are_returned_as_top_bottom_objects() {
        let data = state(Some(r#"Sure! [{"top":"when the","bottom":"code compiles"}]"#), None);
        let (status, body) = post_json(
            data,
            "/api/meme-ai",
            json!({ "image": png_data_uri(16, 16), "prompt": "cats" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["captions"][0]["top"], "when the");
        assert_eq!(body["captions"][0]["bottom"], "code compiles");
        assert_eq!(body["captions"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn null_reasoning_flag_means_off() {
        let data = state(Some(r#"[{"top":"null","bottom":"is false"}]"#), None);
        let (status, body) = post_json(
            data,
            "/api/meme-ai",
            json!({ "image": png_data_uri(8, 8), "useReasoning": null, "prompt": null }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["captions"][0]["bottom"], "is false");
    }

    #[actix_web::test]
    async fn missing_image_is_400() {
        let (status, body) = post_json(state(None, None), "/api/meme-ai", json!({ "useReasoning": true })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Image required");
    }

    #[actix_web::test]
    async fn non_image_upload_is_400() {
        let (status, body) = post_json(
            state(None, None),
            "/api/meme-ai",
            json!({ "image": STANDARD.encode("just some text"), "fileType": "text/plain" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please choose an image file.");
    }

    #[actix_web::test]
    async fn exhausted_models_is_502_with_generic_message() {
        let (status, body) = post_json(
            state(None, None),
            "/api/meme-ai",
            json!({ "image": png_data_uri(8, 8) }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to generate captions. Please try again.");
    }

    #[actix_web::test]
    async fn malformed_body_still_gets_json_error() {
        let app = test::init_service(App::new().app_data(state(None, None)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/meme-ai")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["error"], "Invalid request body");
    }

    #[actix_web::test]
    async fn export_without_font_is_503() {
        let (status, body) = post_json(
            state(None, None),
            "/api/meme/export",
            json!({ "image": png_data_uri(8, 8), "topText": "hi" }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn export_rejects_bad_color_and_undecodable_source() {
        let Some(font) = test_font() else { return };
        let data = state(None, Some(Compositor::new(font)));

        let (status, _) = post_json(
            data.clone(),
            "/api/meme/export",
            json!({ "image": png_data_uri(8, 8), "topStyle": { "color": "chartreuse" } }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            data,
            "/api/meme/export",
            json!({ "image": STANDARD.encode([0u8, 1, 2, 3]) }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn export_returns_png_attachment() {
        let Some(font) = test_font() else { return };
        let app = test::init_service(
            App::new()
                .app_data(state(None, Some(Compositor::new(font))))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/meme/export")
            .set_json(json!({
                "image": png_data_uri(120, 80),
                "topText": "top",
                "bottomText": "bottom",
                "bottomStyle": { "fontSize": 40, "color": "#ff0", "textAlign": "right" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
        let disposition = resp
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("meme-"));

        let bytes = test::read_body(resp).await;
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
    }
}
