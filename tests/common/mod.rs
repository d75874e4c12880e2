//! Shared fixtures for integration tests
//!
//! [`FixtureTransport`] routes requests by path to canned JSON documents, or
//! to a responder computed from the submitted form.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use snapedit::{
    ClientConfig, EncodedImage, MultipartForm, RequestBody, Result, SnapEditClient,
    SnapEditError, Transport, TransportResponse,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Responder = dyn Fn(&MultipartForm) -> Result<TransportResponse> + Send + Sync;

/// Path-routed transport with a request log
#[derive(Clone, Default)]
pub struct FixtureTransport {
    routes: Arc<Mutex<HashMap<String, Arc<Responder>>>>,
    requests: Arc<Mutex<Vec<(String, MultipartForm)>>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with 200 and a fixed JSON document
    pub fn route_json(self, path: &str, value: serde_json::Value) -> Self {
        self.route_with(path, move |_| Ok(TransportResponse::json_ok(&value)))
    }

    /// Answer `path` with a status and raw body
    pub fn route_status(self, path: &str, status: u16, body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        let path_owned = path.to_string();
        self.route_with(path, move |_| {
            TransportResponse::new(status, body.clone()).error_for_status(&path_owned)
        })
    }

    /// Answer `path` from the submitted form
    pub fn route_with<F>(self, path: &str, responder: F) -> Self
    where
        F: Fn(&MultipartForm) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(responder));
        self
    }

    pub fn requests(&self) -> Vec<(String, MultipartForm)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn client(&self) -> SnapEditClient {
        self.client_with(ClientConfig::builder().api_key("integration-key"))
    }

    pub fn client_with(&self, builder: snapedit::ClientConfigBuilder) -> SnapEditClient {
        let config = builder.build().unwrap();
        SnapEditClient::with_transport(config, Arc::new(self.clone())).unwrap()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get(&self, path: &str) -> Result<TransportResponse> {
        Err(SnapEditError::internal(format!("unexpected GET {}", path)))
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<TransportResponse> {
        let RequestBody::Multipart(form) = body else {
            return Err(SnapEditError::internal("expected a multipart body"));
        };
        let responder = self.routes.lock().unwrap().get(path).cloned();
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), form.clone()));

        // Let concurrent callers interleave
        tokio::task::yield_now().await;

        match responder {
            Some(responder) => responder(&form),
            None => TransportResponse::new(404, b"no such route".to_vec()).error_for_status(path),
        }
    }
}

/// Dimensions of an image file in a submitted form
pub fn form_image_dimensions(form: &MultipartForm, field: &str) -> (u32, u32) {
    let data = form.file_data(field).unwrap().to_vec();
    EncodedImage::from_bytes(data).dimensions().unwrap()
}

pub fn jpeg_image(width: u32, height: u32) -> EncodedImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 200) as u8, (y % 200) as u8, 90])
    });
    EncodedImage::from_image(&DynamicImage::ImageRgb8(image), ImageFormat::Jpeg).unwrap()
}

pub fn png_image(width: u32, height: u32, fill: [u8; 4]) -> EncodedImage {
    let image = RgbaImage::from_pixel(width, height, Rgba(fill));
    EncodedImage::from_image(&DynamicImage::ImageRgba8(image), ImageFormat::Png).unwrap()
}

pub fn mask_image(width: u32, height: u32, level: u8) -> EncodedImage {
    let image = GrayImage::from_pixel(width, height, Luma([level]));
    EncodedImage::from_image(&DynamicImage::ImageLuma8(image), ImageFormat::Png).unwrap()
}
