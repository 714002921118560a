use crate::core::ViewerError;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn network_err(url: &str, reason: impl Into<String>) -> ViewerError {
    ViewerError::Network {
        url: url.to_string(),
        reason: reason.into(),
    }
}

fn js_reason(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// GET `url` and return the response body. Non-2xx statuses are errors.
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ViewerError> {
    let window = web::window().ok_or_else(|| network_err(url, "no window"))?;
    let opts = web::RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(web::RequestMode::Cors);
    let request = web::Request::new_with_str_and_init(url, &opts)
        .map_err(|e| network_err(url, js_reason(e)))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| network_err(url, js_reason(e)))?;
    let resp: web::Response = resp_value
        .dyn_into()
        .map_err(|e| network_err(url, js_reason(e)))?;
    if !resp.ok() {
        return Err(network_err(
            url,
            format!("HTTP {} {}", resp.status(), resp.status_text()),
        ));
    }

    let body = resp
        .array_buffer()
        .map_err(|e| network_err(url, js_reason(e)))?;
    let buf = JsFuture::from(body)
        .await
        .map_err(|e| network_err(url, js_reason(e)))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}
