//! File input and download helpers.

use enrol_core::ExportedFile;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

use crate::types::{js_message, AppError, AppResult};

/// Read a selected file's contents.
pub async fn read_file(file: &File) -> AppResult<Vec<u8>> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| AppError::FileRead(js_message(&e)))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Wrap bytes in a typed `Blob`.
pub fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<Blob, wasm_bindgen::JsValue> {
    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Save a file through a temporary object URL and anchor click.
pub fn trigger_download(file: &ExportedFile) -> AppResult<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| AppError::Browser("no document".into()))?;

    let download_err = |e: wasm_bindgen::JsValue| AppError::Download(js_message(&e));

    let blob = bytes_to_blob(&file.bytes, file.mime).map_err(download_err)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(download_err)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(download_err)?
        .dyn_into()
        .map_err(|_| AppError::Browser("<a> is not an anchor element".into()))?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();

    Url::revoke_object_url(&url).map_err(download_err)?;
    log::info!("Downloaded {} ({} bytes)", file.file_name, file.bytes.len());
    Ok(())
}
