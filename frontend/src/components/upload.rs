//! File selection and upload component.
//!
//! The file's name and size are checked before its contents are read, so an
//! oversized file is refused without loading it into memory.

use chrono::Utc;
use enrol_core::{Notice, SchoolApi, UploadSession};
use leptos::*;
use web_sys::{Event, HtmlInputElement};

use crate::config::{ACCEPTED_FILES, MAX_UPLOAD_BYTES};
use crate::services::{read_file, trigger_download, GlooApi};

#[component]
pub fn UploadSection(session: RwSignal<UploadSession>, api: StoredValue<GlooApi>) -> impl IntoView {
    let file_input = create_node_ref::<html::Input>();

    // Clear the native input once the session no longer holds a file.
    create_effect(move |_| {
        let has_selection = session.with(|s| s.selection().is_some());
        if let (false, Some(input)) = (has_selection, file_input.get()) {
            input.set_value("");
        }
    });

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        let name = file.name();
        let size = file.size() as u64;

        if !matches!(session.try_update(|s| s.check_file(&name, size)), Some(Ok(()))) {
            input.set_value("");
            return;
        }

        spawn_local(async move {
            match read_file(&file).await {
                Ok(bytes) => {
                    if let Some(Err(e)) = session.try_update(|s| s.select_file(name, bytes)) {
                        log::warn!("Selection refused: {}", e);
                    }
                }
                Err(e) => {
                    log::error!("❌ {}", e);
                    session.update(|s| s.set_notice(Notice::danger(e.to_string())));
                }
            }
        });
    };

    let on_upload = move |_| {
        let Some(Ok(selection)) = session.try_update(|s| s.begin_preview()) else {
            return;
        };
        let api = api.get_value();

        spawn_local(async move {
            let result = api.preview_upload(&selection).await;
            session.update(|s| {
                if let Err(e) = s.finish_preview(result) {
                    log::warn!("Preview did not complete: {}", e);
                }
            });
        });
    };

    let on_template = move |_| {
        if !matches!(session.try_update(|s| s.begin_template_download()), Some(Ok(()))) {
            return;
        }
        let api = api.get_value();

        spawn_local(async move {
            let result = api.download_template().await;
            let file = session.try_update(|s| s.finish_template_download(result, Utc::now()));
            if let Some(Ok(file)) = file {
                if let Err(e) = trigger_download(&file) {
                    session.update(|s| s.set_notice(Notice::danger(e.to_string())));
                }
            }
        });
    };

    let on_reset = move |_| session.update(UploadSession::reset);

    let downloading = move || session.with(UploadSession::is_downloading_template);

    view! {
        <section class="upload-section">
            <div class="upload-actions">
                <button class="btn btn-secondary" on:click=on_template disabled=downloading>
                    {move || if downloading() { "⏳ Downloading..." } else { "📥 Download template" }}
                </button>
            </div>

            <label for="studentFile" class="upload-label">"Student CSV file"</label>
            <input
                type="file"
                id="studentFile"
                accept=ACCEPTED_FILES
                node_ref=file_input
                on:change=on_file_change
            />
            <div class="upload-hint">
                {format!("CSV only, up to {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))}
            </div>

            <Show when=move || session.with(|s| s.selection().is_some())>
                <div class="selected-file">
                    {move || {
                        session.with(|s| {
                            s.selection().map(|f| format!("📄 {}", f.name)).unwrap_or_default()
                        })
                    }}
                </div>
            </Show>

            <div class="upload-actions">
                <button
                    class="btn btn-primary"
                    on:click=on_upload
                    disabled=move || !session.with(UploadSession::can_preview)
                >
                    {move || {
                        if session.with(UploadSession::is_previewing) {
                            "⏳ Validating..."
                        } else {
                            "📤 Upload and preview"
                        }
                    }}
                </button>
                <button class="btn btn-link" on:click=on_reset>"Start over"</button>
            </div>
        </section>
    }
}
